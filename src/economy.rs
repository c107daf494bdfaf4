//! Score, coins and the cosmetic shop
//!
//! Every change to the durable profile is written through to the store as it
//! happens. Store failures are logged and otherwise ignored.

use crate::persistence::{KeyValueStore, PersistedProfile, keys};
use crate::sim::Session;
use crate::tuning::Tuning;

/// A purchasable runner skin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cosmetic {
    pub id: &'static str,
    pub name: &'static str,
    pub cost: u64,
}

/// Everything the shop sells
pub const CATALOG: &[Cosmetic] = &[
    Cosmetic {
        id: "default",
        name: "Neon Runner",
        cost: 0,
    },
    Cosmetic {
        id: "stupid",
        name: "Cardboard Box",
        cost: 25,
    },
    Cosmetic {
        id: "rayane",
        name: "Rayane",
        cost: 50,
    },
    Cosmetic {
        id: "gold",
        name: "Gold Rush",
        cost: 100,
    },
];

/// Look up a catalog entry
pub fn cosmetic(id: &str) -> Option<&'static Cosmetic> {
    CATALOG.iter().find(|c| c.id == id)
}

/// Why a purchase was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopError {
    #[error("unknown cosmetic `{0}`")]
    Unknown(String),

    #[error("`{0}` is already unlocked")]
    AlreadyUnlocked(String),

    #[error("not enough coins: have {have}, need {need}")]
    InsufficientCoins { have: u64, need: u64 },
}

/// Applies rewards and shop actions to the session, persisting the profile
pub struct ScoreEconomy {
    store: Box<dyn KeyValueStore>,
    /// Fractional time score carried between frames
    time_carry: f32,
}

impl std::fmt::Debug for ScoreEconomy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoreEconomy")
            .field("time_carry", &self.time_carry)
            .finish_non_exhaustive()
    }
}

impl ScoreEconomy {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            time_carry: 0.0,
        }
    }

    /// Read the durable profile from the backing store
    pub fn load_profile(&self) -> PersistedProfile {
        PersistedProfile::load(self.store.as_ref())
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Forget carried fractional score (new run)
    pub fn reset_run(&mut self) {
        self.time_carry = 0.0;
    }

    fn save(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("Failed to persist {}: {}", key, e);
        }
    }

    fn save_coins(&mut self, total: u64) {
        self.save(keys::TOTAL_COINS, &total.to_string());
    }

    /// Survival score: `speed` points per second, whole points only
    ///
    /// The fractional remainder carries into the next frame so the rate does
    /// not depend on frame length.
    pub fn add_time_score(&mut self, session: &mut Session, dt: f32) -> u64 {
        self.time_carry += session.speed * dt;
        let whole = self.time_carry.floor();
        self.time_carry -= whole;
        let points = whole as u64;
        session.score += points;
        points
    }

    /// Reward one dodged obstacle; returns true if it triggered a speed-up
    pub fn award_dodge(&mut self, session: &mut Session, tuning: &Tuning) -> bool {
        session.score += tuning.dodge_points;
        if session.score > 0 && session.score % tuning.speed_up_every == 0 {
            let before = session.speed;
            session.increase_speed(tuning.speed_step);
            log::debug!("Speed {} -> {} at score {}", before, session.speed, session.score);
            return true;
        }
        false
    }

    /// Reward `count` collected pickups (points plus coins)
    pub fn award_pickups(&mut self, session: &mut Session, tuning: &Tuning, count: u32) {
        if count == 0 {
            return;
        }
        let count = count as u64;
        session.score += tuning.pickup_points * count;
        session.coins += tuning.pickup_coins * count;
        session.profile.total_coins += tuning.pickup_coins * count;
        let total = session.profile.total_coins;
        self.save_coins(total);
    }

    pub fn set_player_name(&mut self, session: &mut Session, name: &str) {
        session.profile.player_name = name.to_string();
        self.save(keys::PLAYER_NAME, name);
    }

    /// Buy `id` for `cost` coins
    ///
    /// Refused when the balance is short or the cosmetic is already owned; the
    /// profile is untouched on refusal.
    pub fn purchase(&mut self, session: &mut Session, id: &str, cost: u64) -> Result<(), ShopError> {
        let profile = &mut session.profile;
        if profile.is_unlocked(id) {
            return Err(ShopError::AlreadyUnlocked(id.to_string()));
        }
        if profile.total_coins < cost {
            return Err(ShopError::InsufficientCoins {
                have: profile.total_coins,
                need: cost,
            });
        }

        profile.total_coins -= cost;
        profile.unlocked_characters.push(id.to_string());
        let total = profile.total_coins;
        let unlocked = serde_json::to_string(&profile.unlocked_characters);

        self.save_coins(total);
        match unlocked {
            Ok(json) => self.save(keys::UNLOCKED, &json),
            Err(e) => log::warn!("Failed to encode unlocks: {}", e),
        }
        log::info!("Unlocked {} for {} coins ({} left)", id, cost, total);
        Ok(())
    }

    /// Buy a catalog cosmetic at its listed price
    pub fn purchase_from_catalog(&mut self, session: &mut Session, id: &str) -> Result<(), ShopError> {
        let item = cosmetic(id).ok_or_else(|| ShopError::Unknown(id.to_string()))?;
        self.purchase(session, item.id, item.cost)
    }

    /// Equip an owned cosmetic; no-op (false) when not owned
    pub fn select(&mut self, session: &mut Session, id: &str) -> bool {
        if !session.profile.is_unlocked(id) {
            return false;
        }
        session.profile.current_character = id.to_string();
        self.save(keys::CURRENT, id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{MemoryStore, StoreError};

    fn setup(coins: u64) -> (ScoreEconomy, Session) {
        let economy = ScoreEconomy::new(Box::new(MemoryStore::new()));
        let mut profile = PersistedProfile::default();
        profile.total_coins = coins;
        let mut session = Session::new(&Tuning::default(), profile);
        session.reset_game();
        (economy, session)
    }

    #[test]
    fn test_twenty_dodges_one_speed_up() {
        let tuning = Tuning::default();
        let (mut economy, mut session) = setup(0);
        for n in 1..=19 {
            assert!(!economy.award_dodge(&mut session, &tuning));
            assert_eq!(session.score, n);
            assert_eq!(session.speed, 25.0);
        }
        assert!(economy.award_dodge(&mut session, &tuning));
        assert_eq!(session.score, 20);
        assert_eq!(session.speed, 26.0);
    }

    #[test]
    fn test_speed_up_capped() {
        let tuning = Tuning::default();
        let (mut economy, mut session) = setup(0);
        for _ in 0..20 * 50 {
            economy.award_dodge(&mut session, &tuning);
        }
        assert_eq!(session.score, 1000);
        assert_eq!(session.speed, 60.0);
    }

    #[test]
    fn test_time_score_independent_of_frame_length() {
        let (mut a, mut sa) = setup(0);
        let (mut b, mut sb) = setup(0);
        for _ in 0..60 {
            a.add_time_score(&mut sa, 1.0 / 60.0);
        }
        for _ in 0..8 {
            b.add_time_score(&mut sb, 1.0 / 8.0);
        }
        // 25 points per second either way
        assert!((sa.score as i64 - 25).abs() <= 1);
        assert!((sb.score as i64 - 25).abs() <= 1);
    }

    #[test]
    fn test_pickups_reward_points_and_coins() {
        let tuning = Tuning::default();
        let (mut economy, mut session) = setup(10);
        economy.award_pickups(&mut session, &tuning, 2);
        assert_eq!(session.score, 10);
        assert_eq!(session.coins, 2);
        assert_eq!(session.profile.total_coins, 12);
        assert_eq!(economy.store().get(keys::TOTAL_COINS).as_deref(), Some("12"));
    }

    #[test]
    fn test_purchase_rejected_when_short() {
        let (mut economy, mut session) = setup(49);
        let err = economy.purchase(&mut session, "rayane", 50).unwrap_err();
        assert_eq!(err, ShopError::InsufficientCoins { have: 49, need: 50 });
        assert_eq!(session.profile.total_coins, 49);
        assert!(!session.profile.is_unlocked("rayane"));
        assert!(economy.store().get(keys::UNLOCKED).is_none());
    }

    #[test]
    fn test_purchase_success_persists() {
        let (mut economy, mut session) = setup(75);
        economy.purchase(&mut session, "rayane", 50).unwrap();
        assert_eq!(session.profile.total_coins, 25);
        assert!(session.profile.is_unlocked("rayane"));

        let reloaded = economy.load_profile();
        assert_eq!(reloaded.total_coins, 25);
        assert_eq!(reloaded.unlocked_characters, vec!["default", "rayane"]);
    }

    #[test]
    fn test_purchase_twice_rejected() {
        let (mut economy, mut session) = setup(500);
        economy.purchase_from_catalog(&mut session, "gold").unwrap();
        assert_eq!(
            economy.purchase_from_catalog(&mut session, "gold"),
            Err(ShopError::AlreadyUnlocked("gold".into()))
        );
        assert_eq!(session.profile.total_coins, 400);
        assert!(matches!(
            economy.purchase_from_catalog(&mut session, "dragon"),
            Err(ShopError::Unknown(_))
        ));
    }

    #[test]
    fn test_select_requires_unlock() {
        let (mut economy, mut session) = setup(0);
        assert!(!economy.select(&mut session, "gold"));
        assert_eq!(session.profile.current_character, "default");
        assert!(economy.store().get(keys::CURRENT).is_none());

        session.profile.unlocked_characters.push("gold".into());
        assert!(economy.select(&mut session, "gold"));
        assert_eq!(economy.store().get(keys::CURRENT).as_deref(), Some("gold"));
    }

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_store_failure_does_not_block_gameplay() {
        let tuning = Tuning::default();
        let mut economy = ScoreEconomy::new(Box::new(BrokenStore));
        let mut session = Session::new(&tuning, PersistedProfile::default());
        session.reset_game();
        economy.award_pickups(&mut session, &tuning, 1);
        economy.set_player_name(&mut session, "Ada");
        assert_eq!(session.profile.total_coins, 1);
        assert_eq!(session.profile.player_name, "Ada");
    }
}
