//! Durable player profile

use serde::{Deserialize, Serialize};

use super::KeyValueStore;

/// Cosmetic every profile owns
pub const DEFAULT_CHARACTER: &str = "default";

/// Storage keys
pub mod keys {
    pub const PLAYER_NAME: &str = "runner_name";
    pub const TOTAL_COINS: &str = "runner_coins";
    /// JSON array of cosmetic ids
    pub const UNLOCKED: &str = "runner_chars";
    pub const CURRENT: &str = "runner_current_char";
}

/// Name, coin balance and cosmetics, carried across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedProfile {
    pub player_name: String,
    pub total_coins: u64,
    /// Unlock order preserved; always contains `DEFAULT_CHARACTER`
    pub unlocked_characters: Vec<String>,
    pub current_character: String,
}

impl Default for PersistedProfile {
    fn default() -> Self {
        Self {
            player_name: String::new(),
            total_coins: 0,
            unlocked_characters: vec![DEFAULT_CHARACTER.to_string()],
            current_character: DEFAULT_CHARACTER.to_string(),
        }
    }
}

impl PersistedProfile {
    /// Read the profile, replacing any missing or malformed field with its default
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let mut profile = Self::default();

        if let Some(name) = store.get(keys::PLAYER_NAME) {
            profile.player_name = name;
        }

        if let Some(raw) = store.get(keys::TOTAL_COINS) {
            match raw.trim().parse::<u64>() {
                Ok(coins) => profile.total_coins = coins,
                Err(_) => log::warn!("Stored coin balance {:?} is corrupt, using 0", raw),
            }
        }

        if let Some(raw) = store.get(keys::UNLOCKED) {
            match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => {
                    let mut unique = vec![DEFAULT_CHARACTER.to_string()];
                    for id in ids {
                        if !unique.contains(&id) {
                            unique.push(id);
                        }
                    }
                    profile.unlocked_characters = unique;
                }
                Err(e) => log::warn!("Stored unlocks are corrupt ({}), using defaults", e),
            }
        }

        if let Some(current) = store.get(keys::CURRENT) {
            if profile.is_unlocked(&current) {
                profile.current_character = current;
            } else {
                log::warn!("Stored cosmetic {:?} is not unlocked, using default", current);
            }
        }

        profile
    }

    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked_characters.iter().any(|c| c == id)
    }
}
