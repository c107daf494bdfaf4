//! In-process score board
//!
//! Implements the service contract directly: validation (400), storage
//! failures (500), and one-time seeding of an empty board.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{LeaderboardError, LeaderboardService, NewScore, ScoreRecord};

/// Longest accepted player name (characters)
pub const MAX_NAME_LEN: usize = 32;

/// Placeholder records for an empty board
pub const SEED_SCORES: [(&str, u64); 3] = [("RunnerPro", 1500), ("SubwayKing", 1200), ("DashMaster", 950)];

#[derive(Debug, Default)]
struct Board {
    records: Vec<ScoreRecord>,
    next_id: u64,
}

impl Board {
    /// Stamp and store an already validated entry
    fn insert(&mut self, entry: NewScore) -> ScoreRecord {
        self.next_id += 1;
        let record = ScoreRecord {
            id: self.next_id,
            player_name: entry.player_name.trim().to_string(),
            score: entry.score,
            created_at: Utc::now(),
        };
        self.records.push(record.clone());
        record
    }
}

/// Score board held in memory
#[derive(Debug, Default)]
pub struct InMemoryLeaderboard {
    board: RwLock<Board>,
    /// Answer every request with a 500
    unavailable: AtomicBool,
    /// Artificial per-request delay
    latency: Option<Duration>,
}

impl InMemoryLeaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every request by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Simulate an outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert the placeholder scores if the board is empty
    ///
    /// Returns whether anything was inserted. The check and the inserts happen
    /// under one write lock, so concurrent callers seed at most once.
    pub async fn seed_if_empty(&self) -> Result<bool, LeaderboardError> {
        self.gate().await?;
        let mut board = self.board.write().await;
        if !board.records.is_empty() {
            return Ok(false);
        }
        for (name, score) in SEED_SCORES {
            board.insert(NewScore {
                player_name: name.to_string(),
                score,
            });
        }
        log::info!("Seeded leaderboard with {} scores", SEED_SCORES.len());
        Ok(true)
    }

    async fn gate(&self) -> Result<(), LeaderboardError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LeaderboardError::Server("score storage unavailable".into()));
        }
        Ok(())
    }
}

/// Check a create request
pub fn validate(entry: &NewScore) -> Result<(), LeaderboardError> {
    let name = entry.player_name.trim();
    if name.is_empty() {
        return Err(LeaderboardError::Validation {
            message: "Name is required".into(),
            field: "playerName".into(),
        });
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LeaderboardError::Validation {
            message: format!("Name must be at most {} characters", MAX_NAME_LEN),
            field: "playerName".into(),
        });
    }
    Ok(())
}

/// Decode a raw JSON request body into a validated `NewScore`
pub fn parse_new_score(body: &str) -> Result<NewScore, LeaderboardError> {
    let value: Value = serde_json::from_str(body).map_err(|e| LeaderboardError::Validation {
        message: format!("Malformed body: {}", e),
        field: String::new(),
    })?;

    let player_name = match value.get("playerName") {
        Some(Value::String(name)) => name.clone(),
        _ => {
            return Err(LeaderboardError::Validation {
                message: "Expected string".into(),
                field: "playerName".into(),
            });
        }
    };
    let score = value
        .get("score")
        .and_then(Value::as_u64)
        .ok_or_else(|| LeaderboardError::Validation {
            message: "Expected a non-negative integer".into(),
            field: "score".into(),
        })?;

    let entry = NewScore { player_name, score };
    validate(&entry)?;
    Ok(entry)
}

impl LeaderboardService for InMemoryLeaderboard {
    async fn list_scores(&self) -> Result<Vec<ScoreRecord>, LeaderboardError> {
        self.gate().await?;
        Ok(self.board.read().await.records.clone())
    }

    async fn create_score(&self, entry: NewScore) -> Result<ScoreRecord, LeaderboardError> {
        self.gate().await?;
        validate(&entry)?;

        let record = self.board.write().await.insert(entry);
        log::info!("Stored score {} for {}", record.score, record.player_name);
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_list() {
        let board = InMemoryLeaderboard::new();
        let created = board
            .create_score(NewScore {
                player_name: "  Ada ".into(),
                score: 77,
            })
            .await
            .unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.player_name, "Ada");

        let all = board.list_scores().await.unwrap();
        assert_eq!(all, vec![created]);
    }

    #[tokio::test]
    async fn test_empty_name_is_400() {
        let board = InMemoryLeaderboard::new();
        let err = board
            .create_score(NewScore {
                player_name: "   ".into(),
                score: 50,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(400));
        assert!(matches!(err, LeaderboardError::Validation { ref field, .. } if field == "playerName"));
        assert!(board.list_scores().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_long_name_rejected() {
        let board = InMemoryLeaderboard::new();
        let err = board
            .create_score(NewScore {
                player_name: "x".repeat(MAX_NAME_LEN + 1),
                score: 1,
            })
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(400));
    }

    #[tokio::test]
    async fn test_outage_is_500() {
        let board = InMemoryLeaderboard::new();
        board.set_unavailable(true);
        let err = board.list_scores().await.unwrap_err();
        assert_eq!(err.status_code(), Some(500));
    }

    #[tokio::test]
    async fn test_seed_once() {
        let board = InMemoryLeaderboard::new();
        assert!(board.seed_if_empty().await.unwrap());
        assert!(!board.seed_if_empty().await.unwrap());
        let names: Vec<String> = board
            .list_scores()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.player_name)
            .collect();
        assert_eq!(names, vec!["RunnerPro", "SubwayKing", "DashMaster"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_seeding_inserts_once() {
        let board = InMemoryLeaderboard::new().with_latency(Duration::from_millis(10));
        let (a, b) = tokio::join!(board.seed_if_empty(), board.seed_if_empty());
        let seeded = [a.unwrap(), b.unwrap()];
        assert_eq!(seeded.iter().filter(|&&s| s).count(), 1);
        assert_eq!(board.list_scores().await.unwrap().len(), SEED_SCORES.len());
    }

    #[tokio::test]
    async fn test_seed_skipped_when_populated() {
        let board = InMemoryLeaderboard::new();
        board
            .create_score(NewScore {
                player_name: "Ada".into(),
                score: 3,
            })
            .await
            .unwrap();
        assert!(!board.seed_if_empty().await.unwrap());
        assert_eq!(board.list_scores().await.unwrap().len(), 1);
    }

    #[test]
    fn test_parse_body() {
        let ok = parse_new_score(r#"{"playerName":"Ada","score":12}"#).unwrap();
        assert_eq!(ok.score, 12);

        let neg = parse_new_score(r#"{"playerName":"Ada","score":-3}"#).unwrap_err();
        assert!(matches!(neg, LeaderboardError::Validation { ref field, .. } if field == "score"));

        let empty = parse_new_score(r#"{"playerName":"","score":50}"#).unwrap_err();
        assert!(matches!(empty, LeaderboardError::Validation { ref field, .. } if field == "playerName"));

        let junk = parse_new_score("{").unwrap_err();
        assert_eq!(junk.status_code(), Some(400));
    }
}
