//! Online score board
//!
//! The board itself is a remote service (`LeaderboardService`). The client
//! owns ranking: records come back unordered, and `Leaderboard` sorts them
//! descending and keeps the top 100.

mod memory;
mod submit;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::{InMemoryLeaderboard, MAX_NAME_LEN, SEED_SCORES, parse_new_score};
pub use submit::{PendingSubmission, SubmitError, begin_submission, finish_submission, send, submit_score};

/// Maximum number of entries shown
pub const MAX_LEADERBOARD: usize = 100;

/// How long a submission may take before it is reported as failed
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(10);

/// A stored score (immutable once created)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub id: u64,
    pub player_name: String,
    pub score: u64,
    pub created_at: DateTime<Utc>,
}

/// Body of a create request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScore {
    pub player_name: String,
    pub score: u64,
}

/// Error body returned alongside a 4xx/5xx
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Failures talking to the score board
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaderboardError {
    /// 400: the payload was rejected
    #[error("{message}")]
    Validation { message: String, field: String },

    /// 500: the service failed
    #[error("server error: {0}")]
    Server(String),

    /// The request never completed
    #[error("network error: {0}")]
    Transport(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl LeaderboardError {
    /// HTTP status this error corresponds to, if it came from the service
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LeaderboardError::Validation { .. } => Some(400),
            LeaderboardError::Server(_) => Some(500),
            LeaderboardError::Transport(_) | LeaderboardError::Timeout(_) => None,
        }
    }

    /// Wire-format error body
    pub fn body(&self) -> ErrorBody {
        match self {
            LeaderboardError::Validation { message, field } => ErrorBody {
                message: message.clone(),
                field: Some(field.clone()),
            },
            other => ErrorBody {
                message: other.to_string(),
                field: None,
            },
        }
    }
}

/// The remote score board: list everything, create one record
pub trait LeaderboardService: Send + Sync {
    /// `GET /scores` (order unspecified)
    fn list_scores(&self) -> impl Future<Output = Result<Vec<ScoreRecord>, LeaderboardError>> + Send;

    /// `POST /scores`, answering 201 with the stored record
    fn create_score(
        &self,
        entry: NewScore,
    ) -> impl Future<Output = Result<ScoreRecord, LeaderboardError>> + Send;
}

/// Ranked view of the board
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    /// Highest first, at most `MAX_LEADERBOARD`
    pub entries: Vec<ScoreRecord>,
}

impl Leaderboard {
    /// Rank raw records: score descending, earlier submissions first on ties
    pub fn from_records(mut records: Vec<ScoreRecord>) -> Self {
        records.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        records.truncate(MAX_LEADERBOARD);
        Self { entries: records }
    }

    /// Fetch and rank the current board
    pub async fn fetch<S: LeaderboardService>(service: &S) -> Result<Self, LeaderboardError> {
        let records = service.list_scores().await?;
        log::debug!("Fetched {} scores", records.len());
        Ok(Self::from_records(records))
    }

    /// Check if a score would appear on the board
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_LEADERBOARD {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Position (1-based) a new score would take, None if it would not show
    pub fn rank_for(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.entries.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }
}

/// Human-friendly age of a record relative to `now`
pub fn format_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(created_at);
    let days = age.num_days();
    let hours = age.num_hours();
    let mins = age.num_minutes();

    if days >= 7 {
        created_at.format("%-m/%-d/%y").to_string()
    } else if days > 1 {
        format!("{} days ago", days)
    } else if days == 1 {
        "Yesterday".to_string()
    } else if hours > 1 {
        format!("{} hours ago", hours)
    } else if hours == 1 {
        "1 hour ago".to_string()
    } else if mins > 1 {
        format!("{} mins ago", mins)
    } else if mins == 1 {
        "1 min ago".to_string()
    } else {
        "Just now".to_string()
    }
}
