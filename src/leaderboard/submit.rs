//! Game-over score submission
//!
//! Three stages so the host can keep drawing while the request is in flight:
//! `begin_submission` (GameOver -> Submitting), `send` (the async request),
//! `finish_submission` (-> Menu on success, back to GameOver on failure).
//! There is no automatic retry and no cancellation.

use std::time::Duration;

use super::{LeaderboardError, LeaderboardService, NewScore, ScoreRecord};
use crate::sim::{GameStatus, Session};

/// Why a submission could not go ahead or did not succeed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("scores can only be submitted after a run ends (currently {0:?})")]
    NotGameOver(GameStatus),

    #[error("a score above zero is needed to submit")]
    NothingToSubmit,

    #[error(transparent)]
    Rejected(#[from] LeaderboardError),
}

/// A request that has moved the session into `Submitting`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub entry: NewScore,
}

/// Move the session into `Submitting` and build the request
pub fn begin_submission(session: &mut Session, player_name: &str) -> Result<PendingSubmission, SubmitError> {
    if session.status != GameStatus::GameOver {
        return Err(SubmitError::NotGameOver(session.status));
    }
    if session.score == 0 {
        return Err(SubmitError::NothingToSubmit);
    }
    session.begin_submission();
    Ok(PendingSubmission {
        entry: NewScore {
            player_name: player_name.trim().to_string(),
            score: session.score,
        },
    })
}

/// Perform the request, failing with `Timeout` if it takes longer than `timeout`
pub async fn send<S: LeaderboardService>(
    service: &S,
    pending: PendingSubmission,
    timeout: Duration,
) -> Result<ScoreRecord, LeaderboardError> {
    match tokio::time::timeout(timeout, service.create_score(pending.entry)).await {
        Ok(result) => result,
        Err(_) => Err(LeaderboardError::Timeout(timeout)),
    }
}

/// Apply the request outcome to the session
pub fn finish_submission(session: &mut Session, result: &Result<ScoreRecord, LeaderboardError>) {
    let outcome = match result {
        Ok(record) => {
            log::info!("Submitted score {} as #{}", record.score, record.id);
            Ok(())
        }
        Err(e) => Err(e.to_string()),
    };
    session.finish_submission(outcome);
}

/// Submit the session's score end to end
pub async fn submit_score<S: LeaderboardService>(
    session: &mut Session,
    service: &S,
    player_name: &str,
    timeout: Duration,
) -> Result<ScoreRecord, SubmitError> {
    let pending = begin_submission(session, player_name)?;
    let result = send(service, pending, timeout).await;
    finish_submission(session, &result);
    result.map_err(SubmitError::from)
}
