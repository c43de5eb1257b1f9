use crate::dto::Outcome;
use crate::slip::SlipStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// Rejections raised by [`crate::slip::WagerSlipEngine`].
///
/// Every variant is local and recoverable: the slip is left exactly as it
/// was before the failing call, and the caller re-prompts the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlipError {
    #[error("outcome '{outcome}' is not offered for match {match_id}")]
    InvalidOutcome { match_id: String, outcome: Outcome },

    #[error("invalid stake {amount}: {reason}")]
    InvalidStake { amount: Decimal, reason: StakeRejection },

    #[error("cannot {operation} while slip is {status}")]
    InvalidState {
        operation: &'static str,
        status: SlipStatus,
    },

    #[error("slip is incomplete: {0}")]
    SlipIncomplete(MissingField),

    #[error("match {match_id} closed for wagers at {start_time}")]
    MatchClosed {
        match_id: String,
        start_time: DateTime<Utc>,
    },

    #[error("snapshot for match {actual} cannot replace match {expected}")]
    MatchMismatch { expected: String, actual: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakeRejection {
    NotPositive,
    ExceedsMaximum(Decimal),
    PayoutOverflow,
}

impl std::fmt::Display for StakeRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StakeRejection::NotPositive => write!(f, "stake must be greater than zero"),
            StakeRejection::ExceedsMaximum(max) => write!(f, "stake exceeds available {max}"),
            StakeRejection::PayoutOverflow => write!(f, "potential payout is too large"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Outcome,
    Stake,
}

impl std::fmt::Display for MissingField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingField::Outcome => write!(f, "no outcome selected"),
            MissingField::Stake => write!(f, "no stake entered"),
        }
    }
}

/// Invalid match data handed to [`crate::dto::MatchOdds::new`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("match {match_id} has an empty {side} team name")]
    EmptyTeamName {
        match_id: String,
        side: &'static str,
    },

    #[error("match {match_id} offers no outcomes")]
    NoOdds { match_id: String },

    #[error("match {match_id} quotes {odds} for '{outcome}', odds must exceed 1.0")]
    OddsTooLow {
        match_id: String,
        outcome: Outcome,
        odds: Decimal,
    },
}

/// Failures reported by the catalog and submission collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Connection(_) => true,
            ClientError::Rejected { status, .. } => *status == 429 || *status >= 500,
            ClientError::NotFound(_)
            | ClientError::Decode(_)
            | ClientError::InvalidRequest(_) => false,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Connection(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Outcome of [`crate::placement::submit_slip`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlacementError {
    #[error(transparent)]
    Slip(#[from] SlipError),

    #[error("wager submission failed: {0}")]
    Submit(#[from] ClientError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Connection("reset".into()).is_transient());
        assert!(ClientError::Rejected {
            status: 503,
            body: String::new()
        }
        .is_transient());
        assert!(ClientError::Rejected {
            status: 429,
            body: String::new()
        }
        .is_transient());
        assert!(!ClientError::Rejected {
            status: 409,
            body: String::new()
        }
        .is_transient());
        assert!(!ClientError::NotFound("m-1".into()).is_transient());
        assert!(!ClientError::Decode("eof".into()).is_transient());
        assert!(!ClientError::InvalidRequest("bad header".into()).is_transient());
    }

    #[test]
    fn test_stake_error_message() {
        let err = SlipError::InvalidStake {
            amount: Decimal::new(150, 0),
            reason: StakeRejection::ExceedsMaximum(Decimal::new(100, 0)),
        };
        assert_eq!(err.to_string(), "invalid stake 150: stake exceeds available 100");

        let err = SlipError::InvalidStake {
            amount: Decimal::MAX,
            reason: StakeRejection::PayoutOverflow,
        };
        assert!(err.to_string().ends_with("potential payout is too large"));
    }
}
