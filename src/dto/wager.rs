use super::Outcome;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Frozen submission payload built from a complete slip.
///
/// `odds_at_submission` is copied out of the snapshot when the request is
/// built; later odds refreshes never touch it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WagerRequest {
    pub match_id: String,
    pub outcome: Outcome,
    #[serde(with = "super::decimal_serde")]
    pub stake: Decimal,
    #[serde(with = "super::decimal_serde")]
    pub odds_at_submission: Decimal,
    pub idempotency_key: String,
}

/*
{"wagerId":"w-8841","acceptedAt":"2026-10-17T12:00:00Z"}
*/
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub wager_id: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub accepted_at: Option<DateTime<Utc>>,
}
