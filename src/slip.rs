//! The wager slip: outcome selection, stake entry, payout math and request
//! construction for one user's in-progress bet.
//!
//! The engine performs no I/O. It hands a frozen [`WagerRequest`] to whoever
//! talks to the submission service and is told the result afterwards through
//! [`WagerSlipEngine::mark_confirmed`] or [`WagerSlipEngine::mark_failed`].
//!
//! ```
//! use fanclash_rs::dto::{MatchOdds, Outcome};
//! use fanclash_rs::slip::WagerSlipEngine;
//! use rust_decimal::Decimal;
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! # fn main() -> anyhow::Result<()> {
//! let odds = BTreeMap::from([
//!     (Outcome::Home, Decimal::new(210, 2)),
//!     (Outcome::Away, Decimal::new(350, 2)),
//! ]);
//! let kickoff = chrono::Utc::now() + chrono::Duration::hours(2);
//! let snapshot = Arc::new(MatchOdds::new("m-1", "Arsenal", "Chelsea", odds, kickoff)?);
//!
//! let mut slip = WagerSlipEngine::new(snapshot);
//! slip.select_outcome(Outcome::Home)?;
//! slip.set_stake(Decimal::new(50, 0), Decimal::new(500, 0))?;
//! assert_eq!(slip.potential_payout().to_string(), "105.00");
//!
//! let request = slip.build_request()?;
//! assert_eq!(request.odds_at_submission, Decimal::new(210, 2));
//! # Ok(())
//! # }
//! ```

use crate::dto::{MatchOdds, Outcome, WagerRequest};
use crate::error::{MissingField, SlipError, StakeRejection};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Decimal places carried by stakes and payouts.
const MONEY_SCALE: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "camelCase")]
pub enum SlipStatus {
    Editing,
    Submitting,
    Confirmed,
    Failed(String),
}

impl fmt::Display for SlipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlipStatus::Editing => write!(f, "editing"),
            SlipStatus::Submitting => write!(f, "submitting"),
            SlipStatus::Confirmed => write!(f, "confirmed"),
            SlipStatus::Failed(_) => write!(f, "failed"),
        }
    }
}

/// Mutable part of a slip, owned by a single UI session.
#[derive(Debug, Clone)]
pub struct WagerSlipState {
    pub match_odds: Arc<MatchOdds>,
    pub selected_outcome: Option<Outcome>,
    pub stake: Decimal,
    pub status: SlipStatus,
}

/// Read-only projection of a slip for view layers to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipView {
    pub match_id: String,
    pub home_team: String,
    pub away_team: String,
    pub selected_outcome: Option<Outcome>,
    #[serde(with = "crate::dto::decimal_serde")]
    pub stake: Decimal,
    #[serde(with = "crate::dto::decimal_serde::option")]
    pub odds: Option<Decimal>,
    #[serde(with = "crate::dto::decimal_serde")]
    pub potential_payout: Decimal,
    pub status: SlipStatus,
}

#[derive(Debug)]
pub struct WagerSlipEngine {
    state: WagerSlipState,
    pending: Option<WagerRequest>,
}

impl WagerSlipEngine {
    /// Open an empty slip on `match_odds`.
    pub fn new(match_odds: Arc<MatchOdds>) -> Self {
        debug!("Opening slip for match {}", match_odds.match_id());
        Self {
            state: WagerSlipState {
                match_odds,
                selected_outcome: None,
                stake: Decimal::ZERO,
                status: SlipStatus::Editing,
            },
            pending: None,
        }
    }

    pub fn state(&self) -> &WagerSlipState {
        &self.state
    }

    pub fn status(&self) -> &SlipStatus {
        &self.state.status
    }

    pub fn match_odds(&self) -> &Arc<MatchOdds> {
        &self.state.match_odds
    }

    pub fn selected_outcome(&self) -> Option<Outcome> {
        self.state.selected_outcome
    }

    pub fn stake(&self) -> Decimal {
        self.state.stake
    }

    /// The request frozen by the last successful [`Self::build_request`].
    ///
    /// Resending it unchanged reuses its idempotency key.
    pub fn pending_request(&self) -> Option<&WagerRequest> {
        self.pending.as_ref()
    }

    pub fn select_outcome(&mut self, outcome: Outcome) -> Result<(), SlipError> {
        self.require_editing("select an outcome")?;

        if self.state.match_odds.odds_for(outcome).is_none() {
            return Err(SlipError::InvalidOutcome {
                match_id: self.state.match_odds.match_id().to_string(),
                outcome,
            });
        }

        debug!(
            "Slip for match {} selected '{}'",
            self.state.match_odds.match_id(),
            outcome
        );
        self.state.selected_outcome = Some(outcome);
        Ok(())
    }

    /// Set the stake, bounded by `max` (the caller's available balance).
    pub fn set_stake(&mut self, amount: Decimal, max: Decimal) -> Result<(), SlipError> {
        self.require_editing("set the stake")?;

        let reason = if amount <= Decimal::ZERO {
            Some(StakeRejection::NotPositive)
        } else if amount > max {
            Some(StakeRejection::ExceedsMaximum(max))
        } else if !payout_fits(amount, &self.state.match_odds) {
            Some(StakeRejection::PayoutOverflow)
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(SlipError::InvalidStake { amount, reason });
        }

        self.state.stake = amount;
        Ok(())
    }

    /// `stake × odds` of the selected outcome, rounded half-up to cents.
    ///
    /// The result always carries two decimal places, so identical inputs
    /// render identically.
    ///
    /// Once a request is built the frozen `odds_at_submission` is used, so
    /// later snapshot refreshes do not move the quoted payout.
    pub fn potential_payout(&self) -> Decimal {
        match self.effective_odds() {
            // set_stake and refresh_match reject stakes whose payout overflows
            Some(odds) if !self.state.stake.is_zero() => payout(self.state.stake, odds)
                .unwrap_or_else(|| Decimal::new(0, MONEY_SCALE)),
            _ => Decimal::new(0, MONEY_SCALE),
        }
    }

    fn effective_odds(&self) -> Option<Decimal> {
        match &self.pending {
            Some(request) => Some(request.odds_at_submission),
            None => self
                .state
                .selected_outcome
                .and_then(|outcome| self.state.match_odds.odds_for(outcome)),
        }
    }

    pub fn build_request(&mut self) -> Result<WagerRequest, SlipError> {
        self.build_request_at(Utc::now())
    }

    /// Freeze the slip into a [`WagerRequest`] as of `now` and move to
    /// `Submitting`.
    pub fn build_request_at(&mut self, now: DateTime<Utc>) -> Result<WagerRequest, SlipError> {
        self.require_editing("build a request")?;

        let snapshot = &self.state.match_odds;
        if !snapshot.is_open_at(now) {
            return Err(SlipError::MatchClosed {
                match_id: snapshot.match_id().to_string(),
                start_time: snapshot.start_time(),
            });
        }

        let outcome = self
            .state
            .selected_outcome
            .ok_or(SlipError::SlipIncomplete(MissingField::Outcome))?;
        if self.state.stake <= Decimal::ZERO {
            return Err(SlipError::SlipIncomplete(MissingField::Stake));
        }
        // A refresh clears selections the snapshot no longer offers.
        let odds = snapshot
            .odds_for(outcome)
            .ok_or(SlipError::SlipIncomplete(MissingField::Outcome))?;

        let request = WagerRequest {
            match_id: snapshot.match_id().to_string(),
            outcome,
            stake: self.state.stake,
            odds_at_submission: odds,
            idempotency_key: Uuid::new_v4().to_string(),
        };

        info!(
            "Built wager {} on match {}: {} @ {} on '{}'",
            request.idempotency_key, request.match_id, request.stake, odds, outcome
        );
        self.state.status = SlipStatus::Submitting;
        self.pending = Some(request.clone());
        Ok(request)
    }

    pub fn mark_confirmed(&mut self) -> Result<(), SlipError> {
        self.require_submitting("mark confirmed")?;
        info!(
            "Wager confirmed for match {}",
            self.state.match_odds.match_id()
        );
        self.state.status = SlipStatus::Confirmed;
        Ok(())
    }

    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), SlipError> {
        self.require_submitting("mark failed")?;
        let reason = reason.into();
        warn!(
            "Wager failed for match {}: {}",
            self.state.match_odds.match_id(),
            reason
        );
        self.state.status = SlipStatus::Failed(reason);
        Ok(())
    }

    /// Start over from a finished slip. Only valid once the previous
    /// submission was confirmed or failed.
    pub fn reset(&mut self) -> Result<(), SlipError> {
        match self.state.status {
            SlipStatus::Confirmed | SlipStatus::Failed(_) => {}
            _ => return Err(self.invalid_state("reset")),
        }

        debug!("Resetting slip for match {}", self.state.match_odds.match_id());
        self.state.selected_outcome = None;
        self.state.stake = Decimal::ZERO;
        self.state.status = SlipStatus::Editing;
        self.pending = None;
        Ok(())
    }

    /// Swap in a newer snapshot of the same match.
    ///
    /// Requests that were already built keep their frozen odds, and the
    /// selection only changes while the slip is still being edited.
    pub fn refresh_match(&mut self, snapshot: Arc<MatchOdds>) -> Result<(), SlipError> {
        if snapshot.match_id() != self.state.match_odds.match_id() {
            return Err(SlipError::MatchMismatch {
                expected: self.state.match_odds.match_id().to_string(),
                actual: snapshot.match_id().to_string(),
            });
        }

        if self.state.status == SlipStatus::Editing {
            if !self.state.stake.is_zero() && !payout_fits(self.state.stake, &snapshot) {
                return Err(SlipError::InvalidStake {
                    amount: self.state.stake,
                    reason: StakeRejection::PayoutOverflow,
                });
            }

            if let Some(outcome) = self.state.selected_outcome {
                if snapshot.odds_for(outcome).is_none() {
                    debug!(
                        "Outcome '{}' withdrawn from match {}, clearing selection",
                        outcome,
                        snapshot.match_id()
                    );
                    self.state.selected_outcome = None;
                }
            }
        }

        self.state.match_odds = snapshot;
        Ok(())
    }

    pub fn view(&self) -> SlipView {
        let snapshot = &self.state.match_odds;
        SlipView {
            match_id: snapshot.match_id().to_string(),
            home_team: snapshot.home_team().to_string(),
            away_team: snapshot.away_team().to_string(),
            selected_outcome: self.state.selected_outcome,
            stake: self.state.stake,
            odds: self.effective_odds(),
            potential_payout: self.potential_payout(),
            status: self.state.status.clone(),
        }
    }

    fn require_editing(&self, operation: &'static str) -> Result<(), SlipError> {
        match self.state.status {
            SlipStatus::Editing => Ok(()),
            _ => Err(self.invalid_state(operation)),
        }
    }

    fn require_submitting(&self, operation: &'static str) -> Result<(), SlipError> {
        match self.state.status {
            SlipStatus::Submitting => Ok(()),
            _ => Err(self.invalid_state(operation)),
        }
    }

    fn invalid_state(&self, operation: &'static str) -> SlipError {
        SlipError::InvalidState {
            operation,
            status: self.state.status.clone(),
        }
    }
}

/// Round-half-up payout for a stake at decimal odds.
///
/// `None` when the product, carried to two decimal places, does not fit in
/// a [`Decimal`].
pub fn payout(stake: Decimal, odds: Decimal) -> Option<Decimal> {
    let rounded = stake
        .checked_mul(odds)?
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    // Two places must still be representable after rescaling
    rounded.checked_mul(Decimal::ONE_HUNDRED)?;

    let mut value = rounded;
    value.rescale(MONEY_SCALE);
    Some(value)
}

/// Whether `stake` pays out without overflow on every outcome of `snapshot`.
fn payout_fits(stake: Decimal, snapshot: &MatchOdds) -> bool {
    snapshot
        .odds()
        .values()
        .max()
        .map_or(true, |odds| payout(stake, *odds).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payout_rounds_half_up() {
        assert_eq!(payout(dec!(0.05), dec!(1.5)).unwrap().to_string(), "0.08");
        assert_eq!(payout(dec!(1.01), dec!(1.5)).unwrap().to_string(), "1.52");
        assert_eq!(payout(dec!(3), dec!(1.333)).unwrap().to_string(), "4.00");
        assert_eq!(payout(dec!(10.005), dec!(2)).unwrap().to_string(), "20.01");
    }

    #[test]
    fn test_payout_always_has_two_places() {
        assert_eq!(payout(dec!(50), dec!(2)).unwrap().to_string(), "100.00");
        assert_eq!(payout(dec!(50), dec!(2.10)).unwrap().to_string(), "105.00");
    }

    #[test]
    fn test_payout_overflow_is_reported() {
        assert_eq!(payout(Decimal::MAX.trunc(), dec!(2.0)), None);
        // Fits as an integer but not with two decimal places
        assert_eq!(payout(Decimal::MAX.trunc(), dec!(1.0)), None);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(SlipStatus::Editing.to_string(), "editing");
        assert_eq!(SlipStatus::Failed("timeout".into()).to_string(), "failed");
    }
}
