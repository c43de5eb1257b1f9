use crate::error::SnapshotError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Home,
    Away,
    Draw,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Home => "home",
            Outcome::Away => "away",
            Outcome::Draw => "draw",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "home" => Ok(Outcome::Home),
            "away" => Ok(Outcome::Away),
            "draw" => Ok(Outcome::Draw),
            other => Err(format!("unknown outcome '{other}'")),
        }
    }
}

/// Wire shape of a catalog match, validated into [`MatchOdds`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchOddsPayload {
    match_id: String,
    home_team: String,
    away_team: String,
    #[serde(with = "super::decimal_serde::map")]
    odds: BTreeMap<Outcome, Decimal>,
    start_time: DateTime<Utc>,
}

/// Immutable odds snapshot for one wagerable match.
///
/// Fields are private so a snapshot can only exist in a validated form:
/// both team names non-empty, at least one outcome, every multiplier above 1.0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MatchOddsPayload", into = "MatchOddsPayload")]
pub struct MatchOdds {
    match_id: String,
    home_team: String,
    away_team: String,
    odds: BTreeMap<Outcome, Decimal>,
    start_time: DateTime<Utc>,
}

impl MatchOdds {
    pub fn new(
        match_id: impl Into<String>,
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        odds: BTreeMap<Outcome, Decimal>,
        start_time: DateTime<Utc>,
    ) -> Result<Self, SnapshotError> {
        let match_id = match_id.into();
        let home_team = home_team.into();
        let away_team = away_team.into();

        if home_team.trim().is_empty() {
            return Err(SnapshotError::EmptyTeamName {
                match_id,
                side: "home",
            });
        }
        if away_team.trim().is_empty() {
            return Err(SnapshotError::EmptyTeamName {
                match_id,
                side: "away",
            });
        }
        if odds.is_empty() {
            return Err(SnapshotError::NoOdds { match_id });
        }
        if let Some((&outcome, &value)) = odds.iter().find(|(_, v)| **v <= Decimal::ONE) {
            return Err(SnapshotError::OddsTooLow {
                match_id,
                outcome,
                odds: value,
            });
        }

        Ok(Self {
            match_id,
            home_team,
            away_team,
            odds,
            start_time,
        })
    }

    pub fn match_id(&self) -> &str {
        &self.match_id
    }

    pub fn home_team(&self) -> &str {
        &self.home_team
    }

    pub fn away_team(&self) -> &str {
        &self.away_team
    }

    pub fn odds(&self) -> &BTreeMap<Outcome, Decimal> {
        &self.odds
    }

    /// Multiplier for `outcome`, `None` when the match does not offer it.
    pub fn odds_for(&self, outcome: Outcome) -> Option<Decimal> {
        self.odds.get(&outcome).copied()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now < self.start_time
    }
}

impl TryFrom<MatchOddsPayload> for MatchOdds {
    type Error = SnapshotError;

    fn try_from(payload: MatchOddsPayload) -> Result<Self, Self::Error> {
        MatchOdds::new(
            payload.match_id,
            payload.home_team,
            payload.away_team,
            payload.odds,
            payload.start_time,
        )
    }
}

impl From<MatchOdds> for MatchOddsPayload {
    fn from(snapshot: MatchOdds) -> Self {
        Self {
            match_id: snapshot.match_id,
            home_team: snapshot.home_team,
            away_team: snapshot.away_team,
            odds: snapshot.odds,
            start_time: snapshot.start_time,
        }
    }
}
