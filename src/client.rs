//! Seams between the slip engine and the services it depends on.

use crate::dto::{MatchOdds, Receipt, Session, WagerRequest};
use crate::error::ClientError;
use async_trait::async_trait;

/// Source of match and odds snapshots.
#[async_trait]
pub trait MatchCatalogClient: Send + Sync {
    async fn fetch_match(&self, match_id: &str) -> Result<MatchOdds, ClientError>;

    async fn list_matches(&self) -> Result<Vec<MatchOdds>, ClientError>;
}

/// Accepts finished wagers on behalf of `session`.
///
/// Implementations may resend a request as often as they like; the
/// `idempotency_key` lets the service drop duplicates.
#[async_trait]
pub trait WagerSubmissionClient: Send + Sync {
    async fn submit(
        &self,
        session: &Session,
        request: &WagerRequest,
    ) -> Result<Receipt, ClientError>;
}
