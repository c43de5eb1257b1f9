//! One submit round trip: slip → collaborator → slip.

use crate::client::{MatchCatalogClient, WagerSubmissionClient};
use crate::dto::{Receipt, Session};
use crate::error::{ClientError, PlacementError};
use crate::slip::WagerSlipEngine;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetch a fresh snapshot of `match_id` and open an empty slip on it.
pub async fn open_slip<C>(catalog: &C, match_id: &str) -> Result<WagerSlipEngine, ClientError>
where
    C: MatchCatalogClient + ?Sized,
{
    let snapshot = catalog.fetch_match(match_id).await?;
    Ok(WagerSlipEngine::new(Arc::new(snapshot)))
}

/// Build the slip's request, submit it and record the result on the slip.
///
/// Slip validation errors are returned before anything is sent and leave
/// the slip untouched. A submission error moves the slip to `Failed`; the
/// caller decides whether to `reset` and try again.
pub async fn submit_slip<S>(
    engine: &mut WagerSlipEngine,
    submitter: &S,
    session: &Session,
) -> Result<Receipt, PlacementError>
where
    S: WagerSubmissionClient + ?Sized,
{
    let request = engine.build_request()?;

    match submitter.submit(session, &request).await {
        Ok(receipt) => {
            engine.mark_confirmed()?;
            info!(
                "User {} placed wager {} on match {}",
                session.user_id, receipt.wager_id, request.match_id
            );
            Ok(receipt)
        }
        Err(err) => {
            warn!(
                "Submission of wager {} failed: {}",
                request.idempotency_key, err
            );
            engine.mark_failed(err.to_string())?;
            Err(PlacementError::Submit(err))
        }
    }
}
