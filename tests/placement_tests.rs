use async_trait::async_trait;
use chrono::{Duration, Utc};
use fanclash_rs::error::MissingField;
use fanclash_rs::placement::{open_slip, submit_slip};
use fanclash_rs::{
    ClientError, MatchCatalogClient, MatchOdds, Outcome, PlacementError, Receipt, Session,
    SlipError, SlipStatus, WagerRequest, WagerSubmissionClient,
};
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tokio_test::{assert_err, assert_ok};

struct StaticCatalog {
    matches: HashMap<String, MatchOdds>,
}

impl StaticCatalog {
    fn with_match(snapshot: MatchOdds) -> Self {
        Self {
            matches: HashMap::from([(snapshot.match_id().to_string(), snapshot)]),
        }
    }
}

#[async_trait]
impl MatchCatalogClient for StaticCatalog {
    async fn fetch_match(&self, match_id: &str) -> Result<MatchOdds, ClientError> {
        self.matches
            .get(match_id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("match {match_id}")))
    }

    async fn list_matches(&self) -> Result<Vec<MatchOdds>, ClientError> {
        Ok(self.matches.values().cloned().collect())
    }
}

/// Records every request and answers with the queued results in order.
struct ScriptedSubmitter {
    responses: Mutex<Vec<Result<Receipt, ClientError>>>,
    seen: Mutex<Vec<(String, WagerRequest)>>,
}

impl ScriptedSubmitter {
    fn new(mut responses: Vec<Result<Receipt, ClientError>>) -> Self {
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<(String, WagerRequest)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl WagerSubmissionClient for ScriptedSubmitter {
    async fn submit(
        &self,
        session: &Session,
        request: &WagerRequest,
    ) -> Result<Receipt, ClientError> {
        self.seen
            .lock()
            .unwrap()
            .push((session.user_id.clone(), request.clone()));
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(ClientError::Connection("no scripted response".into())))
    }
}

fn open_match() -> MatchOdds {
    MatchOdds::new(
        "m-1",
        "Arsenal",
        "Chelsea",
        BTreeMap::from([(Outcome::Home, dec!(2.10)), (Outcome::Away, dec!(3.50))]),
        Utc::now() + Duration::hours(2),
    )
    .unwrap()
}

fn receipt(id: &str) -> Receipt {
    Receipt {
        wager_id: id.to_string(),
        accepted_at: None,
    }
}

#[tokio::test]
async fn test_open_slip_from_catalog() {
    let catalog = StaticCatalog::with_match(open_match());

    let slip = assert_ok!(open_slip(&catalog, "m-1").await);
    assert_eq!(slip.match_odds().home_team(), "Arsenal");
    assert_eq!(slip.status(), &SlipStatus::Editing);
}

#[tokio::test]
async fn test_open_slip_without_snapshot_fails() {
    let catalog = StaticCatalog::with_match(open_match());

    let err = assert_err!(open_slip(&catalog, "m-404").await);
    assert_eq!(err, ClientError::NotFound("match m-404".to_string()));
}

#[tokio::test]
async fn test_successful_submission_confirms_slip() {
    let catalog = StaticCatalog::with_match(open_match());
    let submitter = ScriptedSubmitter::new(vec![Ok(receipt("w-1"))]);
    let session = Session::new("u-7");

    let mut slip = open_slip(&catalog, "m-1").await.unwrap();
    slip.select_outcome(Outcome::Away).unwrap();
    slip.set_stake(dec!(20), dec!(100)).unwrap();

    let placed = submit_slip(&mut slip, &submitter, &session).await.unwrap();

    assert_eq!(placed.wager_id, "w-1");
    assert_eq!(slip.status(), &SlipStatus::Confirmed);

    let seen = submitter.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "u-7");
    assert_eq!(seen[0].1.odds_at_submission, dec!(3.50));
    assert_eq!(Some(&seen[0].1), slip.pending_request());
}

#[tokio::test]
async fn test_failed_submission_marks_slip_failed() {
    let catalog = StaticCatalog::with_match(open_match());
    let submitter = ScriptedSubmitter::new(vec![Err(ClientError::Rejected {
        status: 409,
        body: "insufficient funds".into(),
    })]);
    let session = Session::new("u-7");

    let mut slip = open_slip(&catalog, "m-1").await.unwrap();
    slip.select_outcome(Outcome::Home).unwrap();
    slip.set_stake(dec!(20), dec!(100)).unwrap();

    let err = submit_slip(&mut slip, &submitter, &session)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlacementError::Submit(ClientError::Rejected { status: 409, .. })
    ));
    match slip.status() {
        SlipStatus::Failed(reason) => assert!(reason.contains("insufficient funds")),
        other => panic!("expected failed slip, got {other}"),
    }
}

#[tokio::test]
async fn test_retry_after_failure_uses_new_key() {
    let catalog = StaticCatalog::with_match(open_match());
    let submitter = ScriptedSubmitter::new(vec![
        Err(ClientError::Connection("reset by peer".into())),
        Ok(receipt("w-2")),
    ]);
    let session = Session::new("u-7");

    let mut slip = open_slip(&catalog, "m-1").await.unwrap();
    slip.select_outcome(Outcome::Home).unwrap();
    slip.set_stake(dec!(20), dec!(100)).unwrap();
    assert!(submit_slip(&mut slip, &submitter, &session).await.is_err());

    slip.reset().unwrap();
    slip.select_outcome(Outcome::Home).unwrap();
    slip.set_stake(dec!(20), dec!(100)).unwrap();
    let placed = submit_slip(&mut slip, &submitter, &session).await.unwrap();

    assert_eq!(placed.wager_id, "w-2");
    let seen = submitter.seen();
    assert_eq!(seen.len(), 2);
    assert_ne!(seen[0].1.idempotency_key, seen[1].1.idempotency_key);
}

#[tokio::test]
async fn test_incomplete_slip_is_never_submitted() {
    let catalog = StaticCatalog::with_match(open_match());
    let submitter = ScriptedSubmitter::new(vec![Ok(receipt("w-3"))]);

    let mut slip = open_slip(&catalog, "m-1").await.unwrap();
    slip.select_outcome(Outcome::Home).unwrap();

    let err = submit_slip(&mut slip, &submitter, &Session::new("u-7"))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        PlacementError::Slip(SlipError::SlipIncomplete(MissingField::Stake))
    );
    assert!(submitter.seen().is_empty());
    assert_eq!(slip.status(), &SlipStatus::Editing);
}

#[tokio::test]
async fn test_catalog_listing() {
    let catalog = StaticCatalog::with_match(open_match());
    let listed = catalog.list_matches().await.unwrap();
    assert_eq!(listed.len(), 1);
}
