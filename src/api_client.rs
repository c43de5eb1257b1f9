use crate::client::{MatchCatalogClient, WagerSubmissionClient};
use crate::config::Config;
use crate::dto::{MatchOdds, Receipt, Session, WagerRequest};
use crate::error::ClientError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::{header::HeaderMap, Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

const IDEMPOTENCY_HEADER: &str = "idempotency-key";
const USER_HEADER: &str = "x-user-id";

/// HTTP client for the Fanclash catalog and wager endpoints.
#[derive(Clone)]
pub struct FanclashApiClient {
    client: Client,
    catalog_url: Url,
    wager_url: Url,
    retry_policy: RetryPolicy,
}

/// Append `segments` to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidRequest(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn parse_base(name: &str, value: &str) -> Result<Url, ClientError> {
    Url::parse(value).map_err(|err| ClientError::InvalidRequest(format!("{name}: {err}")))
}

impl FanclashApiClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(config.api.timeout()).build()?;

        Ok(Self {
            client,
            catalog_url: parse_base("catalog_url", &config.api.catalog_url)?,
            wager_url: parse_base("wager_url", &config.api.wager_url)?,
            retry_policy: RetryPolicy::new(config.retry_config()),
        })
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    async fn get_json<U>(&self, url: &Url, not_found: &str) -> Result<U, ClientError>
    where
        U: DeserializeOwned,
    {
        self.retry_policy
            .retry(|| {
                let client = self.client.clone();
                let url = url.clone();

                async move {
                    debug!("GET {}", url);
                    let response = client.get(url.clone()).send().await?;

                    let status = response.status();
                    let response_text = response.text().await?;
                    debug!("GET {} -> {}: {}", url, status, response_text);

                    if status == StatusCode::NOT_FOUND {
                        return Err(ClientError::NotFound(not_found.to_string()));
                    }
                    if !status.is_success() {
                        return Err(ClientError::Rejected {
                            status: status.as_u16(),
                            body: response_text,
                        });
                    }

                    Ok(serde_json::from_str(&response_text)?)
                }
            })
            .await
    }
}

#[async_trait]
impl MatchCatalogClient for FanclashApiClient {
    async fn fetch_match(&self, match_id: &str) -> Result<MatchOdds, ClientError> {
        let url = endpoint(&self.catalog_url, &["matches", match_id])?;
        let snapshot: MatchOdds = self.get_json(&url, &format!("match {match_id}")).await?;

        if snapshot.match_id() != match_id {
            return Err(ClientError::Decode(format!(
                "requested match {match_id} but catalog returned {}",
                snapshot.match_id()
            )));
        }
        Ok(snapshot)
    }

    async fn list_matches(&self) -> Result<Vec<MatchOdds>, ClientError> {
        let url = endpoint(&self.catalog_url, &["matches"])?;
        self.get_json(&url, "match listing").await
    }
}

#[async_trait]
impl WagerSubmissionClient for FanclashApiClient {
    async fn submit(
        &self,
        session: &Session,
        request: &WagerRequest,
    ) -> Result<Receipt, ClientError> {
        let url = endpoint(&self.wager_url, &["wagers"])?;

        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(
            IDEMPOTENCY_HEADER,
            request
                .idempotency_key
                .parse()
                .map_err(|_| {
                    ClientError::InvalidRequest("idempotency key is not a valid header".into())
                })?,
        );
        headers.insert(
            USER_HEADER,
            session
                .user_id
                .parse()
                .map_err(|_| {
                    ClientError::InvalidRequest("user id is not a valid header".into())
                })?,
        );

        let body = serde_json::to_vec(request)?;
        debug!("POST {}: {}", url, String::from_utf8_lossy(&body));

        let receipt: Receipt = self
            .retry_policy
            .retry(|| {
                let client = self.client.clone();
                let headers = headers.clone();
                let body = body.clone();
                let url = url.clone();

                async move {
                    let response = client
                        .post(url.clone())
                        .headers(headers)
                        .header(reqwest::header::CONTENT_TYPE, "application/json")
                        .body(body)
                        .send()
                        .await?;

                    let status = response.status();
                    let response_text = response.text().await?;
                    debug!("POST {} -> {}: {}", url, status, response_text);

                    if !status.is_success() {
                        return Err(ClientError::Rejected {
                            status: status.as_u16(),
                            body: response_text,
                        });
                    }

                    Ok(serde_json::from_str(&response_text)?)
                }
            })
            .await?;

        info!(
            "Wager {} accepted as {}",
            request.idempotency_key, receipt.wager_id
        );
        Ok(receipt)
    }
}
