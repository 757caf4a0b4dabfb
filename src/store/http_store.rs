use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, ETAG, IF_MATCH};
use tracing::{debug, warn};

use crate::store::ProgressRepository;
use crate::store::error::{StoreError, StoreResult};
use crate::store::schema::{COLLECTION, PlayerProgress, ProgressRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Progress collection behind a REST entity API.
///
/// `GET {base}/PlayerProgress`, `POST {base}/PlayerProgress` and
/// `PUT {base}/PlayerProgress/{id}` with `If-Match: <version>`.
pub struct HttpStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(base_url: &str, token: Option<String>) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Http(e.to_string()))?;
        Self::with_client(base_url, token, client)
    }

    pub fn with_client(base_url: &str, token: Option<String>, client: Client) -> StoreResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::Unavailable(
                "remote store selected but no remote_url configured".to_string(),
            ));
        }
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn collection_url(&self) -> String {
        format!("{}/{COLLECTION}", self.base_url)
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{COLLECTION}/{id}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        self.authorized(request)
            .send()
            .map_err(|e| StoreError::Http(e.to_string()))
    }

    fn read_body(response: Response) -> StoreResult<String> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| StoreError::Http(e.to_string()))?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(StoreError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl ProgressRepository for HttpStore {
    fn list(&self) -> StoreResult<Vec<ProgressRecord>> {
        let response = self.send(self.client.get(self.collection_url()))?;
        let body = Self::read_body(response)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn create(&self, initial: &PlayerProgress) -> StoreResult<ProgressRecord> {
        let payload = serde_json::to_string(initial)?;
        let request = self
            .client
            .post(self.collection_url())
            .header(CONTENT_TYPE, "application/json")
            .body(payload);
        let body = Self::read_body(self.send(request)?)?;
        let record: ProgressRecord = serde_json::from_str(&body)?;
        debug!(id = %record.id, "remote progress record created");
        Ok(record)
    }

    fn update(
        &self,
        id: &str,
        expected_version: u64,
        progress: &PlayerProgress,
    ) -> StoreResult<ProgressRecord> {
        let payload = serde_json::to_string(progress)?;
        let request = self
            .client
            .put(self.record_url(id))
            .header(CONTENT_TYPE, "application/json")
            .header(IF_MATCH, expected_version.to_string())
            .body(payload);
        let response = self.send(request)?;

        match response.status() {
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => {
                let found = response
                    .headers()
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim_matches('"').parse::<u64>().ok())
                    .unwrap_or(0);
                warn!(id, expected_version, found, "remote progress version conflict");
                Err(StoreError::VersionConflict {
                    expected: expected_version,
                    found,
                })
            }
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(id.to_string())),
            _ => {
                let body = Self::read_body(response)?;
                Ok(serde_json::from_str(&body)?)
            }
        }
    }
}
