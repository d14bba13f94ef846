//! Remote sync client: the only code that talks to the backend.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::wire::{value_to_i64, ApiEnvelope, PullRequest, PushRequest, TaskPayload};
use crate::config::SyncClientConfig;
use crate::error::{Error, Result};
use crate::models::TaskRecord;
use crate::util::compact_text;

const CURRENT_VERSION_ENDPOINT: &str = "getCurrentVersion";
const PULL_ENDPOINT: &str = "syncGetData";
const PUSH_ENDPOINT: &str = "syncPushData";

/// Backend operations used by the reconciliation engine.
///
/// Implementations must not touch local state; each call either returns a
/// complete batch or an error.
#[allow(async_fn_in_trait)]
pub trait RemoteSync {
    /// Server-global max version of the user's task collection
    async fn get_current_version(&self) -> Result<i64>;

    /// Full snapshot when `is_first`, otherwise roughly `sync_num` changed records
    async fn pull(&self, sync_num: i64, is_first: bool) -> Result<Vec<TaskRecord>>;

    /// Upload dirty records and receive the server's canonical copies
    async fn push(&self, tasks: &[TaskRecord]) -> Result<Vec<TaskRecord>>;
}

/// `reqwest`-backed `RemoteSync` speaking the backend's JSON envelope protocol
#[derive(Clone)]
pub struct HttpSyncClient {
    base_url: String,
    api_token: Option<String>,
    client: Client,
}

impl std::fmt::Debug for HttpSyncClient {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HttpSyncClient")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpSyncClient {
    pub fn new(config: &SyncClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|error| Error::NetworkUnavailable(error.to_string()))?;

        Ok(Self {
            base_url,
            api_token: config.api_token.clone(),
            client,
        })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.base_url)
    }

    async fn call<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        name: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let mut request = self
            .client
            .post(self.endpoint(name))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|error| Error::NetworkUnavailable(format!("{name}: {error}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|error| Error::NetworkUnavailable(format!("{name}: {error}")))?;

        if !status.is_success() {
            tracing::warn!("{name} returned HTTP {}", status.as_u16());
            return Err(Error::ServerRejected {
                status: status.as_u16(),
                message: parse_api_error(status, &text),
            });
        }

        let envelope: ApiEnvelope<T> =
            serde_json::from_str(&text).map_err(|error| Error::ServerRejected {
                status: status.as_u16(),
                message: format!("invalid {name} response: {error}"),
            })?;

        if !envelope.is_success() {
            let message = envelope
                .msg
                .map(|message| compact_text(&message))
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("{name} failed"));
            tracing::warn!("{name} rejected with code {}: {message}", envelope.code);
            return Err(Error::ServerRejected {
                status: u16::try_from(envelope.code).unwrap_or(u16::MAX),
                message,
            });
        }

        Ok(envelope.data)
    }
}

impl RemoteSync for HttpSyncClient {
    async fn get_current_version(&self) -> Result<i64> {
        let data: Option<Value> = self
            .call(CURRENT_VERSION_ENDPOINT, &serde_json::json!({}))
            .await?;
        match data {
            None | Some(Value::Null) => Err(Error::ServerRejected {
                status: StatusCode::OK.as_u16(),
                message: "missing version counter".to_string(),
            }),
            Some(value) => value_to_i64(&value).ok_or_else(|| Error::ServerRejected {
                status: StatusCode::OK.as_u16(),
                message: format!("invalid version counter: {}", compact_text(&value.to_string())),
            }),
        }
    }

    async fn pull(&self, sync_num: i64, is_first: bool) -> Result<Vec<TaskRecord>> {
        let body = PullRequest { is_first, sync_num };
        let payloads: Option<Vec<TaskPayload>> = self.call(PULL_ENDPOINT, &body).await?;
        let tasks = payloads
            .unwrap_or_default()
            .into_iter()
            .map(TaskPayload::into_record)
            .collect::<Vec<_>>();
        tracing::debug!("Pulled {} tasks (sync_num={sync_num}, first={is_first})", tasks.len());
        Ok(tasks)
    }

    async fn push(&self, tasks: &[TaskRecord]) -> Result<Vec<TaskRecord>> {
        let body = PushRequest::from_records(tasks)?;
        let payloads: Option<Vec<TaskPayload>> = self.call(PUSH_ENDPOINT, &body).await?;
        let canonical = payloads
            .unwrap_or_default()
            .into_iter()
            .map(TaskPayload::into_record)
            .collect::<Vec<_>>();
        tracing::debug!("Pushed {} tasks, server returned {}", tasks.len(), canonical.len());
        Ok(canonical)
    }
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.msg.or(payload.message).or(payload.error) {
            return format!("{} ({})", compact_text(&message), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
