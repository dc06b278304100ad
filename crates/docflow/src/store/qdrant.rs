//! Qdrant REST client.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{CollectionSpec, Distance, Point, StoreClient, UpsertRequest};
use crate::error::StoreError;
use crate::sanitize;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error bodies are truncated to this many bytes before they end up in a job error.
const MAX_ERROR_BODY_LENGTH: usize = 300;

pub struct QdrantClient {
    client: Client,
    base_url: Url,
    api_key: SecretString,
}

#[derive(Deserialize)]
struct Envelope<T> {
    result: T,
}

#[derive(Deserialize)]
struct CollectionsResult {
    collections: Vec<CollectionDescription>,
}

#[derive(Deserialize)]
struct CollectionDescription {
    name: String,
}

#[derive(Deserialize)]
struct UpdateResult {
    status: String,
}

#[derive(Serialize)]
struct CreateCollectionBody {
    vectors: VectorParams,
}

#[derive(Serialize)]
struct VectorParams {
    size: usize,
    distance: Distance,
}

#[derive(Serialize)]
struct UpsertBody<'a> {
    points: &'a [Point],
}

impl QdrantClient {
    pub fn new(endpoint: &str, api_key: SecretString, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Request(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = Url::parse(endpoint)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| {
                StoreError::Request(format!(
                    "Invalid store endpoint: {}",
                    sanitize::redact_endpoint(endpoint)
                ))
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Appends `segments` to the endpoint path, percent-encoding each one.
    fn url_for(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn collections_url(&self) -> Url {
        self.url_for(&["collections"])
    }

    fn collection_url(&self, name: &str) -> Url {
        self.url_for(&["collections", name])
    }

    fn points_url(&self, name: &str, wait: bool) -> Url {
        let mut url = self.url_for(&["collections", name, "points"]);
        url.set_query(Some(&format!("wait={}", wait)));
        url
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, StoreError> {
        request
            .header("api-key", self.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))
    }
}

#[async_trait]
impl StoreClient for QdrantClient {
    async fn list_collections(&self) -> Result<BTreeSet<String>, StoreError> {
        let response = self.send(self.client.get(self.collections_url())).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        parse_collections(&body)
    }

    async fn create_collection(&self, name: &str, spec: &CollectionSpec) -> Result<(), StoreError> {
        debug!(
            endpoint = %sanitize::redact_endpoint(self.base_url.as_str()),
            collection = name,
            dimension = spec.dimension,
            "Creating collection"
        );

        let body = CreateCollectionBody {
            vectors: VectorParams {
                size: spec.dimension,
                distance: spec.distance,
            },
        };
        let response = self
            .send(self.client.put(self.collection_url(name)).json(&body))
            .await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        if is_already_exists(status, &text) {
            return Err(StoreError::CollectionExists(name.to_string()));
        }
        Err(api_error(status, &text))
    }

    async fn upsert(&self, collection: &str, request: UpsertRequest) -> Result<(), StoreError> {
        let body = UpsertBody {
            points: &request.points,
        };
        let response = self
            .send(
                self.client
                    .put(self.points_url(collection, request.wait))
                    .json(&body),
            )
            .await?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::Request(e.to_string()))?;

        if status == StatusCode::NOT_FOUND {
            return Err(StoreError::CollectionMissing(collection.to_string()));
        }
        if !status.is_success() {
            return Err(api_error(status, &text));
        }

        let update_status = parse_update_status(&text)?;
        if request.wait && update_status != "completed" {
            return Err(StoreError::NotAcknowledged {
                collection: collection.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_collections(body: &str) -> Result<BTreeSet<String>, StoreError> {
    let envelope: Envelope<CollectionsResult> =
        serde_json::from_str(body).map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
    Ok(envelope
        .result
        .collections
        .into_iter()
        .map(|c| c.name)
        .collect())
}

fn parse_update_status(body: &str) -> Result<String, StoreError> {
    let envelope: Envelope<UpdateResult> =
        serde_json::from_str(body).map_err(|e| StoreError::MalformedResponse(e.to_string()))?;
    Ok(envelope.result.status)
}

/// Qdrant answers 409 on a duplicate create; older servers use 400 with a message.
fn is_already_exists(status: StatusCode, body: &str) -> bool {
    status == StatusCode::CONFLICT
        || (status == StatusCode::BAD_REQUEST && body.contains("already exists"))
}

fn api_error(status: StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/status/error")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string());

    StoreError::Api {
        status: status.as_u16(),
        body: truncate(&message),
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated)", &body[..end])
}
