//! HTTP adapter for the remote advisory service.
//!
//! The adapter sends the full installed-package inventory as the request
//! payload and normalizes the JSON response into an [`AdvisoryCollection`].
//! Failures surface as a typed [`RemoteError`] carrying the HTTP status code,
//! which the retry controller uses to classify transient gateway outages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::model::{AdvisoryCollection, AdvisoryRecord, PackageInventory};

/// Default advisory endpoint queried when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://packagist.org/api/security-advisories/";

/// HTTP status codes treated as a temporary gateway outage of the remote
/// service rather than a real failure.
pub const GATEWAY_STATUS_CODES: [u16; 3] = [502, 503, 504];

/// A failed round trip to the advisory service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service answered with a non-2xx status.
    #[error("advisory service returned HTTP {status}")]
    Status { status: u16 },

    /// The request never completed or the response body could not be decoded.
    #[error("request to advisory service failed")]
    Transport(#[from] reqwest::Error),
}

impl RemoteError {
    /// The HTTP status code, when the service produced a response at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status } => Some(*status),
            RemoteError::Transport(err) => err.status().map(|s| s.as_u16()),
        }
    }

    /// True for HTTP 502/503/504 — a transient gateway outage worth retrying
    /// without raising an alarm.
    pub fn is_gateway(&self) -> bool {
        self.status()
            .is_some_and(|status| GATEWAY_STATUS_CODES.contains(&status))
    }
}

/// Seam between the orchestrator and the remote advisory service.
///
/// The production implementation is [`HttpAdvisoryClient`]; tests substitute
/// scripted providers to exercise retry and caching behavior.
#[async_trait]
pub trait AdvisoryProvider: Send + Sync {
    /// Fetches all advisories affecting the given installed versions.
    ///
    /// One network round trip per invocation; retry and caching are layered
    /// on top by the caller.
    async fn fetch(&self, inventory: &PackageInventory)
        -> Result<AdvisoryCollection, RemoteError>;
}

#[derive(Serialize)]
struct AdvisoryRequest<'a> {
    packages: &'a PackageInventory,
}

#[derive(Deserialize)]
struct AdvisoryResponse {
    #[serde(default)]
    advisories: BTreeMap<String, Vec<AdvisoryRecord>>,
}

/// reqwest-backed advisory client.
///
/// # Example
///
/// ```no_run
/// use advisory_check::client::{AdvisoryProvider, HttpAdvisoryClient};
/// use advisory_check::model::PackageInventory;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = HttpAdvisoryClient::new();
///     let mut inventory = PackageInventory::new();
///     inventory.insert("vendor/package", "1.2.3");
///
///     let advisories = client.fetch(&inventory).await?;
///     println!("{} affected packages", advisories.len());
///     Ok(())
/// }
/// ```
pub struct HttpAdvisoryClient {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAdvisoryClient {
    /// Creates a client pointed at [`DEFAULT_ENDPOINT`].
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    /// Creates a client pointed at a custom endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

impl Default for HttpAdvisoryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AdvisoryProvider for HttpAdvisoryClient {
    async fn fetch(
        &self,
        inventory: &PackageInventory,
    ) -> Result<AdvisoryCollection, RemoteError> {
        debug!(packages = inventory.len(), "querying advisory service");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&AdvisoryRequest { packages: inventory })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }

        let body: AdvisoryResponse = response.json().await?;

        // Packages the service knows but has nothing to report on come back
        // as empty lists; drop them so an empty collection means "clean".
        let collection: AdvisoryCollection = body
            .advisories
            .into_iter()
            .filter(|(_, records)| !records.is_empty())
            .collect();

        debug!(affected = collection.len(), "advisory response parsed");
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_inventory() -> PackageInventory {
        let mut inventory = PackageInventory::new();
        inventory.insert("vendor/package", "1.2.3");
        inventory
    }

    #[tokio::test]
    async fn test_fetch_parses_advisories_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "advisories": {
                    "vendor/package": [{
                        "advisoryId": "PKSA-1234",
                        "packageName": "vendor/package",
                        "affectedVersions": ">=1.0,<1.3",
                        "title": "Remote code execution"
                    }]
                }
            })))
            .mount(&server)
            .await;

        let client = HttpAdvisoryClient::with_endpoint(server.uri());
        let collection = client.fetch(&sample_inventory()).await.unwrap();

        assert_eq!(collection.len(), 1);
        let records = collection.records_for("vendor/package").unwrap();
        assert_eq!(records[0].advisory_id, "PKSA-1234");
        assert_eq!(records[0].title, "Remote code execution");
    }

    #[tokio::test]
    async fn test_fetch_sends_inventory_as_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_json(serde_json::json!({
                "packages": {"vendor/package": "1.2.3"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"advisories": {}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = HttpAdvisoryClient::with_endpoint(server.uri());
        client.fetch(&sample_inventory()).await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_drops_packages_without_records() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "advisories": {"vendor/package": []}
            })))
            .mount(&server)
            .await;

        let client = HttpAdvisoryClient::with_endpoint(server.uri());
        let collection = client.fetch(&sample_inventory()).await.unwrap();

        assert!(collection.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_missing_advisories_field_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = HttpAdvisoryClient::with_endpoint(server.uri());
        let collection = client.fetch(&sample_inventory()).await.unwrap();

        assert!(collection.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = HttpAdvisoryClient::with_endpoint(server.uri());
        let err = client.fetch(&sample_inventory()).await.unwrap_err();

        assert_eq!(err.status(), Some(502));
        assert!(err.is_gateway());
    }

    #[test]
    fn test_gateway_classification() {
        for status in GATEWAY_STATUS_CODES {
            assert!(RemoteError::Status { status }.is_gateway());
        }
        assert!(!RemoteError::Status { status: 400 }.is_gateway());
        assert!(!RemoteError::Status { status: 403 }.is_gateway());
        assert!(!RemoteError::Status { status: 500 }.is_gateway());
    }
}
