//! HTTP client for the Go Playground.
//!
//! Three remote operations: compile-and-run, create a share link, and fetch
//! a shared snippet by id. Wire formats follow the playground's published
//! behavior: `/compile` takes form fields `version=2` and `body`, and
//! answers JSON with `Errors` and `Events`; `/share` takes the raw source
//! as the request body and answers the snippet id.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::PlaygroundError;

/// Production playground endpoint.
pub const DEFAULT_BASE_URL: &str = "https://play.golang.org";

/// Guard against a hung remote call; the original design had no timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// One output event from a playground run.
///
/// `delay` is the nanosecond pause the playground recorded before this
/// event; the bot only ever shows the first event, so it is carried but
/// not replayed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayEvent {
    #[serde(rename = "Message", default)]
    pub message: String,
    #[serde(rename = "Kind", default)]
    pub kind: String,
    #[serde(rename = "Delay", default)]
    pub delay: i64,
}

/// Response from the execution service.
///
/// Exactly one of the two halves is meaningful: a non-empty `errors` means
/// compilation failed and `events` carries no runtime output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CompileResponse {
    #[serde(rename = "Errors", default)]
    pub errors: String,
    #[serde(rename = "Events", default)]
    pub events: Vec<PlayEvent>,
}

/// Client for the execution and sharing services.
pub struct PlayClient {
    http: reqwest::Client,
    base_url: String,
}

impl PlayClient {
    /// Client against the production playground.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against a custom base URL (for testing).
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit source for compilation and execution.
    ///
    /// Any transport failure or non-success status is a
    /// [`PlaygroundError::Service`]: the invocation aborts and the user gets
    /// one error line.
    pub async fn compile(&self, src: &str) -> Result<CompileResponse, PlaygroundError> {
        debug!(bytes = src.len(), "submitting snippet for execution");
        let resp = self
            .http
            .post(format!("{}/compile", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .form(&[("version", "2"), ("body", src)])
            .send()
            .await
            .map_err(|e| PlaygroundError::Service(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(PlaygroundError::Service(format!(
                "compile returned status {}",
                resp.status()
            )));
        }
        resp.json::<CompileResponse>()
            .await
            .map_err(|e| PlaygroundError::Service(e.to_string()))
    }

    /// Create a share link for the given source.
    ///
    /// Failure is non-fatal by contract: it is logged and degrades to
    /// `None`, never blocking the execution path.
    pub async fn share(&self, src: &str) -> Option<String> {
        let result = self
            .http
            .post(format!("{}/share", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .body(src.to_string())
            .send()
            .await;

        let resp = match result {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                warn!(status = %resp.status(), "share link creation failed");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "share link creation failed");
                return None;
            }
        };
        match resp.text().await {
            Ok(id) if !id.trim().is_empty() => {
                Some(format!("{}/p/{}", self.base_url, id.trim()))
            }
            Ok(_) => {
                warn!("share link creation returned an empty id");
                None
            }
            Err(e) => {
                warn!(error = %e, "share link creation failed");
                None
            }
        }
    }

    /// Fetch the raw source of a shared snippet.
    ///
    /// `id` must already carry its `.go` suffix (the locator appends it).
    /// The body is returned verbatim; no reformatting happens here.
    pub async fn fetch(&self, id: &str) -> Result<String, PlaygroundError> {
        let resp = self
            .http
            .get(format!("{}/p/{}", self.base_url, id))
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| PlaygroundError::SnippetFetch(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PlaygroundError::SnippetNotFound);
        }
        if !resp.status().is_success() {
            return Err(PlaygroundError::SnippetFetch(format!(
                "fetch returned status {}",
                resp.status()
            )));
        }
        resp.text()
            .await
            .map_err(|e| PlaygroundError::SnippetFetch(e.to_string()))
    }
}

impl Default for PlayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    #[test]
    fn compile_response_deserializes_playground_shape() {
        let resp: CompileResponse = serde_json::from_value(json!({
            "Errors": "",
            "Events": [{"Message": "hello\n", "Kind": "stdout", "Delay": 0}]
        }))
        .unwrap();
        assert!(resp.errors.is_empty());
        assert_eq!(resp.events.len(), 1);
        assert_eq!(resp.events[0].message, "hello\n");
    }

    #[test]
    fn compile_response_tolerates_missing_fields() {
        let resp: CompileResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.errors.is_empty());
        assert!(resp.events.is_empty());
    }

    #[tokio::test]
    async fn compile_posts_form_and_parses_response() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/compile"))
            .and(matchers::body_string_contains("version=2"))
            .and(matchers::body_string_contains("body=package"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Errors": "",
                "Events": [{"Message": "1\n", "Kind": "stdout", "Delay": 0}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = PlayClient::with_base_url(&server.uri());
        let resp = client.compile("package main").await.unwrap();
        assert_eq!(resp.events[0].message, "1\n");
    }

    #[tokio::test]
    async fn compile_maps_server_failure_to_service_error() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/compile"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = PlayClient::with_base_url(&server.uri());
        let err = client.compile("package main").await.unwrap_err();
        assert!(matches!(err, PlaygroundError::Service(_)));
    }

    #[tokio::test]
    async fn share_builds_link_from_returned_id() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/share"))
            .and(matchers::body_string("package main"))
            .respond_with(ResponseTemplate::new(200).set_body_string("AbCd1234"))
            .expect(1)
            .mount(&server)
            .await;

        let client = PlayClient::with_base_url(&server.uri());
        let link = client.share("package main").await;
        assert_eq!(link, Some(format!("{}/p/AbCd1234", server.uri())));
    }

    #[tokio::test]
    async fn share_failure_degrades_to_none() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/share"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = PlayClient::with_base_url(&server.uri());
        assert_eq!(client.share("package main").await, None);
    }

    #[tokio::test]
    async fn fetch_returns_body_verbatim() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/p/AbCd1234.go"))
            .respond_with(ResponseTemplate::new(200).set_body_string("package main\n"))
            .expect(1)
            .mount(&server)
            .await;

        let client = PlayClient::with_base_url(&server.uri());
        let src = client.fetch("AbCd1234.go").await.unwrap();
        assert_eq!(src, "package main\n");
    }

    #[tokio::test]
    async fn fetch_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/p/missing1.go"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = PlayClient::with_base_url(&server.uri());
        let err = client.fetch("missing1.go").await.unwrap_err();
        assert!(matches!(err, PlaygroundError::SnippetNotFound));
    }

    #[tokio::test]
    async fn fetch_maps_other_status_to_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("GET"))
            .and(matchers::path("/p/flaky123.go"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = PlayClient::with_base_url(&server.uri());
        let err = client.fetch("flaky123.go").await.unwrap_err();
        assert!(matches!(err, PlaygroundError::SnippetFetch(_)));
    }
}
