use crate::error::TransportError;
use crate::model::ResourceKind;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use urlencoding::encode;

pub const CATALOG_PATH: &str = "/api/crds";
pub const NAMESPACES_PATH: &str = "/api/namespaces";

/// GET-only access to the backend's JSON API.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Fetches `path` (relative to the backend root) and returns the parsed body.
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError>;
}

pub fn objects_path(kind: &ResourceKind) -> String {
    kind_path(kind, "objects")
}

pub fn resource_namespaces_path(kind: &ResourceKind) -> String {
    kind_path(kind, "namespaces")
}

fn kind_path(kind: &ResourceKind, suffix: &str) -> String {
    format!(
        "{CATALOG_PATH}/{}/{}/{}/{suffix}",
        encode(kind.group_segment()),
        encode(&kind.version),
        encode(&kind.name)
    )
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| TransportError::Request {
                url: base_url.to_string(),
                message: format!("failed to build HTTP client: {error}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, TransportError> {
        let url = format!("{}{path}", self.base_url);
        debug!(%url, ?query, "GET");

        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|error| TransportError::Request {
                url: url.clone(),
                message: error.to_string(),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| TransportError::Request {
                url: url.clone(),
                message: format!("failed reading body: {error}"),
            })?;

        if !status.is_success() {
            return Err(TransportError::status(
                status.as_u16(),
                error_body_message(&body),
            ));
        }

        serde_json::from_slice(&body).map_err(|error| TransportError::Decode {
            url,
            message: error.to_string(),
        })
    }
}

/// Extracts the `{"error": "..."}` message the backend attaches to failures.
fn error_body_message(body: &[u8]) -> Option<String> {
    let value = serde_json::from_slice::<Value>(body).ok()?;
    value
        .get("error")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::{HttpTransport, error_body_message, objects_path, resource_namespaces_path};
    use crate::model::ResourceKind;
    use std::time::Duration;

    #[test]
    fn core_kinds_use_core_segment() {
        let pods = ResourceKind::new("", "v1", "pods", true);
        assert_eq!(objects_path(&pods), "/api/crds/core/v1/pods/objects");
        assert_eq!(
            resource_namespaces_path(&pods),
            "/api/crds/core/v1/pods/namespaces"
        );
    }

    #[test]
    fn grouped_kinds_keep_their_group() {
        let certificates = ResourceKind::new("cert-manager.io", "v1", "certificates", true);
        assert_eq!(
            objects_path(&certificates),
            "/api/crds/cert-manager.io/v1/certificates/objects"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let odd = ResourceKind::new("example.com", "v1", "a/b?c", true);
        assert_eq!(
            objects_path(&odd),
            "/api/crds/example.com/v1/a%2Fb%3Fc/objects"
        );
    }

    #[test]
    fn error_body_is_read_when_present() {
        assert_eq!(
            error_body_message(br#"{"error":"forbidden"}"#),
            Some("forbidden".to_string())
        );
        assert_eq!(error_body_message(br#"{"error":""}"#), None);
        assert_eq!(error_body_message(b"<html>bad gateway</html>"), None);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let transport = HttpTransport::new("http://127.0.0.1:8080/", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(transport.base_url(), "http://127.0.0.1:8080");
    }
}
