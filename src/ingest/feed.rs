use super::error::IngestError;
use crate::config::ApiConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;
use tracing::info;

/// Source of raw role records for one ingestion cycle.
#[async_trait]
pub trait RoleFeed: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Value>, IngestError>;
}

/// Validates the payload shape: the top level must be a JSON array.
pub fn parse_payload(body: &str) -> Result<Vec<Value>, IngestError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(records) => Ok(records),
        other => Err(IngestError::NotArray {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub struct HttpRoleFeed {
    client: reqwest::Client,
    url: String,
    params: Vec<(String, String)>,
}

impl HttpRoleFeed {
    pub fn new(api: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &api.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {}", name))?;
            headers.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: api.url.clone(),
            params: api
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        })
    }
}

#[async_trait]
impl RoleFeed for HttpRoleFeed {
    async fn fetch(&self) -> Result<Vec<Value>, IngestError> {
        info!("Requesting roles from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .query(&self.params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(IngestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let records = parse_payload(&body)?;
        info!("Received {} role records", records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers a single request with `status` and `body`, and hands back the
    /// request head it received.
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/castings", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&head).into_owned()
        });

        (url, handle)
    }

    fn api_config(url: String) -> ApiConfig {
        ApiConfig {
            url,
            timeout_secs: 5,
            headers: BTreeMap::from([
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-Api-Key".to_string(), "secret".to_string()),
            ]),
            params: BTreeMap::from([
                ("status".to_string(), "active".to_string()),
                ("limit".to_string(), "100".to_string()),
            ]),
        }
    }

    #[tokio::test]
    async fn fetch_sends_filters_and_headers() {
        let (url, server) = serve_once("200 OK", r#"[{"roleId": "r-1"}, {"roleId": "r-2"}]"#).await;
        let feed = HttpRoleFeed::new(&api_config(url)).unwrap();

        let records = feed.fetch().await.unwrap();
        assert_eq!(records.len(), 2);

        let head = server.await.unwrap();
        let request_line = head.lines().next().unwrap();
        assert!(request_line.starts_with("GET /castings?"));
        assert!(request_line.contains("limit=100"));
        assert!(request_line.contains("status=active"));
        assert!(head.to_ascii_lowercase().contains("x-api-key: secret"));
    }

    #[tokio::test]
    async fn fetch_maps_error_status() {
        let (url, server) = serve_once("503 Service Unavailable", "down").await;
        let feed = HttpRoleFeed::new(&api_config(url)).unwrap();

        match feed.fetch().await {
            Err(IngestError::Status { status, body }) => {
                assert_eq!(status, 503);
                assert_eq!(body, "down");
            }
            other => panic!("expected a status error, got {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_rejects_wrapped_payload() {
        let (url, server) = serve_once("200 OK", r#"{"items": []}"#).await;
        let feed = HttpRoleFeed::new(&api_config(url)).unwrap();

        assert!(matches!(
            feed.fetch().await,
            Err(IngestError::NotArray { found: "an object" })
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn fetch_rejects_non_json_body() {
        let (url, server) = serve_once("200 OK", "<html>maintenance</html>").await;
        let feed = HttpRoleFeed::new(&api_config(url)).unwrap();

        assert!(matches!(feed.fetch().await, Err(IngestError::Json(_))));
        server.await.unwrap();
    }

    #[test]
    fn array_payload_is_accepted() {
        let records = parse_payload(r#"[{"roleId": 1}, {"roleId": 2}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert!(parse_payload("[]").unwrap().is_empty());
    }

    #[test]
    fn non_array_payload_is_rejected() {
        assert!(matches!(
            parse_payload(r#"{"items": []}"#),
            Err(IngestError::NotArray { found: "an object" })
        ));
        assert!(matches!(parse_payload("<html>"), Err(IngestError::Json(_))));
    }

    #[test]
    fn feed_rejects_bad_header_names() {
        let api = ApiConfig {
            url: "http://localhost:8080/castings".to_string(),
            timeout_secs: 5,
            headers: [("bad header".to_string(), "x".to_string())].into(),
            params: Default::default(),
        };
        assert!(HttpRoleFeed::new(&api).is_err());
    }
}
