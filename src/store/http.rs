//! Remote content store over the GROQ HTTP query API

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::ContentStore;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::query::Query;

/// Longest GET URL sent before switching to POST
const MAX_GET_URL_LEN: usize = 11_264;

/// Queries a hosted content lake by project id and dataset
pub struct HttpStore {
    client: Client,
    endpoint: Url,
    token: Option<String>,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    result: Value,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: Option<String>,
}

impl HttpStore {
    pub fn new(config: &StoreConfig) -> anyhow::Result<Self> {
        if config.project_id.is_empty() {
            anyhow::bail!("store.project_id is not configured");
        }
        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("press-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: Self::endpoint(config)?,
            token: config.token.clone(),
            timeout,
        })
    }

    /// `https://{project}.{api|apicdn}.sanity.io/v{version}/data/query/{dataset}`
    pub fn endpoint(config: &StoreConfig) -> anyhow::Result<Url> {
        let host = if config.use_cdn && config.token.is_none() {
            "apicdn.sanity.io"
        } else {
            "api.sanity.io"
        };
        let url = format!(
            "https://{}.{}/v{}/data/query/{}",
            config.project_id,
            host,
            config.api_version.trim_start_matches('v'),
            config.dataset
        );
        Ok(Url::parse(&url)?)
    }

    /// GET URL carrying the query and JSON-encoded `$params`
    pub fn query_url(&self, query: &Query) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", &query.text);
            for (name, value) in &query.params {
                pairs.append_pair(&format!("${}", name), &value.to_string());
            }
        }
        url
    }

    fn map_transport_error(&self, err: reqwest::Error) -> StoreError {
        if err.is_timeout() {
            StoreError::Timeout(self.timeout)
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl ContentStore for HttpStore {
    async fn fetch(&self, query: &Query) -> Result<Value, StoreError> {
        let url = self.query_url(query);
        let request = if url.as_str().len() > MAX_GET_URL_LEN {
            debug!(request = query.request().name(), "query too long for GET, using POST");
            self.client
                .post(self.endpoint.clone())
                .json(&json!({ "query": query.text, "params": query.params }))
        } else {
            self.client.get(url)
        };
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !status.is_success() {
            let message = error_message(status, &body);
            warn!(request = query.request().name(), status = status.as_u16(), "{}", message);
            return Err(StoreError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: QueryResponse =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(parsed.result)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.error.and_then(|b| b.description).or(e.message))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ContentRequest;

    fn config() -> StoreConfig {
        StoreConfig {
            project_id: "1u4o2o1r".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_endpoint() {
        let url = HttpStore::endpoint(&config()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://1u4o2o1r.apicdn.sanity.io/v2025-05-07/data/query/production"
        );

        let live = StoreConfig {
            use_cdn: false,
            ..config()
        };
        assert!(HttpStore::endpoint(&live)
            .unwrap()
            .as_str()
            .starts_with("https://1u4o2o1r.api.sanity.io/"));

        let private = StoreConfig {
            token: Some("secret".to_string()),
            ..config()
        };
        assert!(HttpStore::endpoint(&private)
            .unwrap()
            .as_str()
            .contains(".api.sanity.io"));
    }

    #[test]
    fn test_query_url_encodes_params_as_json() {
        let store = HttpStore::new(&config()).unwrap();
        let query = ContentRequest::ArticleBySlug {
            slug: "hello world".to_string(),
        }
        .to_query();
        let url = store.query_url(&query);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0].0, "query");
        assert_eq!(pairs[0].1, query.text);
        assert_eq!(pairs[1], ("$slug".to_string(), "\"hello world\"".to_string()));
    }

    #[test]
    fn test_requires_project_id() {
        assert!(HttpStore::new(&StoreConfig::default()).is_err());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(
                StatusCode::BAD_REQUEST,
                r#"{"error":{"description":"expected ']'"}}"#
            ),
            "expected ']'"
        );
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>"),
            "Service Unavailable"
        );
    }
}
