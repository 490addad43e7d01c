use std::time::Duration;

use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Client setup failed: {0}")]
    Setup(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Thin PostgREST client authenticated with the project's anon key. Every
/// request is bounded by `database_timeout_seconds`.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Result<Self, DatabaseError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.database_timeout_seconds))
            .build()
            .map_err(|e| DatabaseError::Setup(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.clone(),
        })
    }

    fn get_headers(&self) -> Result<HeaderMap, DatabaseError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| DatabaseError::InvalidHeader(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|e| DatabaseError::InvalidHeader(e.to_string()))?;

        headers.insert("apikey", api_key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str, body: Option<Value>)
                            -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         body: Option<Value>, extra_headers: Option<HeaderMap>)
                                         -> Result<T, DatabaseError>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers()?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::CONFLICT => DatabaseError::Conflict(error_text),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => DatabaseError::Auth(error_text),
                _ => DatabaseError::Status { status: status.as_u16(), message: error_text },
            });
        }

        let bytes = response.bytes().await?;
        let data = serde_json::from_slice::<T>(&bytes)?;
        Ok(data)
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            supabase_url: format!("{}/", server.uri()),
            supabase_anon_key: "test-anon-key".to_string(),
            ..AppConfig::default()
        }
    }

    fn client_for(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(&config_for(server)).unwrap()
    }

    #[tokio::test]
    async fn test_request_sends_anon_key_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/appointments"))
            .and(header("apikey", "test-anon-key"))
            .and(header("Authorization", "Bearer test-anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let rows: Vec<Value> = client
            .request(Method::GET, "/rest/v1/appointments", None)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(client.get_base_url(), server.uri());
    }

    #[tokio::test]
    async fn test_conflict_status_is_typed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/appointments"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: Result<Vec<Value>, _> = client
            .request(Method::POST, "/rest/v1/appointments", Some(json!({})))
            .await;

        assert_matches!(result, Err(DatabaseError::Conflict(msg)) if msg.contains("duplicate"));
    }

    #[tokio::test]
    async fn test_server_error_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result: Result<Vec<Value>, _> = client
            .request(Method::GET, "/rest/v1/appointments", None)
            .await;

        assert_matches!(result, Err(DatabaseError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_stalled_request_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let config = AppConfig {
            database_timeout_seconds: 1,
            ..config_for(&server)
        };
        let client = SupabaseClient::new(&config).unwrap();
        let result: Result<Vec<Value>, _> = client
            .request(Method::GET, "/rest/v1/appointments", None)
            .await;

        assert_matches!(result, Err(DatabaseError::Transport(e)) if e.is_timeout());
    }
}
