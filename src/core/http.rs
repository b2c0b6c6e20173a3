//! HTTP backend over `ureq`

use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::core::backend::{ApiError, Backend};
use crate::core::config::Config;

/// Blocking JSON-over-HTTP backend bound to one base URL
#[derive(Debug, Clone)]
pub struct HttpBackend {
    agent: ureq::Agent,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.timeout_secs.max(1));
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .timeout_write(timeout)
            .user_agent(concat!("clm/", env!("CARGO_PKG_VERSION")))
            .build();

        Self {
            agent,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

impl Backend for HttpBackend {
    fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = self.url(path);
        debug!(method = "GET", %url, "sending request");

        let response = self
            .agent
            .get(&url)
            .set("accept", "application/json")
            .call()
            .map_err(|e| api_error_from_ureq("GET", &url, e))?;

        debug!(method = "GET", %url, status = response.status(), "response received");
        response
            .into_json::<Value>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn put_json(&self, path: &str, body: &Value) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(method = "PUT", %url, "sending request");

        let response = self
            .agent
            .put(&url)
            .set("accept", "application/json")
            .send_json(body)
            .map_err(|e| api_error_from_ureq("PUT", &url, e))?;

        debug!(method = "PUT", %url, status = response.status(), "response received");
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        debug!(method = "DELETE", %url, "sending request");

        let response = self
            .agent
            .delete(&url)
            .set("accept", "application/json")
            .call()
            .map_err(|e| api_error_from_ureq("DELETE", &url, e))?;

        debug!(method = "DELETE", %url, status = response.status(), "response received");
        Ok(())
    }
}

fn api_error_from_ureq(method: &str, url: &str, err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            debug!(method, url, status, "request rejected");
            ApiError::from_status(status, &body)
        }
        ureq::Error::Transport(transport) => {
            debug!(method, url, error = %transport, "transport failure");
            ApiError::Transport(transport.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let config = Config {
            api_base_url: "http://localhost:8000/".to_string(),
            ..Config::default()
        };
        let backend = HttpBackend::new(&config);
        assert_eq!(backend.base_url(), "http://localhost:8000");
        assert_eq!(backend.url("/api/x"), "http://localhost:8000/api/x");
        assert_eq!(backend.url("api/x"), "http://localhost:8000/api/x");
    }

    #[test]
    fn test_unreachable_host_is_transport_error() {
        let config = Config {
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
            ..Config::default()
        };
        let backend = HttpBackend::new(&config);
        match backend.get_json("/anything") {
            Err(ApiError::Transport(_)) => {}
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
