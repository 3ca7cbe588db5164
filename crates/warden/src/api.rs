//! HTTP API context used for API deletions and seeding.
//!
//! [`ApiContext`] is the seam the tracker and seeder talk to. The
//! reqwest-backed [`HttpApiContext`] is the real implementation; tests plug
//! in their own recorders.

use crate::resource::HttpVerb;
use crate::result::{WardenError, WardenResult};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Response from an API request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl ApiResponse {
    /// Create a response
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// 404 status
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Decode the body as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> WardenResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-2xx response into [`WardenError::Api`]
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not 2xx.
    pub fn error_for_status(self, verb: HttpVerb, path: &str) -> WardenResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(WardenError::Api {
                verb: verb.to_string(),
                path: path.to_string(),
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Something that can send requests to the API under test.
#[async_trait]
pub trait ApiContext: Send + Sync {
    /// Send `verb` to `path` with an optional JSON body.
    ///
    /// Non-2xx statuses are returned as responses, not errors; only transport
    /// failures are errors.
    async fn send(
        &self,
        verb: HttpVerb,
        path: &str,
        body: Option<&Value>,
    ) -> WardenResult<ApiResponse>;
}

#[cfg(feature = "http")]
pub use http::HttpApiContext;

#[cfg(feature = "http")]
mod http {
    use super::{ApiContext, ApiResponse};
    use crate::config::ApiConfig;
    use crate::resource::HttpVerb;
    use crate::result::WardenResult;
    use async_trait::async_trait;
    use serde_json::Value;
    use tracing::debug;

    /// reqwest-backed [`ApiContext`] with optional bearer auth.
    #[derive(Debug, Clone)]
    pub struct HttpApiContext {
        base_url: String,
        token: Option<String>,
        client: reqwest::Client,
    }

    impl HttpApiContext {
        /// Create a context from configuration.
        ///
        /// # Errors
        ///
        /// Returns an error if the HTTP client cannot be built.
        pub fn new(config: &ApiConfig) -> WardenResult<Self> {
            let client = reqwest::Client::builder().timeout(config.timeout).build()?;
            Ok(Self::with_client(config, client))
        }

        /// Create a context around an existing reqwest client
        #[must_use]
        pub fn with_client(config: &ApiConfig, client: reqwest::Client) -> Self {
            Self {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                token: config.token.clone(),
                client,
            }
        }

        /// Create a context from `WARDEN_API_*` variables.
        ///
        /// # Errors
        ///
        /// Returns an error if the HTTP client cannot be built.
        pub fn from_env() -> WardenResult<Self> {
            Self::new(&ApiConfig::from_env())
        }

        /// Returns the base URL.
        #[must_use]
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        /// Replace the bearer token, e.g. after logging in as a pool user
        pub fn set_token(&mut self, token: Option<String>) {
            self.token = token;
        }

        fn url(&self, path: &str) -> String {
            if path.starts_with("http://") || path.starts_with("https://") {
                path.to_string()
            } else {
                format!("{}/{}", self.base_url, path.trim_start_matches('/'))
            }
        }
    }

    fn method(verb: HttpVerb) -> reqwest::Method {
        match verb {
            HttpVerb::Get => reqwest::Method::GET,
            HttpVerb::Post => reqwest::Method::POST,
            HttpVerb::Put => reqwest::Method::PUT,
            HttpVerb::Patch => reqwest::Method::PATCH,
            HttpVerb::Delete => reqwest::Method::DELETE,
        }
    }

    #[async_trait]
    impl ApiContext for HttpApiContext {
        async fn send(
            &self,
            verb: HttpVerb,
            path: &str,
            body: Option<&Value>,
        ) -> WardenResult<ApiResponse> {
            let url = self.url(path);
            let mut request = self.client.request(method(verb), &url);
            if let Some(token) = &self.token {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            let resp = request.send().await?;
            let status = resp.status().as_u16();
            let body = resp.text().await?;
            debug!(%verb, %url, status, "api request");
            Ok(ApiResponse { status, body })
        }
    }

}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_helpers() {
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(500, "").is_success());
        assert!(ApiResponse::new(404, "").is_not_found());
    }

    #[test]
    fn test_json() {
        let resp = ApiResponse::new(200, r#"{"id":"d1"}"#);
        let value: Value = resp.json().unwrap();
        assert_eq!(value["id"], "d1");
        assert!(ApiResponse::new(200, "nope").json::<Value>().is_err());
    }

    #[test]
    fn test_error_for_status() {
        let err = ApiResponse::new(409, "conflict")
            .error_for_status(HttpVerb::Post, "/decks")
            .unwrap_err();
        assert!(matches!(err, WardenError::Api { status: 409, .. }));
        assert!(ApiResponse::new(201, "")
            .error_for_status(HttpVerb::Post, "/decks")
            .is_ok());
    }
}
