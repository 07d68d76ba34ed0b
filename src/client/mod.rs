use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::types::access::{
    CheckAccessRequest, CheckAccessResponse, DocumentRef, ACCESS_CHECK_PATH, HEADER_API_KEY,
};

/// Client for the Codified access-check API.
///
/// Holds only immutable configuration and a connection pool, so it is cheap to
/// clone and safe to share across concurrent callers. One call to the service
/// per [`AccessChecker::check_access`]; no retry, caching or batching.
#[derive(Debug, Clone)]
pub struct PermissionClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Permission service error: code {code}, {message}")]
    Transport { code: u16, message: String },

    #[error("Permission service returned invalid json: {0:?}")]
    InvalidJson(String),

    #[error("Permission service broke contract: {0}")]
    Protocol(&'static str),

    #[error("Access context not set, retrieval cannot proceed")]
    MissingContext,
}

/// Capability of answering "which of these documents may this user access".
///
/// [`PermissionClient`] is the production implementation; tests inject fakes.
#[async_trait]
pub trait AccessChecker: Send + Sync {
    /// Returns a permission map over `document_ids` for `user_email`.
    ///
    /// The map contains exactly the IDs the service chose to report. Callers
    /// must treat omitted IDs as not permitted.
    async fn check_access(
        &self,
        document_ids: &[String],
        user_email: &str,
    ) -> Result<HashMap<String, bool>, AccessError>;
}

impl PermissionClient {
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        let parsed = match Url::parse(endpoint) {
            Ok(url) => url,
            Err(_) => bail!("invalid endpoint url '{endpoint}'"),
        };
        match parsed.scheme() {
            "http" | "https" => {}
            _ => bail!(
                "invalid url scheme, expect 'http' or 'https', not '{}'",
                parsed.scheme()
            ),
        }
        if parsed.path() != "/" {
            bail!(
                "invalid endpoint url, path should be '/', not '{}'",
                parsed.path()
            );
        }
        if api_key.is_empty() {
            bail!("api key cannot be empty");
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn from_config(cfg: &ClientConfig) -> Result<Self> {
        Self::new(&cfg.endpoint, &cfg.api_key).context("build permission client from config")
    }
}

#[async_trait]
impl AccessChecker for PermissionClient {
    async fn check_access(
        &self,
        document_ids: &[String],
        user_email: &str,
    ) -> Result<HashMap<String, bool>, AccessError> {
        let url = format!("{}{}", self.endpoint, ACCESS_CHECK_PATH);
        let req = CheckAccessRequest {
            data: document_ids
                .iter()
                .map(|id| DocumentRef { id: id.clone() })
                .collect(),
            username: user_email.to_string(),
        };

        debug!(
            "Check access for '{user_email}' on {} documents",
            document_ids.len()
        );
        let resp = self
            .client
            .post(&url)
            .header(HEADER_API_KEY, &self.api_key)
            .json(&req)
            .send()
            .await?;

        let code = resp.status();
        let text = resp.text().await?;
        if code != StatusCode::OK {
            return Err(AccessError::Transport {
                code: code.as_u16(),
                message: text,
            });
        }

        let resp: CheckAccessResponse = match serde_json::from_str(&text) {
            Ok(resp) => resp,
            Err(_) => return Err(AccessError::InvalidJson(text)),
        };
        let results = match resp.results {
            Some(results) => results,
            None => return Err(AccessError::Protocol("missing results field in response")),
        };

        let mut allowed = HashMap::with_capacity(results.len());
        for result in results {
            allowed.insert(result.data.id, result.has_permission);
        }
        debug!(
            "Permission service reported {} of {} documents",
            allowed.len(),
            document_ids.len()
        );

        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = PermissionClient::new("http://127.0.0.1:8344/", "test-key").unwrap();
        assert_eq!(client.endpoint, "http://127.0.0.1:8344");
    }

    #[test]
    fn test_new_rejects_bad_endpoints() {
        assert!(PermissionClient::new("not a url", "test-key").is_err());
        assert!(PermissionClient::new("ftp://127.0.0.1:8344", "test-key").is_err());
        assert!(PermissionClient::new("http://127.0.0.1:8344/api", "test-key").is_err());
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        assert!(PermissionClient::new("http://127.0.0.1:8344", "").is_err());
    }
}
