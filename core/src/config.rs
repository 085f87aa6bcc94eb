//! Client configuration.
//!
//! `ClientConfig` is validated once, at construction, and is read-only
//! afterwards. It never reads the process environment; binaries decide where
//! values come from.
//!
//! # Example
//!
//! ```rust
//! use hakuna_core::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .auth_token("0123456789abcdef")
//!     .tenant("acme")
//!     .user_agent("payroll-sync/2.1")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_url(), "https://acme.hakuna.ch/api/v1");
//! ```

use crate::error::ApiError;

/// Domain every tenant subdomain lives under.
pub const SERVICE_DOMAIN: &str = "hakuna.ch";

/// API version segment of the base path.
pub const API_VERSION: &str = "v1";

/// Immutable client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    auth_token: String,
    tenant: String,
    user_agent: Option<String>,
    base_url: String,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub fn auth_token(&self) -> &str {
        &self.auth_token
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    /// Base URL without a trailing slash; paths are appended verbatim.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    auth_token: Option<String>,
    tenant: Option<String>,
    user_agent: Option<String>,
    base_url: Option<String>,
}

impl ClientConfigBuilder {
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replaces `https://{tenant}.hakuna.ch/api/v1`, e.g. to target a mock
    /// server. The tenant is still required.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn build(self) -> Result<ClientConfig, ApiError> {
        let auth_token = self
            .auth_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ApiError::Configuration("auth token is required".to_string()))?;

        let tenant = self
            .tenant
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Configuration("tenant is required".to_string()))?;
        if !is_dns_label(&tenant) {
            return Err(ApiError::Configuration(format!(
                "tenant {tenant:?} is not a valid subdomain"
            )));
        }

        let base_url = match self.base_url {
            Some(url) if url.trim().is_empty() => {
                return Err(ApiError::Configuration("base url is empty".to_string()));
            }
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{tenant}.{SERVICE_DOMAIN}/api/{API_VERSION}"),
        };

        Ok(ClientConfig {
            auth_token,
            tenant,
            user_agent: self.user_agent.filter(|ua| !ua.is_empty()),
            base_url,
        })
    }
}

fn is_dns_label(s: &str) -> bool {
    s.len() <= 63
        && !s.starts_with('-')
        && !s.ends_with('-')
        && s.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
