//! Outbound proxy discovery
//!
//! Campus machines frequently sit behind a department proxy for anything
//! outside the intranet, so webhook delivery honors the conventional
//! `HTTP_PROXY`/`HTTPS_PROXY` variables. When neither is set the HTTP
//! client keeps its platform proxy discovery and otherwise connects
//! directly; discovery itself can never fail.

use std::env;

/// Resolved proxy endpoints for the notification channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    pub http: Option<String>,
    pub https: Option<String>,
}

impl ProxySettings {
    /// Read proxy settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_env_fn(|key| env::var(key))
    }

    /// Read proxy settings using a custom getter (for testing).
    ///
    /// Uppercase names take precedence over lowercase; empty values count
    /// as unset.
    pub fn from_env_fn<F>(get_var: F) -> Self
    where
        F: Fn(&str) -> Result<String, env::VarError>,
    {
        let lookup = |upper: &str, lower: &str| {
            get_var(upper)
                .or_else(|_| get_var(lower))
                .ok()
                .filter(|value| !value.is_empty())
        };
        Self {
            http: lookup("HTTP_PROXY", "http_proxy"),
            https: lookup("HTTPS_PROXY", "https_proxy"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}
