//! eportal authentication
//!
//! Implements the two-step login flow:
//! 1. reachability probe - Are we on the campus network at all?
//! 2. login - Authenticate with credentials, decode the JSONP reply
//!
//! Every failure mode ends up as a `LoginError` variant; `login()` folds
//! them into a `LoginOutcome` so callers never see a panic or a stray
//! transport error.

use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Protocol/version constants the gateway's JavaScript client sends.
const LOGIN_METHOD: &str = "1";
const JS_VERSION: &str = "3.3.2";
const PORTAL_VERSION: &str = "1117";
/// The gateway accepts an all-zero MAC; it keys sessions on the IP.
const WLAN_USER_MAC: &str = "000000000000";

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Probe must answer within this window or we treat the campus network
/// as unreachable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Upper bound for the login request; the gateway normally answers in
/// well under a second.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Login errors
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("not connected to campus network")]
    NotOnCampus,

    #[error("login failed, HTTP status {0}")]
    HttpStatus(u16),

    #[error("could not parse gateway response")]
    UnparseableResponse,

    #[error("{0}")]
    Rejected(String),

    #[error("login request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// Gateway endpoints and the callback name its JSONP replies use.
///
/// Defaults target the AHU gateway; other campuses running the same
/// eportal software only differ in these values.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Login endpoint base, e.g. `http://172.16.253.3:801/eportal/`
    pub base_url: String,
    /// Plain page served only inside the campus network
    pub check_url: String,
    /// Referer the gateway expects on requests
    pub referer: String,
    /// Callback name wrapping the JSON reply
    pub callback: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: "http://172.16.253.3:801/eportal/".to_string(),
            check_url: "http://172.16.253.3/a79.htm".to_string(),
            referer: "http://172.16.253.3/".to_string(),
            callback: "dr1003".to_string(),
        }
    }
}

/// The classified result of one login attempt.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub success: bool,
    pub message: String,
}

/// JSON object inside the callback wrapper: `{"result":"1","msg":...}`
#[derive(Debug, Deserialize)]
struct GatewayReply {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

pub struct PortalClient {
    config: PortalConfig,
    account: String,
    password: String,
    client_ip: IpAddr,
    http: Client,
}

impl PortalClient {
    pub fn new(
        config: PortalConfig,
        account: String,
        password: String,
        client_ip: IpAddr,
    ) -> Result<Self, LoginError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            config,
            account,
            password,
            client_ip,
            http,
        })
    }

    /// Check whether the campus network is reachable (authenticated or not).
    ///
    /// Only a plain HTTP 200 from the gateway's check page counts; any
    /// timeout, refused connection or DNS failure means "not on campus".
    pub async fn is_reachable(&self) -> bool {
        let result = self
            .browser_headers(self.http.get(&self.config.check_url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!("Reachability probe failed: {}", e);
                false
            }
        }
    }

    /// Perform one login attempt and classify the result.
    ///
    /// Never panics and never propagates an error; everything collapses
    /// into the outcome. At most one authentication request is sent -
    /// retry policy belongs to whoever schedules us.
    pub async fn login(&self) -> LoginOutcome {
        match self.try_login().await {
            Ok(()) => {
                info!("Login succeeded for {}", self.account);
                LoginOutcome {
                    success: true,
                    message: "login succeeded".to_string(),
                }
            }
            Err(e) => {
                info!("Login failed for {}: {}", self.account, e);
                LoginOutcome {
                    success: false,
                    message: e.to_string(),
                }
            }
        }
    }

    async fn try_login(&self) -> Result<(), LoginError> {
        if !self.is_reachable().await {
            return Err(LoginError::NotOnCampus);
        }

        let ip = self.client_ip.to_string();
        let params = [
            ("c", "Portal"),
            ("a", "login"),
            ("callback", self.config.callback.as_str()),
            ("login_method", LOGIN_METHOD),
            ("user_account", self.account.as_str()),
            ("user_password", self.password.as_str()),
            ("wlan_user_ip", ip.as_str()),
            ("wlan_user_ipv6", ""),
            ("wlan_user_mac", WLAN_USER_MAC),
            ("wlan_ac_ip", ""),
            ("wlan_ac_name", ""),
            ("jsVersion", JS_VERSION),
            ("v", PORTAL_VERSION),
        ];

        let response = self
            .browser_headers(self.http.get(&self.config.base_url))
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(LoginError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        debug!("Gateway response: {}", body);

        let json = extract_callback_json(&body, &self.config.callback)
            .ok_or(LoginError::UnparseableResponse)?;
        let reply: GatewayReply =
            serde_json::from_str(json).map_err(|_| LoginError::UnparseableResponse)?;

        if reply.result.as_deref() == Some("1") {
            Ok(())
        } else {
            Err(LoginError::Rejected(
                reply
                    .msg
                    .unwrap_or_else(|| "login failed, unknown reason".to_string()),
            ))
        }
    }

    /// Headers the gateway's own login page sends; some deployments reject
    /// requests without them.
    fn browser_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(header::ACCEPT, "*/*")
            .header(header::ACCEPT_LANGUAGE, "zh-CN,zh;q=0.9")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache")
            .header(header::REFERER, &self.config.referer)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
    }
}

/// Extract the JSON payload from a JSONP body: `<callback>(<json>)`.
///
/// The wrapper may be surrounded by whitespace or script noise, so this
/// finds the callback call anywhere in the body and takes everything up
/// to the last closing parenthesis.
fn extract_callback_json<'a>(body: &'a str, callback: &str) -> Option<&'a str> {
    let open = body.find(&format!("{callback}("))? + callback.len() + 1;
    let close = body.rfind(')')?;
    if close < open {
        return None;
    }
    Some(&body[open..close])
}
