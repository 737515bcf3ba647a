//! Webhook message delivery
//!
//! Posts a text payload to each configured endpoint in order. The chat
//! service answers every POST with `{"errcode": 0}` on acceptance, so a
//! delivery only counts when both the HTTP status and the errcode agree.
//! Delivery is all-or-abort: the first failing endpoint stops the pass.

use reqwest::{Client, Proxy, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::notify::proxy::ProxySettings;

/// Upper bound per webhook POST so a dead endpoint cannot hang the run.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("webhook returned HTTP status {0}")]
    HttpStatus(u16),

    #[error("webhook rejected message: errcode {errcode} ({errmsg})")]
    Rejected { errcode: i64, errmsg: String },
}

/// Text message payload in the enterprise-chat webhook format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextMessage {
    pub msgtype: String,
    pub text: TextContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
    pub mentioned_list: Vec<String>,
    pub mentioned_mobile_list: Vec<String>,
}

impl TextMessage {
    pub fn text(content: &str, mentioned: &[String], mentioned_mobiles: &[String]) -> Self {
        Self {
            msgtype: "text".to_string(),
            text: TextContent {
                content: content.to_string(),
                mentioned_list: mentioned.to_vec(),
                mentioned_mobile_list: mentioned_mobiles.to_vec(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookReply {
    errcode: i64,
    #[serde(default)]
    errmsg: Option<String>,
}

pub struct Notifier {
    endpoints: Vec<String>,
    http: Client,
}

impl Notifier {
    /// Build a notifier over a fixed endpoint set with the given proxy
    /// settings baked into its HTTP client.
    pub fn new(endpoints: Vec<String>, proxy: &ProxySettings) -> Result<Self, NotifyError> {
        let mut builder = Client::builder().timeout(SEND_TIMEOUT);
        if let Some(url) = &proxy.http {
            builder = builder.proxy(Proxy::http(url)?);
        }
        if let Some(url) = &proxy.https {
            builder = builder.proxy(Proxy::https(url)?);
        }
        Ok(Self {
            endpoints,
            http: builder.build()?,
        })
    }

    /// Send a text message to every endpoint, in order.
    ///
    /// Returns true only when all endpoints accept the message. The first
    /// failure stops the pass and yields false; transport errors are
    /// logged, never propagated. An empty endpoint set is a no-op success.
    pub async fn send_text(
        &self,
        content: &str,
        mentioned: &[String],
        mentioned_mobiles: &[String],
    ) -> bool {
        let message = TextMessage::text(content, mentioned, mentioned_mobiles);
        for endpoint in &self.endpoints {
            match self.deliver(endpoint, &message).await {
                Ok(()) => debug!("Webhook delivered to {}", endpoint),
                Err(e) => {
                    warn!("Webhook delivery to {} failed: {}", endpoint, e);
                    return false;
                }
            }
        }
        true
    }

    async fn deliver(&self, endpoint: &str, message: &TextMessage) -> Result<(), NotifyError> {
        let response = self.http.post(endpoint).json(message).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(NotifyError::HttpStatus(status.as_u16()));
        }

        let reply: WebhookReply = response.json().await?;
        if reply.errcode != 0 {
            return Err(NotifyError::Rejected {
                errcode: reply.errcode,
                errmsg: reply.errmsg.unwrap_or_default(),
            });
        }
        Ok(())
    }
}
