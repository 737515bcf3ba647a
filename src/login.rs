//! Login orchestration
//!
//! Wires the config, portal client and notifier into one run: check the
//! credentials, attempt the login, report the outcome. This is the entry
//! point the external task scheduler invokes; it never panics and all
//! failure ends up in the returned flag and the printed message.

use std::net::IpAddr;
use tracing::{info, warn};

use crate::config::Config;
use crate::eportal::{LoginOutcome, PortalClient, PortalConfig};
use crate::net;
use crate::notify::{Notifier, ProxySettings};

pub struct AutoLogin {
    config: Config,
    portal: PortalConfig,
}

impl AutoLogin {
    /// Orchestrator against the default AHU gateway.
    pub fn new(config: Config) -> Self {
        Self::with_portal(config, PortalConfig::default())
    }

    /// Orchestrator against a specific gateway (other campuses, tests).
    pub fn with_portal(config: Config, portal: PortalConfig) -> Self {
        Self { config, portal }
    }

    /// Run one complete login attempt.
    ///
    /// Incomplete credentials fail fast without touching the network. On a
    /// successful login with webhooks configured, a report is sent before
    /// the result is printed; delivery problems are logged and do not
    /// change the returned flag.
    pub async fn run(&self) -> bool {
        if !self.config.is_complete() {
            println!("config incomplete: set student_id and password in the config file");
            return false;
        }

        let client_ip = net::resolve_local_ip();
        info!("Logging in as {} from {}", self.config.student_id, client_ip);

        let client = match PortalClient::new(
            self.portal.clone(),
            self.config.student_id.clone(),
            self.config.password.clone(),
            client_ip,
        ) {
            Ok(client) => client,
            Err(e) => {
                println!("{}", e);
                return false;
            }
        };

        let outcome = client.login().await;

        if outcome.success && !self.config.webhook_urls.is_empty() {
            self.send_notification(&outcome, client_ip).await;
        }

        println!("{}", outcome.message);
        outcome.success
    }

    async fn send_notification(&self, outcome: &LoginOutcome, client_ip: IpAddr) {
        let proxy = ProxySettings::from_env();
        let notifier = match Notifier::new(self.config.webhook_urls.clone(), &proxy) {
            Ok(notifier) => notifier,
            Err(e) => {
                warn!("Could not build notifier: {}", e);
                return;
            }
        };

        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let content = format!(
            "Campus network login succeeded\n\n\
             Account: {}\n\
             IP address: {}\n\
             Result: {}\n\
             Time: {}",
            self.config.student_id, client_ip, outcome.message, timestamp
        );

        if notifier.send_text(&content, &[], &[]).await {
            info!("Login notification delivered");
        } else {
            warn!("Login notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{any, body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn portal_for(server: &MockServer) -> PortalConfig {
        PortalConfig {
            base_url: format!("{}/eportal/", server.uri()),
            check_url: format!("{}/a79.htm", server.uri()),
            referer: format!("{}/", server.uri()),
            callback: "dr1003".to_string(),
        }
    }

    fn config(webhook_urls: Vec<String>) -> Config {
        Config {
            student_id: "E02114000".to_string(),
            password: "secret".to_string(),
            webhook_urls,
        }
    }

    async fn mount_portal(server: &MockServer, login_body: &str) {
        Mock::given(method("GET"))
            .and(path("/a79.htm"))
            .respond_with(ResponseTemplate::new(200))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/eportal/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(login_body.to_string()))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_incomplete_credentials_touch_nothing() {
        let server = MockServer::start().await;
        // Zero HTTP requests of any kind are allowed.
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let incomplete = Config {
            student_id: "E02114000".to_string(),
            password: String::new(),
            webhook_urls: vec![],
        };
        let orchestrator = AutoLogin::with_portal(incomplete, portal_for(&server));
        assert!(!orchestrator.run().await);
    }

    #[tokio::test]
    async fn test_successful_run_notifies_webhook() {
        let portal = MockServer::start().await;
        let webhook = MockServer::start().await;
        mount_portal(&portal, r#"dr1003({"result":"1"})"#).await;
        Mock::given(method("POST"))
            .and(body_string_contains("E02114000"))
            .and(body_string_contains("login succeeded"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"errcode":0,"errmsg":"ok"}"#),
            )
            .expect(1)
            .mount(&webhook)
            .await;

        let orchestrator =
            AutoLogin::with_portal(config(vec![webhook.uri()]), portal_for(&portal));
        assert!(orchestrator.run().await);
    }

    #[tokio::test]
    async fn test_failed_login_sends_no_notification() {
        let portal = MockServer::start().await;
        let webhook = MockServer::start().await;
        mount_portal(&portal, r#"dr1003({"result":"0","msg":"密码错误"})"#).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&webhook)
            .await;

        let orchestrator =
            AutoLogin::with_portal(config(vec![webhook.uri()]), portal_for(&portal));
        assert!(!orchestrator.run().await);
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_login_result() {
        let portal = MockServer::start().await;
        let webhook = MockServer::start().await;
        mount_portal(&portal, r#"dr1003({"result":"1"})"#).await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"errcode":93000,"errmsg":"invalid key"}"#),
            )
            .expect(1)
            .mount(&webhook)
            .await;

        let orchestrator =
            AutoLogin::with_portal(config(vec![webhook.uri()]), portal_for(&portal));
        // The login itself succeeded; a lost notification must not flip it.
        assert!(orchestrator.run().await);
    }

    #[tokio::test]
    async fn test_success_without_webhooks_skips_notification() {
        let portal = MockServer::start().await;
        mount_portal(&portal, r#"dr1003({"result":"1"})"#).await;

        let orchestrator = AutoLogin::with_portal(config(vec![]), portal_for(&portal));
        assert!(orchestrator.run().await);
    }
}
