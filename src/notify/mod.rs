//! Login result notification
//!
//! Delivers a text report to enterprise-chat webhook endpoints. Proxy
//! settings are discovered once from the environment and injected into
//! the notifier's HTTP client at construction, so delivery behavior is
//! fixed for the lifetime of the instance.

pub mod proxy;
pub mod webhook;

pub use proxy::ProxySettings;
pub use webhook::{Notifier, NotifyError, TextMessage};
