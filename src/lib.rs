//! AHU ePortal - automatic campus network login
//!
//! This crate authenticates against the AHU campus-network eportal
//! gateway (a captive-portal-style JSONP login protocol) and reports the
//! outcome to enterprise-chat webhook endpoints. The binary is meant to
//! be invoked periodically by an OS task scheduler; each invocation is
//! one complete login attempt.
//!
//! # Architecture
//!
//! - `config`: Configuration file handling (JSON, shared with the desktop form)
//! - `net`: Best-effort local IP discovery
//! - `eportal`: Reachability probe and portal authentication exchange
//! - `notify`: Proxy discovery and webhook notification delivery
//! - `login`: Orchestration of one login run
//!
//! # Usage
//!
//! From a scheduled task:
//! ```bash
//! ahu-eportal login -c /path/to/config.json
//! ```

pub mod config;
pub mod eportal;
pub mod login;
pub mod net;
pub mod notify;

pub use config::Config;
pub use eportal::{PortalClient, PortalConfig};
pub use login::AutoLogin;
pub use notify::{Notifier, ProxySettings};
