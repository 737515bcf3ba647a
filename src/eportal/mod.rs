//! eportal protocol implementation
//!
//! The campus gateway speaks a JSONP-style login protocol: a GET request
//! carrying the credentials as query parameters, answered with a JSON
//! object wrapped in a synthetic callback call. This module probes campus
//! reachability, performs the exchange and classifies the result.

pub mod auth;

pub use auth::{LoginError, LoginOutcome, PortalClient, PortalConfig};
