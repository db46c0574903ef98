//! # MoMo Collections proxy
//!
//! Validates inbound REST calls, obtains and caches the MoMo bearer token,
//! forwards the call to the Collections API with the required headers and
//! relays the upstream answer in a normalized JSON envelope.
//!
//! Modules:
//! - `config`: YAML service configuration, defaults and validation
//! - `cache`: per product line bearer token cache
//! - `upstream`: MoMo token exchange and proxied Collections calls
//! - `handlers`: HTTP handlers for the proxy routes
//! - `auth`: best-effort inbound caller resolution

pub mod auth;
pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod helpers;
pub mod models;
pub mod observability;
pub mod server;
pub mod upstream;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::service::ServiceConfig;
pub use crate::upstream::MomoClient;
