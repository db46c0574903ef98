//! MoMo Collections upstream: token exchange and the proxied calls.

pub mod client;
pub mod error;
pub mod token;

pub use client::{MomoClient, UpstreamResponse};
pub use error::UpstreamError;
