use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// MoMo API family a bearer token is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductLine {
    Collection,
    /// reserved, no upstream calls are made for it
    Disbursement,
    /// reserved, no upstream calls are made for it
    Remittance,
}

impl ProductLine {
    pub const ALL: [ProductLine; 3] = [
        ProductLine::Collection,
        ProductLine::Disbursement,
        ProductLine::Remittance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductLine::Collection => "collection",
            ProductLine::Disbursement => "disbursement",
            ProductLine::Remittance => "remittance",
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, ProductLine::Collection)
    }
}

impl fmt::Display for ProductLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown product line '{0}'")]
pub struct UnknownProductLine(pub String);

impl FromStr for ProductLine {
    type Err = UnknownProductLine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "collection" => Ok(ProductLine::Collection),
            "disbursement" => Ok(ProductLine::Disbursement),
            "remittance" => Ok(ProductLine::Remittance),
            _ => Err(UnknownProductLine(s.to_owned())),
        }
    }
}

/// Bearer token together with the instant after which it must not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Usable when `now + safety_margin` is still strictly before expiry.
    pub fn is_valid_at(&self, now: DateTime<Utc>, safety_margin_seconds: u64) -> bool {
        let margin = Duration::try_seconds(safety_margin_seconds as i64).unwrap_or(Duration::MAX);
        now.checked_add_signed(margin)
            .map(|deadline| deadline < self.expires_at)
            .unwrap_or(false)
    }
}
