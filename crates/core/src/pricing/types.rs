//! Strong types for the pricing engine.
//!
//! These types enforce clear boundaries and prevent mixing of concepts:
//! - `Channel` - Case-normalized sales-channel identifier
//! - `PricingPair` - The (product, channel) unit of interval management

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Channel
// =============================================================================

/// Sales-channel identifier, case-normalized.
///
/// Channel names arrive from the dashboard in whatever casing the operator
/// typed ("Coupang", "COUPANG", " coupang "). All comparisons, locks, and
/// storage use the trimmed uppercase form, so construction normalizes once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Channel(String);

impl Channel {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Channel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Channel {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Channel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// PricingPair
// =============================================================================

/// A (product, channel) combination.
///
/// The unit of independent interval management, and the key for pair locks
/// and the lookup cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPair {
    pub product_id: String,
    pub channel: Channel,
}

impl PricingPair {
    pub fn new(product_id: impl Into<String>, channel: impl Into<Channel>) -> Self {
        Self {
            product_id: product_id.into(),
            channel: channel.into(),
        }
    }
}

impl fmt::Display for PricingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.product_id, self.channel)
    }
}
