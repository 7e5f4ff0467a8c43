//! Pricing domain models.
//!
//! A pricing record is either the pair's always-active baseline
//! (`Validity::Default`) or a time-limited window (`Validity::Scheduled`).
//! The distinction is a tagged enum so that "default vs. scheduled" cannot
//! drift apart from the presence of dates.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Channel, PricingPair};
use crate::errors::{Result, ValidationError};

// =============================================================================
// Date Window
// =============================================================================

/// Inclusive date window with optional bounds.
///
/// A missing bound is unbounded in that direction. At least one bound is
/// always present, and `start > end` is unrepresentable; both are enforced
/// by the constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        match (start, end) {
            (None, None) => Err(ValidationError::InvalidInput(
                "a scheduled window needs at least one of startDate/endDate".to_string(),
            )
            .into()),
            (Some(s), Some(e)) if s > e => Err(ValidationError::InvalidInput(format!(
                "window start {s} is after end {e}"
            ))
            .into()),
            _ => Ok(Self { start, end }),
        }
    }

    /// Open-ended window, active from `start` onward.
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// Window bounded on both sides.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        Self::new(Some(start), Some(end))
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDate> {
        self.end
    }

    pub fn is_open_ended(&self) -> bool {
        self.end.is_none()
    }

    /// Inclusive containment; missing bounds are unbounded.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| s <= date) && self.end.map_or(true, |e| date <= e)
    }

    /// Two windows overlap when each starts no later than the other ends.
    pub fn overlaps(&self, other: &DateWindow) -> bool {
        let self_starts_in_time = match (self.start, other.end) {
            (Some(s), Some(e)) => s <= e,
            _ => true,
        };
        let other_starts_in_time = match (other.start, self.end) {
            (Some(s), Some(e)) => s <= e,
            _ => true,
        };
        self_starts_in_time && other_starts_in_time
    }

    /// True when `self` extends strictly beyond `other` on both sides.
    ///
    /// Only a window bounded on both sides can strictly contain another;
    /// a missing bound on `other` means `self` cannot out-reach it there.
    pub fn strictly_contains(&self, other: &DateWindow) -> bool {
        match (self.start, self.end) {
            (Some(s), Some(e)) => {
                other.start.is_some_and(|os| s < os) && other.end.is_some_and(|oe| e > oe)
            }
            _ => false,
        }
    }
}

// =============================================================================
// Validity
// =============================================================================

/// Whether a record is the pair's always-active baseline or a scheduled
/// window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Validity {
    /// The always-active baseline price. No dates.
    Default,
    /// A time-limited price window.
    Scheduled(DateWindow),
}

impl Validity {
    pub fn is_default(&self) -> bool {
        matches!(self, Validity::Default)
    }

    pub fn window(&self) -> Option<&DateWindow> {
        match self {
            Validity::Default => None,
            Validity::Scheduled(window) => Some(window),
        }
    }
}

// =============================================================================
// Pricing Interval
// =============================================================================

/// A pricing record for one (product, channel) pair.
///
/// Created by the bulk applier on apply; mutated only by truncation
/// (shortening a window's end); never deleted by this engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingInterval {
    pub id: String,
    pub product_id: String,
    pub channel: Channel,
    pub selling_price: Decimal,
    pub supply_price: Decimal,
    pub fee_percent: Decimal,
    pub validity: Validity,
    pub created_at: DateTime<Utc>,
}

impl PricingInterval {
    pub fn pair(&self) -> PricingPair {
        PricingPair::new(self.product_id.clone(), self.channel.clone())
    }

    /// Whether this record's validity covers `date`.
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match &self.validity {
            Validity::Default => true,
            Validity::Scheduled(window) => window.contains(date),
        }
    }
}

/// Input model for inserting a pricing record; the store assigns the id and
/// creation timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPricingInterval {
    pub product_id: String,
    pub channel: Channel,
    pub selling_price: Decimal,
    pub supply_price: Decimal,
    pub fee_percent: Decimal,
    pub validity: Validity,
}

impl NewPricingInterval {
    pub fn pair(&self) -> PricingPair {
        PricingPair::new(self.product_id.clone(), self.channel.clone())
    }
}

// =============================================================================
// Write payloads
// =============================================================================

/// The price fields carried by a bulk-pricing spec, applied as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceFields {
    pub selling_price: Decimal,
    pub supply_price: Decimal,
    pub fee_percent: Decimal,
}

/// Partial update of one pricing record. `None` fields are left untouched.
///
/// The engine only ever shortens an end date, so `end_date` carries the new
/// end when set and is never used to clear one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingIntervalUpdate {
    pub selling_price: Option<Decimal>,
    pub supply_price: Option<Decimal>,
    pub fee_percent: Option<Decimal>,
    pub end_date: Option<NaiveDate>,
}

impl PricingIntervalUpdate {
    /// Truncation: shorten the record's window to end on `new_end`.
    pub fn truncate_to(new_end: NaiveDate) -> Self {
        Self {
            end_date: Some(new_end),
            ..Self::default()
        }
    }

    /// Default-path update: replace the price fields, leave dates alone.
    pub fn prices(fields: &PriceFields) -> Self {
        Self {
            selling_price: Some(fields.selling_price),
            supply_price: Some(fields.supply_price),
            fee_percent: Some(fields.fee_percent),
            end_date: None,
        }
    }
}

/// What `upsert_default` did to the pair's baseline record.
#[derive(Debug, Clone)]
pub enum UpsertOutcome {
    Created(PricingInterval),
    Updated(PricingInterval),
}

impl UpsertOutcome {
    pub fn record(&self) -> &PricingInterval {
        match self {
            UpsertOutcome::Created(record) | UpsertOutcome::Updated(record) => record,
        }
    }
}
