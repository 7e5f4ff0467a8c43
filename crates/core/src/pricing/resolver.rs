//! Interval resolver.
//!
//! Given one pair's existing records and a candidate record, computes the
//! minimal safe mutation plan: which existing windows to truncate, what to
//! insert, and which overlaps must be left for manual resolution. The
//! resolver performs no I/O; the caller fetches records and executes the
//! plan.

use serde::{Deserialize, Serialize};
use std::fmt;

use chrono::NaiveDate;

use super::model::{NewPricingInterval, PriceFields, PricingInterval, Validity};
use super::types::{Channel, PricingPair};
use crate::utils::date_utils::day_before;

// =============================================================================
// Plan types
// =============================================================================

/// Shorten one record's window to end on `new_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Truncation {
    pub record_id: String,
    pub new_end: NaiveDate,
}

/// Planned default-path write: create or refresh the pair's baseline record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultUpsert {
    pub pair: PricingPair,
    pub fields: PriceFields,
    /// Id of the baseline record observed at resolve time, if any. The store
    /// re-checks under its own write lock; this is informational.
    pub existing_id: Option<String>,
}

/// Why an overlap was left for manual resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictReason {
    /// Truncating would split a bounded record into two disjoint pieces.
    SplitRequired,
    /// The overlapping record does not start before the candidate window,
    /// so shortening its end cannot separate the two.
    TruncationImpossible,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::SplitRequired => write!(f, "split required"),
            ConflictReason::TruncationImpossible => write!(f, "truncation impossible"),
        }
    }
}

/// An overlap the resolver refused to auto-resolve.
///
/// The conflicting record is left unmutated and the candidate is still
/// inserted, accepting a transient overlap until an operator intervenes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConflict {
    pub product_id: String,
    pub channel: Channel,
    pub record_id: String,
    pub reason: ConflictReason,
}

/// The mutation plan for one pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverPlan {
    pub insertions: Vec<NewPricingInterval>,
    pub truncations: Vec<Truncation>,
    pub default_upsert: Option<DefaultUpsert>,
    pub conflicts: Vec<PricingConflict>,
}

impl ResolverPlan {
    /// Whether executing this plan would write anything.
    pub fn has_writes(&self) -> bool {
        !self.insertions.is_empty() || !self.truncations.is_empty() || self.default_upsert.is_some()
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Computes the mutation plan for one pair.
///
/// The default path never runs interval math: an existing baseline is
/// refreshed, a missing one is created. The scheduled path closes open-ended
/// predecessors, truncates left-overlapping windows to the day before the
/// candidate starts, and flags every overlap that right-truncation cannot
/// separate. With `close_overlaps` disabled, a scheduled candidate is planned
/// as a bare insert.
pub fn resolve(
    existing: &[PricingInterval],
    candidate: &NewPricingInterval,
    close_overlaps: bool,
) -> ResolverPlan {
    let mut plan = ResolverPlan::default();

    let window = match &candidate.validity {
        Validity::Default => {
            let existing_id = existing
                .iter()
                .find(|record| record.validity.is_default())
                .map(|record| record.id.clone());
            plan.default_upsert = Some(DefaultUpsert {
                pair: candidate.pair(),
                fields: PriceFields {
                    selling_price: candidate.selling_price,
                    supply_price: candidate.supply_price,
                    fee_percent: candidate.fee_percent,
                },
                existing_id,
            });
            return plan;
        }
        Validity::Scheduled(window) => window,
    };

    if !close_overlaps {
        plan.insertions.push(candidate.clone());
        return plan;
    }

    let conflict = |record: &PricingInterval, reason: ConflictReason| PricingConflict {
        product_id: record.product_id.clone(),
        channel: record.channel.clone(),
        record_id: record.id.clone(),
        reason,
    };

    // Truncation targets the day before the candidate starts; a candidate
    // without a start bound has no such day, so nothing can be truncated and
    // every overlap it causes goes to manual resolution.
    let cutoff = window.start().map(day_before);

    for record in existing {
        let Validity::Scheduled(record_window) = &record.validity else {
            continue;
        };
        if !record_window.overlaps(window) {
            continue;
        }
        if record_window.strictly_contains(window) {
            plan.conflicts
                .push(conflict(record, ConflictReason::SplitRequired));
            continue;
        }
        // A record qualifies for truncation when its entire remaining span
        // would still be a valid window afterwards: it must start on or
        // before the cutoff day. Anything else overlapping the candidate
        // cannot be separated by shortening its end.
        match cutoff {
            Some(cutoff) if record_window.start().map_or(true, |s| s <= cutoff) => {
                plan.truncations.push(Truncation {
                    record_id: record.id.clone(),
                    new_end: cutoff,
                });
            }
            _ => {
                plan.conflicts
                    .push(conflict(record, ConflictReason::TruncationImpossible));
            }
        }
    }

    plan.insertions.push(candidate.clone());
    plan
}
