//! Bulk pricing service.
//!
//! Orchestrates the interval resolver across the cross-product of requested
//! products and channels, isolating per-pair failures, and answers
//! point-in-time price lookups for the valuation pipeline.

use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::lookup;
use super::model::{
    DateWindow, NewPricingInterval, PriceFields, PricingInterval, PricingIntervalUpdate,
    UpsertOutcome, Validity,
};
use super::resolver::{self, PricingConflict, ResolverPlan};
use super::store::PricingStore;
use super::types::{Channel, PricingPair};
use crate::errors::{Result, ValidationError};

// =============================================================================
// Request / response models
// =============================================================================

/// A bulk-pricing request: one price applied across products × channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPricingSpec {
    pub product_ids: Vec<String>,
    pub channels: Vec<String>,
    pub selling_price: Decimal,
    pub supply_price: Decimal,
    pub fee_percent: Decimal,
    /// Apply as the always-active baseline instead of a dated window.
    #[serde(default)]
    pub is_always_apply: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Shorten existing windows that collide with the new one.
    #[serde(default = "default_close_overlaps")]
    pub close_overlaps: bool,
    /// Compute the mutation plans without persisting anything.
    #[serde(default)]
    pub validate_only: bool,
}

fn default_close_overlaps() -> bool {
    true
}

impl BulkPricingSpec {
    /// Spec-level guard. Field-level validation (types, presence) belongs to
    /// the calling boundary; date ordering and ranges are re-checked here.
    ///
    /// Returns the validity every planned record will carry.
    pub fn validate(&self) -> Result<Validity> {
        if self.product_ids.is_empty() {
            return Err(ValidationError::MissingField("productIds".to_string()).into());
        }
        if self.channels.is_empty() {
            return Err(ValidationError::MissingField("channels".to_string()).into());
        }
        if self.selling_price < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "sellingPrice must not be negative".to_string(),
            )
            .into());
        }
        if self.supply_price < Decimal::ZERO {
            return Err(ValidationError::InvalidInput(
                "supplyPrice must not be negative".to_string(),
            )
            .into());
        }
        if self.fee_percent < Decimal::ZERO || self.fee_percent > Decimal::ONE_HUNDRED {
            return Err(ValidationError::InvalidInput(
                "feePercent must be between 0 and 100".to_string(),
            )
            .into());
        }

        if self.is_always_apply {
            Ok(Validity::Default)
        } else {
            DateWindow::new(self.start_date, self.end_date).map(Validity::Scheduled)
        }
    }

    fn price_fields(&self) -> PriceFields {
        PriceFields {
            selling_price: self.selling_price,
            supply_price: self.supply_price,
            fee_percent: self.fee_percent,
        }
    }
}

/// A pair whose apply failed; the rest of the batch continued without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairError {
    pub product_id: String,
    pub channel: Channel,
    pub message: String,
}

/// The staged mutation plan for one pair, returned in validate-only mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairPreview {
    pub product_id: String,
    pub channel: Channel,
    pub plan: ResolverPlan,
}

/// Aggregated result of one bulk-pricing call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkPricingOutcome {
    pub created_count: usize,
    pub adjusted_count: usize,
    pub errors: Vec<PairError>,
    pub conflicts: Vec<PricingConflict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<PairPreview>>,
}

// =============================================================================
// Service trait
// =============================================================================

/// Pricing operations exposed to the calling boundary.
#[async_trait]
pub trait PricingServiceTrait: Send + Sync {
    /// Applies one price spec across every (product, channel) pair.
    ///
    /// Only a malformed spec fails the call; every per-pair failure is
    /// recorded in the outcome and the batch continues.
    async fn apply_bulk_pricing(&self, spec: BulkPricingSpec) -> Result<BulkPricingOutcome>;

    /// Resolves the price applicable to one pair on one date.
    fn lookup_price(&self, pair: &PricingPair, date: NaiveDate)
        -> Result<Option<PricingInterval>>;
}

// =============================================================================
// Service implementation
// =============================================================================

#[derive(Default)]
struct PairCounts {
    created: usize,
    adjusted: usize,
}

pub struct PricingService {
    store: Arc<dyn PricingStore>,
    /// Serializes mutations per pair across concurrent bulk-apply calls.
    pair_locks: DashMap<PricingPair, Arc<Mutex<()>>>,
    /// Read-through cache for lookups, dropped per pair on every mutation.
    lookup_cache: DashMap<PricingPair, Arc<Vec<PricingInterval>>>,
}

impl PricingService {
    pub fn new(store: Arc<dyn PricingStore>) -> Self {
        Self {
            store,
            pair_locks: DashMap::new(),
            lookup_cache: DashMap::new(),
        }
    }

    fn pair_lock(&self, pair: &PricingPair) -> Arc<Mutex<()>> {
        self.pair_locks
            .entry(pair.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn pair_records(&self, pair: &PricingPair) -> Result<Arc<Vec<PricingInterval>>> {
        if let Some(hit) = self.lookup_cache.get(pair) {
            return Ok(Arc::clone(hit.value()));
        }
        let records = Arc::new(self.store.fetch_by_pair(pair)?);
        self.lookup_cache.insert(pair.clone(), Arc::clone(&records));
        Ok(records)
    }

    /// Fetch, resolve, and either stage or execute one pair's plan.
    ///
    /// Caller holds the pair lock. Counts from a pair that later fails are
    /// discarded; its conflicts stand, since they were detected before the
    /// failure.
    async fn apply_pair(
        &self,
        pair: &PricingPair,
        candidate: &NewPricingInterval,
        spec: &BulkPricingSpec,
        outcome: &mut BulkPricingOutcome,
    ) -> Result<()> {
        let existing = self.store.fetch_by_pair(pair)?;
        let plan = resolver::resolve(&existing, candidate, spec.close_overlaps);

        debug!(
            "pair {}: {} insertion(s), {} truncation(s), {} conflict(s)",
            pair,
            plan.insertions.len(),
            plan.truncations.len(),
            plan.conflicts.len()
        );
        outcome.conflicts.extend(plan.conflicts.iter().cloned());

        if spec.validate_only {
            if let Some(preview) = outcome.preview.as_mut() {
                preview.push(PairPreview {
                    product_id: pair.product_id.clone(),
                    channel: pair.channel.clone(),
                    plan,
                });
            }
            return Ok(());
        }

        let has_writes = plan.has_writes();
        let executed = self.execute_plan(pair, plan).await;
        if has_writes {
            // Even a partially-executed plan may have written; never serve
            // stale records after an attempt.
            self.lookup_cache.remove(pair);
        }
        let counts = executed?;
        outcome.created_count += counts.created;
        outcome.adjusted_count += counts.adjusted;
        Ok(())
    }

    async fn execute_plan(&self, pair: &PricingPair, plan: ResolverPlan) -> Result<PairCounts> {
        let mut counts = PairCounts::default();

        if let Some(default_upsert) = plan.default_upsert {
            match self
                .store
                .upsert_default(pair, default_upsert.fields)
                .await?
            {
                UpsertOutcome::Created(_) => counts.created += 1,
                UpsertOutcome::Updated(_) => counts.adjusted += 1,
            }
        }

        for truncation in plan.truncations {
            self.store
                .update_fields(
                    &truncation.record_id,
                    PricingIntervalUpdate::truncate_to(truncation.new_end),
                )
                .await?;
            counts.adjusted += 1;
        }

        for insertion in plan.insertions {
            self.store.insert(insertion).await?;
            counts.created += 1;
        }

        Ok(counts)
    }
}

#[async_trait]
impl PricingServiceTrait for PricingService {
    async fn apply_bulk_pricing(&self, spec: BulkPricingSpec) -> Result<BulkPricingOutcome> {
        let validity = spec.validate()?;
        let fields = spec.price_fields();

        let mut outcome = BulkPricingOutcome {
            preview: spec.validate_only.then(Vec::new),
            ..BulkPricingOutcome::default()
        };

        for product_id in &spec.product_ids {
            for channel_raw in &spec.channels {
                let pair = PricingPair::new(product_id.clone(), Channel::new(channel_raw));
                let candidate = NewPricingInterval {
                    product_id: pair.product_id.clone(),
                    channel: pair.channel.clone(),
                    selling_price: fields.selling_price,
                    supply_price: fields.supply_price,
                    fee_percent: fields.fee_percent,
                    validity,
                };

                let lock = self.pair_lock(&pair);
                let _guard = lock.lock().await;
                if let Err(err) = self.apply_pair(&pair, &candidate, &spec, &mut outcome).await {
                    warn!("pair {} failed: {}", pair, err);
                    outcome.errors.push(PairError {
                        product_id: pair.product_id.clone(),
                        channel: pair.channel.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }

        info!(
            "bulk pricing applied: {} created, {} adjusted, {} error(s), {} conflict(s){}",
            outcome.created_count,
            outcome.adjusted_count,
            outcome.errors.len(),
            outcome.conflicts.len(),
            if spec.validate_only { " (dry run)" } else { "" }
        );
        Ok(outcome)
    }

    fn lookup_price(
        &self,
        pair: &PricingPair,
        date: NaiveDate,
    ) -> Result<Option<PricingInterval>> {
        let records = self.pair_records(pair)?;
        Ok(lookup::applicable_on(&records, date).cloned())
    }
}
