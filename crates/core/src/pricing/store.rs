//! Pricing storage trait.
//!
//! This module defines the storage interface for pricing records. The trait
//! abstracts the persistence layer, allowing different storage backends to be
//! used interchangeably, and mock stores in tests.
//!
//! # Design Notes
//!
//! - Reads are sync (pooled connection, fast single-pair query)
//! - Mutations are async (they go through the storage crate's serialized
//!   write path)
//! - `upsert_default` is a single conditional write so that concurrent
//!   default-path applies cannot create two baseline records for one pair

use async_trait::async_trait;

use super::model::{
    NewPricingInterval, PriceFields, PricingInterval, PricingIntervalUpdate, UpsertOutcome,
};
use super::types::PricingPair;
use crate::errors::Result;

/// Storage interface for pricing records.
#[async_trait]
pub trait PricingStore: Send + Sync {
    /// All pricing records for one pair, in no particular order.
    fn fetch_by_pair(&self, pair: &PricingPair) -> Result<Vec<PricingInterval>>;

    /// Inserts a record; the store assigns the id and creation timestamp.
    async fn insert(&self, record: NewPricingInterval) -> Result<PricingInterval>;

    /// Applies a partial update to one record.
    ///
    /// Fails with `DatabaseError::NotFound` when no record has `id`.
    async fn update_fields(
        &self,
        id: &str,
        update: PricingIntervalUpdate,
    ) -> Result<PricingInterval>;

    /// Creates or updates the pair's default record in one conditional write.
    ///
    /// The returned outcome reports whether a record was created or an
    /// existing baseline was updated.
    async fn upsert_default(&self, pair: &PricingPair, fields: PriceFields)
        -> Result<UpsertOutcome>;
}
