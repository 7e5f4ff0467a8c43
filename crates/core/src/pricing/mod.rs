//! Channel pricing module - models, resolver, services, and traits.
//!
//! The engine maintains, per (product, channel) pair, either one
//! always-active baseline price or a set of non-overlapping scheduled price
//! windows, and resolves the price applicable on any given date.
//!
//! - [`model`] - Domain models: records, validity, date windows
//! - [`resolver`] - Pure mutation planning for one pair
//! - [`lookup`] - Pure point-in-time record selection
//! - [`store`] - Storage trait implemented by the storage crate
//! - [`service`] - Bulk apply orchestration and lookup wiring

pub mod lookup;
pub mod model;
pub mod resolver;
pub mod service;
pub mod store;
pub mod types;


// Re-export commonly used types for convenience
pub use model::{
    DateWindow, NewPricingInterval, PriceFields, PricingInterval, PricingIntervalUpdate,
    UpsertOutcome, Validity,
};
pub use resolver::{
    resolve, ConflictReason, DefaultUpsert, PricingConflict, ResolverPlan, Truncation,
};
pub use service::{
    BulkPricingOutcome, BulkPricingSpec, PairError, PairPreview, PricingService,
    PricingServiceTrait,
};
pub use store::PricingStore;
pub use types::{Channel, PricingPair};
