//! SQLite storage implementation for pricing records.

mod model;
mod repository;

pub use model::{PricingIntervalDb, PricingIntervalUpdateDb};
pub use repository::PricingRepository;
