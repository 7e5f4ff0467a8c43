//! Database models for pricing records.
//!
//! Dates are stored as ISO-8601 text, money and percent fields as decimal
//! text. The `is_default` column mirrors the domain's validity tag; a row
//! with `is_default` set carries no dates.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use channelops_core::errors::{Error, Result, ValidationError};
use channelops_core::pricing::{
    Channel, DateWindow, NewPricingInterval, PricingInterval, PricingIntervalUpdate, Validity,
};

/// Database model for pricing records.
#[derive(
    Queryable,
    Identifiable,
    Selectable,
    Insertable,
    AsChangeset,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::pricing_intervals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PricingIntervalDb {
    pub id: String,
    pub product_id: String,
    pub channel: String,
    pub selling_price: String,
    pub supply_price: String,
    pub fee_percent: String,
    pub is_default: bool,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub created_at: String,
}

impl PricingIntervalDb {
    /// Builds a row for a new record; the repository supplies the id and
    /// creation timestamp.
    pub fn from_new(record: &NewPricingInterval, id: String, created_at: DateTime<Utc>) -> Self {
        let (is_default, start_date, end_date) = match &record.validity {
            Validity::Default => (true, None, None),
            Validity::Scheduled(window) => (
                false,
                window.start().map(|d| d.to_string()),
                window.end().map(|d| d.to_string()),
            ),
        };
        Self {
            id,
            product_id: record.product_id.clone(),
            channel: record.channel.as_str().to_string(),
            selling_price: record.selling_price.to_string(),
            supply_price: record.supply_price.to_string(),
            fee_percent: record.fee_percent.to_string(),
            is_default,
            start_date,
            end_date,
            created_at: created_at.to_rfc3339(),
        }
    }
}

/// Partial-update changeset; `None` columns are left untouched.
#[derive(AsChangeset, Debug, Clone, Default)]
#[diesel(table_name = crate::schema::pricing_intervals)]
pub struct PricingIntervalUpdateDb {
    pub selling_price: Option<String>,
    pub supply_price: Option<String>,
    pub fee_percent: Option<String>,
    pub end_date: Option<String>,
}

impl From<&PricingIntervalUpdate> for PricingIntervalUpdateDb {
    fn from(update: &PricingIntervalUpdate) -> Self {
        Self {
            selling_price: update.selling_price.map(|d| d.to_string()),
            supply_price: update.supply_price.map(|d| d.to_string()),
            fee_percent: update.fee_percent.map(|d| d.to_string()),
            end_date: update.end_date.map(|d| d.to_string()),
        }
    }
}

// Conversion to domain models. Dates and decimals are load-bearing for the
// interval math, so a malformed row surfaces as an error instead of a
// silently defaulted value.
impl TryFrom<PricingIntervalDb> for PricingInterval {
    type Error = Error;

    fn try_from(db: PricingIntervalDb) -> Result<PricingInterval> {
        let parse_date = |s: &str| s.parse::<NaiveDate>().map_err(Error::from);

        let validity = if db.is_default {
            Validity::Default
        } else {
            let start = db.start_date.as_deref().map(parse_date).transpose()?;
            let end = db.end_date.as_deref().map(parse_date).transpose()?;
            Validity::Scheduled(DateWindow::new(start, end)?)
        };

        let created_at = DateTime::parse_from_rfc3339(&db.created_at)
            .map_err(|e| {
                Error::Validation(ValidationError::InvalidInput(format!(
                    "bad created_at on record {}: {e}",
                    db.id
                )))
            })?
            .with_timezone(&Utc);

        Ok(PricingInterval {
            id: db.id,
            product_id: db.product_id,
            channel: Channel::new(&db.channel),
            selling_price: Decimal::from_str(&db.selling_price)?,
            supply_price: Decimal::from_str(&db.supply_price)?,
            fee_percent: Decimal::from_str(&db.fee_percent)?,
            validity,
            created_at,
        })
    }
}
