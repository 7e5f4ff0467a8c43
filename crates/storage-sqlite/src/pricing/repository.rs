use channelops_core::pricing::{
    NewPricingInterval, PriceFields, PricingInterval, PricingIntervalUpdate, PricingPair,
    PricingStore, UpsertOutcome, Validity,
};
use channelops_core::Result;

use super::model::{PricingIntervalDb, PricingIntervalUpdateDb};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::pricing_intervals;
use crate::schema::pricing_intervals::dsl::*;

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::debug;

use std::sync::Arc;
use uuid::Uuid;

pub struct PricingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PricingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        PricingRepository { pool, writer }
    }

    fn fetch_by_pair_impl(&self, pair: &PricingPair) -> Result<Vec<PricingInterval>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = pricing_intervals
            .filter(product_id.eq(pair.product_id.as_str()))
            .filter(channel.eq(pair.channel.as_str()))
            .load::<PricingIntervalDb>(&mut conn)
            .map_err(StorageError::from)?;
        rows.into_iter().map(PricingInterval::try_from).collect()
    }

    fn find_default(
        conn: &mut SqliteConnection,
        pair: &PricingPair,
    ) -> Result<Option<PricingIntervalDb>> {
        let row = pricing_intervals
            .filter(product_id.eq(pair.product_id.as_str()))
            .filter(channel.eq(pair.channel.as_str()))
            .filter(is_default.eq(true))
            .first::<PricingIntervalDb>(conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row)
    }
}

#[async_trait]
impl PricingStore for PricingRepository {
    fn fetch_by_pair(&self, pair: &PricingPair) -> Result<Vec<PricingInterval>> {
        self.fetch_by_pair_impl(pair)
    }

    async fn insert(&self, record: NewPricingInterval) -> Result<PricingInterval> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PricingInterval> {
                let row =
                    PricingIntervalDb::from_new(&record, Uuid::new_v4().to_string(), Utc::now());
                let inserted = diesel::insert_into(pricing_intervals::table)
                    .values(&row)
                    .returning(PricingIntervalDb::as_returning())
                    .get_result::<PricingIntervalDb>(conn)
                    .map_err(StorageError::from)?;
                inserted.try_into()
            })
            .await
    }

    async fn update_fields(
        &self,
        record_id: &str,
        update: PricingIntervalUpdate,
    ) -> Result<PricingInterval> {
        let record_id = record_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<PricingInterval> {
                let changes = PricingIntervalUpdateDb::from(&update);
                diesel::update(pricing_intervals.find(&record_id))
                    .set(&changes)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let row = pricing_intervals
                    .find(&record_id)
                    .first::<PricingIntervalDb>(conn)
                    .map_err(StorageError::from)?;
                row.try_into()
            })
            .await
    }

    async fn upsert_default(
        &self,
        pair: &PricingPair,
        fields: PriceFields,
    ) -> Result<UpsertOutcome> {
        let pair = pair.clone();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<UpsertOutcome> {
                // Check-and-write runs inside the writer's immediate
                // transaction, so two racing applies cannot both insert.
                match Self::find_default(conn, &pair)? {
                    Some(existing) => {
                        let changes = PricingIntervalUpdateDb {
                            selling_price: Some(fields.selling_price.to_string()),
                            supply_price: Some(fields.supply_price.to_string()),
                            fee_percent: Some(fields.fee_percent.to_string()),
                            end_date: None,
                        };
                        let updated = diesel::update(pricing_intervals.find(&existing.id))
                            .set(&changes)
                            .returning(PricingIntervalDb::as_returning())
                            .get_result::<PricingIntervalDb>(conn)
                            .map_err(StorageError::from)?;
                        debug!("refreshed default record {} for {}", existing.id, pair);
                        Ok(UpsertOutcome::Updated(updated.try_into()?))
                    }
                    None => {
                        let record = NewPricingInterval {
                            product_id: pair.product_id.clone(),
                            channel: pair.channel.clone(),
                            selling_price: fields.selling_price,
                            supply_price: fields.supply_price,
                            fee_percent: fields.fee_percent,
                            validity: Validity::Default,
                        };
                        let row = PricingIntervalDb::from_new(
                            &record,
                            Uuid::new_v4().to_string(),
                            Utc::now(),
                        );
                        let inserted = diesel::insert_into(pricing_intervals::table)
                            .values(&row)
                            .returning(PricingIntervalDb::as_returning())
                            .get_result::<PricingIntervalDb>(conn)
                            .map_err(StorageError::from)?;
                        debug!("created default record {} for {}", inserted.id, pair);
                        Ok(UpsertOutcome::Created(inserted.try_into()?))
                    }
                }
            })
            .await
    }
}
