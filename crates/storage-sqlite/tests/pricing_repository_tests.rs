//! Integration tests for the SQLite pricing repository.
//!
//! Each test runs against a fresh database file in a temp directory, with
//! migrations applied and the writer actor running.

use std::sync::Arc;

use channelops_core::errors::{DatabaseError, Error};
use channelops_core::pricing::{
    Channel, DateWindow, NewPricingInterval, PriceFields, PricingIntervalUpdate, PricingPair,
    PricingStore, UpsertOutcome, Validity,
};
use channelops_storage_sqlite::db::{create_pool, get_connection, run_migrations, spawn_writer};
use channelops_storage_sqlite::pricing::PricingRepository;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use tempfile::TempDir;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn new_record(pair: &PricingPair, validity: Validity) -> NewPricingInterval {
    NewPricingInterval {
        product_id: pair.product_id.clone(),
        channel: pair.channel.clone(),
        selling_price: dec!(19900),
        supply_price: dec!(12000),
        fee_percent: dec!(10.5),
        validity,
    }
}

fn setup() -> (PricingRepository, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("channelops.db");
    let pool = create_pool(db_path.to_str().expect("utf-8 path")).expect("pool");
    let mut conn = get_connection(&pool).expect("connection");
    run_migrations(&mut conn).expect("migrations");
    let writer = spawn_writer(Arc::clone(&pool));
    (PricingRepository::new(pool, writer), dir)
}

#[tokio::test]
async fn test_insert_and_fetch_round_trip_preserves_validity() {
    let (repo, _dir) = setup();
    let pair = PricingPair::new("p1", "shop");

    repo.insert(new_record(&pair, Validity::Default))
        .await
        .unwrap();
    repo.insert(new_record(
        &pair,
        Validity::Scheduled(DateWindow::starting(d(2025, 1, 1))),
    ))
    .await
    .unwrap();
    repo.insert(new_record(
        &pair,
        Validity::Scheduled(DateWindow::between(d(2025, 3, 1), d(2025, 6, 30)).unwrap()),
    ))
    .await
    .unwrap();

    let records = repo.fetch_by_pair(&pair).unwrap();
    assert_eq!(records.len(), 3);

    let defaults: Vec<_> = records.iter().filter(|r| r.validity.is_default()).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].selling_price, dec!(19900));
    assert_eq!(defaults[0].fee_percent, dec!(10.5));

    let open = records
        .iter()
        .find(|r| r.validity.window().is_some_and(DateWindow::is_open_ended))
        .expect("open-ended record");
    assert_eq!(open.validity.window().unwrap().start(), Some(d(2025, 1, 1)));

    let bounded = records
        .iter()
        .find(|r| r.validity.window().is_some_and(|w| !w.is_open_ended()))
        .expect("bounded record");
    assert_eq!(bounded.validity.window().unwrap().end(), Some(d(2025, 6, 30)));
}

#[tokio::test]
async fn test_fetch_is_scoped_to_the_pair() {
    let (repo, _dir) = setup();
    let shop = PricingPair::new("p1", "shop");
    let mall = PricingPair::new("p1", "mall");
    let other = PricingPair::new("p2", "shop");

    repo.insert(new_record(&shop, Validity::Default)).await.unwrap();
    repo.insert(new_record(&mall, Validity::Default)).await.unwrap();
    repo.insert(new_record(&other, Validity::Default)).await.unwrap();

    assert_eq!(repo.fetch_by_pair(&shop).unwrap().len(), 1);
    assert_eq!(repo.fetch_by_pair(&mall).unwrap().len(), 1);
    assert_eq!(
        repo.fetch_by_pair(&PricingPair::new("p3", "shop"))
            .unwrap()
            .len(),
        0
    );
}

#[tokio::test]
async fn test_channel_is_stored_normalized() {
    let (repo, _dir) = setup();
    let pair = PricingPair::new("p1", Channel::new(" Coupang "));

    repo.insert(new_record(&pair, Validity::Default)).await.unwrap();

    let records = repo
        .fetch_by_pair(&PricingPair::new("p1", "COUPANG"))
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].channel.as_str(), "COUPANG");
}

#[tokio::test]
async fn test_update_fields_truncates_the_window() {
    let (repo, _dir) = setup();
    let pair = PricingPair::new("p1", "shop");
    let open = repo
        .insert(new_record(
            &pair,
            Validity::Scheduled(DateWindow::starting(d(2025, 1, 1))),
        ))
        .await
        .unwrap();

    let truncated = repo
        .update_fields(&open.id, PricingIntervalUpdate::truncate_to(d(2025, 2, 28)))
        .await
        .unwrap();

    let window = truncated.validity.window().unwrap();
    assert_eq!(window.start(), Some(d(2025, 1, 1)));
    assert_eq!(window.end(), Some(d(2025, 2, 28)));

    // Prices were not part of the changeset.
    assert_eq!(truncated.selling_price, dec!(19900));
}

#[tokio::test]
async fn test_update_fields_on_missing_record_is_not_found() {
    let (repo, _dir) = setup();

    let result = repo
        .update_fields("no-such-id", PricingIntervalUpdate::truncate_to(d(2025, 1, 1)))
        .await;

    assert!(matches!(
        result,
        Err(Error::Database(DatabaseError::NotFound(_)))
    ));
}

#[tokio::test]
async fn test_upsert_default_creates_then_updates_in_place() {
    let (repo, _dir) = setup();
    let pair = PricingPair::new("p1", "shop");

    let first = repo
        .upsert_default(
            &pair,
            PriceFields {
                selling_price: dec!(10000),
                supply_price: dec!(7000),
                fee_percent: dec!(8),
            },
        )
        .await
        .unwrap();
    assert!(matches!(first, UpsertOutcome::Created(_)));
    assert!(first.record().validity.is_default());

    let second = repo
        .upsert_default(
            &pair,
            PriceFields {
                selling_price: dec!(11000),
                supply_price: dec!(7000),
                fee_percent: dec!(8),
            },
        )
        .await
        .unwrap();
    let UpsertOutcome::Updated(updated) = second else {
        panic!("second upsert must update");
    };
    assert_eq!(updated.selling_price, dec!(11000));

    let records = repo.fetch_by_pair(&pair).unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0].validity.is_default());
}

#[tokio::test]
async fn test_upsert_default_leaves_scheduled_records_alone() {
    let (repo, _dir) = setup();
    let pair = PricingPair::new("p1", "shop");
    repo.insert(new_record(
        &pair,
        Validity::Scheduled(DateWindow::between(d(2025, 3, 1), d(2025, 6, 30)).unwrap()),
    ))
    .await
    .unwrap();

    repo.upsert_default(
        &pair,
        PriceFields {
            selling_price: dec!(10000),
            supply_price: dec!(7000),
            fee_percent: dec!(8),
        },
    )
    .await
    .unwrap();

    let records = repo.fetch_by_pair(&pair).unwrap();
    assert_eq!(records.len(), 2);
    let scheduled = records
        .iter()
        .find(|r| !r.validity.is_default())
        .expect("scheduled record survives");
    assert_eq!(scheduled.selling_price, dec!(19900));
}
