//! Point-in-time price resolution.
//!
//! Pure selection over one pair's records; the service wires it to the store
//! and cache.

use chrono::NaiveDate;

use super::model::{PricingInterval, Validity};

/// Selects the record applicable on `date` from one pair's records.
///
/// Scheduled windows shadow the baseline. When more than one scheduled
/// window covers the date (possible only through the documented
/// non-idempotency/conflict gap), the one with the latest start wins; a set
/// start beats a missing one, and the earliest-seen record wins exact ties.
/// Falls back to the default record, then to nothing.
pub fn applicable_on(records: &[PricingInterval], date: NaiveDate) -> Option<&PricingInterval> {
    let mut baseline: Option<&PricingInterval> = None;
    let mut best: Option<&PricingInterval> = None;

    for record in records {
        match &record.validity {
            Validity::Default => baseline = Some(record),
            Validity::Scheduled(window) if window.contains(date) => {
                let replaces = match best.and_then(|b| b.validity.window()) {
                    Some(current) => window.start() > current.start(),
                    None => true,
                };
                if replaces {
                    best = Some(record);
                }
            }
            Validity::Scheduled(_) => {}
        }
    }

    best.or(baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::model::DateWindow;
    use crate::pricing::types::Channel;
    use crate::utils::date_utils::day_after;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(id: &str, validity: Validity) -> PricingInterval {
        PricingInterval {
            id: id.to_string(),
            product_id: "p1".to_string(),
            channel: Channel::new("shop"),
            selling_price: dec!(15000),
            supply_price: dec!(9000),
            fee_percent: dec!(12),
            validity,
            created_at: Utc::now(),
        }
    }

    fn window(start: (i32, u32, u32), end: (i32, u32, u32)) -> Validity {
        Validity::Scheduled(
            DateWindow::between(d(start.0, start.1, start.2), d(end.0, end.1, end.2)).unwrap(),
        )
    }

    #[test]
    fn test_no_records_resolves_to_nothing() {
        assert!(applicable_on(&[], d(2025, 1, 1)).is_none());
    }

    #[test]
    fn test_scheduled_window_shadows_the_baseline() {
        let records = vec![
            record("base", Validity::Default),
            record("promo", window((2025, 3, 1), (2025, 3, 31))),
        ];

        let hit = applicable_on(&records, d(2025, 3, 15)).unwrap();
        assert_eq!(hit.id, "promo");
    }

    #[test]
    fn test_baseline_applies_outside_every_window() {
        let records = vec![
            record("base", Validity::Default),
            record("promo", window((2025, 3, 1), (2025, 3, 31))),
        ];

        let hit = applicable_on(&records, d(2025, 4, 1)).unwrap();
        assert_eq!(hit.id, "base");
    }

    #[test]
    fn test_end_date_is_inclusive_and_the_next_day_is_not() {
        let records = vec![
            record("base", Validity::Default),
            record("promo", window((2025, 3, 1), (2025, 3, 31))),
        ];
        let end = d(2025, 3, 31);

        assert_eq!(applicable_on(&records, end).unwrap().id, "promo");
        assert_eq!(applicable_on(&records, day_after(end)).unwrap().id, "base");
    }

    #[test]
    fn test_no_window_and_no_baseline_resolves_to_nothing() {
        let records = vec![record("promo", window((2025, 3, 1), (2025, 3, 31)))];
        assert!(applicable_on(&records, d(2025, 6, 1)).is_none());
    }

    #[test]
    fn test_latest_start_wins_among_overlapping_windows() {
        // Overlap left behind by a reported conflict: the year-long record
        // and the more specific inner window both cover the date.
        let records = vec![
            record("year", window((2025, 1, 1), (2025, 12, 31))),
            record("inner", window((2025, 3, 1), (2025, 6, 30))),
        ];

        let hit = applicable_on(&records, d(2025, 4, 1)).unwrap();
        assert_eq!(hit.id, "inner");
    }

    #[test]
    fn test_bounded_start_beats_unbounded_start() {
        let end_only = Validity::Scheduled(DateWindow::new(None, Some(d(2025, 12, 31))).unwrap());
        let records = vec![
            record("until-dec", end_only),
            record("spring", window((2025, 3, 1), (2025, 6, 30))),
        ];

        let hit = applicable_on(&records, d(2025, 4, 1)).unwrap();
        assert_eq!(hit.id, "spring");
    }

    #[test]
    fn test_open_ended_window_applies_indefinitely() {
        let records = vec![record(
            "open",
            Validity::Scheduled(DateWindow::starting(d(2025, 1, 1))),
        )];

        assert_eq!(applicable_on(&records, d(2030, 7, 4)).unwrap().id, "open");
        assert!(applicable_on(&records, d(2024, 12, 31)).is_none());
    }
}
