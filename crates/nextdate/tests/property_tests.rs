//! Property-based tests for the calendar engine, normalization and reconciliation.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p nextdate --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p nextdate --test property_tests
//! ```

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use proptest::prelude::*;

use nextdate::record::{normalize, Conventions, RawExpected, RawKey};
use nextdate::{
    is_valid, next_date, reconcile, summarize, CalendarResult, DateConvention, DateKey, Expected,
    ReconciliationOutcome, SourceIndex, SourceTag,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Day/month/year triples, most of them in range, some not.
fn any_triple() -> impl Strategy<Value = (i64, i64, i64)> {
    (-2i64..=33, -1i64..=14, -1000i64..=3000)
}

/// Valid dates only.
fn valid_key() -> impl Strategy<Value = DateKey> {
    (1i64..=31, 1i64..=12, 0i64..=9999)
        .prop_filter("must be a real date", |(d, m, y)| is_valid(*d, *m, *y))
        .prop_map(|(d, m, y)| DateKey::new(d, m, y))
}

fn any_expected() -> impl Strategy<Value = Expected> {
    prop_oneof![
        Just(Expected::Label(CalendarResult::Invalid)),
        (1i64..=3, 1i64..=2).prop_map(|(d, m)| Expected::Label(CalendarResult::Valid(DateKey::new(d, m, 2020)))),
        "[a-z]{1,3}".prop_map(Expected::Unparsed),
    ]
}

/// A small source: few keys so sources overlap often.
fn source_index() -> impl Strategy<Value = SourceIndex> {
    prop::collection::btree_map(
        (1i64..=6, 1i64..=2).prop_map(|(d, m)| DateKey::new(d, m, 2020)),
        any_expected(),
        0..8,
    )
}

// =============================================================================
// Calendar Engine
// =============================================================================

proptest! {
    #[test]
    fn next_date_agrees_with_chrono((d, m, y) in any_triple()) {
        let chrono_date = NaiveDate::from_ymd_opt(y as i32, m.max(0) as u32, d.max(0) as u32)
            .filter(|_| d >= 1 && m >= 1);

        match (next_date(d, m, y), chrono_date.and_then(|date| date.succ_opt())) {
            (CalendarResult::Valid(next), Some(expected)) => {
                prop_assert_eq!(next.year(), i64::from(expected.year()));
                prop_assert_eq!(next.month(), i64::from(expected.month()));
                prop_assert_eq!(next.day(), i64::from(expected.day()));
            }
            (CalendarResult::Invalid, None) => {}
            (ours, theirs) => prop_assert!(false, "disagree on {}-{}-{}: {:?} vs {:?}", y, m, d, ours, theirs),
        }
    }

    #[test]
    fn successor_is_valid_and_later(key in valid_key()) {
        match next_date(key.day(), key.month(), key.year()) {
            CalendarResult::Valid(next) => {
                prop_assert!(is_valid(next.day(), next.month(), next.year()));
                prop_assert!(next > key);
            }
            CalendarResult::Invalid => prop_assert!(false, "valid date {} had no successor", key),
        }
    }

    #[test]
    fn next_date_is_total_and_deterministic(d in any::<i64>(), m in any::<i64>(), y in any::<i64>()) {
        prop_assert_eq!(next_date(d, m, y), next_date(d, m, y));
    }
}

// =============================================================================
// Normalization
// =============================================================================

proptest! {
    #[test]
    fn label_normalization_is_idempotent(key in valid_key(), invalid in any::<bool>()) {
        let label = if invalid { CalendarResult::Invalid } else { next_date(key.day(), key.month(), key.year()) };
        let source = SourceTag::new("p");
        let case = normalize(
            RawKey::composite(key.format(DateConvention::YearMonthDay)),
            RawExpected::Label(label),
            &source,
            Conventions::default(),
        ).unwrap();
        prop_assert_eq!(case.expected, Expected::Label(label));
        prop_assert_eq!(case.key, key);
    }

    #[test]
    fn conventions_are_never_confused(key in valid_key()) {
        let dmy = key.format(DateConvention::DayMonthYear);
        let ymd = key.format(DateConvention::YearMonthDay);

        prop_assert_eq!(DateKey::parse(&dmy, DateConvention::DayMonthYear), Some(key));
        prop_assert_eq!(DateKey::parse(&dmy, DateConvention::YearMonthDay), None);
        prop_assert_eq!(DateKey::parse(&ymd, DateConvention::YearMonthDay), Some(key));
        prop_assert_eq!(DateKey::parse(&ymd, DateConvention::DayMonthYear), None);
    }
}

// =============================================================================
// Reconciliation
// =============================================================================

proptest! {
    #[test]
    fn reconciliation_partitions_keys(a in source_index(), b in source_index(), c in source_index()) {
        let inputs = vec![
            (SourceTag::new("a"), a.clone()),
            (SourceTag::new("b"), b.clone()),
            (SourceTag::new("c"), c.clone()),
        ];
        let result = reconcile(&inputs);

        let mut union: BTreeMap<DateKey, usize> = BTreeMap::new();
        for index in [&a, &b, &c] {
            for key in index.keys() {
                *union.entry(*key).or_default() += 1;
            }
        }

        // Every key appears exactly once, in order.
        let keys: Vec<DateKey> = result.outcomes().iter().map(|o| *o.key()).collect();
        prop_assert_eq!(keys, union.keys().copied().collect::<Vec<_>>());

        for outcome in result.outcomes() {
            let holders = union[outcome.key()];
            match outcome {
                ReconciliationOutcome::OnlyIn { .. } => prop_assert_eq!(holders, 1),
                ReconciliationOutcome::Match { sources, .. } => prop_assert_eq!(sources.len(), holders),
                ReconciliationOutcome::Mismatch { values, .. } => prop_assert_eq!(values.len(), holders),
            }
        }

        let summary = summarize(&result);
        let only: usize = summary.only_in.values().sum();
        prop_assert_eq!(summary.matches + summary.mismatches + only, summary.total_keys);
        if let Some(p) = summary.overlap_accuracy.percent() {
            prop_assert!((0.0..=100.0).contains(&p));
        }
    }

    #[test]
    fn reconciliation_is_symmetric(a in source_index(), b in source_index()) {
        let ab = reconcile(&[(SourceTag::new("a"), a.clone()), (SourceTag::new("b"), b.clone())]);
        let ba = reconcile(&[(SourceTag::new("b"), b), (SourceTag::new("a"), a)]);
        prop_assert_eq!(ab, ba);
    }
}
