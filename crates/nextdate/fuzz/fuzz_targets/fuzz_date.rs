//! Fuzz target for date parsing, normalization and the calendar engine.
//!
//! Checks that:
//! 1. Parsing never panics on arbitrary text in any convention
//! 2. The engine never panics or overflows on any triple
//! 3. A parsed key round-trips through its own format

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use nextdate::record::{normalize, Conventions, RawExpected, RawKey};
use nextdate::{next_date, DateConvention, DateKey, SourceTag};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    text: &'a str,
    expected: &'a str,
    day: i64,
    month: i64,
    year: i64,
}

fuzz_target!(|input: Input| {
    let _ = next_date(input.day, input.month, input.year);

    for convention in [
        DateConvention::YearMonthDay,
        DateConvention::DayMonthYear,
        DateConvention::MonthDayYear,
    ] {
        if let Some(key) = DateKey::parse(input.text, convention) {
            let _ = next_date(key.day(), key.month(), key.year());
            assert_eq!(DateKey::parse(&key.format(convention), convention), Some(key));
        }

        let _ = normalize(
            RawKey::composite(input.text),
            RawExpected::text(input.expected),
            &SourceTag::new("fuzz"),
            Conventions::uniform(convention),
        );
    }
});
