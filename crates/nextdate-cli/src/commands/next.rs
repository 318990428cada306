//! Next command - print the day after a date.

use nextdate::{next_date, DateConvention, DateKey, NextDateError};

pub fn run(
    date: Option<String>,
    day: Option<i64>,
    month: Option<i64>,
    year: Option<i64>,
    convention: DateConvention,
) -> Result<(), Box<dyn std::error::Error>> {
    let key = match (date, day, month, year) {
        (Some(text), _, _, _) => DateKey::parse(&text, convention).ok_or_else(|| {
            NextDateError::Config(format!("'{}' is not a {} date", text, convention))
        })?,
        (None, Some(d), Some(m), Some(y)) => DateKey::new(d, m, y),
        _ => {
            return Err(NextDateError::Config(
                "give a DATE or all of --day, --month and --year".to_string(),
            )
            .into())
        }
    };

    match next_date(key.day(), key.month(), key.year()).next() {
        Some(next) => println!("{}", next.format(convention)),
        None => println!("INVALID"),
    }

    Ok(())
}
