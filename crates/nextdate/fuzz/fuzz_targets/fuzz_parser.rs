//! Fuzz target for the delimited text parser.
//!
//! Checks that the parser never panics on malformed input, with or without
//! a header and leading rows to skip.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nextdate::input::{Parser, ParserConfig};
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let path = temp_file.path();

            let _ = Parser::new().parse_file(path);

            let headerless = Parser::with_config(ParserConfig {
                has_header: false,
                skip_rows: data.first().map(|b| (*b % 4) as usize).unwrap_or(0),
                ..ParserConfig::default()
            });
            let _ = headerless.parse_file(path);
        }
    }
});
