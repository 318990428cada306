//! Fuzz target for model-reply parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use nextdate::llm::{generated_cases, parse_generated_lines};

fuzz_target!(|data: &[u8]| {
    if data.len() > 100_000 {
        return;
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let batch = parse_generated_lines(text);
        let cases = generated_cases(&batch);
        assert_eq!(cases.cases.len() + cases.skipped(), batch.pairs.len());
    }
});
