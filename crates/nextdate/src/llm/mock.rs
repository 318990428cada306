//! Mock generator for tests and offline demos.

use std::collections::BTreeSet;

use crate::calendar::{days_in_month, next_date_for, CalendarResult, DateConvention, DateKey};
use crate::error::Result;

use super::provider::{CaseGenerator, GeneratedBatch, GenerationConfig};

/// Mock generator that answers with engine-computed boundary cases.
///
/// A nonzero `corruption_rate` swaps that fraction of answers for wrong
/// ones, so reconciliation has something to disagree about. The choice is
/// seeded and therefore repeatable.
pub struct MockGenerator {
    config: GenerationConfig,
    corruption_rate: f64,
    seed: u64,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::with_config(GenerationConfig::default())
    }

    pub fn with_config(config: GenerationConfig) -> Self {
        Self {
            config,
            corruption_rate: 0.0,
            seed: 42,
        }
    }

    /// Fraction of answers (clamped to 0.0-1.0) to get wrong.
    pub fn with_corruption(mut self, rate: f64, seed: u64) -> Self {
        self.corruption_rate = rate.clamp(0.0, 1.0);
        self.seed = seed;
        self
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseGenerator for MockGenerator {
    fn generate(&self, count: usize) -> Result<GeneratedBatch> {
        let mut rng = fastrand::Rng::with_seed(self.seed);

        let pairs = case_keys(count)
            .into_iter()
            .map(|key| {
                let input = key.format(DateConvention::YearMonthDay);
                let mut answer = next_date_for(&key);
                if self.corruption_rate > 0.0 && rng.f64() < self.corruption_rate {
                    answer = corrupt(&key, answer);
                }
                (input, render(answer))
            })
            .collect();

        Ok(GeneratedBatch {
            pairs,
            diagnostics: Vec::new(),
        })
    }

    fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn name(&self) -> &str {
        "mock"
    }
}

fn render(answer: CalendarResult) -> String {
    match answer {
        CalendarResult::Valid(next) => next.format(DateConvention::YearMonthDay),
        CalendarResult::Invalid => "INVALID".to_string(),
    }
}

/// A plausible wrong answer: a valid input echoed back, an invalid one treated as valid.
fn corrupt(key: &DateKey, answer: CalendarResult) -> CalendarResult {
    match answer {
        CalendarResult::Valid(_) => CalendarResult::Valid(*key),
        CalendarResult::Invalid => CalendarResult::Valid(DateKey::new(key.day() + 1, key.month(), key.year())),
    }
}

/// Boundary keys first, then ordinary consecutive days.
fn case_keys(count: usize) -> Vec<DateKey> {
    let mut seen = BTreeSet::new();
    let mut keys: Vec<DateKey> = boundary_keys()
        .into_iter()
        .filter(|k| seen.insert(*k))
        .take(count)
        .collect();

    let mut filler = DateKey::new(15, 1, 2025);
    while keys.len() < count {
        if seen.insert(filler) {
            keys.push(filler);
        }
        filler = match next_date_for(&filler) {
            CalendarResult::Valid(next) => next,
            CalendarResult::Invalid => break,
        };
    }

    keys
}

fn boundary_keys() -> Vec<DateKey> {
    let mut keys = Vec::new();

    for year in [2024, 2023, 2000, 1900] {
        keys.push(DateKey::new(28, 2, year));
        keys.push(DateKey::new(29, 2, year));
        keys.push(DateKey::new(31, 12, year));
        for month in 1..=12 {
            let last = days_in_month(month, year).unwrap_or(31);
            keys.push(DateKey::new(last, month, year));
            keys.push(DateKey::new(last + 1, month, year));
        }
    }

    keys.extend([
        DateKey::new(1, 1, 1),
        DateKey::new(31, 12, 9999),
        DateKey::new(0, 1, 2023),
        DateKey::new(1, 0, 2023),
        DateKey::new(1, 13, 2023),
        DateKey::new(15, 6, 2023),
    ]);

    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::generated_cases;
    use crate::oracle::grade;

    #[test]
    fn test_mock_answers_are_correct_without_corruption() {
        let batch = MockGenerator::new().generate(40).unwrap();
        assert_eq!(batch.pairs.len(), 40);

        let cases = generated_cases(&batch);
        assert_eq!(cases.cases.len(), 40);
        let report = grade(&cases.cases);
        assert_eq!(report.failed, 0);
        assert_eq!(report.passed, 40);
    }

    #[test]
    fn test_mock_covers_leap_boundaries_first() {
        let batch = MockGenerator::new().generate(3).unwrap();
        assert_eq!(batch.pairs[0], ("2024-02-28".to_string(), "2024-02-29".to_string()));
        assert_eq!(batch.pairs[1], ("2024-02-29".to_string(), "2024-03-01".to_string()));
        assert_eq!(batch.pairs[2], ("2024-12-31".to_string(), "2025-01-01".to_string()));
    }

    #[test]
    fn test_mock_large_count_is_distinct() {
        let batch = MockGenerator::new().generate(500).unwrap();
        let inputs: BTreeSet<&String> = batch.pairs.iter().map(|(i, _)| i).collect();
        assert_eq!(inputs.len(), 500);
    }

    #[test]
    fn test_corruption_is_seeded() {
        let a = MockGenerator::new().with_corruption(0.5, 7).generate(30).unwrap();
        let b = MockGenerator::new().with_corruption(0.5, 7).generate(30).unwrap();
        assert_eq!(a, b);

        let report = grade(&generated_cases(&a).cases);
        assert!(report.failed > 0);
    }

    #[test]
    fn test_full_corruption_gets_everything_wrong() {
        let batch = MockGenerator::new().with_corruption(1.0, 1).generate(20).unwrap();
        let report = grade(&generated_cases(&batch).cases);
        assert_eq!(report.passed, 0);
    }
}
