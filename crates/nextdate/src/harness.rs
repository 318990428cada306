//! Run facade: load sources, optionally generate, reconcile, summarize.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{SourceSpec, SuiteConfig};
use crate::error::{NextDateError, Result};
use crate::index::{build_index, DuplicateKey};
use crate::input::{load_source, SourceMetadata};
use crate::llm::{generated_cases, CaseGenerator, GeneratedBatch};
use crate::oracle::computed_source;
use crate::reconcile::{reconcile_index, summarize, Reconciliation, Summary};
use crate::record::{NormalizedBatch, ParseDiagnostic, SourceTag, TestCase};

/// Configuration for a harness run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Add a `computed-output` source labeled by the calendar engine.
    pub oracle: bool,
    /// Cases to request when a generator is attached.
    pub generation_count: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            oracle: false,
            generation_count: 50,
        }
    }
}

/// Per-source load results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: SourceTag,
    /// File metadata; absent for generated or in-memory sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SourceMetadata>,
    pub cases: usize,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// A generation call that failed; the run continued without it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationFailure {
    pub provider: String,
    pub message: String,
    /// Whether the error was missing credentials.
    pub missing_credential: bool,
}

/// Result of a harness run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub name: String,
    pub sources: Vec<SourceReport>,
    pub duplicates: Vec<DuplicateKey>,
    /// Raw pairs from the generator, for saving.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedBatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_failure: Option<GenerationFailure>,
    pub reconciliation: Reconciliation,
    pub summary: Summary,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn diagnostics(&self) -> impl Iterator<Item = &ParseDiagnostic> {
        self.sources.iter().flat_map(|s| s.diagnostics.iter())
    }
}

/// Multi-source reconciliation harness.
pub struct Harness {
    name: String,
    config: HarnessConfig,
    sources: Vec<SourceSpec>,
    batches: Vec<NormalizedBatch>,
    generator: Option<Arc<dyn CaseGenerator>>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(HarnessConfig::default())
    }

    pub fn with_config(config: HarnessConfig) -> Self {
        Self {
            name: "run".to_string(),
            config,
            sources: Vec::new(),
            batches: Vec::new(),
            generator: None,
        }
    }

    /// A harness for every source in a suite config.
    pub fn from_suite(suite: &SuiteConfig) -> Self {
        let config = HarnessConfig {
            oracle: suite.oracle.enabled,
            ..HarnessConfig::default()
        };
        let mut harness = Self::with_config(config);
        harness.name = suite.name.clone();
        harness.sources = suite.sources.clone();
        harness
    }

    pub fn with_oracle(mut self, enabled: bool) -> Self {
        self.config.oracle = enabled;
        self
    }

    /// Add a file source.
    pub fn with_source(mut self, spec: SourceSpec) -> Self {
        self.sources.push(spec);
        self
    }

    /// Add an already-normalized batch.
    pub fn with_batch(mut self, batch: NormalizedBatch) -> Self {
        self.batches.push(batch);
        self
    }

    /// Attach a generator; its cases join the run as `generated-suite`.
    pub fn with_generator(mut self, generator: impl CaseGenerator + 'static) -> Self {
        self.generator = Some(Arc::new(generator));
        self
    }

    /// Load, generate, reconcile.
    ///
    /// File-level failures abort the run. A failed generation call does not:
    /// it is reported in [`RunReport::generation_failure`] and the remaining
    /// sources are reconciled without it.
    pub fn run(&self) -> Result<RunReport> {
        self.check_tags()?;

        let mut reports = Vec::new();
        let mut cases: Vec<TestCase> = Vec::new();

        for spec in &self.sources {
            let loaded = load_source(spec)?;
            reports.push(SourceReport {
                source: loaded.batch.source.clone(),
                metadata: Some(loaded.metadata),
                cases: loaded.batch.cases.len(),
                diagnostics: loaded.batch.diagnostics,
            });
            cases.extend(loaded.batch.cases);
        }

        for batch in &self.batches {
            reports.push(batch_report(batch));
            cases.extend(batch.cases.iter().cloned());
        }

        let mut generated = None;
        let mut generation_failure = None;
        if let Some(generator) = &self.generator {
            match generator.generate(self.config.generation_count) {
                Ok(batch) => {
                    let normalized = generated_cases(&batch);
                    let mut report = batch_report(&normalized);
                    report.diagnostics.extend(batch.diagnostics.iter().map(|message| {
                        ParseDiagnostic::skipped(
                            &normalized.source,
                            "line",
                            "",
                            message.clone(),
                        )
                    }));
                    reports.push(report);
                    cases.extend(normalized.cases);
                    generated = Some(batch);
                }
                Err(e) => {
                    warn!(provider = generator.name(), error = %e, "generation failed; continuing without it");
                    generation_failure = Some(GenerationFailure {
                        provider: generator.name().to_string(),
                        missing_credential: matches!(e, NextDateError::MissingCredential(_)),
                        message: e.to_string(),
                    });
                }
            }
        }

        if self.config.oracle {
            let computed = computed_source(cases.iter().map(|c| &c.key));
            reports.push(SourceReport {
                source: SourceTag::computed_output(),
                metadata: None,
                cases: computed.len(),
                diagnostics: Vec::new(),
            });
            cases.extend(computed);
        }

        let build = build_index(cases);
        let reconciliation = reconcile_index(&build.index);
        let summary = summarize(&reconciliation);

        info!(
            run = %self.name,
            sources = reconciliation.sources().len(),
            keys = summary.total_keys,
            matches = summary.matches,
            mismatches = summary.mismatches,
            accuracy = %summary.overlap_accuracy,
            "run complete"
        );

        Ok(RunReport {
            name: self.name.clone(),
            sources: reports,
            duplicates: build.duplicates,
            generated,
            generation_failure,
            reconciliation,
            summary,
            finished_at: Utc::now(),
        })
    }
}

impl Harness {
    /// Every feed must keep its own tag: user sources may not borrow the
    /// engine's or the generator's, and no two tags may share a report status.
    fn check_tags(&self) -> Result<()> {
        let user_tags = self
            .sources
            .iter()
            .map(SourceSpec::tag)
            .chain(self.batches.iter().map(|batch| batch.source.clone()));

        let mut tags = Vec::new();
        for tag in user_tags {
            if self.config.oracle && tag.as_str() == SourceTag::COMPUTED_OUTPUT {
                return Err(NextDateError::Config(format!(
                    "source name '{}' is reserved for the calendar engine",
                    tag
                )));
            }
            if self.generator.is_some() && tag.as_str() == SourceTag::GENERATED_SUITE {
                return Err(NextDateError::Config(format!(
                    "source name '{}' is reserved for the attached generator",
                    tag
                )));
            }
            tags.push(tag);
        }
        if self.generator.is_some() {
            tags.push(SourceTag::generated_suite());
        }
        if self.config.oracle {
            tags.push(SourceTag::computed_output());
        }

        let mut statuses: HashMap<String, &SourceTag> = HashMap::new();
        for tag in &tags {
            if let Some(previous) = statuses.insert(tag.only_in_status(), tag) {
                return Err(NextDateError::Config(if previous == tag {
                    format!("source '{}' is supplied more than once", tag)
                } else {
                    format!("sources '{}' and '{}' are indistinguishable in reports", previous, tag)
                }));
            }
        }

        Ok(())
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

fn batch_report(batch: &NormalizedBatch) -> SourceReport {
    SourceReport {
        source: batch.source.clone(),
        metadata: None,
        cases: batch.cases.len(),
        diagnostics: batch.diagnostics.clone(),
    }
}
