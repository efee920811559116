//! Batch translation engine
//!
//! Expands directives × records into work units, runs every unit's
//! translation call concurrently, waits for all of them to settle and then
//! writes the results back into the records they came from.
//!
//! # Algorithm
//!
//! 1. Validate directives and the source language. Nothing is translated
//!    and no record is touched if any check fails.
//! 2. Plan units: directives in input order, records in input order. A unit
//!    exists only where the record's source field is truthy and holds text
//!    or a number. Source values are captured before any write happens.
//! 3. Dispatch all units on the calling task. A semaphore caps the number
//!    of calls in flight at [`EngineConfig::max_concurrency`].
//! 4. Join. A failed unit does not stop the others.
//! 5. Apply successes in unit order: write `target_key`, then drop
//!    `source_key` unless the two are the same. Two directives writing the
//!    same key of one record resolve to the later directive. A rename keeps
//!    its source field when an earlier unit of the batch wrote that field on
//!    the same record, so chained directives (`x → y`, `y → z`) keep both
//!    results.
//! 6. Report failures per (record, directive) pair. Their records are left
//!    as they were.
//!
//! The number of calls is `directives × records with a truthy source field`.
//! The bound keeps large files from opening that many connections at once,
//! but a batch still takes time proportional to the call count.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use record_mt::{BatchEngine, Directive, EngineConfig, MockMode, MockTranslator, parse_records};
//!
//! let engine = BatchEngine::new(Arc::new(MockTranslator::new(MockMode::Suffix)), EngineConfig::default());
//! let mut records = parse_records(r#"[{"name": "salam"}]"#)?;
//! let report = engine
//!     .translate_batch(&mut records, &[Directive::new("name", "name_en", "en")], "az")
//!     .await?;
//! assert!(report.is_complete());
//! ```

use crate::config::EngineConfig;
use crate::directive::{Directive, validate_directives};
use crate::error::{BatchError, BatchResult, TranslateResult, UnitFailure};
use crate::record::{FieldValue, Record};
use crate::translator::{MachineTranslator, validate_locale};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// One (directive, record) pairing selected for translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit<'a> {
    pub record_index: usize,
    pub directive_index: usize,
    pub directive: &'a Directive,
    /// Source value as it was before the batch started
    pub text: String,
}

/// Outcome of a batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Units dispatched
    pub units: usize,
    /// Units whose result was written into a record
    pub translated: usize,
    pub failures: Vec<UnitFailure>,
}

impl BatchReport {
    /// True when every dispatched unit succeeded
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn a partial result into `BatchError::Translation`
    pub fn into_result(self) -> BatchResult<Self> {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(BatchError::Translation {
                failures: self.failures,
            })
        }
    }
}

/// Runs directives over record collections using one translation provider
///
/// Holds only the provider and configuration; record data never outlives a
/// call to [`BatchEngine::translate_batch`].
#[derive(Clone)]
pub struct BatchEngine {
    translator: Arc<dyn MachineTranslator>,
    config: EngineConfig,
}

impl BatchEngine {
    pub fn new(translator: Arc<dyn MachineTranslator>, config: EngineConfig) -> Self {
        Self { translator, config }
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn provider_name(&self) -> &str {
        self.translator.provider_name()
    }

    /// Translate the fields named by `directives` in every record, in place
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - All units settled; check `failures` for the
    ///   pairs that were not translated
    /// * `Err(BatchError)` - A directive or the source language is invalid;
    ///   no call was made and no record changed
    pub async fn translate_batch(
        &self,
        records: &mut [Record],
        directives: &[Directive],
        source_lang: &str,
    ) -> BatchResult<BatchReport> {
        validate_directives(directives)?;
        validate_locale(source_lang).map_err(|e| BatchError::InvalidLanguage(e.to_string()))?;

        let units = plan_units(records, directives);
        info!(
            provider = self.translator.provider_name(),
            records = records.len(),
            directives = directives.len(),
            units = units.len(),
            "starting translation batch"
        );

        let outcomes = self.dispatch(&units, source_lang).await;

        let mut report = BatchReport {
            units: units.len(),
            ..BatchReport::default()
        };
        // (record, key) pairs written so far by this batch
        let mut written: HashSet<(usize, &str)> = HashSet::new();
        for (unit, outcome) in units.iter().zip(outcomes) {
            match outcome {
                Ok(translated) => {
                    let directive = unit.directive;
                    let keep_source =
                        written.contains(&(unit.record_index, directive.source_key.as_str()));
                    apply_translation(
                        &mut records[unit.record_index],
                        directive,
                        translated,
                        keep_source,
                    );
                    written.insert((unit.record_index, directive.target_key.as_str()));
                    report.translated += 1;
                }
                Err(error) => {
                    warn!(
                        record = unit.record_index,
                        directive = unit.directive_index,
                        key = %unit.directive.source_key,
                        %error,
                        "translation failed"
                    );
                    report.failures.push(UnitFailure {
                        record_index: unit.record_index,
                        directive_index: unit.directive_index,
                        source_key: unit.directive.source_key.clone(),
                        target_key: unit.directive.target_key.clone(),
                        text: unit.text.clone(),
                        source_lang: source_lang.to_string(),
                        target_lang: unit.directive.target_lang.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            translated = report.translated,
            failed = report.failures.len(),
            "translation batch finished"
        );
        Ok(report)
    }

    /// Run every unit's call, at most `max_concurrency` at a time
    ///
    /// Outcomes come back in unit order regardless of completion order.
    async fn dispatch(
        &self,
        units: &[WorkUnit<'_>],
        source_lang: &str,
    ) -> Vec<TranslateResult<String>> {
        let semaphore = Semaphore::new(self.config.max_concurrency());
        let translator = self.translator.as_ref();

        join_all(units.iter().map(|unit| {
            let semaphore = &semaphore;
            async move {
                // The semaphore is never closed, so acquiring cannot fail
                let _permit = semaphore.acquire().await.ok();
                debug!(
                    record = unit.record_index,
                    directive = unit.directive_index,
                    target_lang = %unit.directive.target_lang,
                    "translating"
                );
                translator
                    .translate(&unit.text, source_lang, &unit.directive.target_lang)
                    .await
            }
        }))
        .await
    }
}

/// Pair every directive with every record whose source field is translatable
///
/// Directive order first, then record order.
pub fn plan_units<'a>(records: &[Record], directives: &'a [Directive]) -> Vec<WorkUnit<'a>> {
    let mut units = Vec::new();
    for (directive_index, directive) in directives.iter().enumerate() {
        for (record_index, record) in records.iter().enumerate() {
            let Some(value) = record.get(&directive.source_key) else {
                continue;
            };
            if !value.is_truthy() {
                continue;
            }
            if let Some(text) = value.as_source_text() {
                units.push(WorkUnit {
                    record_index,
                    directive_index,
                    directive,
                    text,
                });
            }
        }
    }
    units
}

/// Write one result into its record, renaming the field when keys differ
///
/// `keep_source` leaves the source field in place; it holds another
/// directive's result.
fn apply_translation(
    record: &mut Record,
    directive: &Directive,
    translated: String,
    keep_source: bool,
) {
    record.insert(&directive.target_key, FieldValue::Text(translated));
    if !directive.is_in_place() && !keep_source {
        record.remove(&directive.source_key);
    }
}
