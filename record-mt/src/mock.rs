//! Mock Machine Translator for testing
//!
//! A deterministic, network-free translator for exercising the batch engine
//! without reaching the real endpoint. It also counts calls and records the
//! peak number of calls in flight, so tests can check that validation issues
//! no calls and that the engine honours its concurrency bound.
//!
//! # Example
//!
//! ```ignore
//! use record_mt::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("salam", "az", "en").await.unwrap();
//!     assert_eq!(result, "salam_en");
//!     assert_eq!(mock.call_count(), 1);
//! }
//! ```

use crate::error::{TranslateError, TranslateResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append target language suffix: "salam" → "salam_en"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_lang) → translation, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Fail every call
    Error(String),

    /// Fail calls whose text is in the set, `Suffix` for the rest
    FailOn(HashSet<String>),

    /// No-op: return input unchanged
    NoOp,
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    /// Per-text delay overrides, used to force completion order
    delays: HashMap<String, u64>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockTranslator {
    /// Create a new MockTranslator with the given mode
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            delay_ms: 0,
            delays: HashMap::new(),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Create a MockTranslator with a simulated delay on every call
    ///
    /// ```ignore
    /// let mock = MockTranslator::with_delay(MockMode::Suffix, 50);
    /// // Each translation will take ~50ms
    /// ```
    pub fn with_delay(mode: MockMode, delay_ms: u64) -> Self {
        Self {
            delay_ms,
            ..Self::new(mode)
        }
    }

    /// Delay calls for one particular text by `delay_ms` instead
    pub fn delay_text(mut self, text: &str, delay_ms: u64) -> Self {
        self.delays.insert(text.to_string(), delay_ms);
        self
    }

    /// Number of `translate` calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were running at the same moment
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn apply_delay(&self, text: &str) {
        let delay_ms = self.delays.get(text).copied().unwrap_or(self.delay_ms);
        if delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        } else {
            // Still yield, so concurrent callers interleave like real I/O
            tokio::task::yield_now().await;
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, _source: &str, target: &str) -> TranslateResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Error(msg) => Err(TranslateError::Network(msg.clone())),
            MockMode::FailOn(texts) if texts.contains(text) => Err(TranslateError::Remote {
                status: 503,
                body: format!("refused: {}", text),
            }),
            MockMode::FailOn(_) => Ok(format!("{}_{}", text, target)),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslateResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        self.apply_delay(text).await;
        let result = self.apply_translation(text, source_lang, target_lang);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
