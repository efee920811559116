//! Field-translation directives
//!
//! A directive reads `source_key` from every record, translates it into
//! `target_lang`, and writes the result to `target_key`. The wire names
//! (`key`, `newKey`, `targetLang`) match what upload clients send.

use crate::error::{BatchError, BatchResult};
use crate::record::Record;
use crate::translator::validate_locale;
use serde::{Deserialize, Serialize};

/// Suffix appended to the source key when seeding default directives
pub const DEFAULT_TARGET_SUFFIX: &str = "_translated";

/// Target language used when none is given
pub const DEFAULT_TARGET_LANG: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    #[serde(rename = "key")]
    pub source_key: String,
    /// Left empty when the client omits it, so validation can report it
    #[serde(rename = "newKey", default)]
    pub target_key: String,
    #[serde(rename = "targetLang")]
    pub target_lang: String,
}

impl Directive {
    pub fn new(source_key: &str, target_key: &str, target_lang: &str) -> Self {
        Self {
            source_key: source_key.to_string(),
            target_key: target_key.to_string(),
            target_lang: target_lang.to_string(),
        }
    }

    /// Whether the translated value replaces the source field in place
    pub fn is_in_place(&self) -> bool {
        self.source_key == self.target_key
    }

    /// Seed one directive per field of `record`, writing to `<key>_translated`
    ///
    /// Upload clients call this with the first record of a file.
    pub fn defaults_for(record: &Record, target_lang: &str) -> Vec<Directive> {
        record
            .keys()
            .map(|key| {
                Directive::new(
                    key,
                    &format!("{}{}", key, DEFAULT_TARGET_SUFFIX),
                    target_lang,
                )
            })
            .collect()
    }

    /// Parse the compact `key[:newKey[:lang]]` form used on the command line
    ///
    /// # Example
    ///
    /// ```ignore
    /// let d = Directive::from_arg("name:name_en:en")?;
    /// let d = Directive::from_arg("title")?; // title -> title_translated, en
    /// ```
    pub fn from_arg(arg: &str) -> BatchResult<Self> {
        let mut parts = arg.splitn(3, ':');
        let source_key = parts.next().unwrap_or_default();
        if source_key.is_empty() {
            return Err(BatchError::Parse(format!(
                "directive `{}` has no source key",
                arg
            )));
        }
        let target_key = match parts.next() {
            Some(key) => key.to_string(),
            None => format!("{}{}", source_key, DEFAULT_TARGET_SUFFIX),
        };
        let target_lang = parts
            .next()
            .filter(|lang| !lang.is_empty())
            .unwrap_or(DEFAULT_TARGET_LANG);

        Ok(Directive::new(source_key, &target_key, target_lang))
    }
}

/// Check every directive before any work starts
///
/// Reports the first offending directive in input order.
pub fn validate_directives(directives: &[Directive]) -> BatchResult<()> {
    for (index, directive) in directives.iter().enumerate() {
        let invalid = |reason: String| BatchError::InvalidDirective {
            index,
            source_key: directive.source_key.clone(),
            reason,
        };

        if directive.target_key.is_empty() {
            return Err(invalid("target key is required".to_string()));
        }
        validate_locale(&directive.target_lang).map_err(|e| invalid(e.to_string()))?;
    }
    Ok(())
}
