//! Error types for translation calls and batch runs

use serde::Serialize;
use thiserror::Error;

/// Errors raised by a single call to a translation provider
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The upstream service answered with a non-success status
    #[error("translation service returned {status}: {body}")]
    Remote { status: u16, body: String },
    /// The upstream body is not the expected list-of-lists payload
    #[error("malformed translation response: {0}")]
    MalformedResponse(String),
    /// The request never produced a response (connect, timeout, body read)
    #[error("network error: {0}")]
    Network(String),
    /// A language code failed validation
    #[error("invalid language code: {0}")]
    InvalidLocale(String),
    /// Provider or environment configuration is unusable
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        TranslateError::Network(err.to_string())
    }
}

/// Result type for translation calls
pub type TranslateResult<T> = Result<T, TranslateError>;

/// One (record, directive) pair whose translation call failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitFailure {
    pub record_index: usize,
    pub directive_index: usize,
    pub source_key: String,
    pub target_key: String,
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(serialize_with = "serialize_display")]
    pub error: TranslateError,
}

fn serialize_display<S: serde::Serializer>(
    error: &TranslateError,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

/// Errors raised by a batch run or by reading a record file
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    /// A directive is unusable; reported for the first offender in input order
    #[error("directive {index} (`{source_key}`): {reason}")]
    InvalidDirective {
        index: usize,
        source_key: String,
        reason: String,
    },
    /// The shared source language failed validation
    #[error("invalid source language: {0}")]
    InvalidLanguage(String),
    /// Input is not a JSON array of flat objects
    #[error("failed to parse records: {0}")]
    Parse(String),
    /// At least one unit failed; successful units were still applied
    #[error("{} translation(s) failed", .failures.len())]
    Translation { failures: Vec<UnitFailure> },
}

impl BatchError {
    /// Whether the caller sent a bad request, as opposed to an upstream failure
    pub fn is_client_error(&self) -> bool {
        !matches!(self, BatchError::Translation { .. })
    }
}

/// Result type for batch runs
pub type BatchResult<T> = Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_error_names_directive() {
        let err = BatchError::InvalidDirective {
            index: 2,
            source_key: "title".to_string(),
            reason: "target key is required".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "directive 2 (`title`): target key is required"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_translation_error_counts_failures() {
        let failure = UnitFailure {
            record_index: 0,
            directive_index: 0,
            source_key: "name".to_string(),
            target_key: "name_en".to_string(),
            text: "salam".to_string(),
            source_lang: "az".to_string(),
            target_lang: "en".to_string(),
            error: TranslateError::Remote {
                status: 503,
                body: "unavailable".to_string(),
            },
        };
        let err = BatchError::Translation {
            failures: vec![failure.clone(), failure],
        };
        assert_eq!(err.to_string(), "2 translation(s) failed");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_unit_failure_serializes_error_as_text() {
        let failure = UnitFailure {
            record_index: 1,
            directive_index: 0,
            source_key: "x".to_string(),
            target_key: "x".to_string(),
            text: "iki".to_string(),
            source_lang: "az".to_string(),
            target_lang: "en".to_string(),
            error: TranslateError::MalformedResponse("not a list".to_string()),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["recordIndex"], 1);
        assert_eq!(json["targetKey"], "x");
        assert_eq!(
            json["error"],
            "malformed translation response: not a list"
        );
    }
}
