//! Machine translation for fields of JSON record sets
//!
//! Takes a JSON array of flat objects, a list of directives naming which
//! fields to translate and where to write the results, and fills in the
//! translations using a [`MachineTranslator`].
//!
//! # Workflow Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use record_mt::{
//!     BatchEngine, Config, Directive, GoogleTranslateProvider, parse_records, to_pretty_json,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Load configuration and the provider
//!     let config = Config::from_env()?;
//!     let provider = GoogleTranslateProvider::new(config.client())?;
//!     let engine = BatchEngine::new(Arc::new(provider), config.engine());
//!
//!     // 2. Read records and pick the fields to translate
//!     let mut records = parse_records(r#"[{"name": "salam", "id": 1}]"#)?;
//!     let directives = vec![Directive::new("name", "name_en", "en")];
//!
//!     // 3. Translate in place
//!     let report = engine.translate_batch(&mut records, &directives, "az").await?;
//!     assert!(report.is_complete());
//!
//!     // 4. Write the result
//!     println!("{}", to_pretty_json(&records)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod directive;
pub mod engine;
pub mod error;
pub mod google_translate;
pub mod mock;
pub mod record;
pub mod translator;

// Re-export main types for convenient access
pub use config::{ClientConfig, Config, EngineConfig};
pub use directive::{Directive, validate_directives};
pub use engine::{BatchEngine, BatchReport, WorkUnit, plan_units};
pub use error::{BatchError, BatchResult, TranslateError, TranslateResult, UnitFailure};
pub use google_translate::{GoogleTranslateProvider, extract_translation};
pub use mock::{MockMode, MockTranslator};
pub use record::{FieldValue, Record, parse_records, to_pretty_json};
pub use translator::{MachineTranslator, validate_locale};
