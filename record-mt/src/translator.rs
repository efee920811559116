//! Translation client trait and language-code checks
//!
//! `MachineTranslator` is the seam between the batch engine and whatever
//! answers translation requests: the Google endpoint in production, the
//! mock in tests and `--mock` runs.
//!
//! # Example
//!
//! ```ignore
//! use record_mt::{ClientConfig, GoogleTranslateProvider, MachineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::new(ClientConfig::default())?;
//!     let result = provider.translate("salam", "az", "en").await?;
//!     println!("{}", result); // "hello"
//!     Ok(())
//! }
//! ```

use crate::error::{TranslateError, TranslateResult};
use async_trait::async_trait;

/// A provider that translates one text at a time
///
/// Implementations must be shareable across the concurrent units of a batch.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate `text` from `source_lang` to `target_lang`
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text, possibly empty
    /// * `Err(TranslateError)` - If the call or its response failed
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslateResult<String>;

    /// Name used in logs to identify the provider
    fn provider_name(&self) -> &str;
}

/// Validate that a language code is in acceptable format
///
/// Accepts ASCII alphanumerics, hyphens and underscores (`az`, `en-US`,
/// `zh_CN`). Anything else would have to be escaped into the request URL
/// and is almost certainly a mistake.
pub fn validate_locale(locale: &str) -> TranslateResult<()> {
    if locale.is_empty() {
        return Err(TranslateError::InvalidLocale(
            "language code is empty".to_string(),
        ));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(TranslateError::InvalidLocale(format!(
            "invalid characters in language code: {}",
            locale
        )));
    }

    Ok(())
}
