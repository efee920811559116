//! Google Translate web-client provider
//!
//! Talks to the `translate_a/single` endpoint used by Google's own web
//! client. The request is a single GET with the language pair and the
//! URL-encoded text in the query string; no API key is needed.
//!
//! # Response format
//!
//! The body is a nested JSON array. Its first element lists sentence
//! segments, each segment a list whose first element is the translated
//! fragment:
//!
//! ```text
//! [[["Hello. ","Salam. ",null,null,10],["How are you?","Necəsən?",null,null,10]],null,"az",...]
//! ```
//!
//! # Example
//!
//! ```ignore
//! use record_mt::{ClientConfig, GoogleTranslateProvider, MachineTranslator};
//!
//! let provider = GoogleTranslateProvider::new(ClientConfig::default())?;
//! let result = provider.translate("salam", "az", "en").await?;
//! ```

use crate::config::ClientConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::translator::{MachineTranslator, validate_locale};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct GoogleTranslateProvider {
    /// HTTP client for async requests
    client: reqwest::Client,
    /// URL template with `{client}`, `{sl}`, `{tl}` and `{q}` placeholders
    endpoint: String,
    client_id: String,
}

impl GoogleTranslateProvider {
    /// Create a provider from injected settings
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(TranslateError)` - If the endpoint has no `{q}` placeholder or
    ///   the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> TranslateResult<Self> {
        if !config.endpoint.contains("{q}") {
            return Err(TranslateError::Config(format!(
                "endpoint template has no {{q}} placeholder: {}",
                config.endpoint
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TranslateError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
            client_id: config.client_id,
        })
    }

    /// Fill the endpoint template for one request
    fn request_url(&self, text: &str, source_lang: &str, target_lang: &str) -> String {
        self.endpoint
            .replace("{client}", &urlencoding::encode(&self.client_id))
            .replace("{sl}", &urlencoding::encode(source_lang))
            .replace("{tl}", &urlencoding::encode(target_lang))
            .replace("{q}", &urlencoding::encode(text))
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("endpoint", &self.endpoint)
            .field("client_id", &self.client_id)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> TranslateResult<String> {
        validate_locale(source_lang)?;
        validate_locale(target_lang)?;

        let url = self.request_url(text, source_lang, target_lang);
        debug!(source_lang, target_lang, chars = text.len(), "sending translation request");

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TranslateError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        extract_translation(&body)
    }

    fn provider_name(&self) -> &str {
        "Google Translate"
    }
}

/// Recover the translated text from a `translate_a/single` response body
///
/// Entries of the segment list that are not lists, or have fewer than two
/// elements, are skipped, as are segments whose first element is not a
/// string. An empty result is returned as an empty string.
pub fn extract_translation(body: &str) -> TranslateResult<String> {
    let json: Value = serde_json::from_str(body)
        .map_err(|e| TranslateError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let segments = json
        .as_array()
        .ok_or_else(|| TranslateError::MalformedResponse("top level is not a list".to_string()))?
        .first()
        .and_then(Value::as_array)
        .ok_or_else(|| {
            TranslateError::MalformedResponse("first element is not a list of segments".to_string())
        })?;

    let translated = segments
        .iter()
        .filter_map(Value::as_array)
        .filter(|segment| segment.len() >= 2)
        .filter_map(|segment| segment[0].as_str())
        .collect::<String>();

    Ok(translated)
}
