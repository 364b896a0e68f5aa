use std::time::Duration;

use serde_json::{json, Value};

use crate::error::TranslateError;

/// Translates extracted text into the configured target language.
pub trait Translator: Send + Sync {
    fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Client for a LibreTranslate-compatible HTTP endpoint.
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
    target_lang: String,
}

impl HttpTranslator {
    pub fn new(endpoint: String, target_lang: String) -> Result<Self, TranslateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(HttpTranslator {
            client,
            endpoint,
            target_lang,
        })
    }
}

impl Translator for HttpTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&json!({
                "q": text,
                "source": "auto",
                "target": self.target_lang,
                "format": "text"
            }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TranslateError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json()?;
        extract_translation(&body)
    }
}

fn extract_translation(body: &Value) -> Result<String, TranslateError> {
    body.get("translatedText")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(TranslateError::MalformedResponse)
}
