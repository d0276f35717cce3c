//! Wit.ai speech backend.

use async_trait::async_trait;
use hark_core::{AudioSegment, RecognizeError, Transcript};
use serde::Deserialize;

use crate::http::{encode_wav, parse_options, require_success, transport_err};
use crate::recognizer_trait::{ensure_non_empty, Recognizer};

const DEFAULT_ENDPOINT: &str = "https://api.wit.ai/speech";
const API_VERSION: &str = "20221114";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WitOptions {
    /// Server access token from the Wit.ai app settings.
    pub key: String,

    #[serde(default)]
    pub endpoint: Option<String>,
}

pub struct WitRecognizer {
    options: WitOptions,
    client: reqwest::Client,
}

impl WitRecognizer {
    pub fn new(options: WitOptions) -> Self {
        Self {
            options,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: toml::Value) -> Result<Self, RecognizeError> {
        Ok(Self::new(parse_options(config)?))
    }
}

#[async_trait]
impl Recognizer for WitRecognizer {
    fn name(&self) -> &str {
        "wit"
    }

    async fn recognize(&self, segment: &AudioSegment) -> Result<Transcript, RecognizeError> {
        ensure_non_empty(segment)?;

        let url = self.options.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let body = encode_wav(segment)?;

        tracing::debug!(samples = segment.len(), "sending wit.ai request");

        let response = self
            .client
            .post(url)
            .query(&[("v", API_VERSION)])
            .bearer_auth(&self.options.key)
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(body)
            .send()
            .await
            .map_err(transport_err)?;
        let response = require_success(response).await?;
        let text = response.text().await.map_err(transport_err)?;
        parse_response(&text)
    }
}

/// Wit streams intermediate hypotheses as concatenated JSON objects; the
/// final object carries the full transcript.
fn parse_response(body: &str) -> Result<Transcript, RecognizeError> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(_) => {
            let last = body
                .split("\r\n")
                .map(str::trim)
                .filter(|chunk| !chunk.is_empty())
                .last()
                .ok_or_else(|| RecognizeError::Request("empty response body".to_string()))?;
            serde_json::from_str(last)
                .map_err(|e| RecognizeError::Request(format!("malformed response: {e}")))?
        }
    };

    // "_text" on older API versions, "text" on current ones.
    let text = value
        .get("text")
        .or_else(|| value.get("_text"))
        .and_then(|t| t.as_str())
        .ok_or(RecognizeError::UnknownValue)?;
    if text.trim().is_empty() {
        return Err(RecognizeError::UnknownValue);
    }
    Ok(Transcript::new(text))
}
