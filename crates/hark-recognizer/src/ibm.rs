//! IBM Speech to Text backend.

use async_trait::async_trait;
use hark_core::{AudioSegment, RecognizeError, Transcript};
use serde::Deserialize;

use crate::http::{encode_wav, parse_options, require_success, transport_err};
use crate::recognizer_trait::{ensure_non_empty, Recognizer};

const DEFAULT_ENDPOINT: &str = "https://stream.watsonplatform.net/speech-to-text/api/v1/recognize";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IbmOptions {
    pub username: String,
    pub password: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_language() -> String {
    "en-US".to_string()
}

pub struct IbmRecognizer {
    options: IbmOptions,
    client: reqwest::Client,
}

impl IbmRecognizer {
    pub fn new(options: IbmOptions) -> Self {
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
impl Recognizer for IbmRecognizer {
    fn name(&self) -> &str {
        "ibm"
    }

    async fn recognize(&self, segment: &AudioSegment) -> Result<Transcript, RecognizeError> {
        ensure_non_empty(segment)?;

        let url = self.options.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let model = format!("{}_BroadbandModel", self.options.language);
        let body = encode_wav(segment)?;

        tracing::debug!(model = %model, "sending ibm speech-to-text request");

        let response = self
            .client
            .post(url)
            .query(&[("model", model.as_str())])
            .basic_auth(&self.options.username, Some(&self.options.password))
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .header("X-Watson-Learning-Opt-Out", "true")
            .body(body)
            .send()
            .await
            .map_err(transport_err)?;
        let response = require_success(response).await?;
        let value: serde_json::Value = response.json().await.map_err(transport_err)?;
        parse_response(&value)
    }
}

/// Concatenate the top alternative of every utterance, the way the service
/// breaks long recordings into result chunks. The vendor text is passed
/// through verbatim, trailing whitespace included.
fn parse_response(value: &serde_json::Value) -> Result<Transcript, RecognizeError> {
    let results = value
        .get("results")
        .and_then(|r| r.as_array())
        .ok_or_else(|| {
            RecognizeError::Request("malformed response: missing results".to_string())
        })?;
    if results.is_empty() {
        return Err(RecognizeError::UnknownValue);
    }

    let mut pieces = Vec::new();
    let mut confidence = None;
    for utterance in results {
        let best = utterance
            .get("alternatives")
            .and_then(|a| a.as_array())
            .and_then(|a| a.first())
            .ok_or_else(|| {
                RecognizeError::Request("malformed response: missing alternatives".to_string())
            })?;
        let text = best
            .get("transcript")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                RecognizeError::Request("malformed response: missing transcript".to_string())
            })?;
        pieces.push(text.to_string());
        if confidence.is_none() {
            confidence = best.get("confidence").and_then(|c| c.as_f64());
        }
    }

    let joined = pieces.concat();
    if joined.trim().is_empty() {
        return Err(RecognizeError::UnknownValue);
    }
    let mut transcript = Transcript::new(joined);
    if let Some(confidence) = confidence {
        transcript = transcript.with_confidence(confidence as f32);
    }
    Ok(transcript)
}
