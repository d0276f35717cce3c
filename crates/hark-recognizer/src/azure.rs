//! Azure Speech (formerly Bing Voice Recognition) backend.

use async_trait::async_trait;
use hark_core::{AudioSegment, RecognizeError, Transcript};
use serde::Deserialize;

use crate::http::{encode_wav, parse_options, require_success, transport_err};
use crate::recognizer_trait::{ensure_non_empty, Recognizer};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AzureOptions {
    /// Cognitive Services subscription key.
    pub key: String,

    #[serde(default = "default_language")]
    pub language: String,

    /// Azure region the subscription lives in.
    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_location() -> String {
    "westus".to_string()
}

pub struct AzureRecognizer {
    options: AzureOptions,
    client: reqwest::Client,
}

impl AzureRecognizer {
    pub fn new(options: AzureOptions) -> Self {
        Self {
            options,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: toml::Value) -> Result<Self, RecognizeError> {
        Ok(Self::new(parse_options(config)?))
    }

    fn url(&self) -> String {
        match &self.options.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!(
                "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
                self.options.location
            ),
        }
    }
}

#[async_trait]
impl Recognizer for AzureRecognizer {
    fn name(&self) -> &str {
        "azure"
    }

    async fn recognize(&self, segment: &AudioSegment) -> Result<Transcript, RecognizeError> {
        ensure_non_empty(segment)?;

        let body = encode_wav(segment)?;

        tracing::debug!(
            language = %self.options.language,
            location = %self.options.location,
            "sending azure speech request"
        );

        let response = self
            .client
            .post(self.url())
            .query(&[
                ("language", self.options.language.as_str()),
                ("format", "detailed"),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.options.key)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!(
                    "audio/wav; codecs=audio/pcm; samplerate={}",
                    segment.sample_rate()
                ),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .body(body)
            .send()
            .await
            .map_err(transport_err)?;
        let response = require_success(response).await?;
        let value: serde_json::Value = response.json().await.map_err(transport_err)?;
        parse_response(&value)
    }
}

fn parse_response(value: &serde_json::Value) -> Result<Transcript, RecognizeError> {
    let status = value
        .get("RecognitionStatus")
        .and_then(|s| s.as_str())
        .ok_or_else(|| {
            RecognizeError::Request("malformed response: missing RecognitionStatus".to_string())
        })?;
    if status != "Success" {
        // InitialSilenceTimeout, NoMatch, BabbleTimeout, ...
        return Err(RecognizeError::UnknownValue);
    }

    // The NBest list is sorted best-first when format=detailed was requested.
    if let Some(best) = value
        .get("NBest")
        .and_then(|n| n.as_array())
        .and_then(|n| n.first())
    {
        let text = best.get("Display").and_then(|d| d.as_str()).ok_or_else(|| {
            RecognizeError::Request("malformed response: missing Display".to_string())
        })?;
        let mut transcript = Transcript::new(text);
        if let Some(confidence) = best.get("Confidence").and_then(|c| c.as_f64()) {
            transcript = transcript.with_confidence(confidence as f32);
        }
        return Ok(transcript);
    }

    let text = value
        .get("DisplayText")
        .and_then(|d| d.as_str())
        .ok_or(RecognizeError::UnknownValue)?;
    Ok(Transcript::new(text))
}
