//! Whisper-style transcription over the OpenAI audio API, which Groq also
//! serves behind an OpenAI-compatible base URL. One adapter, two registry
//! entries.

use async_trait::async_trait;
use hark_core::{AudioSegment, RecognizeError, Transcript};
use serde::Deserialize;

use crate::http::{encode_wav, parse_options, require_success, transport_err};
use crate::recognizer_trait::{ensure_non_empty, Recognizer};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

const OPENAI_DEFAULT_MODEL: &str = "whisper-1";
const GROQ_DEFAULT_MODEL: &str = "whisper-large-v3";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiCompatibleOptions {
    pub key: String,

    #[serde(default)]
    pub model: Option<String>,

    /// ISO-639-1 language hint (e.g. "en", "fr").
    #[serde(default)]
    pub language: Option<String>,

    /// Sampling temperature between 0 and 1.
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Optional text to prime the decoder with.
    #[serde(default)]
    pub prompt: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,
}

pub struct OpenAiCompatibleRecognizer {
    name: &'static str,
    base_url: &'static str,
    default_model: &'static str,
    options: OpenAiCompatibleOptions,
    client: reqwest::Client,
}

impl OpenAiCompatibleRecognizer {
    pub fn openai(options: OpenAiCompatibleOptions) -> Self {
        Self {
            name: "openai",
            base_url: OPENAI_BASE_URL,
            default_model: OPENAI_DEFAULT_MODEL,
            options,
            client: reqwest::Client::new(),
        }
    }

    pub fn groq(options: OpenAiCompatibleOptions) -> Self {
        Self {
            name: "groq",
            base_url: GROQ_BASE_URL,
            default_model: GROQ_DEFAULT_MODEL,
            options,
            client: reqwest::Client::new(),
        }
    }

    pub fn openai_from_config(config: toml::Value) -> Result<Self, RecognizeError> {
        Ok(Self::openai(parse_options(config)?))
    }

    pub fn groq_from_config(config: toml::Value) -> Result<Self, RecognizeError> {
        Ok(Self::groq(parse_options(config)?))
    }

    fn model(&self) -> &str {
        self.options.model.as_deref().unwrap_or(self.default_model)
    }
}

#[async_trait]
impl Recognizer for OpenAiCompatibleRecognizer {
    fn name(&self) -> &str {
        self.name
    }

    async fn recognize(&self, segment: &AudioSegment) -> Result<Transcript, RecognizeError> {
        ensure_non_empty(segment)?;

        let base = self.options.endpoint.as_deref().unwrap_or(self.base_url);
        let url = format!("{base}/audio/transcriptions");
        let wav = encode_wav(segment)?;

        let file = reqwest::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(transport_err)?;
        let mut form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.model().to_string())
            .text("response_format", "json");
        if let Some(language) = &self.options.language {
            form = form.text("language", language.clone());
        }
        if let Some(temperature) = self.options.temperature {
            form = form.text("temperature", temperature.to_string());
        }
        if let Some(prompt) = &self.options.prompt {
            form = form.text("prompt", prompt.clone());
        }

        tracing::debug!(backend = self.name, model = %self.model(), "sending transcription request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.options.key)
            .multipart(form)
            .send()
            .await
            .map_err(transport_err)?;
        let response = require_success(response).await?;
        let value: serde_json::Value = response.json().await.map_err(transport_err)?;

        let text = value
            .get("text")
            .and_then(|t| t.as_str())
            .ok_or_else(|| {
                RecognizeError::Request("malformed response: missing text".to_string())
            })?;
        if text.trim().is_empty() {
            return Err(RecognizeError::UnknownValue);
        }
        Ok(Transcript::new(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_config() -> toml::Value {
        let mut table = toml::map::Map::new();
        table.insert("key".to_string(), toml::Value::String("sk-test".to_string()));
        toml::Value::Table(table)
    }

    #[test]
    fn test_openai_recognizer_name_and_default_model() {
        let recognizer = OpenAiCompatibleRecognizer::openai_from_config(key_config()).unwrap();
        assert_eq!(recognizer.name(), "openai");
        assert_eq!(recognizer.model(), "whisper-1");
    }

    #[test]
    fn test_groq_recognizer_name_and_default_model() {
        let recognizer = OpenAiCompatibleRecognizer::groq_from_config(key_config()).unwrap();
        assert_eq!(recognizer.name(), "groq");
        assert_eq!(recognizer.model(), "whisper-large-v3");
    }

    #[test]
    fn test_model_override_wins_over_default() {
        let mut table = toml::map::Map::new();
        table.insert("key".to_string(), toml::Value::String("sk-test".to_string()));
        table.insert(
            "model".to_string(),
            toml::Value::String("whisper-large-v3-turbo".to_string()),
        );
        let recognizer =
            OpenAiCompatibleRecognizer::groq_from_config(toml::Value::Table(table)).unwrap();
        assert_eq!(recognizer.model(), "whisper-large-v3-turbo");
    }

    #[test]
    fn test_missing_key_rejected() {
        let result =
            OpenAiCompatibleRecognizer::openai_from_config(toml::Value::Table(Default::default()));
        match result {
            Err(RecognizeError::Configuration(msg)) => assert!(msg.contains("key")),
            Err(other) => panic!("expected Configuration, got {other:?}"),
            Ok(_) => panic!("expected Configuration, got a recognizer"),
        }
    }

    #[test]
    fn test_unknown_option_rejected() {
        let mut table = toml::map::Map::new();
        table.insert("key".to_string(), toml::Value::String("sk-test".to_string()));
        table.insert("beam_size".to_string(), toml::Value::Integer(5));
        let result = OpenAiCompatibleRecognizer::openai_from_config(toml::Value::Table(table));
        match result {
            Err(RecognizeError::Configuration(msg)) => assert!(msg.contains("beam_size")),
            Err(other) => panic!("expected Configuration, got {other:?}"),
            Ok(_) => panic!("expected Configuration, got a recognizer"),
        }
    }
}
