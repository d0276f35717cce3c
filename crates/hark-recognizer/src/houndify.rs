//! Houndify backend, including its HMAC request-signing scheme.

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use hark_core::{AudioSegment, RecognizeError, Transcript};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::http::{encode_wav, parse_options, require_success, transport_err};
use crate::recognizer_trait::{ensure_non_empty, Recognizer};

const DEFAULT_ENDPOINT: &str = "https://api.houndify.com/v1/audio";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoundifyOptions {
    pub client_id: String,

    /// URL-safe base64 client key, decoded to the raw HMAC secret.
    pub client_key: String,

    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_user_id() -> String {
    "hark".to_string()
}

pub struct HoundifyRecognizer {
    options: HoundifyOptions,
    client: reqwest::Client,
}

struct RequestAuth {
    request_id: String,
    timestamp: u64,
    signature: String,
}

impl HoundifyRecognizer {
    pub fn new(options: HoundifyOptions) -> Self {
        Self {
            options,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: toml::Value) -> Result<Self, RecognizeError> {
        Ok(Self::new(parse_options(config)?))
    }

    /// Sign one request: `HMAC-SHA256(decoded key, "{user};{request_id}{ts}")`,
    /// URL-safe base64 on both sides, per the vendor auth scheme.
    fn sign_request(&self) -> Result<RequestAuth, RecognizeError> {
        let key_bytes = URL_SAFE.decode(&self.options.client_key).map_err(|_| {
            RecognizeError::Configuration("client_key is not valid url-safe base64".to_string())
        })?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| RecognizeError::Request(e.to_string()))?
            .as_secs();

        let message = format!("{};{}{}", self.options.user_id, request_id, timestamp);
        let mut mac = Hmac::<Sha256>::new_from_slice(&key_bytes)
            .map_err(|e| RecognizeError::Configuration(e.to_string()))?;
        mac.update(message.as_bytes());
        let signature = URL_SAFE.encode(mac.finalize().into_bytes());

        Ok(RequestAuth {
            request_id,
            timestamp,
            signature,
        })
    }
}

#[async_trait]
impl Recognizer for HoundifyRecognizer {
    fn name(&self) -> &str {
        "houndify"
    }

    async fn recognize(&self, segment: &AudioSegment) -> Result<Transcript, RecognizeError> {
        ensure_non_empty(segment)?;

        let auth = self.sign_request()?;
        let url = self.options.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT);
        let body = encode_wav(segment)?;

        let request_info = serde_json::json!({
            "ClientID": self.options.client_id,
            "UserID": self.options.user_id,
            "PartialTranscriptsDesired": false,
        });

        tracing::debug!(request_id = %auth.request_id, "sending houndify request");

        let response = self
            .client
            .post(url)
            .header("Hound-Request-Info", request_info.to_string())
            .header(
                "Hound-Request-Authentication",
                format!("{};{}", self.options.user_id, auth.request_id),
            )
            .header(
                "Hound-Client-Authentication",
                format!(
                    "{};{};{}",
                    self.options.client_id, auth.timestamp, auth.signature
                ),
            )
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
    let results = value
        .get("AllResults")
        .and_then(|r| r.as_array())
        .ok_or_else(|| {
            RecognizeError::Request("malformed response: missing AllResults".to_string())
        })?;
    let first = results.first().ok_or(RecognizeError::UnknownValue)?;

    let text = first
        .get("RawTranscription")
        .and_then(|t| t.as_str())
        .ok_or(RecognizeError::UnknownValue)?;
    if text.trim().is_empty() {
        return Err(RecognizeError::UnknownValue);
    }
    Ok(Transcript::new(text))
}
