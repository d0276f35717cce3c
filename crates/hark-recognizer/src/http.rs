//! Shared request plumbing for the HTTP-backed recognizers.

use hark_core::{AudioSegment, RecognizeError};

/// Deserialize a backend's option bag into its typed schema. Unknown keys
/// and missing required keys both land here, before any I/O is attempted.
pub(crate) fn parse_options<T: serde::de::DeserializeOwned>(
    value: toml::Value,
) -> Result<T, RecognizeError> {
    value
        .try_into()
        .map_err(|e: toml::de::Error| RecognizeError::Configuration(e.to_string()))
}

/// Map a transport-level failure into the request error taxonomy.
pub(crate) fn transport_err(e: reqwest::Error) -> RecognizeError {
    RecognizeError::Request(e.to_string())
}

/// Reject non-2xx responses, keeping a short body snippet for diagnostics.
pub(crate) async fn require_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, RecognizeError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        tracing::warn!(status = status.as_u16(), "backend returned error status");
        return Err(RecognizeError::Request(format!(
            "status {status}: {snippet}"
        )));
    }
    Ok(response)
}

/// WAV re-encode for shipping to a vendor; encode failures surface as
/// request failures since they abort the exchange.
pub(crate) fn encode_wav(segment: &AudioSegment) -> Result<Vec<u8>, RecognizeError> {
    segment
        .to_wav_bytes()
        .map_err(|e| RecognizeError::Request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct DemoOptions {
        key: String,
        #[serde(default)]
        language: Option<String>,
    }

    fn table(pairs: &[(&str, &str)]) -> toml::Value {
        let mut t = toml::map::Map::new();
        for (k, v) in pairs {
            t.insert(k.to_string(), toml::Value::String(v.to_string()));
        }
        toml::Value::Table(t)
    }

    #[test]
    fn test_parse_options_accepts_known_fields() {
        let opts: DemoOptions =
            parse_options(table(&[("key", "abc"), ("language", "fr-FR")])).unwrap();
        assert_eq!(opts.key, "abc");
        assert_eq!(opts.language.as_deref(), Some("fr-FR"));
    }

    #[test]
    fn test_parse_options_missing_required_is_configuration() {
        let result: Result<DemoOptions, _> = parse_options(table(&[("language", "en-US")]));
        match result {
            Err(RecognizeError::Configuration(msg)) => assert!(msg.contains("key")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_options_unknown_key_is_configuration() {
        let result: Result<DemoOptions, _> =
            parse_options(table(&[("key", "abc"), ("bogus", "1")]));
        match result {
            Err(RecognizeError::Configuration(msg)) => assert!(msg.contains("bogus")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_wav_produces_riff_header() {
        let segment = AudioSegment::new(vec![0i16; 160], 16000, 1);
        let bytes = encode_wav(&segment).unwrap();
        assert_eq!(&bytes[..4], b"RIFF");
    }
}
