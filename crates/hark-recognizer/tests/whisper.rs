#![cfg(feature = "whisper")]

//! Local whisper scenario test. Needs a real model and utterance, so it
//! only runs when both are supplied:
//!
//! ```text
//! HARK_WHISPER_MODEL=ggml-base.en.bin \
//! HARK_WHISPER_AUDIO=english.wav \
//! HARK_WHISPER_EXPECT="one two three" \
//! cargo test --features whisper
//! ```

use hark_core::AudioSegment;
use hark_recognizer::RecognizerRegistry;

fn load_wav(path: &str) -> AudioSegment {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    AudioSegment::new(samples, spec.sample_rate, spec.channels)
}

#[tokio::test]
async fn test_whisper_transcribes_known_utterance() {
    let (model, audio) = match (
        std::env::var("HARK_WHISPER_MODEL"),
        std::env::var("HARK_WHISPER_AUDIO"),
    ) {
        (Ok(m), Ok(a)) => (m, a),
        _ => {
            eprintln!("skipping: HARK_WHISPER_MODEL / HARK_WHISPER_AUDIO not set");
            return;
        }
    };

    let mut table = toml::map::Map::new();
    table.insert("model_path".to_string(), toml::Value::String(model));
    let registry = RecognizerRegistry::new();
    let recognizer = registry.create("whisper", toml::Value::Table(table)).unwrap();

    let segment = load_wav(&audio);
    let transcript = recognizer.recognize(&segment).await.unwrap();
    assert!(!transcript.text.trim().is_empty());

    if let Ok(expected) = std::env::var("HARK_WHISPER_EXPECT") {
        let got = transcript.text.to_lowercase();
        let mut rest = got.as_str();
        for word in expected.split_whitespace() {
            let idx = rest
                .find(&word.to_lowercase())
                .unwrap_or_else(|| panic!("'{word}' not found in order in: {got}"));
            rest = &rest[idx + word.len()..];
        }
    }
}
