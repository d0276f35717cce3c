//! On-device recognition with whisper.cpp via `whisper-rs`.
//!
//! CPU-bound and networkless; the model file is loaded once at construction
//! and reused across calls. Gated behind the `whisper` feature so default
//! builds stay free of the native whisper.cpp dependency.

use async_trait::async_trait;
use hark_core::{AudioSegment, RecognizeError, Transcript};
use serde::Deserialize;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::http::parse_options;
use crate::recognizer_trait::{ensure_non_empty, Recognizer};

const WHISPER_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WhisperOptions {
    /// Path to a ggml model file (e.g. `ggml-base.en.bin`).
    pub model_path: String,

    /// Whisper language name or code; `None` lets the model auto-detect.
    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub temperature: Option<f32>,
}

pub struct WhisperRecognizer {
    options: WhisperOptions,
    context: WhisperContext,
}

impl WhisperRecognizer {
    pub fn new(options: WhisperOptions) -> Result<Self, RecognizeError> {
        let context = WhisperContext::new_with_params(
            &options.model_path,
            WhisperContextParameters::default(),
        )
        .map_err(|e| {
            RecognizeError::Configuration(format!(
                "failed to load whisper model '{}': {e}",
                options.model_path
            ))
        })?;
        tracing::info!(model_path = %options.model_path, "loaded whisper model");
        Ok(Self { options, context })
    }

    pub fn from_config(config: toml::Value) -> Result<Self, RecognizeError> {
        Self::new(parse_options(config)?)
    }
}

#[async_trait]
impl Recognizer for WhisperRecognizer {
    fn name(&self) -> &str {
        "whisper"
    }

    async fn recognize(&self, segment: &AudioSegment) -> Result<Transcript, RecognizeError> {
        ensure_non_empty(segment)?;

        let samples = to_whisper_input(segment);

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(self.options.language.as_deref());
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_no_context(true);
        if let Some(temperature) = self.options.temperature {
            params.set_temperature(temperature);
        }

        let mut state = self
            .context
            .create_state()
            .map_err(|e| RecognizeError::Request(format!("whisper state creation failed: {e}")))?;
        state
            .full(params, &samples)
            .map_err(|e| RecognizeError::Request(format!("whisper inference failed: {e}")))?;

        let segment_count = state
            .full_n_segments()
            .map_err(|e| RecognizeError::Request(format!("whisper segment read failed: {e}")))?;
        let mut text = String::new();
        for i in 0..segment_count {
            if let Ok(piece) = state.full_get_segment_text(i) {
                text.push_str(&piece);
            }
        }

        let text = text.trim();
        if text.is_empty() {
            return Err(RecognizeError::UnknownValue);
        }
        Ok(Transcript::new(text))
    }
}

/// Mix to mono and linearly resample to the 16 kHz f32 input whisper.cpp
/// expects.
fn to_whisper_input(segment: &AudioSegment) -> Vec<f32> {
    let channels = segment.channels().max(1) as usize;
    let mono: Vec<f32> = segment
        .samples()
        .chunks(channels)
        .map(|frame| {
            frame.iter().map(|s| *s as f32 / 32768.0).sum::<f32>() / channels as f32
        })
        .collect();

    let src_rate = segment.sample_rate();
    if src_rate == WHISPER_SAMPLE_RATE || mono.is_empty() {
        return mono;
    }

    let ratio = src_rate as f64 / WHISPER_SAMPLE_RATE as f64;
    let out_len = (mono.len() as f64 / ratio).floor() as usize;
    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            let a = mono[idx];
            let b = *mono.get(idx + 1).unwrap_or(&a);
            a + (b - a) * frac
        })
        .collect()
}
