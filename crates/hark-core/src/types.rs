/// One fully-decoded, in-memory audio buffer: interleaved signed 16-bit
/// linear PCM plus the format metadata a recognizer needs.
///
/// Segments never mutate after construction; sample rate, sample width and
/// channel count are fixed for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    samples: Vec<i16>,
    sample_rate: u32,
    sample_width: u16,
    channels: u16,
}

impl AudioSegment {
    pub fn new(samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            sample_width: 2,
            channels,
        }
    }

    /// A zero-length segment carrying only format metadata. Produced when an
    /// exhausted source is recorded again.
    pub fn empty(sample_rate: u32, channels: u16) -> Self {
        Self::new(Vec::new(), sample_rate, channels)
    }

    /// Interleaved PCM samples across all channels.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bytes per sample (2 — segments are normalized to 16-bit PCM on decode).
    pub fn sample_width(&self) -> u16 {
        self.sample_width
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total sample count across all channels.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.channels == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        let frames = self.samples.len() / self.channels as usize;
        frames as f64 / self.sample_rate as f64
    }

    /// Raw little-endian sample bytes, the way vendors that accept bare PCM
    /// expect them.
    pub fn raw_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.samples.len() * 2);
        for s in &self.samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        bytes
    }

    /// Re-encode the segment as a 16-bit PCM WAV byte buffer, the container
    /// most HTTP vendors accept.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, crate::error::AudioError> {
        use crate::error::AudioError;

        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| AudioError::Encode(e.to_string()))?;
        for s in &self.samples {
            writer
                .write_sample(*s)
                .map_err(|e| AudioError::Encode(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::Encode(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// The text a backend returned for a segment, with whatever extra metadata
/// the vendor included. Simple callers read `text` and discard the rest.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub confidence: Option<f32>,
    pub alternatives: Vec<String>,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
            alternatives: Vec::new(),
        }
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = Some(confidence);
        self
    }
}
