use std::fs::File;
use std::path::Path;

use hark_core::{AudioError, AudioSegment};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// A scoped handle on an audio file. Owns the underlying reader and decoder;
/// the file is released when the handle drops, on every exit path.
///
/// Recording advances the read position. Once the source is exhausted,
/// further [`record`](Self::record) calls yield empty segments rather than
/// errors.
pub struct AudioFile {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channels: u16,
    // Decoded samples not yet handed out (record_for leftovers).
    pending: Vec<i16>,
    exhausted: bool,
}

impl AudioFile {
    /// Open an audio file and prepare a decoder for its first audio track.
    ///
    /// Fails with [`AudioError::Io`] if the file cannot be read and
    /// [`AudioError::UnsupportedFormat`] if no known container/codec matches
    /// (a zero-byte file lands here — the probe cannot identify it).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AudioError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;
        let format = probed.format;

        let (track_id, codec_params) = {
            let track = format
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
                .ok_or_else(|| {
                    AudioError::UnsupportedFormat("no decodable audio track".to_string())
                })?;
            (track.id, track.codec_params.clone())
        };

        let sample_rate = codec_params
            .sample_rate
            .ok_or_else(|| AudioError::UnsupportedFormat("missing sample rate".to_string()))?;
        let channels = codec_params
            .channels
            .map(|c| c.count() as u16)
            .ok_or_else(|| AudioError::UnsupportedFormat("missing channel layout".to_string()))?;

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

        tracing::debug!(
            path = %path.display(),
            sample_rate,
            channels,
            "opened audio source"
        );

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            channels,
            pending: Vec::new(),
            exhausted: false,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Decode the entire remaining content of the source into one segment.
    ///
    /// Recording an already-exhausted source yields an empty segment that
    /// still carries the source's rate and channel count.
    pub fn record(&mut self) -> Result<AudioSegment, AudioError> {
        let mut samples = std::mem::take(&mut self.pending);
        while let Some(chunk) = self.decode_next()? {
            samples.extend_from_slice(&chunk);
        }
        tracing::debug!(samples = samples.len(), "recorded segment");
        Ok(AudioSegment::new(samples, self.sample_rate, self.channels))
    }

    /// Like [`record`](Self::record), but stop after at most `max_seconds`
    /// of audio. The remainder stays readable by a later `record` call.
    pub fn record_for(&mut self, max_seconds: f32) -> Result<AudioSegment, AudioError> {
        let cap_frames = (max_seconds as f64 * self.sample_rate as f64).round() as usize;
        let cap_samples = cap_frames * self.channels as usize;

        let mut samples = std::mem::take(&mut self.pending);
        while samples.len() < cap_samples {
            match self.decode_next()? {
                Some(chunk) => samples.extend_from_slice(&chunk),
                None => break,
            }
        }
        if samples.len() > cap_samples {
            self.pending = samples.split_off(cap_samples);
        }
        Ok(AudioSegment::new(samples, self.sample_rate, self.channels))
    }

    /// Decode the next packet of the selected track into interleaved i16
    /// samples. Returns `Ok(None)` once the source is exhausted.
    fn decode_next(&mut self) -> Result<Option<Vec<i16>>, AudioError> {
        if self.exhausted {
            return Ok(None);
        }
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Err(e) => return Err(AudioError::Decode(e.to_string())),
            };
            if packet.track_id() != self.track_id {
                continue;
            }
            let decoded = match self.decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("skipping malformed packet: {e}");
                    continue;
                }
                Err(e) => return Err(AudioError::Decode(e.to_string())),
            };
            if decoded.frames() == 0 {
                continue;
            }
            let spec = *decoded.spec();
            let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
            buf.copy_interleaved_ref(decoded);
            return Ok(Some(buf.samples().to_vec()));
        }
    }
}
