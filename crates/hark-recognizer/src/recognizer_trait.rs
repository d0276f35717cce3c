use async_trait::async_trait;
use hark_core::{AudioSegment, RecognizeError, Transcript};

/// One transcription backend behind a uniform contract.
///
/// Implementations are stateless across calls: every
/// [`recognize`](Self::recognize) invocation is an independent one-shot
/// exchange with the vendor, with no retry, batching or caching. Backends
/// are built from their typed option set via
/// [`RecognizerRegistry`](crate::RecognizerRegistry).
#[async_trait]
pub trait Recognizer: Send + Sync {
    /// Returns the backend's registry name (e.g. `"google"`, `"wit"`).
    fn name(&self) -> &str;

    /// Transcribe one segment, returning the vendor's best hypothesis.
    ///
    /// Empty segments fail with [`RecognizeError::EmptyAudio`] before any
    /// network or decoder work happens. A backend that ran but produced no
    /// usable transcript fails with [`RecognizeError::UnknownValue`].
    async fn recognize(&self, segment: &AudioSegment) -> Result<Transcript, RecognizeError>;
}

/// Shared input gate: every backend rejects zero-length segments up front.
pub(crate) fn ensure_non_empty(segment: &AudioSegment) -> Result<(), RecognizeError> {
    if segment.is_empty() {
        return Err(RecognizeError::EmptyAudio);
    }
    Ok(())
}
