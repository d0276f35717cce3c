pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AudioError, ConfigError, RecognizeError};
pub use types::{AudioSegment, Transcript};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_reexport() {
        let segment = AudioSegment::new(vec![0, 1, 2, 3], 16000, 1);
        assert_eq!(segment.len(), 4);
        assert_eq!(segment.sample_rate(), 16000);
    }

    #[test]
    fn test_transcript_reexport() {
        let t = Transcript::new("hello world");
        assert_eq!(t.text, "hello world");
        assert!(t.confidence.is_none());
    }
}
