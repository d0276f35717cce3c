use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read audio source: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode audio: {0}")]
    Decode(String),

    #[error("failed to encode audio: {0}")]
    Encode(String),
}

#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error("audio segment is empty")]
    EmptyAudio,

    #[error("invalid recognizer configuration: {0}")]
    Configuration(String),

    #[error("recognition request failed: {0}")]
    Request(String),

    #[error("backend produced no usable transcript")]
    UnknownValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_error_display() {
        let err = AudioError::UnsupportedFormat("mystery container".to_string());
        assert!(err.to_string().contains("unsupported audio format"));
        assert!(err.to_string().contains("mystery container"));
    }

    #[test]
    fn test_audio_error_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AudioError = io.into();
        assert!(matches!(err, AudioError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_recognize_error_empty_audio_display() {
        let err = RecognizeError::EmptyAudio;
        assert_eq!(err.to_string(), "audio segment is empty");
    }

    #[test]
    fn test_recognize_error_configuration_carries_detail() {
        let err = RecognizeError::Configuration("missing field `key`".to_string());
        assert!(err.to_string().contains("missing field `key`"));
    }

    #[test]
    fn test_recognize_error_unknown_value_display() {
        let err = RecognizeError::UnknownValue;
        assert!(err.to_string().contains("no usable transcript"));
    }

    #[test]
    fn test_config_error_env_var_display() {
        let err = ConfigError::EnvVarNotFound("WIT_AI_KEY".to_string());
        assert!(err.to_string().contains("WIT_AI_KEY"));
    }
}
