use std::collections::HashMap;

use hark_core::RecognizeError;

use crate::recognizer_trait::Recognizer;

type Factory = fn(toml::Value) -> Result<Box<dyn Recognizer>, RecognizeError>;

/// Maps backend names to factories. Each factory validates its own option
/// schema before any I/O, so a successful `create` means the backend is
/// ready to recognize.
pub struct RecognizerRegistry {
    factories: HashMap<String, Factory>,
}

impl RecognizerRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("google", |cfg| {
            Ok(Box::new(crate::google::GoogleRecognizer::from_config(cfg)?))
        });
        registry.register("wit", |cfg| {
            Ok(Box::new(crate::wit::WitRecognizer::from_config(cfg)?))
        });
        registry.register("azure", |cfg| {
            Ok(Box::new(crate::azure::AzureRecognizer::from_config(cfg)?))
        });
        registry.register("houndify", |cfg| {
            Ok(Box::new(crate::houndify::HoundifyRecognizer::from_config(
                cfg,
            )?))
        });
        registry.register("ibm", |cfg| {
            Ok(Box::new(crate::ibm::IbmRecognizer::from_config(cfg)?))
        });
        registry.register("openai", |cfg| {
            Ok(Box::new(
                crate::openai::OpenAiCompatibleRecognizer::openai_from_config(cfg)?,
            ))
        });
        registry.register("groq", |cfg| {
            Ok(Box::new(
                crate::openai::OpenAiCompatibleRecognizer::groq_from_config(cfg)?,
            ))
        });
        #[cfg(feature = "whisper")]
        registry.register("whisper", |cfg| {
            Ok(Box::new(crate::whisper_local::WhisperRecognizer::from_config(cfg)?))
        });
        registry
    }

    pub fn register(&mut self, name: &str, factory: Factory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn Recognizer>, RecognizeError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RecognizeError::Configuration(format!("unknown backend: {name}")))?;
        factory(config)
    }

    pub fn list_backends(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for RecognizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lists_http_backends() {
        let registry = RecognizerRegistry::new();
        let backends = registry.list_backends();
        for name in ["google", "wit", "azure", "houndify", "ibm", "openai", "groq"] {
            assert!(backends.contains(&name), "missing backend: {name}");
        }
    }

    #[test]
    fn test_registry_unknown_backend_is_configuration_error() {
        let registry = RecognizerRegistry::new();
        let result = registry.create("sphinx", toml::Value::Table(Default::default()));
        match result {
            Err(RecognizeError::Configuration(msg)) => {
                assert!(msg.contains("unknown backend"));
                assert!(msg.contains("sphinx"));
            }
            Err(other) => panic!("expected Configuration, got {other:?}"),
            Ok(_) => panic!("expected Configuration, got a recognizer"),
        }
    }

    #[test]
    fn test_registry_create_google_with_empty_options() {
        let registry = RecognizerRegistry::new();
        let recognizer = registry
            .create("google", toml::Value::Table(Default::default()))
            .unwrap();
        assert_eq!(recognizer.name(), "google");
    }

    #[test]
    fn test_registry_create_wit_without_key_fails_before_io() {
        let registry = RecognizerRegistry::new();
        let result = registry.create("wit", toml::Value::Table(Default::default()));
        assert!(matches!(result, Err(RecognizeError::Configuration(_))));
    }

    #[test]
    fn test_registry_custom_backend_registration() {
        struct EchoRecognizer;

        #[async_trait::async_trait]
        impl Recognizer for EchoRecognizer {
            fn name(&self) -> &str {
                "echo"
            }
            async fn recognize(
                &self,
                segment: &hark_core::AudioSegment,
            ) -> Result<hark_core::Transcript, RecognizeError> {
                crate::recognizer_trait::ensure_non_empty(segment)?;
                Ok(hark_core::Transcript::new(format!(
                    "{} samples",
                    segment.len()
                )))
            }
        }

        let mut registry = RecognizerRegistry::new();
        registry.register("echo", |_| Ok(Box::new(EchoRecognizer)));
        let recognizer = registry
            .create("echo", toml::Value::Table(Default::default()))
            .unwrap();
        assert_eq!(recognizer.name(), "echo");
    }
}
