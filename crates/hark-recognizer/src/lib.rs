pub mod azure;
pub mod google;
pub mod houndify;
mod http;
pub mod ibm;
pub mod openai;
pub mod recognizer_trait;
pub mod registry;
#[cfg(feature = "whisper")]
pub mod whisper_local;
pub mod wit;

pub use azure::{AzureOptions, AzureRecognizer};
pub use google::{GoogleOptions, GoogleRecognizer};
pub use houndify::{HoundifyOptions, HoundifyRecognizer};
pub use ibm::{IbmOptions, IbmRecognizer};
pub use openai::{OpenAiCompatibleOptions, OpenAiCompatibleRecognizer};
pub use recognizer_trait::Recognizer;
pub use registry::RecognizerRegistry;
#[cfg(feature = "whisper")]
pub use whisper_local::{WhisperOptions, WhisperRecognizer};
pub use wit::{WitOptions, WitRecognizer};
