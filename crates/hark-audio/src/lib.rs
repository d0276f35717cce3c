pub mod source;

pub use source::AudioFile;
