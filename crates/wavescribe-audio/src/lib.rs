pub mod decoder;
pub mod source;

pub use decoder::DecoderSource;
pub use source::AudioSource;
