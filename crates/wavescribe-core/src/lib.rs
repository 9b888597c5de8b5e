pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DecoderConfig, GeneralConfig, SessionConfig};
pub use error::{ConfigError, DecoderError, ProtocolError, SessionError};
pub use types::{Transcript, Word};
