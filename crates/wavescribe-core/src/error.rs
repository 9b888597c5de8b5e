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

/// Failures of the external decoder process. Never retried.
#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("failed to spawn decoder '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("decoder has no stdout pipe")]
    MissingStdout,

    #[error("failed to read decoder output: {0}")]
    Read(std::io::Error),

    #[error("decoder exited without producing output ({0})")]
    ExitedWithoutOutput(String),

    #[error("failed to reap decoder process: {0}")]
    Wait(std::io::Error),
}

/// Failures on the recognition-service connection. A dropped connection
/// invalidates server-side recognizer state, so none of these are retried.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("failed to connect to recognition server: {0}")]
    Connect(String),

    #[error("connection closed by recognition server")]
    ConnectionClosed,

    #[error("failed to send frame: {0}")]
    Send(String),

    #[error("failed to receive reply: {0}")]
    Receive(String),

    #[error("malformed reply from recognition server: {0}")]
    MalformedReply(#[from] serde_json::Error),

    #[error("final reply is missing the required 'result' field")]
    MissingFinalResult,
}

/// Any fatal condition a transcription session can end with.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("decoder failure: {0}")]
    Decoder(#[from] DecoderError),

    #[error("protocol failure: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("timed out after {seconds}s waiting for {waiting_for}")]
    Timeout { waiting_for: String, seconds: u64 },
}
