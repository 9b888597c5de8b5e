use async_trait::async_trait;
use wavescribe_core::DecoderError;

/// A pull-based source of bounded-size PCM chunks.
///
/// `next_chunk` returns `Ok(Some(..))` with a non-empty chunk while audio is
/// available and `Ok(None)` exactly once the stream is exhausted; an empty
/// chunk is never returned. `shutdown` releases whatever produces the audio
/// (for a subprocess source, it reaps the child) and must be called on every
/// exit path.
#[async_trait]
pub trait AudioSource: Send {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, DecoderError>;
    async fn shutdown(&mut self) -> Result<(), DecoderError>;
}
