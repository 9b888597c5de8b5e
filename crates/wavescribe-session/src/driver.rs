use crate::protocol::{self, ServerReply};
use crate::transport::Transport;
use std::time::Duration;
use wavescribe_audio::AudioSource;
use wavescribe_core::{ProtocolError, SessionConfig, SessionError, Transcript};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Streaming,
    AwaitingEofReply,
    Done,
}

/// Drives one transcription session over a strict request/reply protocol.
///
/// The driver pulls chunks from the audio source, sends each as one binary
/// frame, and awaits exactly one reply before touching the source again, so
/// there is never more than one outstanding request. Once the source signals
/// EOF it performs the end-of-stream handshake and returns the finalized
/// transcript. On every exit path, success or failure, the transport is
/// closed and the source is shut down before returning.
pub struct SessionDriver<S, T> {
    source: S,
    transport: T,
    reply_timeout: Option<Duration>,
    chunk_timeout: Option<Duration>,
    state: SessionState,
}

impl<S: AudioSource, T: Transport> SessionDriver<S, T> {
    pub fn new(source: S, transport: T) -> Self {
        Self {
            source,
            transport,
            reply_timeout: None,
            chunk_timeout: None,
            state: SessionState::Streaming,
        }
    }

    /// Apply the optional per-await deadlines from `[session]` config.
    pub fn with_timeouts(mut self, config: &SessionConfig) -> Self {
        self.reply_timeout = config.reply_timeout_secs.map(Duration::from_secs);
        self.chunk_timeout = config.chunk_timeout_secs.map(Duration::from_secs);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the session to completion and return the transcript.
    ///
    /// No partial transcript is ever returned: any decoder, protocol, or
    /// timeout failure aborts the whole session.
    pub async fn run(mut self) -> Result<Transcript, SessionError> {
        let result = self.drive().await;

        if let Err(err) = self.transport.close().await {
            tracing::debug!("error closing connection: {err}");
        }

        match result {
            Ok(transcript) => {
                self.source.shutdown().await?;
                Ok(transcript)
            }
            Err(err) => {
                // The session failure takes precedence; the reap must still happen.
                if let Err(reap_err) = self.source.shutdown().await {
                    tracing::warn!("failed to reap decoder after session failure: {reap_err}");
                }
                Err(err)
            }
        }
    }

    async fn drive(&mut self) -> Result<Transcript, SessionError> {
        let mut transcript = Transcript::new();
        let mut frames = 0u64;

        while let Some(chunk) = self.next_chunk().await? {
            tracing::trace!(len = chunk.len(), frame = frames, "sending audio frame");
            self.transport.send_audio(chunk).await?;
            frames += 1;

            let reply = self.recv_reply().await?;
            if let Some(partial) = reply.partial.as_deref() {
                tracing::trace!(partial, "partial hypothesis");
            }
            if let Some(words) = reply.result {
                tracing::debug!(words = words.len(), "finalized words received");
                transcript.append(words);
            }
        }

        self.state = SessionState::AwaitingEofReply;
        tracing::debug!(frames, "audio exhausted, sending end-of-stream marker");
        self.transport.send_eof().await?;

        let reply = self.recv_reply().await?;
        let words = reply.result.ok_or(ProtocolError::MissingFinalResult)?;
        transcript.append(words);

        self.state = SessionState::Done;
        tracing::info!(words = transcript.len(), frames, "session complete");
        Ok(transcript)
    }

    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, SessionError> {
        match self.chunk_timeout {
            Some(dur) => tokio::time::timeout(dur, self.source.next_chunk())
                .await
                .map_err(|_| SessionError::Timeout {
                    waiting_for: "decoder output".to_string(),
                    seconds: dur.as_secs(),
                })?
                .map_err(SessionError::from),
            None => self.source.next_chunk().await.map_err(SessionError::from),
        }
    }

    async fn recv_reply(&mut self) -> Result<ServerReply, SessionError> {
        let raw = match self.reply_timeout {
            Some(dur) => tokio::time::timeout(dur, self.transport.recv_reply())
                .await
                .map_err(|_| SessionError::Timeout {
                    waiting_for: "reply".to_string(),
                    seconds: dur.as_secs(),
                })??,
            None => self.transport.recv_reply().await?,
        };
        let reply = protocol::parse_reply(&raw)?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use wavescribe_core::DecoderError;

    struct EmptySource;

    #[async_trait]
    impl AudioSource for EmptySource {
        async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, DecoderError> {
            Ok(None)
        }

        async fn shutdown(&mut self) -> Result<(), DecoderError> {
            Ok(())
        }
    }

    struct FinalOnlyTransport;

    #[async_trait]
    impl Transport for FinalOnlyTransport {
        async fn send_audio(&mut self, _chunk: Vec<u8>) -> Result<(), ProtocolError> {
            Ok(())
        }

        async fn send_eof(&mut self) -> Result<(), ProtocolError> {
            Ok(())
        }

        async fn recv_reply(&mut self) -> Result<String, ProtocolError> {
            Ok(r#"{"result":[{"word":"done"}]}"#.to_string())
        }

        async fn close(&mut self) -> Result<(), ProtocolError> {
            Ok(())
        }
    }

    #[test]
    fn test_new_session_starts_streaming() {
        let driver = SessionDriver::new(EmptySource, FinalOnlyTransport);
        assert_eq!(driver.state(), SessionState::Streaming);
    }

    #[test]
    fn test_with_timeouts_reads_config() {
        let config = SessionConfig {
            reply_timeout_secs: Some(5),
            chunk_timeout_secs: Some(7),
        };
        let driver = SessionDriver::new(EmptySource, FinalOnlyTransport).with_timeouts(&config);
        assert_eq!(driver.reply_timeout, Some(Duration::from_secs(5)));
        assert_eq!(driver.chunk_timeout, Some(Duration::from_secs(7)));
    }

    #[tokio::test]
    async fn test_run_reaches_done_via_eof_handshake() {
        let transcript = SessionDriver::new(EmptySource, FinalOnlyTransport)
            .run()
            .await
            .unwrap();
        assert_eq!(transcript.len(), 1);
    }
}
