use crate::source::AudioSource;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use wavescribe_core::{DecoderConfig, DecoderError};

/// Audio source backed by an external decoder process writing raw PCM to its
/// stdout. The child runs concurrently with the consumer, decoupled by the
/// OS pipe buffer.
pub struct DecoderSource {
    child: Child,
    stdout: Option<ChildStdout>,
    chunk_size: usize,
    bytes_read: u64,
}

fn ffmpeg_args(config: &DecoderConfig, input: &Path) -> Vec<OsString> {
    vec![
        "-nostdin".into(),
        "-loglevel".into(),
        "quiet".into(),
        "-i".into(),
        input.as_os_str().to_os_string(),
        "-ar".into(),
        config.sample_rate.to_string().into(),
        "-ac".into(),
        "1".into(),
        "-f".into(),
        "s16le".into(),
        "-".into(),
    ]
}

impl DecoderSource {
    /// Spawn the configured decoder (ffmpeg by default) for `input`, decoding
    /// to mono 16-bit little-endian PCM at the configured sample rate.
    pub fn spawn_ffmpeg(config: &DecoderConfig, input: &Path) -> Result<Self, DecoderError> {
        let mut command = Command::new(&config.command);
        command.args(ffmpeg_args(config, input));
        Self::from_command(command, config.chunk_size)
    }

    /// Spawn an arbitrary command whose stdout is the PCM stream. Used by
    /// tests to substitute small shell commands for a real decoder.
    pub fn from_command(mut command: Command, chunk_size: usize) -> Result<Self, DecoderError> {
        let program = command.as_std().get_program().to_string_lossy().into_owned();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| DecoderError::Spawn {
            command: program,
            source,
        })?;
        let stdout = child.stdout.take().ok_or(DecoderError::MissingStdout)?;

        Ok(Self {
            child,
            stdout: Some(stdout),
            chunk_size,
            bytes_read: 0,
        })
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }
}

#[async_trait]
impl AudioSource for DecoderSource {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, DecoderError> {
        let stdout = match self.stdout.as_mut() {
            Some(stdout) => stdout,
            None => return Ok(None),
        };

        // Fill the chunk to capacity before handing it over; a short read
        // from the pipe is not EOF, only a zero-length read is.
        let mut chunk = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < self.chunk_size {
            let n = stdout
                .read(&mut chunk[filled..])
                .await
                .map_err(DecoderError::Read)?;
            if n == 0 {
                break;
            }
            filled += n;
        }

        if filled == 0 {
            tracing::debug!(bytes_read = self.bytes_read, "decoder stream exhausted");
            self.stdout = None;
            return Ok(None);
        }

        chunk.truncate(filled);
        self.bytes_read += filled as u64;
        Ok(Some(chunk))
    }

    async fn shutdown(&mut self) -> Result<(), DecoderError> {
        // On failure paths the stream may not be drained and the child can be
        // blocked writing into a full pipe, so kill before waiting.
        if self.stdout.take().is_some() {
            let _ = self.child.start_kill();
        }

        let status = self.child.wait().await.map_err(DecoderError::Wait)?;
        tracing::debug!(%status, "decoder process reaped");

        if !status.success() && self.bytes_read == 0 {
            return Err(DecoderError::ExitedWithoutOutput(status.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wavescribe_core::DecoderConfig;

    #[test]
    fn test_ffmpeg_args_match_decoder_contract() {
        let config = DecoderConfig::default();
        let args = ffmpeg_args(&config, Path::new("in.mp4"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            vec![
                "-nostdin", "-loglevel", "quiet", "-i", "in.mp4", "-ar", "16000", "-ac", "1",
                "-f", "s16le", "-",
            ],
        );
    }

    #[test]
    fn test_ffmpeg_args_use_configured_sample_rate() {
        let config = DecoderConfig {
            sample_rate: 8000,
            ..DecoderConfig::default()
        };
        let args = ffmpeg_args(&config, Path::new("x"));
        assert!(args.contains(&OsString::from("8000")));
    }

    #[tokio::test]
    async fn test_spawn_nonexistent_decoder_fails() {
        let result = DecoderSource::from_command(
            Command::new("/nonexistent/decoder-binary-12345"),
            1024,
        );
        match result {
            Err(DecoderError::Spawn { command, .. }) => {
                assert!(command.contains("decoder-binary-12345"));
            }
            _ => panic!("expected Spawn error"),
        }
    }
}
