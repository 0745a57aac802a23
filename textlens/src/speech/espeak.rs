use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::SpeechSynthesizer;
use crate::error::{Result, TextlensError};
use crate::models::AudioFormat;

const DEFAULT_BINARY: &str = "espeak-ng";

/// Local speech synthesis by piping text through the `espeak-ng` binary.
#[derive(Clone, Debug)]
pub struct EspeakSynthesizer {
    binary: String,
}

/// espeak-ng voice names differ from ISO 639-1 for a few languages.
fn espeak_voice(language: &str) -> &str {
    match language {
        "zh-cn" | "zh-tw" | "zh" => "cmn",
        "no" => "nb",
        "tl" => "fil",
        other => other,
    }
}

impl EspeakSynthesizer {
    pub fn new() -> Self {
        Self::with_binary(DEFAULT_BINARY)
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Check that the binary can be launched.
    pub fn check_installed(&self) -> Result<()> {
        let output = std::process::Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                TextlensError::SpeechSynthesis(format!("{} is not installed: {e}", self.binary))
            })?;
        if output.success() {
            Ok(())
        } else {
            Err(TextlensError::SpeechSynthesis(format!(
                "{} --version exited with {output}",
                self.binary
            )))
        }
    }
}

impl Default for EspeakSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for EspeakSynthesizer {
    fn name(&self) -> &str {
        "espeak-ng"
    }

    fn format(&self) -> AudioFormat {
        AudioFormat::Wav
    }

    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.binary)
            .args(["--stdin", "--stdout", "-v", espeak_voice(language)])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                TextlensError::SpeechSynthesis(format!("Failed to start {}: {e}", self.binary))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.map_err(|e| {
                TextlensError::SpeechSynthesis(format!("Failed to send text: {e}"))
            })?;
        }

        let output = child.wait_with_output().await.map_err(|e| {
            TextlensError::SpeechSynthesis(format!("{} did not finish: {e}", self.binary))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TextlensError::SpeechSynthesis(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        if output.stdout.is_empty() {
            return Err(TextlensError::SpeechSynthesis(
                "Synthesizer produced no audio".to_string(),
            ));
        }

        Ok(output.stdout)
    }
}
