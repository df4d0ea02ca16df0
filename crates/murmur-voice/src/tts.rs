use crate::config::SpeechConfig;
use crate::error::VoiceError;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Maximum text input size for TTS (4 KiB, the synthesis endpoint's own
/// cap on input length).
const MAX_TTS_INPUT_BYTES: usize = 4 * 1024;

/// Timeout for one synthesis request.
const TTS_TIMEOUT: Duration = Duration::from_secs(60);

/// Speech synthesis over an OpenAI-compatible `audio/speech` endpoint.
///
/// Returns raw PCM (s16le, 24 kHz mono) ready to publish as an audio
/// track.
#[derive(Debug, Clone)]
pub struct TtsService {
    api_base: String,
    api_key: String,
    model: String,
    voice: String,
    client: Client,
}

impl TtsService {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, config: &SpeechConfig) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: config.tts_model.clone(),
            voice: config.voice.clone(),
            client: Client::new(),
        }
    }

    /// The configured voice identifier.
    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Synthesizes speech for one reply.
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        if text.is_empty() {
            return Err(VoiceError::Tts("empty synthesis input".to_string()));
        }

        if text.len() > MAX_TTS_INPUT_BYTES {
            return Err(VoiceError::Tts(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_TTS_INPUT_BYTES
            )));
        }

        let url = format!("{}/audio/speech", self.api_base.trim_end_matches('/'));

        debug!(chars = text.len(), voice = %self.voice, "synthesizing reply");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "voice": self.voice,
                "input": text,
                "response_format": "pcm",
            }))
            .timeout(TTS_TIMEOUT)
            .send()
            .await
            .map_err(|e| VoiceError::Tts(format!("synthesis request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Tts(format!(
                "synthesis API returned {status}: {body}"
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoiceError::Tts(format!("failed to read synthesis body: {e}")))?;

        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TtsService {
        TtsService::new("https://api.openai.com/v1", "sk-test", &SpeechConfig::default())
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let err = service().synthesize("").await.unwrap_err();
        assert!(matches!(err, VoiceError::Tts(ref m) if m.contains("empty")));
    }

    #[tokio::test]
    async fn oversized_text_is_rejected() {
        let text = "a".repeat(MAX_TTS_INPUT_BYTES + 1);
        let err = service().synthesize(&text).await.unwrap_err();
        assert!(matches!(err, VoiceError::Tts(ref m) if m.contains("maximum size")));
    }

    #[test]
    fn voice_comes_from_config() {
        assert_eq!(service().voice(), "nova");
    }
}
