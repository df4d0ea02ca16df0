use crate::config::SpeechConfig;
use crate::error::VoiceError;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Maximum audio input size for STT (10 MiB). Prevents oversized uploads.
const MAX_STT_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Timeout for one transcription request.
const STT_TIMEOUT: Duration = Duration::from_secs(60);

/// Transcription over an OpenAI-compatible `audio/transcriptions`
/// endpoint.
#[derive(Debug, Clone)]
pub struct SttService {
    api_base: String,
    api_key: String,
    model: String,
    client: Client,
}

impl SttService {
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>, config: &SpeechConfig) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: config.stt_model.clone(),
            client: Client::new(),
        }
    }

    /// Transcribes one utterance of encoded audio (wav/ogg/webm).
    pub async fn transcribe(&self, audio_data: &[u8]) -> Result<String, VoiceError> {
        if audio_data.len() > MAX_STT_INPUT_BYTES {
            return Err(VoiceError::Stt(format!(
                "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
                audio_data.len(),
                MAX_STT_INPUT_BYTES
            )));
        }

        if audio_data.is_empty() {
            return Err(VoiceError::Stt("empty audio payload".to_string()));
        }

        let url = format!(
            "{}/audio/transcriptions",
            self.api_base.trim_end_matches('/')
        );

        let file_part = reqwest::multipart::Part::bytes(audio_data.to_vec())
            .file_name("utterance.wav")
            .mime_str("application/octet-stream")
            .map_err(|e| VoiceError::Stt(format!("failed to build upload part: {e}")))?;

        let form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("model", self.model.clone());

        debug!(bytes = audio_data.len(), model = %self.model, "transcribing utterance");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .timeout(STT_TIMEOUT)
            .send()
            .await
            .map_err(|e| VoiceError::Stt(format!("transcription request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!(
                "transcription API returned {status}: {body}"
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| VoiceError::Stt(format!("malformed transcription response: {e}")))?;

        let text = body
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| VoiceError::Stt("no text field in transcription response".to_string()))?;

        Ok(text.trim().to_string())
    }
}
