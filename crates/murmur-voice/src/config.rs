use serde::Deserialize;
use std::fmt;

fn default_token_ttl_seconds() -> u64 {
    3600
}

fn default_tts_voice() -> String {
    "nova".to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

/// Connection settings for the LiveKit room service.
#[derive(Clone, Deserialize)]
pub struct LiveKitConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// JWT token TTL in seconds for LiveKit join tokens. Default: 3600 (1 hour).
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,
}

impl Default for LiveKitConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

impl fmt::Debug for LiveKitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveKitConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .finish()
    }
}

impl LiveKitConfig {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            token_ttl_seconds: default_token_ttl_seconds(),
        }
    }
}

/// Settings for the speech endpoints of the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// TTS voice identifier.
    #[serde(default = "default_tts_voice")]
    pub voice: String,

    /// Synthesis model.
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Transcription model.
    #[serde(default = "default_stt_model")]
    pub stt_model: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            voice: default_tts_voice(),
            tts_model: default_tts_model(),
            stt_model: default_stt_model(),
        }
    }
}
