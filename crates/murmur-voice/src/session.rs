//! The per-session assistant loop.
//!
//! One `AssistantSession` exists per connected caller. It owns the
//! primary conversation context, runs the turn interceptor between the
//! transcript and the primary model, and synthesizes the reply. Turns
//! are strictly sequential: the augmentation call completes (or times
//! out) before the primary model generates.

use std::sync::Arc;

use tracing::{info, warn};

use murmur_llm::ChatModel;
use murmur_session::{TurnInterceptor, GREETING, PRIMARY_SYSTEM_PROMPT};
use murmur_types::ChatContext;

use crate::error::VoiceError;
use crate::tts::TtsService;

/// One completed turn: the reply text and its synthesized audio.
#[derive(Debug, Clone)]
pub struct SpokenReply {
    pub text: String,
    pub audio: Vec<u8>,
}

pub struct AssistantSession {
    ctx: ChatContext,
    interceptor: TurnInterceptor,
    primary_model: Arc<dyn ChatModel>,
    tts: TtsService,
}

impl AssistantSession {
    pub fn new(
        interceptor: TurnInterceptor,
        primary_model: Arc<dyn ChatModel>,
        tts: TtsService,
    ) -> Self {
        Self {
            ctx: ChatContext::new(PRIMARY_SYSTEM_PROMPT),
            interceptor,
            primary_model,
            tts,
        }
    }

    /// The fixed opening line, synthesized. Spoken once when the caller
    /// connects, before any user turn.
    pub async fn greet(&self) -> Result<SpokenReply, VoiceError> {
        let audio = self.tts.synthesize(GREETING).await?;
        Ok(SpokenReply {
            text: GREETING.to_string(),
            audio,
        })
    }

    /// Runs one full user turn: transcript in, spoken reply out.
    ///
    /// The interceptor may rewrite the system slot with advisory text;
    /// if augmentation fails it logs and the turn proceeds with the
    /// prior system message. A synthesis failure still returns the
    /// reply text with empty audio, so the transcript view of the
    /// session stays intact.
    pub async fn handle_turn(&mut self, user_text: &str) -> Result<SpokenReply, VoiceError> {
        self.ctx.push_human(user_text);

        let augmented = self.interceptor.before_generate(&mut self.ctx).await;
        info!(augmented, turns = self.ctx.len(), "generating reply");

        let reply_text = self.primary_model.complete(self.ctx.turns()).await?;
        self.ctx.push_assistant(&reply_text);

        let audio = match self.tts.synthesize(&reply_text).await {
            Ok(audio) => audio,
            Err(e) => {
                warn!(error = %e, "synthesis failed, returning text-only reply");
                Vec::new()
            }
        };

        Ok(SpokenReply {
            text: reply_text,
            audio,
        })
    }

    /// The running conversation, system slot first.
    pub fn context(&self) -> &ChatContext {
        &self.ctx
    }
}
