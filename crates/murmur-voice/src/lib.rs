//! Voice pipeline shell for the murmur companion.
//!
//! Everything here is thin plumbing over managed platforms: LiveKit for
//! the WebRTC room lifecycle, and OpenAI-compatible audio endpoints for
//! transcription and synthesis. The crate also hosts the per-session
//! assistant loop, which is where the turn interceptor from
//! `murmur-session` is wired between the transcript and the primary
//! model's reply.

mod client;
mod config;
mod error;
mod service;
mod session;
mod stt;
mod tts;

pub use client::{RoomParticipant, TranscriptionEvent};
pub use config::{LiveKitConfig, SpeechConfig};
pub use error::VoiceError;
pub use service::RoomService;
pub use session::{AssistantSession, SpokenReply};
pub use stt::SttService;
pub use tts::TtsService;
