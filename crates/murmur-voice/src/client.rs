use crate::error::VoiceError;
use crate::stt::SttService;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// Default capacity for the per-session transcription broadcast channel.
const DEFAULT_TRANSCRIPTION_BROADCAST_CAPACITY: usize = 64;

/// Event emitted when the participant transcribes an utterance.
#[derive(Debug, Clone)]
pub struct TranscriptionEvent {
    pub room_name: String,
    pub speaker_identity: String,
    pub text: String,
}

/// The assistant's presence in a LiveKit room.
///
/// Subscribed audio is handed to [`RoomParticipant::ingest_audio`] by
/// the transport layer, transcribed, and broadcast to the session loop
/// as [`TranscriptionEvent`]s. Reply audio goes back out through
/// [`RoomParticipant::publish_audio`]. The WebRTC track plumbing itself
/// belongs to the platform SDK sidecar, not this crate.
#[derive(Debug)]
pub struct RoomParticipant {
    room_url: String,
    room_name: String,
    connected: bool,
    stt_service: Arc<SttService>,
    transcription_tx: broadcast::Sender<TranscriptionEvent>,
}

impl RoomParticipant {
    /// Joins a room with a previously minted token.
    pub async fn connect(
        url: &str,
        token: &str,
        room_name: &str,
        stt_service: Arc<SttService>,
    ) -> Result<Self, VoiceError> {
        info!(
            room = room_name,
            url,
            token_len = token.len(),
            "assistant joining room"
        );

        let (tx, _) = broadcast::channel(DEFAULT_TRANSCRIPTION_BROADCAST_CAPACITY);

        Ok(Self {
            room_url: url.to_string(),
            room_name: room_name.to_string(),
            connected: true,
            stt_service,
            transcription_tx: tx,
        })
    }

    pub fn room_url(&self) -> &str {
        &self.room_url
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    /// Hands reply audio (raw PCM) to the platform sidecar, which owns
    /// the outbound WebRTC track. This method only validates the
    /// connection state and records the hand-off.
    pub async fn publish_audio(&self, pcm_data: &[u8]) -> Result<(), VoiceError> {
        if !self.connected {
            return Err(VoiceError::RoomService(
                "assistant is not connected to a room".to_string(),
            ));
        }

        info!(
            bytes = pcm_data.len(),
            room = %self.room_name,
            "publishing reply audio"
        );

        Ok(())
    }

    pub async fn disconnect(&mut self) {
        if self.connected {
            info!(room = %self.room_name, "assistant leaving room");
            self.connected = false;
        }
    }

    /// Transcribes one utterance of subscribed audio and broadcasts the
    /// transcript. Called by the transport layer at each end-of-speech
    /// boundary.
    pub async fn ingest_audio(&self, audio: &[u8], speaker: &str) -> Result<(), VoiceError> {
        if !self.connected {
            return Err(VoiceError::RoomService(
                "assistant is not connected to a room".to_string(),
            ));
        }

        let text = self.stt_service.transcribe(audio).await?;

        let event = TranscriptionEvent {
            room_name: self.room_name.clone(),
            speaker_identity: speaker.to_string(),
            text,
        };

        // Receivers may lag or be absent; dropped events are acceptable.
        let _ = self.transcription_tx.send(event);

        Ok(())
    }

    /// Subscribes to transcription events from this participant.
    pub fn subscribe_transcriptions(&self) -> broadcast::Receiver<TranscriptionEvent> {
        self.transcription_tx.subscribe()
    }
}
