//! Murmur worker binary: one long-running voice companion process.
//!
//! Startup order: configuration, tracing, conversation memory (with
//! migrations), identity resolution, session assembly, room join, then
//! the health endpoint until SIGINT/SIGTERM. Identity failure is not
//! fatal: the session simply runs without memory augmentation.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use murmur_identity::IdentityResolver;
use murmur_llm::OpenAiChatModel;
use murmur_memory::{DbRuntimeSettings, MemoryStore};
use murmur_session::{AugmentationChain, TurnInterceptor};
use murmur_voice::{
    AssistantSession, RoomParticipant, RoomService, SttService, TranscriptionEvent, TtsService,
};

/// Health check handler.
///
/// Returns `200 OK` with worker status and version. Used by process
/// supervisors and monitoring to verify the worker is alive.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the worker's HTTP router.
fn app() -> Router {
    Router::new().route("/health", get(health))
}

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("MURMUR_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration — the worker cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    // Open conversation memory and bring the schema up to date.
    let store = MemoryStore::open(
        &config.memory.path,
        DbRuntimeSettings {
            busy_timeout_ms: config.memory.busy_timeout_ms,
            pool_max_size: config.memory.pool_max_size,
        },
    )
    .expect("failed to open conversation memory — check memory.path in config");

    // Resolve the identity token that selects the memory partition.
    // `None` is a valid outcome: the session then runs memory-less.
    let resolver = IdentityResolver::new(&config.identity.endpoint)
        .with_timeout(Duration::from_millis(config.identity.timeout_ms));
    let partition_key = resolver.resolve().await;
    if partition_key.is_none() {
        tracing::warn!("no identity resolved, session will run without memory augmentation");
    }

    // Assemble the session core.
    let augmentation_model = Arc::new(OpenAiChatModel::new(config.augmentation.model.clone()));
    let chain = AugmentationChain::new(augmentation_model, store.clone());
    let interceptor = TurnInterceptor::new(chain, partition_key)
        .with_timeout(Duration::from_millis(config.augmentation.timeout_ms));

    let primary_model = Arc::new(OpenAiChatModel::new(config.primary.clone()));
    let tts = TtsService::new(
        &config.primary.api_base,
        &config.primary.api_key,
        &config.speech,
    );
    let stt = Arc::new(SttService::new(
        &config.primary.api_base,
        &config.primary.api_key,
        &config.speech,
    ));

    let session = AssistantSession::new(interceptor, primary_model, tts);

    // Join the session room and start turning transcripts into replies.
    let room_service = RoomService::new(config.livekit.clone());
    if room_service.is_enabled() {
        let room_name = format!("murmur-{}", uuid::Uuid::new_v4());
        if let Err(e) = room_service.create_room(&room_name).await {
            tracing::warn!(error = %e, room = %room_name, "room creation failed, continuing");
        }

        let token = room_service
            .assistant_join_token(&room_name, "murmur-worker")
            .expect("failed to mint the assistant's join token");

        let participant = Arc::new(
            RoomParticipant::connect(room_service.url(), &token, &room_name, stt)
                .await
                .expect("failed to join the session room"),
        );

        let rx = participant.subscribe_transcriptions();
        tokio::spawn(run_turns(session, Arc::clone(&participant), rx));
    } else {
        tracing::warn!("livekit.url is not configured, worker has no voice transport");
    }

    // Health endpoint until shutdown.
    let app = app();
    let addr = SocketAddr::new(config.worker.host, config.worker.port);

    tracing::info!(%addr, "starting murmur worker");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address — is another process using this port?");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("worker error");

    tracing::info!("murmur worker shut down");
}

/// Turn loop: greet, then one spoken reply per transcription event.
async fn run_turns(
    mut session: AssistantSession,
    participant: Arc<RoomParticipant>,
    mut rx: broadcast::Receiver<TranscriptionEvent>,
) {
    match session.greet().await {
        Ok(reply) => {
            if let Err(e) = participant.publish_audio(&reply.audio).await {
                tracing::warn!(error = %e, "failed to publish greeting");
            }
        }
        Err(e) => tracing::warn!(error = %e, "greeting synthesis failed"),
    }

    loop {
        match rx.recv().await {
            Ok(event) => {
                if event.text.is_empty() {
                    continue;
                }

                tracing::info!(speaker = %event.speaker_identity, "user turn transcribed");

                match session.handle_turn(&event.text).await {
                    Ok(reply) => {
                        if reply.audio.is_empty() {
                            tracing::warn!("reply has no audio, skipping publish");
                        } else if let Err(e) = participant.publish_audio(&reply.audio).await {
                            tracing::warn!(error = %e, "failed to publish reply audio");
                        }
                    }
                    Err(e) => {
                        // The turn is lost but the session survives.
                        tracing::error!(error = %e, "turn failed");
                    }
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "transcription receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }

    tracing::info!("transcription stream closed, turn loop ending");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}
