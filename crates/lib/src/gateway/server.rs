//! Gateway HTTP server: health probe and the LINE webhook receiver.

use crate::channels::{
    parse_events, signature, InboundEvent, LineChannel, ReplySender, SIGNATURE_HEADER,
};
use crate::config::{Config, Credentials};
use crate::gateway::error::RelayError;
use crate::llm::{GeminiClient, Generator};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;

/// Prompt answered by `GET /`.
pub const HEALTH_PROBE: &str = "who are you?";

/// Shared state for the gateway. Built once at startup; read-only afterwards.
#[derive(Clone)]
pub struct GatewayState {
    /// Channel secret for X-Line-Signature verification.
    pub channel_secret: Arc<str>,
    pub generator: Arc<dyn Generator>,
    pub replier: Arc<dyn ReplySender>,
}

impl GatewayState {
    /// State backed by the real Gemini and LINE clients.
    pub fn new(config: &Config, credentials: Credentials) -> Self {
        let generator = GeminiClient::new(
            credentials.gemini_api_key,
            Some(config.gemini.model.clone()),
            Some(config.gemini.api_base.clone()),
        );
        let replier = LineChannel::new(
            credentials.channel_access_token,
            Some(config.line.api_base.clone()),
        );
        Self::with_clients(
            credentials.channel_secret,
            Arc::new(generator),
            Arc::new(replier),
        )
    }

    /// State with caller-supplied generation and reply clients.
    pub fn with_clients(
        channel_secret: String,
        generator: Arc<dyn Generator>,
        replier: Arc<dyn ReplySender>,
    ) -> Self {
        Self {
            channel_secret: channel_secret.into(),
            generator,
            replier,
        }
    }
}

/// Routes: `GET /` and `POST /callback`.
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http))
        .route("/callback", post(callback))
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` completes.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: GatewayState,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("gateway server exited")
}

/// Run the gateway; binds to config.server.bind:config.server.port.
/// Fails before binding if any credential is missing. Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    let credentials = Credentials::resolve(&config)?;
    let bind_addr = format!("{}:{}", config.server.bind.trim(), config.server.port);
    log::info!("generation model: {}", config.gemini.model);
    let state = GatewayState::new(&config, credentials);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    serve(listener, state, shutdown_signal()).await?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received, draining connections");
}

/// GET / answers the fixed probe prompt with generated text.
async fn health_http(State(state): State<GatewayState>) -> Result<String, RelayError> {
    let reply = state.generator.generate(HEALTH_PROBE).await?;
    Ok(reply)
}

/// POST /callback: verify X-Line-Signature over the raw body, then answer each text message in order.
/// The response is sent only after every event has been handled.
async fn callback(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, RelayError> {
    log::debug!("callback headers: {:?}", headers);
    let provided = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(RelayError::MissingSignature)?;
    log::debug!("callback body: {}", String::from_utf8_lossy(&body));
    signature::verify(&state.channel_secret, &body, provided)?;

    let events = parse_events(&body).map_err(RelayError::InvalidPayload)?;
    for event in events {
        handle_event(&state, event).await?;
    }
    Ok("OK")
}

/// Generate a reply for one message and send it with the event's reply token.
async fn handle_event(state: &GatewayState, event: InboundEvent) -> Result<(), RelayError> {
    log::info!("inbound message: {}", event.text);
    let reply = state.generator.generate(&event.text).await?;
    log::info!("generated reply: {}", reply);
    state.replier.reply(&event.reply_token, &reply).await?;
    Ok(())
}
