//! Gateway (WebSocket) transport.
//!
//! This module owns the connection lifecycle:
//!   - connect, receive HELLO, send IDENTIFY or RESUME
//!   - background heartbeat task with zombie detection
//!   - sequence number and session tracking
//!   - reconnect with exponential backoff
//!   - send rate limiting (120 events / 60s)
//!
//! Everything else consumes [`GatewayEvent`]s from a [`GatewayHandle`] and
//! never touches `tokio_tungstenite` directly.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_lock::Mutex;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, Intents};
use crate::events::{opcode, GatewayEvent, GatewayPayload};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg";
const GATEWAY_VERSION: &str = "10";

/// Discord allows at most 120 gateway sends per 60 seconds.
const SEND_BUDGET_MAX: u32 = 120;
const SEND_BUDGET_WINDOW: Duration = Duration::from_secs(60);

const HELLO_TIMEOUT: Duration = Duration::from_secs(30);

/// Consecutive failed connections before the driver gives up.
pub const MAX_RECONNECT_ATTEMPTS: u32 = 8;

const EVENT_BUFFER: usize = 256;
const SEND_BUFFER: usize = 64;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The first frame wasn't a usable HELLO.
    #[error("bad HELLO: {0}")]
    Hello(String),

    /// Discord closed with a code that can't be recovered from.
    #[error("gateway closed with {code} ({reason})")]
    Closed { code: u16, reason: &'static str },

    #[error("gave up after {0} reconnect attempts")]
    ReconnectsExhausted(u32),

    #[error("failed to encode gateway payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The driver task is gone; nothing can be sent.
    #[error("gateway driver has shut down")]
    Shutdown,
}

// ---------------------------------------------------------------------------
// Gateway send rate limiter
// ---------------------------------------------------------------------------

/// Sliding-window limiter for outbound gateway frames.
struct SendRateLimiter {
    timestamps: Vec<Instant>,
    budget: u32,
    window: Duration,
}

impl SendRateLimiter {
    fn new(budget: u32, window: Duration) -> Self {
        Self {
            timestamps: Vec::with_capacity(budget as usize),
            budget,
            window,
        }
    }

    /// How long to wait before the next send. Does not record the send.
    fn delay(&self, now: Instant) -> Option<Duration> {
        let in_window: Vec<Instant> = self
            .timestamps
            .iter()
            .copied()
            .filter(|&t| now.duration_since(t) < self.window)
            .collect();

        if (in_window.len() as u32) < self.budget {
            return None;
        }

        let oldest = in_window.into_iter().min()?;
        let expires_at = oldest + self.window;
        (expires_at > now).then(|| expires_at - now)
    }

    fn record(&mut self, now: Instant) {
        self.timestamps
            .retain(|&t| now.duration_since(t) < self.window);
        self.timestamps.push(now);
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Options for connecting to the gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    pub token: String,
    pub intents: Intents,
    /// `[shard_id, num_shards]`.
    pub shard: Option<[u32; 2]>,
    /// Base URL for the first connection, usually from `GET /gateway/bot`.
    pub url: String,
}

impl GatewayConfig {
    pub fn new(token: impl Into<String>, intents: Intents) -> Self {
        Self {
            token: token.into(),
            intents,
            shard: None,
            url: DEFAULT_GATEWAY_URL.to_string(),
        }
    }

    pub fn with_shard(mut self, shard_id: u32, num_shards: u32) -> Self {
        self.shard = Some([shard_id, num_shards]);
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl From<&ClientConfig> for GatewayConfig {
    fn from(config: &ClientConfig) -> Self {
        Self::new(config.token.clone(), config.intents)
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("token", &"<redacted>")
            .field("intents", &self.intents)
            .field("shard", &self.shard)
            .field("url", &self.url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct SessionState {
    session_id: Option<String>,
    resume_gateway_url: Option<String>,
    sequence: Option<u64>,
}

impl SessionState {
    /// Forget the session. The next connection identifies from scratch on
    /// the configured URL.
    fn invalidate(&mut self) {
        self.session_id = None;
        self.sequence = None;
        self.resume_gateway_url = None;
    }

    /// The resume URL while a session is live, otherwise `default`.
    fn connect_url(&self, default: &str) -> String {
        self.resume_gateway_url
            .clone()
            .unwrap_or_else(|| default.to_string())
    }
}

// ---------------------------------------------------------------------------
// Transport types
// ---------------------------------------------------------------------------

type WsConnection = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;
type WsSink = SplitSink<WsConnection, WsMessage>;
type WsStream = SplitStream<WsConnection>;

/// Everything one connection shares between the read loop and the heartbeat.
struct Writer {
    sink: Mutex<WsSink>,
    limiter: Mutex<SendRateLimiter>,
}

impl Writer {
    fn new(sink: WsSink) -> Self {
        Self {
            sink: Mutex::new(sink),
            limiter: Mutex::new(SendRateLimiter::new(SEND_BUDGET_MAX, SEND_BUDGET_WINDOW)),
        }
    }

    /// Send a frame, waiting for send budget first.
    async fn send(&self, payload: &Value) -> Result<(), GatewayError> {
        loop {
            let delay = self.limiter.lock().await.delay(Instant::now());
            match delay {
                Some(d) => {
                    debug!(delay_ms = d.as_millis() as u64, "gateway send rate-limited, waiting");
                    tokio::time::sleep(d).await;
                }
                None => break,
            }
        }
        self.limiter.lock().await.record(Instant::now());

        let text = serde_json::to_string(payload)?;
        self.sink.lock().await.send(WsMessage::Text(text)).await?;
        Ok(())
    }

    async fn close(&self) {
        let _ = self.sink.lock().await.send(WsMessage::Close(None)).await;
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A running gateway connection.
///
/// Dropping the handle closes the event channel, which stops the driver the
/// next time it has something to deliver.
pub struct GatewayHandle {
    sender: async_channel::Sender<Value>,
    events: async_channel::Receiver<GatewayEvent>,
    driver: JoinHandle<Result<(), GatewayError>>,
}

impl GatewayHandle {
    /// Next event, or `None` once the driver has stopped.
    pub async fn next_event(&self) -> Option<GatewayEvent> {
        self.events.recv().await.ok()
    }

    /// Queue a raw frame (presence update, member request, ...).
    pub async fn send(&self, payload: Value) -> Result<(), GatewayError> {
        self.sender
            .send(payload)
            .await
            .map_err(|_| GatewayError::Shutdown)
    }

    /// Set the bot's status, e.g. `"online"` or `"idle"`.
    pub async fn update_presence(&self, status: &str) -> Result<(), GatewayError> {
        self.send(json!({
            "op": opcode::PRESENCE_UPDATE,
            "d": {"since": null, "activities": [], "status": status, "afk": false}
        }))
        .await
    }

    /// Wait for the driver to finish and return why it stopped.
    pub async fn join(self) -> Result<(), GatewayError> {
        drop(self.events);
        drop(self.sender);
        self.driver.await.unwrap_or(Err(GatewayError::Shutdown))
    }

    pub fn abort(&self) {
        self.driver.abort();
    }
}

/// Spawn the driver task and return a handle to it.
///
/// Must be called inside a Tokio runtime.
pub fn connect(config: GatewayConfig) -> GatewayHandle {
    let (event_tx, event_rx) = async_channel::bounded(EVENT_BUFFER);
    let (send_tx, send_rx) = async_channel::bounded(SEND_BUFFER);

    let driver = tokio::spawn(async move {
        let result = drive(config, event_tx, send_rx).await;
        if let Err(e) = &result {
            error!(error = %e, "gateway driver stopped");
        }
        result
    });

    GatewayHandle {
        sender: send_tx,
        events: event_rx,
        driver,
    }
}

// ---------------------------------------------------------------------------
// Driver loop (runs in a spawned task)
// ---------------------------------------------------------------------------

async fn drive(
    config: GatewayConfig,
    event_tx: async_channel::Sender<GatewayEvent>,
    send_rx: async_channel::Receiver<Value>,
) -> Result<(), GatewayError> {
    let session = Mutex::new(SessionState::default());
    let mut attempts: u32 = 0;

    loop {
        match run_connection(&config, &session, &event_tx, &send_rx, &mut attempts).await {
            Ok(DisconnectReason::Resume) => info!("will attempt RESUME"),
            Ok(DisconnectReason::Reidentify) => {
                info!("session invalidated, will re-IDENTIFY");
                session.lock().await.invalidate();
            }
            Ok(DisconnectReason::Fatal { code, reason }) => {
                return Err(GatewayError::Closed { code, reason });
            }
            Ok(DisconnectReason::EventChannelClosed) => {
                info!("event channel closed, shutting down gateway driver");
                return Ok(());
            }
            Err(e) => warn!(error = %e, "gateway connection failed"),
        }

        attempts += 1;
        if attempts > MAX_RECONNECT_ATTEMPTS {
            return Err(GatewayError::ReconnectsExhausted(MAX_RECONNECT_ATTEMPTS));
        }
        let backoff = backoff_delay(attempts);
        warn!(
            delay_ms = backoff.as_millis() as u64,
            attempt = attempts,
            "reconnecting after backoff"
        );
        tokio::time::sleep(backoff).await;
    }
}

/// One WebSocket connection, from handshake to disconnect.
async fn run_connection(
    config: &GatewayConfig,
    session: &Mutex<SessionState>,
    event_tx: &async_channel::Sender<GatewayEvent>,
    send_rx: &async_channel::Receiver<Value>,
    attempts: &mut u32,
) -> Result<DisconnectReason, GatewayError> {
    let base = session.lock().await.connect_url(&config.url);
    let url = gateway_url(&base);

    info!(url = %url, "connecting to gateway");
    let (ws, _) = tokio_tungstenite::connect_async(url.as_str()).await?;
    let (sink, mut stream) = ws.split();
    let writer = Arc::new(Writer::new(sink));

    let heartbeat_interval = read_hello(&mut stream).await?;
    *attempts = 0;
    info!(interval_ms = heartbeat_interval, "received HELLO");

    let resume = {
        let s = session.lock().await;
        match (&s.session_id, s.sequence) {
            (Some(id), Some(seq)) => Some(resume_payload(&config.token, id, seq)),
            _ => None,
        }
    };
    match resume {
        Some(payload) => {
            writer.send(&payload).await?;
            info!("sent RESUME");
        }
        None => {
            writer.send(&identify_payload(config)).await?;
            info!("sent IDENTIFY");
        }
    }

    let ack_pending = Arc::new(AtomicBool::new(false));
    let (zombie_tx, zombie_rx) = async_channel::bounded::<()>(1);
    let sequence = Arc::new(Mutex::new(session.lock().await.sequence));
    let heartbeat = tokio::spawn(heartbeat_task(
        Arc::clone(&writer),
        Arc::clone(&sequence),
        Arc::clone(&ack_pending),
        Duration::from_millis(heartbeat_interval),
        zombie_tx,
    ));

    let reason = read_loop(
        &mut stream,
        &writer,
        session,
        &sequence,
        &ack_pending,
        event_tx,
        send_rx,
        &zombie_rx,
    )
    .await;

    heartbeat.abort();
    writer.close().await;
    Ok(reason)
}

async fn heartbeat_task(
    writer: Arc<Writer>,
    sequence: Arc<Mutex<Option<u64>>>,
    ack_pending: Arc<AtomicBool>,
    period: Duration,
    zombie_tx: async_channel::Sender<()>,
) {
    // First beat after `period * jitter`, jitter in [0, 1).
    let jitter = rand::random::<f64>();
    tokio::time::sleep(period.mul_f64(jitter)).await;

    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;

        if ack_pending.swap(true, Ordering::AcqRel) {
            warn!("no HEARTBEAT_ACK since the last heartbeat, connection is a zombie");
            let _ = zombie_tx.try_send(());
            return;
        }

        let seq = *sequence.lock().await;
        if let Err(e) = writer.send(&json!({"op": opcode::HEARTBEAT, "d": seq})).await {
            warn!(error = %e, "heartbeat send failed, stopping heartbeat task");
            return;
        }
        debug!(seq = ?seq, "sent heartbeat");
    }
}

// ---------------------------------------------------------------------------
// Disconnect reason
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisconnectReason {
    Resume,
    Reidentify,
    Fatal { code: u16, reason: &'static str },
    EventChannelClosed,
}

/// What to do after Discord closes the socket with `code`.
fn classify_close(code: u16) -> DisconnectReason {
    let fatal = |reason| DisconnectReason::Fatal { code, reason };
    match code {
        4004 => fatal("authentication failed"),
        4010 => fatal("invalid shard"),
        4011 => fatal("sharding required"),
        4012 => fatal("invalid API version"),
        4013 => fatal("invalid intents"),
        4014 => fatal("disallowed intents"),
        // Invalid seq or session timed out.
        4007 | 4009 => DisconnectReason::Reidentify,
        _ => DisconnectReason::Resume,
    }
}

// ---------------------------------------------------------------------------
// Read loop
// ---------------------------------------------------------------------------

#[allow(clippy::too_many_arguments)]
async fn read_loop(
    stream: &mut WsStream,
    writer: &Writer,
    session: &Mutex<SessionState>,
    sequence: &Mutex<Option<u64>>,
    ack_pending: &AtomicBool,
    event_tx: &async_channel::Sender<GatewayEvent>,
    send_rx: &async_channel::Receiver<Value>,
    zombie_rx: &async_channel::Receiver<()>,
) -> DisconnectReason {
    loop {
        tokio::select! {
            biased;

            Ok(()) = zombie_rx.recv() => return DisconnectReason::Resume,

            Ok(payload) = send_rx.recv() => {
                if let Err(e) = writer.send(&payload).await {
                    warn!(error = %e, "failed to send user payload on gateway");
                }
            }

            msg = stream.next() => {
                let text = match msg {
                    Some(Ok(WsMessage::Text(text))) => text,
                    Some(Ok(WsMessage::Close(frame))) => {
                        let Some(frame) = frame else {
                            warn!("WebSocket closed without a code");
                            return DisconnectReason::Resume;
                        };
                        let code = u16::from(frame.code);
                        let reason = classify_close(code);
                        warn!(close_code = code, reason = %frame.reason, "WebSocket closed by server");
                        return reason;
                    }
                    // Ping/Pong/Binary
                    Some(Ok(_)) => continue,
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket read error");
                        return DisconnectReason::Resume;
                    }
                    None => {
                        info!("WebSocket stream ended");
                        return DisconnectReason::Resume;
                    }
                };

                let payload: GatewayPayload = match serde_json::from_str(&text) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!(error = %e, "failed to parse gateway payload");
                        continue;
                    }
                };

                if let Some(s) = payload.s {
                    session.lock().await.sequence = Some(s);
                    *sequence.lock().await = Some(s);
                }

                let event = GatewayEvent::from_payload(payload);
                match &event {
                    GatewayEvent::Ready(ready) => {
                        let mut s = session.lock().await;
                        s.session_id = Some(ready.session_id.clone());
                        s.resume_gateway_url = Some(ready.resume_gateway_url.clone());
                        info!(
                            session_id = %ready.session_id,
                            user = %ready.user.name,
                            guilds = ready.guilds.len(),
                            "gateway READY"
                        );
                    }
                    GatewayEvent::Resumed => info!("session resumed"),
                    GatewayEvent::HeartbeatRequest => {
                        let seq = *sequence.lock().await;
                        if let Err(e) = writer.send(&json!({"op": opcode::HEARTBEAT, "d": seq})).await {
                            warn!(error = %e, "failed to send requested heartbeat");
                        }
                        continue;
                    }
                    GatewayEvent::HeartbeatAck => {
                        ack_pending.store(false, Ordering::Release);
                        debug!("heartbeat acknowledged");
                        continue;
                    }
                    GatewayEvent::Reconnect => {
                        info!("gateway requested reconnect (op 7)");
                        return DisconnectReason::Resume;
                    }
                    GatewayEvent::InvalidSession(resumable) => {
                        warn!(resumable, "session invalidated (op 9)");
                        return if *resumable {
                            tokio::time::sleep(Duration::from_secs(2)).await;
                            DisconnectReason::Resume
                        } else {
                            tokio::time::sleep(Duration::from_secs(3)).await;
                            DisconnectReason::Reidentify
                        };
                    }
                    _ => {}
                }

                if event_tx.send(event).await.is_err() {
                    return DisconnectReason::EventChannelClosed;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Append `v` and `encoding` unless the URL already names a version.
fn gateway_url(base: &str) -> String {
    match url::Url::parse(base) {
        Ok(mut url) => {
            if !url.query_pairs().any(|(key, _)| key == "v") {
                url.query_pairs_mut()
                    .append_pair("v", GATEWAY_VERSION)
                    .append_pair("encoding", "json");
            }
            url.to_string()
        }
        Err(_) => format!("{DEFAULT_GATEWAY_URL}/?v={GATEWAY_VERSION}&encoding=json"),
    }
}

fn identify_payload(config: &GatewayConfig) -> Value {
    let mut identify = json!({
        "op": opcode::IDENTIFY,
        "d": {
            "token": config.token,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "cordial",
                "device": "cordial"
            },
            "intents": config.intents.bits(),
        }
    });
    if let Some([id, count]) = config.shard {
        identify["d"]["shard"] = json!([id, count]);
    }
    identify
}

fn resume_payload(token: &str, session_id: &str, seq: u64) -> Value {
    json!({
        "op": opcode::RESUME,
        "d": {"token": token, "session_id": session_id, "seq": seq}
    })
}

async fn read_hello(stream: &mut WsStream) -> Result<u64, GatewayError> {
    let msg = tokio::time::timeout(HELLO_TIMEOUT, stream.next())
        .await
        .map_err(|_| GatewayError::Hello("timed out".into()))?
        .ok_or_else(|| GatewayError::Hello("stream ended".into()))??;

    let WsMessage::Text(text) = msg else {
        return Err(GatewayError::Hello(format!("expected a text frame, got {msg:?}")));
    };

    let payload: GatewayPayload = serde_json::from_str(&text)?;
    match GatewayEvent::from_payload(payload) {
        GatewayEvent::Hello(interval) => Ok(interval),
        other => Err(GatewayError::Hello(format!("expected op 10, got {}", other.name()))),
    }
}

/// Exponential backoff with jitter, capped at 60 s.
fn backoff_delay(attempt: u32) -> Duration {
    let base_ms = 1000u64 * 2u64.saturating_pow(attempt.min(6));
    let jittered = (rand::random::<f64>() * 0.5 + 0.75) * base_ms as f64;
    Duration::from_millis(jittered.min(60_000.0) as u64)
}
