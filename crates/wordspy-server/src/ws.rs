use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::{ConnectInfo, FromRequest, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use wordspy_core::net::messages::{ClientMessage, ServerMessage};
use wordspy_core::net::protocol::{MAX_MESSAGE_SIZE, decode_client_message, encode_server_message};

use crate::error::GameError;
use crate::registry::PlayerSender;
use crate::state::{AppState, ConnectionGuard, IpConnectionGuard};

pub async fn ws_handler(
    State(state): State<AppState>,
    request: axum::extract::Request,
) -> Result<axum::response::Response, StatusCode> {
    let max_ws = state.config.limits.max_ws_connections;
    let current = state.ws_connection_count.load(Ordering::Relaxed);
    if current >= max_ws {
        tracing::warn!(current, max = max_ws, "WS connection limit reached");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    // Per-IP connection limit
    let ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip())
        .unwrap_or(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST));
    let max_per_ip = state.config.limits.max_ws_per_ip;
    let Some(ip_guard) = IpConnectionGuard::try_acquire(ip, Arc::clone(&state.ws_per_ip), max_per_ip)
    else {
        tracing::warn!(%ip, max_per_ip, "Per-IP WS connection limit reached");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    };

    let ws = WebSocketUpgrade::from_request(request, &state)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, ip_guard))
        .into_response())
}

/// What the dispatcher knows about one connection: which lobby it joined
/// and under which name. Owned here, not by the transport handle; the
/// registry only ever sees the resolved values.
#[derive(Default)]
struct Session {
    lobby: Option<String>,
    name: Option<String>,
}

impl Session {
    fn bind(&mut self, lobby: String, name: String) {
        self.lobby = Some(lobby);
        self.name = Some(name);
    }

    fn binding(&self) -> Option<(&str, &str)> {
        Some((self.lobby.as_deref()?, self.name.as_deref()?))
    }

    /// The session's player name, but only when it is joined to `code`.
    fn name_in(&self, code: &str) -> Option<&str> {
        match self.binding() {
            Some((lobby, name)) if lobby == code => Some(name),
            _ => None,
        }
    }
}

async fn handle_socket(socket: WebSocket, state: AppState, _ip_guard: IpConnectionGuard) {
    let _guard = ConnectionGuard::new(Arc::clone(&state.ws_connection_count));
    let (ws_sender, mut ws_receiver) = socket.split();

    // All egress goes through one bounded channel so broadcasts from other
    // connections and direct replies share a single ordered writer.
    let (tx, rx) = mpsc::channel::<Utf8Bytes>(state.config.limits.player_message_buffer);
    spawn_writer(ws_sender, rx);

    let mut session = Session::default();
    read_loop(&mut ws_receiver, &state, &tx, &mut session).await;

    // Connection is gone; pull the player out of their lobby
    if let Some((code, name)) = session.binding() {
        state.lobbies.leave(code, name).await;
        tracing::info!(lobby = %code, player = name, "Player disconnected");
    }
}

fn spawn_writer(
    mut ws_sender: futures::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<Utf8Bytes>,
) {
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if ws_sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });
}

/// Reply to the requesting connection only. Dropping the reply when the
/// channel is full is acceptable; errors are best-effort notifications.
fn send_reply(tx: &PlayerSender, msg: &ServerMessage) {
    match encode_server_message(msg) {
        Ok(text) => {
            if let Err(e) = tx.try_send(text.into()) {
                tracing::debug!(error = %e, "Failed to queue reply");
            }
        },
        Err(e) => tracing::warn!(error = %e, "Failed to encode reply"),
    }
}

/// Per-connection rate limiter (token bucket).
struct RateLimiter {
    tokens: f64,
    last_refill: tokio::time::Instant,
    max_tokens: f64,
    refill_rate: f64, // tokens per second
}

impl RateLimiter {
    fn new(max_tokens: f64, refill_rate: f64) -> Self {
        Self {
            tokens: max_tokens,
            last_refill: tokio::time::Instant::now(),
            max_tokens,
            refill_rate,
        }
    }

    /// Returns true if the message is allowed; false if rate-limited.
    fn allow(&mut self) -> bool {
        let now = tokio::time::Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.max_tokens);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

async fn read_loop(
    ws_receiver: &mut futures::stream::SplitStream<WebSocket>,
    state: &AppState,
    tx: &PlayerSender,
    session: &mut Session,
) {
    let rate = state.config.limits.ws_rate_limit_per_sec;
    let mut rate_limiter = RateLimiter::new(rate, rate);

    while let Some(Ok(msg)) = ws_receiver.next().await {
        let text = match msg {
            Message::Text(t) => t,
            Message::Close(_) => break,
            Message::Binary(_) => {
                let err = GameError::MalformedMessage("binary frames are not supported".into());
                send_reply(tx, &err.to_reply());
                continue;
            },
            _ => continue,
        };

        // Drop messages that exceed per-connection rate
        if !rate_limiter.allow() {
            tracing::warn!(player = session.name.as_deref(), "Rate limited");
            continue;
        }

        if text.len() > MAX_MESSAGE_SIZE {
            let err = GameError::MalformedMessage(format!("frame of {} bytes", text.len()));
            send_reply(tx, &err.to_reply());
            continue;
        }

        let envelope = match decode_client_message(text.as_str()) {
            Ok(envelope) => envelope,
            Err(e) => {
                // A bad frame costs its sender an error reply, nothing more
                let err = GameError::from(e);
                tracing::debug!(error = %err, "Rejected inbound envelope");
                send_reply(tx, &err.to_reply());
                continue;
            },
        };

        if let Err(err) = dispatch(state, tx, session, envelope).await {
            send_reply(tx, &err.to_reply());
        }
    }
}

/// Route one decoded envelope to its state-machine operation.
async fn dispatch(
    state: &AppState,
    tx: &PlayerSender,
    session: &mut Session,
    envelope: ClientMessage,
) -> Result<(), GameError> {
    match envelope {
        ClientMessage::CreateLobby => {
            let code = state.lobbies.create_lobby().await;
            send_reply(tx, &ServerMessage::LobbyCreated { code });
            Ok(())
        },
        ClientMessage::JoinLobby { code, name } => {
            // One lobby, one immutable name per connection. Joining a
            // different lobby leaves the current one first; re-joining the
            // current lobby is rejected like any duplicate name.
            if let Some((prev_code, prev_name)) = session.binding() {
                if prev_code == code {
                    return Err(GameError::NameTaken(prev_name.to_string()));
                }
                let (prev_code, prev_name) = (prev_code.to_string(), prev_name.to_string());
                state.lobbies.leave(&prev_code, &prev_name).await;
                session.lobby = None;
                session.name = None;
            }
            state.lobbies.join(&code, &name, tx.clone()).await?;
            session.bind(code, name);
            Ok(())
        },
        ClientMessage::StartGame { code } => state.lobbies.start_game(&code).await,
        ClientMessage::Chat { code, text } => {
            if let Some(name) = session.name_in(&code) {
                let name = name.to_string();
                state.lobbies.chat(&code, &name, text).await;
            }
            Ok(())
        },
        ClientMessage::Vote { code, voted } => {
            if let Some(name) = session.name_in(&code) {
                let name = name.to_string();
                state.lobbies.vote(&code, &name, voted).await;
            }
            Ok(())
        },
    }
}
