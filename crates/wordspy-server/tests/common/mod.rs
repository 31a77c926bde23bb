use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use wordspy_core::net::messages::{ClientMessage, ServerMessage};
use wordspy_core::net::protocol::{decode_server_message, encode_client_message};
use wordspy_core::words::WordList;

use wordspy_server::build_app;
use wordspy_server::config::ServerConfig;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct TestServer {
    pub addr: SocketAddr,
    _server: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server on an ephemeral port with default config and
    /// the built-in word list.
    pub async fn new() -> Self {
        Self::from_config(ServerConfig::default()).await
    }

    pub async fn from_config(config: ServerConfig) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, _state) = build_app(config, WordList::default());
        let handle = tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            _server: handle,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }
}

/// Connect a WebSocket client to the given URL.
pub async fn ws_connect(url: &str) -> WsStream {
    let (stream, _) = tokio_tungstenite::connect_async(url).await.unwrap();
    stream
}

/// Send one client envelope.
pub async fn ws_send(stream: &mut WsStream, msg: &ClientMessage) {
    let text = encode_client_message(msg).unwrap();
    stream.send(Message::Text(text.into())).await.unwrap();
}

/// Send a raw text frame, bypassing the protocol encoder.
pub async fn ws_send_raw(stream: &mut WsStream, text: &str) {
    stream
        .send(Message::Text(text.to_string().into()))
        .await
        .unwrap();
}

/// Read the next server envelope, skipping transport frames. Panics after
/// five seconds so a missing broadcast fails the test instead of hanging it.
pub async fn ws_read(stream: &mut WsStream) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    return decode_server_message(text.as_str()).unwrap();
                },
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("expected a text frame, got: {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for a server message")
}

/// Create a lobby and return its code.
pub async fn ws_create_lobby(stream: &mut WsStream) -> String {
    ws_send(stream, &ClientMessage::CreateLobby).await;
    match ws_read(stream).await {
        ServerMessage::LobbyCreated { code } => code,
        other => panic!("expected lobbyCreated, got: {other:?}"),
    }
}

/// Join a lobby and return the roster from the join broadcast.
pub async fn ws_join(stream: &mut WsStream, code: &str, name: &str) -> Vec<String> {
    ws_send(
        stream,
        &ClientMessage::JoinLobby {
            code: code.to_string(),
            name: name.to_string(),
        },
    )
    .await;
    match ws_read(stream).await {
        ServerMessage::UpdatePlayers { players } => players,
        other => panic!("expected updatePlayers, got: {other:?}"),
    }
}

/// Read the next envelope and require it to be an error reply.
pub async fn ws_expect_error(stream: &mut WsStream) -> String {
    match ws_read(stream).await {
        ServerMessage::Error { message } => message,
        other => panic!("expected error, got: {other:?}"),
    }
}

/// Create a lobby and join `names` in order, one connection each. Joins
/// are serialized on each joiner's own roster broadcast, and every queued
/// broadcast is drained afterwards so all streams start quiet.
pub async fn lobby_with_players(server: &TestServer, names: &[&str]) -> (String, Vec<WsStream>) {
    let mut first = ws_connect(&server.ws_url()).await;
    let code = ws_create_lobby(&mut first).await;
    let roster = ws_join(&mut first, &code, names[0]).await;
    assert_eq!(roster, vec![names[0].to_string()]);

    let mut streams = vec![first];
    for (i, name) in names.iter().enumerate().skip(1) {
        let mut stream = ws_connect(&server.ws_url()).await;
        let roster = ws_join(&mut stream, &code, name).await;
        assert_eq!(roster.len(), i + 1);
        streams.push(stream);
    }

    for (j, stream) in streams.iter_mut().enumerate() {
        for _ in 0..(names.len() - 1 - j) {
            let msg = ws_read(stream).await;
            assert!(
                matches!(msg, ServerMessage::UpdatePlayers { .. }),
                "expected queued roster update, got: {msg:?}"
            );
        }
    }

    (code, streams)
}
