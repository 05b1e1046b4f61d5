use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use log::*;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    WebSocketStream, accept_async,
    tungstenite::{Error, Message, Result},
};

use crate::config::GameConfig;
use crate::controller::GameController;
use crate::model::client_message::ClientMessage;
use crate::model::server_message::ServerMessage;
use crate::source::QuestionSource;
use crate::stats::StatsReporter;

const PING_INTERVAL: Duration = Duration::from_secs(5);
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// Accept WebSocket connections and give each one its own independent game
/// session: one connection, one controller, one run state.
pub async fn start_ws_server<S: QuestionSource, R: StatsReporter>(
    listener: TcpListener,
    config: GameConfig,
    category: String,
    source: Arc<S>,
    reporter: Arc<R>,
) {
    let addr = listener.local_addr().expect("Failed to get local address");
    info!("Listening on: {addr}");

    while let Ok((stream, _)) = listener.accept().await {
        let peer = stream
            .peer_addr()
            .expect("connected streams should have a peer address");
        info!("Peer address: {peer}");

        tokio::spawn(accept_connection(
            peer,
            stream,
            config.clone(),
            category.clone(),
            source.clone(),
            reporter.clone(),
        ));
    }
}

async fn accept_connection<S: QuestionSource, R: StatsReporter>(
    peer: SocketAddr,
    stream: TcpStream,
    config: GameConfig,
    category: String,
    source: Arc<S>,
    reporter: Arc<R>,
) {
    if let Err(e) = handle_session(peer, stream, config, category, source, reporter).await {
        match e {
            Error::ConnectionClosed | Error::Protocol(_) | Error::Utf8(_) => (),
            err => error!("Error processing connection: {err}"),
        }
    }
}

async fn handle_session<S: QuestionSource, R: StatsReporter>(
    peer: SocketAddr,
    stream: TcpStream,
    config: GameConfig,
    category: String,
    source: Arc<S>,
    reporter: Arc<R>,
) -> Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New game session: {peer}");

    let (mut ws_write, mut ws_read) = ws_stream.split();
    let mut handle = GameController::spawn(config, category, source, reporter);

    let mut last_pong = Instant::now();
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);

    loop {
        tokio::select! {
            // Game events out to the client
            Some(msg) = handle.events.recv() => {
                if send_over_ws(&mut ws_write, &msg).await.is_err() {
                    break;
                }
            }

            // Player intents in from the client
            msg_result = ws_read.next() => {
                match msg_result {
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                    }
                    Some(Ok(Message::Text(text))) => {
                        info!("Received message: {text}");
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(cmd) => {
                                if handle.commands.send(cmd).is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                error!("Failed to parse message: {text}");
                                error!("Error: {e}");
                                let reply = ServerMessage::error("Server error: Failed to parse message");
                                if send_over_ws(&mut ws_write, &reply).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        break;
                    }
                    Some(Err(_)) => {
                        break;
                    }
                    _ => {} // Ignore Ping (auto-handled by tungstenite), Binary
                }
            }

            // Heartbeat ping timer
            _ = ping_interval.tick() => {
                if last_pong.elapsed() >= PONG_TIMEOUT {
                    info!("Session {peer} timed out (no pong received)");
                    break;
                }
                if ws_write.send(Message::Ping(vec![].into())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Dropping the command sender shuts the controller task down.
    info!("Session {peer} closed");
    Ok(())
}

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;

async fn send_over_ws(ws_write: &mut WsSink, msg: &ServerMessage) -> Result<()> {
    let json = serde_json::to_string(msg).unwrap_or_else(|e| {
        format!("Catastrophic! Serde error when trying to serialize serverside: {e}")
    });
    ws_write.send(Message::text(json)).await
}
