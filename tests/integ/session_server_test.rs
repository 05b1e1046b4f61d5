use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use mathbrawl::config::GameConfig;
use mathbrawl::model::server_message::{Outcome, ServerMessage};
use mathbrawl::server::start_ws_server;
use mathbrawl::source::StaticQuestionSource;
use mathbrawl::stats::RecordingStatsReporter;

use crate::known_question;

fn quick_config() -> GameConfig {
    GameConfig {
        countdown_step: Duration::from_millis(5),
        countdown_final: Duration::from_millis(5),
        end_delay: Duration::from_millis(5),
        next_question_delay: Duration::from_millis(5),
        question_seconds: 30,
        ..GameConfig::default()
    }
}

async fn start_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let source = Arc::new(StaticQuestionSource::new(vec![known_question("2 + 2", 4)]));
    let reporter = Arc::new(RecordingStatsReporter::new());
    tokio::spawn(start_ws_server(
        listener,
        quick_config(),
        "arithmetic".to_string(),
        source,
        reporter,
    ));

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(10)).await;
    format!("ws://127.0.0.1:{port}")
}

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn recv_until<F>(ws: &mut WsStream, mut matches: F) -> ServerMessage
where
    F: FnMut(&ServerMessage) -> bool,
{
    for _ in 0..100 {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for server message")
            .expect("stream closed")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            let parsed: ServerMessage = serde_json::from_str(&text).unwrap();
            if matches(&parsed) {
                return parsed;
            }
        }
    }
    panic!("Server never sent the expected message");
}

#[tokio::test]
async fn a_round_plays_out_over_websocket() {
    let url = start_server().await;
    let (mut ws, _) = connect_async(url.as_str()).await.expect("Failed to connect");

    ws.send(Message::text(r#"{"type":"startRun"}"#))
        .await
        .unwrap();

    let question = recv_until(&mut ws, |m| matches!(m, ServerMessage::Question { .. })).await;
    let ServerMessage::Question { prompt, options, .. } = question else {
        unreachable!()
    };
    assert_eq!(prompt, "2 + 2");
    assert!(options.contains(&4));

    ws.send(Message::text(r#"{"type":"submitAnswer","option":4}"#))
        .await
        .unwrap();

    let resolution =
        recv_until(&mut ws, |m| matches!(m, ServerMessage::Resolution { .. })).await;
    let ServerMessage::Resolution { outcome, correct_answer, .. } = resolution else {
        unreachable!()
    };
    assert_eq!(outcome, Outcome::Correct);
    assert_eq!(correct_answer, 4);
}

#[tokio::test]
async fn malformed_json_gets_an_error_reply() {
    let url = start_server().await;
    let (mut ws, _) = connect_async(url.as_str()).await.expect("Failed to connect");

    ws.send(Message::text("this is not json")).await.unwrap();

    let error = recv_until(&mut ws, |m| matches!(m, ServerMessage::Error { .. })).await;
    let ServerMessage::Error { message } = error else {
        unreachable!()
    };
    assert!(message.contains("parse"));
}

#[tokio::test]
async fn each_connection_is_its_own_session() {
    let url = start_server().await;
    let (mut first, _) = connect_async(url.as_str()).await.expect("Failed to connect");
    let (mut second, _) = connect_async(url.as_str()).await.expect("Failed to connect");

    first
        .send(Message::text(r#"{"type":"startRun"}"#))
        .await
        .unwrap();
    recv_until(&mut first, |m| matches!(m, ServerMessage::Question { .. })).await;

    // The second connection saw none of that and is still in its menu:
    // an answer submission there is silently dropped, a malformed frame
    // still gets its own error reply.
    second
        .send(Message::text(r#"{"type":"submitAnswer","option":4}"#))
        .await
        .unwrap();
    second.send(Message::text("{broken")).await.unwrap();
    let error = recv_until(&mut second, |m| matches!(m, ServerMessage::Error { .. })).await;
    let ServerMessage::Error { message } = error else {
        unreachable!()
    };
    assert!(message.contains("parse"));
}
