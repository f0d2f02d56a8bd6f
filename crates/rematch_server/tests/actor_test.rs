//! Lobby actor and HTTP surface on a live runtime.

use rematch_server::{
    AppState, ConnectionId, InboundEvent, LobbyActor, ServerMessage, router,
};
use rematch_tictactoe::{Position, Symbol};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;

async fn next(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("message within timeout")
        .expect("channel open")
}

#[tokio::test]
async fn test_actor_routes_messages_to_connections() {
    let (handle, actor) = LobbyActor::spawn();
    let (a, b) = (ConnectionId::from(1), ConnectionId::from(2));
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();

    handle.connect(a, tx_a).expect("actor running");
    handle.connect(b, tx_b).expect("actor running");
    handle.dispatch(a, InboundEvent::Join).expect("actor running");
    handle.dispatch(b, InboundEvent::Join).expect("actor running");

    let room = match next(&mut rx_a).await {
        ServerMessage::RoomJoined { room_id } => room_id,
        other => panic!("expected roomJoined, got {other:?}"),
    };
    assert_eq!(
        next(&mut rx_a).await,
        ServerMessage::IdentityAssigned { symbol: Symbol::X }
    );
    assert_eq!(
        next(&mut rx_b).await,
        ServerMessage::RoomJoined {
            room_id: room.clone()
        }
    );
    assert_eq!(next(&mut rx_b).await, ServerMessage::GameStart);
    assert_eq!(next(&mut rx_a).await, ServerMessage::GameStart);

    handle
        .dispatch(
            a,
            InboundEvent::Move {
                room: room.clone(),
                position: Position::Center,
            },
        )
        .expect("actor running");
    handle.disconnect(b).expect("actor running");

    // Drain a's queue up to the opponent notice.
    let mut saw_left = false;
    while let Ok(Some(message)) =
        tokio::time::timeout(Duration::from_millis(500), rx_a.recv()).await
    {
        if message == ServerMessage::OpponentLeft {
            saw_left = true;
            break;
        }
    }
    assert!(saw_left, "remaining player told the opponent left");

    drop(handle);
    let lobby = actor.await.expect("actor exits cleanly");
    assert_eq!(lobby.room_count(), 1);
    assert!(lobby.session(b).is_none());
    assert_eq!(
        lobby.room(&room).expect("room kept").state().current_player(),
        Some(Symbol::X)
    );
}

#[tokio::test]
async fn test_actor_stops_when_handles_drop() {
    let (handle, actor) = LobbyActor::spawn();
    let spare = handle.clone();
    drop(handle);
    drop(spare);
    let lobby = actor.await.expect("actor exits cleanly");
    assert_eq!(lobby.room_count(), 0);
}

#[tokio::test]
async fn test_handle_reports_stopped_actor() {
    let (handle, actor) = LobbyActor::spawn();
    actor.abort();
    let _ = actor.await;
    assert!(handle.dispatch(ConnectionId::from(1), InboundEvent::Join).is_err());
}

#[tokio::test]
async fn test_health_endpoint() {
    let (handle, _actor) = LobbyActor::spawn();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(AppState::new(handle)))
            .await
            .expect("serve");
    });

    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect");
    stream
        .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");

    assert!(response.starts_with("HTTP/1.1 200"), "got {response}");
    assert!(response.ends_with("ok"));
}
