//! WebSocket transport: accepts connections and bridges them to the lobby.

use crate::{ConnectionIds, LobbyActor, LobbyHandle, ServerConfig, ServerError, decode_frame};
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Path clients open their WebSocket on.
pub const GAME_PATH: &str = "/game";

/// State shared by every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    lobby: LobbyHandle,
    ids: Arc<ConnectionIds>,
}

impl AppState {
    /// Wraps a lobby handle with a fresh id allocator.
    pub fn new(lobby: LobbyHandle) -> Self {
        Self {
            lobby,
            ids: Arc::new(ConnectionIds::new()),
        }
    }
}

/// Builds the HTTP router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(GAME_PATH, get(upgrade))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}

async fn upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_connection(socket, state))
}

/// Pumps one WebSocket until it closes.
#[instrument(skip_all, fields(connection))]
async fn serve_connection(mut socket: WebSocket, state: AppState) {
    let connection = state.ids.allocate();
    tracing::Span::current().record("connection", tracing::field::display(connection));

    let (tx, mut rx) = mpsc::unbounded_channel();
    if let Err(e) = state.lobby.connect(connection, tx) {
        warn!(error = %e, "Lobby unavailable, dropping connection");
        return;
    }
    info!("Connection established");

    loop {
        tokio::select! {
            Some(message) = rx.recv() => {
                let json = match message.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(error = %e, "Failed to encode outbound message");
                        continue;
                    }
                };
                if socket.send(Message::Text(json.into())).await.is_err() {
                    debug!("Send failed, closing");
                    break;
                }
            }
            frame = socket.recv() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match decode_frame(text.as_str()) {
                        Ok(event) => {
                            if let Err(e) = state.lobby.dispatch(connection, event) {
                                warn!(error = %e, "Lobby unavailable");
                                break;
                            }
                        }
                        Err(e) => debug!(error = %e, "Dropping undecodable frame"),
                    },
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!(error = %e, "WebSocket error");
                        break;
                    }
                }
            }
        }
    }

    if let Err(e) = state.lobby.disconnect(connection) {
        warn!(error = %e, "Lobby unavailable during disconnect");
    }
    info!("Connection closed");
}

/// Binds, spawns the lobby and serves until `shutdown` resolves.
#[instrument(skip(shutdown), fields(addr = %config.bind_address()))]
pub async fn serve(
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let (lobby, _actor) = LobbyActor::spawn();
    let app = router(AppState::new(lobby));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(
        "Server ready at ws://{}{}",
        listener.local_addr()?,
        GAME_PATH
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}
