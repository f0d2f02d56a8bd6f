//! Single-writer task that owns the [`Lobby`].
//!
//! Every connection task talks to the lobby through a [`LobbyHandle`].
//! Commands queue on one channel and the actor applies them one at a
//! time, so a move and a disconnect from the same connection can never
//! interleave.

use crate::{ConnectionId, InboundEvent, Lobby, Outbox, ServerError, ServerMessage};
use std::collections::HashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Channel the actor uses to reach one connection.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Work queued for the lobby.
#[derive(Debug)]
pub enum LobbyCommand {
    /// A transport connection was established.
    Connect {
        /// New connection.
        connection: ConnectionId,
        /// Where to deliver its messages.
        outbound: OutboundSender,
    },
    /// A decoded client event arrived.
    Inbound {
        /// Sender.
        connection: ConnectionId,
        /// Event.
        event: InboundEvent,
    },
    /// A transport connection closed.
    Disconnect {
        /// Closed connection.
        connection: ConnectionId,
    },
}

/// Cloneable sender side of the lobby queue.
#[derive(Debug, Clone)]
pub struct LobbyHandle {
    commands: mpsc::UnboundedSender<LobbyCommand>,
}

impl LobbyHandle {
    /// Registers a connection's outbound channel.
    pub fn connect(
        &self,
        connection: ConnectionId,
        outbound: OutboundSender,
    ) -> Result<(), ServerError> {
        self.send(LobbyCommand::Connect {
            connection,
            outbound,
        })
    }

    /// Forwards a client event.
    pub fn dispatch(&self, connection: ConnectionId, event: InboundEvent) -> Result<(), ServerError> {
        self.send(LobbyCommand::Inbound { connection, event })
    }

    /// Reports a closed connection.
    pub fn disconnect(&self, connection: ConnectionId) -> Result<(), ServerError> {
        self.send(LobbyCommand::Disconnect { connection })
    }

    fn send(&self, command: LobbyCommand) -> Result<(), ServerError> {
        self.commands
            .send(command)
            .map_err(|_| ServerError::new("Lobby actor has stopped"))
    }
}

/// Owns the lobby and the outbound channel of every connection.
#[derive(Debug)]
pub struct LobbyActor {
    lobby: Lobby,
    connections: HashMap<ConnectionId, OutboundSender>,
    commands: mpsc::UnboundedReceiver<LobbyCommand>,
}

impl LobbyActor {
    /// Creates an actor around `lobby` and the handle that feeds it.
    pub fn new(lobby: Lobby) -> (Self, LobbyHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = Self {
            lobby,
            connections: HashMap::new(),
            commands: rx,
        };
        (actor, LobbyHandle { commands: tx })
    }

    /// Spawns a fresh lobby on the current runtime.
    ///
    /// The task ends, yielding the lobby, once every handle is dropped.
    pub fn spawn() -> (LobbyHandle, JoinHandle<Lobby>) {
        let (actor, handle) = Self::new(Lobby::new());
        (handle, tokio::spawn(actor.run()))
    }

    /// Processes commands until every handle is dropped.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> Lobby {
        info!("Lobby actor started");
        while let Some(command) = self.commands.recv().await {
            self.apply(command);
        }
        info!("All lobby handles dropped, actor stopping");
        self.lobby
    }

    fn apply(&mut self, command: LobbyCommand) {
        match command {
            LobbyCommand::Connect {
                connection,
                outbound,
            } => {
                debug!(%connection, "Connection opened");
                self.connections.insert(connection, outbound);
            }
            LobbyCommand::Inbound { connection, event } => {
                let out = self.lobby.handle(connection, event);
                self.deliver(out);
            }
            LobbyCommand::Disconnect { connection } => {
                debug!(%connection, "Connection closed");
                self.connections.remove(&connection);
                let out = self.lobby.leave(connection);
                self.deliver(out);
            }
        }
    }

    fn deliver(&self, out: Outbox) {
        for envelope in out {
            let (to, message) = envelope.dissolve();
            match self.connections.get(&to) {
                Some(sender) => {
                    if sender.send(message).is_err() {
                        debug!(%to, "Connection gone before delivery");
                    }
                }
                None => warn!(%to, "No outbound channel for recipient"),
            }
        }
    }
}
