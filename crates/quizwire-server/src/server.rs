//! `QuizServer` accept loop.
//!
//! Ties the layers together: transport → protocol → rooms. Every
//! accepted connection gets its own handler task; all of them share one
//! [`RoomsDirectory`] behind a lock.

use std::sync::Arc;

use quizwire_room::RoomsDirectory;
use quizwire_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::ServerError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) rooms: Mutex<RoomsDirectory>,
}

/// A running quiz server. Call [`run()`](Self::run) to start accepting
/// connections.
pub struct QuizServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl QuizServer {
    /// Binds the WebSocket listener on `addr`.
    pub async fn bind(addr: &str) -> Result<Self, ServerError> {
        let transport = WebSocketTransport::bind(addr).await?;
        Ok(Self {
            transport,
            state: Arc::new(ServerState {
                rooms: Mutex::new(RoomsDirectory::new()),
            }),
        })
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(mut self) -> Result<(), ServerError> {
        tracing::info!("quiz server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        handle_connection(conn, state).await;
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
