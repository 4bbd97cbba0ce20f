//! Per-connection handler: decode, dispatch, and outbound pumping.
//!
//! Each connection runs two tasks. The reader (this function) decodes
//! client messages and dispatches them into the rooms directory; a
//! writer task drains the connection's outbound channel into the socket,
//! so a room broadcasting a snapshot never waits on this client's I/O.

use std::sync::Arc;

use quizwire_protocol::{decode_client, encode_server, ServerMessage};
use quizwire_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;

pub(crate) async fn handle_connection(conn: WebSocketConnection, state: Arc<ServerState>) {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let conn = Arc::new(conn);
    let (tx, rx) = mpsc::unbounded_channel::<ServerMessage>();
    let writer = tokio::spawn(write_outbound(Arc::clone(&conn), rx));

    loop {
        let text = match conn.recv().await {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let msg = match decode_client(&text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "undecodable message");
                let _ = tx.send(ServerMessage::Error {
                    message: e.to_string(),
                });
                continue;
            }
        };

        // Lock only for the dispatch; rooms do their own work in their
        // actor tasks.
        let result = state
            .rooms
            .lock()
            .await
            .dispatch(conn_id, tx.clone(), msg)
            .await;
        if let Err(e) = result {
            tracing::debug!(%conn_id, error = %e, "dispatch rejected");
            let _ = tx.send(ServerMessage::Error {
                message: e.to_string(),
            });
        }
    }

    state.rooms.lock().await.on_disconnect(conn_id).await;

    // The room dropped its sender during disconnect and ours goes out of
    // scope here, so the writer drains and exits on its own.
    drop(tx);
    let _ = writer.await;
}

/// Drains the outbound channel into the socket until every sender is
/// gone or the socket dies.
async fn write_outbound(
    conn: Arc<WebSocketConnection>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
) {
    while let Some(msg) = rx.recv().await {
        let text = match encode_server(&msg) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(id = %conn.id(), error = %e, "encode failed");
                continue;
            }
        };
        if conn.send(&text).await.is_err() {
            break;
        }
    }
}
