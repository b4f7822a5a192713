//! WebSocket upgrade and session handling

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::game::{Outbound, PlayerCommand, SessionMsg};
use crate::util::rate_limit::SessionRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg, SessionId};

/// WebSocket upgrade handler. Each connection gets a server-assigned
/// session id; the client never supplies one.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let session = Uuid::new_v4();
    info!(session = %session, "WebSocket upgrade");
    ws.on_upgrade(move |socket| handle_socket(socket, session, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, session: SessionId, state: AppState) {
    state.sessions.insert(session);

    let command_tx = state.world.command_tx.clone();
    let outbound_rx = state.world.subscribe();
    run_session(session, socket, command_tx, outbound_rx).await;

    state.sessions.remove(session);
    info!(session = %session, "WebSocket connection closed");
}

/// Run the WebSocket session with read/write split
async fn run_session(
    session: SessionId,
    socket: WebSocket,
    command_tx: mpsc::Sender<PlayerCommand>,
    mut outbound_rx: broadcast::Receiver<Outbound>,
) {
    let (mut ws_sink, mut ws_stream) = socket.split();
    let rate_limiter = SessionRateLimiter::new();

    // Writer task: routed world messages -> WebSocket
    let writer_session = session;
    let writer_handle = tokio::spawn(async move {
        loop {
            match outbound_rx.recv().await {
                Ok(outbound) => {
                    let msg = match outbound {
                        Outbound::Broadcast(msg) => Some(msg),
                        Outbound::To(id, msg) => (id == writer_session).then_some(msg),
                        Outbound::Except(id, msg) => (id != writer_session).then_some(msg),
                        Outbound::Disconnect(id) => {
                            if id == writer_session {
                                debug!(session = %writer_session, "server closed the session");
                                let _ = ws_sink.send(Message::Close(None)).await;
                                break;
                            }
                            None
                        }
                    };

                    if let Some(msg) = msg {
                        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                            debug!(session = %writer_session, error = %e, "WebSocket send failed");
                            break;
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Slow clients lose messages rather than stalling the world.
                    warn!(
                        session = %writer_session,
                        lagged_count = n,
                        "client lagged, dropped {} messages", n
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(session = %writer_session, "outbound channel closed");
                    break;
                }
            }
        }
    });

    // Reader loop: WebSocket -> world task
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_intent() {
                    warn!(session = %session, "rate limited client message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(msg) => {
                        let command = PlayerCommand {
                            session_id: session,
                            msg: SessionMsg::Client(msg),
                        };
                        if command_tx.send(command).await.is_err() {
                            debug!(session = %session, "command channel closed");
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(session = %session, error = %e, "unparseable client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(session = %session, "binary message ignored");
            }
            Ok(Message::Ping(_)) => {
                debug!(session = %session, "ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(session = %session, "pong");
            }
            Ok(Message::Close(_)) => {
                info!(session = %session, "client closed the connection");
                break;
            }
            Err(e) => {
                error!(session = %session, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Tell the simulation the session is gone. Harmless if the player never
    // joined or was already evicted.
    let _ = command_tx
        .send(PlayerCommand {
            session_id: session,
            msg: SessionMsg::Disconnected,
        })
        .await;

    writer_handle.abort();
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
