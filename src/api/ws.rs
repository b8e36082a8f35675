//! WebSocket handler for the streaming translation endpoint
//!
//! One connection = one session. The socket task owns its
//! [`SessionStateMachine`] and feeds it events strictly one at a time, so a
//! frame and a control message can never interleave - the transport loop is
//! the serialization point the session protocol requires.
//!
//! ## Protocol
//!
//! Clients connect to `/handsup/ws/translate`, send a JSON `start` message,
//! then stream binary frame payloads. The server answers with status
//! updates (`collecting`/`processing`/`ready`), per-mode results, and
//! `{"error": ...}` messages. See `types::protocol` for the exact shapes.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures::stream::StreamExt;
use futures::SinkExt;
use tracing::{debug, info, warn};

use super::handlers::ApiState;
use crate::config;
use crate::session::SessionStateMachine;
use crate::types::{parse_control, ServerMessage};

/// WebSocket upgrade for the translation stream.
pub async fn ws_handler(State(state): State<ApiState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one session over an established socket.
async fn handle_socket(socket: WebSocket, state: ApiState) {
    {
        let mut app = state.app_state.write().await;
        app.sessions_opened += 1;
        app.sessions_active += 1;
    }
    info!("Translation session connected");

    let cfg = config::get();
    let mut session = SessionStateMachine::new(
        state.registry.clone(),
        state.extractor.clone(),
        cfg.session.clone(),
        cfg.thresholds.clone(),
    );

    let (mut sender, mut receiver) = socket.split();

    while let Some(Ok(msg)) = receiver.next().await {
        let replies = match msg {
            Message::Text(text) => match parse_control(&text) {
                Ok(control) => session.on_control(control).await,
                Err(e) => {
                    debug!(error = %e, "Unparseable control message");
                    vec![ServerMessage::error(format!("invalid control message: {e}"))]
                }
            },
            Message::Binary(payload) => {
                {
                    let mut app = state.app_state.write().await;
                    app.frames_received += 1;
                }
                session.on_frame(&payload).await
            }
            Message::Close(_) => {
                debug!("Client closed translation socket");
                session.on_disconnect();
                break;
            }
            // Pings are answered by axum; pongs need no action.
            Message::Ping(_) | Message::Pong(_) => Vec::new(),
        };

        record_replies(&state, &replies).await;

        let mut send_failed = false;
        for reply in &replies {
            if sender.send(Message::Text(reply.to_json())).await.is_err() {
                send_failed = true;
                break;
            }
        }
        if send_failed {
            warn!("Send failed - closing translation session");
            session.on_disconnect();
            break;
        }

        if session.is_stopped() {
            let _ = sender.send(Message::Close(None)).await;
            break;
        }
    }

    session.on_disconnect();
    {
        let mut app = state.app_state.write().await;
        app.sessions_active = app.sessions_active.saturating_sub(1);
    }
    info!(
        frames = session.frames_ingested(),
        discarded = session.frames_discarded(),
        results = session.results_emitted(),
        "Translation session closed"
    );
}

/// Fold emitted results and errors into the server-wide counters.
async fn record_replies(state: &ApiState, replies: &[ServerMessage]) {
    let mut results: u64 = 0;
    let mut errors: u64 = 0;
    for reply in replies {
        match reply {
            ServerMessage::AlphaNumeric { letter, number, .. } => {
                if !letter.is_empty() || !number.is_empty() {
                    results += 1;
                }
            }
            ServerMessage::Word { word, .. } => {
                if !word.is_empty() {
                    results += 1;
                }
            }
            ServerMessage::Error { .. } => errors += 1,
            ServerMessage::Status { .. } => {}
        }
    }
    if results == 0 && errors == 0 {
        return;
    }

    let mut app = state.app_state.write().await;
    app.results_emitted += results;
    app.errors_reported += errors;
    if results > 0 {
        app.last_result_time = Some(chrono::Utc::now());
    }
}
