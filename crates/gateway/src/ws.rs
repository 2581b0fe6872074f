use crate::state::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::IntoResponse,
};
use inference::InferenceClient;
use scanner::ScanSnapshot;
use tokio::sync::watch;

pub async fn ws_handler<C: InferenceClient>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<C>>,
) -> impl IntoResponse {
    let rx = state.scanner.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

/// Push the current snapshot, then one JSON message per state change.
async fn handle_socket(mut socket: WebSocket, mut rx: watch::Receiver<ScanSnapshot>) {
    tracing::info!("New WebSocket connection established");

    'session: loop {
        let json = {
            let snapshot = rx.borrow_and_update();
            serde_json::to_string(&*snapshot)
        };

        match json {
            Ok(text) => {
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            Err(e) => tracing::error!(error = %e, "Snapshot serialization failed"),
        }

        // Incoming messages are ignored; they only tell us the peer is alive.
        loop {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break 'session;
                    }
                    break;
                }
                incoming = socket.recv() => match incoming {
                    None | Some(Err(_)) | Some(Ok(Message::Close(_))) => break 'session,
                    Some(Ok(_)) => {}
                },
            }
        }
    }

    tracing::info!("WebSocket client disconnected");
}
