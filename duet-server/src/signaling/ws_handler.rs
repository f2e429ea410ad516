use crate::app::AppState;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use duet_core::{ParticipantId, SignalMessage};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let participant_id = ParticipantId::new();
    info!("New WebSocket connection: {}", participant_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(participant_id, tx);
    state
        .signaling
        .send_signal(participant_id, SignalMessage::Welcome { participant_id });
    state.signaling.send_signal(
        participant_id,
        SignalMessage::IceConfig {
            ice_servers: state.signaling.get_ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                        Ok(signal) => dispatch_signal(&state, participant_id, signal).await,
                        Err(e) => warn!("Invalid SignalMessage from {}: {:?}", participant_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // A dropped channel counts as leaving; a second leave is a no-op.
    state.coordinator.leave(&participant_id).await;
    state.signaling.remove_peer(&participant_id);
    info!("WebSocket disconnected: {}", participant_id);
}

/// Routes one inbound frame to the coordinator.
pub(crate) async fn dispatch_signal(
    state: &AppState,
    participant_id: ParticipantId,
    signal: SignalMessage,
) {
    match signal {
        SignalMessage::Join { name } => {
            let name = name.trim();
            if name.is_empty() {
                warn!("{} tried to join without a name", participant_id);
                return;
            }
            state.coordinator.join(participant_id, name).await;
        }

        SignalMessage::Leave => state.coordinator.leave(&participant_id).await,

        signal @ (SignalMessage::Offer { .. }
        | SignalMessage::Answer { .. }
        | SignalMessage::AddIceCandidate { .. }) => {
            if let Some(room_id) = signal.room_id() {
                state.coordinator.relay(room_id, participant_id, signal).await;
            }
        }

        other => warn!("Unexpected '{}' from {}", other.op(), participant_id),
    }
}
