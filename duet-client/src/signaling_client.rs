use crate::agent::{AgentEvent, AgentHandle, ParticipantAgent};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::TransportFactory;
use duet_core::SignalMessage;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{error, info, warn};

/// A participant connected to the signaling server.
pub struct AgentConnection {
    pub handle: AgentHandle,
    pub events: mpsc::UnboundedReceiver<AgentEvent>,
    /// Finishes when the agent stops.
    pub task: JoinHandle<()>,
}

/// Opens the signaling WebSocket and runs a [`ParticipantAgent`] on it. The
/// agent joins the pool as soon as the server says `welcome`.
pub async fn connect<F>(config: ClientConfig, factory: F) -> Result<AgentConnection, ClientError>
where
    F: TransportFactory + 'static,
{
    let (ws, _) = tokio_tungstenite::connect_async(config.server_url.as_str()).await?;
    info!("Connected to {}", config.server_url);

    let (mut sink, mut stream) = ws.split();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<SignalMessage>();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (handle, command_rx) = AgentHandle::new(16);

    tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize signal message: {}", e);
                    continue;
                }
            };
            if let Err(e) = sink.send(Message::Text(json.into())).await {
                warn!("Signaling write failed: {}", e);
                break;
            }
        }
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        while let Some(frame) = stream.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str::<SignalMessage>(&text) {
                    Ok(signal) => {
                        if inbound_tx.send(signal).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Invalid SignalMessage from server: {:?}", e),
                },
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("Signaling read failed: {}", e);
                    break;
                }
            }
        }
    });

    let agent = ParticipantAgent::new(config, factory, outbound_tx, event_tx);
    let task = tokio::spawn(agent.run(inbound_rx, command_rx));

    Ok(AgentConnection {
        handle,
        events: event_rx,
        task,
    })
}
