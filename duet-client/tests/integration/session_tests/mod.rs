
use duet_client::{AgentConnection, AgentEvent, ClientConfig, MediaPresence, connect};
use duet_core::{Role, RoomId};

use crate::utils::{MockBehavior, MockTransportFactory, next_event};

pub const FULL_MEDIA: MediaPresence = MediaPresence {
    audio: true,
    video: true,
};

pub async fn join(url: &str, name: &str) -> (AgentConnection, MockTransportFactory) {
    let factory = MockTransportFactory::new(MockBehavior::new(name));
    let mut conn = connect(ClientConfig::new(url, name), factory.clone())
        .await
        .unwrap();

    assert!(matches!(
        next_event(&mut conn.events).await.unwrap(),
        AgentEvent::Welcome { .. }
    ));
    (conn, factory)
}

pub async fn expect_paired(conn: &mut AgentConnection, role: Role) -> RoomId {
    match next_event(&mut conn.events).await.unwrap() {
        AgentEvent::Paired { room_id, role: r } if r == role => room_id,
        other => panic!("Expected Paired as {}, got {:?}", role, other),
    }
}
