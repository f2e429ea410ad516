use duet_client::AgentEvent;
use duet_core::{IceCandidate, Role, RoomId, SdpKind, SignalMessage};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{AgentHarness, MockBehavior, MockTransportFactory, TransportCall};

fn remote_candidate(room_id: RoomId, n: u32) -> SignalMessage {
    SignalMessage::AddIceCandidate {
        room_id,
        candidate: IceCandidate::new(format!("candidate:{n} 1 udp 1 192.0.2.{n} 5000 typ host")),
        role: Role::Offerer,
    }
}

fn applied(n: u32) -> TransportCall {
    TransportCall::AddCandidate(format!("candidate:{n} 1 udp 1 192.0.2.{n} 5000 typ host"))
}

#[tokio::test]
async fn test_candidates_before_offer_apply_in_order() {
    init_tracing();
    let factory = MockTransportFactory::new(MockBehavior::new("answerer"));
    let mut agent = AgentHarness::spawn(factory.clone(), Duration::from_secs(5));
    let room_id = RoomId::new();

    agent.deliver(SignalMessage::AwaitOffer { room_id });
    assert!(matches!(
        agent.next_event().await.unwrap(),
        AgentEvent::Paired { .. }
    ));

    for n in 1..=3 {
        agent.deliver(remote_candidate(room_id, n));
    }
    agent.deliver(SignalMessage::Offer {
        room_id,
        sdp: "v=0 offer".into(),
    });
    assert!(matches!(
        agent.next_event().await.unwrap(),
        AgentEvent::Connected { .. }
    ));

    // Once the buffer is drained, later candidates go straight through.
    agent.deliver(remote_candidate(room_id, 4));
    agent.deliver(SignalMessage::Lobby);
    assert_eq!(
        agent.next_event().await.unwrap(),
        AgentEvent::PeerLeft { room_id }
    );

    assert_eq!(
        factory.calls(),
        vec![
            TransportCall::SetRemote(SdpKind::Offer),
            applied(1),
            applied(2),
            applied(3),
            TransportCall::Create(SdpKind::Answer),
            TransportCall::SetLocal(SdpKind::Answer),
            applied(4),
            TransportCall::Close,
        ]
    );
}
