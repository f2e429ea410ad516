use duet_client::{AgentEvent, MediaPresence};
use duet_core::{ParticipantId, Role, RoomId, SdpKind, SignalMessage};
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{AgentHarness, MockBehavior, MockTransportFactory, TransportCall};

#[tokio::test]
async fn test_welcome_joins_with_display_name() {
    init_tracing();
    let factory = MockTransportFactory::new(MockBehavior::new("offerer"));
    let mut agent = AgentHarness::spawn(factory, Duration::from_secs(5));
    let participant_id = ParticipantId::new();

    agent.deliver(SignalMessage::Welcome { participant_id });
    assert_eq!(
        agent.next_event().await.unwrap(),
        AgentEvent::Welcome { participant_id }
    );
    assert_eq!(
        agent.next_outbound("join").await.unwrap(),
        SignalMessage::Join {
            name: "tester".into()
        }
    );

    agent.deliver(SignalMessage::Lobby);
    assert_eq!(agent.next_event().await.unwrap(), AgentEvent::Waiting);
}

#[tokio::test]
async fn test_offerer_negotiates_once() {
    init_tracing();
    let factory = MockTransportFactory::new(MockBehavior::new("offerer"));
    let mut agent = AgentHarness::spawn(factory.clone(), Duration::from_secs(5));
    let room_id = RoomId::new();

    agent.deliver(SignalMessage::SendOffer { room_id });
    assert_eq!(
        agent.next_event().await.unwrap(),
        AgentEvent::Paired {
            room_id,
            role: Role::Offerer
        }
    );

    let SignalMessage::Offer {
        room_id: offer_room,
        ..
    } = agent.next_outbound("offer").await.unwrap()
    else {
        panic!("expected an offer");
    };
    assert_eq!(offer_room, room_id);

    let SignalMessage::AddIceCandidate { role, .. } =
        agent.next_outbound("add-ice-candidate").await.unwrap()
    else {
        panic!("expected a candidate");
    };
    assert_eq!(role, Role::Offerer);

    agent.deliver(SignalMessage::Answer {
        room_id,
        sdp: "v=0 answer".into(),
    });
    assert_eq!(
        agent.next_event().await.unwrap(),
        AgentEvent::Connected {
            room_id,
            media: MediaPresence {
                audio: true,
                video: true
            }
        }
    );

    agent.handle.leave().await.unwrap();
    assert_eq!(agent.next_event().await.unwrap(), AgentEvent::Left);
    assert_eq!(
        agent.next_outbound("leave").await.unwrap(),
        SignalMessage::Leave
    );

    assert_eq!(
        factory.calls(),
        vec![
            TransportCall::Create(SdpKind::Offer),
            TransportCall::SetLocal(SdpKind::Offer),
            TransportCall::SetRemote(SdpKind::Answer),
            TransportCall::Close,
        ]
    );
}
