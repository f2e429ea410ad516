use duet_client::{AgentEvent, MediaKind, MediaPresence, TrackBindingTimeout};
use duet_core::{Role, RoomId, SignalMessage};
use std::time::Duration;
use tokio::time::Instant;

use crate::integration::init_tracing;
use crate::utils::{AgentHarness, MockBehavior, MockTrack, MockTransportFactory};

const WINDOW: Duration = Duration::from_secs(5);

/// Pairs an answerer and hands it the offer.
async fn answer_offer(behavior: MockBehavior) -> (AgentHarness, RoomId) {
    let mut agent = AgentHarness::spawn(MockTransportFactory::new(behavior), WINDOW);
    let room_id = RoomId::new();

    agent.deliver(SignalMessage::AwaitOffer { room_id });
    assert_eq!(
        agent.next_event().await.unwrap(),
        AgentEvent::Paired {
            room_id,
            role: Role::Answerer
        }
    );
    agent.deliver(SignalMessage::Offer {
        room_id,
        sdp: "v=0 offer".into(),
    });
    (agent, room_id)
}

#[tokio::test(start_paused = true)]
async fn test_media_reported_early_when_both_kinds_bound() {
    init_tracing();
    let start = Instant::now();
    let (mut agent, room_id) = answer_offer(MockBehavior::new("answerer")).await;

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
    assert!(start.elapsed() < WINDOW);
}

#[tokio::test(start_paused = true)]
async fn test_fallback_binds_receiving_channels() {
    init_tracing();
    let mut behavior = MockBehavior::new("answerer");
    behavior.inbound_tracks = Vec::new();
    behavior.receiving = vec![
        MockTrack::new("cam", Some(MediaKind::Video)),
        MockTrack::new("mic", None),
    ];
    let start = Instant::now();
    let (mut agent, room_id) = answer_offer(behavior).await;

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
    assert!(start.elapsed() >= WINDOW);
}

#[tokio::test(start_paused = true)]
async fn test_partial_media_after_window() {
    init_tracing();
    let mut behavior = MockBehavior::new("answerer");
    behavior.inbound_tracks = vec![MockTrack::new("mic", Some(MediaKind::Audio))];
    let start = Instant::now();
    let (mut agent, room_id) = answer_offer(behavior).await;

    assert_eq!(
        agent.next_event().await.unwrap(),
        AgentEvent::Connected {
            room_id,
            media: MediaPresence {
                audio: true,
                video: false
            }
        }
    );
    assert!(start.elapsed() >= WINDOW);
}

#[tokio::test(start_paused = true)]
async fn test_no_media_times_out() {
    init_tracing();
    let mut behavior = MockBehavior::new("answerer");
    behavior.inbound_tracks = Vec::new();
    let (mut agent, room_id) = answer_offer(behavior).await;

    assert_eq!(
        agent.next_event().await.unwrap(),
        AgentEvent::MediaTimedOut {
            room_id,
            timeout: TrackBindingTimeout { window: WINDOW }
        }
    );
}
