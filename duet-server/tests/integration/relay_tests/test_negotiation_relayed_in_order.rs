use duet_core::{IceCandidate, ParticipantId, Role, SignalMessage};

use crate::integration::{create_test_coordinator, init_tracing};
use crate::utils::{answer, offer};

#[tokio::test]
async fn test_offer_and_answer_reach_the_other_member() {
    init_tracing();
    let (coordinator, _signaling, mut inbox) = create_test_coordinator();
    let alice = ParticipantId::new();
    let bob = ParticipantId::new();

    coordinator.join(alice, "alice").await;
    coordinator.join(bob, "bob").await;
    inbox.expect_lobby(&alice).await.unwrap();
    let room_id = inbox.expect_send_offer(&alice).await.unwrap();
    inbox.expect_await_offer(&bob).await.unwrap();

    coordinator.relay(room_id, alice, offer(room_id, "offer-sdp")).await;
    assert_eq!(inbox.next_for(&bob).await.unwrap(), offer(room_id, "offer-sdp"));

    coordinator.relay(room_id, bob, answer(room_id, "answer-sdp")).await;
    assert_eq!(inbox.next_for(&alice).await.unwrap(), answer(room_id, "answer-sdp"));
}

#[tokio::test]
async fn test_candidates_keep_sender_order() {
    init_tracing();
    let (coordinator, _signaling, mut inbox) = create_test_coordinator();
    let alice = ParticipantId::new();
    let bob = ParticipantId::new();

    coordinator.join(alice, "alice").await;
    coordinator.join(bob, "bob").await;
    inbox.expect_lobby(&alice).await.unwrap();
    let room_id = inbox.expect_send_offer(&alice).await.unwrap();
    inbox.expect_await_offer(&bob).await.unwrap();

    for n in 0..10 {
        let msg = SignalMessage::AddIceCandidate {
            room_id,
            candidate: IceCandidate::new(format!("candidate:{n} 1 udp 1 10.0.0.1 {n} typ host")),
            role: Role::Offerer,
        };
        coordinator.relay(room_id, alice, msg).await;
    }

    for n in 0..10 {
        match inbox.next_for(&bob).await.unwrap() {
            SignalMessage::AddIceCandidate { candidate, role, .. } => {
                assert!(candidate.candidate.starts_with(&format!("candidate:{n} ")));
                assert_eq!(role, Role::Offerer);
            }
            other => panic!("Expected add-ice-candidate, got {:?}", other),
        }
    }
}
