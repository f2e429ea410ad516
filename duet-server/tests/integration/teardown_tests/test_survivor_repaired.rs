use duet_core::{ParticipantId, Role, SignalMessage};
use duet_server::JoinOutcome;

use crate::integration::{create_test_coordinator, init_tracing};

#[tokio::test]
async fn test_survivor_offers_to_next_arrival() {
    init_tracing();
    let (coordinator, signaling, mut inbox) = create_test_coordinator();
    let alice = ParticipantId::new();
    let bob = ParticipantId::new();
    let carol = ParticipantId::new();

    coordinator.join(alice, "alice").await;
    coordinator.join(bob, "bob").await;
    inbox.expect_lobby(&alice).await.unwrap();
    let first_room = inbox.expect_send_offer(&alice).await.unwrap();

    // The offerer leaves; the answerer waits and offers next time.
    coordinator.leave(&alice).await;
    inbox.expect_await_offer(&bob).await.unwrap();
    assert_eq!(inbox.next_for(&bob).await.unwrap(), SignalMessage::Lobby);

    let JoinOutcome::Paired(carol_seat) = coordinator.join(carol, "carol").await else {
        panic!("carol should pair with bob");
    };
    assert_eq!(carol_seat.peer, bob);
    assert_eq!(carol_seat.role, Role::Answerer);
    assert_ne!(carol_seat.room_id, first_room);

    let second_room = inbox.expect_send_offer(&bob).await.unwrap();
    assert_eq!(second_room, carol_seat.room_id);

    // Re-pooling does not repeat the lobby the closing room already sent.
    assert_eq!(signaling.count_for(&bob, "lobby").await, 1);
    assert_eq!(signaling.count_for(&carol, "lobby").await, 0);
}

#[tokio::test]
async fn test_survivor_pairs_with_waiting_participant() {
    init_tracing();
    let (coordinator, signaling, mut inbox) = create_test_coordinator();
    let alice = ParticipantId::new();
    let bob = ParticipantId::new();
    let carol = ParticipantId::new();

    coordinator.join(alice, "alice").await;
    coordinator.join(bob, "bob").await;
    coordinator.join(carol, "carol").await;
    inbox.expect_lobby(&alice).await.unwrap();
    inbox.expect_send_offer(&alice).await.unwrap();
    inbox.expect_await_offer(&bob).await.unwrap();

    coordinator.leave(&bob).await;

    // Carol waited longest, so she offers to alice.
    let alice_seat = coordinator.assignment(&alice).expect("alice re-paired");
    assert_eq!(alice_seat.peer, carol);
    assert_eq!(alice_seat.role, Role::Answerer);

    assert_eq!(inbox.next_for(&alice).await.unwrap(), SignalMessage::Lobby);
    assert_eq!(inbox.expect_await_offer(&alice).await.unwrap(), alice_seat.room_id);
    inbox.expect_lobby(&carol).await.unwrap();
    assert_eq!(inbox.expect_send_offer(&carol).await.unwrap(), alice_seat.room_id);
    assert_eq!(signaling.count_for(&alice, "lobby").await, 2);
    assert_eq!(signaling.count_for(&carol, "lobby").await, 1);
}
