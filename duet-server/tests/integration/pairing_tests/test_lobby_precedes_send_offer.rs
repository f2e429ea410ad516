use duet_core::{ParticipantId, Role, SignalMessage};

use crate::integration::{create_test_coordinator, init_tracing};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_lobby_precedes_send_offer() {
    init_tracing();

    for _ in 0..200 {
        let (coordinator, signaling, mut inbox) = create_test_coordinator();
        let alice = ParticipantId::new();
        let bob = ParticipantId::new();

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.join(alice, "alice").await }
        });
        let second = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.join(bob, "bob").await }
        });
        first.await.unwrap();
        second.await.unwrap();

        let (offerer, answerer) = match coordinator.assignment(&alice) {
            Some(seat) if seat.role == Role::Offerer => (alice, bob),
            Some(_) => (bob, alice),
            None => panic!("both joins should have been paired"),
        };

        // Whoever waited hears lobby first, then its role.
        inbox.expect_lobby(&offerer).await.unwrap();
        let room_id = inbox.expect_send_offer(&offerer).await.unwrap();
        inbox.expect_await_offer(&answerer).await.unwrap();

        assert_eq!(
            signaling.signals_for(&offerer).await,
            vec![SignalMessage::Lobby, SignalMessage::SendOffer { room_id }]
        );
        assert_eq!(signaling.count_for(&answerer, "lobby").await, 0);
    }
}
