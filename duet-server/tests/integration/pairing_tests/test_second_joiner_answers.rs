use duet_core::{ParticipantId, Role};
use duet_server::JoinOutcome;

use crate::integration::{create_test_coordinator, init_tracing};

#[tokio::test]
async fn test_second_joiner_answers() {
    init_tracing();
    let (coordinator, _signaling, mut inbox) = create_test_coordinator();
    let alice = ParticipantId::new();
    let bob = ParticipantId::new();

    coordinator.join(alice, "alice").await;
    let JoinOutcome::Paired(bob_seat) = coordinator.join(bob, "bob").await else {
        panic!("second joiner should be paired");
    };

    assert_eq!(bob_seat.role, Role::Answerer);
    assert_eq!(bob_seat.peer, alice);

    let alice_seat = coordinator.assignment(&alice).expect("alice is paired");
    assert_eq!(alice_seat.role, Role::Offerer);
    assert_eq!(alice_seat.room_id, bob_seat.room_id);
    assert!(!coordinator.is_waiting(&alice).await);

    // The waiting participant is the one told to make the offer.
    inbox.expect_lobby(&alice).await.unwrap();
    let offer_room = inbox.expect_send_offer(&alice).await.unwrap();
    let await_room = inbox.expect_await_offer(&bob).await.unwrap();
    assert_eq!(offer_room, bob_seat.room_id);
    assert_eq!(await_room, bob_seat.room_id);
}
