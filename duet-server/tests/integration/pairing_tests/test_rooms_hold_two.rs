use duet_core::{ParticipantId, Role};
use duet_server::JoinOutcome;
use std::collections::HashMap;

use crate::integration::{create_test_coordinator, init_tracing};

#[tokio::test]
async fn test_third_participant_waits_instead_of_joining() {
    init_tracing();
    let (coordinator, _signaling, _inbox) = create_test_coordinator();
    let alice = ParticipantId::new();
    let bob = ParticipantId::new();
    let carol = ParticipantId::new();

    coordinator.join(alice, "alice").await;
    coordinator.join(bob, "bob").await;
    let outcome = coordinator.join(carol, "carol").await;

    assert_eq!(outcome, JoinOutcome::Waiting);
    assert!(coordinator.assignment(&carol).is_none());
    assert_eq!(coordinator.stats().await.rooms, 1);
}

#[tokio::test]
async fn test_concurrent_joins_pair_in_twos() {
    init_tracing();
    let (coordinator, _signaling, _inbox) = create_test_coordinator();
    let ids: Vec<ParticipantId> = (0..9).map(|_| ParticipantId::new()).collect();

    let handles: Vec<_> = ids
        .iter()
        .map(|id| {
            let coordinator = coordinator.clone();
            let id = *id;
            tokio::spawn(async move { coordinator.join(id, "peer").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let mut per_room: HashMap<_, Vec<Role>> = HashMap::new();
    let mut waiting = 0;
    for id in &ids {
        match coordinator.assignment(id) {
            Some(seat) => per_room.entry(seat.room_id).or_default().push(seat.role),
            None => {
                assert!(coordinator.is_waiting(id).await);
                waiting += 1;
            }
        }
    }

    assert_eq!(waiting, 1);
    assert_eq!(per_room.len(), 4);
    for roles in per_room.values() {
        assert_eq!(roles.len(), 2);
        assert!(roles.contains(&Role::Offerer));
        assert!(roles.contains(&Role::Answerer));
    }
}
