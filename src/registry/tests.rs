use super::*;
use crate::types::TouchPoint;

const A: RecognizerId = RecognizerId(1);
const B: RecognizerId = RecognizerId(2);

fn frame(t_ms: u64, points: &[TouchPoint]) -> TouchSnapshot {
    let mut snapshot = TouchSnapshot::new(t_ms);
    for point in points {
        snapshot.push(*point);
    }
    snapshot
}

fn messages_for(deliveries: &[Delivery], recipient: RecognizerId) -> Vec<&SwipeMessage> {
    deliveries
        .iter()
        .filter(|delivery| delivery.recipient == recipient)
        .map(|delivery| &delivery.message)
        .collect()
}

#[test]
fn first_requesting_candidate_wins_and_others_lose() {
    let registry = TouchRegistry::new();
    registry.add_candidate_owner_for_touch(7, A);
    registry.add_candidate_owner_for_touch(7, B);
    assert!(registry.take_ownership_events().is_empty());

    registry.request_touch_ownership(7, A);
    assert_eq!(registry.owner_of(7), Some(A));
    assert_eq!(
        registry.take_ownership_events(),
        vec![
            Delivery {
                recipient: A,
                message: SwipeMessage::OwnershipGained(7),
            },
            Delivery {
                recipient: B,
                message: SwipeMessage::OwnershipLost(7),
            },
        ]
    );
    assert_eq!(registry.candidates_of(7), vec![A]);
}

#[test]
fn later_candidate_request_waits_for_earlier_candidates() {
    let registry = TouchRegistry::new();
    registry.add_candidate_owner_for_touch(3, A);
    registry.add_candidate_owner_for_touch(3, B);

    registry.request_touch_ownership(3, B);
    assert_eq!(registry.owner_of(3), None);
    assert!(registry.take_ownership_events().is_empty());

    registry.remove_candidate_owner_for_touch(3, A);
    assert_eq!(registry.owner_of(3), Some(B));
    assert_eq!(
        registry.take_ownership_events(),
        vec![Delivery {
            recipient: B,
            message: SwipeMessage::OwnershipGained(3),
        }]
    );
}

#[test]
fn request_without_candidacy_appends_requester() {
    let registry = TouchRegistry::new();
    registry.request_touch_ownership(4, A);
    assert_eq!(registry.owner_of(4), Some(A));

    registry.add_candidate_owner_for_touch(4, B);
    let events = registry.take_ownership_events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        Delivery {
            recipient: B,
            message: SwipeMessage::OwnershipLost(4),
        }
    );
    assert_eq!(registry.candidates_of(4), vec![A]);
}

#[test]
fn fresh_press_goes_direct_to_every_hit_recipient() {
    let registry = TouchRegistry::new();
    let press = frame(0, &[TouchPoint::at(1, 5.0, 5.0, TouchPointState::Pressed)]);

    let deliveries = registry.route(&press, &[A, B]);
    assert_eq!(deliveries.len(), 2);
    for recipient in [A, B] {
        assert_eq!(
            messages_for(&deliveries, recipient),
            vec![&SwipeMessage::Sample(press.clone())]
        );
    }
}

#[test]
fn candidates_follow_the_touch_as_unowned_samples() {
    let registry = TouchRegistry::new();
    registry.add_candidate_owner_for_touch(1, A);
    registry.add_touch_watcher(1, B);

    let moved = frame(16, &[TouchPoint::at(1, 9.0, 5.0, TouchPointState::Moved)]);
    // A left the hit list; it still hears about its candidate touch.
    let deliveries = registry.route(&moved, &[]);
    assert_eq!(
        messages_for(&deliveries, A),
        vec![&SwipeMessage::UnownedSample(moved.clone())]
    );
    assert_eq!(
        messages_for(&deliveries, B),
        vec![&SwipeMessage::UnownedSample(moved.clone())]
    );
}

#[test]
fn owner_gets_direct_samples_and_watchers_keep_unowned_ones() {
    let registry = TouchRegistry::new();
    registry.request_touch_ownership(1, A);
    registry.add_touch_watcher(1, B);
    registry.take_ownership_events();

    let moved = frame(
        32,
        &[
            TouchPoint::at(1, 30.0, 5.0, TouchPointState::Moved),
            TouchPoint::at(2, 50.0, 50.0, TouchPointState::Moved),
        ],
    );
    let deliveries = registry.route(&moved, &[A, B]);

    let owned = moved.filtered(|point| point.id == 1);
    assert_eq!(
        messages_for(&deliveries, A),
        vec![&SwipeMessage::Sample(owned.clone())]
    );
    assert_eq!(
        messages_for(&deliveries, B),
        vec![&SwipeMessage::UnownedSample(owned)]
    );
}

#[test]
fn release_retires_the_touch_record() {
    let registry = TouchRegistry::new();
    registry.request_touch_ownership(1, A);
    registry.take_ownership_events();

    let release = frame(40, &[TouchPoint::at(1, 30.0, 5.0, TouchPointState::Released)]);
    let deliveries = registry.route(&release, &[]);
    assert_eq!(messages_for(&deliveries, A).len(), 1);
    assert!(!registry.is_tracking(1));

    registry.remove_candidate_owner_for_touch(1, A);
    assert!(!registry.is_tracking(1));
}

#[test]
fn reused_id_press_drops_stale_record() {
    let registry = TouchRegistry::new();
    registry.request_touch_ownership(5, A);
    registry.take_ownership_events();

    let press = frame(100, &[TouchPoint::at(5, 0.0, 0.0, TouchPointState::Pressed)]);
    let deliveries = registry.route(&press, &[B]);
    assert_eq!(registry.owner_of(5), None);
    assert!(messages_for(&deliveries, A).is_empty());
    assert_eq!(messages_for(&deliveries, B).len(), 1);
}

#[test]
fn uninteresting_moves_are_not_delivered() {
    let registry = TouchRegistry::new();
    let moved = frame(8, &[TouchPoint::at(9, 1.0, 1.0, TouchPointState::Moved)]);
    assert!(registry.route(&moved, &[A]).is_empty());
}
