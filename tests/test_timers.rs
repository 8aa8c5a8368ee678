use vertical_shooter::entities::{EntityTag, Handle};
use vertical_shooter::timers::*;

fn handle(index: u32, generation: u32) -> Owner {
    Owner::Entity(Handle {
        tag: EntityTag::EnemyLarge,
        index,
        generation,
    })
}

#[test]
fn due_entries_come_out_in_schedule_order() {
    let mut queue = DeferredQueue::default();
    queue.schedule(Owner::Player, 1.0, DeferredAction::RespawnPlayer);
    queue.schedule(handle(0, 1), 0.5, DeferredAction::RevertFlash);
    queue.schedule(handle(1, 1), 1.0, DeferredAction::ReleaseExplosion);

    let mut due = Vec::new();
    queue.advance(0.5, &mut due);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].action, DeferredAction::RevertFlash);

    due.clear();
    queue.advance(0.5, &mut due);
    let actions: Vec<DeferredAction> = due.iter().map(|d| d.action).collect();
    assert_eq!(
        actions,
        vec![DeferredAction::RespawnPlayer, DeferredAction::ReleaseExplosion]
    );
    assert!(queue.is_empty());
}

#[test]
fn cancel_owner_only_touches_that_generation() {
    let mut queue = DeferredQueue::with_capacity(4);
    queue.schedule(handle(0, 1), 1.0, DeferredAction::RevertFlash);
    queue.schedule(handle(0, 2), 1.0, DeferredAction::RevertFlash);
    queue.schedule(Owner::Player, 1.0, DeferredAction::CloseBoomWindow);

    assert_eq!(queue.cancel_owner(handle(0, 1)), 1);
    assert!(!queue.is_pending(handle(0, 1), DeferredAction::RevertFlash));
    assert!(queue.is_pending(handle(0, 2), DeferredAction::RevertFlash));
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.cancel_owner(handle(0, 1)), 0);
}

#[test]
fn cancel_single_action() {
    let mut queue = DeferredQueue::default();
    queue.schedule(Owner::Player, 2.0, DeferredAction::RespawnPlayer);
    queue.schedule(Owner::Player, 4.0, DeferredAction::CloseBoomWindow);

    queue.cancel(Owner::Player, DeferredAction::RespawnPlayer);
    assert!(!queue.is_pending(Owner::Player, DeferredAction::RespawnPlayer));
    assert!(queue.is_pending(Owner::Player, DeferredAction::CloseBoomWindow));

    queue.clear();
    assert!(queue.is_empty());
}
