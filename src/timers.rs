//! Deferred one-shot actions.
//!
//! Each entry is a countdown plus an action tag, owned either by a pooled
//! entity (through its generational handle) or by the player.  Entries of an
//! entity are cancelled when it is released, and a due entry whose handle no
//! longer resolves is dropped by the caller, so an action never lands on a
//! slot that has been handed to a different entity.

use crate::entities::Handle;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeferredAction {
    /// Swap the hit sprite back to the normal one.
    RevertFlash,
    /// Return an explosion effect to its pool.
    ReleaseExplosion,
    /// Close the boom effect window.
    CloseBoomWindow,
    /// Bring the player back after a non-fatal hit.
    RespawnPlayer,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Entity(Handle),
    Player,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Deferred {
    pub owner: Owner,
    pub remaining: f32,
    pub action: DeferredAction,
}

#[derive(Clone, Debug, Default)]
pub struct DeferredQueue {
    pending: Vec<Deferred>,
}

impl DeferredQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
        }
    }

    pub fn schedule(&mut self, owner: Owner, delay: f32, action: DeferredAction) {
        self.pending.push(Deferred {
            owner,
            remaining: delay,
            action,
        });
    }

    /// Drop every entry of `owner`; returns how many were dropped.
    pub fn cancel_owner(&mut self, owner: Owner) -> usize {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.owner != owner);
        before - self.pending.len()
    }

    pub fn cancel(&mut self, owner: Owner, action: DeferredAction) {
        self.pending
            .retain(|entry| !(entry.owner == owner && entry.action == action));
    }

    pub fn is_pending(&self, owner: Owner, action: DeferredAction) -> bool {
        self.pending
            .iter()
            .any(|entry| entry.owner == owner && entry.action == action)
    }

    /// Count every entry down by `dt` and move the expired ones, in the
    /// order they were scheduled, into `due`.
    pub fn advance(&mut self, dt: f32, due: &mut Vec<Deferred>) {
        self.pending.retain_mut(|entry| {
            entry.remaining -= dt;
            if entry.remaining <= 0.0 {
                due.push(*entry);
                false
            } else {
                true
            }
        });
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
