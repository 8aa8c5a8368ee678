//! Contact resolution.
//!
//! The physics collaborator reports overlapping pairs after movement; this
//! module turns each pair into combat transitions.  Pairs are independent:
//! a pair naming an entity that an earlier pair in the same pass already
//! released simply resolves to nothing, which is what keeps one projectile
//! from striking twice and one kill from paying out twice.

use rand::Rng;
use tracing::{debug, trace, warn};

use crate::combat::HitOutcome;
use crate::compute::Simulation;
use crate::entities::{EntityTag, GameStatus, Handle};

/// One side of a contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Body {
    Entity(Handle),
    Player,
    /// The culling frame around the playfield.
    Boundary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    pub a: Body,
    pub b: Body,
}

impl Contact {
    pub fn new(a: Body, b: Body) -> Self {
        Self { a, b }
    }
}

/// Resolve every contact in order.  A contact that cannot be resolved is
/// logged and skipped; it never stops the rest of the pass.  The pass ends
/// as soon as the game is over.
pub fn resolve(sim: &mut Simulation, contacts: &[Contact], rng: &mut impl Rng) {
    for contact in contacts {
        if sim.status == GameStatus::GameOver {
            break;
        }
        resolve_one(sim, *contact, rng);
    }
}

fn resolve_one(sim: &mut Simulation, contact: Contact, rng: &mut impl Rng) {
    for body in [contact.a, contact.b] {
        if let Body::Entity(handle) = body {
            if !is_resolvable(sim, handle) {
                return;
            }
        }
    }

    match (contact.a, contact.b) {
        (Body::Entity(handle), Body::Boundary) | (Body::Boundary, Body::Entity(handle)) => {
            on_boundary(sim, handle)
        }
        (Body::Entity(x), Body::Entity(y)) => on_entity_pair(sim, x, y, rng),
        (Body::Player, Body::Entity(handle)) | (Body::Entity(handle), Body::Player) => {
            on_player_contact(sim, handle)
        }
        (a, b) => trace!(?a, ?b, "contact has no rule"),
    }
}

fn is_resolvable(sim: &Simulation, handle: Handle) -> bool {
    if !sim.pools.is_enabled(handle.tag) {
        warn!(?handle, "contact names a disabled pool, ignored");
        return false;
    }
    if !sim.pools.is_live(handle) {
        debug!(?handle, "contact names an inactive entity, ignored");
        return false;
    }
    true
}

fn on_boundary(sim: &mut Simulation, handle: Handle) {
    let tag = handle.tag;
    let culled = tag.is_projectile()
        || tag.item_kind().is_some()
        || matches!(
            tag,
            EntityTag::EnemySmall | EntityTag::EnemyMedium | EntityTag::EnemyLarge
        );
    if culled {
        sim.despawn(handle);
    }
}

fn on_entity_pair(sim: &mut Simulation, x: Handle, y: Handle, rng: &mut impl Rng) {
    let (enemy, shot) = if x.tag.enemy_kind().is_some() && y.tag.is_player_projectile() {
        (x, y)
    } else if y.tag.enemy_kind().is_some() && x.tag.is_player_projectile() {
        (y, x)
    } else {
        trace!(?x, ?y, "entity pair has no rule");
        return;
    };

    let Some(damage) = sim
        .pools
        .get(shot)
        .and_then(|entity| entity.projectile())
        .map(|projectile| projectile.damage)
    else {
        warn!(?shot, "projectile without projectile payload, ignored");
        return;
    };
    sim.damage_enemy(enemy, damage, rng);
    sim.despawn(shot);
}

fn on_player_contact(sim: &mut Simulation, handle: Handle) {
    let tag = handle.tag;
    if tag.enemy_kind().is_some() || tag.is_enemy_projectile() {
        let outcome = sim.hit_player();
        if outcome != HitOutcome::Blocked && tag != EntityTag::EnemyBoss {
            sim.despawn(handle);
        }
    } else if tag.item_kind().is_some() {
        sim.pick_up(handle);
    } else {
        trace!(?handle, "player contact has no rule");
    }
}
