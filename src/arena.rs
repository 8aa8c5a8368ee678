//! Minimal physics collaborator for the terminal build: straight-line
//! integration, circle overlap tests and a culling frame around the field.

use glam::Vec2;

use vertical_shooter::collision::{Body, Contact};
use vertical_shooter::compute::{Physics, Simulation};
use vertical_shooter::entities::EntityTag;

const PLAYER_RADIUS: f32 = 0.3;
/// How far outside the visible field an entity may drift before culling.
/// Wide enough for entities spawned just above the top edge.
const CULL_MARGIN: f32 = 1.0;

fn radius(tag: EntityTag) -> f32 {
    match tag {
        EntityTag::EnemyBoss => 1.5,
        EntityTag::EnemyLarge => 0.6,
        EntityTag::EnemyMedium => 0.4,
        EntityTag::EnemySmall => 0.3,
        EntityTag::ItemCoin | EntityTag::ItemPower | EntityTag::ItemBoom => 0.25,
        EntityTag::Explosion => 0.0,
        _ => 0.1,
    }
}

fn overlaps(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) <= (ra + rb) * (ra + rb)
}

pub struct Arena;

impl Physics for Arena {
    fn integrate(&mut self, sim: &mut Simulation, dt: f32) {
        for tag in EntityTag::ALL {
            for entity in sim.pools.iter_active_mut(tag) {
                entity.position += entity.velocity * dt;
            }
        }
    }

    fn contacts(&mut self, sim: &Simulation, out: &mut Vec<Contact>) {
        let field = &sim.config.playfield;
        let limit = Vec2::new(field.half_width, field.half_height) + CULL_MARGIN;

        for tag in EntityTag::ALL {
            if tag == EntityTag::Explosion {
                continue;
            }
            for (handle, entity) in sim.pools.iter_active(tag) {
                let p = entity.position;
                if p.x.abs() > limit.x || p.y.abs() > limit.y {
                    out.push(Contact::new(Body::Entity(handle), Body::Boundary));
                }
            }
        }

        let enemy_tags = [
            EntityTag::EnemySmall,
            EntityTag::EnemyMedium,
            EntityTag::EnemyLarge,
            EntityTag::EnemyBoss,
        ];
        let shot_tags = [
            EntityTag::BulletPlayerA,
            EntityTag::BulletPlayerB,
            EntityTag::BulletFollower,
        ];
        for enemy_tag in enemy_tags {
            for (enemy, e) in sim.pools.iter_active(enemy_tag) {
                for shot_tag in shot_tags {
                    for (shot, s) in sim.pools.iter_active(shot_tag) {
                        if overlaps(e.position, radius(enemy_tag), s.position, radius(shot_tag)) {
                            out.push(Contact::new(Body::Entity(shot), Body::Entity(enemy)));
                        }
                    }
                }
            }
        }

        if !sim.player.active {
            return;
        }
        let player = sim.player.position;
        for tag in EntityTag::ALL {
            let touches_player = tag.enemy_kind().is_some()
                || tag.is_enemy_projectile()
                || tag.item_kind().is_some();
            if !touches_player {
                continue;
            }
            for (handle, entity) in sim.pools.iter_active(tag) {
                if overlaps(player, PLAYER_RADIUS, entity.position, radius(tag)) {
                    out.push(Contact::new(Body::Player, Body::Entity(handle)));
                }
            }
        }
    }
}
