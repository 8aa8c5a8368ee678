use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use vertical_shooter::collision::{resolve, Body, Contact};
use vertical_shooter::compute::{FrameEvent, Simulation};
use vertical_shooter::config::GameConfig;
use vertical_shooter::entities::*;
use vertical_shooter::pool::Templates;
use vertical_shooter::spawn::SpawnSchedule;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_sim() -> Simulation {
    let mut sim = Simulation::with_config(GameConfig::default(), SpawnSchedule::default());
    sim.drain_events();
    sim
}

fn vulnerable_sim() -> Simulation {
    let mut sim = make_sim();
    sim.player.invulnerable_for = 0.0;
    sim
}

fn hit(a: Handle, b: Handle) -> Contact {
    Contact::new(Body::Entity(a), Body::Entity(b))
}

fn touch(h: Handle) -> Contact {
    Contact::new(Body::Player, Body::Entity(h))
}

fn kills(sim: &Simulation) -> usize {
    sim.events()
        .iter()
        .filter(|e| matches!(e, FrameEvent::EnemyKilled { .. }))
        .count()
}

// ── Player shots vs enemies ───────────────────────────────────────────────────

#[test]
fn two_shots_on_one_kill_pay_once() {
    let mut sim = make_sim();
    let mut rng = seeded_rng();
    let enemy = sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap();
    let a = sim.spawn(EntityTag::BulletPlayerA, Vec2::ZERO).unwrap();
    let b = sim.spawn(EntityTag::BulletPlayerA, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[hit(a, enemy), hit(b, enemy)], &mut rng);

    assert_eq!(sim.player.score, 100);
    assert_eq!(kills(&sim), 1);
    assert!(!sim.pools.is_live(a));
    // The second shot met an already released enemy and flies on.
    assert!(sim.pools.is_live(b));
}

#[test]
fn one_shot_strikes_only_once() {
    let mut sim = make_sim();
    let mut rng = seeded_rng();
    let first = sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap();
    let second = sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap();
    let shot = sim.spawn(EntityTag::BulletFollower, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[hit(shot, first), hit(second, shot)], &mut rng);

    assert!(!sim.pools.is_live(first));
    assert!(sim.pools.is_live(second));
    assert_eq!(kills(&sim), 1);
}

#[test]
fn heavy_shot_deals_more_damage() {
    let mut sim = make_sim();
    let mut rng = seeded_rng();
    let large = sim.spawn(EntityTag::EnemyLarge, Vec2::ZERO).unwrap();
    let shot = sim.spawn(EntityTag::BulletPlayerB, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[hit(large, shot)], &mut rng);

    assert_eq!(sim.pools.get(large).unwrap().enemy().unwrap().health, 7);
    assert!(!sim.pools.is_live(shot));
}

#[test]
fn enemy_shots_do_not_hurt_enemies() {
    let mut sim = make_sim();
    let mut rng = seeded_rng();
    let enemy = sim.spawn(EntityTag::EnemyMedium, Vec2::ZERO).unwrap();
    let shot = sim.spawn(EntityTag::BulletEnemyA, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[hit(shot, enemy)], &mut rng);

    assert_eq!(sim.pools.get(enemy).unwrap().enemy().unwrap().health, 3);
    assert!(sim.pools.is_live(shot));
}

// ── Player contacts ───────────────────────────────────────────────────────────

#[test]
fn invulnerable_player_loses_nothing() {
    let mut sim = make_sim();
    let mut rng = seeded_rng();
    let shot = sim.spawn(EntityTag::BulletEnemyB, Vec2::ZERO).unwrap();
    let small = sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[touch(shot), touch(small)], &mut rng);

    assert_eq!(sim.player.life, 3);
    assert!(sim.player.active);
    assert!(sim.pools.is_live(shot));
    assert!(sim.pools.is_live(small));
}

#[test]
fn simultaneous_contacts_cost_one_life() {
    let mut sim = vulnerable_sim();
    let mut rng = seeded_rng();
    let a = sim.spawn(EntityTag::BulletEnemyA, Vec2::ZERO).unwrap();
    let b = sim.spawn(EntityTag::BulletBossB, Vec2::ZERO).unwrap();
    let c = sim.spawn(EntityTag::EnemyLarge, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[touch(a), touch(b), touch(c)], &mut rng);

    assert_eq!(sim.player.life, 2);
    assert!(!sim.pools.is_live(a));
    assert!(sim.pools.is_live(b));
    assert!(sim.pools.is_live(c));
}

#[test]
fn nothing_scores_after_the_last_life_is_lost() {
    let mut sim = vulnerable_sim();
    let mut rng = seeded_rng();
    sim.player.life = 1;
    let bullet = sim.spawn(EntityTag::BulletEnemyA, Vec2::ZERO).unwrap();
    let enemy = sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap();
    let shot = sim.spawn(EntityTag::BulletPlayerA, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[touch(bullet), hit(shot, enemy)], &mut rng);

    assert_eq!(sim.status, GameStatus::GameOver);
    assert_eq!(sim.player.score, 0);
    assert!(sim.pools.is_live(enemy));
    assert!(sim.pools.is_live(shot));
}

#[test]
fn touching_the_boss_leaves_it_in_play() {
    let mut sim = vulnerable_sim();
    let mut rng = seeded_rng();
    let boss = sim.spawn(EntityTag::EnemyBoss, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[Contact::new(Body::Entity(boss), Body::Player)], &mut rng);

    assert_eq!(sim.player.life, 2);
    assert!(sim.pools.is_live(boss));
}

#[test]
fn colliding_enemy_is_removed_without_score() {
    let mut sim = vulnerable_sim();
    let mut rng = seeded_rng();
    let small = sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[touch(small)], &mut rng);

    assert!(!sim.pools.is_live(small));
    assert_eq!(sim.player.score, 0);
}

#[test]
fn item_contact_applies_and_releases() {
    let mut sim = make_sim();
    let mut rng = seeded_rng();
    let coin = sim.spawn(EntityTag::ItemCoin, Vec2::ZERO).unwrap();
    let boom = sim.spawn(EntityTag::ItemBoom, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[touch(coin), touch(boom), touch(coin)], &mut rng);

    assert_eq!(sim.player.score, 1000);
    assert_eq!(sim.player.boom, 1);
    assert_eq!(sim.pools.count_active(EntityTag::ItemCoin), 0);
    assert!(sim.events().contains(&FrameEvent::Boom { boom: 1 }));
}

#[test]
fn dead_player_collects_nothing() {
    let mut sim = vulnerable_sim();
    let mut rng = seeded_rng();
    sim.hit_player();
    let coin = sim.spawn(EntityTag::ItemCoin, Vec2::ZERO).unwrap();

    resolve(&mut sim, &[touch(coin)], &mut rng);

    assert!(sim.pools.is_live(coin));
    assert_eq!(sim.player.score, 0);
}

// ── Boundary & bad contacts ───────────────────────────────────────────────────

#[test]
fn boundary_culls_everything_but_boss_and_effects() {
    let mut sim = make_sim();
    let mut rng = seeded_rng();
    let culled = [
        sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap(),
        sim.spawn(EntityTag::EnemyLarge, Vec2::ZERO).unwrap(),
        sim.spawn(EntityTag::BulletPlayerA, Vec2::ZERO).unwrap(),
        sim.spawn(EntityTag::BulletBossB, Vec2::ZERO).unwrap(),
        sim.spawn(EntityTag::ItemPower, Vec2::ZERO).unwrap(),
    ];
    let boss = sim.spawn(EntityTag::EnemyBoss, Vec2::ZERO).unwrap();
    let explosion = sim.spawn(EntityTag::Explosion, Vec2::ZERO).unwrap();

    let contacts: Vec<Contact> = culled
        .iter()
        .chain([&boss, &explosion])
        .map(|&h| Contact::new(Body::Entity(h), Body::Boundary))
        .collect();
    resolve(&mut sim, &contacts, &mut rng);

    assert!(culled.iter().all(|&h| !sim.pools.is_live(h)));
    assert!(sim.pools.is_live(boss));
    assert!(sim.pools.is_live(explosion));
    assert_eq!(sim.player.score, 0);
}

#[test]
fn stale_handle_contact_is_ignored() {
    let mut sim = vulnerable_sim();
    let mut rng = seeded_rng();
    let enemy = sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap();
    sim.despawn(enemy);
    // Same slot, next occupant.
    let reused = sim.spawn(EntityTag::EnemySmall, Vec2::ZERO).unwrap();
    assert_eq!(reused.index, enemy.index);

    resolve(&mut sim, &[touch(enemy)], &mut rng);

    assert_eq!(sim.player.life, 3);
    assert!(sim.pools.is_live(reused));
}

#[test]
fn disabled_pool_contact_is_ignored() {
    let templates = Templates::all().without(EntityTag::ItemCoin);
    let mut sim = Simulation::new(GameConfig::default(), &templates, SpawnSchedule::default());
    let mut rng = seeded_rng();
    let ghost = Handle {
        tag: EntityTag::ItemCoin,
        index: 0,
        generation: 1,
    };

    resolve(&mut sim, &[touch(ghost)], &mut rng);
    assert_eq!(sim.player.score, 0);
}

#[test]
fn player_with_boundary_has_no_rule() {
    let mut sim = vulnerable_sim();
    let mut rng = seeded_rng();
    resolve(&mut sim, &[Contact::new(Body::Player, Body::Boundary)], &mut rng);
    assert_eq!(sim.player.life, 3);
    assert!(sim.player.active);
}
