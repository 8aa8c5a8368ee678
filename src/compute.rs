//! Frame orchestration.
//!
//! `Simulation` is the one context object every component works through: it
//! owns the pools, the player and followers, the spawn scheduler and the
//! deferred-action queue, and it collects the `FrameEvent`s the host reads
//! back each frame.  All randomness comes through the injected `rng` so
//! callers control determinism (tests use a seeded RNG).
//!
//! A frame is three phases:
//! 1. `step`: behaviour: player, followers, enemies, spawns, timers.
//! 2. the host's `Physics` integrates velocities and reports contacts.
//! 3. `resolve`: contact rules, against post-move positions.
//!
//! `tick` runs all three through a `Physics` implementation.

use std::mem;

use glam::Vec2;
use rand::Rng;
use tracing::{debug, error, info};

use crate::collision::{self, Body, Contact};
use crate::combat::{self, DamageOutcome, HitOutcome, Pickup, Shot, Volley};
use crate::config::GameConfig;
use crate::entities::{
    EnemyKind, EntityTag, GameStatus, Handle, InputState, ItemKind, Payload, Player,
};
use crate::follower::Follower;
use crate::pool::{PoolSet, Templates};
use crate::spawn::{SpawnEvent, SpawnSchedule, SpawnScheduler};
use crate::timers::{Deferred, DeferredAction, DeferredQueue, Owner};

pub const FOLLOWER_SLOTS: usize = 3;

// ── Collaborator interfaces ──────────────────────────────────────────────────

/// Position integration and contact detection, supplied by the host.
pub trait Physics {
    /// Move every active entity by its velocity over `dt`.
    fn integrate(&mut self, sim: &mut Simulation, dt: f32);

    /// Append this frame's overlapping pairs to `out`.
    fn contacts(&mut self, sim: &Simulation, out: &mut Vec<Contact>);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationTrigger {
    /// Boss hit reaction.
    OnHit,
    /// Swap to the hit sprite.
    FlashOn,
    /// Swap back to the normal sprite.
    FlashOff,
    OnExplosion,
}

/// Everything the rendering, audio and score/UI collaborators need to hear
/// about, in the order it happened.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    Score { score: u32, delta: u32 },
    Life { life: u32 },
    Power { power: u32 },
    Boom { boom: u32 },
    Animation { body: Body, trigger: AnimationTrigger },
    Explosion { position: Vec2, scale: f32 },
    EnemyKilled { kind: EnemyKind, position: Vec2 },
    ItemDropped { kind: ItemKind, position: Vec2 },
    FollowerActivated { slot: usize },
    BoomWindow { open: bool },
    /// Player (and followers) drawn half-transparent while invulnerable.
    Translucent { on: bool },
    PlayerRespawned,
    StageComplete,
    GameOver,
}

// ── Simulation ───────────────────────────────────────────────────────────────

pub struct Simulation {
    pub config: GameConfig,
    pub pools: PoolSet,
    pub player: Player,
    pub followers: [Follower; FOLLOWER_SLOTS],
    pub scheduler: SpawnScheduler,
    pub timers: DeferredQueue,
    pub status: GameStatus,
    pub frame: u64,
    events: Vec<FrameEvent>,
    // Reused per-frame buffers.
    due: Vec<Deferred>,
    handles: Vec<Handle>,
    contacts: Vec<Contact>,
}

impl Simulation {
    /// An invalid `config` is logged and replaced by the defaults.
    pub fn new(config: GameConfig, templates: &Templates, schedule: SpawnSchedule) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(err) => {
                error!(%err, "invalid configuration, using defaults");
                GameConfig::default()
            }
        };
        let pools = PoolSet::from_config(&config, templates);
        let delay = config.follower.delay_frames;
        let mut sim = Self {
            player: combat::new_player(&config.player),
            followers: std::array::from_fn(|slot| Follower::new(slot, delay)),
            scheduler: SpawnScheduler::new(schedule),
            timers: DeferredQueue::with_capacity(64),
            status: GameStatus::Playing,
            frame: 0,
            events: Vec::with_capacity(64),
            due: Vec::with_capacity(16),
            handles: Vec::with_capacity(64),
            contacts: Vec::with_capacity(64),
            pools,
            config,
        };
        sim.enter_play();
        sim
    }

    /// Every template available; the usual setup outside tests of disabled
    /// pools.
    pub fn with_config(config: GameConfig, schedule: SpawnSchedule) -> Self {
        Self::new(config, &Templates::all(), schedule)
    }

    /// Back to the first spawn of the current stage with a fresh player.
    pub fn restart(&mut self) {
        self.pools.reset_all();
        self.timers.clear();
        self.scheduler.reset();
        for follower in self.followers.iter_mut() {
            follower.deactivate();
        }
        self.player = combat::new_player(&self.config.player);
        self.status = GameStatus::Playing;
        self.frame = 0;
        self.events.clear();
        self.enter_play();
        info!("simulation restarted");
    }

    /// Swap in the next stage's schedule; player progress carries over.
    pub fn load_stage(&mut self, schedule: SpawnSchedule) {
        info!(events = schedule.len(), "stage loaded");
        self.scheduler.replace(schedule);
        self.player.position = self.config.player.spawn_position;
        if self.status == GameStatus::StageClear {
            self.status = GameStatus::Playing;
        }
    }

    fn enter_play(&mut self) {
        combat::grant_invulnerability(&mut self.player, self.config.player.invulnerability);
        self.emit(FrameEvent::Translucent { on: true });
        self.emit(FrameEvent::Life {
            life: self.player.life,
        });
        self.emit(FrameEvent::Boom {
            boom: self.player.boom,
        });
    }

    // ── Events ───────────────────────────────────────────────────────────────

    fn emit(&mut self, event: FrameEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[FrameEvent] {
        &self.events
    }

    /// Hand the collected events to the host.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, FrameEvent> {
        self.events.drain(..)
    }

    // ── Frame phases ─────────────────────────────────────────────────────────

    /// Behaviour phase of one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32, input: &InputState, rng: &mut impl Rng) {
        if self.status == GameStatus::GameOver {
            return;
        }
        self.frame += 1;
        self.player.hit_this_frame = false;

        self.update_player(dt, input, rng);
        self.update_followers(dt, input.fire);
        self.update_enemies(dt, rng);
        if let Some(event) = self.scheduler.tick(dt) {
            self.spawn_scheduled(event);
        }
        self.run_timers(dt);
    }

    /// Contact phase; run after positions have been integrated.
    pub fn resolve(&mut self, contacts: &[Contact], rng: &mut impl Rng) {
        if self.status == GameStatus::GameOver {
            return;
        }
        collision::resolve(self, contacts, rng);
    }

    /// One complete frame through the host's physics.
    pub fn tick(
        &mut self,
        dt: f32,
        input: &InputState,
        physics: &mut impl Physics,
        rng: &mut impl Rng,
    ) {
        self.step(dt, input, rng);
        physics.integrate(self, dt);

        let mut contacts = mem::take(&mut self.contacts);
        contacts.clear();
        physics.contacts(self, &mut contacts);
        self.resolve(&contacts, rng);
        self.contacts = contacts;
    }

    fn update_player(&mut self, dt: f32, input: &InputState, rng: &mut impl Rng) {
        if combat::tick_invulnerability(&mut self.player, dt) {
            self.emit(FrameEvent::Translucent { on: false });
        }
        if !self.player.active {
            return;
        }

        let axis = Vec2::new(input.move_x, input.move_y);
        let cfg = &self.config;
        combat::steer_player(&mut self.player, axis, dt, &cfg.player, &cfg.playfield);
        if let Some(volley) = combat::player_trigger(&mut self.player, input.fire, dt, &cfg.player) {
            self.fire(&volley);
        }
        if combat::trigger_boom(&mut self.player, input.boom) {
            self.detonate_boom(rng);
        }
    }

    fn update_followers(&mut self, dt: f32, fire: bool) {
        let mut leader = self.player.position;
        for slot in 0..FOLLOWER_SLOTS {
            let shot = self.followers[slot].update(leader, fire, dt, &self.config.follower);
            if let Some(shot) = shot {
                self.fire_shot(shot);
            }
            if self.followers[slot].active {
                leader = self.followers[slot].position;
            }
        }
    }

    fn update_enemies(&mut self, dt: f32, rng: &mut impl Rng) {
        let mut handles = mem::take(&mut self.handles);
        for kind in [
            EnemyKind::Small,
            EnemyKind::Medium,
            EnemyKind::Large,
            EnemyKind::Boss,
        ] {
            handles.clear();
            handles.extend(self.pools.iter_active(kind.tag()).map(|(handle, _)| handle));

            for &handle in &handles {
                let Some(entity) = self.pools.get_mut(handle) else {
                    continue;
                };
                if !combat::advance_enemy(entity, dt, &self.config, rng) {
                    continue;
                }
                let origin = entity.position;
                let volley = combat::enemy_volley(
                    kind,
                    origin,
                    self.player.position,
                    self.config.enemies.tuning(kind),
                );
                self.fire(&volley);
            }
        }
        self.handles = handles;
    }

    fn run_timers(&mut self, dt: f32) {
        let mut due = mem::take(&mut self.due);
        due.clear();
        self.timers.advance(dt, &mut due);
        for entry in &due {
            self.run_deferred(entry.owner, entry.action);
        }
        self.due = due;
    }

    fn run_deferred(&mut self, owner: Owner, action: DeferredAction) {
        match (owner, action) {
            (Owner::Entity(handle), DeferredAction::RevertFlash) => {
                let Some(enemy) = self.pools.get_mut(handle).and_then(|e| e.enemy_mut()) else {
                    debug!(?handle, "flash revert for a released enemy dropped");
                    return;
                };
                enemy.flashing = false;
                self.emit(FrameEvent::Animation {
                    body: Body::Entity(handle),
                    trigger: AnimationTrigger::FlashOff,
                });
            }
            (Owner::Entity(handle), DeferredAction::ReleaseExplosion) => {
                self.despawn(handle);
            }
            (Owner::Player, DeferredAction::CloseBoomWindow) => {
                self.player.boom_window = false;
                self.emit(FrameEvent::BoomWindow { open: false });
            }
            (Owner::Player, DeferredAction::RespawnPlayer) => self.respawn_player(),
            (owner, action) => debug!(?owner, ?action, "deferred action has no target"),
        }
    }

    // ── Entity lifecycle ─────────────────────────────────────────────────────

    /// Acquire and place an entity.  Enemies get their entry velocity and
    /// items start falling.  `None` when the pool is exhausted or disabled.
    pub fn spawn(&mut self, tag: EntityTag, position: Vec2) -> Option<Handle> {
        let handle = self.pools.acquire(tag).ok()?;
        let fall_speed = self.config.items.fall_speed;
        let entity = self.pools.get_mut(handle)?;
        entity.position = position;
        if matches!(entity.payload, Payload::Enemy(_)) {
            combat::arm_enemy(entity, &self.config);
        } else if matches!(entity.payload, Payload::Item(_)) {
            entity.velocity = Vec2::NEG_Y * fall_speed;
        }
        Some(handle)
    }

    fn spawn_scheduled(&mut self, event: SpawnEvent) {
        let Some(position) = self.config.lane_position(event.lane()) else {
            return;
        };
        if let Some(handle) = self.spawn(event.tag(), position) {
            debug!(?handle, lane = event.lane(), "scheduled spawn placed");
        }
    }

    /// Release an entity and cancel its pending deferred actions.  A stale
    /// handle is a no-op.
    pub fn despawn(&mut self, handle: Handle) -> bool {
        if !self.pools.release(handle) {
            return false;
        }
        self.timers.cancel_owner(Owner::Entity(handle));
        true
    }

    fn fire(&mut self, volley: &Volley) {
        for shot in volley.iter() {
            self.fire_shot(*shot);
        }
    }

    fn fire_shot(&mut self, shot: Shot) {
        let Some(handle) = self.spawn(shot.tag, shot.position) else {
            return;
        };
        if let Some(entity) = self.pools.get_mut(handle) {
            entity.velocity = shot.velocity;
        }
    }

    fn spawn_explosion(&mut self, position: Vec2, scale: f32) {
        let Some(handle) = self.spawn(EntityTag::Explosion, position) else {
            return;
        };
        if let Some(Payload::Explosion(explosion)) =
            self.pools.get_mut(handle).map(|e| &mut e.payload)
        {
            explosion.scale = scale;
        }
        self.timers.schedule(
            Owner::Entity(handle),
            self.config.effects.explosion_time,
            DeferredAction::ReleaseExplosion,
        );
        self.emit(FrameEvent::Animation {
            body: Body::Entity(handle),
            trigger: AnimationTrigger::OnExplosion,
        });
        self.emit(FrameEvent::Explosion { position, scale });
    }

    // ── Combat transitions ───────────────────────────────────────────────────

    /// Damage an enemy.  A surviving enemy flashes (the boss plays its hit
    /// animation); a killed one pays out, drops, explodes and is released.
    pub fn damage_enemy(
        &mut self,
        handle: Handle,
        damage: i32,
        rng: &mut impl Rng,
    ) -> DamageOutcome {
        let Some(entity) = self.pools.get_mut(handle) else {
            return DamageOutcome::Ignored;
        };
        let position = entity.position;
        let Some(enemy) = entity.enemy_mut() else {
            return DamageOutcome::Ignored;
        };
        let kind = enemy.kind;
        let outcome = combat::apply_damage(enemy, damage);

        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Survived if kind == EnemyKind::Boss => {
                self.emit(FrameEvent::Animation {
                    body: Body::Entity(handle),
                    trigger: AnimationTrigger::OnHit,
                });
            }
            DamageOutcome::Survived => {
                enemy.flashing = true;
                let owner = Owner::Entity(handle);
                self.timers.cancel(owner, DeferredAction::RevertFlash);
                self.timers.schedule(
                    owner,
                    self.config.effects.flash_time,
                    DeferredAction::RevertFlash,
                );
                self.emit(FrameEvent::Animation {
                    body: Body::Entity(handle),
                    trigger: AnimationTrigger::FlashOn,
                });
            }
            DamageOutcome::Killed => self.kill_enemy(handle, kind, position, rng),
        }
        outcome
    }

    fn kill_enemy(&mut self, handle: Handle, kind: EnemyKind, position: Vec2, rng: &mut impl Rng) {
        let value = self.config.enemies.tuning(kind).score;
        self.add_score(value);
        self.emit(FrameEvent::EnemyKilled { kind, position });

        if let Some(item) = combat::roll_drop(kind, rng) {
            if self.spawn(item.tag(), position).is_some() {
                self.emit(FrameEvent::ItemDropped {
                    kind: item,
                    position,
                });
            }
        }

        self.despawn(handle);
        self.spawn_explosion(position, combat::explosion_scale(kind));

        if kind == EnemyKind::Boss {
            info!(frame = self.frame, "boss down, stage complete");
            self.status = GameStatus::StageClear;
            self.emit(FrameEvent::StageComplete);
        }
    }

    fn add_score(&mut self, delta: u32) {
        self.player.score = self.player.score.saturating_add(delta);
        self.emit(FrameEvent::Score {
            score: self.player.score,
            delta,
        });
    }

    /// Contact damage to the player.
    pub fn hit_player(&mut self) -> HitOutcome {
        let outcome = combat::hit_player(&mut self.player);
        if outcome == HitOutcome::Blocked {
            return outcome;
        }

        self.emit(FrameEvent::Life {
            life: self.player.life,
        });
        self.spawn_explosion(self.player.position, combat::PLAYER_EXPLOSION_SCALE);

        if outcome == HitOutcome::GameOver {
            info!(score = self.player.score, "game over");
            self.status = GameStatus::GameOver;
            self.timers.cancel_owner(Owner::Player);
            self.emit(FrameEvent::GameOver);
        } else {
            self.timers.schedule(
                Owner::Player,
                self.config.player.respawn_delay,
                DeferredAction::RespawnPlayer,
            );
        }
        outcome
    }

    fn respawn_player(&mut self) {
        if self.status == GameStatus::GameOver {
            return;
        }
        let player = &mut self.player;
        player.active = true;
        player.hit_this_frame = false;
        player.position = self.config.player.spawn_position;
        combat::grant_invulnerability(player, self.config.player.invulnerability);
        self.emit(FrameEvent::PlayerRespawned);
        self.emit(FrameEvent::Translucent { on: true });
    }

    /// Player touched an item: apply it and release it.
    pub fn pick_up(&mut self, handle: Handle) -> Option<Pickup> {
        if !self.player.active {
            return None;
        }
        let kind = self.pools.get(handle)?.item()?.kind;
        let pickup = combat::consume_item(
            &mut self.player,
            kind,
            &self.config.player,
            &self.config.follower.unlock_power,
        );
        match pickup {
            Pickup::Score { bonus } => self.emit(FrameEvent::Score {
                score: self.player.score,
                delta: bonus,
            }),
            Pickup::Power { level, follower } => {
                self.emit(FrameEvent::Power { power: level });
                if let Some(slot) = follower {
                    self.activate_follower(slot);
                }
            }
            Pickup::Boom { stock } => self.emit(FrameEvent::Boom { boom: stock }),
        }
        self.despawn(handle);
        Some(pickup)
    }

    fn activate_follower(&mut self, slot: usize) {
        let at = match slot {
            0 => self.player.position,
            _ => self.followers[slot - 1].position,
        };
        if let Some(follower) = self.followers.get_mut(slot) {
            follower.activate(at);
            self.emit(FrameEvent::FollowerActivated { slot });
        }
    }

    /// Boom: every regular enemy on screen takes boom damage and every
    /// enemy projectile is cleared.  The boss is unaffected.
    fn detonate_boom(&mut self, rng: &mut impl Rng) {
        self.emit(FrameEvent::Boom {
            boom: self.player.boom,
        });
        self.emit(FrameEvent::BoomWindow { open: true });
        self.timers.schedule(
            Owner::Player,
            self.config.player.boom_duration,
            DeferredAction::CloseBoomWindow,
        );

        let damage = self.config.player.boom_damage;
        let mut handles = mem::take(&mut self.handles);
        for tag in [
            EntityTag::EnemyLarge,
            EntityTag::EnemyMedium,
            EntityTag::EnemySmall,
        ] {
            handles.clear();
            handles.extend(self.pools.iter_active(tag).map(|(handle, _)| handle));
            for &handle in &handles {
                self.damage_enemy(handle, damage, rng);
            }
        }
        // Boss fire is not cleared.
        for tag in [EntityTag::BulletEnemyA, EntityTag::BulletEnemyB] {
            handles.clear();
            handles.extend(self.pools.iter_active(tag).map(|(handle, _)| handle));
            for &handle in &handles {
                self.despawn(handle);
            }
        }
        self.handles = handles;
    }
}
