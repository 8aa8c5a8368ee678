//! All simulation entity types: pure data, no logic.

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ── Type tags ─────────────────────────────────────────────────────────────────

/// Closed set of pooled entity categories.  The serde names double as the
/// type names used in stage files (`"EnemyS"`, `"ItemCoin"`, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    #[serde(rename = "EnemyS")]
    EnemySmall,
    #[serde(rename = "EnemyM")]
    EnemyMedium,
    #[serde(rename = "EnemyL")]
    EnemyLarge,
    #[serde(rename = "EnemyB")]
    EnemyBoss,
    BulletPlayerA,
    BulletPlayerB,
    BulletEnemyA,
    BulletEnemyB,
    BulletFollower,
    BulletBossA,
    BulletBossB,
    ItemCoin,
    ItemPower,
    ItemBoom,
    Explosion,
}

impl EntityTag {
    pub const COUNT: usize = 15;

    pub const ALL: [EntityTag; EntityTag::COUNT] = [
        EntityTag::EnemySmall,
        EntityTag::EnemyMedium,
        EntityTag::EnemyLarge,
        EntityTag::EnemyBoss,
        EntityTag::BulletPlayerA,
        EntityTag::BulletPlayerB,
        EntityTag::BulletEnemyA,
        EntityTag::BulletEnemyB,
        EntityTag::BulletFollower,
        EntityTag::BulletBossA,
        EntityTag::BulletBossB,
        EntityTag::ItemCoin,
        EntityTag::ItemPower,
        EntityTag::ItemBoom,
        EntityTag::Explosion,
    ];

    /// Slot of this tag in per-tag arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stage-file name of the tag.
    pub fn name(self) -> &'static str {
        match self {
            EntityTag::EnemySmall => "EnemyS",
            EntityTag::EnemyMedium => "EnemyM",
            EntityTag::EnemyLarge => "EnemyL",
            EntityTag::EnemyBoss => "EnemyB",
            EntityTag::BulletPlayerA => "BulletPlayerA",
            EntityTag::BulletPlayerB => "BulletPlayerB",
            EntityTag::BulletEnemyA => "BulletEnemyA",
            EntityTag::BulletEnemyB => "BulletEnemyB",
            EntityTag::BulletFollower => "BulletFollower",
            EntityTag::BulletBossA => "BulletBossA",
            EntityTag::BulletBossB => "BulletBossB",
            EntityTag::ItemCoin => "ItemCoin",
            EntityTag::ItemPower => "ItemPower",
            EntityTag::ItemBoom => "ItemBoom",
            EntityTag::Explosion => "Explosion",
        }
    }

    pub fn from_name(name: &str) -> Option<EntityTag> {
        EntityTag::ALL.into_iter().find(|tag| tag.name() == name)
    }

    pub fn enemy_kind(self) -> Option<EnemyKind> {
        match self {
            EntityTag::EnemySmall => Some(EnemyKind::Small),
            EntityTag::EnemyMedium => Some(EnemyKind::Medium),
            EntityTag::EnemyLarge => Some(EnemyKind::Large),
            EntityTag::EnemyBoss => Some(EnemyKind::Boss),
            _ => None,
        }
    }

    pub fn item_kind(self) -> Option<ItemKind> {
        match self {
            EntityTag::ItemCoin => Some(ItemKind::Coin),
            EntityTag::ItemPower => Some(ItemKind::Power),
            EntityTag::ItemBoom => Some(ItemKind::Boom),
            _ => None,
        }
    }

    pub fn is_player_projectile(self) -> bool {
        matches!(
            self,
            EntityTag::BulletPlayerA | EntityTag::BulletPlayerB | EntityTag::BulletFollower
        )
    }

    pub fn is_enemy_projectile(self) -> bool {
        matches!(
            self,
            EntityTag::BulletEnemyA
                | EntityTag::BulletEnemyB
                | EntityTag::BulletBossA
                | EntityTag::BulletBossB
        )
    }

    pub fn is_projectile(self) -> bool {
        self.is_player_projectile() || self.is_enemy_projectile()
    }
}

impl std::fmt::Display for EntityTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Small,
    Medium,
    Large,
    Boss,
}

impl EnemyKind {
    /// Health on (re)activation.
    pub fn initial_health(self) -> i32 {
        match self {
            EnemyKind::Small => 1,
            EnemyKind::Medium => 3,
            EnemyKind::Large => 10,
            EnemyKind::Boss => 3000,
        }
    }

    pub fn tag(self) -> EntityTag {
        match self {
            EnemyKind::Small => EntityTag::EnemySmall,
            EnemyKind::Medium => EntityTag::EnemyMedium,
            EnemyKind::Large => EntityTag::EnemyLarge,
            EnemyKind::Boss => EntityTag::EnemyBoss,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Coin,
    Power,
    Boom,
}

impl ItemKind {
    pub fn tag(self) -> EntityTag {
        match self {
            ItemKind::Coin => EntityTag::ItemCoin,
            ItemKind::Power => EntityTag::ItemPower,
            ItemKind::Boom => EntityTag::ItemBoom,
        }
    }
}

// ── Handles ───────────────────────────────────────────────────────────────────

/// Reference to one pooled entity: pool tag, slot index and the generation
/// stamped on the slot when it was acquired.  A handle outlives its entity
/// harmlessly: once the slot is released or reused the generation no longer
/// matches and lookups miss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub tag: EntityTag,
    pub index: u32,
    pub generation: u32,
}

// ── Per-type payloads ─────────────────────────────────────────────────────────

/// Boss routine step, re-rolled whenever its dwell time runs out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossAction {
    Move,
    Fire,
    Wait,
}

/// Resumable AI phase.  Non-boss enemies stay `Idle` for their whole life.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnemyPhase {
    /// Entering the playfield; `remaining` counts down to `Stopped` (boss only).
    Idle { remaining: f32 },
    /// Halted; `remaining` counts down to the first `Thinking` roll.
    Stopped { remaining: f32 },
    Thinking { action: BossAction, remaining: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyState {
    pub kind: EnemyKind,
    pub health: i32,
    /// Seconds accumulated since the last shot.
    pub shot_cooldown: f32,
    pub phase: EnemyPhase,
    /// True while the hit sprite is showing.
    pub flashing: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileState {
    pub damage: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemState {
    pub kind: ItemKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExplosionState {
    pub scale: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Enemy(EnemyState),
    Projectile(ProjectileState),
    Item(ItemState),
    Explosion(ExplosionState),
}

impl Payload {
    /// Zeroed payload a slot of `tag` carries right after acquisition.
    pub fn defaults_for(tag: EntityTag) -> Payload {
        if let Some(kind) = tag.enemy_kind() {
            return Payload::Enemy(EnemyState {
                kind,
                health: kind.initial_health(),
                shot_cooldown: 0.0,
                phase: EnemyPhase::Idle { remaining: 0.0 },
                flashing: false,
            });
        }
        if let Some(kind) = tag.item_kind() {
            return Payload::Item(ItemState { kind });
        }
        match tag {
            EntityTag::BulletPlayerB => Payload::Projectile(ProjectileState { damage: 3 }),
            EntityTag::Explosion => Payload::Explosion(ExplosionState { scale: 1.0 }),
            _ => Payload::Projectile(ProjectileState { damage: 1 }),
        }
    }
}

// ── Pooled entity ─────────────────────────────────────────────────────────────

/// One pooled slot.  `active` and `generation` are written only by the pool.
#[derive(Clone, Debug)]
pub struct Entity {
    tag: EntityTag,
    pub position: Vec2,
    pub velocity: Vec2,
    pub(crate) active: bool,
    pub(crate) generation: u32,
    pub payload: Payload,
}

impl Entity {
    pub(crate) fn new(tag: EntityTag) -> Entity {
        Entity {
            tag,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            active: false,
            generation: 0,
            payload: Payload::defaults_for(tag),
        }
    }

    #[inline]
    pub fn tag(&self) -> EntityTag {
        self.tag
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn enemy(&self) -> Option<&EnemyState> {
        match &self.payload {
            Payload::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn enemy_mut(&mut self) -> Option<&mut EnemyState> {
        match &mut self.payload {
            Payload::Enemy(enemy) => Some(enemy),
            _ => None,
        }
    }

    pub fn projectile(&self) -> Option<&ProjectileState> {
        match &self.payload {
            Payload::Projectile(projectile) => Some(projectile),
            _ => None,
        }
    }

    pub fn item(&self) -> Option<&ItemState> {
        match &self.payload {
            Payload::Item(item) => Some(item),
            _ => None,
        }
    }
}

// ── Player & followers ────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub position: Vec2,
    /// False between a hit and the respawn.
    pub active: bool,
    pub life: u32,
    pub score: u32,
    pub power: u32,
    pub boom: u32,
    /// Seconds of invulnerability left; zero means vulnerable.
    pub invulnerable_for: f32,
    /// Set by the first hit resolved this frame.
    pub hit_this_frame: bool,
    /// Seconds accumulated since the last shot.
    pub shot_cooldown: f32,
    /// True while a boom effect window is open.
    pub boom_window: bool,
}

impl Player {
    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_for > 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    /// Boss defeated; waiting for the host to load the next stage.
    StageClear,
    GameOver,
}

/// Input polled once per tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputState {
    /// Horizontal axis in [-1, 1].
    pub move_x: f32,
    /// Vertical axis in [-1, 1], positive is up.
    pub move_y: f32,
    /// Primary fire held.
    pub fire: bool,
    /// Boom button pressed this tick.
    pub boom: bool,
}
