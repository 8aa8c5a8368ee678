//! Fixed-capacity entity pools.
//!
//! Every pool is allocated once at startup and never grows.  Acquisition is
//! a linear scan for the first inactive slot; release only clears the active
//! flag.  Each acquisition bumps the slot's generation so handles to an
//! earlier occupant stop resolving.

use tracing::{error, info, warn};

use crate::config::GameConfig;
use crate::entities::{Entity, EntityTag, Handle, Payload};
use crate::error::PoolError;
use glam::Vec2;

// ── Template availability ────────────────────────────────────────────────────

/// Which entity templates (sprites, colliders, ...) the host can supply.
/// A pool is only created for tags whose template exists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Templates {
    available: [bool; EntityTag::COUNT],
}

impl Templates {
    pub fn all() -> Self {
        Self {
            available: [true; EntityTag::COUNT],
        }
    }

    pub fn none() -> Self {
        Self {
            available: [false; EntityTag::COUNT],
        }
    }

    pub fn with(mut self, tag: EntityTag) -> Self {
        self.available[tag.index()] = true;
        self
    }

    pub fn without(mut self, tag: EntityTag) -> Self {
        self.available[tag.index()] = false;
        self
    }

    #[inline]
    pub fn has(&self, tag: EntityTag) -> bool {
        self.available[tag.index()]
    }
}

// ── Single pool ──────────────────────────────────────────────────────────────

pub struct Pool {
    tag: EntityTag,
    slots: Box<[Entity]>,
}

impl Pool {
    /// Pre-allocate `capacity` inactive entities of `tag`.
    pub fn new(tag: EntityTag, capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::ZeroCapacity { tag });
        }
        let slots = (0..capacity).map(|_| Entity::new(tag)).collect();
        Ok(Self { tag, slots })
    }

    #[inline]
    pub fn tag(&self) -> EntityTag {
        self.tag
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Every slot, active or not, in index order.
    #[inline]
    pub fn slots(&self) -> &[Entity] {
        &self.slots
    }

    /// Activate the first inactive slot with its payload reset to defaults.
    pub fn acquire(&mut self) -> Result<Handle, PoolError> {
        let index = self
            .slots
            .iter()
            .position(|slot| !slot.active)
            .ok_or(PoolError::Exhausted {
                tag: self.tag,
                capacity: self.slots.len(),
            })?;

        let slot = &mut self.slots[index];
        slot.active = true;
        slot.generation = slot.generation.wrapping_add(1);
        slot.position = Vec2::ZERO;
        slot.velocity = Vec2::ZERO;
        slot.payload = Payload::defaults_for(self.tag);

        Ok(Handle {
            tag: self.tag,
            index: index as u32,
            generation: slot.generation,
        })
    }

    /// Deactivate the entity behind `handle`.  Returns `false` (and changes
    /// nothing) when the handle is stale or the slot is already inactive.
    pub fn release(&mut self, handle: Handle) -> bool {
        match self.get_mut(handle) {
            Some(slot) => {
                slot.active = false;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, handle: Handle) -> Option<&Entity> {
        if handle.tag != self.tag {
            return None;
        }
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        if handle.tag != self.tag {
            return None;
        }
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
    }

    /// Diagnostic, O(capacity).
    pub fn count_active(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (Handle, &Entity)> + '_ {
        let tag = self.tag;
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(move |(index, slot)| {
                (
                    Handle {
                        tag,
                        index: index as u32,
                        generation: slot.generation,
                    },
                    slot,
                )
            })
    }

    /// Active entities for position/velocity writes.  The active flag itself
    /// stays private to the pool.
    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.slots.iter_mut().filter(|slot| slot.active)
    }

    pub fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.active = false;
        }
    }
}

// ── All pools ────────────────────────────────────────────────────────────────

/// One optional pool per tag, indexed by `EntityTag::index`.  A `None`
/// entry is a pool disabled by a configuration error.
pub struct PoolSet {
    pools: [Option<Pool>; EntityTag::COUNT],
}

impl Default for PoolSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolSet {
    /// A set with every pool disabled.
    pub fn new() -> Self {
        Self {
            pools: std::array::from_fn(|_| None),
        }
    }

    /// Build every pool listed in `config`.  Pools that fail to build are
    /// logged and left disabled; the rest of the set still works.
    pub fn from_config(config: &GameConfig, templates: &Templates) -> Self {
        let mut set = Self::new();
        for tag in EntityTag::ALL {
            let Some(&capacity) = config.pools.get(&tag) else {
                warn!(%tag, "no capacity configured, pool disabled");
                continue;
            };
            if let Err(err) = set.create_pool(tag, capacity, templates) {
                error!(%tag, %err, "pool disabled");
            }
        }
        let enabled = set.pools.iter().flatten().count();
        info!("{} pools initialized", enabled);
        set
    }

    pub fn create_pool(
        &mut self,
        tag: EntityTag,
        capacity: usize,
        templates: &Templates,
    ) -> Result<(), PoolError> {
        if !templates.has(tag) {
            return Err(PoolError::MissingTemplate { tag });
        }
        self.pools[tag.index()] = Some(Pool::new(tag, capacity)?);
        Ok(())
    }

    #[inline]
    pub fn is_enabled(&self, tag: EntityTag) -> bool {
        self.pools[tag.index()].is_some()
    }

    #[inline]
    pub fn pool(&self, tag: EntityTag) -> Option<&Pool> {
        self.pools[tag.index()].as_ref()
    }

    /// Hand out an entity of `tag`.  Exhaustion is logged; the caller is
    /// expected to skip whatever it wanted the entity for.
    pub fn acquire(&mut self, tag: EntityTag) -> Result<Handle, PoolError> {
        let pool = self.pools[tag.index()]
            .as_mut()
            .ok_or(PoolError::Disabled { tag })?;
        pool.acquire().inspect_err(|err| warn!(%err, "acquire skipped"))
    }

    pub fn release(&mut self, handle: Handle) -> bool {
        self.pools[handle.tag.index()]
            .as_mut()
            .is_some_and(|pool| pool.release(handle))
    }

    pub fn get(&self, handle: Handle) -> Option<&Entity> {
        self.pool(handle.tag)?.get(handle)
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        self.pools[handle.tag.index()].as_mut()?.get_mut(handle)
    }

    #[inline]
    pub fn is_live(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Active entities of `tag`; zero for a disabled pool.
    pub fn count_active(&self, tag: EntityTag) -> usize {
        self.pool(tag).map_or(0, Pool::count_active)
    }

    pub fn iter_active(&self, tag: EntityTag) -> impl Iterator<Item = (Handle, &Entity)> + '_ {
        self.pool(tag).into_iter().flat_map(Pool::iter_active)
    }

    pub fn iter_active_mut(&mut self, tag: EntityTag) -> impl Iterator<Item = &mut Entity> + '_ {
        self.pools[tag.index()]
            .as_mut()
            .into_iter()
            .flat_map(Pool::iter_active_mut)
    }

    /// Handles of every active entity of `tag`, for passes that mutate.
    pub fn active_handles(&self, tag: EntityTag) -> Vec<Handle> {
        self.iter_active(tag).map(|(handle, _)| handle).collect()
    }

    pub fn reset_pool(&mut self, tag: EntityTag) {
        if let Some(pool) = self.pools[tag.index()].as_mut() {
            pool.reset();
            info!(%tag, "pool reset");
        }
    }

    pub fn reset_all(&mut self) {
        for pool in self.pools.iter_mut().flatten() {
            pool.reset();
        }
        info!("all pools reset");
    }
}
