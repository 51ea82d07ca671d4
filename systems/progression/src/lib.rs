#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Persistent progression: lifetime currency totals and the unlocks they buy.
//!
//! The world only tracks what the current level collected. Whenever the
//! level phase controller commits rewards the world reports the uncommitted
//! delta through `Event::RewardsCommitted`; this crate folds those deltas into
//! the persisted totals, evaluates unlock thresholds and flushes the store.

mod store;

use serde::{Deserialize, Serialize};
use starfall_core::{Event, LevelId, LevelOutcome, Loadout};
use tracing::info;

pub use store::{JsonFileStore, MemoryStore, ProgressStore, StoreError};

/// Shard total granted by [`Progression::unlock_all`].
const UNLOCK_ALL_SHARDS: i64 = 100;
/// Goo total granted by [`Progression::unlock_all`].
const UNLOCK_ALL_GOO: i64 = 50;

/// Keys of the persisted progress map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProgressKey {
    /// Shards collected across all runs.
    TotalShards,
    /// Goo collected across all runs.
    TotalGoo,
    /// Non-zero once the missile weapon is available.
    MissilesUnlocked,
    /// Non-zero once the ship launches with shields.
    ShieldUnlocked,
    /// Non-zero once the alien front can be selected.
    Level2Unlocked,
}

impl ProgressKey {
    /// Every key, in storage order.
    pub const ALL: [Self; 5] = [
        Self::TotalShards,
        Self::TotalGoo,
        Self::MissilesUnlocked,
        Self::ShieldUnlocked,
        Self::Level2Unlocked,
    ];

    /// Name of the key inside the persisted map.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TotalShards => "TotalShards",
            Self::TotalGoo => "TotalGoo",
            Self::MissilesUnlocked => "MissilesUnlocked",
            Self::ShieldUnlocked => "ShieldUnlocked",
            Self::Level2Unlocked => "Level2Unlocked",
        }
    }
}

/// Feature unlocked by progression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unlock {
    /// Missile weapon.
    Missiles,
    /// Shield charges at launch.
    Shield,
    /// Second level.
    AlienFront,
}

/// Unlock thresholds and the launch loadout they shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Lifetime shards that unlock missiles.
    pub missiles_at_shards: i64,
    /// Lifetime goo that unlocks the shield.
    pub shield_at_goo: i64,
    /// Lives the ship launches with.
    pub lives: u32,
    /// Shield charges granted once the shield is unlocked.
    pub shield_charges: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            missiles_at_shards: 25,
            shield_at_goo: 15,
            lives: 3,
            shield_charges: 2,
        }
    }
}

/// Point-in-time copy of every persisted value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Shards collected across all runs.
    pub total_shards: i64,
    /// Goo collected across all runs.
    pub total_goo: i64,
    /// Missile weapon available.
    pub missiles_unlocked: bool,
    /// Shield available.
    pub shield_unlocked: bool,
    /// Alien front available.
    pub level2_unlocked: bool,
}

impl ProgressSnapshot {
    /// Reports whether `level` may be started.
    #[must_use]
    pub const fn level_available(&self, level: LevelId) -> bool {
        match level {
            LevelId::AsteroidField => true,
            LevelId::AlienFront => self.level2_unlocked,
        }
    }
}

/// Progression tracker backed by a [`ProgressStore`].
#[derive(Debug)]
pub struct Progression<S> {
    config: Config,
    store: S,
}

impl<S: ProgressStore> Progression<S> {
    /// Wraps `store` with the provided thresholds.
    pub fn new(config: Config, store: S) -> Self {
        Self { config, store }
    }

    /// Read-only access to the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current persisted values.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_shards: self.store.read(ProgressKey::TotalShards),
            total_goo: self.store.read(ProgressKey::TotalGoo),
            missiles_unlocked: self.flag(ProgressKey::MissilesUnlocked),
            shield_unlocked: self.flag(ProgressKey::ShieldUnlocked),
            level2_unlocked: self.flag(ProgressKey::Level2Unlocked),
        }
    }

    /// Ship loadout for the next launch.
    pub fn loadout(&self) -> Loadout {
        let shields = if self.flag(ProgressKey::ShieldUnlocked) {
            self.config.shield_charges
        } else {
            0
        };
        Loadout {
            lives: self.config.lives,
            shields,
        }
    }

    /// Folds committed rewards and level results into the store.
    ///
    /// Newly earned unlocks are appended to `unlocks`. The store is flushed
    /// whenever a value changed.
    pub fn handle(&mut self, events: &[Event], unlocks: &mut Vec<Unlock>) -> Result<(), StoreError> {
        let mut dirty = false;
        for event in events {
            match *event {
                Event::RewardsCommitted { shards, goo, .. } => {
                    if shards == 0 && goo == 0 {
                        continue;
                    }
                    let total_shards = self.add(ProgressKey::TotalShards, shards);
                    let total_goo = self.add(ProgressKey::TotalGoo, goo);
                    info!(shards, goo, total_shards, total_goo, "rewards persisted");
                    dirty = true;

                    if total_shards >= self.config.missiles_at_shards
                        && self.raise(ProgressKey::MissilesUnlocked)
                    {
                        unlocks.push(Unlock::Missiles);
                    }
                    if total_goo >= self.config.shield_at_goo
                        && self.raise(ProgressKey::ShieldUnlocked)
                    {
                        unlocks.push(Unlock::Shield);
                    }
                }
                Event::LevelResolved {
                    level: LevelId::AsteroidField,
                    outcome: LevelOutcome::Completed,
                    ..
                } => {
                    if self.raise(ProgressKey::Level2Unlocked) {
                        unlocks.push(Unlock::AlienFront);
                        dirty = true;
                    }
                }
                _ => {}
            }
        }

        if dirty {
            self.store.flush()?;
        }
        Ok(())
    }

    /// Deletes every persisted value.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        for key in ProgressKey::ALL {
            self.store.remove(key);
        }
        info!("progress reset");
        self.store.flush()
    }

    /// Sets every unlock flag and seeds the totals with a testing budget.
    pub fn unlock_all(&mut self) -> Result<(), StoreError> {
        self.store.write(ProgressKey::TotalShards, UNLOCK_ALL_SHARDS);
        self.store.write(ProgressKey::TotalGoo, UNLOCK_ALL_GOO);
        for key in [
            ProgressKey::MissilesUnlocked,
            ProgressKey::ShieldUnlocked,
            ProgressKey::Level2Unlocked,
        ] {
            self.store.write(key, 1);
        }
        info!("all unlocks granted");
        self.store.flush()
    }

    fn flag(&self, key: ProgressKey) -> bool {
        self.store.read(key) != 0
    }

    fn add(&mut self, key: ProgressKey, amount: u32) -> i64 {
        let total = self.store.read(key).saturating_add(i64::from(amount));
        self.store.write(key, total);
        total
    }

    /// Sets a flag; returns `true` when it was previously clear.
    fn raise(&mut self, key: ProgressKey) -> bool {
        if self.flag(key) {
            return false;
        }
        self.store.write(key, 1);
        info!(key = key.as_str(), "unlocked");
        true
    }
}
