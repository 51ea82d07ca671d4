//! Authoritative entity storage with per-kind counts and staged removals.

use std::{collections::BTreeMap, time::Duration};

use glam::Vec2;
use starfall_core::{EntityCategory, EntityId, EntityKind, Event, LiveCounts, RemovalReason};

use crate::{health::Health, motion::Motion};

/// State of a single entity stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Entity {
    /// Identifier allocated by the registry.
    pub(crate) id: EntityId,
    /// Concrete subtype.
    pub(crate) kind: EntityKind,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) motion: Motion,
    /// Present for damageable entities only.
    pub(crate) health: Option<Health>,
    /// Time the entity has existed.
    pub(crate) age: Duration,
    /// Age at which the entity expires.
    pub(crate) lifetime: Option<Duration>,
}

/// Parameters describing an entity about to be inserted.
#[derive(Clone, Debug)]
pub(crate) struct EntitySeed {
    pub(crate) kind: EntityKind,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) motion: Motion,
    pub(crate) health: Option<Health>,
    pub(crate) lifetime: Option<Duration>,
}

/// Registry that stores entities and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct EntityRegistry {
    entries: BTreeMap<EntityId, Entity>,
    counts: BTreeMap<EntityKind, u32>,
    pending_removals: Vec<(EntityId, RemovalReason)>,
    next_entity_id: EntityId,
}

impl EntityRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            counts: BTreeMap::new(),
            pending_removals: Vec::new(),
            next_entity_id: EntityId::new(0),
        }
    }

    /// Drops every entity and restarts identifier allocation.
    pub(crate) fn clear(&mut self) {
        *self = Self::new();
    }

    /// Stores a new entity and returns its identifier.
    pub(crate) fn insert(&mut self, seed: EntitySeed) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id = EntityId::new(id.get().saturating_add(1));

        *self.counts.entry(seed.kind).or_insert(0) += 1;
        let _ = self.entries.insert(
            id,
            Entity {
                id,
                kind: seed.kind,
                position: seed.position,
                velocity: seed.velocity,
                motion: seed.motion,
                health: seed.health,
                age: Duration::ZERO,
                lifetime: seed.lifetime,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entries.values_mut()
    }

    /// Reports whether a removal is already staged for the entity.
    pub(crate) fn is_pending_removal(&self, id: EntityId) -> bool {
        self.pending_removals
            .iter()
            .any(|(pending, _)| *pending == id)
    }

    /// Stages an entity for removal; the first staged reason wins.
    ///
    /// Returns `false` when the entity is unknown or already staged.
    pub(crate) fn stage_removal(&mut self, id: EntityId, reason: RemovalReason) -> bool {
        if !self.entries.contains_key(&id) || self.is_pending_removal(id) {
            return false;
        }
        self.pending_removals.push((id, reason));
        true
    }

    /// Removes every staged entity, reporting each removal in staging order.
    pub(crate) fn flush_removals(&mut self, out_events: &mut Vec<Event>) -> Vec<EntityId> {
        let pending = std::mem::take(&mut self.pending_removals);
        let mut removed = Vec::with_capacity(pending.len());
        for (id, reason) in pending {
            let Some(entity) = self.entries.remove(&id) else {
                continue;
            };
            if let Some(count) = self.counts.get_mut(&entity.kind) {
                *count = count.saturating_sub(1);
            }
            out_events.push(Event::EntityRemoved {
                id,
                kind: entity.kind,
                reason,
            });
            removed.push(id);
        }
        removed
    }

    /// Number of live entities of the provided kind.
    pub(crate) fn count(&self, kind: EntityKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Aggregated counts used by the level phase controller.
    pub(crate) fn live_counts(&self) -> LiveCounts {
        let mut counts = LiveCounts::default();
        for (kind, count) in &self.counts {
            match kind.category() {
                EntityCategory::Threat => {
                    counts.threats += count;
                    if kind.is_attacker() {
                        counts.attackers += count;
                    }
                }
                EntityCategory::HostileProjectile => counts.hostile_projectiles += count,
                EntityCategory::Pickup => counts.pickups += count,
                EntityCategory::Player | EntityCategory::PlayerProjectile => {}
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(kind: EntityKind) -> EntitySeed {
        EntitySeed {
            kind,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            motion: Motion::Linear,
            health: None,
            lifetime: None,
        }
    }

    #[test]
    fn registry_starts_empty_with_zero_identifier() {
        let registry = EntityRegistry::new();
        assert!(registry.entries.is_empty());
        assert_eq!(registry.next_entity_id.get(), 0);
        assert_eq!(registry.live_counts(), LiveCounts::default());
    }

    #[test]
    fn counts_follow_inserts_and_flushes() {
        let mut registry = EntityRegistry::new();
        let alien = registry.insert(seed(EntityKind::AlienNormal));
        let _ = registry.insert(seed(EntityKind::AsteroidLarge));
        let _ = registry.insert(seed(EntityKind::AlienBullet));

        let counts = registry.live_counts();
        assert_eq!(counts.attackers, 1);
        assert_eq!(counts.threats, 2);
        assert_eq!(counts.hostile_projectiles, 1);

        assert!(registry.stage_removal(alien, RemovalReason::Killed));
        assert_eq!(registry.count(EntityKind::AlienNormal), 1);

        let mut events = Vec::new();
        let removed = registry.flush_removals(&mut events);
        assert_eq!(removed, vec![alien]);
        assert_eq!(registry.count(EntityKind::AlienNormal), 0);
        assert_eq!(
            events,
            vec![Event::EntityRemoved {
                id: alien,
                kind: EntityKind::AlienNormal,
                reason: RemovalReason::Killed,
            }]
        );
    }

    #[test]
    fn first_staged_reason_wins() {
        let mut registry = EntityRegistry::new();
        let laser = registry.insert(seed(EntityKind::Laser));

        assert!(registry.stage_removal(laser, RemovalReason::Consumed));
        assert!(!registry.stage_removal(laser, RemovalReason::Expired));
        assert!(!registry.stage_removal(EntityId::new(99), RemovalReason::Expired));

        let mut events = Vec::new();
        let _ = registry.flush_removals(&mut events);
        assert!(matches!(
            events.as_slice(),
            [Event::EntityRemoved {
                reason: RemovalReason::Consumed,
                ..
            }]
        ));
    }
}
