#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns circle overlaps into damage, contact and pickup commands.

use std::collections::BTreeSet;

use starfall_core::{
    Command, EntityCategory, EntityId, EntityKind, EntitySnapshot, EntityView, LevelPhase,
};

/// Damage values applied when contacts are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    laser_damage: u32,
    missile_damage: u32,
    missile_boss_damage: u32,
    hostile_shot_damage: u32,
}

impl Config {
    /// Creates a damage table.
    #[must_use]
    pub const fn new(
        laser_damage: u32,
        missile_damage: u32,
        missile_boss_damage: u32,
        hostile_shot_damage: u32,
    ) -> Self {
        Self {
            laser_damage,
            missile_damage,
            missile_boss_damage,
            hostile_shot_damage,
        }
    }

    fn projectile_damage(&self, projectile: EntityKind, target: EntityKind) -> u32 {
        match (projectile, target) {
            (EntityKind::Missile, EntityKind::Boss) => self.missile_boss_damage,
            (EntityKind::Missile, _) => self.missile_damage,
            _ => self.laser_damage,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1, 999, 10, 1)
    }
}

/// Collision system that reports each overlapping pair once, when it begins.
#[derive(Debug, Default)]
pub struct Collision {
    config: Config,
    touching: BTreeSet<(EntityId, EntityId)>,
    touching_scratch: BTreeSet<(EntityId, EntityId)>,
    spent: BTreeSet<EntityId>,
    player_shots: Vec<EntitySnapshot>,
    threats: Vec<EntitySnapshot>,
}

impl Collision {
    /// Creates a new collision system with empty contact memory.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Resolves contacts for the provided snapshot.
    ///
    /// Projectiles are spent on their first hit within a pass. Pairs that keep
    /// overlapping across passes are not reported again.
    pub fn handle(&mut self, phase: LevelPhase, entities: &EntityView, out: &mut Vec<Command>) {
        self.touching_scratch.clear();
        self.spent.clear();
        self.player_shots.clear();
        self.threats.clear();

        if phase.is_terminal() {
            self.touching.clear();
            return;
        }

        for snapshot in entities.iter() {
            match snapshot.kind.category() {
                EntityCategory::PlayerProjectile => self.player_shots.push(snapshot.clone()),
                EntityCategory::Threat => self.threats.push(snapshot.clone()),
                _ => {}
            }
        }

        self.resolve_player_shots(out);
        if let Some(player) = entities.player() {
            self.resolve_player(player, entities, out);
        }

        std::mem::swap(&mut self.touching, &mut self.touching_scratch);
    }

    fn resolve_player_shots(&mut self, out: &mut Vec<Command>) {
        for shot in &self.player_shots {
            for threat in &self.threats {
                if !overlaps(shot, threat) {
                    continue;
                }
                let pair = (shot.id, threat.id);
                let _ = self.touching_scratch.insert(pair);
                if self.touching.contains(&pair) || self.spent.contains(&shot.id) {
                    continue;
                }

                let _ = self.spent.insert(shot.id);
                out.push(Command::ConsumeProjectile { projectile: shot.id });
                out.push(Command::ApplyDamage {
                    target: threat.id,
                    amount: self.config.projectile_damage(shot.kind, threat.kind),
                });
            }
        }
    }

    fn resolve_player(
        &mut self,
        player: &EntitySnapshot,
        entities: &EntityView,
        out: &mut Vec<Command>,
    ) {
        for other in entities.iter() {
            if other.id == player.id || !overlaps(player, other) {
                continue;
            }
            let pair = (player.id, other.id);
            let _ = self.touching_scratch.insert(pair);
            if self.touching.contains(&pair) {
                continue;
            }

            match other.kind.category() {
                EntityCategory::Threat => out.push(Command::PlayerContact { threat: other.id }),
                EntityCategory::HostileProjectile => {
                    out.push(Command::ConsumeProjectile {
                        projectile: other.id,
                    });
                    out.push(Command::ApplyDamage {
                        target: player.id,
                        amount: self.config.hostile_shot_damage,
                    });
                }
                EntityCategory::Pickup => out.push(Command::CollectPickup { pickup: other.id }),
                EntityCategory::Player | EntityCategory::PlayerProjectile => {}
            }
        }
    }
}

fn overlaps(a: &EntitySnapshot, b: &EntitySnapshot) -> bool {
    let reach = a.radius + b.radius;
    a.position.distance_squared(b.position) < reach * reach
}
