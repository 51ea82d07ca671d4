#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Starfall.

mod health;
mod lifecycle;
mod motion;
mod registry;

use std::time::Duration;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use starfall_core::{
    BossPatrol, Command, Currency, DeathCause, EntityCategory, EntityId, EntityKind, Event,
    ExitTarget, LevelId, LevelOutcome, LevelPhase, Loadout, Playfield, RemovalReason,
    SessionRewards, WELCOME_BANNER,
};
use tracing::{debug, info, warn};

pub use health::{DamageOutcome, Health};

use lifecycle::Offspring;
use motion::{Motion, MotionContext};
use registry::{EntityRegistry, EntitySeed};

/// Height above the bottom edge at which the player's ship appears.
const PLAYER_SPAWN_RISE: f32 = 1.5;
const PLAYER_SPEED: f32 = 7.0;

const ASTEROID_FALL_SPEED: f32 = 5.0;
const ALIEN_DESCENT_SPEED: f32 = 2.0;
const ALIEN_ZIGZAG_AMPLITUDE: f32 = 1.5;
const ALIEN_ZIGZAG_FREQUENCY: f32 = 1.5;
const ALIEN_EDGE_PADDING: f32 = 0.3;
const ALIEN_HEALTH: u32 = 3;

const PICKUP_FALL_SPEED: f32 = 1.5;
const PICKUP_DRAG: f32 = 2.0;

const LASER_LIFETIME: Duration = Duration::from_secs(3);
const MISSILE_LIFETIME: Duration = Duration::from_secs(4);
const ALIEN_BULLET_LIFETIME: Duration = Duration::from_secs(5);

/// Damage a threat deals to the player when the two collide.
const CONTACT_DAMAGE: u32 = 1;

/// Authoritative simulation state for a single level run.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    level: LevelId,
    playfield: Playfield,
    phase: LevelPhase,
    frozen: bool,
    resolution: Option<(LevelOutcome, ExitTarget)>,
    registry: EntityRegistry,
    player: Option<EntityId>,
    steer: Vec2,
    session: SessionRewards,
    committed: SessionRewards,
    rng: ChaCha8Rng,
    elapsed: Duration,
}

impl World {
    /// Creates a new Starfall world prepared for the asteroid field.
    #[must_use]
    pub fn new() -> Self {
        let mut world = Self {
            banner: WELCOME_BANNER,
            level: LevelId::AsteroidField,
            playfield: Playfield::default(),
            phase: LevelPhase::Active,
            frozen: false,
            resolution: None,
            registry: EntityRegistry::new(),
            player: None,
            steer: Vec2::ZERO,
            session: SessionRewards::default(),
            committed: SessionRewards::default(),
            rng: ChaCha8Rng::seed_from_u64(0),
            elapsed: Duration::ZERO,
        };
        let mut discarded = Vec::new();
        world.spawn_player(Loadout::default(), &mut discarded);
        world
    }

    fn reset(&mut self, level: LevelId, playfield: Playfield, seed: u64) {
        self.level = level;
        self.playfield = playfield;
        self.phase = LevelPhase::Active;
        self.frozen = false;
        self.resolution = None;
        self.registry.clear();
        self.player = None;
        self.steer = Vec2::ZERO;
        self.session = SessionRewards::default();
        self.committed = SessionRewards::default();
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self.elapsed = Duration::ZERO;
    }

    fn spawn_player(&mut self, loadout: Loadout, out_events: &mut Vec<Event>) {
        let position = Vec2::new(
            self.playfield.center().x,
            self.playfield.bottom() + PLAYER_SPAWN_RISE,
        );
        let id = self.insert(
            EntitySeed {
                kind: EntityKind::Player,
                position,
                velocity: Vec2::ZERO,
                motion: Motion::Steered {
                    speed: PLAYER_SPEED,
                },
                health: Some(Health::with_shield(loadout.lives, loadout.shields)),
                lifetime: None,
            },
            out_events,
        );
        self.player = Some(id);
    }

    fn insert(&mut self, seed: EntitySeed, out_events: &mut Vec<Event>) -> EntityId {
        let kind = seed.kind;
        let position = seed.position;
        let id = self.registry.insert(seed);
        debug!(id = id.get(), ?kind, x = position.x, y = position.y, "entity spawned");
        out_events.push(Event::EntitySpawned { id, kind, position });
        id
    }

    fn spawn_offspring(&mut self, offspring: Offspring, out_events: &mut Vec<Event>) {
        let seed = match offspring.kind.category() {
            EntityCategory::Pickup => EntitySeed {
                kind: offspring.kind,
                position: offspring.position,
                velocity: offspring.velocity,
                motion: Motion::Drift {
                    fall_speed: PICKUP_FALL_SPEED,
                    drag: PICKUP_DRAG,
                },
                health: None,
                lifetime: None,
            },
            _ => EntitySeed {
                kind: offspring.kind,
                position: offspring.position,
                velocity: offspring.velocity,
                motion: Motion::Linear,
                health: Some(Health::new(threat_health(offspring.kind))),
                lifetime: None,
            },
        };
        let _ = self.insert(seed, out_events);
    }

    /// Reports whether entities may still be created.
    fn accepts_spawns(&self) -> bool {
        !self.frozen && !self.phase.is_terminal()
    }

    /// Kills a damageable entity, emitting its death and staging its side effects.
    fn kill(&mut self, id: EntityId, cause: DeathCause, out_events: &mut Vec<Event>) {
        let Some(entity) = self.registry.get(id) else {
            return;
        };
        let kind = entity.kind;
        let position = entity.position;

        out_events.push(Event::Died {
            id,
            kind,
            position,
            cause,
        });
        let _ = self.registry.stage_removal(id, RemovalReason::Killed);
        if self.player == Some(id) {
            info!("player destroyed");
            self.player = None;
            return;
        }
        debug!(id = id.get(), ?kind, ?cause, "threat destroyed");

        let mut offspring = Vec::new();
        if cause == DeathCause::Damage {
            offspring.extend(lifecycle::split_children(kind, position, ASTEROID_FALL_SPEED));
        }
        offspring.extend(lifecycle::reward_drops(kind, position, &mut self.rng));
        for child in offspring {
            self.spawn_offspring(child, out_events);
        }
    }

    /// Routes a hit through the target's health and reports the outcome.
    fn damage(&mut self, target: EntityId, amount: u32, out_events: &mut Vec<Event>) {
        let Some(entity) = self.registry.get_mut(target) else {
            warn!(target = target.get(), "damage aimed at unknown entity");
            return;
        };
        let kind = entity.kind;
        let Some(health) = entity.health.as_mut() else {
            warn!(target = target.get(), ?kind, "damage aimed at non-damageable entity");
            return;
        };

        match health.apply_damage(amount) {
            DamageOutcome::Ignored => {
                debug!(target = target.get(), amount, "damage ignored");
            }
            DamageOutcome::ShieldAbsorbed { remaining } => {
                out_events.push(Event::ShieldAbsorbed {
                    id: target,
                    remaining,
                });
            }
            DamageOutcome::Damaged { remaining } => {
                out_events.push(Event::Damaged {
                    id: target,
                    kind,
                    remaining,
                });
            }
            DamageOutcome::Died => self.kill(target, DeathCause::Damage, out_events),
        }
    }

    fn advance(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        let context = MotionContext {
            playfield: self.playfield,
            steer: self.steer,
        };
        let floor = self.playfield.despawn_floor();
        let mut departures = Vec::new();

        for entity in self.registry.iter_mut() {
            entity
                .motion
                .advance(&mut entity.position, &mut entity.velocity, seconds, &context);
            entity.age = entity.age.saturating_add(dt);

            if entity.lifetime.is_some_and(|lifetime| entity.age >= lifetime) {
                departures.push((entity.id, RemovalReason::Expired));
            } else if entity.kind != EntityKind::Player && entity.position.y < floor {
                departures.push((entity.id, RemovalReason::OffScreen));
            }
        }

        for (id, reason) in departures {
            let _ = self.registry.stage_removal(id, reason);
        }
    }

    fn clear_hostiles(&mut self) {
        let doomed: Vec<EntityId> = self
            .registry
            .iter()
            .filter(|entity| {
                matches!(
                    entity.kind.category(),
                    EntityCategory::Threat
                        | EntityCategory::HostileProjectile
                        | EntityCategory::Pickup
                )
            })
            .map(|entity| entity.id)
            .collect();
        for id in doomed {
            let _ = self.registry.stage_removal(id, RemovalReason::Cleared);
        }
    }

    fn flush(&mut self, out_events: &mut Vec<Event>) {
        let removed = self.registry.flush_removals(out_events);
        if let Some(player) = self.player {
            if removed.contains(&player) {
                self.player = None;
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureLevel {
            level,
            playfield,
            loadout,
            seed,
        } => {
            world.reset(level, playfield, seed);
            info!(level = level.number(), lives = loadout.lives, shields = loadout.shields, "level configured");
            out_events.push(Event::LevelConfigured { level });
            world.spawn_player(loadout, out_events);
        }
        Command::Tick { dt } => {
            world.elapsed = world.elapsed.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            if world.frozen || world.phase.is_terminal() {
                return;
            }
            world.advance(dt);
        }
        Command::SpawnThreat { kind, position } => {
            if kind.category() != EntityCategory::Threat || kind == EntityKind::Boss {
                warn!(?kind, "spawn threat request for unsupported kind");
                return;
            }
            if !world.accepts_spawns() {
                debug!(?kind, "spawn skipped while the world is halted");
                return;
            }
            let seed = threat_seed(kind, position, world.playfield.center().x);
            let _ = world.insert(seed, out_events);
        }
        Command::SpawnBoss {
            position,
            patrol,
            max_health,
        } => {
            if !world.accepts_spawns() {
                debug!("boss spawn skipped while the world is halted");
                return;
            }
            let seed = boss_seed(position, patrol, max_health);
            let _ = world.insert(seed, out_events);
        }
        Command::FireProjectile {
            owner,
            kind,
            origin,
            velocity,
        } => {
            let lifetime = match kind {
                EntityKind::Laser => LASER_LIFETIME,
                EntityKind::Missile => MISSILE_LIFETIME,
                EntityKind::AlienBullet => ALIEN_BULLET_LIFETIME,
                _ => {
                    warn!(?kind, "fire request for non-projectile kind");
                    return;
                }
            };
            if !world.accepts_spawns() {
                debug!(owner = owner.get(), ?kind, "shot skipped while the world is halted");
                return;
            }
            debug!(owner = owner.get(), ?kind, "projectile fired");
            let _ = world.insert(
                EntitySeed {
                    kind,
                    position: origin,
                    velocity,
                    motion: Motion::Linear,
                    health: None,
                    lifetime: Some(lifetime),
                },
                out_events,
            );
        }
        Command::SteerPlayer { direction } => {
            world.steer = direction;
        }
        Command::ApplyDamage { target, amount } => {
            world.damage(target, amount, out_events);
        }
        Command::PlayerContact { threat } => {
            let Some(entity) = world.registry.get(threat) else {
                warn!(threat = threat.get(), "contact with unknown threat");
                return;
            };
            if entity.kind.category() != EntityCategory::Threat {
                warn!(threat = threat.get(), kind = ?entity.kind, "contact with non-threat entity");
                return;
            }
            if world.registry.is_pending_removal(threat) {
                debug!(threat = threat.get(), "contact with a threat already leaving");
                return;
            }
            let survives = entity.kind == EntityKind::Boss;

            match world.player {
                Some(player) => world.damage(player, CONTACT_DAMAGE, out_events),
                None => debug!(threat = threat.get(), "contact without a live player"),
            }
            if !survives {
                world.kill(threat, DeathCause::Contact, out_events);
            }
        }
        Command::CollectPickup { pickup } => {
            let Some(entity) = world.registry.get(pickup) else {
                warn!(pickup = pickup.get(), "collect request for unknown pickup");
                return;
            };
            let Some((currency, amount)) = entity.kind.reward() else {
                warn!(pickup = pickup.get(), kind = ?entity.kind, "collect request for non-pickup");
                return;
            };
            if !world.registry.stage_removal(pickup, RemovalReason::Collected) {
                debug!(pickup = pickup.get(), "pickup already collected");
                return;
            }
            let session_total = match currency {
                Currency::Shards => {
                    world.session.shards = world.session.shards.saturating_add(amount);
                    world.session.shards
                }
                Currency::Goo => {
                    world.session.goo = world.session.goo.saturating_add(amount);
                    world.session.goo
                }
            };
            debug!(?currency, amount, session_total, "reward collected");
            out_events.push(Event::RewardCollected {
                currency,
                amount,
                session_total,
            });
        }
        Command::ConsumeProjectile { projectile } => {
            let Some(entity) = world.registry.get(projectile) else {
                debug!(projectile = projectile.get(), "consume request for unknown projectile");
                return;
            };
            if !matches!(
                entity.kind.category(),
                EntityCategory::PlayerProjectile | EntityCategory::HostileProjectile
            ) {
                warn!(projectile = projectile.get(), kind = ?entity.kind, "consume request for non-projectile");
                return;
            }
            let _ = world
                .registry
                .stage_removal(projectile, RemovalReason::Consumed);
        }
        Command::EnterPhase { phase } => {
            if phase.is_terminal() {
                warn!("resolution must go through ResolveLevel");
                return;
            }
            if phase <= world.phase {
                debug!(from = ?world.phase, to = ?phase, "phase change ignored");
                return;
            }
            let from = world.phase;
            world.phase = phase;
            info!(?from, to = ?phase, "phase changed");
            out_events.push(Event::PhaseChanged { from, to: phase });
        }
        Command::RemoveThreatsAbove { y } => {
            let doomed: Vec<EntityId> = world
                .registry
                .iter()
                .filter(|entity| {
                    entity.kind.category() == EntityCategory::Threat
                        && entity.kind != EntityKind::Boss
                        && entity.position.y > y
                })
                .map(|entity| entity.id)
                .collect();
            for id in doomed {
                let _ = world.registry.stage_removal(id, RemovalReason::Cleared);
            }
        }
        Command::FreezeWorld => {
            if world.frozen {
                debug!("world already frozen");
                return;
            }
            world.frozen = true;
            world.steer = Vec2::ZERO;
            world.clear_hostiles();
            info!("world frozen");
            out_events.push(Event::WorldFrozen);
        }
        Command::CommitRewards => {
            let shards = world.session.shards.saturating_sub(world.committed.shards);
            let goo = world.session.goo.saturating_sub(world.committed.goo);
            world.committed = world.session;
            info!(shards, goo, "rewards committed");
            out_events.push(Event::RewardsCommitted {
                level: world.level,
                shards,
                goo,
            });
        }
        Command::ResolveLevel { outcome, exit } => {
            if let Some((latched, _)) = world.resolution {
                debug!(?latched, ?outcome, "level already resolved");
                return;
            }
            world.resolution = Some((outcome, exit));
            let from = world.phase;
            world.phase = LevelPhase::Resolved;
            info!(level = world.level.number(), ?outcome, ?exit, "level resolved");
            out_events.push(Event::PhaseChanged {
                from,
                to: LevelPhase::Resolved,
            });
            out_events.push(Event::LevelResolved {
                level: world.level,
                outcome,
                exit,
            });
        }
    }

    world.flush(out_events);
}

fn threat_health(kind: EntityKind) -> u32 {
    match kind {
        EntityKind::AsteroidSmall => 1,
        EntityKind::AsteroidMedium => 2,
        EntityKind::AsteroidLarge => 3,
        _ => ALIEN_HEALTH,
    }
}

/// Aliens sway around the playfield's centre column, not their spawn column.
fn threat_seed(kind: EntityKind, position: Vec2, sway_center_x: f32) -> EntitySeed {
    let (velocity, motion) = match kind {
        EntityKind::AlienNormal | EntityKind::AlienRare => (
            Vec2::new(0.0, -ALIEN_DESCENT_SPEED),
            Motion::Zigzag {
                center_x: sway_center_x,
                amplitude: ALIEN_ZIGZAG_AMPLITUDE,
                frequency: ALIEN_ZIGZAG_FREQUENCY,
                padding: ALIEN_EDGE_PADDING,
                descent: ALIEN_DESCENT_SPEED,
                elapsed: 0.0,
            },
        ),
        _ => (Vec2::new(0.0, -ASTEROID_FALL_SPEED), Motion::Linear),
    };
    EntitySeed {
        kind,
        position,
        velocity,
        motion,
        health: Some(Health::new(threat_health(kind))),
        lifetime: None,
    }
}

fn boss_seed(position: Vec2, patrol: BossPatrol, max_health: u32) -> EntitySeed {
    let position = Vec2::new(position.x, patrol.y);
    EntitySeed {
        kind: EntityKind::Boss,
        position,
        velocity: Vec2::new(patrol.speed, 0.0),
        motion: Motion::Patrol {
            left: patrol.left,
            right: patrol.right,
            y: patrol.y,
            speed: patrol.speed,
            heading: 1.0,
        },
        health: Some(Health::new(max_health)),
        lifetime: None,
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use starfall_core::{
        EntityId, EntityKind, EntitySnapshot, EntityView, ExitTarget, HealthSnapshot, LevelId,
        LevelOutcome, LevelPhase, LiveCounts, Playfield, SessionRewards,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Level the world is currently configured for.
    #[must_use]
    pub fn level(world: &World) -> LevelId {
        world.level
    }

    /// Current level phase.
    #[must_use]
    pub fn phase(world: &World) -> LevelPhase {
        world.phase
    }

    /// Visible play area.
    #[must_use]
    pub fn playfield(world: &World) -> &Playfield {
        &world.playfield
    }

    /// Reports whether motion has been halted by a freeze.
    #[must_use]
    pub fn is_frozen(world: &World) -> bool {
        world.frozen
    }

    /// Terminal outcome latched by the first resolution request.
    #[must_use]
    pub fn resolution(world: &World) -> Option<(LevelOutcome, ExitTarget)> {
        world.resolution
    }

    /// Simulated time elapsed since the level was configured.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.elapsed
    }

    /// Captures a read-only view of every live entity.
    #[must_use]
    pub fn entity_view(world: &World) -> EntityView {
        let snapshots = world
            .registry
            .iter()
            .map(|entity| EntitySnapshot {
                id: entity.id,
                kind: entity.kind,
                position: entity.position,
                velocity: entity.velocity,
                radius: entity.kind.half_extent(),
                health: entity.health.map(|health| health.snapshot()),
            })
            .collect();
        EntityView::from_snapshots(snapshots)
    }

    /// Live entity counts grouped for phase polling.
    #[must_use]
    pub fn live_counts(world: &World) -> LiveCounts {
        world.registry.live_counts()
    }

    /// Number of live entities of a specific kind.
    #[must_use]
    pub fn count(world: &World, kind: EntityKind) -> u32 {
        world.registry.count(kind)
    }

    /// Identifier of the player's ship while it is alive.
    #[must_use]
    pub fn player(world: &World) -> Option<EntityId> {
        world.player
    }

    /// Health of the player's ship while it is alive.
    #[must_use]
    pub fn player_health(world: &World) -> Option<HealthSnapshot> {
        let player = world.player?;
        world
            .registry
            .get(player)
            .and_then(|entity| entity.health)
            .map(|health| health.snapshot())
    }

    /// Currency collected since the level was configured.
    #[must_use]
    pub fn session_rewards(world: &World) -> SessionRewards {
        world.session
    }

    /// Portion of the session currency already moved to the committed ledger.
    #[must_use]
    pub fn committed_rewards(world: &World) -> SessionRewards {
        world.committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(level: LevelId, loadout: Loadout) -> (World, Vec<Event>) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureLevel {
                level,
                playfield: Playfield::default(),
                loadout,
                seed: 7,
            },
            &mut events,
        );
        (world, events)
    }

    fn spawned_id(events: &[Event], wanted: EntityKind) -> EntityId {
        events
            .iter()
            .rev()
            .find_map(|event| match event {
                Event::EntitySpawned { id, kind, .. } if *kind == wanted => Some(*id),
                _ => None,
            })
            .expect("entity spawned")
    }

    #[test]
    fn configure_level_spawns_the_player() {
        let (world, events) = configured(LevelId::AlienFront, Loadout { lives: 3, shields: 2 });

        assert_eq!(events[0], Event::LevelConfigured { level: LevelId::AlienFront });
        assert!(query::player(&world).is_some());
        assert_eq!(
            query::player_health(&world),
            Some(starfall_core::HealthSnapshot {
                current: 3,
                max: 3,
                shield: 2,
            })
        );
        assert_eq!(query::phase(&world), LevelPhase::Active);
    }

    #[test]
    fn destroying_large_asteroid_spawns_two_mediums_and_shards() {
        let (mut world, _) = configured(LevelId::AsteroidField, Loadout::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnThreat {
                kind: EntityKind::AsteroidLarge,
                position: Vec2::new(0.0, 3.0),
            },
            &mut events,
        );
        let asteroid = spawned_id(&events, EntityKind::AsteroidLarge);

        events.clear();
        apply(
            &mut world,
            Command::ApplyDamage {
                target: asteroid,
                amount: 999,
            },
            &mut events,
        );

        let deaths = events
            .iter()
            .filter(|event| matches!(event, Event::Died { .. }))
            .count();
        assert_eq!(deaths, 1);
        assert_eq!(query::count(&world, EntityKind::AsteroidMedium), 2);
        let shards = query::count(&world, EntityKind::Shard);
        assert!((3..=6).contains(&shards));
        assert_eq!(query::count(&world, EntityKind::AsteroidLarge), 0);
        assert!(matches!(
            events.last(),
            Some(Event::EntityRemoved {
                reason: RemovalReason::Killed,
                ..
            })
        ));
    }

    #[test]
    fn damage_after_death_is_ignored() {
        let (mut world, _) = configured(LevelId::AsteroidField, Loadout::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnThreat {
                kind: EntityKind::AsteroidSmall,
                position: Vec2::new(0.0, 3.0),
            },
            &mut events,
        );
        let asteroid = spawned_id(&events, EntityKind::AsteroidSmall);

        events.clear();
        apply(
            &mut world,
            Command::ApplyDamage {
                target: asteroid,
                amount: 1,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ApplyDamage {
                target: asteroid,
                amount: 1,
            },
            &mut events,
        );

        let deaths = events
            .iter()
            .filter(|event| matches!(event, Event::Died { .. }))
            .count();
        assert_eq!(deaths, 1);
    }

    #[test]
    fn contact_kills_threat_without_splitting() {
        let (mut world, _) = configured(LevelId::AsteroidField, Loadout::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnThreat {
                kind: EntityKind::AsteroidLarge,
                position: Vec2::new(0.0, -3.0),
            },
            &mut events,
        );
        let asteroid = spawned_id(&events, EntityKind::AsteroidLarge);

        events.clear();
        apply(&mut world, Command::PlayerContact { threat: asteroid }, &mut events);

        assert!(events.iter().any(|event| matches!(
            event,
            Event::Died {
                cause: DeathCause::Contact,
                ..
            }
        )));
        assert_eq!(query::count(&world, EntityKind::AsteroidMedium), 0);
        assert!(query::count(&world, EntityKind::Shard) >= 3);
        assert_eq!(query::player_health(&world).map(|health| health.current), Some(2));
    }

    #[test]
    fn boss_survives_player_contact() {
        let (mut world, _) = configured(LevelId::AlienFront, Loadout::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnBoss {
                position: Vec2::new(0.0, 4.0),
                patrol: BossPatrol::default(),
                max_health: 100,
            },
            &mut events,
        );
        let boss = spawned_id(&events, EntityKind::Boss);

        apply(&mut world, Command::PlayerContact { threat: boss }, &mut events);

        assert_eq!(query::count(&world, EntityKind::Boss), 1);
        assert_eq!(query::player_health(&world).map(|health| health.current), Some(2));
    }

    #[test]
    fn threats_below_the_floor_leave_without_dying() {
        let (mut world, _) = configured(LevelId::AsteroidField, Loadout::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnThreat {
                kind: EntityKind::AsteroidLarge,
                position: Vec2::new(0.0, -5.9),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );

        assert!(events.iter().any(|event| matches!(
            event,
            Event::EntityRemoved {
                reason: RemovalReason::OffScreen,
                ..
            }
        )));
        assert!(!events.iter().any(|event| matches!(event, Event::Died { .. })));
        assert_eq!(query::count(&world, EntityKind::AsteroidMedium), 0);
    }

    #[test]
    fn projectiles_expire_after_their_lifetime() {
        let (mut world, _) = configured(LevelId::AsteroidField, Loadout::default());
        let mut events = Vec::new();
        let owner = query::player(&world).expect("player");
        apply(
            &mut world,
            Command::FireProjectile {
                owner,
                kind: EntityKind::Laser,
                origin: Vec2::ZERO,
                velocity: Vec2::ZERO,
            },
            &mut events,
        );

        events.clear();
        for _ in 0..29 {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(100),
                },
                &mut events,
            );
        }
        assert_eq!(query::count(&world, EntityKind::Laser), 1);

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        assert_eq!(query::count(&world, EntityKind::Laser), 0);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::EntityRemoved {
                reason: RemovalReason::Expired,
                ..
            }
        )));
    }

    #[test]
    fn commit_rewards_only_moves_the_uncommitted_delta() {
        let (mut world, _) = configured(LevelId::AlienFront, Loadout::default());
        world.session = SessionRewards { shards: 4, goo: 5 };
        let mut events = Vec::new();

        apply(&mut world, Command::CommitRewards, &mut events);
        apply(&mut world, Command::CommitRewards, &mut events);

        assert_eq!(
            events,
            vec![
                Event::RewardsCommitted {
                    level: LevelId::AlienFront,
                    shards: 4,
                    goo: 5,
                },
                Event::RewardsCommitted {
                    level: LevelId::AlienFront,
                    shards: 0,
                    goo: 0,
                },
            ]
        );
    }

    #[test]
    fn resolution_is_latched() {
        let (mut world, _) = configured(LevelId::AlienFront, Loadout::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ResolveLevel {
                outcome: LevelOutcome::GameOver,
                exit: ExitTarget::MainMenu,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::ResolveLevel {
                outcome: LevelOutcome::BossDefeated,
                exit: ExitTarget::Summary,
            },
            &mut events,
        );

        let resolutions = events
            .iter()
            .filter(|event| matches!(event, Event::LevelResolved { .. }))
            .count();
        assert_eq!(resolutions, 1);
        assert_eq!(
            query::resolution(&world),
            Some((LevelOutcome::GameOver, ExitTarget::MainMenu))
        );
        assert_eq!(query::phase(&world), LevelPhase::Resolved);
    }

    #[test]
    fn phases_never_move_backwards() {
        let (mut world, _) = configured(LevelId::AlienFront, Loadout::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::EnterPhase {
                phase: LevelPhase::Transition,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::EnterPhase {
                phase: LevelPhase::AwaitingClear,
            },
            &mut events,
        );

        assert_eq!(query::phase(&world), LevelPhase::Transition);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn aliens_sway_around_the_playfield_centre() {
        let (mut world, _) = configured(LevelId::AlienFront, Loadout::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnThreat {
                kind: EntityKind::AlienNormal,
                position: Vec2::new(2.5, 4.0),
            },
            &mut events,
        );

        // Two thirds of a second puts the sway back at its zero crossing.
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(666),
            },
            &mut events,
        );

        let alien = query::entity_view(&world)
            .iter()
            .find(|entity| entity.kind == EntityKind::AlienNormal)
            .map(|entity| entity.position)
            .expect("alien alive");
        assert!(alien.x.abs() < 0.01, "{alien:?}");
        assert!((alien.y - (4.0 - 2.0 * 0.666)).abs() < 1e-3);
    }

    #[test]
    fn freeze_clears_hostiles_and_halts_motion() {
        let (mut world, _) = configured(LevelId::AlienFront, Loadout::default());
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnThreat {
                kind: EntityKind::AlienNormal,
                position: Vec2::new(0.0, 3.0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SteerPlayer {
                direction: Vec2::new(1.0, 0.0),
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::FreezeWorld, &mut events);
        assert!(events.contains(&Event::WorldFrozen));
        assert_eq!(query::live_counts(&world).threats, 0);

        let before = query::entity_view(&world).player().map(|player| player.position);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );
        let after = query::entity_view(&world).player().map(|player| player.position);
        assert_eq!(before, after);
    }

    #[test]
    fn collecting_goo_adds_to_session_total() {
        let (mut world, _) = configured(LevelId::AlienFront, Loadout::default());
        let mut events = Vec::new();
        world.spawn_offspring(
            Offspring {
                kind: EntityKind::Goo,
                position: Vec2::ZERO,
                velocity: Vec2::ZERO,
            },
            &mut events,
        );
        let goo = spawned_id(&events, EntityKind::Goo);

        events.clear();
        apply(&mut world, Command::CollectPickup { pickup: goo }, &mut events);
        apply(&mut world, Command::CollectPickup { pickup: goo }, &mut events);

        assert_eq!(query::session_rewards(&world).goo, 5);
        let collected = events
            .iter()
            .filter(|event| matches!(event, Event::RewardCollected { .. }))
            .count();
        assert_eq!(collected, 1);
    }

    #[test]
    fn unknown_targets_are_skipped() {
        let (mut world, _) = configured(LevelId::AsteroidField, Loadout::default());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ApplyDamage {
                target: EntityId::new(999),
                amount: 1,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::PlayerContact {
                threat: EntityId::new(999),
            },
            &mut events,
        );

        assert!(events.is_empty());
    }
}
