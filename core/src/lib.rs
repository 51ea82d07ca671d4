#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Starfall simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Starfall.";

/// Levels available in the campaign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LevelId {
    /// Timed asteroid field that resolves as soon as its clock runs out.
    AsteroidField,
    /// Alien front that leads into the boss encounter.
    AlienFront,
}

impl LevelId {
    /// Reports whether the level continues into a boss encounter after its timer.
    #[must_use]
    pub const fn has_boss(self) -> bool {
        matches!(self, Self::AlienFront)
    }

    /// One-based level number shown to players.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::AsteroidField => 1,
            Self::AlienFront => 2,
        }
    }

    /// Resolves a one-based level number.
    #[must_use]
    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::AsteroidField),
            2 => Some(Self::AlienFront),
            _ => None,
        }
    }
}

/// Named stage of level progression.
///
/// Phases only ever move forward in declaration order; `Resolved` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LevelPhase {
    /// Spawners run and the level clock counts down.
    Active,
    /// Spawning halted; waiting for remaining attackers and their shots to clear.
    AwaitingClear,
    /// Waiting for the player to choose between the boss and the exit.
    Transition,
    /// Boss entrance delay.
    BossIntro,
    /// Boss encounter in progress.
    BossFight,
    /// Level finished; no further transitions occur.
    Resolved,
}

impl LevelPhase {
    /// Reports whether the phase is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }

    /// Reports whether regular spawners may run during the phase.
    #[must_use]
    pub const fn allows_spawning(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Reports whether the player controls the ship during the phase.
    #[must_use]
    pub const fn allows_player_input(self) -> bool {
        matches!(
            self,
            Self::Active | Self::AwaitingClear | Self::BossIntro | Self::BossFight
        )
    }
}

/// Terminal result of a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelOutcome {
    /// The level clock expired on a level without a boss.
    Completed,
    /// The player ran out of lives.
    GameOver,
    /// The boss was destroyed.
    BossDefeated,
    /// The player declined the boss encounter.
    Retreated,
}

/// Navigation target requested when a level resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExitTarget {
    /// Post-level summary screen.
    Summary,
    /// Main menu.
    MainMenu,
}

/// Decision offered to the player during [`LevelPhase::Transition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionChoice {
    /// Proceed into the boss encounter.
    ContinueToBoss,
    /// Leave the level with the rewards collected so far.
    Return,
}

/// Broad grouping of entity kinds used for contact rules and counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityCategory {
    /// The player's ship.
    Player,
    /// Asteroids, aliens and the boss.
    Threat,
    /// Shots fired by the player.
    PlayerProjectile,
    /// Shots fired by aliens and the boss.
    HostileProjectile,
    /// Collectible currency drops.
    Pickup,
}

/// Concrete entity subtype.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// The player's ship.
    Player,
    /// Common purple alien.
    AlienNormal,
    /// Green alien that may drop goo.
    AlienRare,
    /// Smallest asteroid; never splits.
    AsteroidSmall,
    /// Mid-sized asteroid that splits into two small asteroids.
    AsteroidMedium,
    /// Largest asteroid; splits into two medium asteroids and drops shards.
    AsteroidLarge,
    /// Boss alien guarding the end of the alien front.
    Boss,
    /// Rapid-fire player shot.
    Laser,
    /// Heavy player shot.
    Missile,
    /// Shot fired by aliens and the boss.
    AlienBullet,
    /// Shard currency pickup.
    Shard,
    /// Goo currency pickup.
    Goo,
}

impl EntityKind {
    /// Category the kind belongs to.
    #[must_use]
    pub const fn category(self) -> EntityCategory {
        match self {
            Self::Player => EntityCategory::Player,
            Self::AlienNormal
            | Self::AlienRare
            | Self::AsteroidSmall
            | Self::AsteroidMedium
            | Self::AsteroidLarge
            | Self::Boss => EntityCategory::Threat,
            Self::Laser | Self::Missile => EntityCategory::PlayerProjectile,
            Self::AlienBullet => EntityCategory::HostileProjectile,
            Self::Shard | Self::Goo => EntityCategory::Pickup,
        }
    }

    /// Radius of the circle used for contact detection, in world units.
    #[must_use]
    pub const fn half_extent(self) -> f32 {
        match self {
            Self::Player => 0.4,
            Self::AlienNormal | Self::AlienRare => 0.4,
            Self::AsteroidSmall => 0.25,
            Self::AsteroidMedium => 0.45,
            Self::AsteroidLarge => 0.7,
            Self::Boss => 1.0,
            Self::Laser => 0.08,
            Self::Missile => 0.12,
            Self::AlienBullet => 0.1,
            Self::Shard => 0.15,
            Self::Goo => 0.2,
        }
    }

    /// Reports whether the kind runs attack schedules.
    #[must_use]
    pub const fn is_attacker(self) -> bool {
        matches!(self, Self::AlienNormal | Self::AlienRare | Self::Boss)
    }

    /// Kind produced twice when an entity of this kind is destroyed by damage.
    #[must_use]
    pub const fn split_into(self) -> Option<EntityKind> {
        match self {
            Self::AsteroidLarge => Some(Self::AsteroidMedium),
            Self::AsteroidMedium => Some(Self::AsteroidSmall),
            _ => None,
        }
    }

    /// Currency and amount granted when a pickup of this kind is collected.
    #[must_use]
    pub const fn reward(self) -> Option<(Currency, u32)> {
        match self {
            Self::Shard => Some((Currency::Shards, 1)),
            Self::Goo => Some((Currency::Goo, 5)),
            _ => None,
        }
    }
}

/// Collectible currencies that unlock permanent upgrades.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// Dropped by large asteroids.
    Shards,
    /// Dropped by rare aliens.
    Goo,
}

/// Reasons an entity leaves the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
    /// Destroyed after its health reached zero or by terminal contact.
    Killed,
    /// Crossed the despawn threshold outside the playfield.
    OffScreen,
    /// Projectile lifetime elapsed.
    Expired,
    /// Projectile spent on impact.
    Consumed,
    /// Pickup collected by the player.
    Collected,
    /// Forcibly removed by a phase transition.
    Cleared,
}

/// What ended an entity's life.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Hit points were depleted by damage.
    Damage,
    /// Rammed the player.
    Contact,
}

/// Unique identifier assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visible play area used for spawning, clamping and culling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Playfield {
    center: Vec2,
    half_width: f32,
    half_height: f32,
}

impl Playfield {
    /// Distance below the bottom edge at which entities are despawned.
    pub const DESPAWN_MARGIN: f32 = 1.0;

    /// Creates a playfield from its center and half extents.
    #[must_use]
    pub const fn new(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            center,
            half_width,
            half_height,
        }
    }

    /// Center of the visible area.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Half of the visible width.
    #[must_use]
    pub const fn half_width(&self) -> f32 {
        self.half_width
    }

    /// Half of the visible height.
    #[must_use]
    pub const fn half_height(&self) -> f32 {
        self.half_height
    }

    /// X coordinate of the left edge.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.center.x - self.half_width
    }

    /// X coordinate of the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.center.x + self.half_width
    }

    /// Y coordinate of the top edge.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.center.y + self.half_height
    }

    /// Y coordinate of the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.center.y - self.half_height
    }

    /// Entities whose vertical position drops below this value are despawned.
    #[must_use]
    pub fn despawn_floor(&self) -> f32 {
        self.bottom() - Self::DESPAWN_MARGIN
    }
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 3.3, 5.0)
    }
}

/// Horizontal patrol route flown by the boss.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BossPatrol {
    /// Leftmost x coordinate of the route.
    pub left: f32,
    /// Rightmost x coordinate of the route.
    pub right: f32,
    /// Fixed height of the route.
    pub y: f32,
    /// Horizontal speed in world units per second.
    pub speed: f32,
}

impl Default for BossPatrol {
    fn default() -> Self {
        Self {
            left: -2.0,
            right: 2.0,
            y: 4.0,
            speed: 2.0,
        }
    }
}

/// Player durability granted at level start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Loadout {
    /// Hit points (lives) the player starts with.
    pub lives: u32,
    /// Shield charges absorbing one hit each.
    pub shields: u32,
}

impl Default for Loadout {
    fn default() -> Self {
        Self {
            lives: 3,
            shields: 0,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Resets the world for a fresh run of the provided level.
    ConfigureLevel {
        /// Level to prepare.
        level: LevelId,
        /// Visible area of the level.
        playfield: Playfield,
        /// Player durability for the run.
        loadout: Loadout,
        /// Seed for drop rolls performed by the world.
        seed: u64,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that a threat enters the world.
    SpawnThreat {
        /// Threat variant to create.
        kind: EntityKind,
        /// Initial position.
        position: Vec2,
    },
    /// Requests that the boss enters the world.
    SpawnBoss {
        /// Initial position.
        position: Vec2,
        /// Route the boss patrols.
        patrol: BossPatrol,
        /// Hit points of the boss.
        max_health: u32,
    },
    /// Requests that a projectile is launched.
    FireProjectile {
        /// Entity that fired the projectile.
        owner: EntityId,
        /// Projectile variant.
        kind: EntityKind,
        /// Launch position.
        origin: Vec2,
        /// Launch velocity in world units per second.
        velocity: Vec2,
    },
    /// Sets the player's steering direction for subsequent ticks.
    SteerPlayer {
        /// Unnormalised direction; components are expected in `-1..=1`.
        direction: Vec2,
    },
    /// Applies damage to a damageable entity.
    ApplyDamage {
        /// Entity receiving the damage.
        target: EntityId,
        /// Damage amount; zero is ignored.
        amount: u32,
    },
    /// Resolves a threat ramming into the player.
    PlayerContact {
        /// Threat that touched the player.
        threat: EntityId,
    },
    /// Credits a pickup to the session and removes it.
    CollectPickup {
        /// Pickup that touched the player.
        pickup: EntityId,
    },
    /// Removes a projectile spent on impact.
    ConsumeProjectile {
        /// Projectile to remove.
        projectile: EntityId,
    },
    /// Advances the level to a later phase.
    EnterPhase {
        /// Phase to activate.
        phase: LevelPhase,
    },
    /// Removes threats (other than the boss) positioned above the provided height.
    RemoveThreatsAbove {
        /// Height threshold in world units.
        y: f32,
    },
    /// Halts all motion and clears hostile entities and pickups.
    FreezeWorld,
    /// Moves uncommitted session rewards into the committed ledger.
    CommitRewards,
    /// Resolves the level; only the first request takes effect.
    ResolveLevel {
        /// Terminal result of the level.
        outcome: LevelOutcome,
        /// Navigation target requested by the resolution.
        exit: ExitTarget,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the world was reset for a level.
    LevelConfigured {
        /// Level that was prepared.
        level: LevelId,
    },
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an entity entered the world.
    EntitySpawned {
        /// Identifier assigned to the entity.
        id: EntityId,
        /// Kind of the entity.
        kind: EntityKind,
        /// Position at spawn time.
        position: Vec2,
    },
    /// A shield charge absorbed a hit.
    ShieldAbsorbed {
        /// Entity whose shield absorbed the hit.
        id: EntityId,
        /// Shield charges left after the hit.
        remaining: u32,
    },
    /// Hit points were removed without killing the entity.
    Damaged {
        /// Entity that was damaged.
        id: EntityId,
        /// Kind of the damaged entity.
        kind: EntityKind,
        /// Hit points left after the hit.
        remaining: u32,
    },
    /// An entity died; emitted at most once per entity.
    Died {
        /// Entity that died.
        id: EntityId,
        /// Kind of the entity.
        kind: EntityKind,
        /// Position at the moment of death.
        position: Vec2,
        /// What ended the entity's life.
        cause: DeathCause,
    },
    /// An entity left the world.
    EntityRemoved {
        /// Entity that was removed.
        id: EntityId,
        /// Kind of the entity.
        kind: EntityKind,
        /// Why the entity was removed.
        reason: RemovalReason,
    },
    /// A pickup was credited to the session.
    RewardCollected {
        /// Currency that was collected.
        currency: Currency,
        /// Amount granted by the pickup.
        amount: u32,
        /// Session total for the currency after collection.
        session_total: u32,
    },
    /// The level moved to a new phase.
    PhaseChanged {
        /// Phase before the change.
        from: LevelPhase,
        /// Phase after the change.
        to: LevelPhase,
    },
    /// Motion stopped and hostile entities were cleared.
    WorldFrozen,
    /// Session rewards not yet committed were moved to the committed ledger.
    RewardsCommitted {
        /// Level the rewards were earned in.
        level: LevelId,
        /// Shards committed by this request.
        shards: u32,
        /// Goo committed by this request.
        goo: u32,
    },
    /// The level resolved; emitted exactly once per level.
    LevelResolved {
        /// Level that resolved.
        level: LevelId,
        /// Terminal result.
        outcome: LevelOutcome,
        /// Navigation target requested by the resolution.
        exit: ExitTarget,
    },
}

/// Immutable view of an entity's health.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthSnapshot {
    /// Current hit points.
    pub current: u32,
    /// Maximum hit points.
    pub max: u32,
    /// Remaining shield charges.
    pub shield: u32,
}

/// Immutable representation of a single entity used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct EntitySnapshot {
    /// Unique identifier assigned to the entity.
    pub id: EntityId,
    /// Kind of the entity.
    pub kind: EntityKind,
    /// Current position.
    pub position: Vec2,
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// Contact radius.
    pub radius: f32,
    /// Health of damageable entities.
    pub health: Option<HealthSnapshot>,
}

/// Read-only snapshot describing every live entity.
#[derive(Clone, Debug, Default)]
pub struct EntityView {
    snapshots: Vec<EntitySnapshot>,
}

impl EntityView {
    /// Creates a new entity view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EntitySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a specific entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntitySnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Snapshot of the player's ship, if it is alive.
    #[must_use]
    pub fn player(&self) -> Option<&EntitySnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.kind == EntityKind::Player)
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntitySnapshot> {
        self.snapshots
    }
}

/// Live entity counts maintained by the world registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveCounts {
    /// Aliens and bosses.
    pub attackers: u32,
    /// Shots fired by attackers.
    pub hostile_projectiles: u32,
    /// All threats, asteroids included.
    pub threats: u32,
    /// Uncollected pickups.
    pub pickups: u32,
}

impl LiveCounts {
    /// Reports whether no attacker and no hostile projectile remain.
    #[must_use]
    pub const fn hostiles_cleared(&self) -> bool {
        self.attackers == 0 && self.hostile_projectiles == 0
    }
}

/// Currency collected during the current run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRewards {
    /// Shards collected this run.
    pub shards: u32,
    /// Goo collected this run.
    pub goo: u32,
}
