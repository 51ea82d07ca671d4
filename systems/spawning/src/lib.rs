#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting threat spawn commands.

mod weights;

use std::time::Duration;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use starfall_core::{Command, EntityKind, Event, LevelId, LevelPhase, Playfield};
use tracing::debug;

pub use weights::{select, WeightRamp, WeightTable};

const ASTEROID_INTERVAL: Duration = Duration::from_millis(1_500);
const ASTEROID_LEVEL_DURATION: Duration = Duration::from_secs(60);
const ASTEROID_SPAWN_RISE: f32 = 1.2;

const ALIEN_INTERVAL: Duration = Duration::from_secs(3);
const ALIEN_LEVEL_DURATION: Duration = Duration::from_secs(90);
const ALIEN_EDGE_PADDING: f32 = 0.1;
const ALIEN_SPAWN_RISE: f32 = 1.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    spawn_interval: Duration,
    level_duration: Duration,
    ramp: WeightRamp<EntityKind>,
    edge_padding: f32,
    spawn_rise: f32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided cadence, lifetime, weights and seed.
    #[must_use]
    pub fn new(
        spawn_interval: Duration,
        level_duration: Duration,
        ramp: WeightRamp<EntityKind>,
        rng_seed: u64,
    ) -> Self {
        Self {
            spawn_interval,
            level_duration,
            ramp,
            edge_padding: 0.0,
            spawn_rise: 1.0,
            rng_seed,
        }
    }

    /// Keeps spawned threats at least `padding` away from the side edges.
    #[must_use]
    pub fn with_edge_padding(mut self, padding: f32) -> Self {
        self.edge_padding = padding;
        self
    }

    /// Places spawned threats `rise` units above the visible top edge.
    #[must_use]
    pub fn with_spawn_rise(mut self, rise: f32) -> Self {
        self.spawn_rise = rise;
        self
    }

    /// Replaces the spawn cadence.
    #[must_use]
    pub fn with_spawn_interval(mut self, interval: Duration) -> Self {
        self.spawn_interval = interval;
        self
    }

    /// Replaces the time after which spawning stops for good.
    #[must_use]
    pub fn with_level_duration(mut self, duration: Duration) -> Self {
        self.level_duration = duration;
        self
    }

    /// Asteroid field tuning: small rocks first, mediums from 15 s, larges from 30 s.
    #[must_use]
    pub fn asteroid_field(rng_seed: u64) -> Self {
        let table = |medium: f32, large: f32| {
            WeightTable::new(EntityKind::AsteroidSmall)
                .with_entry(EntityKind::AsteroidSmall, 0.7)
                .with_entry(EntityKind::AsteroidMedium, medium)
                .with_entry(EntityKind::AsteroidLarge, large)
        };
        let ramp = WeightRamp::new(table(0.0, 0.0))
            .then_at(Duration::from_secs(15), table(0.25, 0.0))
            .then_at(Duration::from_secs(30), table(0.25, 0.05));
        Self::new(ASTEROID_INTERVAL, ASTEROID_LEVEL_DURATION, ramp, rng_seed)
            .with_spawn_rise(ASTEROID_SPAWN_RISE)
    }

    /// Alien front tuning: mostly normal aliens with a rare variant.
    #[must_use]
    pub fn alien_front(rng_seed: u64) -> Self {
        let ramp = WeightRamp::new(
            WeightTable::new(EntityKind::AlienNormal)
                .with_entry(EntityKind::AlienNormal, 0.8)
                .with_entry(EntityKind::AlienRare, 0.2),
        );
        Self::new(ALIEN_INTERVAL, ALIEN_LEVEL_DURATION, ramp, rng_seed)
            .with_edge_padding(ALIEN_EDGE_PADDING)
            .with_spawn_rise(ALIEN_SPAWN_RISE)
    }

    /// Default tuning for the provided level.
    #[must_use]
    pub fn for_level(level: LevelId, rng_seed: u64) -> Self {
        match level {
            LevelId::AsteroidField => Self::asteroid_field(rng_seed),
            LevelId::AlienFront => Self::alien_front(rng_seed),
        }
    }

    /// Time after which spawning stops for good.
    #[must_use]
    pub const fn level_duration(&self) -> Duration {
        self.level_duration
    }
}

/// Pure system that emits spawn commands while the level is active.
#[derive(Debug)]
pub struct Spawning {
    config: Config,
    accumulator: Duration,
    elapsed: Duration,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.rng_seed);
        Self {
            config,
            accumulator: Duration::ZERO,
            elapsed: Duration::ZERO,
            rng,
        }
    }

    /// Level time observed while spawning was active.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Reports whether the level duration has run out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.elapsed >= self.config.level_duration
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// At most one threat is requested per call: the accumulator is clamped to
    /// the interval and reset to zero when it fires.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: LevelPhase,
        playfield: &Playfield,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            if let Event::LevelConfigured { .. } = event {
                self.accumulator = Duration::ZERO;
                self.elapsed = Duration::ZERO;
            }
        }

        if !phase.allows_spawning() || self.is_exhausted() {
            return;
        }

        let accumulated = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .fold(Duration::ZERO, Duration::saturating_add);
        if accumulated.is_zero() {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(accumulated);
        if self.is_exhausted() || self.config.spawn_interval.is_zero() {
            return;
        }

        self.accumulator = self
            .accumulator
            .saturating_add(accumulated)
            .min(self.config.spawn_interval);
        if self.accumulator < self.config.spawn_interval {
            return;
        }
        self.accumulator = Duration::ZERO;

        let roll = self.rng.gen::<f32>();
        let kind = select(self.config.ramp.table_at(self.elapsed), roll);
        let position = self.spawn_position(kind, playfield);
        debug!(?kind, x = position.x, y = position.y, "threat requested");
        out.push(Command::SpawnThreat { kind, position });
    }

    fn spawn_position(&mut self, kind: EntityKind, playfield: &Playfield) -> Vec2 {
        let (low, high) = spawn_range(playfield, self.config.edge_padding, kind.half_extent());
        let x = if high > low {
            self.rng.gen_range(low..=high)
        } else {
            low
        };
        Vec2::new(x, playfield.top() + self.config.spawn_rise)
    }
}

/// Horizontal band a threat of half width `half_width` may spawn in.
///
/// Collapses to the playfield midpoint when padding and size leave no room.
#[must_use]
pub fn spawn_range(playfield: &Playfield, padding: f32, half_width: f32) -> (f32, f32) {
    let low = playfield.left() + padding + half_width;
    let high = playfield.right() - padding - half_width;
    if low > high {
        let middle = (low + high) * 0.5;
        (middle, middle)
    } else {
        (low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn accumulator_is_clamped_to_one_spawn_per_call() {
        let mut spawning = Spawning::new(Config::asteroid_field(1));
        let mut out = Vec::new();

        spawning.handle(
            &tick(Duration::from_secs(10)),
            LevelPhase::Active,
            &Playfield::default(),
            &mut out,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(spawning.accumulator, Duration::ZERO);
    }

    #[test]
    fn degenerate_range_collapses_to_midpoint() {
        let narrow = Playfield::new(Vec2::new(1.0, 0.0), 0.2, 5.0);
        let (low, high) = spawn_range(&narrow, 0.1, 0.7);
        assert_eq!(low, high);
        assert!((low - 1.0).abs() < 1e-5);

        let (low, high) = spawn_range(&Playfield::default(), 0.0, 0.25);
        assert!((low + 3.05).abs() < 1e-5);
        assert!((high - 3.05).abs() < 1e-5);
    }

    #[test]
    fn spawning_is_suspended_outside_active_phase() {
        let mut spawning = Spawning::new(Config::alien_front(1));
        let mut out = Vec::new();

        spawning.handle(
            &tick(Duration::from_secs(3)),
            LevelPhase::AwaitingClear,
            &Playfield::default(),
            &mut out,
        );

        assert!(out.is_empty());
        assert_eq!(spawning.elapsed(), Duration::ZERO);
    }
}
