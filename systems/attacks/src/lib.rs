#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that runs attack schedules for aliens and the boss.
//!
//! Every attacker owns a set of independent timers. Timers expire against a
//! clock advanced by `Event::TimeAdvanced`; an expired timer fires its pattern
//! and schedules its next expiry one interval after the current clock, so
//! next-fire times only ever move forward. Aim is sampled from the entity view
//! at the moment a shot leaves the muzzle.

use std::{collections::BTreeMap, f32::consts::TAU, time::Duration};

use glam::Vec2;
use starfall_core::{
    BossPatrol, Command, EntityId, EntityKind, EntityView, Event, LevelPhase,
};
use tracing::debug;

/// Shot pattern fired when a timer expires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AttackPattern {
    /// One shot aimed at the player.
    AimedSingle,
    /// Several aimed shots separated by a short delay.
    AimedVolley {
        /// Shots per volley.
        shots: u32,
        /// Delay between consecutive shots.
        spacing: Duration,
    },
    /// Bullets spread evenly around a full circle.
    Radial {
        /// Bullets per burst.
        bullets: u32,
    },
    /// Straight-down columns spanning the patrol route.
    Barrage {
        /// Number of columns.
        columns: u32,
    },
}

/// Independent timer belonging to one attacker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackTimer {
    /// Pattern fired on expiry.
    pub pattern: AttackPattern,
    /// Delay between expiries.
    pub interval: Duration,
    /// Delay between the attacker's arrival and the first expiry.
    pub first_delay: Duration,
}

impl AttackTimer {
    /// Creates a timer description.
    #[must_use]
    pub const fn new(pattern: AttackPattern, first_delay: Duration, interval: Duration) -> Self {
        Self {
            pattern,
            interval,
            first_delay,
        }
    }
}

/// Configuration parameters required to construct the attack system.
#[derive(Clone, Debug)]
pub struct Config {
    bullet_speed: f32,
    muzzle_offset: Vec2,
    barrage_inset: f32,
    patrol: BossPatrol,
    alien_timers: Vec<AttackTimer>,
    boss_timers: Vec<AttackTimer>,
}

impl Config {
    /// Replaces the patrol route used to place barrage columns.
    #[must_use]
    pub fn with_patrol(mut self, patrol: BossPatrol) -> Self {
        self.patrol = patrol;
        self
    }

    /// Replaces the speed of every hostile bullet.
    #[must_use]
    pub fn with_bullet_speed(mut self, speed: f32) -> Self {
        self.bullet_speed = speed;
        self
    }

    fn timers_for(&self, kind: EntityKind) -> Option<&[AttackTimer]> {
        match kind {
            EntityKind::AlienNormal | EntityKind::AlienRare => Some(&self.alien_timers),
            EntityKind::Boss => Some(&self.boss_timers),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bullet_speed: 4.0,
            muzzle_offset: Vec2::new(0.0, -0.5),
            barrage_inset: 0.5,
            patrol: BossPatrol::default(),
            alien_timers: vec![AttackTimer::new(
                AttackPattern::AimedSingle,
                Duration::from_secs(1),
                Duration::from_secs(2),
            )],
            boss_timers: vec![
                AttackTimer::new(
                    AttackPattern::AimedVolley {
                        shots: 3,
                        spacing: Duration::from_millis(300),
                    },
                    Duration::from_secs(2),
                    Duration::from_secs(2),
                ),
                AttackTimer::new(
                    AttackPattern::Radial { bullets: 8 },
                    Duration::from_secs(3),
                    Duration::from_secs(4),
                ),
                AttackTimer::new(
                    AttackPattern::Barrage { columns: 5 },
                    Duration::from_secs(4),
                    Duration::from_secs(3),
                ),
            ],
        }
    }
}

#[derive(Clone, Debug)]
struct ArmedTimer {
    timer: AttackTimer,
    next_fire_at: Duration,
}

#[derive(Clone, Debug)]
struct AttackSchedule {
    timers: Vec<ArmedTimer>,
    /// Clock values at which queued volley shots leave the muzzle.
    queued_shots: Vec<Duration>,
}

/// Attack system that queues hostile projectile commands.
#[derive(Debug)]
pub struct Attacks {
    config: Config,
    clock: Duration,
    schedules: BTreeMap<EntityId, AttackSchedule>,
}

impl Attacks {
    /// Creates a new attack system with no armed schedules.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: Duration::ZERO,
            schedules: BTreeMap::new(),
        }
    }

    /// Number of attackers with armed schedules.
    #[must_use]
    pub fn armed(&self) -> usize {
        self.schedules.len()
    }

    /// Consumes events and the entity view to emit `Command::FireProjectile` entries.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: LevelPhase,
        entities: &EntityView,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            match event {
                Event::LevelConfigured { .. } => {
                    self.clock = Duration::ZERO;
                    self.schedules.clear();
                }
                Event::TimeAdvanced { dt } => {
                    self.clock = self.clock.saturating_add(*dt);
                }
                Event::EntitySpawned { id, kind, .. } => self.arm(*id, *kind),
                Event::Died { id, .. } | Event::EntityRemoved { id, .. } => {
                    if self.schedules.remove(id).is_some() {
                        debug!(attacker = id.get(), "attack schedule disarmed");
                    }
                }
                _ => {}
            }
        }

        if phase.is_terminal() || self.schedules.is_empty() {
            return;
        }

        let target = entities.player().map(|player| player.position);
        let clock = self.clock;
        for (id, schedule) in &mut self.schedules {
            let Some(attacker) = entities.get(*id) else {
                continue;
            };
            let origin = attacker.position;

            let due = schedule
                .queued_shots
                .iter()
                .filter(|at| **at <= clock)
                .count();
            schedule.queued_shots.retain(|at| *at > clock);
            for _ in 0..due {
                fire_aimed(&self.config, *id, origin, target, out);
            }

            for armed in &mut schedule.timers {
                if clock < armed.next_fire_at {
                    continue;
                }
                armed.next_fire_at = clock.saturating_add(armed.timer.interval);
                debug!(attacker = id.get(), pattern = ?armed.timer.pattern, "attack fired");

                match armed.timer.pattern {
                    AttackPattern::AimedSingle => {
                        fire_aimed(&self.config, *id, origin, target, out);
                    }
                    AttackPattern::AimedVolley { shots, spacing } => {
                        if shots == 0 {
                            continue;
                        }
                        fire_aimed(&self.config, *id, origin, target, out);
                        for shot in 1..shots {
                            schedule
                                .queued_shots
                                .push(clock.saturating_add(spacing.saturating_mul(shot)));
                        }
                    }
                    AttackPattern::Radial { bullets } => {
                        fire_radial(&self.config, *id, origin, bullets, out);
                    }
                    AttackPattern::Barrage { columns } => {
                        fire_barrage(&self.config, *id, origin, columns, out);
                    }
                }
            }
        }
    }

    fn arm(&mut self, id: EntityId, kind: EntityKind) {
        let Some(timers) = self.config.timers_for(kind) else {
            return;
        };
        let clock = self.clock;
        let timers = timers
            .iter()
            .map(|timer| ArmedTimer {
                timer: *timer,
                next_fire_at: clock.saturating_add(timer.first_delay),
            })
            .collect();
        let _ = self.schedules.insert(
            id,
            AttackSchedule {
                timers,
                queued_shots: Vec::new(),
            },
        );
        debug!(attacker = id.get(), ?kind, "attack schedule armed");
    }
}

fn fire_aimed(
    config: &Config,
    owner: EntityId,
    position: Vec2,
    target: Option<Vec2>,
    out: &mut Vec<Command>,
) {
    let origin = position + config.muzzle_offset;
    let direction = target
        .map(|target| (target - origin).normalize_or_zero())
        .filter(|direction| *direction != Vec2::ZERO)
        .unwrap_or(Vec2::new(0.0, -1.0));
    out.push(bullet(owner, origin, direction * config.bullet_speed));
}

fn fire_radial(
    config: &Config,
    owner: EntityId,
    position: Vec2,
    bullets: u32,
    out: &mut Vec<Command>,
) {
    if bullets == 0 {
        return;
    }
    let origin = position + config.muzzle_offset;
    let step = TAU / bullets as f32;
    for index in 0..bullets {
        let angle = step * index as f32;
        let direction = Vec2::new(angle.cos(), angle.sin());
        out.push(bullet(owner, origin, direction * config.bullet_speed));
    }
}

fn fire_barrage(
    config: &Config,
    owner: EntityId,
    position: Vec2,
    columns: u32,
    out: &mut Vec<Command>,
) {
    let start = config.patrol.left + config.barrage_inset;
    let end = config.patrol.right - config.barrage_inset;
    let y = position.y + config.muzzle_offset.y;
    let velocity = Vec2::new(0.0, -config.bullet_speed);

    match columns {
        0 => {}
        1 => out.push(bullet(owner, Vec2::new((start + end) * 0.5, y), velocity)),
        _ => {
            let spacing = (end - start) / (columns - 1) as f32;
            for index in 0..columns {
                let x = start + spacing * index as f32;
                out.push(bullet(owner, Vec2::new(x, y), velocity));
            }
        }
    }
}

fn bullet(owner: EntityId, origin: Vec2, velocity: Vec2) -> Command {
    Command::FireProjectile {
        owner,
        kind: EntityKind::AlienBullet,
        origin,
        velocity,
    }
}
