#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns the player's trigger into projectile commands.
//!
//! Each call processes the weapon switch first, then sheds heat for the
//! elapsed time, then attempts a shot. Lasers are gated by the heat meter and a
//! fire-rate cooldown that lengthens while the ship sits still. Missiles bypass
//! heat entirely but have their own cooldown, limited ammunition, and require
//! the missile unlock.

mod heat;

use std::time::Duration;

use glam::Vec2;
use starfall_core::{Command, EntityKind, EntitySnapshot, Event, LevelPhase};
use tracing::{debug, info};

pub use heat::{HeatConfig, WeaponHeat};

/// Ammunition currently selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponMode {
    /// Rapid-fire laser governed by the heat meter.
    Laser,
    /// Heavy missile with limited ammunition.
    Missile,
}

/// Per-tick trigger state supplied by the pilot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TriggerInput {
    /// Fire button held.
    pub fire: bool,
    /// Weapon selection requested this tick.
    pub switch_to: Option<WeaponMode>,
}

/// Notable weapon state changes, suitable for audio and HUD adapters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponNotice {
    /// A projectile left the muzzle.
    Fired(WeaponMode),
    /// The heat meter filled and locked the laser.
    Overheated,
    /// The heat meter emptied and unlocked the laser.
    Cooled,
    /// The selected weapon changed.
    Switched(WeaponMode),
    /// Missile selection refused because missiles are not unlocked.
    MissilesLocked,
    /// The last missile was fired; the laser was selected again.
    OutOfMissiles,
}

/// Configuration parameters required to construct the fire control.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// Heat meter tuning.
    pub heat: HeatConfig,
    /// Laser shots per second before penalties.
    pub shots_per_second: f32,
    /// Ship speed below which the stationary penalty applies.
    pub stationary_threshold: f32,
    /// Cooldown multiplier applied while stationary.
    pub stationary_multiplier: f32,
    /// Delay between missiles.
    pub missile_cooldown: Duration,
    /// Missiles available per level.
    pub missile_ammo: u32,
    /// Fire delay added by switching weapons.
    pub switch_delay: Duration,
    /// Laser speed in world units per second.
    pub laser_speed: f32,
    /// Missile speed in world units per second.
    pub missile_speed: f32,
    /// Distance above the ship's center where projectiles appear.
    pub muzzle_offset: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heat: HeatConfig::default(),
            shots_per_second: 8.0,
            stationary_threshold: 0.05,
            stationary_multiplier: 1.6,
            missile_cooldown: Duration::from_millis(700),
            missile_ammo: 10,
            switch_delay: Duration::from_millis(100),
            laser_speed: 12.0,
            missile_speed: 8.0,
            muzzle_offset: 0.8,
        }
    }
}

impl Config {
    fn laser_cooldown(&self, stationary: bool) -> Duration {
        let base = 1.0 / self.shots_per_second.max(0.0001);
        let seconds = if stationary {
            base * self.stationary_multiplier
        } else {
            base
        };
        Duration::from_secs_f32(seconds)
    }
}

/// Fire control owning the player's weapon state for one level.
#[derive(Debug)]
pub struct FireControl {
    config: Config,
    heat: WeaponHeat,
    mode: WeaponMode,
    missiles_unlocked: bool,
    missiles_left: u32,
    clock: Duration,
    next_fire_at: Duration,
}

impl FireControl {
    /// Creates a cold laser with a full missile rack.
    #[must_use]
    pub fn new(config: Config, missiles_unlocked: bool) -> Self {
        Self {
            heat: WeaponHeat::new(config.heat),
            mode: WeaponMode::Laser,
            missiles_unlocked,
            missiles_left: config.missile_ammo,
            clock: Duration::ZERO,
            next_fire_at: Duration::ZERO,
            config,
        }
    }

    /// Selected weapon.
    #[must_use]
    pub const fn mode(&self) -> WeaponMode {
        self.mode
    }

    /// Read-only access to the heat meter.
    #[must_use]
    pub const fn heat(&self) -> &WeaponHeat {
        &self.heat
    }

    /// Missiles left in the rack.
    #[must_use]
    pub const fn missiles_left(&self) -> u32 {
        self.missiles_left
    }

    /// Consumes events and the trigger to emit `Command::FireProjectile` entries.
    ///
    /// Shots are only taken while `phase` hands control to the player and the
    /// ship is alive; heat keeps decaying regardless.
    pub fn handle(
        &mut self,
        events: &[Event],
        phase: LevelPhase,
        input: TriggerInput,
        player: Option<&EntitySnapshot>,
        out: &mut Vec<Command>,
        notices: &mut Vec<WeaponNotice>,
    ) {
        let mut elapsed = Duration::ZERO;
        for event in events {
            match event {
                Event::LevelConfigured { .. } => {
                    self.clock = Duration::ZERO;
                    self.next_fire_at = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => elapsed = elapsed.saturating_add(*dt),
                _ => {}
            }
        }
        self.clock = self.clock.saturating_add(elapsed);

        if let Some(mode) = input.switch_to {
            self.switch(mode, notices);
        }

        if !elapsed.is_zero() && self.heat.tick(elapsed) {
            debug!("laser cooled down");
            notices.push(WeaponNotice::Cooled);
        }

        if !input.fire || !phase.allows_player_input() {
            return;
        }
        let Some(player) = player else {
            return;
        };
        if self.clock < self.next_fire_at {
            return;
        }

        match self.mode {
            WeaponMode::Laser => self.fire_laser(player, out, notices),
            WeaponMode::Missile => self.fire_missile(player, out, notices),
        }
    }

    fn switch(&mut self, mode: WeaponMode, notices: &mut Vec<WeaponNotice>) {
        if mode == WeaponMode::Missile && !self.missiles_unlocked {
            debug!("missiles locked");
            notices.push(WeaponNotice::MissilesLocked);
            return;
        }
        if mode == WeaponMode::Missile && self.missiles_left == 0 {
            notices.push(WeaponNotice::OutOfMissiles);
            return;
        }
        self.mode = mode;
        self.next_fire_at = self
            .next_fire_at
            .max(self.clock.saturating_add(self.config.switch_delay));
        debug!(?mode, "weapon switched");
        notices.push(WeaponNotice::Switched(mode));
    }

    fn fire_laser(
        &mut self,
        player: &EntitySnapshot,
        out: &mut Vec<Command>,
        notices: &mut Vec<WeaponNotice>,
    ) {
        if self.heat.is_locked() {
            return;
        }
        out.push(self.projectile(player, EntityKind::Laser, self.config.laser_speed));
        notices.push(WeaponNotice::Fired(WeaponMode::Laser));

        let stationary = player.velocity.length() < self.config.stationary_threshold;
        self.next_fire_at = self
            .clock
            .saturating_add(self.config.laser_cooldown(stationary));
        if self.heat.on_shot_fired() {
            info!("laser overheated");
            notices.push(WeaponNotice::Overheated);
        }
    }

    fn fire_missile(
        &mut self,
        player: &EntitySnapshot,
        out: &mut Vec<Command>,
        notices: &mut Vec<WeaponNotice>,
    ) {
        if self.missiles_left == 0 {
            return;
        }
        out.push(self.projectile(player, EntityKind::Missile, self.config.missile_speed));
        notices.push(WeaponNotice::Fired(WeaponMode::Missile));
        self.missiles_left -= 1;
        self.next_fire_at = self.clock.saturating_add(self.config.missile_cooldown);

        if self.missiles_left == 0 {
            info!("missile rack empty");
            self.mode = WeaponMode::Laser;
            notices.push(WeaponNotice::OutOfMissiles);
            notices.push(WeaponNotice::Switched(WeaponMode::Laser));
        }
    }

    fn projectile(&self, player: &EntitySnapshot, kind: EntityKind, speed: f32) -> Command {
        Command::FireProjectile {
            owner: player.id,
            kind,
            origin: player.position + Vec2::new(0.0, self.config.muzzle_offset),
            velocity: Vec2::new(0.0, speed),
        }
    }
}
