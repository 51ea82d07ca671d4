//! Game tuning loaded from an optional TOML file.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use starfall_core::{BossPatrol, LevelId};
use starfall_system_attacks as attacks;
use starfall_system_collision as collision;
use starfall_system_level_phase as level_phase;
use starfall_system_progression as progression;
use starfall_system_spawning as spawning;
use starfall_system_weapon::{self as weapon, HeatConfig};
use thiserror::Error;

/// Failures raised while loading the game configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration")]
    Parse(#[from] toml::de::Error),
    /// A value parsed but cannot drive a simulation.
    #[error("invalid configuration value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Complete tuning for a run. Every section and field is optional in TOML.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) session: SessionSection,
    pub(crate) levels: LevelSection,
    pub(crate) weapon: WeaponSection,
    pub(crate) threats: ThreatSection,
    pub(crate) progression: ProgressionSection,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionSection {
    pub(crate) seed: u64,
    pub(crate) tick_hz: u32,
    pub(crate) max_seconds: u32,
    /// Upper bound on reactive passes after each tick.
    pub(crate) pump_limit: usize,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_hz: 60,
            max_seconds: 240,
            pump_limit: 16,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LevelSection {
    pub(crate) asteroid_field_seconds: u64,
    pub(crate) alien_front_seconds: u64,
    pub(crate) asteroid_spawn_interval_ms: u64,
    pub(crate) alien_spawn_interval_ms: u64,
}

impl Default for LevelSection {
    fn default() -> Self {
        Self {
            asteroid_field_seconds: 60,
            alien_front_seconds: 90,
            asteroid_spawn_interval_ms: 1_500,
            alien_spawn_interval_ms: 3_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct WeaponSection {
    pub(crate) shots_per_second: f32,
    pub(crate) heat_per_shot: f32,
    pub(crate) max_heat: f32,
    pub(crate) cooldown_per_sec: f32,
    pub(crate) overheat_cooldown_per_sec: f32,
    pub(crate) missile_ammo: u32,
    pub(crate) missile_cooldown_ms: u64,
}

impl Default for WeaponSection {
    fn default() -> Self {
        let heat = HeatConfig::default();
        let weapon = weapon::Config::default();
        Self {
            shots_per_second: weapon.shots_per_second,
            heat_per_shot: heat.heat_per_shot,
            max_heat: heat.max_heat,
            cooldown_per_sec: heat.cooldown_per_sec,
            overheat_cooldown_per_sec: heat.overheat_cooldown_per_sec,
            missile_ammo: weapon.missile_ammo,
            missile_cooldown_ms: 700,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ThreatSection {
    pub(crate) bullet_speed: f32,
    pub(crate) boss_health: u32,
    pub(crate) boss_patrol_speed: f32,
    /// Length of the boss intro cue; the boss waits for it to finish.
    pub(crate) boss_intro_cue_ms: u64,
}

impl Default for ThreatSection {
    fn default() -> Self {
        Self {
            bullet_speed: 4.0,
            boss_health: 100,
            boss_patrol_speed: BossPatrol::default().speed,
            boss_intro_cue_ms: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ProgressionSection {
    pub(crate) lives: u32,
    pub(crate) shield_charges: u32,
    pub(crate) missiles_at_shards: i64,
    pub(crate) shield_at_goo: i64,
}

impl Default for ProgressionSection {
    fn default() -> Self {
        let defaults = progression::Config::default();
        Self {
            lives: defaults.lives,
            shield_charges: defaults.shield_charges,
            missiles_at_shards: defaults.missiles_at_shards,
            shield_at_goo: defaults.shield_at_goo,
        }
    }
}

impl GameConfig {
    /// Loads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses and validates TOML contents.
    pub(crate) fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot run with.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.session.tick_hz == 0 {
            return invalid("session.tick_hz", "must be positive");
        }
        if self.session.pump_limit == 0 {
            return invalid("session.pump_limit", "must be positive");
        }
        if self.progression.lives == 0 {
            return invalid("progression.lives", "the ship needs at least one life");
        }
        if self.threats.boss_health == 0 {
            return invalid("threats.boss_health", "must be positive");
        }
        if !self.weapon.shots_per_second.is_finite() || self.weapon.shots_per_second <= 0.0 {
            return invalid("weapon.shots_per_second", "must be positive");
        }
        let heat_rates = [
            ("weapon.max_heat", self.weapon.max_heat),
            ("weapon.heat_per_shot", self.weapon.heat_per_shot),
            ("weapon.cooldown_per_sec", self.weapon.cooldown_per_sec),
            (
                "weapon.overheat_cooldown_per_sec",
                self.weapon.overheat_cooldown_per_sec,
            ),
        ];
        for (field, value) in heat_rates {
            if !value.is_finite() || value <= 0.0 {
                return invalid(field, "must be positive");
            }
        }
        Ok(())
    }

    /// Simulated time covered by one tick.
    pub(crate) fn tick(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.session.tick_hz))
    }

    /// Length of the active phase of `level`.
    pub(crate) fn level_duration(&self, level: LevelId) -> Duration {
        Duration::from_secs(match level {
            LevelId::AsteroidField => self.levels.asteroid_field_seconds,
            LevelId::AlienFront => self.levels.alien_front_seconds,
        })
    }

    pub(crate) fn spawning(&self, level: LevelId, seed: u64) -> spawning::Config {
        let interval = match level {
            LevelId::AsteroidField => self.levels.asteroid_spawn_interval_ms,
            LevelId::AlienFront => self.levels.alien_spawn_interval_ms,
        };
        spawning::Config::for_level(level, seed)
            .with_spawn_interval(Duration::from_millis(interval))
            .with_level_duration(self.level_duration(level))
    }

    pub(crate) fn attacks(&self) -> attacks::Config {
        attacks::Config::default()
            .with_bullet_speed(self.threats.bullet_speed)
            .with_patrol(self.boss_patrol())
    }

    fn boss_patrol(&self) -> BossPatrol {
        BossPatrol {
            speed: self.threats.boss_patrol_speed,
            ..BossPatrol::default()
        }
    }

    pub(crate) fn collision(&self) -> collision::Config {
        collision::Config::default()
    }

    pub(crate) fn weapon(&self) -> weapon::Config {
        weapon::Config {
            heat: HeatConfig {
                heat_per_shot: self.weapon.heat_per_shot,
                max_heat: self.weapon.max_heat,
                cooldown_per_sec: self.weapon.cooldown_per_sec,
                overheat_cooldown_per_sec: self.weapon.overheat_cooldown_per_sec,
            },
            shots_per_second: self.weapon.shots_per_second,
            missile_ammo: self.weapon.missile_ammo,
            missile_cooldown: Duration::from_millis(self.weapon.missile_cooldown_ms),
            ..weapon::Config::default()
        }
    }

    pub(crate) fn level_phase(&self, level: LevelId) -> level_phase::Config {
        level_phase::Config {
            level_duration: self.level_duration(level),
            boss_health: self.threats.boss_health,
            boss_intro_cue: Duration::from_millis(self.threats.boss_intro_cue_ms),
            boss_patrol: self.boss_patrol(),
            ..level_phase::Config::for_level(level)
        }
    }

    pub(crate) fn progression(&self) -> progression::Config {
        progression::Config {
            missiles_at_shards: self.progression.missiles_at_shards,
            shield_at_goo: self.progression.shield_at_goo,
            lives: self.progression.lives,
            shield_charges: self.progression.shield_charges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_game_tuning() {
        let config = GameConfig::from_toml("").expect("empty config parses");

        assert_eq!(config, GameConfig::default());
        assert_eq!(config.level_duration(LevelId::AsteroidField), Duration::from_secs(60));
        assert_eq!(config.level_duration(LevelId::AlienFront), Duration::from_secs(90));
        assert_eq!(config.weapon(), weapon::Config::default());
        assert_eq!(config.progression(), progression::Config::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = GameConfig::from_toml(
            r#"
            [session]
            seed = 42

            [threats]
            boss_intro_cue_ms = 3500
            "#,
        )
        .expect("partial config parses");

        assert_eq!(config.session.seed, 42);
        assert_eq!(config.session.tick_hz, 60);
        let phase = config.level_phase(LevelId::AlienFront);
        assert_eq!(phase.boss_intro_cue, Duration::from_millis(3_500));
        assert_eq!(phase.boss_health, 100);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = GameConfig::from_toml("[session]\nspeed = 3\n").expect_err("typo rejected");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_tick_rate_is_invalid() {
        let error = GameConfig::from_toml("[session]\ntick_hz = 0\n").expect_err("zero rejected");
        assert!(matches!(
            error,
            ConfigError::Invalid {
                field: "session.tick_hz",
                ..
            }
        ));
    }

    #[test]
    fn heat_rates_must_be_positive() {
        for (contents, field) in [
            ("[weapon]\noverheat_cooldown_per_sec = -1.0\n", "weapon.overheat_cooldown_per_sec"),
            ("[weapon]\ncooldown_per_sec = 0.0\n", "weapon.cooldown_per_sec"),
            ("[weapon]\nheat_per_shot = -6.0\n", "weapon.heat_per_shot"),
            ("[weapon]\nheat_per_shot = nan\n", "weapon.heat_per_shot"),
        ] {
            let error = GameConfig::from_toml(contents).expect_err("bad heat tuning rejected");
            assert!(
                matches!(error, ConfigError::Invalid { field: rejected, .. } if rejected == field),
                "{contents}: {error:?}"
            );
        }
    }
}
