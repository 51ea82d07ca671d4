//! Overheat model gating the rapid-fire weapon.

use std::time::Duration;

/// Tuning of the heat meter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeatConfig {
    /// Heat added by every shot.
    pub heat_per_shot: f32,
    /// Heat at which the weapon locks.
    pub max_heat: f32,
    /// Heat shed per second while unlocked.
    pub cooldown_per_sec: f32,
    /// Heat shed per second while locked.
    pub overheat_cooldown_per_sec: f32,
}

impl Default for HeatConfig {
    fn default() -> Self {
        Self {
            heat_per_shot: 6.0,
            max_heat: 30.0,
            cooldown_per_sec: 10.0,
            overheat_cooldown_per_sec: 14.0,
        }
    }
}

/// Heat meter that locks the weapon once full and unlocks it only when empty.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponHeat {
    config: HeatConfig,
    heat: f32,
    locked: bool,
}

impl WeaponHeat {
    /// Creates a cold, unlocked meter.
    #[must_use]
    pub const fn new(config: HeatConfig) -> Self {
        Self {
            config,
            heat: 0.0,
            locked: false,
        }
    }

    /// Records a shot. Returns `true` when this shot filled the meter and locked the weapon.
    pub fn on_shot_fired(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.heat += self.config.heat_per_shot;
        if self.heat >= self.config.max_heat {
            self.heat = self.config.max_heat;
            self.locked = true;
            return true;
        }
        false
    }

    /// Sheds heat for `dt`. Returns `true` when the weapon unlocked during this step.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let rate = self.rate();
        if self.heat > 0.0 && rate > 0.0 {
            self.heat = (self.heat - rate * dt.as_secs_f32()).max(0.0);
        }
        if self.locked && self.heat <= 0.0 {
            self.heat = 0.0;
            self.locked = false;
            return true;
        }
        false
    }

    /// Current heat.
    #[must_use]
    pub const fn heat(&self) -> f32 {
        self.heat
    }

    /// Heat as a fraction of the maximum, clamped to `[0, 1]`.
    #[must_use]
    pub fn heat_percent(&self) -> f32 {
        (self.heat / self.config.max_heat.max(0.0001)).clamp(0.0, 1.0)
    }

    /// Reports whether the weapon refuses to fire.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// Seconds until the meter is empty at the current decay rate.
    ///
    /// A locked meter that does not decay never becomes ready and reports
    /// `f32::INFINITY`.
    #[must_use]
    pub fn seconds_until_ready(&self) -> f32 {
        let rate = self.rate();
        if self.heat <= 0.0 {
            0.0
        } else if rate > 0.0 {
            self.heat / rate
        } else if self.locked {
            f32::INFINITY
        } else {
            0.0
        }
    }

    fn rate(&self) -> f32 {
        if self.locked {
            self.config.overheat_cooldown_per_sec
        } else {
            self.config.cooldown_per_sec
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_shots_lock_the_weapon() {
        let mut heat = WeaponHeat::new(HeatConfig::default());

        for _ in 0..4 {
            assert!(!heat.on_shot_fired());
        }
        assert!(!heat.is_locked());
        assert!(heat.on_shot_fired());
        assert!(heat.is_locked());
        assert_eq!(heat.heat_percent(), 1.0);
    }

    #[test]
    fn locked_weapon_unlocks_only_when_heat_reaches_zero() {
        let mut heat = WeaponHeat::new(HeatConfig::default());
        for _ in 0..5 {
            let _ = heat.on_shot_fired();
        }
        assert!((heat.seconds_until_ready() - 30.0 / 14.0).abs() < 1e-5);

        assert!(!heat.tick(Duration::from_secs(2)));
        assert!(heat.is_locked());
        assert!(heat.heat() > 0.0);
        assert!(!heat.on_shot_fired(), "locked shots are refused");

        assert!(heat.tick(Duration::from_millis(200)));
        assert!(!heat.is_locked());
        assert_eq!(heat.heat(), 0.0);
    }

    #[test]
    fn unlocked_heat_decays_at_the_normal_rate() {
        let mut heat = WeaponHeat::new(HeatConfig::default());
        let _ = heat.on_shot_fired();
        let _ = heat.on_shot_fired();

        assert!(!heat.tick(Duration::from_millis(500)));
        assert!((heat.heat() - 7.0).abs() < 1e-4);
        assert!((heat.seconds_until_ready() - 0.7).abs() < 1e-4);

        let _ = heat.tick(Duration::from_secs(5));
        assert_eq!(heat.heat(), 0.0);
    }

    #[test]
    fn locked_meter_without_decay_is_never_ready() {
        let mut heat = WeaponHeat::new(HeatConfig {
            overheat_cooldown_per_sec: 0.0,
            ..HeatConfig::default()
        });
        for _ in 0..5 {
            let _ = heat.on_shot_fired();
        }

        assert!(!heat.tick(Duration::from_secs(60)));
        assert!(heat.is_locked());
        assert_eq!(heat.seconds_until_ready(), f32::INFINITY);
    }
}
