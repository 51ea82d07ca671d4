//! Hit point and shield bookkeeping for damageable entities.

use starfall_core::HealthSnapshot;

/// Result of applying a single hit to a [`Health`] tracker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// The hit was discarded because it carried no damage or the owner is already dead.
    Ignored,
    /// A shield charge absorbed the hit.
    ShieldAbsorbed {
        /// Shield charges left.
        remaining: u32,
    },
    /// Hit points were removed without killing the owner.
    Damaged {
        /// Hit points left.
        remaining: u32,
    },
    /// The hit depleted the remaining hit points.
    Died,
}

/// Hit points, maximum and shield charges of a single entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Health {
    max: u32,
    current: u32,
    shield: u32,
    dead: bool,
}

impl Health {
    /// Creates a tracker at full health without shields.
    ///
    /// A maximum of zero is raised to one so every tracker starts alive.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self::with_shield(max, 0)
    }

    /// Creates a tracker at full health carrying the provided shield charges.
    #[must_use]
    pub const fn with_shield(max: u32, shield: u32) -> Self {
        let max = if max == 0 { 1 } else { max };
        Self {
            max,
            current: max,
            shield,
            dead: false,
        }
    }

    /// Applies one hit.
    ///
    /// A shield charge absorbs the whole hit regardless of its amount. Once the
    /// tracker has reported [`DamageOutcome::Died`] every later hit is ignored.
    pub fn apply_damage(&mut self, amount: u32) -> DamageOutcome {
        if self.dead || amount == 0 {
            return DamageOutcome::Ignored;
        }

        if self.shield > 0 {
            self.shield -= 1;
            return DamageOutcome::ShieldAbsorbed {
                remaining: self.shield,
            };
        }

        self.current = self.current.saturating_sub(amount);
        if self.current == 0 {
            self.dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Damaged {
                remaining: self.current,
            }
        }
    }

    /// Current hit points.
    #[must_use]
    pub const fn current(&self) -> u32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> u32 {
        self.max
    }

    /// Remaining shield charges.
    #[must_use]
    pub const fn shield(&self) -> u32 {
        self.shield
    }

    /// Reports whether the death transition already happened.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.dead
    }

    /// Immutable copy suitable for views.
    #[must_use]
    pub const fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            current: self.current,
            max: self.max,
            shield: self.shield,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DamageOutcome, Health};

    #[test]
    fn shield_absorbs_before_hit_points() {
        let mut health = Health::with_shield(3, 2);

        assert_eq!(
            health.apply_damage(5),
            DamageOutcome::ShieldAbsorbed { remaining: 1 }
        );
        assert_eq!(
            health.apply_damage(1),
            DamageOutcome::ShieldAbsorbed { remaining: 0 }
        );
        assert_eq!(health.current(), 3);
        assert_eq!(
            health.apply_damage(1),
            DamageOutcome::Damaged { remaining: 2 }
        );
    }

    #[test]
    fn death_is_reported_exactly_once() {
        let mut health = Health::new(3);

        assert_eq!(health.apply_damage(999), DamageOutcome::Died);
        assert_eq!(health.current(), 0);
        assert!(health.is_dead());
        assert_eq!(health.apply_damage(1), DamageOutcome::Ignored);
        assert_eq!(health.apply_damage(999), DamageOutcome::Ignored);
    }

    #[test]
    fn zero_damage_is_a_no_op() {
        let mut health = Health::with_shield(2, 1);

        assert_eq!(health.apply_damage(0), DamageOutcome::Ignored);
        assert_eq!(health.shield(), 1);
        assert_eq!(health.current(), 2);
    }

    #[test]
    fn zero_maximum_is_raised_to_one() {
        let health = Health::new(0);

        assert_eq!(health.max(), 1);
        assert_eq!(health.current(), 1);
        assert!(!health.is_dead());
    }

    #[test]
    fn current_never_exceeds_max() {
        let mut health = Health::new(100);
        let _ = health.apply_damage(10);

        let snapshot = health.snapshot();
        assert!(snapshot.current <= snapshot.max);
        assert_eq!(snapshot.current, 90);
    }
}
