//! Audio cues derived from simulation events.
//!
//! The headless runner has no mixer, so cues are delivered to a sink that
//! records them in the log.

use starfall_core::{EntityCategory, EntityKind, Event, LevelOutcome, LevelPhase};
use starfall_system_weapon::{WeaponMode, WeaponNotice};
use tracing::debug;

/// Sound effect or sting requested by gameplay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum AudioCue {
    LaserShot,
    MissileShot,
    EnemyShot,
    Overheat,
    WeaponReady,
    WeaponSwitch,
    Denied,
    Explosion,
    PlayerHit,
    ShieldHit,
    Pickup,
    BossIntro,
    Victory,
    GameOver,
}

impl AudioCue {
    /// Cue announced by a world event, if any.
    pub(crate) fn from_event(event: &Event) -> Option<Self> {
        match *event {
            Event::EntitySpawned {
                kind: EntityKind::AlienBullet,
                ..
            } => Some(Self::EnemyShot),
            Event::Died { kind, .. } if kind.category() == EntityCategory::Threat => {
                Some(Self::Explosion)
            }
            Event::Damaged {
                kind: EntityKind::Player,
                ..
            } => Some(Self::PlayerHit),
            Event::Died {
                kind: EntityKind::Player,
                ..
            } => Some(Self::PlayerHit),
            Event::ShieldAbsorbed { .. } => Some(Self::ShieldHit),
            Event::RewardCollected { .. } => Some(Self::Pickup),
            Event::PhaseChanged {
                to: LevelPhase::BossIntro,
                ..
            } => Some(Self::BossIntro),
            Event::LevelResolved { outcome, .. } => match outcome {
                LevelOutcome::Completed | LevelOutcome::BossDefeated => Some(Self::Victory),
                LevelOutcome::GameOver => Some(Self::GameOver),
                LevelOutcome::Retreated => None,
            },
            _ => None,
        }
    }

    /// Cue announced by the fire control.
    pub(crate) fn from_notice(notice: WeaponNotice) -> Self {
        match notice {
            WeaponNotice::Fired(WeaponMode::Laser) => Self::LaserShot,
            WeaponNotice::Fired(WeaponMode::Missile) => Self::MissileShot,
            WeaponNotice::Overheated => Self::Overheat,
            WeaponNotice::Cooled => Self::WeaponReady,
            WeaponNotice::Switched(_) => Self::WeaponSwitch,
            WeaponNotice::MissilesLocked | WeaponNotice::OutOfMissiles => Self::Denied,
        }
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::LaserShot => "laser_shot",
            Self::MissileShot => "missile_shot",
            Self::EnemyShot => "enemy_shot",
            Self::Overheat => "overheat",
            Self::WeaponReady => "weapon_ready",
            Self::WeaponSwitch => "weapon_switch",
            Self::Denied => "denied",
            Self::Explosion => "explosion",
            Self::PlayerHit => "player_hit",
            Self::ShieldHit => "shield_hit",
            Self::Pickup => "pickup",
            Self::BossIntro => "boss_intro",
            Self::Victory => "victory",
            Self::GameOver => "game_over",
        }
    }
}

/// Fire-and-forget consumer of audio cues.
pub(crate) trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Sink that writes every cue to the debug log and counts them.
#[derive(Debug, Default)]
pub(crate) struct LogSink {
    played: usize,
}

impl LogSink {
    pub(crate) const fn played(&self) -> usize {
        self.played
    }
}

impl AudioSink for LogSink {
    fn play(&mut self, cue: AudioCue) {
        self.played += 1;
        debug!(cue = cue.name(), "audio cue");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use starfall_core::{DeathCause, EntityId, ExitTarget, LevelId};

    #[test]
    fn threat_deaths_explode_and_pickups_chime() {
        let died = Event::Died {
            id: EntityId::new(4),
            kind: EntityKind::AsteroidLarge,
            position: Vec2::ZERO,
            cause: DeathCause::Damage,
        };
        assert_eq!(AudioCue::from_event(&died), Some(AudioCue::Explosion));

        let removed = Event::EntityRemoved {
            id: EntityId::new(4),
            kind: EntityKind::AsteroidLarge,
            reason: starfall_core::RemovalReason::Killed,
        };
        assert_eq!(AudioCue::from_event(&removed), None);
    }

    #[test]
    fn retreating_is_silent() {
        let event = Event::LevelResolved {
            level: LevelId::AlienFront,
            outcome: LevelOutcome::Retreated,
            exit: ExitTarget::Summary,
        };
        assert_eq!(AudioCue::from_event(&event), None);
    }

    #[test]
    fn log_sink_counts_cues() {
        let mut sink = LogSink::default();
        sink.play(AudioCue::from_notice(WeaponNotice::Overheated));
        sink.play(AudioCue::from_notice(WeaponNotice::Fired(WeaponMode::Missile)));
        assert_eq!(sink.played(), 2);
    }
}
