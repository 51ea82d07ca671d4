//! Scripted pilot that flies the ship during headless runs.

use glam::Vec2;
use starfall_core::{EntityCategory, EntityKind, EntitySnapshot, EntityView, Playfield, TransitionChoice};
use starfall_system_weapon::{TriggerInput, WeaponMode};

/// Height above the ship inside which incoming objects are dodged.
const DODGE_HEIGHT: f32 = 2.5;
/// Extra clearance added to contact radii when dodging.
const DODGE_MARGIN: f32 = 0.3;
/// Horizontal offset under which the ship counts as lined up with a target.
const AIM_SLACK: f32 = 0.3;
const STEER_DEADZONE: f32 = 0.1;

/// Everything the pilot decides for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct PilotInput {
    pub(crate) steer: Vec2,
    pub(crate) trigger: TriggerInput,
    pub(crate) choice: Option<TransitionChoice>,
}

/// Weapon state the pilot needs to pick ammunition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Armament {
    pub(crate) mode: WeaponMode,
    pub(crate) missiles_ready: bool,
}

/// Greedy pilot: dodge what is about to hit, otherwise line up under the
/// lowest threat and shoot.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Autopilot {
    choice: TransitionChoice,
}

impl Autopilot {
    pub(crate) const fn new(choice: TransitionChoice) -> Self {
        Self { choice }
    }

    pub(crate) fn decide(
        &self,
        view: &EntityView,
        playfield: &Playfield,
        armament: Armament,
    ) -> PilotInput {
        let mut input = PilotInput {
            choice: Some(self.choice),
            ..PilotInput::default()
        };
        let Some(ship) = view.player() else {
            return input;
        };

        let target = view
            .iter()
            .filter(|other| {
                other.kind.category() == EntityCategory::Threat
                    && other.position.y > ship.position.y
            })
            .min_by(|a, b| a.position.y.total_cmp(&b.position.y));

        let steer_x = if let Some(danger) = incoming(view, ship) {
            dodge(ship, danger, playfield)
        } else if let Some(target) = target {
            toward(ship.position.x, target.position.x)
        } else {
            view.iter()
                .filter(|other| other.kind.category() == EntityCategory::Pickup)
                .min_by(|a, b| {
                    a.position
                        .distance_squared(ship.position)
                        .total_cmp(&b.position.distance_squared(ship.position))
                })
                .map_or(0.0, |pickup| toward(ship.position.x, pickup.position.x))
        };
        input.steer = Vec2::new(steer_x, 0.0);

        if let Some(target) = target {
            input.trigger.fire =
                (target.position.x - ship.position.x).abs() < target.radius + AIM_SLACK;
            let heavy = matches!(target.kind, EntityKind::Boss | EntityKind::AsteroidLarge);
            let wanted = if heavy && armament.missiles_ready {
                WeaponMode::Missile
            } else {
                WeaponMode::Laser
            };
            if wanted != armament.mode {
                input.trigger.switch_to = Some(wanted);
            }
        }
        input
    }
}

/// Closest hostile shot or non-boss threat on a collision course.
fn incoming<'a>(view: &'a EntityView, ship: &EntitySnapshot) -> Option<&'a EntitySnapshot> {
    view.iter()
        .filter(|other| {
            let hostile = match other.kind.category() {
                EntityCategory::HostileProjectile => true,
                EntityCategory::Threat => other.kind != EntityKind::Boss,
                _ => false,
            };
            let above = other.position.y - ship.position.y;
            hostile
                && (0.0..DODGE_HEIGHT).contains(&above)
                && (other.position.x - ship.position.x).abs()
                    < other.radius + ship.radius + DODGE_MARGIN
        })
        .min_by(|a, b| a.position.y.total_cmp(&b.position.y))
}

fn dodge(ship: &EntitySnapshot, danger: &EntitySnapshot, playfield: &Playfield) -> f32 {
    let away = if danger.position.x >= ship.position.x {
        -1.0
    } else {
        1.0
    };
    // Near a wall, slip past on the open side instead.
    let room = playfield.half_width() - 1.0;
    if (ship.position.x - playfield.center().x) * away > room {
        -away
    } else {
        away
    }
}

fn toward(from: f32, to: f32) -> f32 {
    let delta = to - from;
    if delta.abs() < STEER_DEADZONE {
        0.0
    } else {
        delta.signum()
    }
}
