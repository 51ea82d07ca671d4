//! Per-kind movement rules advanced on every unfrozen tick.

use std::f32::consts::PI;

use glam::Vec2;
use starfall_core::Playfield;

/// Distance kept between the player's ship and the horizontal playfield edges.
const PLAYER_EDGE_INSET_X: f32 = 0.8;
/// Distance kept between the player's ship and the vertical playfield edges.
const PLAYER_EDGE_INSET_Y: f32 = 0.5;

/// Movement rule attached to an entity.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Motion {
    /// Constant velocity.
    Linear,
    /// Sinusoidal sway around a fixed column while descending.
    Zigzag {
        center_x: f32,
        amplitude: f32,
        frequency: f32,
        padding: f32,
        descent: f32,
        elapsed: f32,
    },
    /// Back-and-forth sweep between two bounds at a fixed height.
    Patrol {
        left: f32,
        right: f32,
        y: f32,
        speed: f32,
        heading: f32,
    },
    /// Driven by the player's steering input and clamped to the playfield.
    Steered { speed: f32 },
    /// Initial burst that eases into a slow fall.
    Drift { fall_speed: f32, drag: f32 },
}

/// Inputs shared by all movement rules within a tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct MotionContext {
    pub(crate) playfield: Playfield,
    pub(crate) steer: Vec2,
}

impl Motion {
    /// Advances the rule by `dt` seconds, updating position and velocity in place.
    pub(crate) fn advance(
        &mut self,
        position: &mut Vec2,
        velocity: &mut Vec2,
        dt: f32,
        context: &MotionContext,
    ) {
        if dt <= 0.0 {
            return;
        }

        match self {
            Self::Linear => {
                *position += *velocity * dt;
            }
            Self::Zigzag {
                center_x,
                amplitude,
                frequency,
                padding,
                descent,
                elapsed,
            } => {
                *elapsed += dt;
                let sway = (*elapsed * *frequency * PI).sin() * *amplitude;
                let playfield = &context.playfield;
                let x = clamp_or_midpoint(
                    *center_x + sway,
                    playfield.left() + *padding,
                    playfield.right() - *padding,
                );
                let next = Vec2::new(x, position.y - *descent * dt);
                *velocity = (next - *position) / dt;
                *position = next;
            }
            Self::Patrol {
                left,
                right,
                y,
                speed,
                heading,
            } => {
                let mut x = position.x + *heading * *speed * dt;
                if x >= *right {
                    x = *right;
                    *heading = -1.0;
                } else if x <= *left {
                    x = *left;
                    *heading = 1.0;
                }
                *position = Vec2::new(x, *y);
                *velocity = Vec2::new(*heading * *speed, 0.0);
            }
            Self::Steered { speed } => {
                let direction = context.steer.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
                *velocity = direction * *speed;
                let playfield = &context.playfield;
                let center = playfield.center();
                let reach_x = (playfield.half_width() - PLAYER_EDGE_INSET_X).max(0.0);
                let reach_y = (playfield.half_height() - PLAYER_EDGE_INSET_Y).max(0.0);
                let next = *position + *velocity * dt;
                *position = Vec2::new(
                    next.x.clamp(center.x - reach_x, center.x + reach_x),
                    next.y.clamp(center.y - reach_y, center.y + reach_y),
                );
            }
            Self::Drift { fall_speed, drag } => {
                let settle = Vec2::new(0.0, -*fall_speed);
                *velocity = velocity.lerp(settle, (*drag * dt).min(1.0));
                *position += *velocity * dt;
            }
        }
    }
}

/// Clamps `value` into `[low, high]`, collapsing to the midpoint when the range is inverted.
pub(crate) fn clamp_or_midpoint(value: f32, low: f32, high: f32) -> f32 {
    if low > high {
        (low + high) * 0.5
    } else {
        value.clamp(low, high)
    }
}
