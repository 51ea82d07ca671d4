//! Death side effects: asteroid splitting and currency drops.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use starfall_core::EntityKind;

/// Positional offsets of the two split children relative to the parent.
const SPLIT_OFFSETS: [Vec2; 2] = [Vec2::new(-0.5, 0.3), Vec2::new(0.5, 0.3)];
/// Launch velocities of the two split children, on top of the base fall.
const SPLIT_VELOCITIES: [Vec2; 2] = [Vec2::new(-1.0, -3.0), Vec2::new(1.0, -3.0)];

const SHARD_COUNT_MIN: u32 = 3;
const SHARD_COUNT_MAX: u32 = 6;
const SHARD_SCATTER_MIN: f32 = 0.4;
const SHARD_SCATTER_MAX: f32 = 1.0;
const SHARD_SCATTER_DROP: f32 = 0.25;
const SHARD_BURST_MIN: f32 = 1.3;
const SHARD_BURST_MAX: f32 = 2.3;

/// Probability that a rare alien leaves goo behind.
const GOO_DROP_CHANCE: f32 = 0.4;
/// Initial fall speed of dropped goo.
const GOO_FALL_SPEED: f32 = 2.0;

/// Entity created as a side effect of a death.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Offspring {
    pub(crate) kind: EntityKind,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
}

/// Children produced when a splittable entity is destroyed by damage.
///
/// Children keep falling at `fall_speed` in addition to their launch velocity.
pub(crate) fn split_children(kind: EntityKind, position: Vec2, fall_speed: f32) -> Vec<Offspring> {
    let Some(child) = kind.split_into() else {
        return Vec::new();
    };
    SPLIT_OFFSETS
        .iter()
        .zip(SPLIT_VELOCITIES.iter())
        .map(|(offset, velocity)| Offspring {
            kind: child,
            position: position + *offset,
            velocity: *velocity + Vec2::new(0.0, -fall_speed),
        })
        .collect()
}

/// Pickups dropped by an entity of `kind` dying at `position`.
pub(crate) fn reward_drops<R>(kind: EntityKind, position: Vec2, rng: &mut R) -> Vec<Offspring>
where
    R: Rng + ?Sized,
{
    match kind {
        EntityKind::AsteroidLarge => scatter_shards(position, rng),
        EntityKind::AlienRare => {
            if rng.gen::<f32>() < GOO_DROP_CHANCE {
                vec![Offspring {
                    kind: EntityKind::Goo,
                    position,
                    velocity: Vec2::new(0.0, -GOO_FALL_SPEED),
                }]
            } else {
                Vec::new()
            }
        }
        _ => Vec::new(),
    }
}

fn scatter_shards<R>(origin: Vec2, rng: &mut R) -> Vec<Offspring>
where
    R: Rng + ?Sized,
{
    let count = rng.gen_range(SHARD_COUNT_MIN..=SHARD_COUNT_MAX);
    (0..count)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let direction = Vec2::new(angle.cos(), angle.sin());
            let radius = rng.gen_range(SHARD_SCATTER_MIN..=SHARD_SCATTER_MAX);
            let burst = rng.gen_range(SHARD_BURST_MIN..=SHARD_BURST_MAX);
            Offspring {
                kind: EntityKind::Shard,
                position: origin + direction * radius + Vec2::new(0.0, -SHARD_SCATTER_DROP),
                velocity: direction * burst,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn large_asteroid_splits_into_two_mediums() {
        let children = split_children(EntityKind::AsteroidLarge, Vec2::new(1.0, 2.0), 5.0);

        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind, EntityKind::AsteroidMedium);
        assert_eq!(children[0].position, Vec2::new(0.5, 2.3));
        assert_eq!(children[1].position, Vec2::new(1.5, 2.3));
        assert_eq!(children[0].velocity, Vec2::new(-1.0, -8.0));
        assert_eq!(children[1].velocity, Vec2::new(1.0, -8.0));
    }

    #[test]
    fn small_asteroids_and_aliens_do_not_split() {
        assert!(split_children(EntityKind::AsteroidSmall, Vec2::ZERO, 5.0).is_empty());
        assert!(split_children(EntityKind::AlienRare, Vec2::ZERO, 5.0).is_empty());
    }

    #[test]
    fn large_asteroid_drops_three_to_six_shards_near_origin() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let drops = reward_drops(EntityKind::AsteroidLarge, Vec2::ZERO, &mut rng);
            assert!((3..=6).contains(&drops.len()));
            for shard in drops {
                assert_eq!(shard.kind, EntityKind::Shard);
                let offset = shard.position - Vec2::new(0.0, -SHARD_SCATTER_DROP);
                assert!(offset.length() <= SHARD_SCATTER_MAX + 1e-4);
                assert!(offset.length() >= SHARD_SCATTER_MIN - 1e-4);
                assert!(shard.velocity.length() >= SHARD_BURST_MIN - 1e-4);
            }
        }
    }

    #[test]
    fn rare_alien_goo_drop_rate_is_roughly_forty_percent() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let drops = (0..2_000)
            .filter(|_| !reward_drops(EntityKind::AlienRare, Vec2::ZERO, &mut rng).is_empty())
            .count();
        assert!((700..=900).contains(&drops), "goo drops: {drops}");
    }

    #[test]
    fn medium_asteroids_and_normal_aliens_drop_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(reward_drops(EntityKind::AsteroidMedium, Vec2::ZERO, &mut rng).is_empty());
        assert!(reward_drops(EntityKind::AlienNormal, Vec2::ZERO, &mut rng).is_empty());
    }
}
