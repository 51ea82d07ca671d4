//! Weighted variant selection and time-keyed difficulty ramps.

use std::time::Duration;

/// Ordered `(variant, weight)` pairs with a designated fallback variant.
///
/// Weights are not required to sum to one. Negative or non-finite weights are
/// stored as zero so a table can never bias selection backwards.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightTable<V> {
    entries: Vec<(V, f32)>,
    fallback: V,
}

impl<V: Copy> WeightTable<V> {
    /// Creates an empty table that always yields `fallback`.
    #[must_use]
    pub const fn new(fallback: V) -> Self {
        Self {
            entries: Vec::new(),
            fallback,
        }
    }

    /// Appends an entry, keeping declaration order.
    #[must_use]
    pub fn with_entry(mut self, variant: V, weight: f32) -> Self {
        let weight = if weight.is_finite() { weight.max(0.0) } else { 0.0 };
        self.entries.push((variant, weight));
        self
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[(V, f32)] {
        &self.entries
    }

    /// Variant returned when no entry carries weight.
    #[must_use]
    pub const fn fallback(&self) -> V {
        self.fallback
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.entries.iter().map(|(_, weight)| weight).sum()
    }
}

/// Picks a variant from `table` using a caller-supplied roll in `[0, 1)`.
///
/// Walks entries in declared order and returns the first whose cumulative
/// weight exceeds `roll * total`. Rolls outside the range are clamped into it.
#[must_use]
pub fn select<V: Copy>(table: &WeightTable<V>, roll: f32) -> V {
    let total = table.total();
    if total <= 0.0 {
        return table.fallback;
    }

    let roll = if roll.is_nan() {
        0.0
    } else {
        roll.clamp(0.0, 1.0 - f32::EPSILON)
    };
    let threshold = roll * total;

    let mut cumulative = 0.0;
    let mut last_positive = table.fallback;
    for (variant, weight) in &table.entries {
        if *weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_positive = *variant;
        if cumulative > threshold {
            return *variant;
        }
    }
    last_positive
}

/// Weight tables that change in discrete steps as level time elapses.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightRamp<V> {
    steps: Vec<(Duration, WeightTable<V>)>,
}

impl<V: Copy> WeightRamp<V> {
    /// Creates a ramp whose first bracket starts at zero.
    #[must_use]
    pub fn new(initial: WeightTable<V>) -> Self {
        Self {
            steps: vec![(Duration::ZERO, initial)],
        }
    }

    /// Adds a bracket that becomes active once `from` has elapsed.
    #[must_use]
    pub fn then_at(mut self, from: Duration, table: WeightTable<V>) -> Self {
        let index = self.steps.partition_point(|(start, _)| *start <= from);
        self.steps.insert(index, (from, table));
        self
    }

    /// Table of the latest bracket that started at or before `elapsed`.
    #[must_use]
    pub fn table_at(&self, elapsed: Duration) -> &WeightTable<V> {
        self.steps
            .iter()
            .rev()
            .find(|(start, _)| *start <= elapsed)
            .map_or(&self.steps[0].1, |(_, table)| table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Rock {
        Small,
        Medium,
        Large,
    }

    fn asteroid_table() -> WeightTable<Rock> {
        WeightTable::new(Rock::Small)
            .with_entry(Rock::Small, 0.7)
            .with_entry(Rock::Medium, 0.25)
            .with_entry(Rock::Large, 0.05)
    }

    #[test]
    fn selection_walks_cumulative_weights() {
        let table = asteroid_table();

        assert_eq!(select(&table, 0.0), Rock::Small);
        assert_eq!(select(&table, 0.69), Rock::Small);
        assert_eq!(select(&table, 0.71), Rock::Medium);
        assert_eq!(select(&table, 0.94), Rock::Medium);
        assert_eq!(select(&table, 0.96), Rock::Large);
        assert_eq!(select(&table, 0.999_999), Rock::Large);
    }

    #[test]
    fn zero_total_returns_fallback() {
        let table = WeightTable::new(Rock::Medium)
            .with_entry(Rock::Small, 0.0)
            .with_entry(Rock::Large, -3.0);

        assert_eq!(select(&table, 0.5), Rock::Medium);
        assert_eq!(select(&WeightTable::new(Rock::Large), 0.1), Rock::Large);
    }

    #[test]
    fn zero_weight_entries_are_never_selected() {
        let table = WeightTable::new(Rock::Small)
            .with_entry(Rock::Small, 0.0)
            .with_entry(Rock::Medium, 1.0)
            .with_entry(Rock::Large, 0.0);

        for step in 0..100 {
            assert_eq!(select(&table, step as f32 / 100.0), Rock::Medium);
        }
    }

    #[test]
    fn out_of_range_rolls_are_clamped() {
        let table = asteroid_table();

        assert_eq!(select(&table, -1.0), Rock::Small);
        assert_eq!(select(&table, 1.0), Rock::Large);
        assert_eq!(select(&table, f32::NAN), Rock::Small);
    }

    #[test]
    fn selection_frequencies_follow_weights() {
        let table = asteroid_table();
        let samples = 10_000;
        let small = (0..samples)
            .filter(|index| select(&table, *index as f32 / samples as f32) == Rock::Small)
            .count();

        assert!((6_900..=7_100).contains(&small), "small: {small}");
    }

    #[test]
    fn ramp_steps_forward_with_elapsed_time() {
        let ramp = WeightRamp::new(WeightTable::new(Rock::Small).with_entry(Rock::Small, 1.0))
            .then_at(
                Duration::from_secs(30),
                WeightTable::new(Rock::Small).with_entry(Rock::Large, 1.0),
            )
            .then_at(
                Duration::from_secs(15),
                WeightTable::new(Rock::Small).with_entry(Rock::Medium, 1.0),
            );

        assert_eq!(select(ramp.table_at(Duration::from_secs(14)), 0.5), Rock::Small);
        assert_eq!(select(ramp.table_at(Duration::from_secs(15)), 0.5), Rock::Medium);
        assert_eq!(select(ramp.table_at(Duration::from_secs(45)), 0.5), Rock::Large);
    }
}
