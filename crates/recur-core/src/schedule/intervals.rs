//! The interval ladder: base review intervals with jitter and clamping.

use rand::Rng;

use crate::error::CoreError;

/// Ordered ladder of base review intervals (days) with symmetric jitter
/// and min/max clamping.
///
/// The ladder flattens past its horizon: iterations beyond the configured
/// list reuse the last base interval. Jitter spreads reviews that would
/// otherwise cluster on identical future dates.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalTable {
    base: Vec<u32>,
    jitter: f64,
    min: u32,
    max: u32,
}

impl IntervalTable {
    /// Build a validated interval table.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfiguration`] if `base` is empty or
    /// contains zero-day entries, `jitter` lies outside `[0, 1]`,
    /// `min` is zero, or `max < min`.
    pub fn new(base: Vec<u32>, jitter: f64, min: u32, max: u32) -> Result<Self, CoreError> {
        if base.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "base intervals cannot be empty".to_string(),
            ));
        }
        if base.iter().any(|&days| days == 0) {
            return Err(CoreError::InvalidConfiguration(
                "base intervals must be positive day counts".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&jitter) {
            return Err(CoreError::InvalidConfiguration(format!(
                "jitter fraction {jitter} must be between 0 and 1"
            )));
        }
        if min < 1 {
            return Err(CoreError::InvalidConfiguration(
                "min interval must be at least 1 day".to_string(),
            ));
        }
        if max < min {
            return Err(CoreError::InvalidConfiguration(format!(
                "max interval {max} must be >= min interval {min}"
            )));
        }

        Ok(Self {
            base,
            jitter,
            min,
            max,
        })
    }

    /// Number of configured base intervals (the ladder horizon).
    #[must_use]
    pub fn len(&self) -> usize {
        self.base.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        // A constructed table is never empty; kept for API symmetry.
        self.base.is_empty()
    }

    /// Interval in days for the given iteration index (0-based).
    ///
    /// With jitter enabled and a nonzero fraction, the base value is
    /// perturbed uniformly within `base * (1 ± jitter)`, rounded to the
    /// nearest whole day, and floored at 1. The result is always clamped
    /// to `[min, max]`.
    #[must_use]
    pub fn interval_for<R: Rng>(&self, iteration: u32, jitter_enabled: bool, rng: &mut R) -> u32 {
        let index = (iteration as usize).min(self.base.len() - 1);
        let base = self.base[index];

        let interval = if jitter_enabled && self.jitter > 0.0 {
            self.apply_jitter(base, rng)
        } else {
            base
        };

        interval.clamp(self.min, self.max)
    }

    fn apply_jitter<R: Rng>(&self, base: u32, rng: &mut R) -> u32 {
        let variation = f64::from(base) * self.jitter;
        let perturbed = f64::from(base) + rng.gen_range(-variation..=variation);
        let rounded = perturbed.round();
        if rounded < 1.0 { 1 } else { rounded as u32 }
    }
}

#[cfg(test)]
mod tests {
    use super::IntervalTable;
    use crate::error::CoreError;
    use rand::{SeedableRng, rngs::StdRng};

    fn default_table() -> IntervalTable {
        IntervalTable::new(vec![1, 7, 18, 35], 0.15, 1, 365).expect("valid table")
    }

    #[test]
    fn without_jitter_returns_base_values() {
        let table = default_table();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(table.interval_for(0, false, &mut rng), 1);
        assert_eq!(table.interval_for(1, false, &mut rng), 7);
        assert_eq!(table.interval_for(2, false, &mut rng), 18);
        assert_eq!(table.interval_for(3, false, &mut rng), 35);
    }

    #[test]
    fn ladder_flattens_past_horizon() {
        let table = default_table();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(table.interval_for(4, false, &mut rng), 35);
        assert_eq!(table.interval_for(100, false, &mut rng), 35);
    }

    #[test]
    fn jitter_stays_within_fraction_and_clamp() {
        let table = IntervalTable::new(vec![10, 20], 0.2, 1, 365).expect("valid table");
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let first = table.interval_for(0, true, &mut rng);
            assert!((8..=12).contains(&first), "got {first}");

            let second = table.interval_for(1, true, &mut rng);
            assert!((16..=24).contains(&second), "got {second}");
        }
    }

    #[test]
    fn zero_jitter_fraction_disables_randomization() {
        let table = IntervalTable::new(vec![5], 0.0, 1, 365).expect("valid table");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(table.interval_for(0, true, &mut rng), 5);
        }
    }

    #[test]
    fn clamping_applies_without_jitter() {
        let table = IntervalTable::new(vec![1, 400], 0.0, 2, 90).expect("valid table");
        let mut rng = StdRng::seed_from_u64(7);

        assert_eq!(table.interval_for(0, false, &mut rng), 2);
        assert_eq!(table.interval_for(1, false, &mut rng), 90);
    }

    #[test]
    fn seeded_rng_makes_jitter_reproducible() {
        let table = default_table();

        let mut first = StdRng::seed_from_u64(99);
        let mut second = StdRng::seed_from_u64(99);
        for iteration in 0..8 {
            assert_eq!(
                table.interval_for(iteration, true, &mut first),
                table.interval_for(iteration, true, &mut second)
            );
        }
    }

    #[test]
    fn empty_base_is_invalid() {
        assert!(matches!(
            IntervalTable::new(vec![], 0.15, 1, 365),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn zero_day_base_entry_is_invalid() {
        assert!(matches!(
            IntervalTable::new(vec![1, 0, 10], 0.15, 1, 365),
            Err(CoreError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn out_of_range_jitter_is_invalid() {
        assert!(IntervalTable::new(vec![1], 1.5, 1, 365).is_err());
        assert!(IntervalTable::new(vec![1], -0.1, 1, 365).is_err());
    }

    #[test]
    fn bad_clamp_bounds_are_invalid() {
        assert!(IntervalTable::new(vec![1], 0.15, 0, 365).is_err());
        assert!(IntervalTable::new(vec![1], 0.15, 10, 5).is_err());
    }
}
