// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ring Road Traffic Suite - Initial State Construction

//! Seeds a run with an initial highway.
//!
//! Vehicles are placed from cell 0 onward, stepping `frequency` cells at a
//! time (or a uniform draw from `[1, frequency]` when placement is
//! randomized) until the position runs off the end of the ring. Each vehicle
//! starts at `initial_speed` or a uniform draw from `[0, max_speed]`, clamped
//! into `[0, max_speed]` either way.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::types::{Highway, NaschError, Speed, DEFAULT_MAX_SPEED};

/// Recipe for an initial highway. Cheap to copy, so the stateful driver keeps
/// one around to rebuild on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighwayBuilder {
    pub number_of_cells: usize,
    pub frequency: usize,
    /// Signed so that out-of-range requests clamp instead of failing.
    pub initial_speed: i64,
    pub randomize_frequency: bool,
    pub randomize_speed: bool,
    pub max_speed: Speed,
}

impl HighwayBuilder {
    pub fn new(number_of_cells: usize, frequency: usize, initial_speed: i64) -> Self {
        Self {
            number_of_cells,
            frequency,
            initial_speed,
            randomize_frequency: false,
            randomize_speed: false,
            max_speed: DEFAULT_MAX_SPEED,
        }
    }

    pub fn randomize_frequency(mut self, on: bool) -> Self {
        self.randomize_frequency = on;
        self
    }

    pub fn randomize_speed(mut self, on: bool) -> Self {
        self.randomize_speed = on;
        self
    }

    pub fn max_speed(mut self, max_speed: Speed) -> Self {
        self.max_speed = max_speed;
        self
    }

    /// True when the result does not depend on the generator.
    pub fn is_deterministic(&self) -> bool {
        !self.randomize_frequency && !self.randomize_speed
    }

    pub fn validate(&self) -> Result<(), NaschError> {
        if self.number_of_cells == 0 {
            return Err(NaschError::InvalidParameter(
                "number_of_cells must be positive".to_string(),
            ));
        }
        // A zero stride never advances; a zero upper bound leaves [1, 0] empty.
        if self.frequency == 0 {
            return Err(NaschError::InvalidParameter(
                "frequency must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the highway. Per vehicle the speed is drawn before the stride.
    pub fn build<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Highway, NaschError> {
        self.validate()?;

        let mut highway = Highway::empty(self.number_of_cells);
        let mut position = 0;
        while position < self.number_of_cells {
            let speed = if self.randomize_speed {
                rng.gen_range(0..=self.max_speed)
            } else {
                self.initial_speed.clamp(0, self.max_speed as i64) as Speed
            };
            highway.set(position, speed);

            position += if self.randomize_frequency {
                rng.gen_range(1..=self.frequency)
            } else {
                self.frequency
            };
        }

        tracing::debug!(
            cells = self.number_of_cells,
            vehicles = highway.vehicle_count(),
            "constructed highway"
        );
        Ok(highway)
    }
}

/// Free-function form of [`HighwayBuilder::build`].
pub fn construct_highway<R: Rng + ?Sized>(
    number_of_cells: usize,
    frequency: usize,
    initial_speed: i64,
    randomize_frequency: bool,
    randomize_speed: bool,
    max_speed: Speed,
    rng: &mut R,
) -> Result<Highway, NaschError> {
    HighwayBuilder::new(number_of_cells, frequency, initial_speed)
        .randomize_frequency(randomize_frequency)
        .randomize_speed(randomize_speed)
        .max_speed(max_speed)
        .build(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    #[test]
    fn regular_placement() {
        let h = HighwayBuilder::new(10, 3, 2).build(&mut rng()).unwrap();
        assert_eq!(h.vehicles().collect::<Vec<_>>(), vec![(0, 2), (3, 2), (6, 2), (9, 2)]);
    }

    #[test]
    fn reference_demo_layout() {
        let h = HighwayBuilder::new(100, 5, 2).build(&mut rng()).unwrap();
        assert_eq!(h.len(), 100);
        assert_eq!(h.vehicle_count(), 20);
        assert!(h.vehicles().all(|(p, v)| p % 5 == 0 && v == 2));
    }

    #[test]
    fn initial_speed_is_clamped() {
        let high = HighwayBuilder::new(4, 2, 42).max_speed(3).build(&mut rng()).unwrap();
        assert!(high.vehicles().all(|(_, v)| v == 3));
        let low = HighwayBuilder::new(4, 2, -4).build(&mut rng()).unwrap();
        assert!(low.vehicles().all(|(_, v)| v == 0));
    }

    #[test]
    fn zero_frequency_is_rejected_before_placement() {
        for randomize in [false, true] {
            let result = HighwayBuilder::new(10, 0, 1)
                .randomize_frequency(randomize)
                .build(&mut rng());
            assert!(matches!(result, Err(NaschError::InvalidParameter(_))));
        }
    }

    #[test]
    fn zero_cells_is_rejected() {
        let result = construct_highway(0, 1, 1, false, false, 5, &mut rng());
        assert!(matches!(result, Err(NaschError::InvalidParameter(_))));
    }

    #[test]
    fn randomized_build_respects_bounds() {
        let mut r = rng();
        for _ in 0..50 {
            let h = construct_highway(60, 4, 0, true, true, 5, &mut r).unwrap();
            assert!(h.is_occupied(0), "placement always starts at cell 0");
            assert!(h.validate(5).is_ok());
            let positions: Vec<usize> = h.vehicles().map(|(p, _)| p).collect();
            for pair in positions.windows(2) {
                let stride = pair[1] - pair[0];
                assert!((1..=4).contains(&stride), "stride {} out of [1, 4]", stride);
            }
        }
    }

    #[test]
    fn same_seed_same_highway() {
        let builder = HighwayBuilder::new(50, 6, 0).randomize_frequency(true).randomize_speed(true);
        let a = builder.build(&mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        let b = builder.build(&mut ChaCha8Rng::seed_from_u64(11)).unwrap();
        assert_eq!(a, b);
        assert!(!builder.is_deterministic());
    }
}
