// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ring Road Traffic Suite - Nagel–Schreckenberg Update Rule

//! One synchronous time step.
//!
//! Every vehicle reads the same frozen snapshot and writes into a freshly
//! allocated ring:
//!
//! 1. accelerate by one, capped by `max_speed` and by `gap - 1`;
//! 2. with probability `p`, slow down by one (floored at zero);
//! 3. advance `speed` cells, modulo the ring length.
//!
//! Because a vehicle never moves further than the cell behind its leader's
//! current position, and leaders never move backwards, no two vehicles can
//! land on the same cell.

use rand::Rng;

use crate::gap::gap_ahead;
use crate::types::{validate_probability, Highway, NaschError, Speed};

/// Speed after acceleration and the headway clamp, before random slowdown.
pub fn accelerate(speed: Speed, gap: usize, max_speed: Speed) -> Speed {
    let headway = gap.saturating_sub(1).min(Speed::MAX as usize) as Speed;
    speed.saturating_add(1).min(max_speed).min(headway)
}

/// Applies one time step and returns the next highway. The input is untouched.
pub fn step<R: Rng + ?Sized>(
    highway: &Highway,
    probability: f64,
    max_speed: Speed,
    rng: &mut R,
) -> Result<Highway, NaschError> {
    validate_probability(probability)?;
    highway.validate(max_speed)?;

    let n = highway.len();
    let mut next = Highway::empty(n);
    for (position, speed) in highway.vehicles() {
        let gap = gap_ahead(highway, position)?;
        let mut speed = accelerate(speed, gap, max_speed);

        // One draw per vehicle keeps the stream aligned across runs.
        if rng.gen::<f64>() < probability {
            speed = speed.saturating_sub(1);
        }

        let target = (position + speed as usize) % n;
        if next.is_occupied(target) {
            return Err(NaschError::ComputationFailure(format!(
                "vehicle from cell {} collided at cell {}",
                position, target
            )));
        }
        next.set(target, speed);
    }

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    #[test]
    fn acceleration_clamps() {
        assert_eq!(accelerate(0, 10, 5), 1);
        assert_eq!(accelerate(5, 10, 5), 5);
        assert_eq!(accelerate(4, 3, 5), 2);
        assert_eq!(accelerate(3, 1, 5), 0);
        assert_eq!(accelerate(0, 0, 5), 0);
        assert_eq!(accelerate(4, 0, 5), 0);
    }

    #[test]
    fn single_vehicle_accelerates_from_rest() {
        let mut r = rng();
        let h0 = Highway::from_vehicles(10, &[(0, 0)]).unwrap();
        let h1 = step(&h0, 0.0, 5, &mut r).unwrap();
        assert_eq!(h1.vehicles().collect::<Vec<_>>(), vec![(1, 1)]);
        let h2 = step(&h1, 0.0, 5, &mut r).unwrap();
        assert_eq!(h2.vehicles().collect::<Vec<_>>(), vec![(3, 2)]);
        let h3 = step(&h2, 0.0, 5, &mut r).unwrap();
        assert_eq!(h3.vehicles().collect::<Vec<_>>(), vec![(6, 3)]);
    }

    #[test]
    fn follower_stops_behind_leader() {
        // Leader at 3 is stuck behind 4; follower at 0 may close up to cell 2.
        let h = Highway::from_vehicles(10, &[(0, 5), (3, 0), (4, 0)]).unwrap();
        let next = step(&h, 0.0, 5, &mut rng()).unwrap();
        assert_eq!(next.cell(2), Some(Some(2)));
        assert_eq!(next.cell(3), Some(Some(0)));
        assert_eq!(next.cell(5), Some(Some(1)));
    }

    #[test]
    fn full_probability_slows_everyone() {
        let h = Highway::from_vehicles(20, &[(0, 2), (10, 0)]).unwrap();
        let next = step(&h, 1.0, 5, &mut rng()).unwrap();
        // 2 -> 3 -> 2 and 0 -> 1 -> 0
        assert_eq!(next.vehicles().collect::<Vec<_>>(), vec![(2, 2), (10, 0)]);
    }

    #[test]
    fn input_is_not_mutated() {
        let h = Highway::from_vehicles(10, &[(0, 1), (5, 2)]).unwrap();
        let before = h.clone();
        let _ = step(&h, 0.5, 5, &mut rng()).unwrap();
        assert_eq!(h, before);
    }

    #[test]
    fn wraps_around_the_ring() {
        let h = Highway::from_vehicles(10, &[(8, 4)]).unwrap();
        let next = step(&h, 0.0, 5, &mut rng()).unwrap();
        assert_eq!(next.vehicles().collect::<Vec<_>>(), vec![(3, 5)]);
    }

    #[test]
    fn rejects_bad_inputs() {
        let h = Highway::from_vehicles(10, &[(0, 6)]).unwrap();
        assert!(matches!(step(&h, 0.0, 5, &mut rng()), Err(NaschError::InvalidState(_))));
        assert!(matches!(
            step(&Highway::empty(0), 0.0, 5, &mut rng()),
            Err(NaschError::InvalidState(_))
        ));
        let ok = Highway::from_vehicles(10, &[(0, 1)]).unwrap();
        assert!(matches!(step(&ok, 1.5, 5, &mut rng()), Err(NaschError::InvalidParameter(_))));
    }

    #[test]
    fn empty_ring_stays_empty() {
        let next = step(&Highway::empty(7), 0.3, 5, &mut rng()).unwrap();
        assert_eq!(next, Highway::empty(7));
    }
}
