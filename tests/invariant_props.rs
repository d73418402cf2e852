use nasch_engine::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A valid ring: `cells` in 1..64, each empty or holding a speed in [0, max_speed].
fn ring_and_speed() -> impl Strategy<Value = (Highway, Speed)> {
    (0u32..8, 1usize..64).prop_flat_map(|(max_speed, cells)| {
        proptest::collection::vec(
            prop_oneof![Just(None), (0..=max_speed).prop_map(Some)],
            cells,
        )
        .prop_map(move |cells| (Highway::from_cells(cells), max_speed))
    })
}

proptest! {
    #[test]
    fn step_never_collides_or_breaks_speed_bounds(
        (highway, max_speed) in ring_and_speed(),
        probability in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = step(&highway, probability, max_speed, &mut rng)
            .expect("valid input never fails");

        prop_assert_eq!(next.len(), highway.len());
        prop_assert_eq!(next.vehicle_count(), highway.vehicle_count(), "vehicles must be conserved");
        for (_, v) in next.vehicles() {
            prop_assert!(v <= max_speed);
        }
    }

    #[test]
    fn vehicles_never_pass_their_leader(
        (highway, max_speed) in ring_and_speed(),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = step(&highway, 0.0, max_speed, &mut rng).unwrap();
        // With p = 0 each speed equals the clamped acceleration exactly.
        for (position, speed) in highway.vehicles() {
            let gap = gap_ahead(&highway, position).unwrap();
            let v = update::accelerate(speed, gap, max_speed);
            prop_assert!((v as usize) < gap);
            prop_assert_eq!(next.cell((position + v as usize) % highway.len()), Some(Some(v)));
        }
    }

    #[test]
    fn long_runs_keep_the_ring_valid(
        (highway, max_speed) in ring_and_speed(),
        probability in 0.0f64..=1.0,
        updates in 0usize..40,
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let vehicles = highway.vehicle_count();
        let history = simulate(highway.clone(), updates, probability, max_speed, &mut rng).unwrap();

        prop_assert_eq!(history.len(), updates + 1);
        prop_assert_eq!(history.initial(), &highway);
        for h in &history {
            prop_assert!(h.validate(max_speed).is_ok());
            prop_assert_eq!(h.vehicle_count(), vehicles);
        }
    }

    #[test]
    fn gap_points_at_the_nearest_vehicle(
        (highway, _max_speed) in ring_and_speed(),
    ) {
        let n = highway.len();
        for (position, _) in highway.vehicles() {
            let gap = gap_ahead(&highway, position).unwrap();
            prop_assert!(gap >= 1 && gap <= n);
            for d in 1..gap {
                prop_assert!(!highway.is_occupied((position + d) % n));
            }
            if gap < n {
                prop_assert!(highway.is_occupied((position + gap) % n));
            }
        }
    }

    #[test]
    fn builder_output_is_always_valid(
        cells in 1usize..200,
        frequency in 1usize..12,
        initial_speed in -10i64..20,
        randomize_frequency in any::<bool>(),
        randomize_speed in any::<bool>(),
        max_speed in 0u32..8,
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let h = construct_highway(
            cells, frequency, initial_speed, randomize_frequency, randomize_speed, max_speed, &mut rng,
        ).unwrap();
        prop_assert_eq!(h.len(), cells);
        prop_assert!(h.is_occupied(0));
        prop_assert!(h.validate(max_speed).is_ok());
        if !randomize_frequency {
            prop_assert_eq!(h.vehicle_count(), (cells + frequency - 1) / frequency);
        }
    }
}
