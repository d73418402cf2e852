// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ring Road Traffic Suite - Simulation Core

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::builder::HighwayBuilder;
use crate::observables::Observables;
use crate::types::*;
use crate::update::step;

// ─── History ─────────────────────────────────────────────────────────────────

/// Snapshots of one run, the initial state first. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistoryRepr")]
pub struct History {
    snapshots: Vec<Highway>,
}

#[derive(Deserialize)]
struct HistoryRepr {
    snapshots: Vec<Highway>,
}

impl TryFrom<HistoryRepr> for History {
    type Error = NaschError;

    fn try_from(repr: HistoryRepr) -> Result<Self, Self::Error> {
        if repr.snapshots.is_empty() {
            return Err(NaschError::InvalidState(
                "history must hold at least its initial state".to_string(),
            ));
        }
        Ok(Self { snapshots: repr.snapshots })
    }
}

impl History {
    fn starting_at(initial: Highway, capacity: usize) -> Self {
        let mut snapshots = Vec::with_capacity(capacity);
        snapshots.push(initial);
        Self { snapshots }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false: a history holds at least its initial state.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn initial(&self) -> &Highway {
        &self.snapshots[0]
    }

    pub fn last(&self) -> &Highway {
        &self.snapshots[self.snapshots.len() - 1]
    }

    pub fn get(&self, tick: usize) -> Option<&Highway> {
        self.snapshots.get(tick)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Highway> {
        self.snapshots.iter()
    }

    pub fn into_snapshots(self) -> Vec<Highway> {
        self.snapshots
    }

    pub fn observables(&self) -> Vec<Observables> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(t, h)| Observables::from_highway(h, t as u64))
            .collect()
    }

    /// One ASCII row per snapshot, time running downward.
    pub fn space_time_diagram(&self) -> String {
        let mut out = String::new();
        for highway in &self.snapshots {
            out.push_str(&highway.to_ascii());
            out.push('\n');
        }
        out
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Highway;
    type IntoIter = std::slice::Iter<'a, Highway>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// Runs `number_of_updates` steps from `initial_highway` and returns every
/// state, `number_of_updates + 1` in all. Steps are strictly sequential and
/// the first failing step aborts the run.
pub fn simulate<R: Rng + ?Sized>(
    initial_highway: Highway,
    number_of_updates: usize,
    probability: f64,
    max_speed: Speed,
    rng: &mut R,
) -> Result<History, NaschError> {
    validate_probability(probability)?;
    initial_highway.validate(max_speed)?;

    tracing::info!(
        cells = initial_highway.len(),
        vehicles = initial_highway.vehicle_count(),
        updates = number_of_updates,
        probability,
        max_speed,
        "starting simulation"
    );

    let mut history = History::starting_at(initial_highway, number_of_updates + 1);
    for t in 0..number_of_updates {
        let next = step(history.last(), probability, max_speed, rng)?;
        if tracing::enabled!(tracing::Level::DEBUG) {
            let obs = Observables::from_highway(&next, t as u64 + 1);
            tracing::debug!(tick = obs.tick, mean_speed = obs.mean_speed, flow = obs.flow, "step");
        }
        history.snapshots.push(next);
    }

    tracing::info!(snapshots = history.len(), "simulation finished");
    Ok(history)
}

// ─── RingRoadSimulation ──────────────────────────────────────────────────────

/// Outcome of a single tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickResult {
    pub tick: u64,
    pub highway: Highway,
    pub observables: Observables,
}

/// Tick-at-a-time driver owning its highway and a seeded generator.
///
/// When built from a recipe the generator seeds construction first and then
/// every step, so `reset_core` replays the run exactly.
#[wasm_bindgen]
pub struct RingRoadSimulation {
    pub(crate) builder: Option<HighwayBuilder>,
    pub(crate) max_speed: Speed,
    pub(crate) probability: f64,
    pub(crate) seed: u64,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) highway: Highway,
    pub(crate) current_tick: u64,
}

impl RingRoadSimulation {
    pub fn from_builder(
        builder: HighwayBuilder,
        probability: f64,
        seed: u64,
    ) -> Result<Self, NaschError> {
        validate_probability(probability)?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let highway = builder.build(&mut rng)?;
        Ok(Self {
            builder: Some(builder),
            max_speed: builder.max_speed,
            probability,
            seed,
            rng,
            highway,
            current_tick: 0,
        })
    }

    /// Starts from a caller-supplied highway. Such runs cannot be reset.
    pub fn from_highway(
        highway: Highway,
        max_speed: Speed,
        probability: f64,
        seed: u64,
    ) -> Result<Self, NaschError> {
        validate_probability(probability)?;
        highway.validate(max_speed)?;
        Ok(Self {
            builder: None,
            max_speed,
            probability,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            highway,
            current_tick: 0,
        })
    }

    pub fn highway(&self) -> &Highway {
        &self.highway
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn max_speed(&self) -> Speed {
        self.max_speed
    }

    pub fn probability(&self) -> f64 {
        self.probability
    }

    pub fn observables(&self) -> Observables {
        Observables::from_highway(&self.highway, self.current_tick)
    }

    fn advance(&mut self) -> Result<(), NaschError> {
        self.highway = step(&self.highway, self.probability, self.max_speed, &mut self.rng)?;
        self.current_tick += 1;
        Ok(())
    }

    pub fn tick_core(&mut self) -> Result<TickResult, NaschError> {
        self.advance()?;

        let observables = self.observables();
        tracing::debug!(
            tick = self.current_tick,
            mean_speed = observables.mean_speed,
            stopped = observables.stopped_count,
            "tick"
        );
        Ok(TickResult { tick: self.current_tick, highway: self.highway.clone(), observables })
    }

    /// Runs `ticks` steps without collecting snapshots.
    pub fn run_batch_core(&mut self, ticks: u32) -> Result<(), NaschError> {
        for _ in 0..ticks {
            self.advance()?;
        }
        Ok(())
    }

    /// Rebuilds the initial highway from the stored recipe and seed.
    pub fn reset_core(&mut self) -> Result<(), NaschError> {
        let builder = self.builder.ok_or_else(|| {
            NaschError::InvalidParameter(
                "simulation started from an explicit highway has no recipe to rebuild".to_string(),
            )
        })?;
        *self = Self::from_builder(builder, self.probability, self.seed)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_initial_state_first() {
        let initial = Highway::from_vehicles(12, &[(0, 1), (6, 0)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let history = simulate(initial.clone(), 4, 0.2, 5, &mut rng).unwrap();
        assert_eq!(history.len(), 5);
        assert_eq!(history.initial(), &initial);
        assert!(!history.is_empty());
        assert_eq!(history.get(4), Some(history.last()));
        assert_eq!(history.get(5), None);
    }

    #[test]
    fn zero_updates_returns_only_initial() {
        let initial = Highway::from_vehicles(5, &[(2, 0)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let history = simulate(initial.clone(), 0, 0.5, 5, &mut rng).unwrap();
        assert_eq!(history.into_snapshots(), vec![initial]);
    }

    #[test]
    fn simulate_propagates_invalid_state() {
        let initial = Highway::from_vehicles(5, &[(2, 9)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(matches!(
            simulate(initial, 3, 0.0, 5, &mut rng),
            Err(NaschError::InvalidState(_))
        ));
    }

    #[test]
    fn deserializing_an_empty_history_fails() {
        let result = serde_json::from_str::<History>(r#"{"snapshots":[]}"#);
        let err = result.expect_err("empty history must be rejected");
        assert!(err.to_string().contains("at least its initial state"), "{}", err);
    }

    #[test]
    fn history_round_trips_through_json() {
        let initial = Highway::from_vehicles(6, &[(1, 2)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let history = simulate(initial, 3, 0.5, 5, &mut rng).unwrap();
        let json = serde_json::to_string(&history).unwrap();
        let back: History = serde_json::from_str(&json).unwrap();
        assert_eq!(back, history);
        assert!(!back.is_empty());
        assert_eq!(back.initial(), history.initial());
    }

    #[test]
    fn space_time_diagram_has_one_row_per_snapshot() {
        let initial = Highway::from_vehicles(6, &[(0, 0)]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let history = simulate(initial, 2, 0.0, 5, &mut rng).unwrap();
        assert_eq!(history.space_time_diagram(), "0.....\n.1....\n...2..\n");
    }

    #[test]
    fn reset_replays_the_same_run() {
        let builder = HighwayBuilder::new(40, 3, 0).randomize_speed(true);
        let mut sim = RingRoadSimulation::from_builder(builder, 0.3, 99).unwrap();
        let initial = sim.highway().clone();
        let first: Vec<Highway> = (0..5).map(|_| sim.tick_core().unwrap().highway).collect();

        sim.reset_core().unwrap();
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.highway(), &initial);
        let second: Vec<Highway> = (0..5).map(|_| sim.tick_core().unwrap().highway).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn run_batch_advances_ticks() {
        let builder = HighwayBuilder::new(30, 4, 1);
        let mut sim = RingRoadSimulation::from_builder(builder, 0.1, 5).unwrap();
        sim.run_batch_core(7).unwrap();
        assert_eq!(sim.current_tick(), 7);
        assert_eq!(sim.highway().vehicle_count(), 8);
    }

    #[test]
    fn reset_without_recipe_fails() {
        let h = Highway::from_vehicles(10, &[(0, 0)]).unwrap();
        let mut sim = RingRoadSimulation::from_highway(h, 5, 0.0, 1).unwrap();
        sim.tick_core().unwrap();
        assert!(matches!(sim.reset_core(), Err(NaschError::InvalidParameter(_))));
    }
}
