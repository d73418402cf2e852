// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ring Road Traffic Suite - Type Definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Vehicle speed in cells per step.
pub type Speed = u32;

/// Speed cap used by the reference runs.
pub const DEFAULT_MAX_SPEED: Speed = 5;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Errors raised by highway construction and time evolution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NaschError {
    /// A caller-supplied parameter is outside its domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    /// A highway handed to the updater breaks the ring invariant.
    #[error("invalid highway state: {0}")]
    InvalidState(String),
    /// An internal consistency check failed mid-step.
    #[error("computation failure: {0}")]
    ComputationFailure(String),
}

/// Rejects NaN and anything outside `[0, 1]`. Never clamps.
pub fn validate_probability(probability: f64) -> Result<(), NaschError> {
    if !(0.0..=1.0).contains(&probability) {
        return Err(NaschError::InvalidParameter(format!(
            "probability must lie in [0, 1], got {}",
            probability
        )));
    }
    Ok(())
}

// ─── Highway ─────────────────────────────────────────────────────────────────

/// A fixed-length ring of cells. `None` marks an empty cell, `Some(v)` a
/// vehicle travelling at speed `v`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Highway {
    cells: Vec<Option<Speed>>,
}

impl Highway {
    /// A ring of `number_of_cells` empty cells.
    pub fn empty(number_of_cells: usize) -> Self {
        Self { cells: vec![None; number_of_cells] }
    }

    pub fn from_cells(cells: Vec<Option<Speed>>) -> Self {
        Self { cells }
    }

    /// Places vehicles given as `(position, speed)` pairs on an empty ring.
    pub fn from_vehicles(
        number_of_cells: usize,
        vehicles: &[(usize, Speed)],
    ) -> Result<Self, NaschError> {
        let mut highway = Self::empty(number_of_cells);
        for &(position, speed) in vehicles {
            let cell = highway.cells.get_mut(position).ok_or_else(|| {
                NaschError::InvalidParameter(format!(
                    "position {} outside ring of {} cells",
                    position, number_of_cells
                ))
            })?;
            if cell.is_some() {
                return Err(NaschError::InvalidParameter(format!(
                    "position {} holds more than one vehicle",
                    position
                )));
            }
            *cell = Some(speed);
        }
        Ok(highway)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Option<Speed>] {
        &self.cells
    }

    pub fn cell(&self, position: usize) -> Option<Option<Speed>> {
        self.cells.get(position).copied()
    }

    pub fn is_occupied(&self, position: usize) -> bool {
        matches!(self.cells.get(position), Some(Some(_)))
    }

    pub(crate) fn set(&mut self, position: usize, speed: Speed) {
        self.cells[position] = Some(speed);
    }

    /// Occupied cells in ring order as `(position, speed)`.
    pub fn vehicles(&self) -> impl Iterator<Item = (usize, Speed)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| cell.map(|speed| (i, speed)))
    }

    pub fn vehicle_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Checks the ring invariant against `max_speed`.
    pub fn validate(&self, max_speed: Speed) -> Result<(), NaschError> {
        if self.cells.is_empty() {
            return Err(NaschError::InvalidState("highway has no cells".to_string()));
        }
        if let Some((position, speed)) = self.vehicles().find(|&(_, v)| v > max_speed) {
            return Err(NaschError::InvalidState(format!(
                "vehicle at {} has speed {} above max_speed {}",
                position, speed, max_speed
            )));
        }
        Ok(())
    }

    /// One character per cell: `.` for empty, the speed digit otherwise
    /// (`+` for speeds above 9).
    pub fn to_ascii(&self) -> String {
        self.cells
            .iter()
            .map(|cell| match cell {
                None => '.',
                Some(v) => char::from_digit(*v, 10).unwrap_or('+'),
            })
            .collect()
    }
}

/// Reference list rendering, `-1` for empty cells.
impl fmt::Display for Highway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match cell {
                Some(v) => write!(f, "{}", v)?,
                None => write!(f, "-1")?,
            }
        }
        write!(f, "]")
    }
}

// ─── Simulation Parameters ───────────────────────────────────────────────────

/// Immutable parameters of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub number_of_cells: usize,
    pub max_speed: Speed,
    /// Random slowdown probability per vehicle per step.
    pub probability: f64,
    pub number_of_updates: usize,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            number_of_cells: 100,
            max_speed: DEFAULT_MAX_SPEED,
            probability: 0.1,
            number_of_updates: 10,
        }
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), NaschError> {
        if self.number_of_cells == 0 {
            return Err(NaschError::InvalidParameter(
                "number_of_cells must be positive".to_string(),
            ));
        }
        validate_probability(self.probability)
    }
}
