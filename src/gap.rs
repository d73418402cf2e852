// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ring Road Traffic Suite - Headway

use crate::types::{Highway, NaschError};

/// Distance to the next vehicle ahead of `position`, wrapping around the ring.
///
/// Returns the smallest `d >= 1` such that cell `(position + d) mod N` is
/// occupied, or `N` when no other vehicle is on the ring. The scan never
/// looks at more than `N - 1` cells.
pub fn gap_ahead(highway: &Highway, position: usize) -> Result<usize, NaschError> {
    let n = highway.len();
    if position >= n {
        return Err(NaschError::InvalidParameter(format!(
            "position {} outside ring of {} cells",
            position, n
        )));
    }
    Ok((1..n)
        .find(|d| highway.is_occupied((position + d) % n))
        .unwrap_or(n))
}
