//! # Frequency Refiner
//!
//! Sweeps integer periods around the best candidate's expected offset and
//! keeps the one with the smallest self-difference. That period is taken
//! as the signal's actual period.

use crate::error::TunerResult;
use crate::scorer::self_difference;

/// Outcome of one refinement sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Refinement {
    /// Best period in samples
    pub period: usize,
    /// Unweighted self-difference at `period`; infinite if nothing was scanned
    pub difference: f32,
    /// The sweep stopped early on a difference below tolerance
    pub within_tolerance: bool,
}

/// Scans periods `seed - radius .. seed + radius` (end exclusive).
///
/// The first period whose difference drops below `tolerance` is accepted
/// immediately, so with several near-perfect periods the lowest one wins
/// even if a later one is smaller. Without such a hit the smallest
/// difference wins, earliest first on ties. An empty sweep keeps `seed`.
///
/// Periods below 1 are skipped; the detector never configures a seed that
/// small.
pub fn refine_period(
    buffer: &[f32],
    seed: usize,
    radius: usize,
    search_length: usize,
    tolerance: f32,
) -> TunerResult<Refinement> {
    let start = seed.saturating_sub(radius).max(1);
    let end = seed + radius;

    let mut best = Refinement {
        period: seed,
        difference: f32::INFINITY,
        within_tolerance: false,
    };

    for period in start..end {
        let difference = self_difference(buffer, period, search_length)?;

        if difference < best.difference {
            best.difference = difference;
            best.period = period;
        }

        if difference < tolerance {
            best.period = period;
            best.difference = difference;
            best.within_tolerance = true;
            break;
        }
    }

    tracing::trace!(
        seed,
        period = best.period,
        difference = best.difference,
        within_tolerance = best.within_tolerance,
        "refined period"
    );
    Ok(best)
}
