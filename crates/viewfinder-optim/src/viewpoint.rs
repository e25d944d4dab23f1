//! Solver output record.

use viewfinder_core::math::Real;

/// A solved (or candidate) viewpoint with its per-property breakdown.
///
/// `params` is the raw domain vector. `satisfactions[0]` is the
/// aggregated objective; the following entries line up with the
/// objective's properties, as do `in_screen_ratios` (index 0 holding the
/// product over all properties). A satisfaction of `-1.0` means the
/// value was never computed; check [`Viewpoint::is_valid`] before use.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewpoint {
    pub params: Vec<Real>,
    pub satisfactions: Vec<Real>,
    pub in_screen_ratios: Vec<Real>,
}

impl Viewpoint {
    /// Fallback returned when a search produced no valid viewpoint:
    /// origin looking down `+x` with a 60 degree field of view, and every
    /// satisfaction set to `-1`.
    pub fn sentinel(num_properties: usize) -> Self {
        Self {
            params: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 60.0],
            satisfactions: vec![-1.0; num_properties + 1],
            in_screen_ratios: vec![-1.0; num_properties + 1],
        }
    }

    /// Whether the objective value was actually computed.
    pub fn is_valid(&self) -> bool {
        self.satisfactions.first().is_some_and(|&s| s >= 0.0)
    }

    /// The aggregated objective value (`-1` for a sentinel).
    pub fn objective(&self) -> Real {
        self.satisfactions.first().copied().unwrap_or(-1.0)
    }
}
