//! Solve-time configuration passed explicitly into the solver
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Options controlling a single solve call
///
/// There is no global solver configuration: every call to
/// [`solve`](crate::solver::solve) receives its own `SolveOptions`, so two
/// solves with different tolerances or limits never interfere.
///
/// # Examples
/// ```rust
/// use oxylp_core::configuration::SolveOptionsBuilder;
/// let options = SolveOptionsBuilder::default()
///     .node_limit(Some(500))
///     .epsilon(1e-8)
///     .build()
///     .unwrap();
/// ```
#[derive(Builder, Debug, Clone, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Wall-clock limit for the whole solve, None for unlimited
    #[builder(default = "None")]
    pub time_limit: Option<Duration>,
    /// Maximum number of branch-and-bound nodes to explore, None for unlimited
    #[builder(default = "None")]
    pub node_limit: Option<u64>,
    /// Tolerance below which simplex values are treated as zero
    #[builder(default = "1e-9")]
    pub epsilon: f64,
    /// Tolerance for deciding that a relaxed value is integral
    ///
    /// Coarser than `epsilon`: pivoting round-off routinely exceeds the
    /// simplex zero tolerance.
    #[builder(default = "1e-6")]
    pub integrality_tolerance: f64,
    /// Pivot cap multiplier; a single simplex run may perform at most
    /// `max_pivots_per_variable * (rows + columns)` pivots before it is
    /// aborted with [`SolverError::PivotLimit`](crate::solver::SolverError)
    #[builder(default = "100")]
    pub max_pivots_per_variable: usize,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions {
            time_limit: None,
            node_limit: None,
            epsilon: 1e-9,
            integrality_tolerance: 1e-6,
            max_pivots_per_variable: 100,
        }
    }
}

impl SolveOptions {
    /// Pivot cap for a problem with the given standard-form dimensions
    pub(crate) fn pivot_cap(&self, rows: usize, columns: usize) -> usize {
        self.max_pivots_per_variable
            .saturating_mul(rows + columns)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = SolveOptions::default();
        assert!(options.time_limit.is_none());
        assert!(options.node_limit.is_none());
        assert!((options.epsilon - 1e-9).abs() < 1e-25);
        assert!((options.integrality_tolerance - 1e-6).abs() < 1e-25);
    }

    #[test]
    fn builder_overrides() {
        let options = SolveOptionsBuilder::default()
            .node_limit(Some(10))
            .epsilon(1e-7)
            .build()
            .unwrap();
        assert_eq!(options.node_limit, Some(10));
        assert!((options.epsilon - 1e-7).abs() < 1e-25);
        // Unset fields keep their defaults
        assert!(options.time_limit.is_none());
        assert_eq!(options.max_pivots_per_variable, 100);
    }

    #[test]
    fn pivot_cap_scales_with_size() {
        let options = SolveOptions::default();
        assert_eq!(options.pivot_cap(3, 7), 1000);
    }
}
