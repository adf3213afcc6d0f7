//! Simulation configuration.
//!
//! Everything here is fixed for the lifetime of a scene; geometry constants
//! (`PARTICLE_RAD` and friends) live in [`crate::types`] as compile-time
//! values.

use serde::Deserialize;

/// How constraint groups are driven each solver iteration.
///
/// The iterative path is authoritative for semantics; the matrix path batches
/// whole groups through a Gauss-Seidel solve and must produce comparable
/// results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverMode {
    Iterative,
    Matrix,
}

/// Tunable parameters for a [`crate::Simulation`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Sweeps over the non-stabilization constraint groups per tick.
    pub solver_iterations: usize,
    /// Pre-solver passes over the stabilization constraints per tick.
    pub stabilization_iterations: usize,
    /// Whether the pre-stabilization pass runs at all.
    pub stabilization: bool,
    /// Iterative projection or batched Gauss-Seidel.
    pub mode: SolverMode,
    /// Gravity multiplier for gas particles; below 1 models buoyant lift.
    pub gas_gravity_scale: f64,
    /// Seed for scene-construction randomness.
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            solver_iterations: 5,
            stabilization_iterations: 2,
            stabilization: true,
            mode: SolverMode::Iterative,
            gas_gravity_scale: 0.5,
            seed: 42,
        }
    }
}
