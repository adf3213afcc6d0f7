//! Gas density constraint.

use glam::DVec2;

use crate::types::Particle;

use super::fluid::{accumulate_deltas, density_rows, solve_lambdas};
use super::ConstraintRow;

/// Softer regularization than the fluid's: cohesion is weak, so the medium
/// expands to fill available space instead of beading up.
const RELAXATION: f64 = 0.1;

/// Joint density constraint over a group of gas particles.
///
/// Shares the fluid's kernel framework but skips the artificial-pressure
/// term; gravity scaling for gas happens in the simulation driver, not
/// here.
#[derive(Debug)]
pub struct GasConstraint {
    pub rest_density: f64,
    pub particles: Vec<usize>,
    lambdas: Vec<f64>,
    deltas: Vec<DVec2>,
}

impl GasConstraint {
    #[must_use]
    pub fn new(rest_density: f64, indices: Vec<usize>) -> Self {
        let n = indices.len();
        Self {
            rest_density,
            particles: indices,
            lambdas: vec![0.0; n],
            deltas: vec![DVec2::ZERO; n],
        }
    }

    pub fn project(&mut self, particles: &mut [Particle]) {
        solve_lambdas(
            &self.particles,
            particles,
            self.rest_density,
            RELAXATION,
            &mut self.lambdas,
        );
        accumulate_deltas(
            &self.particles,
            particles,
            self.rest_density,
            &self.lambdas,
            false,
            &mut self.deltas,
        );
        for (k, &i) in self.particles.iter().enumerate() {
            if particles[i].imass != 0.0 {
                particles[i].ep += self.deltas[k];
            }
        }
    }

    pub fn rows(&self, particles: &[Particle], out: &mut Vec<ConstraintRow>) {
        density_rows(&self.particles, particles, self.rest_density, RELAXATION, out);
    }
}
