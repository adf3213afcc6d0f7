//! Batched constraint solver for matrix mode.
//!
//! Gathers the sparse Jacobian rows of one constraint group, forms the
//! system `J M^-1 J^T lambda = -C` implicitly, relaxes it with Gauss-Seidel
//! sweeps and applies `delta_ep = M^-1 J^T lambda`. Two instances exist: a
//! standard solver for bilateral constraints and a contact solver that
//! clamps multipliers non-negative so contacts only ever push.
//!
//! The iterative projection path is the semantic reference; this solver has
//! to land close enough that the mode flag is a performance choice, not a
//! behavioral one.

use glam::DVec2;

use crate::constraint::{Constraint, ConstraintRow};
use crate::types::{Body, Particle};

/// Gauss-Seidel sweeps per solve call; the driver already loops the solver
/// `solver_iterations` times per tick.
const GAUSS_SEIDEL_SWEEPS: usize = 4;

#[derive(Debug)]
pub struct ProjectionSolver {
    /// Clamp lambda >= 0 (contact solver) or leave it free (standard).
    unilateral: bool,
    /// Cached inverse masses, one per particle.
    inv_mass: Vec<f64>,
    /// Scratch rows gathered from the constraint group.
    rows: Vec<ConstraintRow>,
    /// Scratch multipliers, one per row.
    lambdas: Vec<f64>,
    /// Accumulated M^-1 J^T lambda, one displacement per particle.
    displacement: Vec<DVec2>,
}

impl ProjectionSolver {
    #[must_use]
    pub fn new(unilateral: bool) -> Self {
        Self {
            unilateral,
            inv_mass: Vec::new(),
            rows: Vec::new(),
            lambdas: Vec::new(),
            displacement: Vec::new(),
        }
    }

    /// Cache the diagonal of M^-1. `scaled` reads the per-step scaled
    /// inverse masses instead of the plain ones.
    pub fn setup_mass(&mut self, particles: &[Particle], scaled: bool) {
        self.inv_mass.clear();
        self.inv_mass.extend(
            particles
                .iter()
                .map(|p| if scaled { p.tmass } else { p.imass }),
        );
    }

    /// Size the scratch buffers for a group of `constraints` over
    /// `particle_count` particles.
    pub fn setup_sizes(&mut self, particle_count: usize, constraints: &[Constraint]) {
        self.displacement.resize(particle_count, DVec2::ZERO);
        self.rows.reserve(constraints.len());
    }

    /// Linearize the group once, relax it, and push the result into the
    /// predicted positions (and committed positions when `stabilize`).
    pub fn solve_and_update(
        &mut self,
        particles: &mut [Particle],
        constraints: &[Constraint],
        bodies: &[Body],
        stabilize: bool,
    ) {
        self.rows.clear();
        for c in constraints {
            c.rows(particles, bodies, &mut self.rows);
        }
        if self.rows.is_empty() {
            return;
        }

        self.lambdas.clear();
        self.lambdas.resize(self.rows.len(), 0.0);
        self.displacement.clear();
        self.displacement.resize(particles.len(), DVec2::ZERO);

        // Row diagonals of J M^-1 J^T plus per-row relaxation.
        let diagonals: Vec<f64> = self
            .rows
            .iter()
            .map(|row| {
                let sum: f64 = row
                    .entries
                    .iter()
                    .map(|&(p, grad)| self.inv_mass[p] * grad.length_squared())
                    .sum();
                sum + row.relaxation
            })
            .collect();

        for _ in 0..GAUSS_SEIDEL_SWEEPS {
            for (r, row) in self.rows.iter().enumerate() {
                let diag = diagonals[r];
                if diag <= 0.0 {
                    continue;
                }

                // J_r applied to the current displacement estimate gives
                // (A lambda)_r without materializing A.
                let coupled: f64 = row
                    .entries
                    .iter()
                    .map(|&(p, grad)| grad.dot(self.displacement[p]))
                    .sum();

                let residual = -row.value - coupled - row.relaxation * self.lambdas[r];
                let mut lambda = self.lambdas[r] + residual / diag;
                if self.unilateral {
                    lambda = lambda.max(0.0);
                }

                let delta = lambda - self.lambdas[r];
                if delta == 0.0 {
                    continue;
                }
                self.lambdas[r] = lambda;
                for &(p, grad) in &row.entries {
                    self.displacement[p] += self.inv_mass[p] * delta * grad;
                }
            }
        }

        for (p, delta) in particles.iter_mut().zip(&self.displacement) {
            if p.imass == 0.0 {
                continue;
            }
            p.ep += *delta;
            if stabilize {
                p.p += *delta;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::DistanceConstraint;
    use crate::types::Phase;
    use glam::DVec2;

    #[test]
    fn batched_distance_solve_matches_the_iterative_result() {
        let mut particles = vec![
            Particle::new(DVec2::new(0.0, 0.0), 1.0, Phase::Solid),
            Particle::new(DVec2::new(2.0, 0.0), 1.0, Phase::Solid),
        ];
        let constraint = DistanceConstraint::new(0, 1, &particles);
        particles[1].ep = DVec2::new(3.0, 0.0);

        let group = vec![Constraint::Distance(constraint)];
        let mut solver = ProjectionSolver::new(false);
        solver.setup_mass(&particles, false);
        solver.setup_sizes(particles.len(), &group);
        solver.solve_and_update(&mut particles, &group, &[], false);

        let dist = particles[0].ep.distance(particles[1].ep);
        assert!((dist - 2.0).abs() < 1e-6, "distance after solve: {dist}");
    }

    #[test]
    fn contact_solver_only_pushes() {
        // A satisfied contact must not pull the pair together.
        let mut particles = vec![
            Particle::new(DVec2::new(0.0, 0.0), 1.0, Phase::Solid),
            Particle::new(DVec2::new(0.6, 0.0), 1.0, Phase::Solid),
        ];
        let group = vec![Constraint::Contact(crate::constraint::ContactConstraint::new(
            0, 1,
        ))];
        let mut solver = ProjectionSolver::new(true);
        solver.setup_mass(&particles, false);
        solver.setup_sizes(particles.len(), &group);
        solver.solve_and_update(&mut particles, &group, &[], false);

        let dist = particles[0].ep.distance(particles[1].ep);
        assert!(dist >= 0.6 - 1e-9, "contact pulled particles together");
    }
}
