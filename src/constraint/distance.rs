//! Bilateral distance constraint between two particles.

use crate::types::Particle;

use super::{pair_weights, ConstraintRow};

/// Holds `|ep_i - ep_j|` at a rest length captured at construction time.
#[derive(Debug, Clone)]
pub struct DistanceConstraint {
    pub i: usize,
    pub j: usize,
    pub rest: f64,
}

impl DistanceConstraint {
    /// Build a constraint whose rest length is the particles' current
    /// separation.
    #[must_use]
    pub fn new(i: usize, j: usize, particles: &[Particle]) -> Self {
        let rest = particles[i].p.distance(particles[j].p);
        Self { i, j, rest }
    }

    pub fn project(&self, particles: &mut [Particle]) {
        let d = particles[self.i].ep - particles[self.j].ep;
        let dist = d.length();
        if dist < 1e-9 {
            return;
        }
        let Some((wi, wj)) = pair_weights(particles[self.i].imass, particles[self.j].imass)
        else {
            return;
        };

        let correction = (dist - self.rest) * (d / dist);
        particles[self.i].ep -= wi * correction;
        particles[self.j].ep += wj * correction;
    }

    pub fn rows(&self, particles: &[Particle], out: &mut Vec<ConstraintRow>) {
        let d = particles[self.i].ep - particles[self.j].ep;
        let dist = d.length();
        if dist < 1e-9 {
            return;
        }
        let n = d / dist;
        out.push(ConstraintRow {
            value: dist - self.rest,
            entries: vec![(self.i, n), (self.j, -n)],
            relaxation: 0.0,
        });
    }

    /// Current absolute violation, used by diagnostics and tests.
    #[must_use]
    pub fn violation(&self, particles: &[Particle]) -> f64 {
        (particles[self.i].p.distance(particles[self.j].p) - self.rest).abs()
    }
}
