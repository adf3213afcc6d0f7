//! Frictionless non-penetration contact between two particles.

use glam::DVec2;

use crate::types::{Particle, PARTICLE_DIAM};

use super::{pair_weights, ConstraintRow};

/// Enforces `|ep_i - ep_j| >= PARTICLE_DIAM` by separating the pair along
/// their current direction, weighted by inverse mass.
///
/// Used for solid-fluid and solid-gas pairs; solid-solid pairs take the
/// friction-aware [`super::RigidContactConstraint`] instead.
#[derive(Debug, Clone)]
pub struct ContactConstraint {
    pub i: usize,
    pub j: usize,
}

impl ContactConstraint {
    #[must_use]
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }

    pub fn project(&self, particles: &mut [Particle]) {
        let d = particles[self.i].ep - particles[self.j].ep;
        let dist = d.length();
        if dist >= PARTICLE_DIAM {
            return;
        }
        let Some((wi, wj)) = pair_weights(particles[self.i].imass, particles[self.j].imass)
        else {
            return;
        };

        // Coincident centers give no direction to separate along.
        let n = if dist < 1e-9 { DVec2::Y } else { d / dist };

        let depth = PARTICLE_DIAM - dist;
        particles[self.i].ep += wi * depth * n;
        particles[self.j].ep -= wj * depth * n;
    }

    pub fn rows(&self, particles: &[Particle], out: &mut Vec<ConstraintRow>) {
        let d = particles[self.i].ep - particles[self.j].ep;
        let dist = d.length();
        if dist >= PARTICLE_DIAM {
            return;
        }
        let n = if dist < 1e-9 { DVec2::Y } else { d / dist };
        out.push(ConstraintRow {
            value: dist - PARTICLE_DIAM,
            entries: vec![(self.i, n), (self.j, -n)],
            relaxation: 0.0,
        });
    }
}
