//! One-sided constraint keeping a particle inside the world box.

use glam::DVec2;

use crate::types::{Particle, Phase, PARTICLE_RAD};

use super::ConstraintRow;

/// Keeps one particle's center at least `PARTICLE_RAD` inside an axis-aligned
/// world plane.
///
/// Stabilization copies also shift the committed position `p`, removing
/// pre-existing penetration before the main solver runs. Solid particles get
/// a friction pass against the wall; fluids and gases slide freely.
#[derive(Debug, Clone)]
pub struct BoundaryConstraint {
    pub i: usize,
    /// Plane coordinate along the constrained axis.
    pub plane: f64,
    /// Constrains x when true, y otherwise.
    pub axis_is_x: bool,
    /// Whether this is the min side of the box.
    pub is_min: bool,
    pub stabilize: bool,
}

impl BoundaryConstraint {
    #[must_use]
    pub fn new(i: usize, plane: f64, axis_is_x: bool, is_min: bool, stabilize: bool) -> Self {
        Self {
            i,
            plane,
            axis_is_x,
            is_min,
            stabilize,
        }
    }

    /// Interior limit for the particle center.
    fn target(&self) -> f64 {
        if self.is_min {
            self.plane + PARTICLE_RAD
        } else {
            self.plane - PARTICLE_RAD
        }
    }

    fn coord(&self, v: DVec2) -> f64 {
        if self.axis_is_x {
            v.x
        } else {
            v.y
        }
    }

    fn axis(&self) -> DVec2 {
        if self.axis_is_x {
            DVec2::X
        } else {
            DVec2::Y
        }
    }

    pub fn project(&self, particles: &mut [Particle]) {
        let part = &particles[self.i];
        if part.imass == 0.0 {
            return;
        }

        // Stabilization removes penetration already present in the
        // committed position; the regular copy guards the prediction.
        let pos = if self.stabilize { part.p } else { part.ep };
        let target = self.target();
        let coord = self.coord(pos);
        let depth = if self.is_min {
            target - coord
        } else {
            coord - target
        };
        if depth <= 0.0 {
            return;
        }

        let push = if self.is_min { depth } else { -depth };
        let delta = self.axis() * push;
        let part = &mut particles[self.i];
        part.ep += delta;
        if self.stabilize {
            part.p += delta;
        }

        if part.ph == Phase::Solid {
            self.apply_friction(part, depth);
        }
    }

    /// Clamp tangential motion against the wall by the resolved depth.
    fn apply_friction(&self, part: &mut Particle, depth: f64) {
        let n = self.axis();
        let dp = part.ep - part.p;
        let tangential = dp - n * dp.dot(n);
        let len = tangential.length();
        if len < 1e-12 {
            return;
        }

        let correction = if len < part.s_friction * depth {
            tangential
        } else {
            tangential * (part.k_friction * depth / len).min(1.0)
        };
        part.ep -= correction;
        if self.stabilize {
            part.p -= correction;
        }
    }

    pub fn rows(&self, particles: &[Particle], out: &mut Vec<ConstraintRow>) {
        if particles[self.i].imass == 0.0 {
            return;
        }
        let pos = if self.stabilize {
            particles[self.i].p
        } else {
            particles[self.i].ep
        };
        let coord = self.coord(pos);
        let target = self.target();
        let (value, grad) = if self.is_min {
            (coord - target, self.axis())
        } else {
            (target - coord, -self.axis())
        };
        if value >= 0.0 {
            return;
        }
        out.push(ConstraintRow {
            value,
            entries: vec![(self.i, grad)],
            relaxation: 0.0,
        });
    }
}
