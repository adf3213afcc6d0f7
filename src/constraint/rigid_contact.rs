//! Solid-solid contact with SDF-aware normals and Coulomb-style friction.

use glam::{DMat2, DVec2};

use crate::types::{Body, Particle, PARTICLE_DIAM, PARTICLE_RAD};

use super::{pair_weights, ConstraintRow};

/// Non-penetration between two solid particles.
///
/// When one of the particles sits inside its body deeper than a particle
/// radius, the pair direction is meaningless; the constraint then borrows
/// the shallower particle's SDF normal, rotated into world frame by that
/// body's current orientation. After the positional push, tangential motion
/// is clamped by a static/kinetic friction law.
///
/// Stabilization copies project the committed position as well and weigh the
/// push by the per-step scaled mass.
#[derive(Debug, Clone)]
pub struct RigidContactConstraint {
    pub i: usize,
    pub j: usize,
    pub stabilize: bool,
}

impl RigidContactConstraint {
    #[must_use]
    pub fn new(i: usize, j: usize, stabilize: bool) -> Self {
        Self { i, j, stabilize }
    }

    /// World-frame SDF sample for a body-affiliated particle.
    fn sdf_of(index: usize, particles: &[Particle], bodies: &[Body]) -> Option<(DVec2, f64)> {
        let bod = particles[index].bod;
        if bod < 0 {
            return None;
        }
        let body = bodies.get(bod as usize)?;
        let data = body.sdf.get(&index)?;
        let world_normal = DMat2::from_angle(body.angle()) * data.normal;
        Some((world_normal, data.distance))
    }

    /// Position this contact resolves at: stabilization works on what is
    /// already committed, the regular copy on the prediction.
    fn pos(&self, part: &Particle) -> DVec2 {
        if self.stabilize {
            part.p
        } else {
            part.ep
        }
    }

    /// Direction along which particle `i` separates from `j`.
    fn contact_normal(&self, particles: &[Particle], bodies: &[Body]) -> DVec2 {
        let d = self.pos(&particles[self.i]) - self.pos(&particles[self.j]);
        let dist = d.length();
        let pair_normal = if dist < 1e-9 { DVec2::Y } else { d / dist };

        let sdf_i = Self::sdf_of(self.i, particles, bodies);
        let sdf_j = Self::sdf_of(self.j, particles, bodies);

        let interior_i = sdf_i.is_some_and(|(_, depth)| depth > PARTICLE_RAD);
        let interior_j = sdf_j.is_some_and(|(_, depth)| depth > PARTICLE_RAD);
        if !interior_i && !interior_j {
            return pair_normal;
        }

        // Use the shallower particle's surface normal: its direction out of
        // the body is still trustworthy.
        let depth_i = sdf_i.map_or(f64::INFINITY, |(_, depth)| depth);
        let depth_j = sdf_j.map_or(f64::INFINITY, |(_, depth)| depth);
        if depth_i <= depth_j {
            // i's outward normal pushes j away; i itself retreats inward.
            sdf_i.map_or(pair_normal, |(n, _)| -n)
        } else {
            sdf_j.map_or(pair_normal, |(n, _)| n)
        }
    }

    pub fn project(&self, particles: &mut [Particle], bodies: &[Body]) {
        let dist = self
            .pos(&particles[self.i])
            .distance(self.pos(&particles[self.j]));
        if dist >= PARTICLE_DIAM {
            return;
        }

        // Stabilization weighs by the scaled per-step mass.
        let (mi, mj) = if self.stabilize {
            (particles[self.i].tmass, particles[self.j].tmass)
        } else {
            (particles[self.i].imass, particles[self.j].imass)
        };
        let Some((wi, wj)) = pair_weights(mi, mj) else {
            return;
        };

        let n = self.contact_normal(particles, bodies);
        let depth = PARTICLE_DIAM - dist;

        let push_i = wi * depth * n;
        let push_j = wj * depth * n;
        particles[self.i].ep += push_i;
        particles[self.j].ep -= push_j;
        if self.stabilize {
            particles[self.i].p += push_i;
            particles[self.j].p -= push_j;
        }

        self.apply_friction(particles, n, depth, wi, wj);
    }

    /// Clamp relative tangential displacement by the resolved normal depth.
    fn apply_friction(
        &self,
        particles: &mut [Particle],
        n: DVec2,
        depth: f64,
        wi: f64,
        wj: f64,
    ) {
        let dp =
            (particles[self.i].ep - particles[self.i].p) - (particles[self.j].ep - particles[self.j].p);
        let tangential = dp - n * dp.dot(n);
        let len = tangential.length();
        if len < 1e-12 {
            return;
        }

        let mu_s = particles[self.i].s_friction.max(particles[self.j].s_friction);
        let mu_k = particles[self.i].k_friction.max(particles[self.j].k_friction);

        let correction = if len < mu_s * depth {
            tangential
        } else {
            tangential * (mu_k * depth / len).min(1.0)
        };

        particles[self.i].ep -= wi * correction;
        particles[self.j].ep += wj * correction;
        if self.stabilize {
            particles[self.i].p -= wi * correction;
            particles[self.j].p += wj * correction;
        }
    }

    pub fn rows(&self, particles: &[Particle], bodies: &[Body], out: &mut Vec<ConstraintRow>) {
        let dist = self
            .pos(&particles[self.i])
            .distance(self.pos(&particles[self.j]));
        if dist >= PARTICLE_DIAM {
            return;
        }
        let n = self.contact_normal(particles, bodies);
        out.push(ConstraintRow {
            value: dist - PARTICLE_DIAM,
            entries: vec![(self.i, n), (self.j, -n)],
            relaxation: 0.0,
        });
    }
}
