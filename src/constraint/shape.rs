//! Rigid-body shape matching.

use glam::{DMat2, DVec2};

use crate::types::Particle;

/// Pulls a body's particles toward the best-fit rigid transform of their
/// rest layout.
///
/// Each projection recomputes the mass-weighted center of mass, extracts the
/// optimal rotation with the 2D reduction of Horn's method, and moves every
/// member toward its goal position. The constraint doubles as the body's
/// record of its current center of mass and orientation.
#[derive(Debug)]
pub struct TotalShapeConstraint {
    /// Member particle indices.
    pub particles: Vec<usize>,
    /// Rest offsets from the rest center of mass, mass-weighted.
    pub rs: Vec<DVec2>,
    /// Center of mass as of the last projection.
    pub com: DVec2,
    /// Rotation relative to the rest layout, radians.
    pub angle: f64,
    /// 1.0 is fully rigid; lower values let the body flex.
    pub stiffness: f64,
}

impl TotalShapeConstraint {
    /// Capture the rest configuration of `members` from current positions.
    ///
    /// Callers guarantee every member has finite mass.
    #[must_use]
    pub fn new(particles: &[Particle], members: Vec<usize>) -> Self {
        let com = weighted_com(particles, &members, |p| p.p);
        let rs = members.iter().map(|&k| particles[k].p - com).collect();
        Self {
            particles: members,
            rs,
            com,
            angle: 0.0,
            stiffness: 1.0,
        }
    }

    pub fn project(&mut self, particles: &mut [Particle]) {
        let com = weighted_com(particles, &self.particles, |p| p.ep);

        // Covariance of current offsets against rest offsets.
        let mut a00 = 0.0;
        let mut a01 = 0.0;
        let mut a10 = 0.0;
        let mut a11 = 0.0;
        for (k, &idx) in self.particles.iter().enumerate() {
            let m = particles[idx].mass();
            let cur = particles[idx].ep - com;
            let rest = self.rs[k];
            a00 += m * cur.x * rest.x;
            a01 += m * cur.x * rest.y;
            a10 += m * cur.y * rest.x;
            a11 += m * cur.y * rest.y;
        }

        // Degenerate covariance (all offsets collapsed): leave the body be.
        let sin_num = a10 - a01;
        let cos_num = a00 + a11;
        if sin_num.abs() < 1e-12 && cos_num.abs() < 1e-12 {
            return;
        }

        let angle = sin_num.atan2(cos_num);
        let rotation = DMat2::from_angle(angle);

        for (k, &idx) in self.particles.iter().enumerate() {
            let goal = com + rotation * self.rs[k];
            let delta = self.stiffness * (goal - particles[idx].ep);
            particles[idx].ep += delta;
        }

        self.com = com;
        self.angle = angle;
    }

}

/// Mass-weighted centroid over `members` of whichever position `f` selects.
fn weighted_com(
    particles: &[Particle],
    members: &[usize],
    f: impl Fn(&Particle) -> DVec2,
) -> DVec2 {
    let mut acc = DVec2::ZERO;
    let mut total = 0.0;
    for &k in members {
        let m = particles[k].mass();
        acc += m * f(&particles[k]);
        total += m;
    }
    acc / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Phase;

    fn square_body(particles: &mut Vec<Particle>) -> TotalShapeConstraint {
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            particles.push(Particle::new(DVec2::new(x, y), 1.0, Phase::Solid));
        }
        TotalShapeConstraint::new(particles, vec![0, 1, 2, 3])
    }

    #[test]
    fn sheared_body_snaps_back_to_a_rigid_pose() {
        let mut particles = Vec::new();
        let mut shape = square_body(&mut particles);

        // Shear one corner.
        particles[2].ep = DVec2::new(1.4, 1.3);
        shape.project(&mut particles);

        // All pairwise distances must match the rest square's.
        let rest = [
            (0, 1, 1.0),
            (1, 2, 1.0),
            (2, 3, 1.0),
            (3, 0, 1.0),
            (0, 2, 2f64.sqrt()),
            (1, 3, 2f64.sqrt()),
        ];
        // Fully stiff matching lands every particle exactly on its goal, so
        // the layout is rigid again after a single projection.
        for (a, b, expect) in rest {
            let dist = particles[a].ep.distance(particles[b].ep);
            assert!(
                (dist - expect).abs() < 1e-9,
                "pair ({a},{b}) distance {dist} vs {expect}"
            );
        }
    }

    #[test]
    fn pure_rotation_is_recognized_and_preserved() {
        let mut particles = Vec::new();
        let mut shape = square_body(&mut particles);

        let theta = 0.3;
        let rot = DMat2::from_angle(theta);
        let center = DVec2::new(0.5, 0.5);
        for p in &mut particles {
            p.ep = center + rot * (p.p - center);
        }
        let before: Vec<DVec2> = particles.iter().map(|p| p.ep).collect();
        shape.project(&mut particles);

        // A rigidly rotated layout is already a fixed point.
        for (p, b) in particles.iter().zip(&before) {
            assert!(p.ep.distance(*b) < 1e-9);
        }
        assert!((shape.angle - theta).abs() < 1e-9);
    }

    #[test]
    fn projection_preserves_the_center_of_mass() {
        let mut particles = Vec::new();
        let mut shape = square_body(&mut particles);
        particles[0].ep = DVec2::new(-0.5, 0.2);
        particles[3].ep = DVec2::new(0.1, 1.6);

        let com_before = (particles[0].ep + particles[1].ep + particles[2].ep
            + particles[3].ep)
            / 4.0;
        shape.project(&mut particles);
        let com_after = (particles[0].ep + particles[1].ep + particles[2].ep
            + particles[3].ep)
            / 4.0;
        assert!(com_before.distance(com_after) < 1e-9);
    }
}
