//! # Simulation driver
//!
//! Owns the particle and body stores, the global constraint registry and
//! the batched solvers, and advances the world one position-based dynamics
//! step at a time. The step ordering in [`Simulation::tick`] is normative:
//! predict, discover contacts, optionally pre-stabilize, iterate the
//! constraint groups, then commit velocities and positions.

use glam::{DVec2, IVec2};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{SimConfig, SolverMode};
use crate::constraint::{
    BoundaryConstraint, Constraint, ConstraintGroup, ContactConstraint, RigidContactConstraint,
};
use crate::solver::ProjectionSolver;
use crate::types::{Body, Particle, Phase, EPSILON, PARTICLE_DIAM, PARTICLE_RAD};

/// The unified particle world.
pub struct Simulation {
    pub config: SimConfig,
    /// Gravity applied to every finite-mass particle; gas particles see it
    /// scaled by `config.gas_gravity_scale`.
    pub gravity: DVec2,
    /// World extent along x as (min, max).
    pub x_bounds: DVec2,
    /// World extent along y as (min, max).
    pub y_bounds: DVec2,
    pub particles: Vec<Particle>,
    pub bodies: Vec<Body>,
    pub(crate) globals: Vec<Constraint>,
    pub(crate) standard_solver: ProjectionSolver,
    pub(crate) contact_solver: ProjectionSolver,
    pub(crate) rng: StdRng,
    /// Viewport size reported by the host; informational only.
    dimensions: IVec2,
    /// Last interaction point, kept for debug drawing.
    point: DVec2,
}

impl Simulation {
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            gravity: DVec2::new(0.0, -9.8),
            x_bounds: DVec2::new(-20.0, 20.0),
            y_bounds: DVec2::new(0.0, 1_000_000.0),
            particles: Vec::new(),
            bodies: Vec::new(),
            globals: Vec::new(),
            standard_solver: ProjectionSolver::new(false),
            contact_solver: ProjectionSolver::new(true),
            rng,
            dimensions: IVec2::ZERO,
            point: DVec2::ZERO,
        }
    }

    /// Drop all scene content and restore default gravity and seeding.
    pub(crate) fn reset(&mut self) {
        self.particles.clear();
        self.bodies.clear();
        self.globals.clear();
        self.gravity = DVec2::new(0.0, -9.8);
        self.rng = StdRng::seed_from_u64(self.config.seed);
    }

    /// Register a long-lived constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.globals.push(constraint);
    }

    /// Long-lived constraints, for debug inspection.
    #[must_use]
    pub fn globals(&self) -> &[Constraint] {
        &self.globals
    }

    /// Advance the world by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        if dt <= 0.0 || self.particles.is_empty() {
            return;
        }

        // Integrate external forces and predict positions. Immovable
        // particles keep their velocity and never predict away from p.
        let alpha = self.config.gas_gravity_scale;
        for p in &mut self.particles {
            if p.imass != 0.0 {
                let gravity = if p.ph == Phase::Gas {
                    self.gravity * alpha
                } else {
                    self.gravity
                };
                p.v += dt * gravity;
            }
            p.guess(dt);
            p.scale_mass();
        }

        if self.config.mode == SolverMode::Matrix {
            self.contact_solver.setup_mass(&self.particles, true);
            self.standard_solver.setup_mass(&self.particles, false);
        }

        let (mut contacts, mut stabilization) = self.generate_contacts();
        tracing::debug!(
            contacts = contacts.len(),
            stabilizers = stabilization.len(),
            "generated ephemeral contacts"
        );

        // Pre-stabilization: remove inherited penetration by moving both p
        // and ep before the main solve.
        if self.config.stabilization {
            self.contact_solver
                .setup_sizes(self.particles.len(), &stabilization);
            for _ in 0..self.config.stabilization_iterations {
                if stabilization.is_empty() {
                    break;
                }
                match self.config.mode {
                    SolverMode::Iterative => {
                        for c in &mut stabilization {
                            c.project(&mut self.particles, &self.bodies);
                        }
                    }
                    SolverMode::Matrix => {
                        self.contact_solver.solve_and_update(
                            &mut self.particles,
                            &stabilization,
                            &self.bodies,
                            true,
                        );
                    }
                }
            }
        }

        match self.config.mode {
            SolverMode::Iterative => self.solve_iterative(&mut contacts),
            SolverMode::Matrix => self.solve_matrix(&contacts),
        }

        // Commit: velocities from positional change, then positions.
        // Ephemeral contact and stabilization constraints die with the tick.
        for p in &mut self.particles {
            if p.imass == 0.0 {
                p.ep = p.p;
                continue;
            }
            p.v = (p.ep - p.p) / dt;
            p.confirm_guess();
        }
    }

    /// Shape, then standard, then contact, `solver_iterations` times.
    ///
    /// Shape runs first so bodies reassemble before contacts push on them;
    /// contacts run last so non-penetration survives the other projections.
    fn solve_iterative(&mut self, contacts: &mut [Constraint]) {
        for _ in 0..self.config.solver_iterations {
            for body in &mut self.bodies {
                body.shape.project(&mut self.particles);
            }
            for c in &mut self.globals {
                if c.group() == ConstraintGroup::Standard {
                    c.project(&mut self.particles, &self.bodies);
                }
            }
            for c in contacts.iter_mut() {
                c.project(&mut self.particles, &self.bodies);
            }
        }
    }

    /// Batch contacts and standard constraints through the solvers; shape
    /// matching cannot be linearized and is always projected directly.
    fn solve_matrix(&mut self, contacts: &[Constraint]) {
        self.standard_solver
            .setup_sizes(self.particles.len(), &self.globals);
        self.contact_solver
            .setup_sizes(self.particles.len(), contacts);

        for _ in 0..self.config.solver_iterations {
            if !contacts.is_empty() {
                self.contact_solver.solve_and_update(
                    &mut self.particles,
                    contacts,
                    &self.bodies,
                    false,
                );
                // Friction is a displacement clamp, not a Jacobian row;
                // re-project the friction-bearing contacts after the batched
                // normal solve (their normal part is idempotent by then).
                for c in contacts {
                    match c {
                        Constraint::RigidContact(rc) => {
                            rc.project(&mut self.particles, &self.bodies);
                        }
                        Constraint::Boundary(bc) => bc.project(&mut self.particles),
                        _ => {}
                    }
                }
            }

            if !self.globals.is_empty() {
                self.standard_solver.solve_and_update(
                    &mut self.particles,
                    &self.globals,
                    &self.bodies,
                    false,
                );
            }

            for body in &mut self.bodies {
                body.shape.project(&mut self.particles);
            }
        }
    }

    /// O(N^2) pairwise scan plus world-boundary checks.
    fn generate_contacts(&self) -> (Vec<Constraint>, Vec<Constraint>) {
        let mut contacts = Vec::new();
        let mut stabilization = Vec::new();
        let stabilize = self.config.stabilization;
        let n = self.particles.len();

        for i in 0..n {
            let pi = &self.particles[i];

            for j in (i + 1)..n {
                let pj = &self.particles[j];

                // Two immovables can never resolve anything.
                if pi.imass == 0.0 && pj.imass == 0.0 {
                    continue;
                }
                // Particles of the same rigid body are held by its shape.
                if pi.ph == Phase::Solid
                    && pj.ph == Phase::Solid
                    && pi.bod == pj.bod
                    && pi.bod != -1
                {
                    continue;
                }

                let dist = pi.ep.distance(pj.ep);
                if dist >= PARTICLE_DIAM - EPSILON {
                    continue;
                }

                if pi.ph == Phase::Solid && pj.ph == Phase::Solid {
                    contacts.push(Constraint::RigidContact(RigidContactConstraint::new(
                        i, j, false,
                    )));
                    if stabilize {
                        stabilization.push(Constraint::RigidContact(
                            RigidContactConstraint::new(i, j, true),
                        ));
                    }
                } else if pi.ph == Phase::Solid || pj.ph == Phase::Solid {
                    contacts.push(Constraint::Contact(ContactConstraint::new(i, j)));
                }
                // Fluid and gas pairs are handled by their density
                // constraints, never by pair contacts.
            }

            self.boundary_contacts(i, pi.ep, stabilize, &mut contacts, &mut stabilization);
        }

        (contacts, stabilization)
    }

    fn boundary_contacts(
        &self,
        i: usize,
        ep: DVec2,
        stabilize: bool,
        contacts: &mut Vec<Constraint>,
        stabilization: &mut Vec<Constraint>,
    ) {
        let mut add = |plane: f64, axis_is_x: bool, is_min: bool| {
            contacts.push(Constraint::Boundary(BoundaryConstraint::new(
                i, plane, axis_is_x, is_min, false,
            )));
            if stabilize {
                stabilization.push(Constraint::Boundary(BoundaryConstraint::new(
                    i, plane, axis_is_x, is_min, true,
                )));
            }
        };

        if ep.x < self.x_bounds.x + PARTICLE_RAD {
            add(self.x_bounds.x, true, true);
        } else if ep.x > self.x_bounds.y - PARTICLE_RAD {
            add(self.x_bounds.y, true, false);
        }

        if ep.y < self.y_bounds.x + PARTICLE_RAD {
            add(self.y_bounds.x, false, true);
        } else if ep.y > self.y_bounds.y - PARTICLE_RAD {
            add(self.y_bounds.y, false, false);
        }
    }

    /// Number of particles in the store.
    #[must_use]
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Total kinetic energy of all finite-mass particles.
    #[must_use]
    pub fn kinetic_energy(&self) -> f64 {
        self.particles
            .iter()
            .filter(|p| p.imass != 0.0)
            .map(|p| 0.5 * p.v.dot(p.v) / p.imass)
            .sum()
    }

    /// Kick every particle directly away from `point` at speed 7.
    pub fn mouse_pressed(&mut self, point: DVec2) {
        for p in &mut self.particles {
            let away = p.p - point;
            let len = away.length();
            if len < 1e-9 {
                continue;
            }
            p.v += 7.0 * (away / len);
        }
        self.point = point;
    }

    /// Record the host viewport size. World bounds are scene-owned, so this
    /// is informational only.
    pub fn resize(&mut self, dim: IVec2) {
        self.dimensions = dim;
    }

    /// Host viewport size as last reported through [`Simulation::resize`].
    #[must_use]
    pub fn dimensions(&self) -> IVec2 {
        self.dimensions
    }

    /// Last interaction point passed to [`Simulation::mouse_pressed`].
    #[must_use]
    pub fn point(&self) -> DVec2 {
        self.point
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_without_particles_is_a_no_op() {
        let mut sim = Simulation::default();
        sim.tick(1.0 / 60.0);
        assert_eq!(sim.num_particles(), 0);
    }

    #[test]
    fn kinetic_energy_ignores_immovable_particles() {
        let mut sim = Simulation::default();
        let mut anchor = Particle::new(DVec2::ZERO, 0.0, Phase::Solid);
        anchor.v = DVec2::new(100.0, 0.0);
        sim.particles.push(anchor);

        let mut mover = Particle::new(DVec2::new(5.0, 5.0), 2.0, Phase::Solid);
        mover.v = DVec2::new(3.0, 0.0);
        sim.particles.push(mover);

        // 0.5 * 2 * 9 = 9, the anchor contributes nothing.
        assert!((sim.kinetic_energy() - 9.0).abs() < 1e-12);
    }

    #[test]
    fn mouse_kick_pushes_particles_away_from_the_point() {
        let mut sim = Simulation::default();
        sim.particles
            .push(Particle::new(DVec2::new(1.0, 0.0), 1.0, Phase::Solid));
        sim.mouse_pressed(DVec2::ZERO);
        assert!((sim.particles[0].v.x - 7.0).abs() < 1e-12);
        assert!(sim.particles[0].v.y.abs() < 1e-12);
    }
}
