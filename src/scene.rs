//! Built-in demo scenes.
//!
//! Each scene resets the world and repopulates it. Layout jitter comes from
//! the simulation's seeded RNG, so a given config reproduces the same scene
//! every time.

use glam::DVec2;
use rand::Rng;

use crate::constraint::{Constraint, DistanceConstraint};
use crate::error::PhysicsError;
use crate::types::{Particle, Phase, SdfData, EPSILON, PARTICLE_DIAM, PARTICLE_RAD};
use crate::Simulation;

/// The demo scene catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    /// A rigid box sliding along the floor.
    Friction,
    /// A tall pile of loose solid grains plus a heavy incoming particle.
    Granular,
    /// Columns of stacked rigid boxes.
    Stacks,
    /// A brick wall with staggered courses.
    Wall,
    /// A rigid-link chain hanging from a static anchor.
    Pendulum,
    /// Two fluid blocks of different rest density.
    Fluid,
    /// A fluid bath with two rigid boxes dropped in.
    FluidSolid,
    /// Gas regions below denser fluid regions.
    Gas,
}

impl Simulation {
    /// Reset all state and populate the chosen scene.
    ///
    /// # Errors
    ///
    /// Propagates construction failures from the scene's bodies and fluids;
    /// the built-in layouts never trigger them.
    pub fn init(&mut self, scene: Scene) -> Result<(), PhysicsError> {
        self.reset();
        match scene {
            Scene::Friction => self.init_friction()?,
            Scene::Granular => self.init_granular(),
            Scene::Stacks => self.init_stacks()?,
            Scene::Wall => self.init_wall()?,
            Scene::Pendulum => self.init_pendulum()?,
            Scene::Fluid => self.init_fluid()?,
            Scene::FluidSolid => self.init_fluid_solid()?,
            Scene::Gas => self.init_gas()?,
        }
        self.standard_solver.setup_mass(&self.particles, false);

        tracing::info!(
            ?scene,
            particles = self.particles.len(),
            bodies = self.bodies.len(),
            "initialized scene"
        );
        Ok(())
    }

    fn init_friction(&mut self) -> Result<(), PhysicsError> {
        self.x_bounds = DVec2::new(-20.0, 20.0);
        self.y_bounds = DVec2::new(0.0, 1_000_000.0);

        let mut verts = Vec::new();
        for x in 0..3i32 {
            let x_val = PARTICLE_DIAM * f64::from(x - 1);
            for y in 0..2i32 {
                let y_val = f64::from(2 + y + 1) * PARTICLE_DIAM;
                let mut part = Particle::new(DVec2::new(x_val, y_val), 1.0, Phase::Solid);
                part.v.x = 5.0;
                part.s_friction = 0.1;
                part.k_friction = 0.01;
                verts.push(part);
            }
        }
        self.create_rigid_body(verts, box_sdf(3))?;
        Ok(())
    }

    fn init_granular(&mut self) {
        self.x_bounds = DVec2::new(-100.0, 100.0);
        self.y_bounds = DVec2::new(-5.0, 1000.0);

        for i in -10..=10i32 {
            for j in 0..40i32 {
                let pos = DVec2::new(
                    f64::from(i) * (PARTICLE_DIAM + EPSILON),
                    f64::from(j) * PARTICLE_DIAM + PARTICLE_RAD + self.y_bounds.x,
                );
                let mut part = Particle::new(pos, 1.0, Phase::Solid);
                part.s_friction = 0.1;
                part.k_friction = 0.02;
                self.particles.push(part);
            }
        }

        // A heavy interloper plowing into the pile from the side.
        let mut jerk = Particle::new(DVec2::new(-5.51, 4.0), 100.0, Phase::Solid);
        jerk.v.x = 10.0;
        self.particles.push(jerk);
    }

    fn init_stacks(&mut self) -> Result<(), PhysicsError> {
        self.x_bounds = DVec2::new(-20.0, 20.0);
        self.y_bounds = DVec2::new(0.0, 1_000_000.0);

        let num_boxes = 8;
        let num_columns = 2i32;
        for j in -num_columns..=num_columns {
            for i in (0..num_boxes).rev() {
                let mut verts = Vec::new();
                for x in 0..3i32 {
                    let x_val = f64::from(j) * 4.0 + PARTICLE_DIAM * f64::from(x - 1);
                    for y in 0..2i32 {
                        let y_val = f64::from((2 * i + 1) * 2 + y + 1) * PARTICLE_DIAM;
                        verts.push(Particle::new(DVec2::new(x_val, y_val), 1.0, Phase::Solid));
                    }
                }
                self.create_rigid_body(verts, box_sdf(3))?;
            }
        }
        Ok(())
    }

    fn init_wall(&mut self) -> Result<(), PhysicsError> {
        self.x_bounds = DVec2::new(-20.0, 20.0);
        self.y_bounds = DVec2::new(0.0, 1_000_000.0);

        let (columns, rows) = (6i32, 2i32);
        let (height, width) = (5i32, 2i32);
        for j in -width..=width {
            for i in (0..height).rev() {
                let mut verts = Vec::new();
                for x in 0..columns {
                    // Alternate courses are offset by two radii to stagger
                    // the joints, like real brickwork.
                    let shift = if i % 2 == 0 { 3.0 } else { -1.0 };
                    let x_val = f64::from(j) * (EPSILON + f64::from(columns) / 2.0)
                        + PARTICLE_DIAM * f64::from(x)
                        - shift * PARTICLE_RAD;
                    for y in 0..rows {
                        let y_val =
                            (f64::from(i * rows + y) + EPSILON) * PARTICLE_DIAM + PARTICLE_RAD;
                        let mut part =
                            Particle::new(DVec2::new(x_val, y_val), 1.0, Phase::Solid);
                        part.s_friction = 1.0;
                        part.k_friction = 0.09;
                        verts.push(part);
                    }
                }
                self.create_rigid_body(verts, box_sdf(6))?;
            }
        }
        Ok(())
    }

    fn init_pendulum(&mut self) -> Result<(), PhysicsError> {
        self.x_bounds = DVec2::new(-10.0, 10.0);
        self.y_bounds = DVec2::new(0.0, 1_000_000.0);

        let chain_length = 3usize;
        let anchor_pos =
            DVec2::new(0.0, (chain_length as f64 * 3.0 + 6.0) * PARTICLE_DIAM + 2.0);
        self.particles
            .push(Particle::new(anchor_pos, 0.0, Phase::Solid));

        let xs = [-1.0, -1.0, 0.0, 0.0, 1.0, 1.0];
        for i in (0..=chain_length).rev() {
            let mut verts = Vec::new();
            for (jj, &x) in xs.iter().enumerate() {
                let y = ((i as f64 + 1.0) * 3.0 + (jj % 2) as f64) * PARTICLE_DIAM + 2.0;
                verts.push(Particle::new(
                    DVec2::new(x * PARTICLE_DIAM, y),
                    1.0,
                    Phase::Solid,
                ));
            }
            self.create_rigid_body(verts, pendulum_sdf())?;

            // Tie this link to the one created before it.
            if i < chain_length {
                let base_prev = 1 + (chain_length - i - 1) * 6;
                let base_cur = base_prev + 6;
                self.add_constraint(Constraint::Distance(DistanceConstraint::new(
                    base_cur + 1,
                    base_prev,
                    &self.particles,
                )));
                self.add_constraint(Constraint::Distance(DistanceConstraint::new(
                    base_cur + 5,
                    base_prev + 4,
                    &self.particles,
                )));
            }
        }

        // Hang the top link from the anchor.
        self.add_constraint(Constraint::Distance(DistanceConstraint::new(
            0,
            4,
            &self.particles,
        )));
        Ok(())
    }

    fn init_fluid(&mut self) -> Result<(), PhysicsError> {
        let (scale, delta) = (4.0, 0.7);
        self.gravity = DVec2::new(0.0, -9.8);
        self.x_bounds = DVec2::new(-2.0 * scale, 2.0 * scale);
        self.y_bounds = DVec2::new(-2.0 * scale, 10.0 * scale);

        let num = 2;
        for d in 0..num {
            let start = -2.0 * scale + 4.0 * scale * (f64::from(d) / f64::from(num));
            let verts =
                self.jittered_block(start, start + 4.0 * scale / f64::from(num), -2.0 * scale,
                    scale, delta, Phase::Fluid);
            self.create_fluid(verts, 1.0 + 1.5 * f64::from(d))?;
        }
        Ok(())
    }

    fn init_fluid_solid(&mut self) -> Result<(), PhysicsError> {
        let (scale, delta) = (5.0, 0.7);
        self.gravity = DVec2::new(0.0, -9.8);
        self.x_bounds = DVec2::new(-2.0 * scale, 2.0 * scale);
        self.y_bounds = DVec2::new(-2.0 * scale, 10.0 * scale);

        let verts = self.jittered_block(
            -2.0 * scale,
            2.0 * scale,
            -2.0 * scale,
            2.0 * scale,
            delta,
            Phase::Fluid,
        );
        self.create_fluid(verts, 1.75)?;

        // Two boxes of different mass dropped onto the bath.
        for (x_off, mass) in [(-3.0, 0.5), (3.0, 0.2)] {
            let mut verts = Vec::new();
            for x in 0..5i32 {
                let x_val = PARTICLE_DIAM * f64::from(x - 2);
                for y in 0..2i32 {
                    let y_val = f64::from(2 + y + 1) * PARTICLE_DIAM;
                    verts.push(Particle::new(
                        DVec2::new(x_val + x_off, 15.0 + y_val),
                        mass,
                        Phase::Solid,
                    ));
                }
            }
            self.create_rigid_body(verts, box_sdf(5))?;
        }
        Ok(())
    }

    fn init_gas(&mut self) -> Result<(), PhysicsError> {
        let (scale, delta) = (2.0, 0.7);
        self.gravity = DVec2::new(0.0, -9.8);
        self.x_bounds = DVec2::new(-2.0 * scale, 2.0 * scale);
        self.y_bounds = DVec2::new(-2.0 * scale, 10.0 * scale);

        let num = 2;
        for d in 0..num {
            let start = -2.0 * scale + 4.0 * scale * (f64::from(d) / f64::from(num));
            let verts = self.jittered_block(
                start,
                start + 4.0 * scale / f64::from(num),
                -2.0 * scale,
                2.0 * scale,
                delta,
                Phase::Gas,
            );
            self.create_gas(verts, 0.75 + 3.0 * f64::from(d))?;
        }

        // Denser fluid above; the gas should work its way past it.
        let scale = 3.0;
        for d in 0..num {
            let start = -2.0 * scale + 4.0 * scale * (f64::from(d) / f64::from(num));
            let mut verts = self.jittered_block(
                start,
                start + 4.0 * scale / f64::from(num),
                -2.0 * scale,
                2.0 * scale,
                delta,
                Phase::Fluid,
            );
            for p in &mut verts {
                p.p.y += 10.0;
                p.ep = p.p;
            }
            self.create_fluid(verts, 4.0 + 0.75 * (f64::from(d) + 1.0))?;
        }
        Ok(())
    }

    /// A grid of unit-mass particles on `delta` spacing with small
    /// positional jitter.
    fn jittered_block(
        &mut self,
        x_start: f64,
        x_end: f64,
        y_start: f64,
        y_end: f64,
        delta: f64,
        ph: Phase,
    ) -> Vec<Particle> {
        let mut verts = Vec::new();
        let mut x = x_start;
        while x < x_end {
            let mut y = y_start;
            while y < y_end {
                let jitter = 0.2
                    * DVec2::new(self.rng.gen::<f64>() - 0.5, self.rng.gen::<f64>() - 0.5);
                verts.push(Particle::new(DVec2::new(x, y) + jitter, 1.0, ph));
                y += delta;
            }
            x += delta;
        }
        verts
    }
}

/// SDF data for a `columns` x 2 particle box: corner normals at the ends,
/// straight up/down normals for the interior columns.
fn box_sdf(columns: usize) -> Vec<SdfData> {
    let root2 = 2f64.sqrt();
    let mut data = Vec::with_capacity(columns * 2);
    data.push(SdfData::new(
        DVec2::new(-1.0, -1.0).normalize(),
        PARTICLE_RAD * root2,
    ));
    data.push(SdfData::new(
        DVec2::new(-1.0, 1.0).normalize(),
        PARTICLE_RAD * root2,
    ));
    for _ in 0..columns.saturating_sub(2) {
        data.push(SdfData::new(DVec2::new(0.0, -1.0), PARTICLE_RAD));
        data.push(SdfData::new(DVec2::new(0.0, 1.0), PARTICLE_RAD));
    }
    data.push(SdfData::new(
        DVec2::new(1.0, -1.0).normalize(),
        PARTICLE_RAD * root2,
    ));
    data.push(SdfData::new(
        DVec2::new(1.0, 1.0).normalize(),
        PARTICLE_RAD * root2,
    ));
    data
}

/// SDF data for one pendulum link; every sample sits one radius deep.
fn pendulum_sdf() -> Vec<SdfData> {
    [
        DVec2::new(-1.0, -1.0),
        DVec2::new(-1.0, 1.0),
        DVec2::new(0.0, -1.0),
        DVec2::new(0.0, 1.0),
        DVec2::new(1.0, -1.0),
        DVec2::new(1.0, 1.0),
    ]
    .into_iter()
    .map(|n| SdfData::new(n.normalize(), PARTICLE_RAD))
    .collect()
}
