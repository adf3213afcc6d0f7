//! # Scene content builders
//!
//! Construction of rigid bodies, fluids and gases on top of a
//! [`Simulation`]. These are the only operations that can fail; `tick`
//! handles everything at runtime.

use std::collections::HashMap;

use rand::Rng;

use crate::constraint::{Constraint, FluidConstraint, GasConstraint, TotalShapeConstraint};
use crate::error::PhysicsError;
use crate::types::{Body, Particle, Phase, SdfData};
use crate::Simulation;

impl Simulation {
    /// Register `verts` as a rigid body with per-particle SDF data.
    ///
    /// Every vertex becomes a solid particle of the new body; topology is
    /// immutable afterwards. Returns the body index.
    ///
    /// # Errors
    ///
    /// Rejects bodies with fewer than two particles, any particle of
    /// infinite mass, or SDF data that does not cover every particle.
    pub fn create_rigid_body(
        &mut self,
        verts: Vec<Particle>,
        sdf_data: Vec<SdfData>,
    ) -> Result<usize, PhysicsError> {
        if verts.len() <= 1 {
            return Err(PhysicsError::BodyTooSmall);
        }
        if sdf_data.len() != verts.len() {
            return Err(PhysicsError::SdfMismatch {
                got: sdf_data.len(),
                expected: verts.len(),
            });
        }
        if verts.iter().any(|p| p.imass == 0.0) {
            return Err(PhysicsError::InfiniteMassInBody);
        }

        let offset = self.particles.len();
        let body_index = self.bodies.len();
        let count = verts.len();
        let mut members = Vec::with_capacity(count);
        let mut sdf = HashMap::with_capacity(count);
        let mut total_mass = 0.0;

        for (k, (mut p, data)) in verts.into_iter().zip(sdf_data).enumerate() {
            p.ph = Phase::Solid;
            p.bod = body_index as i32;
            total_mass += 1.0 / p.imass;

            let index = offset + k;
            members.push(index);
            sdf.insert(index, data);
            self.particles.push(p);
        }

        let shape = TotalShapeConstraint::new(&self.particles, members.clone());
        self.bodies.push(Body {
            particles: members,
            imass: 1.0 / total_mass,
            sdf,
            shape,
        });

        tracing::debug!(body = body_index, particles = count, "created rigid body");
        Ok(body_index)
    }

    /// Register `verts` as a fluid with rest density `rest_density`.
    ///
    /// # Errors
    ///
    /// Rejects any particle of infinite mass.
    pub fn create_fluid(
        &mut self,
        verts: Vec<Particle>,
        rest_density: f64,
    ) -> Result<(), PhysicsError> {
        let indices = self.register_phase_group(verts, Phase::Fluid)?;
        self.globals
            .push(Constraint::Fluid(FluidConstraint::new(rest_density, indices)));
        Ok(())
    }

    /// Register `verts` as a gas with rest density `rest_density`.
    ///
    /// # Errors
    ///
    /// Rejects any particle of infinite mass.
    pub fn create_gas(
        &mut self,
        verts: Vec<Particle>,
        rest_density: f64,
    ) -> Result<(), PhysicsError> {
        let indices = self.register_phase_group(verts, Phase::Gas)?;
        self.globals
            .push(Constraint::Gas(GasConstraint::new(rest_density, indices)));
        Ok(())
    }

    /// Tag and append a fluid or gas group, handing back its indices.
    fn register_phase_group(
        &mut self,
        verts: Vec<Particle>,
        ph: Phase,
    ) -> Result<Vec<usize>, PhysicsError> {
        if verts.iter().any(|p| p.imass == 0.0) {
            return Err(PhysicsError::InfiniteMassInFluid);
        }

        // Synthetic group id; only used to tell groups apart when drawing.
        let group_id = self.rng.gen_range(0..100);
        let offset = self.particles.len();
        let mut indices = Vec::with_capacity(verts.len());

        for (k, mut p) in verts.into_iter().enumerate() {
            p.ph = ph;
            p.bod = group_id;
            indices.push(offset + k);
            self.particles.push(p);
        }
        Ok(indices)
    }
}
