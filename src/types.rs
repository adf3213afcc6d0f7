//! Core particle and rigid-body state types.
//!
//! Everything in the simulation is a [`Particle`]; rigid bodies are groups of
//! solid particles glued together by a shape-matching constraint and carry
//! per-particle signed-distance data used during contact resolution.

use std::collections::HashMap;

use glam::DVec2;

use crate::constraint::TotalShapeConstraint;

/// Radius of every particle in world units.
pub const PARTICLE_RAD: f64 = 0.5;

/// Diameter of every particle; two particles closer than this overlap.
pub const PARTICLE_DIAM: f64 = 2.0 * PARTICLE_RAD;

/// Slop used by contact generation and scene spacing.
pub const EPSILON: f64 = 1e-2;

/// Matter phase of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Solid,
    Fluid,
    Gas,
}

/// A single simulation particle.
///
/// `ep` is the predicted position for the current step; constraint
/// projections operate on it and `confirm_guess` commits it back to `p` at
/// the end of a tick. An inverse mass of zero marks the particle immovable.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Current position.
    pub p: DVec2,
    /// Predicted position for the step in flight.
    pub ep: DVec2,
    /// Velocity.
    pub v: DVec2,
    /// Inverse mass; 0 means infinite mass.
    pub imass: f64,
    /// Per-step scaled inverse mass read by stabilized contact projections.
    pub tmass: f64,
    /// Matter phase.
    pub ph: Phase,
    /// Rigid body index for solids, synthetic group id for fluids/gases,
    /// -1 when unaffiliated.
    pub bod: i32,
    /// Static friction coefficient.
    pub s_friction: f64,
    /// Kinetic friction coefficient.
    pub k_friction: f64,
}

impl Particle {
    /// Create a particle from a position and a mass (0 = immovable).
    #[must_use]
    pub fn new(p: DVec2, mass: f64, ph: Phase) -> Self {
        let imass = if mass == 0.0 { 0.0 } else { 1.0 / mass };
        Self {
            p,
            ep: p,
            v: DVec2::ZERO,
            imass,
            tmass: imass,
            ph,
            bod: -1,
            s_friction: 0.4,
            k_friction: 0.2,
        }
    }

    /// Predict the end-of-step position. Immovable particles stay put.
    pub fn guess(&mut self, dt: f64) {
        self.ep = if self.imass == 0.0 {
            self.p
        } else {
            self.p + self.v * dt
        };
    }

    /// Refresh the per-step scaled inverse mass.
    ///
    /// Mass scaling is constraint-opt-in; the default policy is identity, so
    /// `tmass` simply mirrors `imass` each step.
    pub fn scale_mass(&mut self) {
        self.tmass = self.imass;
    }

    /// Commit the predicted position.
    pub fn confirm_guess(&mut self) {
        self.p = self.ep;
    }

    /// Mass of the particle. Only meaningful for finite-mass particles.
    #[must_use]
    pub fn mass(&self) -> f64 {
        1.0 / self.imass
    }
}

/// Signed-distance-field sample attached to a rigid-body particle: the
/// outward surface normal in body frame and the distance to the surface.
#[derive(Debug, Clone, Copy)]
pub struct SdfData {
    pub normal: DVec2,
    pub distance: f64,
}

impl SdfData {
    #[must_use]
    pub fn new(normal: DVec2, distance: f64) -> Self {
        Self { normal, distance }
    }
}

/// A rigid assembly of solid particles.
///
/// Topology is fixed at construction. The body's center of mass and current
/// rotation live on its [`TotalShapeConstraint`], which maintains them as a
/// side effect of projection.
#[derive(Debug)]
pub struct Body {
    /// Indices of member particles in the particle store.
    pub particles: Vec<usize>,
    /// Inverse of the summed particle masses.
    pub imass: f64,
    /// Per-particle SDF data, keyed by particle index.
    pub sdf: HashMap<usize, SdfData>,
    /// The shape-matching constraint that holds the body together.
    pub shape: TotalShapeConstraint,
}

impl Body {
    /// Current center of mass, as of the last shape projection.
    #[must_use]
    pub fn com(&self) -> DVec2 {
        self.shape.com
    }

    /// Current rotation relative to the rest layout, in radians.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.shape.angle
    }
}
