//! # Constraints
//!
//! The closed set of constraint variants the solver understands, plus the
//! sparse-row representation the batched solver consumes. Each variant
//! projects predicted positions toward a satisfied state, weighted by
//! inverse mass so that heavier participants move less and immovable ones
//! not at all.

mod boundary;
mod contact;
mod distance;
mod fluid;
mod gas;
pub mod kernels;
mod rigid_contact;
mod shape;

pub use boundary::BoundaryConstraint;
pub use contact::ContactConstraint;
pub use distance::DistanceConstraint;
pub use fluid::FluidConstraint;
pub use gas::GasConstraint;
pub use rigid_contact::RigidContactConstraint;
pub use shape::TotalShapeConstraint;

use glam::DVec2;

use crate::types::{Body, Particle};

/// Solver dispatch groups, in projection order.
///
/// Shape constraints run first each iteration so rigid bodies reassemble
/// before contacts push on them; contacts run last so non-penetration
/// survives the other projections. Stabilization constraints only run in the
/// pre-solver pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintGroup {
    Shape,
    Standard,
    Contact,
    Stabilization,
}

/// One sparse row of the grouped constraint Jacobian.
///
/// `value` is the current violation C; `entries` hold the gradient of C with
/// respect to each participating particle. `relaxation` is added to the
/// diagonal of J M^-1 J^T when the row is solved.
#[derive(Debug, Clone)]
pub struct ConstraintRow {
    pub value: f64,
    pub entries: Vec<(usize, DVec2)>,
    pub relaxation: f64,
}

/// A global or ephemeral constraint.
///
/// Shape matching is deliberately not a variant here: every body owns its
/// [`TotalShapeConstraint`] directly, so the driver never needs to test what
/// kind of constraint a body carries.
#[derive(Debug)]
pub enum Constraint {
    Distance(DistanceConstraint),
    Boundary(BoundaryConstraint),
    Contact(ContactConstraint),
    RigidContact(RigidContactConstraint),
    Fluid(FluidConstraint),
    Gas(GasConstraint),
}

impl Constraint {
    /// The group this constraint is dispatched under; a static property of
    /// the variant.
    #[must_use]
    pub fn group(&self) -> ConstraintGroup {
        match self {
            Constraint::Distance(_) | Constraint::Fluid(_) | Constraint::Gas(_) => {
                ConstraintGroup::Standard
            }
            Constraint::Boundary(c) => {
                if c.stabilize {
                    ConstraintGroup::Stabilization
                } else {
                    ConstraintGroup::Contact
                }
            }
            Constraint::Contact(_) => ConstraintGroup::Contact,
            Constraint::RigidContact(c) => {
                if c.stabilize {
                    ConstraintGroup::Stabilization
                } else {
                    ConstraintGroup::Contact
                }
            }
        }
    }

    /// Project participating predicted positions toward satisfaction.
    pub fn project(&mut self, particles: &mut [Particle], bodies: &[Body]) {
        match self {
            Constraint::Distance(c) => c.project(particles),
            Constraint::Boundary(c) => c.project(particles),
            Constraint::Contact(c) => c.project(particles),
            Constraint::RigidContact(c) => c.project(particles, bodies),
            Constraint::Fluid(c) => c.project(particles),
            Constraint::Gas(c) => c.project(particles),
        }
    }

    /// Append this constraint's Jacobian rows for the batched solver.
    pub fn rows(&self, particles: &[Particle], bodies: &[Body], out: &mut Vec<ConstraintRow>) {
        match self {
            Constraint::Distance(c) => c.rows(particles, out),
            Constraint::Boundary(c) => c.rows(particles, out),
            Constraint::Contact(c) => c.rows(particles, out),
            Constraint::RigidContact(c) => c.rows(particles, bodies, out),
            Constraint::Fluid(c) => c.rows(particles, out),
            Constraint::Gas(c) => c.rows(particles, out),
        }
    }
}

/// Mass-weighting factors for a two-particle projection.
///
/// Returns `None` when both participants are immovable.
pub(crate) fn pair_weights(wa: f64, wb: f64) -> Option<(f64, f64)> {
    let sum = wa + wb;
    if sum == 0.0 {
        return None;
    }
    Some((wa / sum, wb / sum))
}
