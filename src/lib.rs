#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::similar_names,
    clippy::float_cmp
)]
//! # pbd2d
//!
//! A 2D position-based dynamics core that treats rigid bodies, granular
//! matter, fluids and gases as one population of constrained particles.
//!
//! ## Key Components
//!
//! -   **Particles and Bodies:** The [`types`] module defines the flat
//!     particle store every subsystem shares, plus rigid [`Body`] assemblies
//!     with per-particle signed-distance data.
//! -   **Constraints:** The [`constraint`] module holds the closed family of
//!     constraint variants: distance, boundary, two contact flavors, shape
//!     matching, and the fluid/gas density constraints.
//! -   **Simulation:** [`Simulation`] owns all state and advances it with
//!     [`Simulation::tick`]: predict, find contacts, optionally
//!     pre-stabilize, iterate the constraint groups, commit.
//! -   **Scenes:** [`Scene`] enumerates the built-in demos; hosts call
//!     [`Simulation::init`] to populate one.
//!
//! ## Usage
//!
//! ```rust
//! use pbd2d::{Scene, SimConfig, Simulation};
//!
//! let mut sim = Simulation::new(SimConfig::default());
//! sim.init(Scene::Stacks)?;
//! for _ in 0..60 {
//!     sim.tick(1.0 / 60.0);
//! }
//! # Ok::<(), pbd2d::PhysicsError>(())
//! ```
//!
//! Rendering, input handling and scene editing live with the host; the core
//! exposes read access to particles, bodies and constraints for
//! visualization and diagnostics.

pub mod builder;
pub mod config;
pub mod constraint;
pub mod error;
pub mod scene;
pub mod simulation;
pub mod solver;
pub mod types;

pub use config::{SimConfig, SolverMode};
pub use constraint::{
    BoundaryConstraint, Constraint, ConstraintGroup, ContactConstraint, DistanceConstraint,
    FluidConstraint, GasConstraint, RigidContactConstraint, TotalShapeConstraint,
};
pub use error::PhysicsError;
pub use scene::Scene;
pub use simulation::Simulation;
pub use types::{Body, Particle, Phase, SdfData, EPSILON, PARTICLE_DIAM, PARTICLE_RAD};
