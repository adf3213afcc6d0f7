use thiserror::Error;

/// Errors raised while constructing scene content.
///
/// `tick` itself never fails; all runtime conditions are resolved locally.
#[derive(Error, Debug)]
pub enum PhysicsError {
    #[error("rigid bodies must be at least 2 points")]
    BodyTooSmall,
    #[error("a rigid body cannot have a point of infinite mass")]
    InfiniteMassInBody,
    #[error("a fluid cannot have a point of infinite mass")]
    InfiniteMassInFluid,
    #[error("sdf entry count {got} does not match particle count {expected}")]
    SdfMismatch { got: usize, expected: usize },
}
