//! drift - engine-agnostic top-down vehicle integrator (pure types + step)

pub mod types;
pub mod friction;
pub mod traction;
pub mod step;
pub mod controls;

pub use types::*;
pub use step::{advance, StepReport};
pub use controls::{ControlGains, KeyState};
