//! Built-in module groups
//!
//! - [`CoreGroup`]: logging and unit conversion, always installed first
//! - [`MathGroup`]: vector type and numeric helpers, opt-in through the registry

mod core;
mod math;

pub use self::core::CoreGroup;
pub use self::math::{MathGroup, Vec3, MATH_GROUP};
