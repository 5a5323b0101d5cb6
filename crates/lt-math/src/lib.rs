//! life_trace math utilities.

pub mod math;

pub use math::ks::*;
pub use math::stable::*;
