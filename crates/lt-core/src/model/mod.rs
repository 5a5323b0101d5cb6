//! Point-process GLM: exponential influence bases, baseline rhythm features,
//! recursive history state, likelihood/gradient, and the Adam fitter.

pub mod basis;
pub mod features;
pub mod fit;
pub mod likelihood;
pub mod params;
pub mod state;

pub use basis::{MAX_BASES, MS_PER_HOUR, TIMESCALES_HOURS};
pub use fit::{FitResult, FullModelFit, MIN_TARGET_EVENTS};
pub use likelihood::{TargetGrad, QUAD_POINTS_FIT};
pub use params::ModelParams;
pub use state::RecursiveState;
