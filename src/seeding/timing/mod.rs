//! Zero-cost phase timing for the seeding driver.
//!
//! When the `timing` feature is enabled, the driver records wall-clock time
//! for index fill, pair enumeration, extension and track building.
//!
//! When disabled, all types become zero-sized and all methods compile away.

#[cfg(feature = "timing")]
mod real;
#[cfg(not(feature = "timing"))]
mod stub;

#[cfg(feature = "timing")]
pub use real::*;
#[cfg(not(feature = "timing"))]
pub use stub::*;
