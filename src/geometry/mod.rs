//! Geometry primitives for world-space measurement
//!
//! Coordinates are in meters, in whatever right-handed world frame the AR
//! host reports hit-test results in.

mod point3;

pub use point3::{distance, ParsePointError, Point3};
