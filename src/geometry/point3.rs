//! 3D point representation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A point in world space, in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    /// Origin point (0, 0, 0)
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new point
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Point3) -> f64 {
        distance(*self, *other)
    }
}

/// Euclidean distance between two points.
///
/// Total over all inputs and symmetric in its arguments.
pub fn distance(a: Point3, b: Point3) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Error returned when a `"x,y,z"` string cannot be parsed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParsePointError {
    #[error("expected 3 comma-separated components, got {0}")]
    Arity(usize),

    #[error("invalid coordinate '{0}'")]
    Component(String),
}

impl FromStr for Point3 {
    type Err = ParsePointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ParsePointError::Arity(parts.len()));
        }

        let mut coords = [0.0f64; 3];
        for (slot, part) in coords.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| ParsePointError::Component(part.to_string()))?;
        }

        Ok(Point3::new(coords[0], coords[1], coords[2]))
    }
}
