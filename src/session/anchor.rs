//! World-space anchors placed by the user

use crate::geometry::Point3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fixed reference point in the AR world, created from a hit-test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    id: Uuid,
    pose: Point3,
}

impl Anchor {
    /// Create an anchor at `pose` with a fresh id
    pub fn new(pose: Point3) -> Self {
        Self {
            id: Uuid::new_v4(),
            pose,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// World position of the anchor
    pub fn pose(&self) -> Point3 {
        self.pose
    }
}
