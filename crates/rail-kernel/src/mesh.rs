//! Mesh nodes and axis-aligned bounding boxes for node search.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Label identifying a node within a mesh
pub type NodeLabel = u32;

/// A meshed node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Label of the node (unique within the mesh)
    pub label: NodeLabel,
    /// Node coordinates
    pub coordinates: DVec3,
}

impl Node {
    /// Create a new node
    pub fn new(label: NodeLabel, coordinates: DVec3) -> Self {
        Self { label, coordinates }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Low corner of the bounding box.
    pub low: DVec3,
    /// High corner of the bounding box.
    pub high: DVec3,
}

impl BoundingBox {
    /// Creates a new bounding box from low and high corners.
    pub fn new(low: DVec3, high: DVec3) -> Self {
        Self { low, high }
    }

    /// Creates an empty (inverted) bounding box.
    pub fn empty() -> Self {
        Self {
            low: DVec3::splat(f64::INFINITY),
            high: DVec3::splat(f64::NEG_INFINITY),
        }
    }

    /// Creates a bounding box from a center point and half-extents.
    pub fn from_center_half_extents(center: DVec3, half_extents: DVec3) -> Self {
        Self {
            low: center - half_extents,
            high: center + half_extents,
        }
    }

    /// Creates a bounding box that contains all given points.
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Self {
        let mut bbox = Self::empty();
        for point in points {
            bbox = bbox.expand_to_include(point);
        }
        bbox
    }

    /// Creates a bounding box that contains all given nodes.
    pub fn from_nodes(nodes: &[Node]) -> Self {
        Self::from_points(nodes.iter().map(|n| n.coordinates))
    }

    /// Returns true if no point has been included (inverted box).
    pub fn is_empty(&self) -> bool {
        self.low.x > self.high.x || self.low.y > self.high.y || self.low.z > self.high.z
    }

    /// Returns the size (full extents) of the bounding box.
    pub fn size(&self) -> DVec3 {
        self.high - self.low
    }

    /// Returns true if the bounding box contains the given point (bounds inclusive).
    pub fn contains_point(&self, point: DVec3) -> bool {
        point.x >= self.low.x
            && point.x <= self.high.x
            && point.y >= self.low.y
            && point.y <= self.high.y
            && point.z >= self.low.z
            && point.z <= self.high.z
    }

    /// Returns a new bounding box expanded to include the given point.
    pub fn expand_to_include(&self, point: DVec3) -> BoundingBox {
        BoundingBox {
            low: self.low.min(point),
            high: self.high.max(point),
        }
    }
}
