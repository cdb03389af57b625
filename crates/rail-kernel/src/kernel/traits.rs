//! Mesh kernel trait definitions
//!
//! These traits define the interface that every finite-element model backend
//! must implement for the rail constraint setup.

use std::collections::BTreeSet;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::equation::LinearEquation;
use crate::mesh::{BoundingBox, Node};

/// Unique identifier for a reference point within a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferencePointId(pub Uuid);

impl ReferencePointId {
    /// Create a new random reference point ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReferencePointId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReferencePointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for mesh kernel operations
#[derive(Debug, Clone, Error)]
pub enum KernelError {
    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Part not found: {0}")]
    PartNotFound(String),

    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Set not found: {0}")]
    SetNotFound(String),

    #[error("Set '{0}' already exists with different content")]
    SetConflict(String),

    #[error("Reference point not found: {0}")]
    ReferencePointNotFound(ReferencePointId),

    #[error("Reference point {0} is not visible in the assembly, regenerate first")]
    NotRegenerated(ReferencePointId),

    #[error("Equation already exists: {0}")]
    DuplicateEquation(String),

    #[error("Invalid equation '{name}': {reason}")]
    InvalidEquation { name: String, reason: String },

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Cannot compute bounding box of an empty node group")]
    EmptyNodeGroup,
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

/// The main mesh kernel trait
///
/// Implementations give access to a meshed finite-element model: node
/// queries on named sets, bounding-box search, and registration of sets,
/// reference points and linear constraint equations.
///
/// Node sets belong to a part. Point sets and equations live at the
/// assembly/model level; equation terms address part sets through an
/// instance as `"{instance}.{set}"` and assembly sets by their plain name.
pub trait MeshKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    /// Get the nodes of a part-level set
    ///
    /// # Arguments
    /// * `part` - Name of the part owning the set
    /// * `set_name` - Name of the set
    fn get_nodes(&self, part: &str, set_name: &str) -> KernelResult<Vec<Node>>;

    /// Get the names of all sets defined on a part
    fn list_set_names(&self, part: &str) -> KernelResult<BTreeSet<String>>;

    /// Create a node set on a part
    ///
    /// Creating a set that already exists with the same nodes is a no-op.
    /// A name collision with different nodes is an error.
    fn create_node_set(&self, part: &str, name: &str, nodes: &[Node]) -> KernelResult<()>;

    /// Create a reference point on a part
    ///
    /// The point is not addressable from the assembly until
    /// [`MeshKernel::regenerate_assembly`] has been called.
    fn create_reference_point(
        &self,
        part: &str,
        coordinates: DVec3,
    ) -> KernelResult<ReferencePointId>;

    /// Regenerate the assembly so that new part features become visible
    fn regenerate_assembly(&self) -> KernelResult<()>;

    /// Create an assembly-level set holding a reference point of an instance
    ///
    /// # Arguments
    /// * `name` - Name of the assembly set
    /// * `instance` - Instance through which the reference point is addressed
    /// * `reference` - The reference point
    fn create_point_set(
        &self,
        name: &str,
        instance: &str,
        reference: ReferencePointId,
    ) -> KernelResult<()>;

    /// Register a linear constraint equation at the model level
    fn create_linear_equation(&self, equation: &LinearEquation) -> KernelResult<()>;

    /// Check if an equation with this name is registered
    fn has_equation(&self, name: &str) -> KernelResult<bool>;

    /// Compute the axis-aligned bounding box of a node group
    fn get_bounding_box(&self, nodes: &[Node]) -> KernelResult<BoundingBox> {
        if nodes.is_empty() {
            return Err(KernelError::EmptyNodeGroup);
        }
        Ok(BoundingBox::from_nodes(nodes))
    }

    /// Find the nodes of a group lying inside a bounding box (bounds inclusive)
    fn find_nodes_in_box(&self, nodes: &[Node], bbox: &BoundingBox) -> KernelResult<Vec<Node>> {
        Ok(nodes
            .iter()
            .filter(|n| bbox.contains_point(n.coordinates))
            .copied()
            .collect())
    }
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl MeshKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn get_nodes(&self, _part: &str, _set_name: &str) -> KernelResult<Vec<Node>> {
        Err(KernelError::KernelNotAvailable("No mesh kernel available".into()))
    }

    fn list_set_names(&self, _part: &str) -> KernelResult<BTreeSet<String>> {
        Err(KernelError::KernelNotAvailable("No mesh kernel available".into()))
    }

    fn create_node_set(&self, _part: &str, _name: &str, _nodes: &[Node]) -> KernelResult<()> {
        Err(KernelError::KernelNotAvailable("No mesh kernel available".into()))
    }

    fn create_reference_point(
        &self,
        _part: &str,
        _coordinates: DVec3,
    ) -> KernelResult<ReferencePointId> {
        Err(KernelError::KernelNotAvailable("No mesh kernel available".into()))
    }

    fn regenerate_assembly(&self) -> KernelResult<()> {
        Err(KernelError::KernelNotAvailable("No mesh kernel available".into()))
    }

    fn create_point_set(
        &self,
        _name: &str,
        _instance: &str,
        _reference: ReferencePointId,
    ) -> KernelResult<()> {
        Err(KernelError::KernelNotAvailable("No mesh kernel available".into()))
    }

    fn create_linear_equation(&self, _equation: &LinearEquation) -> KernelResult<()> {
        Err(KernelError::KernelNotAvailable("No mesh kernel available".into()))
    }

    fn has_equation(&self, _name: &str) -> KernelResult<bool> {
        Err(KernelError::KernelNotAvailable("No mesh kernel available".into()))
    }
}
