//! Mesh Kernel Abstraction for Rail Constraints
//!
//! This crate provides:
//! - Mesh node and bounding box types used for spatial node search
//! - Linear constraint equation data (terms, degree-of-freedom references)
//! - The abstract mesh kernel trait consumed by the constraint setup
//! - An in-memory kernel model and a null kernel

pub mod equation;
pub mod kernel;
pub mod mesh;

// Re-exports for convenience
pub use equation::{Dof, EquationTerm, LinearEquation};
pub use kernel::{
    InMemoryKernel, KernelError, KernelResult, MeshKernel, NullKernel, ReferencePointId,
};
pub use mesh::{BoundingBox, Node, NodeLabel};
