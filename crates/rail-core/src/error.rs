//! Rail setup errors

use rail_kernel::{KernelError, NodeLabel};

use crate::config::ConfigError;

/// Errors aborting the rail constraint setup
#[derive(Debug, Clone, thiserror::Error)]
pub enum RailError {
    #[error("Mesh kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Ambiguous correspondence: node {constrained} matches retained nodes {candidates:?}")]
    AmbiguousCorrespondence {
        constrained: NodeLabel,
        candidates: Vec<NodeLabel>,
    },

    #[error("Node group '{0}' is empty")]
    EmptyNodeGroup(String),

    #[error("Set '{set}' must hold exactly one node, found {count}")]
    SingletonSetExpected { set: String, count: usize },

    #[error("Rail length must be positive and finite, got {0}")]
    InvalidRailLength(f64),

    #[error("No reference point has been added to the rail")]
    MissingReferencePoint,

    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),
}

/// Result type for rail setup operations
pub type RailResult<T> = Result<T, RailError>;
