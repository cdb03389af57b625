//! Rail Constraint Setup
//!
//! Couples the nodes of rail cross-sections to a reference point with
//! linear constraint equations, so that a rail model can be loaded by
//! prescribing the reference point's extension and bending only.
//!
//! This crate provides:
//! - Configuration of the fixed part, instance and set names
//! - Reference point provisioning
//! - Pairing of constrained and retained cross-section nodes
//! - Per-axis constraint equation construction
//! - An orchestrator running the whole setup against a mesh kernel

pub mod config;
pub mod constants;
pub mod equations;
pub mod error;
pub mod node_sets;
pub mod reference_point;
pub mod setup;

pub use config::{ConfigError, RailConfig};
pub use equations::{add_constraint, build_equations};
pub use error::{RailError, RailResult};
pub use node_sets::{NodePairing, PairingReport, create_constraint_sets, select_offset};
pub use reference_point::{ReferencePoint, add_reference_point};
pub use setup::{ConstraintSummary, RailConstraintSetup};
