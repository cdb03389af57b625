//! Global constants for rail-core

/// Half-width of the box used to find the retained node matching a
/// constrained node (model length units)
pub const SEARCH_TOLERANCE: f64 = 1e-3;

/// Default name of the rail part
pub const RAIL_PART_NAME: &str = "RAIL";

/// Default name of the rail instance in the assembly
pub const RAIL_INSTANCE_NAME: &str = "RAIL-1";

/// Default name of the assembly set holding the rail reference point
pub const RAIL_RP_SET_NAME: &str = "RAIL_RP";

/// Number of digits the node label is zero-padded to in per-node set names
pub const NODE_LABEL_WIDTH: usize = 8;
