//! Rail reference point
//!
//! The reference point carries the rigid-body degrees of freedom that drive
//! rail extension and bending. Its height sets the neutral line for bending.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use rail_kernel::{Dof, MeshKernel, ReferencePointId};

use crate::config::RailConfig;
use crate::error::RailResult;

/// A reference point registered in the assembly
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferencePoint {
    /// Kernel handle of the point
    pub id: ReferencePointId,
    /// Point coordinates
    pub coordinates: DVec3,
}

impl ReferencePoint {
    /// Degree of freedom prescribing the axial stretch of the rail
    pub const EXTENSION_DOF: Dof = Dof::U3;

    /// Degree of freedom prescribing bending about the x axis
    pub const BENDING_DOF: Dof = Dof::Ur1;

    /// Lever arm in y of a point at height `y` relative to the neutral line
    pub fn lever_arm_y(&self, y: f64) -> f64 {
        y - self.coordinates.y
    }
}

/// Add the rail reference point used to prescribe rail tension and bending.
///
/// The point is placed at `(0, y_coord, 0)` on the rail part, the assembly is
/// regenerated, and the point is put in the configured assembly set.
///
/// # Arguments
/// * `kernel` - The mesh kernel holding the rail model
/// * `config` - Rail names
/// * `y_coord` - Height of the reference point (neutral line for bending)
pub fn add_reference_point<K: MeshKernel + ?Sized>(
    kernel: &K,
    config: &RailConfig,
    y_coord: f64,
) -> RailResult<ReferencePoint> {
    let coordinates = DVec3::new(0.0, y_coord, 0.0);

    let id = kernel.create_reference_point(&config.rail_part_name, coordinates)?;
    kernel.regenerate_assembly()?;
    kernel.create_point_set(
        &config.reference_point_set_name,
        &config.rail_instance_name,
        id,
    )?;

    tracing::info!(
        "Added rail reference point at {:?} in set {}",
        coordinates,
        config.reference_point_set_name
    );

    Ok(ReferencePoint { id, coordinates })
}
