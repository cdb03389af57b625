//! Constraint equation builder
//!
//! For a constrained node `c`, an optional retained node `r` and the
//! reference point `rp`, the equations are
//!
//! ```text
//! u_x(c) = u_x(r)
//! u_y(c) = u_y(r)
//! u_z(c) = u_z(r) + u_z(rp) * (z(c) - z(r)) / L + (y(c) - y(rp)) * phi_x(rp)
//! ```
//!
//! written as `-u(c) + ... = 0`. Without a retained node, `u(r) = 0` and
//! `z(r) = 0`: the x/y relations reduce to plain boundary conditions and are
//! not emitted, while the z equation anchors the node to the rail base.

use rail_kernel::{Dof, LinearEquation, MeshKernel, Node};

use crate::config::RailConfig;
use crate::error::{RailError, RailResult};
use crate::reference_point::ReferencePoint;

/// Check that a rail length can scale the extension term
pub(crate) fn validate_rail_length(rail_length: f64) -> RailResult<()> {
    if rail_length.is_finite() && rail_length > 0.0 {
        Ok(())
    } else {
        Err(RailError::InvalidRailLength(rail_length))
    }
}

/// Name of the equation constraining `dof` of the node in `constrained_set`
pub fn equation_name(constrained_set: &str, dof: Dof) -> String {
    format!("{}_{}", constrained_set, dof.axis_name())
}

/// Build the constraint equations of one constrained node.
///
/// Returns the z equation always, and the x/y equations only when a retained
/// node is given.
///
/// # Arguments
/// * `config` - Rail names (instance used to address part sets)
/// * `rail_length` - Length of the rail, scales the extension term
/// * `constrained` - Part set name and node of the constrained node
/// * `retained` - Part set name and node of the retained node, if any
/// * `reference_point` - The rail reference point
pub fn build_equations(
    config: &RailConfig,
    rail_length: f64,
    constrained: (&str, &Node),
    retained: Option<(&str, &Node)>,
    reference_point: &ReferencePoint,
) -> RailResult<Vec<LinearEquation>> {
    validate_rail_length(rail_length)?;

    let (c_set, c_node) = constrained;
    let c_ref = config.instance_set_name(c_set);
    let r_ref = retained.map(|(r_set, _)| config.instance_set_name(r_set));
    let rp_set = config.reference_point_set_name.as_str();

    let z_retained = retained.map_or(0.0, |(_, r_node)| r_node.coordinates.z);

    let mut equations = Vec::with_capacity(Dof::TRANSLATIONS.len());
    for dof in Dof::TRANSLATIONS {
        // The constrained dof comes first and is eliminated by the solver
        let mut equation =
            LinearEquation::new(equation_name(c_set, dof)).with_term(-1.0, &c_ref, dof);

        if let Some(r_ref) = &r_ref {
            equation.push_term(1.0, r_ref, dof);
        }

        if dof == Dof::U3 {
            let extension = (c_node.coordinates.z - z_retained) / rail_length;
            equation.push_term(extension, rp_set, ReferencePoint::EXTENSION_DOF);

            let bending = reference_point.lever_arm_y(c_node.coordinates.y);
            equation.push_term(bending, rp_set, ReferencePoint::BENDING_DOF);
        }

        // A single term is a zero-displacement boundary condition, not a relation
        if equation.is_relation() {
            equations.push(equation);
        }
    }

    Ok(equations)
}

/// Add the constraint equations for the node in `constrained_set` at the
/// model level and return their names.
///
/// `constrained_set` and `retained_set` are singleton sets of the rail part;
/// the reference point set is addressed by its assembly name. Equations that
/// are already registered are left as they are and not returned.
pub fn add_constraint<K: MeshKernel + ?Sized>(
    kernel: &K,
    config: &RailConfig,
    rail_length: f64,
    constrained_set: &str,
    reference_point: &ReferencePoint,
    retained_set: Option<&str>,
) -> RailResult<Vec<String>> {
    let c_node = singleton_node(kernel, config, constrained_set)?;
    let r_node = match retained_set {
        Some(r_set) => Some((r_set, singleton_node(kernel, config, r_set)?)),
        None => None,
    };

    let equations = build_equations(
        config,
        rail_length,
        (constrained_set, &c_node),
        r_node.as_ref().map(|(name, node)| (*name, node)),
        reference_point,
    )?;

    let mut names = Vec::with_capacity(equations.len());
    for equation in &equations {
        if kernel.has_equation(&equation.name)? {
            tracing::debug!("Equation {} already exists", equation.name);
            continue;
        }
        kernel.create_linear_equation(equation)?;
        names.push(equation.name.clone());
    }
    tracing::debug!("Added {} equations for {}", names.len(), constrained_set);

    Ok(names)
}

fn singleton_node<K: MeshKernel + ?Sized>(
    kernel: &K,
    config: &RailConfig,
    set_name: &str,
) -> RailResult<Node> {
    let nodes = kernel.get_nodes(&config.rail_part_name, set_name)?;
    match nodes.as_slice() {
        [node] => Ok(*node),
        _ => Err(RailError::SingletonSetExpected {
            set: set_name.to_string(),
            count: nodes.len(),
        }),
    }
}
