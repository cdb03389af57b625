//! Node-set factory
//!
//! Pairs every node of a constrained cross-section with the node at the same
//! in-plane position on a retained cross-section, and creates one singleton
//! set per node so that equations can address single nodes.
//!
//! The retained section may hold more nodes than the constrained one, but
//! not the other way around. The offset between the two sections is taken
//! from their bounding boxes, so the sections may be displaced along any axis.

use std::collections::BTreeSet;

use glam::DVec3;
use serde::{Deserialize, Serialize};

use rail_kernel::{BoundingBox, MeshKernel, Node, NodeLabel};

use crate::config::RailConfig;
use crate::error::{RailError, RailResult};

/// A constrained node and the sets created for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePairing {
    /// Label of the constrained node
    pub constrained_label: NodeLabel,
    /// Singleton set holding the constrained node
    pub constrained_set: String,
    /// Singleton set holding the matching retained node, if any
    pub retained_set: Option<String>,
}

/// Outcome of a pairing run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PairingReport {
    /// New pairings, in constrained-group order
    pub pairs: Vec<NodePairing>,
    /// Constrained nodes without a retained node in their search box
    pub unpaired: Vec<NodeLabel>,
    /// Constrained nodes whose set already existed (earlier run)
    pub skipped: Vec<NodeLabel>,
}

impl PairingReport {
    /// Names of the constrained sets created
    pub fn constrained_set_names(&self) -> Vec<&str> {
        self.pairs.iter().map(|p| p.constrained_set.as_str()).collect()
    }

    /// Names of the retained sets, parallel to [`Self::constrained_set_names`]
    pub fn retained_set_names(&self) -> Vec<Option<&str>> {
        self.pairs.iter().map(|p| p.retained_set.as_deref()).collect()
    }

    /// True when every constrained node was either paired or skipped
    pub fn is_complete(&self) -> bool {
        self.unpaired.is_empty()
    }
}

/// Select the offset vector from the constrained to the retained section.
///
/// The displacements between the low corners and between the high corners
/// of the two boxes are compared, and the longer one is used. When the
/// retained box is a superset of the constrained one on one side, the other
/// side still carries the full offset. Ties pick the high-corner vector.
pub fn select_offset(constrained: &BoundingBox, retained: &BoundingBox) -> DVec3 {
    let low = retained.low - constrained.low;
    let high = retained.high - constrained.high;
    if low.length() > high.length() {
        low
    } else {
        high
    }
}

/// Create singleton sets for each matching node of the constrained and
/// retained sets of the rail part.
///
/// Without a retained set, only constrained sets are created and every
/// pairing has no retained set (the node relates to the reference point
/// only). Nodes whose constrained set already exists are skipped, which makes
/// the operation safe to re-run.
///
/// # Arguments
/// * `kernel` - The mesh kernel holding the rail model
/// * `config` - Rail names and search tolerance
/// * `constrained_set` - Part set holding the nodes to constrain
/// * `retained_set` - Part set holding the candidate retained nodes
///
/// # Errors
/// [`RailError::AmbiguousCorrespondence`] if more than one retained node lies
/// in the search box of a constrained node. All nodes are matched before the
/// first set is created, so no set is created in that case.
pub fn create_constraint_sets<K: MeshKernel + ?Sized>(
    kernel: &K,
    config: &RailConfig,
    constrained_set: &str,
    retained_set: Option<&str>,
) -> RailResult<PairingReport> {
    let part = config.rail_part_name.as_str();
    let c_nodes = kernel.get_nodes(part, constrained_set)?;
    if c_nodes.is_empty() {
        return Err(RailError::EmptyNodeGroup(constrained_set.to_string()));
    }

    let mut existing = kernel.list_set_names(part)?;
    let mut report = PairingReport::default();

    let Some(retained_set) = retained_set else {
        for c_node in &c_nodes {
            let c_name = RailConfig::constrained_set_name(c_node.label);
            if !claim_set_name(&mut existing, &c_name) {
                report.skipped.push(c_node.label);
                continue;
            }
            kernel.create_node_set(part, &c_name, std::slice::from_ref(c_node))?;
            report.pairs.push(NodePairing {
                constrained_label: c_node.label,
                constrained_set: c_name,
                retained_set: None,
            });
        }
        log_report(constrained_set, None, &report);
        return Ok(report);
    };

    let r_nodes = kernel.get_nodes(part, retained_set)?;
    if r_nodes.is_empty() {
        return Err(RailError::EmptyNodeGroup(retained_set.to_string()));
    }

    let c_bbox = kernel.get_bounding_box(&c_nodes)?;
    let r_bbox = kernel.get_bounding_box(&r_nodes)?;
    let offset = select_offset(&c_bbox, &r_bbox);
    tracing::debug!(
        "Offset from {} to {}: {:?}",
        constrained_set,
        retained_set,
        offset
    );

    let half_extents = DVec3::splat(config.search_tolerance);
    let mut matches = Vec::with_capacity(c_nodes.len());
    for c_node in &c_nodes {
        let search_box =
            BoundingBox::from_center_half_extents(c_node.coordinates + offset, half_extents);
        let found = kernel.find_nodes_in_box(&r_nodes, &search_box)?;
        if found.len() > 1 {
            return Err(RailError::AmbiguousCorrespondence {
                constrained: c_node.label,
                candidates: found.iter().map(|n| n.label).collect(),
            });
        }

        let c_name = RailConfig::constrained_set_name(c_node.label);
        if existing.contains(&c_name) {
            report.skipped.push(c_node.label);
            continue;
        }

        let Some(r_node) = found.first() else {
            tracing::warn!(
                "No retained node in {} matches constrained node {} at {:?}",
                retained_set,
                c_node.label,
                c_node.coordinates
            );
            report.unpaired.push(c_node.label);
            continue;
        };

        existing.insert(c_name.clone());
        matches.push((c_name, *c_node, *r_node));
    }

    for (c_name, c_node, r_node) in matches {
        // Both sets carry the constrained node's label
        let r_name = RailConfig::retained_set_name(c_node.label);
        create_pair_sets(kernel, part, (&c_name, &c_node), (&r_name, &r_node))?;
        report.pairs.push(NodePairing {
            constrained_label: c_node.label,
            constrained_set: c_name,
            retained_set: Some(r_name),
        });
    }

    log_report(constrained_set, Some(retained_set), &report);
    Ok(report)
}

/// Reserve `name` in the set of known names. Returns false if it was taken.
fn claim_set_name(existing: &mut BTreeSet<String>, name: &str) -> bool {
    if existing.contains(name) {
        return false;
    }
    existing.insert(name.to_string());
    true
}

fn create_pair_sets<K: MeshKernel + ?Sized>(
    kernel: &K,
    part: &str,
    constrained: (&str, &Node),
    retained: (&str, &Node),
) -> RailResult<()> {
    kernel.create_node_set(part, constrained.0, std::slice::from_ref(constrained.1))?;
    kernel.create_node_set(part, retained.0, std::slice::from_ref(retained.1))?;
    Ok(())
}

fn log_report(constrained_set: &str, retained_set: Option<&str>, report: &PairingReport) {
    tracing::info!(
        "Paired {} nodes of {} with {} ({} skipped, {} unpaired)",
        report.pairs.len(),
        constrained_set,
        retained_set.unwrap_or("reference point"),
        report.skipped.len(),
        report.unpaired.len()
    );
    if !report.is_complete() {
        tracing::warn!(
            "{} nodes of {} left unpaired: {:?}",
            report.unpaired.len(),
            constrained_set,
            report.unpaired
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rail_kernel::InMemoryKernel;

    /// Four nodes forming a square of side 2 in x/y at height `z`
    fn square(first_label: NodeLabel, z: f64) -> Vec<Node> {
        [(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]
            .iter()
            .enumerate()
            .map(|(i, (x, y))| Node::new(first_label + i as NodeLabel, DVec3::new(*x, *y, z)))
            .collect()
    }

    fn rail_kernel(constrained: &[Node], retained: &[Node]) -> InMemoryKernel {
        let kernel = InMemoryKernel::with_part_instance("RAIL", "RAIL-1");
        kernel.create_node_set("RAIL", "TOP", constrained).unwrap();
        kernel.create_node_set("RAIL", "LOWER", retained).unwrap();
        kernel
    }

    #[test]
    fn test_offset_prefers_longer_corner_vector() {
        let constrained = BoundingBox::new(DVec3::ZERO, DVec3::new(1.0, 1.0, 0.0));
        // Low corners 5 apart, high corners 2 apart
        let retained = BoundingBox::new(DVec3::new(0.0, 0.0, 5.0), DVec3::new(1.0, 1.0, 2.0));
        assert_eq!(select_offset(&constrained, &retained), DVec3::new(0.0, 0.0, 5.0));

        let retained = BoundingBox::new(DVec3::new(0.0, 0.0, 2.0), DVec3::new(1.0, 1.0, 5.0));
        assert_eq!(select_offset(&constrained, &retained), DVec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_offset_tie_uses_high_corners() {
        let constrained = BoundingBox::new(DVec3::new(0.0, 0.0, 10.0), DVec3::new(2.0, 2.0, 10.0));
        let retained = BoundingBox::new(DVec3::new(0.0, 0.0, 4.0), DVec3::new(2.0, 2.0, 4.0));
        let offset = select_offset(&constrained, &retained);
        assert_relative_eq!(offset.z, -6.0);
        assert_relative_eq!(offset.x, 0.0);
    }

    #[test]
    fn test_offset_with_thick_retained_region() {
        // Retained nodes span z in [0, 4], the low corners are further apart
        let constrained = BoundingBox::new(DVec3::new(0.0, 0.0, 10.0), DVec3::new(2.0, 2.0, 10.0));
        let retained = BoundingBox::new(DVec3::new(0.0, 0.0, 0.0), DVec3::new(2.0, 2.0, 4.0));
        let offset = select_offset(&constrained, &retained);
        assert_relative_eq!(offset.z, -10.0);
    }

    #[test]
    fn test_pairs_translated_square() {
        let kernel = rail_kernel(&square(1, 10.0), &square(101, 4.0));
        let config = RailConfig::default();

        let report = create_constraint_sets(&kernel, &config, "TOP", Some("LOWER")).unwrap();

        assert_eq!(report.pairs.len(), 4);
        assert!(report.is_complete());
        assert_eq!(
            report.constrained_set_names(),
            vec!["N00000001_C", "N00000002_C", "N00000003_C", "N00000004_C"]
        );
        assert_eq!(report.retained_set_names()[0], Some("N00000001_R"));

        let retained = kernel.get_nodes("RAIL", "N00000003_R").unwrap();
        assert_eq!(retained.len(), 1);
        assert_eq!(retained[0].label, 103);
    }

    #[test]
    fn test_pairing_tolerates_coordinate_noise() {
        let mut retained = square(101, 4.0);
        retained[2].coordinates.x += 4e-4;
        retained[3].coordinates.y -= 4e-4;
        let kernel = rail_kernel(&square(1, 10.0), &retained);

        let report =
            create_constraint_sets(&kernel, &RailConfig::default(), "TOP", Some("LOWER")).unwrap();
        assert_eq!(report.pairs.len(), 4);
    }

    #[test]
    fn test_ambiguous_correspondence_is_fatal() {
        let constrained = vec![Node::new(1, DVec3::new(0.0, 0.0, 10.0))];
        let retained = vec![
            Node::new(101, DVec3::new(0.0, 0.0, 4.0)),
            Node::new(102, DVec3::new(0.0, 0.0, 4.0 + 5e-4)),
        ];
        let kernel = rail_kernel(&constrained, &retained);

        let result = create_constraint_sets(&kernel, &RailConfig::default(), "TOP", Some("LOWER"));

        match result {
            Err(RailError::AmbiguousCorrespondence {
                constrained,
                candidates,
            }) => {
                assert_eq!(constrained, 1);
                assert_eq!(candidates, vec![101, 102]);
            }
            other => panic!("Expected ambiguous correspondence, got {:?}", other),
        }
        let sets = kernel.list_set_names("RAIL").unwrap();
        assert!(!sets.contains("N00000001_C"));
        assert!(!sets.contains("N00000001_R"));
    }

    #[test]
    fn test_ambiguity_on_later_node_creates_no_sets() {
        let constrained = vec![
            Node::new(1, DVec3::new(0.0, 0.0, 10.0)),
            Node::new(2, DVec3::new(2.0, 0.0, 10.0)),
        ];
        let retained = vec![
            Node::new(101, DVec3::new(0.0, 0.0, 4.0)),
            Node::new(102, DVec3::new(2.0, 0.0, 4.0)),
            Node::new(103, DVec3::new(2.0, 0.0, 4.0 + 5e-4)),
        ];
        let kernel = rail_kernel(&constrained, &retained);

        let result = create_constraint_sets(&kernel, &RailConfig::default(), "TOP", Some("LOWER"));

        assert!(matches!(
            result,
            Err(RailError::AmbiguousCorrespondence { constrained: 2, .. })
        ));
        // Node 1 matched fine but nothing was created for it either
        let sets = kernel.list_set_names("RAIL").unwrap();
        assert_eq!(sets.len(), 2);
        assert!(!sets.contains("N00000001_C"));
    }

    #[test]
    fn test_retained_superset_pairs_with_far_layer() {
        // Retained group holds two layers, only z=0 lines up with the offset
        let mut retained = square(101, 0.0);
        retained.extend(square(201, 4.0));
        let kernel = rail_kernel(&square(1, 10.0), &retained);

        let report =
            create_constraint_sets(&kernel, &RailConfig::default(), "TOP", Some("LOWER")).unwrap();

        assert_eq!(report.pairs.len(), 4);
        assert!(report.is_complete());
        for pair in &report.pairs {
            let r_set = pair.retained_set.as_deref().unwrap();
            let r_nodes = kernel.get_nodes("RAIL", r_set).unwrap();
            assert_eq!(r_nodes.len(), 1);
            assert_eq!(r_nodes[0].label, pair.constrained_label + 100);
            assert_relative_eq!(r_nodes[0].coordinates.z, 0.0);
        }
    }

    #[test]
    fn test_unmatched_nodes_are_reported() {
        let mut retained = square(101, 4.0);
        // Node 104 leaves its corner, the bounding box stays the same
        retained[3].coordinates.x = 0.5;
        let kernel = rail_kernel(&square(1, 10.0), &retained);

        let report =
            create_constraint_sets(&kernel, &RailConfig::default(), "TOP", Some("LOWER")).unwrap();

        assert_eq!(report.pairs.len(), 3);
        assert_eq!(report.unpaired, vec![4]);
        assert!(!report.is_complete());
        assert!(!kernel.list_set_names("RAIL").unwrap().contains("N00000004_C"));
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let kernel = rail_kernel(&square(1, 10.0), &square(101, 4.0));
        let config = RailConfig::default();

        let first = create_constraint_sets(&kernel, &config, "TOP", Some("LOWER")).unwrap();
        let names_after_first = kernel.list_set_names("RAIL").unwrap();

        let second = create_constraint_sets(&kernel, &config, "TOP", Some("LOWER")).unwrap();
        let names_after_second = kernel.list_set_names("RAIL").unwrap();

        assert_eq!(first.pairs.len(), 4);
        assert!(second.pairs.is_empty());
        assert_eq!(second.skipped, vec![1, 2, 3, 4]);
        assert_eq!(names_after_first, names_after_second);
        // TOP, LOWER, 4 constrained and 4 retained sets
        assert_eq!(names_after_second.len(), 10);
    }

    #[test]
    fn test_without_retained_set() {
        let kernel = rail_kernel(&square(1, 0.0), &square(101, 4.0));
        let config = RailConfig::default();

        let report = create_constraint_sets(&kernel, &config, "TOP", None).unwrap();
        assert_eq!(report.pairs.len(), 4);
        assert!(report.retained_set_names().iter().all(Option::is_none));

        let again = create_constraint_sets(&kernel, &config, "TOP", None).unwrap();
        assert!(again.pairs.is_empty());
        assert_eq!(again.skipped.len(), 4);
    }

    #[test]
    fn test_duplicate_nodes_in_group_pair_once() {
        let node = Node::new(7, DVec3::new(0.0, 0.0, 0.0));
        let kernel = rail_kernel(&[node, node], &square(101, 4.0));

        let report =
            create_constraint_sets(&kernel, &RailConfig::default(), "TOP", None).unwrap();
        assert_eq!(report.pairs.len(), 1);
        assert_eq!(report.skipped, vec![7]);
    }

    #[test]
    fn test_empty_group_is_rejected() {
        let kernel = rail_kernel(&[], &square(101, 4.0));
        let result = create_constraint_sets(&kernel, &RailConfig::default(), "TOP", Some("LOWER"));
        assert!(matches!(result, Err(RailError::EmptyNodeGroup(name)) if name == "TOP"));
    }
}
