//! Rail constraint setup
//!
//! Runs the node-set factory and the equation builder against one kernel,
//! with one configuration, rail length and reference point.

use serde::{Deserialize, Serialize};

use std::collections::BTreeSet;

use rail_kernel::{KernelError, MeshKernel};

use crate::config::RailConfig;
use crate::equations::{add_constraint, validate_rail_length};
use crate::error::{RailError, RailResult};
use crate::node_sets::{NodePairing, PairingReport, create_constraint_sets};
use crate::reference_point::{ReferencePoint, add_reference_point};

/// Result of constraining one node group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSummary {
    /// Pairing of the constrained nodes
    pub pairing: PairingReport,
    /// Names of the equations registered, in creation order
    pub equations: Vec<String>,
}

/// Rail constraint setup bound to a mesh kernel
pub struct RailConstraintSetup<'k, K: MeshKernel + ?Sized> {
    kernel: &'k K,
    config: RailConfig,
    rail_length: f64,
    reference_point: Option<ReferencePoint>,
}

impl<'k, K: MeshKernel + ?Sized> RailConstraintSetup<'k, K> {
    /// Create a setup for a rail of length `rail_length`
    pub fn new(kernel: &'k K, config: RailConfig, rail_length: f64) -> RailResult<Self> {
        if !kernel.is_available() {
            return Err(KernelError::KernelNotAvailable(kernel.name().to_string()).into());
        }
        config.validate()?;
        validate_rail_length(rail_length)?;
        Ok(Self {
            kernel,
            config,
            rail_length,
            reference_point: None,
        })
    }

    /// Use a reference point that was added earlier
    pub fn with_reference_point(mut self, reference_point: ReferencePoint) -> Self {
        self.reference_point = Some(reference_point);
        self
    }

    /// Get the configuration
    pub fn config(&self) -> &RailConfig {
        &self.config
    }

    /// Get the rail length
    pub fn rail_length(&self) -> f64 {
        self.rail_length
    }

    /// Get the reference point, if one has been added
    pub fn reference_point(&self) -> Option<&ReferencePoint> {
        self.reference_point.as_ref()
    }

    /// Add the reference point at height `y_coord`.
    ///
    /// The height sets the neutral line for bending: at the rail top the
    /// surface gets no normal strain from the prescribed bending, at the
    /// profile's neutral line bending and normal load separate naturally.
    pub fn add_reference_point(&mut self, y_coord: f64) -> RailResult<ReferencePoint> {
        let reference_point = add_reference_point(self.kernel, &self.config, y_coord)?;
        self.reference_point = Some(reference_point);
        Ok(reference_point)
    }

    /// Couple the nodes of `constrained_set` to the matching nodes of
    /// `retained_set` and to the reference point.
    pub fn couple_sections(
        &self,
        constrained_set: &str,
        retained_set: &str,
    ) -> RailResult<ConstraintSummary> {
        self.constrain(constrained_set, Some(retained_set))
    }

    /// Constrain the nodes at the bottom of the rail (`z = 0`) to the
    /// reference point only.
    pub fn constrain_bottom(&self, bottom_set: &str) -> RailResult<ConstraintSummary> {
        self.constrain(bottom_set, None)
    }

    /// Constrain the shadow region of the rail to its contact region.
    pub fn constrain_shadow_region(
        &self,
        _shadow_set: &str,
        _contact_set: &str,
    ) -> RailResult<ConstraintSummary> {
        Err(RailError::NotImplemented("shadow region constraints"))
    }

    fn constrain(
        &self,
        constrained_set: &str,
        retained_set: Option<&str>,
    ) -> RailResult<ConstraintSummary> {
        let reference_point = self
            .reference_point
            .as_ref()
            .ok_or(RailError::MissingReferencePoint)?;

        let pairing =
            create_constraint_sets(self.kernel, &self.config, constrained_set, retained_set)?;

        let resumed = self.resumed_pairings(&pairing, retained_set)?;

        let mut equations = Vec::new();
        for pair in pairing.pairs.iter().chain(&resumed) {
            let names = add_constraint(
                self.kernel,
                &self.config,
                self.rail_length,
                &pair.constrained_set,
                reference_point,
                pair.retained_set.as_deref(),
            )?;
            equations.extend(names);
        }

        tracing::info!(
            "Constrained {} nodes of {} with {} equations",
            pairing.pairs.len(),
            constrained_set,
            equations.len()
        );

        Ok(ConstraintSummary { pairing, equations })
    }

    /// Pairings of skipped nodes, whose sets come from an earlier run that
    /// may have stopped before all of their equations were added.
    fn resumed_pairings(
        &self,
        pairing: &PairingReport,
        retained_set: Option<&str>,
    ) -> RailResult<Vec<NodePairing>> {
        if pairing.skipped.is_empty() {
            return Ok(Vec::new());
        }

        let existing = self.kernel.list_set_names(&self.config.rail_part_name)?;
        let mut seen: BTreeSet<_> = pairing.pairs.iter().map(|p| p.constrained_label).collect();

        let mut resumed = Vec::new();
        for &label in &pairing.skipped {
            if !seen.insert(label) {
                continue;
            }
            let retained = retained_set
                .map(|_| RailConfig::retained_set_name(label))
                .filter(|name| existing.contains(name));
            resumed.push(NodePairing {
                constrained_label: label,
                constrained_set: RailConfig::constrained_set_name(label),
                retained_set: retained,
            });
        }
        Ok(resumed)
    }
}
