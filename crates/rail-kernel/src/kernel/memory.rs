//! In-memory Mesh Kernel Backend
//!
//! Holds a finite-element model (parts with node sets and reference points,
//! instances, assembly point sets, equations) in process memory. Used for
//! tests and for running the constraint setup without a host application.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use glam::DVec3;
use parking_lot::Mutex;

use super::{KernelError, KernelResult, MeshKernel, ReferencePointId};
use crate::equation::LinearEquation;
use crate::mesh::Node;

#[derive(Debug, Default)]
struct PartModel {
    sets: BTreeMap<String, Vec<Node>>,
    reference_points: HashMap<ReferencePointId, DVec3>,
}

#[derive(Debug, Default)]
struct Model {
    parts: HashMap<String, PartModel>,
    /// instance name -> part name
    instances: HashMap<String, String>,
    /// Assembly-level point sets: name -> (instance, reference point)
    point_sets: BTreeMap<String, (String, ReferencePointId)>,
    /// Reference points visible in the assembly (after regeneration)
    regenerated: HashSet<ReferencePointId>,
    /// Equations in registration order
    equations: Vec<LinearEquation>,
}

impl Model {
    fn part(&self, name: &str) -> KernelResult<&PartModel> {
        self.parts
            .get(name)
            .ok_or_else(|| KernelError::PartNotFound(name.to_string()))
    }

    fn part_mut(&mut self, name: &str) -> KernelResult<&mut PartModel> {
        self.parts
            .get_mut(name)
            .ok_or_else(|| KernelError::PartNotFound(name.to_string()))
    }

    fn instance_part(&self, instance: &str) -> KernelResult<&PartModel> {
        let part = self
            .instances
            .get(instance)
            .ok_or_else(|| KernelError::InstanceNotFound(instance.to_string()))?;
        self.part(part)
    }

    /// Check that an equation term's set name resolves, either as
    /// `"{instance}.{set}"` or as an assembly point set.
    fn resolve_term_set(&self, set_name: &str) -> KernelResult<()> {
        if self.point_sets.contains_key(set_name) {
            return Ok(());
        }
        if let Some((instance, set)) = set_name.split_once('.') {
            if self.instance_part(instance)?.sets.contains_key(set) {
                return Ok(());
            }
        }
        Err(KernelError::SetNotFound(set_name.to_string()))
    }
}

/// In-memory finite-element model kernel
#[derive(Debug, Default)]
pub struct InMemoryKernel {
    model: Mutex<Model>,
}

impl InMemoryKernel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a model with one part and one instance of it
    pub fn with_part_instance(part: &str, instance: &str) -> Self {
        let kernel = Self::new();
        kernel.add_part(part);
        let mut model = kernel.model.lock();
        model
            .instances
            .insert(instance.to_string(), part.to_string());
        drop(model);
        kernel
    }

    /// Add an empty part (no-op if it already exists)
    pub fn add_part(&self, name: &str) {
        self.model
            .lock()
            .parts
            .entry(name.to_string())
            .or_default();
    }

    /// Add an instance of an existing part
    pub fn add_instance(&self, instance: &str, part: &str) -> KernelResult<()> {
        let mut model = self.model.lock();
        model.part(part)?;
        model
            .instances
            .insert(instance.to_string(), part.to_string());
        Ok(())
    }

    /// All registered equations in registration order
    pub fn equations(&self) -> Vec<LinearEquation> {
        self.model.lock().equations.clone()
    }

    /// Look up an equation by name
    pub fn equation(&self, name: &str) -> Option<LinearEquation> {
        self.model
            .lock()
            .equations
            .iter()
            .find(|e| e.name == name)
            .cloned()
    }

    /// Number of registered equations
    pub fn equation_count(&self) -> usize {
        self.model.lock().equations.len()
    }

    /// Coordinates of all reference points of a part
    pub fn reference_points(&self, part: &str) -> Vec<(ReferencePointId, DVec3)> {
        self.model
            .lock()
            .parts
            .get(part)
            .map(|p| p.reference_points.iter().map(|(id, c)| (*id, *c)).collect())
            .unwrap_or_default()
    }

    /// The reference point held by an assembly point set
    pub fn point_set(&self, name: &str) -> Option<ReferencePointId> {
        self.model.lock().point_sets.get(name).map(|(_, id)| *id)
    }
}

impl MeshKernel for InMemoryKernel {
    fn name(&self) -> &str {
        "in-memory"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn get_nodes(&self, part: &str, set_name: &str) -> KernelResult<Vec<Node>> {
        let model = self.model.lock();
        model
            .part(part)?
            .sets
            .get(set_name)
            .cloned()
            .ok_or_else(|| KernelError::SetNotFound(format!("{part}.{set_name}")))
    }

    fn list_set_names(&self, part: &str) -> KernelResult<BTreeSet<String>> {
        let model = self.model.lock();
        Ok(model.part(part)?.sets.keys().cloned().collect())
    }

    fn create_node_set(&self, part: &str, name: &str, nodes: &[Node]) -> KernelResult<()> {
        let mut model = self.model.lock();
        let part_model = model.part_mut(part)?;

        if let Some(existing) = part_model.sets.get(name) {
            if existing.as_slice() == nodes {
                return Ok(());
            }
            return Err(KernelError::SetConflict(format!("{part}.{name}")));
        }

        tracing::debug!("Creating node set {}.{} ({} nodes)", part, name, nodes.len());
        part_model.sets.insert(name.to_string(), nodes.to_vec());
        Ok(())
    }

    fn create_reference_point(
        &self,
        part: &str,
        coordinates: DVec3,
    ) -> KernelResult<ReferencePointId> {
        if !coordinates.is_finite() {
            return Err(KernelError::InvalidCoordinates(format!("{coordinates:?}")));
        }

        let mut model = self.model.lock();
        let id = ReferencePointId::new();
        model
            .part_mut(part)?
            .reference_points
            .insert(id, coordinates);
        tracing::debug!("Created reference point {} on {} at {:?}", id, part, coordinates);
        Ok(id)
    }

    fn regenerate_assembly(&self) -> KernelResult<()> {
        let mut model = self.model.lock();
        let visible: Vec<ReferencePointId> = model
            .instances
            .values()
            .filter_map(|part| model.parts.get(part))
            .flat_map(|p| p.reference_points.keys().copied())
            .collect();
        model.regenerated.extend(visible);
        Ok(())
    }

    fn create_point_set(
        &self,
        name: &str,
        instance: &str,
        reference: ReferencePointId,
    ) -> KernelResult<()> {
        let mut model = self.model.lock();

        if !model
            .instance_part(instance)?
            .reference_points
            .contains_key(&reference)
        {
            return Err(KernelError::ReferencePointNotFound(reference));
        }
        if !model.regenerated.contains(&reference) {
            return Err(KernelError::NotRegenerated(reference));
        }

        if let Some((existing_instance, existing)) = model.point_sets.get(name) {
            if existing_instance == instance && *existing == reference {
                return Ok(());
            }
            return Err(KernelError::SetConflict(name.to_string()));
        }

        model
            .point_sets
            .insert(name.to_string(), (instance.to_string(), reference));
        Ok(())
    }

    fn create_linear_equation(&self, equation: &LinearEquation) -> KernelResult<()> {
        let mut model = self.model.lock();

        if model.equations.iter().any(|e| e.name == equation.name) {
            return Err(KernelError::DuplicateEquation(equation.name.clone()));
        }
        if !equation.is_relation() {
            return Err(KernelError::InvalidEquation {
                name: equation.name.clone(),
                reason: format!("needs at least 2 terms, got {}", equation.len()),
            });
        }
        for term in &equation.terms {
            if !term.coefficient.is_finite() {
                return Err(KernelError::InvalidEquation {
                    name: equation.name.clone(),
                    reason: format!("non-finite coefficient for {}", term.set_name),
                });
            }
            model.resolve_term_set(&term.set_name)?;
        }

        model.equations.push(equation.clone());
        Ok(())
    }

    fn has_equation(&self, name: &str) -> KernelResult<bool> {
        Ok(self.model.lock().equations.iter().any(|e| e.name == name))
    }
}
