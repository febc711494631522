use std::collections::HashMap;

use bevy::prelude::*;
use constants::slots::{VehicleSlot, slot_for_mesh_name};

use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::vehicle_loader::{VehicleLoader, VehicleRoot};
use crate::engine::scene::materials::{MaterialOverrides, OriginalAppearance};

/// One mesh node lifted out of the spawned vehicle hierarchy.
#[derive(Debug, Clone)]
pub struct IndexedMeshNode {
    pub entity: Entity,
    pub name: String,
}

/// Flat index of the loaded vehicle's mesh nodes. Built once per load
/// generation; the hierarchy is never re-traversed per frame.
#[derive(Resource, Debug, Default)]
pub struct VehicleSceneIndex {
    pub nodes: Vec<IndexedMeshNode>,
    pub generation: u64,
}

/// Slot -> mesh node bindings for the current vehicle. A node belongs to at
/// most one slot; a slot may bind zero nodes (the asset does not model that
/// part) or several (symmetric duplicates share one customization).
#[derive(Resource, Debug, Default)]
pub struct SlotBindings {
    bound: HashMap<VehicleSlot, Vec<Entity>>,
    pub generation: u64,
}

impl SlotBindings {
    /// Resolve bindings for a node list via the fixed alias table. Pure and
    /// deterministic: the same node list always yields the same bindings.
    pub fn from_nodes(nodes: &[IndexedMeshNode]) -> Self {
        let mut bound: HashMap<VehicleSlot, Vec<Entity>> = HashMap::new();
        for node in nodes {
            if let Some(slot) = slot_for_mesh_name(&node.name) {
                bound.entry(slot).or_default().push(node.entity);
            }
        }
        Self {
            bound,
            generation: 0,
        }
    }

    pub fn entities(&self, slot: VehicleSlot) -> &[Entity] {
        self.bound.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_bound(&self, slot: VehicleSlot) -> bool {
        !self.entities(slot).is_empty()
    }

    pub fn clear(&mut self) {
        self.bound.clear();
    }
}

/// Walk the spawned vehicle scene once it has mesh children, build the flat
/// node index and the slot bindings, and snapshot every bound node's original
/// appearance before any override can touch it.
pub fn index_vehicle_scene(
    loader: Res<VehicleLoader>,
    mut progress: ResMut<LoadingProgress>,
    mut index: ResMut<VehicleSceneIndex>,
    mut bindings: ResMut<SlotBindings>,
    mut appearance: ResMut<OriginalAppearance>,
    mut overrides: ResMut<MaterialOverrides>,
    roots: Query<(Entity, &VehicleRoot)>,
    children: Query<&Children>,
    meshes: Query<(&Name, &MeshMaterial3d<StandardMaterial>)>,
    materials: Res<Assets<StandardMaterial>>,
) {
    if !progress.vehicle_spawned || progress.vehicle_indexed {
        return;
    }

    let Some((root, _)) = roots
        .iter()
        .find(|(_, marker)| marker.generation == loader.generation())
    else {
        return;
    };

    let mut nodes = Vec::new();
    for entity in children.iter_descendants(root) {
        if let Ok((name, _)) = meshes.get(entity) {
            nodes.push(IndexedMeshNode {
                entity,
                name: name.as_str().to_string(),
            });
        }
    }
    // GLTF scenes spawn their hierarchy a frame or two after the root; wait
    // until mesh nodes exist before indexing. Placeholder vehicles are marked
    // indexable by the loader directly.
    if nodes.is_empty() {
        return;
    }

    let mut resolved = SlotBindings::from_nodes(&nodes);
    resolved.generation = loader.generation();

    appearance.clear();
    overrides.clear();
    for slot in VehicleSlot::ALL {
        for &entity in resolved.entities(slot) {
            if let Ok((_, material_ref)) = meshes.get(entity) {
                let base_colour = materials
                    .get(&material_ref.0)
                    .map(|material| material.base_color)
                    .unwrap_or(Color::WHITE);
                appearance.capture_once(entity, material_ref.0.clone(), base_colour);
            }
        }
        if !resolved.is_bound(slot) {
            warn!(
                "Vehicle asset has no mesh for the {} slot; selections stay price-only",
                slot.label()
            );
        }
    }

    info!(
        "✓ Indexed vehicle scene: {} mesh nodes, {} bound slots",
        nodes.len(),
        VehicleSlot::ALL
            .iter()
            .filter(|slot| resolved.is_bound(**slot))
            .count()
    );

    index.nodes = nodes;
    index.generation = loader.generation();
    *bindings = resolved;
    progress.vehicle_indexed = true;
}
