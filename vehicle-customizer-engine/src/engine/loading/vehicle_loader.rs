use bevy::asset::LoadState;
use bevy::gltf::GltfAssetLabel;
use bevy::prelude::*;
use constants::path::vehicle_manifest_path;

use crate::engine::assets::vehicle_manifest::VehicleManifest;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::scene::materials::{MaterialOverrides, OriginalAppearance};
use crate::engine::scene::scene_index::SlotBindings;
use crate::error::StudioError;

/// Request to load a vehicle by model + year identity. Fired by the RPC
/// surface; a new request supersedes any load still in flight.
#[derive(Event, Debug, Clone)]
pub struct VehicleRequest {
    pub model: String,
    pub year: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VehicleIdentity {
    pub model: String,
    pub year: u16,
}

/// Marker on the root entity of a spawned vehicle (real or placeholder).
/// The generation ties the hierarchy to the request that produced it.
#[derive(Component)]
pub struct VehicleRoot {
    pub generation: u64,
}

/// Marker for the fallback primitive spawned when an asset fails to load.
#[derive(Component)]
pub struct PlaceholderVehicle;

/// Generation-counted vehicle load state. Results arriving for a superseded
/// generation are discarded, never applied.
#[derive(Resource, Default)]
pub struct VehicleLoader {
    generation: u64,
    identity: Option<VehicleIdentity>,
    manifest_handle: Option<Handle<VehicleManifest>>,
    scene_handle: Option<Handle<Scene>>,
    scene_path: String,
}

impl VehicleLoader {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn identity(&self) -> Option<&VehicleIdentity> {
        self.identity.as_ref()
    }
}

/// Accept vehicle requests. A request without a model identity is the one
/// blocking condition of the engine: nothing loads until it is corrected.
pub fn process_vehicle_requests(
    mut requests: EventReader<VehicleRequest>,
    mut loader: ResMut<VehicleLoader>,
    asset_server: Res<AssetServer>,
    mut progress: ResMut<LoadingProgress>,
) {
    for request in requests.read() {
        if request.model.trim().is_empty() || request.year == 0 {
            warn!(
                "Vehicle request missing model/year identity ({:?}/{}); waiting for a valid one",
                request.model, request.year
            );
            continue;
        }

        let in_flight = loader.manifest_handle.is_some() && !progress.vehicle_spawned;
        if in_flight {
            info!(
                "Superseding in-flight vehicle load (generation {}); its result will be discarded",
                loader.generation
            );
        }

        loader.generation += 1;
        loader.identity = Some(VehicleIdentity {
            model: request.model.clone(),
            year: request.year,
        });
        let path = vehicle_manifest_path(&request.model, request.year);
        info!(
            "Loading vehicle manifest for {} {} from: {}",
            request.model, request.year, path
        );
        loader.manifest_handle = Some(asset_server.load(path));
        loader.scene_handle = None;
        loader.scene_path.clear();

        progress.vehicle_requested = true;
        progress.vehicle_spawned = false;
        progress.vehicle_indexed = false;
    }
}

/// Step the manifest load forward: once the descriptor arrives, start the
/// GLTF scene load it references. Manifest fetch failure degrades to the
/// placeholder vehicle.
pub fn advance_vehicle_load(
    mut loader: ResMut<VehicleLoader>,
    manifests: Res<Assets<VehicleManifest>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
    mut progress: ResMut<LoadingProgress>,
    roots: Query<(Entity, &VehicleRoot)>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut bindings: ResMut<SlotBindings>,
    mut appearance: ResMut<OriginalAppearance>,
    mut overrides: ResMut<MaterialOverrides>,
) {
    if progress.vehicle_spawned || !progress.vehicle_requested {
        return;
    }
    let Some(manifest_handle) = loader.manifest_handle.clone() else {
        return;
    };

    if loader.scene_handle.is_none() {
        if let Some(manifest) = manifests.get(&manifest_handle) {
            info!("✓ Vehicle manifest loaded: {}", manifest.display_name());
            loader.scene_path = manifest.scene.clone();
            loader.scene_handle = Some(
                asset_server.load(GltfAssetLabel::Scene(0).from_asset(manifest.scene.clone())),
            );
            commands.insert_resource(manifest.clone());
        } else if matches!(asset_server.load_state(&manifest_handle), LoadState::Failed(_)) {
            let error = StudioError::AssetLoadFailure {
                path: vehicle_manifest_path(
                    loader.identity.as_ref().map(|id| id.model.as_str()).unwrap_or(""),
                    loader.identity.as_ref().map(|id| id.year).unwrap_or(0),
                ),
                reason: "manifest unreachable".to_string(),
            };
            error!("{error}");
            let generation = loader.generation;
            spawn_placeholder_vehicle(
                &mut commands,
                &roots,
                &mut meshes,
                &mut materials,
                generation,
            );
            reset_scene_state(&mut bindings, &mut appearance, &mut overrides);
            progress.vehicle_spawned = true;
            progress.vehicle_indexed = true; // nothing bindable on a placeholder
        }
        return;
    }

    // Scene handle exists: poll the GLTF load.
    let Some(scene_handle) = loader.scene_handle.clone() else {
        return;
    };
    match asset_server.load_state(&scene_handle) {
        LoadState::Loaded => {
            let generation = loader.generation;
            despawn_stale_roots(&mut commands, &roots, generation);
            commands.spawn((
                SceneRoot(scene_handle),
                Transform::IDENTITY,
                VehicleRoot { generation },
            ));
            reset_scene_state(&mut bindings, &mut appearance, &mut overrides);
            progress.vehicle_spawned = true;
            info!("✓ Vehicle scene spawned (generation {generation})");
        }
        LoadState::Failed(_) => {
            let error = StudioError::AssetLoadFailure {
                path: loader.scene_path.clone(),
                reason: "scene asset invalid or unreachable".to_string(),
            };
            error!("{error}");
            let generation = loader.generation;
            spawn_placeholder_vehicle(
                &mut commands,
                &roots,
                &mut meshes,
                &mut materials,
                generation,
            );
            reset_scene_state(&mut bindings, &mut appearance, &mut overrides);
            progress.vehicle_spawned = true;
            progress.vehicle_indexed = true;
        }
        _ => {}
    }
}

fn despawn_stale_roots(
    commands: &mut Commands,
    roots: &Query<(Entity, &VehicleRoot)>,
    current_generation: u64,
) {
    for (entity, root) in roots.iter() {
        if root.generation != current_generation {
            commands.entity(entity).despawn();
        }
    }
}

fn reset_scene_state(
    bindings: &mut SlotBindings,
    appearance: &mut OriginalAppearance,
    overrides: &mut MaterialOverrides,
) {
    bindings.clear();
    appearance.clear();
    overrides.clear();
}

/// Fallback primitive shown when the vehicle asset cannot be loaded. Keeps
/// the turntable alive and the session recoverable; no slot ever binds to it.
fn spawn_placeholder_vehicle(
    commands: &mut Commands,
    roots: &Query<(Entity, &VehicleRoot)>,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    generation: u64,
) {
    despawn_stale_roots(commands, roots, generation);
    warn!("Rendering placeholder vehicle (generation {generation})");
    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(3.6, 1.4, 1.8))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.36, 0.40),
            ..Default::default()
        })),
        Transform::from_xyz(0.0, 0.7, 0.0),
        VehicleRoot { generation },
        PlaceholderVehicle,
    ));
}
