use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::DEFAULT_ORBIT_RADIUS;

// Crate engine modules
use crate::engine::assets::option_catalog::OptionCatalog;
use crate::engine::assets::vehicle_manifest::VehicleManifest;
use crate::engine::camera::turntable_camera::{
    TurntableCamera, apply_turntable, turntable_input,
};
use crate::engine::capture::frame_capture::FrameCapturePlugin;
use crate::engine::core::app_state::{AppState, FrameSet, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::catalog_loader::{CatalogLoader, poll_catalog_load, start_catalog_load};
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::vehicle_loader::{
    VehicleLoader, VehicleRequest, advance_vehicle_load, process_vehicle_requests,
};
use crate::engine::scene::materials::{MaterialOverrides, OriginalAppearance, sync_slot_materials};
use crate::engine::scene::scene_index::{SlotBindings, VehicleSceneIndex, index_vehicle_scene};

// Crate tools and RPC modules
use crate::customization::registry::SlotRegistry;
use crate::rpc::studio_rpc::StudioRpcPlugin;
use crate::tools::option_panel::OptionPanelPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers the catalog and vehicle manifests as loadable JSON assets.
        // Distinct extensions keep the two loaders from claiming each other's
        // files.
        .add_plugins(JsonAssetPlugin::<OptionCatalog>::new(&["catalog.json"]))
        .add_plugins(JsonAssetPlugin::<VehicleManifest>::new(&["vehicle.json"]))
        .add_plugins(FrameCapturePlugin)
        .add_plugins(StudioRpcPlugin)
        .add_plugins(OptionPanelPlugin);

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<CatalogLoader>()
        .init_resource::<VehicleLoader>()
        .init_resource::<SlotRegistry>()
        .init_resource::<VehicleSceneIndex>()
        .init_resource::<SlotBindings>()
        .init_resource::<OriginalAppearance>()
        .init_resource::<MaterialOverrides>()
        .init_resource::<TurntableCamera>()
        .add_event::<VehicleRequest>();

    // Rendering reflects start-of-frame selection state; every mutation path
    // runs afterwards.
    app.configure_sets(
        Update,
        (FrameSet::ApplyMaterials, FrameSet::Mutate).chain(),
    );

    app.add_systems(Startup, (setup, start_catalog_load).chain())
        .add_systems(
            Update,
            (poll_catalog_load, transition_to_running)
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        // Vehicle loading runs in every state: a load requested during
        // Loading keeps advancing across the transition.
        .add_systems(
            Update,
            (
                process_vehicle_requests,
                advance_vehicle_load,
                index_vehicle_scene,
            )
                .chain()
                .in_set(FrameSet::Mutate),
        )
        .add_systems(
            Update,
            sync_slot_materials
                .in_set(FrameSet::ApplyMaterials)
                .run_if(in_state(AppState::Running)),
        )
        .add_systems(
            Update,
            (turntable_input, apply_turntable)
                .chain()
                .run_if(in_state(AppState::Running)),
        );

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 9_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
    // Soft fill so unlit panels of the body never read as pure black.
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 220.0,
        ..default()
    });
}

fn spawn_turntable_camera(commands: &mut Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 2.2, DEFAULT_ORBIT_RADIUS)
            .looking_at(Vec3::new(0.0, 0.8, 0.0), Vec3::Y),
    ));
}

// Startup system that only handles basic scene initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    spawn_turntable_camera(&mut commands);
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
