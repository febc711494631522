use bevy::prelude::*;

#[derive(Resource, Default)]
pub struct LoadingProgress {
    pub catalog_requested: bool,
    pub catalog_ready: bool,
    pub vehicle_requested: bool,
    pub vehicle_spawned: bool,
    pub vehicle_indexed: bool,
}
