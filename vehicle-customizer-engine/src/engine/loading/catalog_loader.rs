use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::path::RELATIVE_CATALOG_PATH;

use crate::engine::assets::option_catalog::{OptionCatalog, parse_colour_code};
use crate::engine::loading::progress::LoadingProgress;

#[derive(Resource, Default)]
pub struct CatalogLoader {
    handle: Option<Handle<OptionCatalog>>,
}

/// Kick off the one-per-session catalog fetch.
pub fn start_catalog_load(
    mut loader: ResMut<CatalogLoader>,
    asset_server: Res<AssetServer>,
    mut progress: ResMut<LoadingProgress>,
) {
    println!("Loading option catalog from: {}", RELATIVE_CATALOG_PATH);
    loader.handle = Some(asset_server.load(RELATIVE_CATALOG_PATH));
    progress.catalog_requested = true;
}

/// Promote the catalog to a read-only resource once the JSON arrives. The
/// render loop keeps running while this polls; a fetch failure degrades to an
/// empty catalog so the app stays interactive.
pub fn poll_catalog_load(
    loader: Res<CatalogLoader>,
    catalogs: Res<Assets<OptionCatalog>>,
    asset_server: Res<AssetServer>,
    mut commands: Commands,
    mut progress: ResMut<LoadingProgress>,
) {
    if progress.catalog_ready {
        return;
    }
    let Some(handle) = &loader.handle else {
        return;
    };

    if let Some(catalog) = catalogs.get(handle) {
        for option in &catalog.options {
            if let Some(code) = option.colour_code.as_deref() {
                if parse_colour_code(code).is_none() {
                    warn!(
                        "Catalog option '{}' carries malformed colour code {:?}; treating as colourless",
                        option.id, code
                    );
                }
            }
            if option.slot().is_none() {
                warn!(
                    "Catalog option '{}' has unmapped type '{}'; it will not be selectable",
                    option.id, option.option_type
                );
            }
        }
        info!("✓ Option catalog loaded ({} options)", catalog.len());
        commands.insert_resource(catalog.clone());
        progress.catalog_ready = true;
    } else if matches!(asset_server.load_state(handle), LoadState::Failed(_)) {
        error!("Option catalog failed to load; continuing with an empty catalog");
        commands.insert_resource(OptionCatalog::default());
        progress.catalog_ready = true;
    }
}
