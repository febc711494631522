/// Option catalog location inside the asset root. Loaded once per session.
pub const RELATIVE_CATALOG_PATH: &str = "catalog/options.catalog.json";

/// Directory holding per-vehicle manifests and their GLTF scenes.
pub const RELATIVE_VEHICLE_DIR: &str = "vehicles";

/// Build the manifest path for a model + year identity,
/// e.g. ("Thar", 2023) -> "vehicles/thar_2023.vehicle.json".
pub fn vehicle_manifest_path(model: &str, year: u16) -> String {
    format!("{}/{}_{}.vehicle.json", RELATIVE_VEHICLE_DIR, slug(model), year)
}

/// Lower-case a model name and collapse whitespace to hyphens so it is safe
/// as a file name segment.
fn slug(model: &str) -> String {
    model
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_path_is_slugged() {
        assert_eq!(
            vehicle_manifest_path("Thar", 2023),
            "vehicles/thar_2023.vehicle.json"
        );
        assert_eq!(
            vehicle_manifest_path("  Grand Vitara ", 2024),
            "vehicles/grand-vitara_2024.vehicle.json"
        );
    }
}
