use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Descriptor for one loadable vehicle, fetched by model + year identity.
/// Mirrors the backend record exactly; package/sticker metadata is carried
/// through opaquely for the booking flow.
#[derive(Asset, TypePath, Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleManifest {
    pub model: String,
    pub year: u16,
    /// GLTF scene path relative to the asset root.
    pub scene: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl VehicleManifest {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.model, self.year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_parses_with_and_without_metadata() {
        let json = r#"{"model": "Thar", "year": 2023, "scene": "vehicles/thar_2023.glb"}"#;
        let manifest: VehicleManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.display_name(), "Thar 2023");
        assert!(manifest.metadata.is_none());

        let json = r#"{"model": "Thar", "year": 2023, "scene": "vehicles/thar_2023.glb",
                       "metadata": {"packages": ["offroad"]}}"#;
        let manifest: VehicleManifest = serde_json::from_str(json).unwrap();
        assert!(manifest.metadata.is_some());
    }
}
