pub mod materials;
pub mod scene_index;
