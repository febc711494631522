pub mod path;
pub mod render_settings;
pub mod slots;
