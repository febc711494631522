pub mod catalog_loader;
pub mod progress;
pub mod vehicle_loader;
