pub mod configuration;
pub mod option_catalog;
pub mod vehicle_manifest;
