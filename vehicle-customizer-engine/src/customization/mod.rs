pub mod pricing;
pub mod registry;
pub mod serializer;
