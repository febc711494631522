use crate::customization::registry::SlotRegistry;
use crate::engine::assets::option_catalog::OptionCatalog;

/// Total cost of the current selection. Pure over the registry + catalog:
/// recomputed on demand, never cached outside a finalized configuration
/// snapshot.
pub fn total_price(registry: &SlotRegistry, catalog: &OptionCatalog) -> u32 {
    registry
        .selected_options(catalog)
        .iter()
        .map(|(_, option)| option.price)
        .sum()
}
