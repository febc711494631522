use std::collections::HashMap;

use bevy::prelude::*;
use constants::slots::VehicleSlot;

use crate::engine::assets::option_catalog::{CustomizationOption, OptionCatalog};
use crate::error::StudioError;

/// Outcome of a selection mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Selected,
    Cleared,
}

/// The single source of truth for current selections, one per active
/// customization session. Price aggregation, material sync, and serialization
/// all read from here; nothing writes selections anywhere else.
#[derive(Resource, Debug, Clone, Default)]
pub struct SlotRegistry {
    selections: HashMap<VehicleSlot, String>,
    revision: u64,
}

impl SlotRegistry {
    /// Toggle-select an option into its slot. Re-selecting the current option
    /// clears the slot; a type/slot mismatch is rejected, never coerced.
    pub fn select_option(
        &mut self,
        slot: VehicleSlot,
        option: &CustomizationOption,
    ) -> Result<SelectionChange, StudioError> {
        if option.slot() != Some(slot) {
            return Err(StudioError::InvalidSlotAssignment {
                option_id: option.id.clone(),
                option_type: option.option_type.clone(),
                slot: slot.label().to_string(),
            });
        }

        self.revision += 1;
        if self.selections.get(&slot).is_some_and(|id| *id == option.id) {
            self.selections.remove(&slot);
            info!("Cleared {} selection ({})", slot.label(), option.id);
            Ok(SelectionChange::Cleared)
        } else {
            self.selections.insert(slot, option.id.clone());
            info!("Selected {} for {}", option.id, slot.label());
            Ok(SelectionChange::Selected)
        }
    }

    /// Look an option up by id and toggle it into the slot its catalog type
    /// maps to. This is the path UI buttons and RPC calls use.
    pub fn select_by_id(
        &mut self,
        catalog: &OptionCatalog,
        option_id: &str,
    ) -> Result<(VehicleSlot, SelectionChange), StudioError> {
        let option = catalog
            .option(option_id)
            .ok_or_else(|| StudioError::UnresolvableOptionReference {
                option_id: option_id.to_string(),
            })?;
        let slot = option
            .slot()
            .ok_or_else(|| StudioError::InvalidSlotAssignment {
                option_id: option.id.clone(),
                option_type: option.option_type.clone(),
                slot: "unmapped".to_string(),
            })?;
        let change = self.select_option(slot, option)?;
        Ok((slot, change))
    }

    pub fn selection(&self, slot: VehicleSlot) -> Option<&str> {
        self.selections.get(&slot).map(String::as_str)
    }

    pub fn clear_all(&mut self) {
        if !self.selections.is_empty() {
            self.selections.clear();
            self.revision += 1;
            info!("Cleared all selections");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Currently selected options resolved against the catalog, in canonical
    /// slot order. Selections whose option vanished from the catalog are
    /// skipped here and reported at serialization time.
    pub fn selected_options<'a>(
        &self,
        catalog: &'a OptionCatalog,
    ) -> Vec<(VehicleSlot, &'a CustomizationOption)> {
        VehicleSlot::ALL
            .into_iter()
            .filter_map(|slot| {
                let id = self.selections.get(&slot)?;
                catalog.option(id).map(|option| (slot, option))
            })
            .collect()
    }

    /// Monotonic change counter. UI and RPC observers poll this instead of
    /// receiving callbacks.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
pub(crate) mod test_catalog {
    use super::*;

    pub fn option(id: &str, option_type: &str, price: u32, colour: Option<&str>) -> CustomizationOption {
        CustomizationOption {
            id: id.to_string(),
            option_type: option_type.to_string(),
            title: Some(format!("{id} title")),
            price,
            colour_code: colour.map(str::to_string),
            preview_image: None,
            asset: None,
        }
    }

    pub fn catalog() -> OptionCatalog {
        OptionCatalog {
            options: vec![
                option("hood-crimson", "exterior-hood", 500, Some("#112233")),
                option("hood-ivory", "exterior-hood", 650, Some("#F5F5F0")),
                option("rim-alloy", "exterior-rim", 300, Some("#445566")),
                option("spoiler-gt", "exterior-spoiler", 1200, Some("#0A0A0A")),
                option("audio-club", "interior-sound-system", 900, None),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_catalog::{catalog, option};
    use super::*;

    #[test]
    fn selecting_twice_toggles_back_to_none() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();

        let (slot, change) = registry.select_by_id(&catalog, "hood-crimson").unwrap();
        assert_eq!(slot, VehicleSlot::Hood);
        assert_eq!(change, SelectionChange::Selected);
        assert_eq!(registry.selection(VehicleSlot::Hood), Some("hood-crimson"));

        let (_, change) = registry.select_by_id(&catalog, "hood-crimson").unwrap();
        assert_eq!(change, SelectionChange::Cleared);
        assert_eq!(registry.selection(VehicleSlot::Hood), None);
    }

    #[test]
    fn selecting_a_different_option_replaces_the_current_one() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();

        registry.select_by_id(&catalog, "hood-crimson").unwrap();
        registry.select_by_id(&catalog, "hood-ivory").unwrap();
        assert_eq!(registry.selection(VehicleSlot::Hood), Some("hood-ivory"));
    }

    #[test]
    fn cross_slot_assignment_is_rejected() {
        let rim_option = option("rim-alloy", "exterior-rim", 300, None);
        let mut registry = SlotRegistry::default();

        let err = registry
            .select_option(VehicleSlot::Hood, &rim_option)
            .unwrap_err();
        assert!(matches!(err, StudioError::InvalidSlotAssignment { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn unknown_option_id_is_unresolvable() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();

        let err = registry.select_by_id(&catalog, "deleted-option").unwrap_err();
        assert_eq!(
            err,
            StudioError::UnresolvableOptionReference {
                option_id: "deleted-option".to_string()
            }
        );
    }

    #[test]
    fn unmapped_option_type_is_rejected() {
        let mut catalog = catalog();
        catalog
            .options
            .push(option("mystery", "exterior-sunroof", 100, None));
        let mut registry = SlotRegistry::default();

        let err = registry.select_by_id(&catalog, "mystery").unwrap_err();
        assert!(matches!(err, StudioError::InvalidSlotAssignment { .. }));
    }

    #[test]
    fn selected_options_follow_canonical_slot_order() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();

        // Select in reverse of canonical order.
        registry.select_by_id(&catalog, "audio-club").unwrap();
        registry.select_by_id(&catalog, "rim-alloy").unwrap();
        registry.select_by_id(&catalog, "hood-crimson").unwrap();

        let slots: Vec<VehicleSlot> = registry
            .selected_options(&catalog)
            .into_iter()
            .map(|(slot, _)| slot)
            .collect();
        assert_eq!(
            slots,
            vec![
                VehicleSlot::Hood,
                VehicleSlot::Rim,
                VehicleSlot::SoundSystem
            ]
        );
    }

    #[test]
    fn clear_all_empties_and_bumps_revision() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();

        registry.select_by_id(&catalog, "hood-crimson").unwrap();
        let before = registry.revision();
        registry.clear_all();
        assert!(registry.is_empty());
        assert!(registry.revision() > before);

        // Clearing an empty registry is a no-op and keeps the revision.
        let rev = registry.revision();
        registry.clear_all();
        assert_eq!(registry.revision(), rev);
    }
}
