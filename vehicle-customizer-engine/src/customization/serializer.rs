use bevy::prelude::*;
use constants::slots::{VehicleSlot, slot_for_label};

use crate::customization::pricing::total_price;
use crate::customization::registry::SlotRegistry;
use crate::engine::assets::configuration::{
    BOOKING_STATUS_PENDING, SavedConfiguration, SelectedOptionRecord,
};
use crate::engine::assets::option_catalog::{CustomizationOption, OptionCatalog};
use crate::error::StudioError;

/// How a rehydrated record found its target slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotResolution {
    /// The stored title matched a canonical slot label.
    StoredTitle,
    /// Fallback: the slot was derived from the catalog option type.
    CatalogType,
}

/// Outcome of loading a persisted configuration. Partial failure is the
/// normal case after catalog churn; it is reported, never fatal.
#[derive(Debug, Default, PartialEq)]
pub struct RehydrationReport {
    pub applied: Vec<(VehicleSlot, String)>,
    pub skipped: Vec<SkippedRecord>,
}

#[derive(Debug, PartialEq)]
pub struct SkippedRecord {
    pub option: String,
    pub reason: StudioError,
}

/// Serialize the current selection as the persisted record list: one record
/// per populated slot, in canonical slot order. The title always comes from
/// the canonical label table so external consumers never see a blank label,
/// even when the catalog record itself has no title.
pub fn selected_option_records(
    registry: &SlotRegistry,
    catalog: &OptionCatalog,
) -> Vec<SelectedOptionRecord> {
    registry
        .selected_options(catalog)
        .into_iter()
        .map(|(slot, option)| SelectedOptionRecord {
            option: option.id.clone(),
            title: Some(slot.label().to_string()),
            colour_code: option.colour_code.clone(),
            price: option.price,
        })
        .collect()
}

/// Priority-ordered slot resolution for one persisted record: trust the
/// stored title when it names a canonical slot, otherwise fall back to the
/// catalog option type.
pub fn resolve_target_slot(
    record: &SelectedOptionRecord,
    option: &CustomizationOption,
) -> Option<(VehicleSlot, SlotResolution)> {
    if let Some(slot) = record.title.as_deref().and_then(slot_for_label) {
        return Some((slot, SlotResolution::StoredTitle));
    }
    option.slot().map(|slot| (slot, SlotResolution::CatalogType))
}

/// Rebuild the in-memory selection from a persisted record list. Existing
/// selections are cleared first; each resolvable record is applied through
/// the registry's own validation. Unresolvable records are skipped and
/// reported.
pub fn rehydrate(
    records: &[SelectedOptionRecord],
    catalog: &OptionCatalog,
    registry: &mut SlotRegistry,
) -> RehydrationReport {
    let mut report = RehydrationReport::default();
    registry.clear_all();

    for record in records {
        let Some(option) = catalog.option(&record.option) else {
            warn!(
                "Skipping saved option '{}': no longer in the catalog",
                record.option
            );
            report.skipped.push(SkippedRecord {
                option: record.option.clone(),
                reason: StudioError::UnresolvableOptionReference {
                    option_id: record.option.clone(),
                },
            });
            continue;
        };

        let Some((slot, resolution)) = resolve_target_slot(record, option) else {
            warn!(
                "Skipping saved option '{}': neither title {:?} nor type '{}' maps to a slot",
                record.option, record.title, option.option_type
            );
            report.skipped.push(SkippedRecord {
                option: record.option.clone(),
                reason: StudioError::InvalidSlotAssignment {
                    option_id: option.id.clone(),
                    option_type: option.option_type.clone(),
                    slot: "unmapped".to_string(),
                },
            });
            continue;
        };

        if resolution == SlotResolution::CatalogType {
            warn!(
                "Saved option '{}' carried title {:?}; slot derived from catalog type '{}'",
                record.option, record.title, option.option_type
            );
        }

        match registry.select_option(slot, option) {
            Ok(_) => report.applied.push((slot, option.id.clone())),
            Err(reason) => {
                warn!("Skipping saved option '{}': {}", record.option, reason);
                report.skipped.push(SkippedRecord {
                    option: record.option.clone(),
                    reason,
                });
            }
        }
    }

    report
}

/// Assemble the full record handed to the configuration store / booking flow.
#[allow(clippy::too_many_arguments)]
pub fn build_saved_configuration(
    registry: &SlotRegistry,
    catalog: &OptionCatalog,
    model: &str,
    year: u16,
    image: Option<String>,
    notes: Option<String>,
    customer_id: Option<String>,
) -> SavedConfiguration {
    SavedConfiguration {
        customer_id,
        model: model.to_string(),
        year,
        selected_options: selected_option_records(registry, catalog),
        image,
        notes,
        total_amount: total_price(registry, catalog),
        booking_status: BOOKING_STATUS_PENDING.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customization::registry::test_catalog::catalog;

    #[test]
    fn save_emits_one_ordered_record_per_populated_slot() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();
        registry.select_by_id(&catalog, "rim-alloy").unwrap();
        registry.select_by_id(&catalog, "hood-crimson").unwrap();

        let records = selected_option_records(&registry, &catalog);
        assert_eq!(records.len(), 2);
        // Canonical slot order, not selection order.
        assert_eq!(records[0].option, "hood-crimson");
        assert_eq!(records[0].title.as_deref(), Some("Hood"));
        assert_eq!(records[0].colour_code.as_deref(), Some("#112233"));
        assert_eq!(records[0].price, 500);
        assert_eq!(records[1].option, "rim-alloy");
        assert_eq!(records[1].title.as_deref(), Some("Rim"));
        assert_eq!(records[1].colour_code.as_deref(), Some("#445566"));
        assert_eq!(records[1].price, 300);
    }

    #[test]
    fn save_then_load_is_a_fixed_point() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();
        registry.select_by_id(&catalog, "hood-ivory").unwrap();
        registry.select_by_id(&catalog, "spoiler-gt").unwrap();
        registry.select_by_id(&catalog, "audio-club").unwrap();

        let records = selected_option_records(&registry, &catalog);

        let mut restored = SlotRegistry::default();
        let report = rehydrate(&records, &catalog, &mut restored);
        assert!(report.skipped.is_empty());
        assert_eq!(report.applied.len(), 3);
        for slot in VehicleSlot::ALL {
            assert_eq!(registry.selection(slot), restored.selection(slot));
        }
    }

    #[test]
    fn title_fallback_chain_prefers_stored_title() {
        let catalog = catalog();
        // Title says Spoiler even though nothing is wrong with the type;
        // the stored title wins.
        let record = SelectedOptionRecord {
            option: "spoiler-gt".into(),
            title: Some("Spoiler".into()),
            colour_code: None,
            price: 1200,
        };
        let option = catalog.option("spoiler-gt").unwrap();
        assert_eq!(
            resolve_target_slot(&record, option),
            Some((VehicleSlot::Spoiler, SlotResolution::StoredTitle))
        );

        // Unknown title falls back to the catalog type.
        let record = SelectedOptionRecord {
            option: "spoiler-gt".into(),
            title: Some("Big Wing".into()),
            colour_code: None,
            price: 1200,
        };
        assert_eq!(
            resolve_target_slot(&record, option),
            Some((VehicleSlot::Spoiler, SlotResolution::CatalogType))
        );

        // Missing title also falls back.
        let record = SelectedOptionRecord {
            option: "spoiler-gt".into(),
            title: None,
            colour_code: None,
            price: 1200,
        };
        assert_eq!(
            resolve_target_slot(&record, option),
            Some((VehicleSlot::Spoiler, SlotResolution::CatalogType))
        );
    }

    #[test]
    fn dangling_record_is_skipped_and_the_rest_load() {
        let catalog = catalog();
        let records = vec![
            SelectedOptionRecord {
                option: "X".into(), // deleted from the catalog
                title: Some("Hood".into()),
                colour_code: None,
                price: 500,
            },
            SelectedOptionRecord {
                option: "rim-alloy".into(),
                title: Some("Rim".into()),
                colour_code: Some("#445566".into()),
                price: 300,
            },
        ];

        let mut registry = SlotRegistry::default();
        let report = rehydrate(&records, &catalog, &mut registry);

        assert_eq!(report.applied, vec![(VehicleSlot::Rim, "rim-alloy".to_string())]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].option, "X");
        assert!(matches!(
            report.skipped[0].reason,
            StudioError::UnresolvableOptionReference { .. }
        ));
        assert_eq!(registry.selection(VehicleSlot::Rim), Some("rim-alloy"));
        assert_eq!(registry.selection(VehicleSlot::Hood), None);
        assert_eq!(total_price(&registry, &catalog), 300);
    }

    #[test]
    fn rehydrate_replaces_existing_selections() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();
        registry.select_by_id(&catalog, "hood-crimson").unwrap();

        let records = vec![SelectedOptionRecord {
            option: "rim-alloy".into(),
            title: Some("Rim".into()),
            colour_code: None,
            price: 300,
        }];
        rehydrate(&records, &catalog, &mut registry);

        assert_eq!(registry.selection(VehicleSlot::Hood), None);
        assert_eq!(registry.selection(VehicleSlot::Rim), Some("rim-alloy"));
    }

    #[test]
    fn saved_configuration_snapshot_carries_selections_and_total() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();
        registry.select_by_id(&catalog, "hood-crimson").unwrap();
        registry.select_by_id(&catalog, "rim-alloy").unwrap();

        let config = build_saved_configuration(
            &registry,
            &catalog,
            "Thar",
            2023,
            Some("data:image/jpeg;base64,AAAA".into()),
            Some("track day build".into()),
            Some("cust-1".into()),
        );

        assert_eq!(config.total_amount, 800);
        assert_eq!(config.selected_options.len(), 2);
        assert_eq!(config.booking_status, BOOKING_STATUS_PENDING);
        assert_eq!(config.model, "Thar");
        assert!(config.image.as_deref().unwrap().starts_with("data:image/jpeg"));
    }
}
