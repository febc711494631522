use std::collections::HashMap;

use bevy::prelude::*;
use constants::slots::VehicleSlot;

use crate::customization::registry::SlotRegistry;
use crate::engine::assets::option_catalog::{CustomizationOption, OptionCatalog};
use crate::engine::scene::scene_index::SlotBindings;

/// Snapshot of a mesh node's appearance at index time, taken before any
/// override is applied. First write wins; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AppearanceSnapshot {
    pub material: Handle<StandardMaterial>,
    pub base_colour: Color,
}

#[derive(Resource, Debug, Default)]
pub struct OriginalAppearance {
    snapshots: HashMap<Entity, AppearanceSnapshot>,
}

impl OriginalAppearance {
    pub fn capture_once(&mut self, entity: Entity, material: Handle<StandardMaterial>, base_colour: Color) {
        self.snapshots.entry(entity).or_insert(AppearanceSnapshot {
            material,
            base_colour,
        });
    }

    pub fn get(&self, entity: Entity) -> Option<&AppearanceSnapshot> {
        self.snapshots.get(&entity)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

/// Private material clones, one per overridden mesh node. A clone is created
/// the first time a node needs an override and reused afterwards; shared
/// source materials are never mutated.
#[derive(Resource, Debug, Default)]
pub struct MaterialOverrides {
    clones: HashMap<Entity, Handle<StandardMaterial>>,
}

impl MaterialOverrides {
    pub fn clear(&mut self) {
        self.clones.clear();
    }
}

/// Desired base colour for a slot given its current selection. Pure; the
/// impure GPU-resource application lives in `sync_slot_materials`.
pub fn desired_slot_colour(selection: Option<&CustomizationOption>) -> Option<Color> {
    selection.and_then(CustomizationOption::colour)
}

/// Make every bound mesh node reflect the selection state as of the start of
/// this frame. Scheduled before all selection mutators, so a mid-frame change
/// becomes visible next frame, never partially within one.
pub fn sync_slot_materials(
    registry: Res<SlotRegistry>,
    catalog: Option<Res<OptionCatalog>>,
    bindings: Res<SlotBindings>,
    appearance: Res<OriginalAppearance>,
    mut overrides: ResMut<MaterialOverrides>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut targets: Query<&mut MeshMaterial3d<StandardMaterial>>,
) {
    let Some(catalog) = catalog else {
        return;
    };

    for slot in VehicleSlot::ALL {
        let selection = registry
            .selection(slot)
            .and_then(|id| catalog.option(id));
        let desired = desired_slot_colour(selection);

        for &entity in bindings.entities(slot) {
            let Some(snapshot) = appearance.get(entity) else {
                continue;
            };
            let Ok(mut target) = targets.get_mut(entity) else {
                continue;
            };

            match desired {
                Some(colour) => {
                    let clone = overrides
                        .clones
                        .entry(entity)
                        .or_insert_with(|| {
                            let source = materials
                                .get(&snapshot.material)
                                .cloned()
                                .unwrap_or_default();
                            materials.add(source)
                        })
                        .clone();

                    // Write through get_mut only on an actual change so the
                    // renderer does not re-upload an unchanged material.
                    let needs_write = materials
                        .get(&clone)
                        .is_some_and(|material| material.base_color != colour);
                    if needs_write {
                        if let Some(material) = materials.get_mut(&clone) {
                            material.base_color = colour;
                        }
                    }
                    if target.0 != clone {
                        target.0 = clone;
                    }
                }
                None => {
                    if target.0 != snapshot.material {
                        target.0 = snapshot.material.clone();
                    }
                    // The snapshot handle is never mutated by the override
                    // path, but reassert the captured colour in case another
                    // consumer drifted it.
                    let drifted = materials
                        .get(&snapshot.material)
                        .is_some_and(|material| material.base_color != snapshot.base_colour);
                    if drifted {
                        if let Some(material) = materials.get_mut(&snapshot.material) {
                            material.base_color = snapshot.base_colour;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customization::registry::test_catalog::option;

    #[test]
    fn desired_colour_follows_the_selection() {
        assert_eq!(desired_slot_colour(None), None);

        let coloured = option("hood-crimson", "exterior-hood", 500, Some("#112233"));
        assert_eq!(
            desired_slot_colour(Some(&coloured)),
            Some(Color::srgb_u8(0x11, 0x22, 0x33))
        );

        // Audio-only options carry no colour and never touch material state.
        let audio = option("audio-club", "interior-sound-system", 900, None);
        assert_eq!(desired_slot_colour(Some(&audio)), None);

        // A malformed code is rejected, not coerced.
        let malformed = option("hood-bad", "exterior-hood", 100, Some("red"));
        assert_eq!(desired_slot_colour(Some(&malformed)), None);
    }

    #[test]
    fn appearance_capture_is_first_write_wins() {
        let mut world = World::new();
        let entity = world.spawn_empty().id();
        let mut appearance = OriginalAppearance::default();

        let first = Handle::<StandardMaterial>::default();
        appearance.capture_once(entity, first.clone(), Color::WHITE);
        appearance.capture_once(entity, first.clone(), Color::BLACK);

        assert_eq!(appearance.get(entity).unwrap().base_colour, Color::WHITE);
    }

    #[test]
    fn select_then_deselect_restores_the_original_colour() {
        // Drive the full sync system against a bare world: apply an override,
        // clear the selection, and check the node points back at its original
        // material with the captured colour intact.
        use crate::engine::scene::scene_index::{IndexedMeshNode, SlotBindings};

        let mut world = World::new();
        world.init_resource::<Assets<StandardMaterial>>();

        let original_colour = Color::srgb_u8(0xAB, 0xCD, 0xEF);
        let original = world
            .resource_mut::<Assets<StandardMaterial>>()
            .add(StandardMaterial {
                base_color: original_colour,
                ..Default::default()
            });
        let node = world
            .spawn(MeshMaterial3d::<StandardMaterial>(original.clone()))
            .id();

        let catalog = OptionCatalog {
            options: vec![option("hood-crimson", "exterior-hood", 500, Some("#112233"))],
        };
        let mut registry = SlotRegistry::default();
        registry.select_by_id(&catalog, "hood-crimson").unwrap();

        let bindings = SlotBindings::from_nodes(&[IndexedMeshNode {
            entity: node,
            name: "Hood".to_string(),
        }]);
        let mut appearance = OriginalAppearance::default();
        appearance.capture_once(node, original.clone(), original_colour);

        world.insert_resource(registry);
        world.insert_resource(catalog);
        world.insert_resource(bindings);
        world.insert_resource(appearance);
        world.init_resource::<MaterialOverrides>();

        let mut schedule = Schedule::default();
        schedule.add_systems(sync_slot_materials);

        // Selection applied: the node must render a private clone, and the
        // original material must stay untouched.
        schedule.run(&mut world);
        let override_handle = world
            .get::<MeshMaterial3d<StandardMaterial>>(node)
            .unwrap()
            .0
            .clone();
        assert_ne!(override_handle, original);
        {
            let materials = world.resource::<Assets<StandardMaterial>>();
            assert_eq!(
                materials.get(&override_handle).unwrap().base_color,
                Color::srgb_u8(0x11, 0x22, 0x33)
            );
            assert_eq!(materials.get(&original).unwrap().base_color, original_colour);
        }

        // Re-running with the same selection keeps the same clone (clone-once).
        schedule.run(&mut world);
        assert_eq!(
            world
                .get::<MeshMaterial3d<StandardMaterial>>(node)
                .unwrap()
                .0,
            override_handle
        );

        // Deselect: the node must point back at the original appearance.
        world
            .resource_mut::<SlotRegistry>()
            .clear_all();
        schedule.run(&mut world);
        assert_eq!(
            world
                .get::<MeshMaterial3d<StandardMaterial>>(node)
                .unwrap()
                .0,
            original
        );
        assert_eq!(
            world
                .resource::<Assets<StandardMaterial>>()
                .get(&original)
                .unwrap()
                .base_color,
            original_colour
        );
    }

    #[test]
    fn unbound_slot_selection_is_a_visual_no_op() {
        use crate::engine::scene::scene_index::SlotBindings;

        let mut world = World::new();
        world.init_resource::<Assets<StandardMaterial>>();

        let catalog = OptionCatalog {
            options: vec![option("spoiler-gt", "exterior-spoiler", 1200, Some("#0A0A0A"))],
        };
        let mut registry = SlotRegistry::default();
        registry.select_by_id(&catalog, "spoiler-gt").unwrap();

        world.insert_resource(registry);
        world.insert_resource(catalog);
        world.insert_resource(SlotBindings::default()); // no Spoiler mesh in the asset
        world.init_resource::<OriginalAppearance>();
        world.init_resource::<MaterialOverrides>();

        let mut schedule = Schedule::default();
        schedule.add_systems(sync_slot_materials);
        schedule.run(&mut world);

        // Selection survives, nothing was cloned, no error raised.
        assert_eq!(
            world
                .resource::<SlotRegistry>()
                .selection(VehicleSlot::Spoiler),
            Some("spoiler-gt")
        );
        assert!(world.resource::<Assets<StandardMaterial>>().is_empty());
    }
}
