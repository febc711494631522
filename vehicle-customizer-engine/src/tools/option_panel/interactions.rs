use bevy::prelude::*;
use constants::slots::VehicleSlot;

use super::state::*;
use crate::customization::registry::SlotRegistry;
use crate::engine::assets::option_catalog::OptionCatalog;
use crate::engine::capture::frame_capture::CaptureRequest;

// Chevron icon toggles collapse state
pub fn collapse_button_interaction(
    mut q: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>, With<CollapseButton>)>,
    mut state: ResMut<OptionPanelUiState>,
) {
    for (interaction, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => { state.collapsed = !state.collapsed; *bg = BackgroundColor(Color::srgb(0.18, 0.20, 0.24)); }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgb(0.26, 0.28, 0.32)),
            Interaction::None    => *bg = BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
        }
    }
}

// Clear All button empties the selection registry
pub fn clear_all_button_interaction(
    mut q: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>, With<ClearAllButton>)>,
    mut registry: ResMut<SlotRegistry>,
) {
    for (interaction, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                registry.clear_all();
                *bg = BackgroundColor(Color::srgb(0.20, 0.12, 0.12));
            }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgb(0.34, 0.14, 0.14)),
            Interaction::None    => *bg = BackgroundColor(Color::srgb(0.28, 0.10, 0.10)),
        }
    }
}

// Capture button queues a frame capture
pub fn capture_button_interaction(
    mut q: Query<(&Interaction, &mut BackgroundColor), (Changed<Interaction>, With<Button>, With<CaptureButton>)>,
    mut captures: EventWriter<CaptureRequest>,
) {
    for (interaction, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                captures.write(CaptureRequest);
                *bg = BackgroundColor(Color::srgb(0.18, 0.20, 0.24));
            }
            Interaction::Hovered => *bg = BackgroundColor(Color::srgb(0.26, 0.28, 0.32)),
            Interaction::None    => *bg = BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
        }
    }
}

/// Keyboard driving for the panel: Tab cycles the highlighted slot, digits
/// 1-9 toggle the nth catalog option for that slot, C clears everything and
/// P queues a preview capture.
pub fn keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut state: ResMut<OptionPanelUiState>,
    mut registry: ResMut<SlotRegistry>,
    catalog: Option<Res<OptionCatalog>>,
    mut captures: EventWriter<CaptureRequest>,
) {
    if keyboard.just_pressed(KeyCode::Tab) {
        state.cycle_highlight();
        info!("Highlighted slot: {}", state.highlighted_slot().label());
    }
    if keyboard.just_pressed(KeyCode::KeyC) {
        registry.clear_all();
    }
    if keyboard.just_pressed(KeyCode::KeyP) {
        captures.write(CaptureRequest);
    }

    let Some(catalog) = catalog else { return };
    const DIGITS: [KeyCode; 9] = [
        KeyCode::Digit1,
        KeyCode::Digit2,
        KeyCode::Digit3,
        KeyCode::Digit4,
        KeyCode::Digit5,
        KeyCode::Digit6,
        KeyCode::Digit7,
        KeyCode::Digit8,
        KeyCode::Digit9,
    ];
    for (index, key) in DIGITS.into_iter().enumerate() {
        if !keyboard.just_pressed(key) {
            continue;
        }
        let slot = state.highlighted_slot();
        if let Some(option_id) = nth_option_id(&catalog, slot, index) {
            if let Err(error) = registry.select_by_id(&catalog, &option_id) {
                warn!("{error}");
            }
        }
    }
}

fn nth_option_id(catalog: &OptionCatalog, slot: VehicleSlot, index: usize) -> Option<String> {
    catalog
        .options_for_slot(slot)
        .nth(index)
        .map(|option| option.id.clone())
}
