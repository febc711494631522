//! Interactive side panel for the customization session.
//!
//! One row per slot showing the current selection and its price, a running
//! total, and capture/clear actions. Rows poll the registry revision; the
//! panel never holds selection state of its own.

/// UI button interactions and keyboard shortcuts for the panel.
pub mod interactions;

/// State resource and marker components for panel operation.
pub mod state;

/// UI spawning and refresh systems for the panel.
pub mod ui;

use bevy::prelude::*;

pub use state::OptionPanelUiState;

use interactions::{
    capture_button_interaction, clear_all_button_interaction, collapse_button_interaction,
    keyboard_shortcuts,
};
use ui::{apply_collapse_state, refresh_slot_rows, refresh_status_line, spawn_option_panel_ui};

use crate::engine::core::app_state::FrameSet;

// Registers the option panel, its state, and its systems.
pub struct OptionPanelPlugin;

impl Plugin for OptionPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OptionPanelUiState>()
            .add_systems(
                Update,
                (keyboard_shortcuts, clear_all_button_interaction, capture_button_interaction)
                    .in_set(FrameSet::Mutate),
            )
            .add_systems(
                Update,
                (
                    collapse_button_interaction,
                    apply_collapse_state,
                    refresh_slot_rows,
                    refresh_status_line,
                ),
            )
            .add_systems(Startup, spawn_option_panel_ui);
    }
}
