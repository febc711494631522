use bevy::prelude::*;

use crate::engine::loading::progress::LoadingProgress;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}

/// Per-frame phase ordering. Material sync runs first and therefore renders
/// the selection state as it stood at the start of the frame; every selection
/// mutation path (RPC, panel buttons, keyboard) runs in `Mutate` afterwards,
/// so a change becomes visible exactly one frame later, never mid-frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    ApplyMaterials,
    Mutate,
}

// Transition to Running once the catalog poll has settled. Vehicle loading
// continues in the background; the session is interactive without one.
pub fn transition_to_running(
    loading_progress: Res<LoadingProgress>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if loading_progress.catalog_ready {
        println!("→ Catalog ready, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}
