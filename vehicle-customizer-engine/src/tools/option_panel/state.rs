use bevy::prelude::*;
use constants::slots::VehicleSlot;

// Resources
#[derive(Resource)]
pub struct OptionPanelUiState {
    pub collapsed: bool,
    pub open_width: f32,
    pub closed_width: f32,
    /// Index into [`VehicleSlot::ALL`] of the row keyboard shortcuts act on.
    pub highlighted: usize,
    /// Registry revision the rows were last rendered from.
    pub last_revision: Option<u64>,
}

impl Default for OptionPanelUiState {
    fn default() -> Self {
        Self {
            collapsed: false,
            open_width: 300.0,
            closed_width: 32.0,
            highlighted: 0,
            last_revision: None,
        }
    }
}

impl OptionPanelUiState {
    pub fn highlighted_slot(&self) -> VehicleSlot {
        VehicleSlot::ALL[self.highlighted % VehicleSlot::ALL.len()]
    }

    pub fn cycle_highlight(&mut self) {
        self.highlighted = (self.highlighted + 1) % VehicleSlot::ALL.len();
    }
}

// Components
#[derive(Component)]
pub struct OptionPanelRoot;
#[derive(Component)]
pub struct OptionPanelBody;
#[derive(Component)]
pub struct HeaderNode;
#[derive(Component)]
pub struct TitleText;
#[derive(Component)]
pub struct CollapseButton;
#[derive(Component)]
pub struct CollapseLabel;
#[derive(Component)]
pub struct SlotRow(pub VehicleSlot);
#[derive(Component)]
pub struct SlotValueText(pub VehicleSlot);
#[derive(Component)]
pub struct TotalPriceText;
#[derive(Component)]
pub struct StatusText;
#[derive(Component)]
pub struct ClearAllButton;
#[derive(Component)]
pub struct CaptureButton;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highlight_cycles_through_every_slot_and_wraps() {
        let mut state = OptionPanelUiState::default();
        assert_eq!(state.highlighted_slot(), VehicleSlot::ALL[0]);

        let mut seen = Vec::new();
        for _ in 0..VehicleSlot::ALL.len() {
            seen.push(state.highlighted_slot());
            state.cycle_highlight();
        }
        assert_eq!(seen, VehicleSlot::ALL.to_vec());
        assert_eq!(state.highlighted_slot(), VehicleSlot::ALL[0]);
    }
}
