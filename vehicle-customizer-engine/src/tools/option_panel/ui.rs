use bevy::prelude::*;
use constants::slots::VehicleSlot;

use super::state::*;
use crate::customization::pricing::total_price;
use crate::customization::registry::SlotRegistry;
use crate::engine::assets::option_catalog::OptionCatalog;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::vehicle_loader::VehicleLoader;

// Spawns the option panel with one row per customization slot plus the
// running total and action buttons.
pub fn spawn_option_panel_ui(mut commands: Commands, state: Res<OptionPanelUiState>) {
    let width = if state.collapsed { state.closed_width } else { state.open_width };
    let body_display = if state.collapsed { Display::None } else { Display::Flex };

    commands
        .spawn((
            OptionPanelRoot,
            Name::new("OptionPanel"),
            BackgroundColor(Color::srgb(0.10, 0.11, 0.13)),
            Node {
                width: Val::Px(width),
                min_width: Val::Px(0.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                right: Val::Px(0.0),
                top: Val::Px(0.0),
                bottom: Val::Px(0.0),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Stretch,
                justify_content: JustifyContent::FlexStart,
                overflow: Overflow::clip(),
                ..default()
            },
        ))
        .with_children(|parent| {
            let (pad, btn) = if state.collapsed { (4.0, 24.0) } else { (12.0, 28.0) };

            parent
                .spawn((
                    HeaderNode,
                    Name::new("Header"),
                    BackgroundColor(Color::srgb(0.14, 0.16, 0.20)),
                    Node {
                        width: Val::Percent(100.0),
                        padding: UiRect::all(Val::Px(pad)),
                        display: Display::Flex,
                        align_items: AlignItems::Center,
                        justify_content: if state.collapsed { JustifyContent::FlexEnd } else { JustifyContent::SpaceBetween },
                        ..default()
                    },
                ))
                .with_children(|header| {
                    header.spawn((
                        TitleText,
                        Name::new("Title"),
                        Text::new("Customization"),
                        TextFont { font_size: 18.0, ..default() },
                        TextColor(Color::srgb(1.0, 1.0, 1.0)),
                        Node { display: if state.collapsed { Display::None } else { Display::Flex }, ..default() },
                    ));

                    let chevron = if state.collapsed { ">" } else { "<" };
                    header
                        .spawn((
                            CollapseButton,
                            Name::new("CollapseButton"),
                            Button,
                            BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
                            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
                            Node {
                                width: Val::Px(btn),
                                height: Val::Px(btn),
                                display: Display::Flex,
                                align_items: AlignItems::Center,
                                justify_content: JustifyContent::Center,
                                border: UiRect::all(Val::Px(1.0)),
                                ..default()
                            },
                        ))
                        .with_children(|btn_parent| {
                            btn_parent.spawn((
                                CollapseLabel,
                                Text::new(chevron),
                                TextFont { font_size: 18.0, ..default() },
                                TextColor(Color::srgb(1.0, 1.0, 1.0)),
                            ));
                        });
                });

            parent
                .spawn((
                    OptionPanelBody,
                    Name::new("Body"),
                    BackgroundColor(Color::srgb(0.12, 0.13, 0.15)),
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        padding: UiRect::axes(Val::Px(12.0), Val::Px(8.0)),
                        row_gap: Val::Px(4.0),
                        display: body_display,
                        flex_direction: FlexDirection::Column,
                        overflow: Overflow::clip_y(),
                        ..default()
                    },
                ))
                .with_children(|body| {
                    body.spawn((
                        StatusText,
                        Name::new("Status"),
                        Text::new("No vehicle loaded"),
                        TextFont { font_size: 13.0, ..default() },
                        TextColor(Color::srgb(0.60, 0.62, 0.66)),
                        Node {
                            margin: UiRect::bottom(Val::Px(6.0)),
                            ..default()
                        },
                    ));

                    for slot in VehicleSlot::ALL {
                        body.spawn((
                            SlotRow(slot),
                            Name::new(format!("SlotRow:{}", slot.label())),
                            BackgroundColor(Color::srgb(0.12, 0.13, 0.15)),
                            Node {
                                width: Val::Percent(100.0),
                                padding: UiRect::axes(Val::Px(6.0), Val::Px(3.0)),
                                display: Display::Flex,
                                justify_content: JustifyContent::SpaceBetween,
                                ..default()
                            },
                        ))
                        .with_children(|row| {
                            row.spawn((
                                Text::new(slot.label()),
                                TextFont { font_size: 14.0, ..default() },
                                TextColor(Color::srgb(0.85, 0.85, 0.88)),
                            ));
                            row.spawn((
                                SlotValueText(slot),
                                Text::new("—"),
                                TextFont { font_size: 14.0, ..default() },
                                TextColor(Color::srgb(0.60, 0.62, 0.66)),
                            ));
                        });
                    }

                    body.spawn((
                        TotalPriceText,
                        Name::new("TotalPrice"),
                        Text::new("Total: 0"),
                        TextFont { font_size: 16.0, ..default() },
                        TextColor(Color::srgb(1.0, 1.0, 1.0)),
                        Node {
                            margin: UiRect::top(Val::Px(8.0)),
                            ..default()
                        },
                    ));

                    // Capture Preview
                    body.spawn((
                        CaptureButton,
                        Button,
                        Name::new("CaptureButton"),
                        BackgroundColor(Color::srgb(0.22, 0.24, 0.28)),
                        BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
                        Node {
                            width: Val::Percent(100.0),
                            height: Val::Px(36.0),
                            display: Display::Flex,
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::Center,
                            border: UiRect::all(Val::Px(1.0)),
                            margin: UiRect::top(Val::Px(8.0)),
                            ..default()
                        },
                    ))
                    .with_children(|btn| {
                        btn.spawn((
                            Text::new("Capture Preview"),
                            TextFont { font_size: 16.0, ..default() },
                            TextColor(Color::srgb(1.0, 1.0, 1.0)),
                        ));
                    });

                    // Clear All
                    body.spawn((
                        ClearAllButton,
                        Button,
                        Name::new("ClearAllButton"),
                        BackgroundColor(Color::srgb(0.28, 0.10, 0.10)),
                        BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
                        Node {
                            width: Val::Percent(100.0),
                            height: Val::Px(36.0),
                            display: Display::Flex,
                            align_items: AlignItems::Center,
                            justify_content: JustifyContent::Center,
                            border: UiRect::all(Val::Px(1.0)),
                            ..default()
                        },
                    ))
                    .with_children(|btn| {
                        btn.spawn((
                            Text::new("Clear All Selections"),
                            TextFont { font_size: 16.0, ..default() },
                            TextColor(Color::srgb(1.0, 1.0, 1.0)),
                        ));
                    });
                });
        });
}

pub fn apply_collapse_state(
    state: Res<OptionPanelUiState>,
    mut nodes: ParamSet<(
        Query<&mut Node, With<OptionPanelRoot>>,
        Query<&mut Node, With<OptionPanelBody>>,
        Query<&mut Node, With<HeaderNode>>,
        Query<&mut Node, With<TitleText>>,
        Query<&mut Node, With<CollapseButton>>,
    )>,
    mut chevrons: Query<&mut Text, With<CollapseLabel>>,
) {
    if !state.is_changed() { return; }

    if let Ok(mut n) = nodes.p0().single_mut() {
        n.width = Val::Px(if state.collapsed { state.closed_width } else { state.open_width });
    }
    if let Ok(mut n) = nodes.p1().single_mut() {
        n.display = if state.collapsed { Display::None } else { Display::Flex };
    }
    if let Ok(mut n) = nodes.p2().single_mut() {
        let pad = if state.collapsed { 4.0 } else { 12.0 };
        n.padding = UiRect::all(Val::Px(pad));
        n.justify_content = if state.collapsed { JustifyContent::FlexEnd } else { JustifyContent::SpaceBetween };
    }
    if let Ok(mut n) = nodes.p3().single_mut() {
        n.display = if state.collapsed { Display::None } else { Display::Flex };
    }
    if let Ok(mut n) = nodes.p4().single_mut() {
        let s = if state.collapsed { 24.0 } else { 28.0 };
        n.width = Val::Px(s);
        n.height = Val::Px(s);
    }
    for mut t in &mut chevrons {
        *t = Text::new(if state.collapsed { ">" } else { "<" });
    }
}

// Re-renders slot rows and the total whenever the selection revision moves
// or the keyboard highlight changes. Rows poll the registry; there is no
// callback channel from selection mutations to the panel.
pub fn refresh_slot_rows(
    mut state: ResMut<OptionPanelUiState>,
    registry: Res<SlotRegistry>,
    catalog: Option<Res<OptionCatalog>>,
    mut values: Query<(&SlotValueText, &mut Text)>,
    mut rows: Query<(&SlotRow, &mut BackgroundColor)>,
    mut totals: Query<&mut Text, (With<TotalPriceText>, Without<SlotValueText>)>,
) {
    let revision_moved = state.last_revision != Some(registry.revision());
    if !revision_moved && !state.is_changed() {
        return;
    }
    if revision_moved {
        state.last_revision = Some(registry.revision());
    }

    let Some(catalog) = catalog else { return };

    for (value, mut text) in &mut values {
        let label = registry
            .selection(value.0)
            .and_then(|id| catalog.option(id))
            .map(|option| match option.title.as_deref() {
                Some(title) => format!("{} ({})", title, option.price),
                None => format!("{} ({})", option.id, option.price),
            })
            .unwrap_or_else(|| "—".to_string());
        if text.0 != label {
            *text = Text::new(label);
        }
    }

    let highlighted = state.highlighted_slot();
    for (row, mut bg) in &mut rows {
        *bg = BackgroundColor(if row.0 == highlighted {
            Color::srgb(0.18, 0.20, 0.26)
        } else {
            Color::srgb(0.12, 0.13, 0.15)
        });
    }

    if let Ok(mut total) = totals.single_mut() {
        let label = format!("Total: {}", total_price(&registry, &catalog));
        if total.0 != label {
            *total = Text::new(label);
        }
    }
}

// Status line showing the current vehicle identity and its load state.
pub fn refresh_status_line(
    loader: Res<VehicleLoader>,
    progress: Res<LoadingProgress>,
    mut statuses: Query<&mut Text, With<StatusText>>,
) {
    let label = match loader.identity() {
        Some(identity) if progress.vehicle_indexed => {
            format!("{} {}", identity.model, identity.year)
        }
        Some(identity) => format!("{} {} (loading)", identity.model, identity.year),
        None => "No vehicle loaded".to_string(),
    };
    if let Ok(mut status) = statuses.single_mut() {
        if status.0 != label {
            *status = Text::new(label);
        }
    }
}
