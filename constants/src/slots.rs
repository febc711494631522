/// Logical customization points on a vehicle. The set is fixed and closed;
/// it is never derived from catalog or asset data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleSlot {
    Hood,
    Rim,
    FrontBumper,
    RearBumper,
    RoofPanel,
    Door,
    Mirror,
    Spoiler,
    Handle,
    SeatCushion,
    SeatBase,
    DashboardTrim,
    SoundSystem,
}

impl VehicleSlot {
    /// Canonical slot order. Save payloads and UI listings follow this order.
    pub const ALL: [VehicleSlot; 13] = [
        VehicleSlot::Hood,
        VehicleSlot::Rim,
        VehicleSlot::FrontBumper,
        VehicleSlot::RearBumper,
        VehicleSlot::RoofPanel,
        VehicleSlot::Door,
        VehicleSlot::Mirror,
        VehicleSlot::Spoiler,
        VehicleSlot::Handle,
        VehicleSlot::SeatCushion,
        VehicleSlot::SeatBase,
        VehicleSlot::DashboardTrim,
        VehicleSlot::SoundSystem,
    ];

    /// Canonical display label, also the `title` written into persisted
    /// configuration records.
    pub fn label(&self) -> &'static str {
        match self {
            VehicleSlot::Hood => "Hood",
            VehicleSlot::Rim => "Rim",
            VehicleSlot::FrontBumper => "Front Bumper",
            VehicleSlot::RearBumper => "Rear Bumper",
            VehicleSlot::RoofPanel => "Roof Panel",
            VehicleSlot::Door => "Door",
            VehicleSlot::Mirror => "Mirror",
            VehicleSlot::Spoiler => "Spoiler",
            VehicleSlot::Handle => "Handle",
            VehicleSlot::SeatCushion => "Seat Cushion",
            VehicleSlot::SeatBase => "Seat Base",
            VehicleSlot::DashboardTrim => "Dashboard Trim",
            VehicleSlot::SoundSystem => "Sound System",
        }
    }

    /// Catalog option type tag bound to this slot.
    pub fn option_type(&self) -> &'static str {
        match self {
            VehicleSlot::Hood => "exterior-hood",
            VehicleSlot::Rim => "exterior-rim",
            VehicleSlot::FrontBumper => "exterior-front-bumper",
            VehicleSlot::RearBumper => "exterior-rear-bumper",
            VehicleSlot::RoofPanel => "exterior-roof-panel",
            VehicleSlot::Door => "exterior-door",
            VehicleSlot::Mirror => "exterior-mirror",
            VehicleSlot::Spoiler => "exterior-spoiler",
            VehicleSlot::Handle => "exterior-handle",
            VehicleSlot::SeatCushion => "interior-seat-cushion",
            VehicleSlot::SeatBase => "interior-seat-base",
            VehicleSlot::DashboardTrim => "interior-dashboard-trim",
            VehicleSlot::SoundSystem => "interior-sound-system",
        }
    }

    /// Mesh names (as authored in vehicle assets) that bind to this slot.
    /// Matching is case-insensitive and ignores exporter suffixes ("Door.001").
    pub fn mesh_aliases(&self) -> &'static [&'static str] {
        match self {
            VehicleSlot::Hood => &["hood", "bonnet", "hood_panel"],
            VehicleSlot::Rim => &["rim", "rims", "wheel_rim", "alloy", "alloys"],
            VehicleSlot::FrontBumper => &["front_bumper", "bumper_front", "frontbumper"],
            VehicleSlot::RearBumper => &["rear_bumper", "bumper_rear", "rearbumper"],
            VehicleSlot::RoofPanel => &["roof", "roof_panel", "rooftop"],
            VehicleSlot::Door => &[
                "door", "door_left", "door_right", "door_fl", "door_fr", "door_rl", "door_rr",
            ],
            VehicleSlot::Mirror => &[
                "mirror",
                "wing_mirror",
                "side_mirror",
                "mirror_left",
                "mirror_right",
            ],
            VehicleSlot::Spoiler => &["spoiler", "rear_spoiler", "wing"],
            VehicleSlot::Handle => &["handle", "door_handle"],
            VehicleSlot::SeatCushion => &["seat_cushion", "seat_cushions", "cushion"],
            VehicleSlot::SeatBase => &["seat_base", "seat", "seat_frame"],
            VehicleSlot::DashboardTrim => &["dashboard", "dashboard_trim", "dash_trim", "console"],
            VehicleSlot::SoundSystem => &["sound_system", "speaker", "subwoofer", "stereo"],
        }
    }
}

/// Strip exporter suffixes and lower-case a mesh name for alias lookup.
/// Blender-style duplicates ("Door.001") normalise to their base name.
pub fn normalise_mesh_name(name: &str) -> String {
    let trimmed = name.trim();
    let base = match trimmed.rsplit_once('.') {
        Some((head, tail)) if !head.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => head,
        _ => trimmed,
    };
    base.to_lowercase()
}

/// Resolve a mesh node name to its slot via the alias table.
/// Names with no alias match belong to inert geometry (chassis, glass).
pub fn slot_for_mesh_name(name: &str) -> Option<VehicleSlot> {
    let normalised = normalise_mesh_name(name);
    VehicleSlot::ALL
        .into_iter()
        .find(|slot| slot.mesh_aliases().contains(&normalised.as_str()))
}

/// Resolve a catalog option type tag to its slot.
pub fn slot_for_option_type(option_type: &str) -> Option<VehicleSlot> {
    VehicleSlot::ALL
        .into_iter()
        .find(|slot| slot.option_type() == option_type)
}

/// Resolve a canonical display label back to its slot. Used as the first step
/// of the rehydration fallback chain.
pub fn slot_for_label(label: &str) -> Option<VehicleSlot> {
    let wanted = label.trim();
    VehicleSlot::ALL
        .into_iter()
        .find(|slot| slot.label().eq_ignore_ascii_case(wanted))
}
