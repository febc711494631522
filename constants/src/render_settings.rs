/// Longest side of a captured preview image after resampling.
pub const CAPTURE_MAX_DIMENSION: u32 = 800;

/// JPEG quality factor for encoded preview payloads.
pub const CAPTURE_JPEG_QUALITY: u8 = 80;

/// How long a discrete rotation nudge (arrow key / UI button) keeps spinning
/// the turntable before it self-resets.
pub const NUDGE_DURATION_SECS: f32 = 0.6;

/// Angular velocity imparted by a rotation nudge, radians per second.
pub const NUDGE_ANGULAR_VELOCITY: f32 = 1.4;

/// Mouse drag sensitivity for continuous turntable rotation.
pub const ORBIT_DRAG_SENSITIVITY: f32 = 0.0035;

/// Turntable zoom clamp range, world units from the focus point.
pub const ZOOM_MIN_RADIUS: f32 = 2.5;
pub const ZOOM_MAX_RADIUS: f32 = 18.0;

/// Zoom factor applied per scroll line.
pub const ZOOM_SCROLL_STEP: f32 = 0.08;

/// Default orbit distance before a vehicle is loaded.
pub const DEFAULT_ORBIT_RADIUS: f32 = 7.5;

/// Turntable pitch clamp, radians.
pub const PITCH_MIN: f32 = -1.35;
pub const PITCH_MAX: f32 = 0.15;

/// Camera smoothing factor (per second) for turntable follow.
pub const CAMERA_LERP_SPEED: f32 = 12.0;
