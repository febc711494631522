use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::render_settings::{
    CAMERA_LERP_SPEED, DEFAULT_ORBIT_RADIUS, NUDGE_ANGULAR_VELOCITY, NUDGE_DURATION_SECS,
    ORBIT_DRAG_SENSITIVITY, PITCH_MAX, PITCH_MIN, ZOOM_MAX_RADIUS, ZOOM_MIN_RADIUS,
    ZOOM_SCROLL_STEP,
};

/// Transient viewing state: orbit angles, zoom radius, and the decaying spin
/// imparted by discrete nudge inputs. Never serialized into a configuration.
#[derive(Resource)]
pub struct TurntableCamera {
    pub yaw: f32,
    pub pitch: f32,
    pub radius: f32,
    pub focus: Vec3,
    spin_velocity: f32,
    nudge_timer: Timer,
}

impl Default for TurntableCamera {
    fn default() -> Self {
        let mut nudge_timer = Timer::from_seconds(NUDGE_DURATION_SECS, TimerMode::Once);
        nudge_timer.tick(std::time::Duration::from_secs_f32(NUDGE_DURATION_SECS));
        Self {
            yaw: 0.6,
            pitch: -0.35,
            radius: DEFAULT_ORBIT_RADIUS,
            focus: Vec3::new(0.0, 0.8, 0.0),
            spin_velocity: 0.0,
            nudge_timer,
        }
    }
}

impl TurntableCamera {
    /// Discrete rotation nudge: spins for a bounded duration, then resets.
    pub fn nudge(&mut self, direction: f32) {
        self.spin_velocity = direction.signum() * NUDGE_ANGULAR_VELOCITY;
        self.nudge_timer = Timer::from_seconds(NUDGE_DURATION_SECS, TimerMode::Once);
    }

    /// Continuous drag rotation cancels any pending nudge.
    pub fn drag(&mut self, delta: Vec2) {
        self.spin_velocity = 0.0;
        self.yaw -= delta.x * ORBIT_DRAG_SENSITIVITY;
        self.pitch = (self.pitch - delta.y * ORBIT_DRAG_SENSITIVITY).clamp(PITCH_MIN, PITCH_MAX);
    }

    pub fn zoom(&mut self, steps: f32) {
        self.radius = (self.radius * (1.0 - steps * ZOOM_SCROLL_STEP))
            .clamp(ZOOM_MIN_RADIUS, ZOOM_MAX_RADIUS);
    }

    pub fn spin_velocity(&self) -> f32 {
        self.spin_velocity
    }

    /// Advance the nudge spin by one tick; the spin self-resets once the
    /// nudge duration elapses.
    pub fn tick(&mut self, delta: std::time::Duration) {
        self.nudge_timer.tick(delta);
        if self.nudge_timer.finished() {
            self.spin_velocity = 0.0;
        }
        self.yaw += self.spin_velocity * delta.as_secs_f32();
    }
}

/// Translate discrete and continuous input into turntable state.
pub fn turntable_input(
    mut camera: ResMut<TurntableCamera>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    if keyboard.just_pressed(KeyCode::ArrowLeft) {
        camera.nudge(-1.0);
    }
    if keyboard.just_pressed(KeyCode::ArrowRight) {
        camera.nudge(1.0);
    }

    let drag_delta: Vec2 = mouse_motion.read().map(|motion| motion.delta).sum();
    if mouse_button.pressed(MouseButton::Left) && drag_delta != Vec2::ZERO {
        camera.drag(drag_delta);
    }

    let mut scroll_accum = 0.0;
    for event in scroll_events.read() {
        scroll_accum += match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        camera.zoom(scroll_accum);
    }
}

/// Position the viewport camera on the orbit each frame, with the smoothing
/// the rest of the viewport uses.
pub fn apply_turntable(
    mut camera: ResMut<TurntableCamera>,
    time: Res<Time>,
    mut transforms: Query<&mut Transform, With<Camera3d>>,
) {
    camera.tick(time.delta());

    let Ok(mut transform) = transforms.single_mut() else {
        return;
    };

    let orbit = Quat::from_euler(EulerRot::YXZ, camera.yaw, camera.pitch, 0.0);
    let target_pos = camera.focus + orbit * Vec3::new(0.0, 0.0, camera.radius);
    let target_rot = Transform::from_translation(target_pos)
        .looking_at(camera.focus, Vec3::Y)
        .rotation;

    let lerp = (CAMERA_LERP_SPEED * time.delta_secs()).min(1.0);
    transform.translation = transform.translation.lerp(target_pos, lerp);
    transform.rotation = transform.rotation.slerp(target_rot, lerp);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn nudge_spin_self_resets_after_bounded_duration() {
        let mut camera = TurntableCamera::default();
        assert_eq!(camera.spin_velocity(), 0.0);

        camera.nudge(1.0);
        assert!(camera.spin_velocity() > 0.0);

        let yaw_before = camera.yaw;
        camera.tick(Duration::from_millis(100));
        assert!(camera.yaw > yaw_before);
        assert!(camera.spin_velocity() > 0.0);

        camera.tick(Duration::from_secs_f32(NUDGE_DURATION_SECS + 0.1));
        assert_eq!(camera.spin_velocity(), 0.0);

        let settled = camera.yaw;
        camera.tick(Duration::from_millis(100));
        assert_eq!(camera.yaw, settled);
    }

    #[test]
    fn drag_cancels_a_pending_nudge() {
        let mut camera = TurntableCamera::default();
        camera.nudge(1.0);
        camera.drag(Vec2::new(10.0, 0.0));
        assert_eq!(camera.spin_velocity(), 0.0);
    }

    #[test]
    fn zoom_stays_clamped() {
        let mut camera = TurntableCamera::default();
        for _ in 0..200 {
            camera.zoom(5.0);
        }
        assert!(camera.radius >= ZOOM_MIN_RADIUS);
        for _ in 0..200 {
            camera.zoom(-5.0);
        }
        assert!(camera.radius <= ZOOM_MAX_RADIUS);
    }

    #[test]
    fn pitch_stays_clamped_under_drag() {
        let mut camera = TurntableCamera::default();
        camera.drag(Vec2::new(0.0, 1.0e6));
        assert!(camera.pitch >= PITCH_MIN);
        camera.drag(Vec2::new(0.0, -1.0e6));
        assert!(camera.pitch <= PITCH_MAX);
    }
}
