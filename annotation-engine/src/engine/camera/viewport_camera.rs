use crate::tools::annotation::{AnnotationManager, CameraFlights};
use bevy::input::mouse::{AccumulatedMouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;

const YAW_SENSITIVITY: f32 = 0.0035;
const PITCH_SENSITIVITY: f32 = 0.0030;
const PITCH_LIMIT: f32 = 1.55;

/// Orbit camera state. Only the focus point is stored; yaw, pitch and
/// distance are read back from the camera every frame so annotation flights
/// and manual orbiting never fight.
#[derive(Resource, Debug, Clone)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl ViewportCamera {
    pub fn new(focus_point: Vec3) -> Self {
        Self {
            focus_point,
            min_distance: 1.0,
            max_distance: 500.0,
        }
    }
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// Camera offset from the focus point for the given orbit angles.
pub fn orbit_offset(yaw: f32, pitch: f32, distance: f32) -> Vec3 {
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0) * Vec3::Z * distance
}

/// Inverse of [`orbit_offset`]: (yaw, pitch, distance).
pub fn orbit_angles(offset: Vec3) -> (f32, f32, f32) {
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return (0.0, 0.0, 0.0);
    }
    let pitch = (-offset.y / distance).clamp(-1.0, 1.0).asin();
    let yaw = offset.x.atan2(offset.z);
    (yaw, pitch, distance)
}

pub fn camera_controller(
    manager: Option<Res<AnnotationManager>>,
    flights: Res<CameraFlights>,
    viewport_camera: Res<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    let Some(manager) = manager else {
        return;
    };
    let Ok(mut camera_transform) = cameras.get_mut(manager.camera()) else {
        return;
    };

    // Mouse wheel scroll accumulation (pixel and line scroll)
    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }

    let focus = viewport_camera.focus_point;
    if !flights.is_flying() {
        let (mut yaw, mut pitch, mut distance) =
            orbit_angles(camera_transform.translation - focus);

        // Mouse motion with right click (orbit)
        let mouse_delta = mouse_motion.delta;
        if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
            yaw -= mouse_delta.x * YAW_SENSITIVITY;
            pitch -= mouse_delta.y * PITCH_SENSITIVITY;
            pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }

        // Mouse wheel dollies towards the focus point
        if scroll_accum.abs() > f32::EPSILON {
            distance *= 1.0 - (scroll_accum * 0.1).clamp(-0.5, 0.5);
        }
        distance = distance.clamp(viewport_camera.min_distance, viewport_camera.max_distance);

        let target = focus + orbit_offset(yaw, pitch, distance);
        if !target.abs_diff_eq(camera_transform.translation, 1e-5) {
            camera_transform.translation = target;
        }
    }

    // Always aim at the focus point, the navigator only moves the position.
    let aimed = camera_transform.looking_at(focus, Vec3::Y).rotation;
    if !aimed.abs_diff_eq(camera_transform.rotation, 1e-6) {
        camera_transform.rotation = aimed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_angles_invert_orbit_offset() {
        for (yaw, pitch, distance) in [(0.3, -0.6, 12.0), (-2.0, 1.2, 3.5), (0.0, 0.0, 1.0)] {
            let (y, p, d) = orbit_angles(orbit_offset(yaw, pitch, distance));
            assert!((y - yaw).abs() < 1e-4);
            assert!((p - pitch).abs() < 1e-4);
            assert!((d - distance).abs() < 1e-4);
        }
    }

    #[test]
    fn zero_angles_look_down_negative_z() {
        assert!(orbit_offset(0.0, 0.0, 5.0).abs_diff_eq(Vec3::new(0.0, 0.0, 5.0), 1e-6));
    }

    #[test]
    fn degenerate_offset_has_no_angles() {
        assert_eq!(orbit_angles(Vec3::ZERO), (0.0, 0.0, 0.0));
    }
}
