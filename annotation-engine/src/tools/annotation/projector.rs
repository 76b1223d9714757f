use super::panels::{AnnotationPanels, report};
use super::picker::AnnotationPicker;
use super::state::{AnnotationDiagnostic, AnnotationManager, AnnotationMarker};
use bevy::prelude::*;

/// Per-frame projection of every marker to logical pixels.
///
/// Runs after transform propagation so it sees the camera position the
/// navigator wrote this frame. Panels are repositioned only while the gate is
/// open; off-screen and behind-camera markers are still projected.
pub fn project_annotations(
    mut manager: ResMut<AnnotationManager>,
    picker: AnnotationPicker,
    markers: Query<&GlobalTransform, With<AnnotationMarker>>,
    mut panels: ResMut<AnnotationPanels>,
    mut diagnostics: EventWriter<AnnotationDiagnostic>,
) {
    if manager.is_empty() {
        return;
    }
    let (view, viewport) = match (picker.camera_view(&manager), picker.viewport(&manager)) {
        (Ok(view), Ok(viewport)) => (view, viewport),
        (Err(error), _) | (_, Err(error)) => {
            debug!("Skipping projection: {}", error);
            return;
        }
    };
    let gate_open = panels.is_open();

    let mut moved = false;
    let mut annotations_changed = false;
    for annotation in manager.bypass_change_detection().annotations_mut() {
        let Ok(marker) = markers.get(annotation.marker()) else {
            continue;
        };
        let screen = view.world_to_screen(&viewport, marker.translation());
        if annotation.screen_position != Some(screen) {
            annotation.screen_position = Some(screen);
            annotations_changed = true;
        }

        if !gate_open || !annotation.has_panel() {
            continue;
        }
        match panels.bypass_change_detection().set_position(annotation.id(), screen) {
            Ok(changed) => moved |= changed,
            // Skipped for this frame only.
            Err(error) => report(&mut diagnostics, error),
        }
    }

    if annotations_changed {
        manager.set_changed();
    }
    if moved {
        panels.set_changed();
    }
}

/// World rotation of `entity` built from the current `Transform` chain, so a
/// parent rotated earlier this frame is seen before propagation catches up.
fn current_world_rotation(
    entity: Entity,
    transforms: &Query<(&Transform, Option<&ChildOf>), Without<AnnotationMarker>>,
) -> Quat {
    let mut rotation = Quat::IDENTITY;
    let mut next = Some(entity);
    while let Some(current) = next {
        let Ok((transform, child_of)) = transforms.get(current) else {
            break;
        };
        rotation = transform.rotation * rotation;
        next = child_of.map(ChildOf::parent);
    }
    rotation
}

/// Keep markers camera-facing while they stay parented to their anchors.
pub fn face_markers_to_camera(
    manager: Res<AnnotationManager>,
    transforms: Query<(&Transform, Option<&ChildOf>), Without<AnnotationMarker>>,
    mut markers: Query<(&mut Transform, &ChildOf), With<AnnotationMarker>>,
) {
    if !transforms.contains(manager.camera()) {
        return;
    }
    let camera_rotation = current_world_rotation(manager.camera(), &transforms);

    for (mut transform, child_of) in &mut markers {
        let parent_rotation = current_world_rotation(child_of.parent(), &transforms);
        let rotation = (parent_rotation.inverse() * camera_rotation).normalize();
        if !transform.rotation.abs_diff_eq(rotation, 1e-6) {
            transform.rotation = rotation;
        }
    }
}
