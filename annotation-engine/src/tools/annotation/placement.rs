use super::picker::HitResult;
use super::state::{AnnotationId, AnnotationMarker};
use bevy::prelude::*;

/// Marker world scale: the largest scene dimension over a fixed divisor, so
/// markers look the same on small and large models.
pub fn marker_scale(scene_size: Vec3, divisor: f32) -> f32 {
    if divisor <= 0.0 || !scene_size.is_finite() {
        return 0.0;
    }
    scene_size.max_element() / divisor
}

/// World position of a new marker: the hit point pushed off the surface by
/// half the marker's size, along the hit normal rotated into the anchor frame.
pub fn place_marker(hit: &HitResult, anchor_rotation: Quat, scale: f32) -> Vec3 {
    let normal = (anchor_rotation * hit.normal).normalize_or_zero();
    hit.point + normal * (scale * 0.5)
}

/// World-space size of the union of the given oriented boxes.
pub fn scene_size<'a>(objects: impl IntoIterator<Item = (&'a GlobalTransform, Vec3)>) -> Vec3 {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);

    for (transform, size) in objects {
        let half = size * 0.5;
        for corner in 0..8 {
            let local = Vec3::new(
                if corner & 1 == 0 { -half.x } else { half.x },
                if corner & 2 == 0 { -half.y } else { half.y },
                if corner & 4 == 0 { -half.z } else { half.z },
            );
            let world = transform.transform_point(local);
            min = min.min(world);
            max = max.max(world);
        }
    }

    if min.x > max.x {
        Vec3::ZERO
    } else {
        max - min
    }
}

/// Spawn the marker entity and attach it to the hit object, keeping the world
/// placement. Returns the marker entity.
pub fn spawn_marker(
    commands: &mut Commands,
    id: AnnotationId,
    hit: &HitResult,
    anchor_transform: &GlobalTransform,
    scale: f32,
) -> Entity {
    let (_, anchor_rotation, _) = anchor_transform.to_scale_rotation_translation();
    let world = GlobalTransform::from(
        Transform::from_translation(place_marker(hit, anchor_rotation, scale))
            .with_scale(Vec3::splat(scale)),
    );
    let local = world.reparented_to(anchor_transform);

    let marker = commands
        .spawn((
            AnnotationMarker {
                id,
                radius: scale * 0.5,
            },
            local,
            Visibility::default(),
            Name::new(format!("Marker {}", id)),
        ))
        .id();
    commands.entity(hit.entity).add_child(marker);
    marker
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(point: Vec3, normal: Vec3) -> HitResult {
        HitResult {
            entity: Entity::PLACEHOLDER,
            point,
            normal,
            distance: 1.0,
        }
    }

    #[test]
    fn scale_follows_largest_dimension() {
        assert_eq!(marker_scale(Vec3::new(8.0, 80.0, 4.0), 80.0), 1.0);
        assert_eq!(marker_scale(Vec3::ZERO, 80.0), 0.0);
        assert_eq!(marker_scale(Vec3::ONE, 0.0), 0.0);
    }

    #[test]
    fn marker_sits_half_its_size_off_the_surface() {
        let placed = place_marker(&hit(Vec3::new(0.0, 0.0, 4.0), Vec3::Z), Quat::IDENTITY, 0.2);
        assert!(placed.abs_diff_eq(Vec3::new(0.0, 0.0, 4.1), 1e-6));
    }

    #[test]
    fn offset_follows_anchor_rotation() {
        let rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let placed = place_marker(&hit(Vec3::ZERO, Vec3::X), rotation, 2.0);
        // Local +X turns into world -Z.
        assert!(placed.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn scene_size_unions_rotated_boxes() {
        let a = GlobalTransform::from_translation(Vec3::new(-5.0, 0.0, 0.0));
        let b = GlobalTransform::from(
            Transform::from_translation(Vec3::new(5.0, 0.0, 0.0))
                .with_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
        );
        let size = scene_size([(&a, Vec3::ONE * 2.0), (&b, Vec3::new(4.0, 2.0, 2.0))]);
        // a spans x -6..-4, b is rotated so its 4-long side lies along y.
        assert!(size.abs_diff_eq(Vec3::new(12.0, 4.0, 2.0), 1e-5));
    }

    #[test]
    fn empty_scene_has_zero_size() {
        assert_eq!(scene_size(std::iter::empty()), Vec3::ZERO);
    }
}
