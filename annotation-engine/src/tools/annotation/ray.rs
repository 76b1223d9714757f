use bevy::prelude::*;

/// Distance along the ray and the object-local normal of the face that was hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub local_normal: Vec3,
}

/// Intersect a world ray with a box of `size` centred on `xf`.
/// Distances are in world ray units, the normal stays in box-local space.
pub fn ray_hits_obb(origin: Vec3, dir: Vec3, xf: &GlobalTransform, size: Vec3) -> Option<RayHit> {
    let inv = xf.compute_matrix().inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    let he = size * 0.5;
    ray_aabb_hit(o_local, d_local, -he, he)
}

/// Slab-method ray/AABB intersection. Returns the entry hit, or the exit hit
/// when the origin starts inside the box.
pub fn ray_aabb_hit(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<RayHit> {
    if ray_direction == Vec3::ZERO || !ray_direction.is_finite() {
        return None;
    }

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_normal = Vec3::ZERO;
    let mut exit_normal = Vec3::ZERO;

    for axis in 0..3 {
        let origin = ray_origin[axis];
        let direction = ray_direction[axis];

        if direction.abs() <= f32::EPSILON {
            // Parallel to this slab: either always inside it or never.
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction;
        let (mut t0, mut t1) = ((min[axis] - origin) * inv, (max[axis] - origin) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        let mut facing = Vec3::ZERO;
        facing[axis] = -direction.signum();

        if t0 > t_enter {
            t_enter = t0;
            enter_normal = facing;
        }
        if t1 < t_exit {
            t_exit = t1;
            exit_normal = -facing;
        }
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }

    Some(if t_enter >= 0.0 {
        RayHit {
            distance: t_enter,
            local_normal: enter_normal,
        }
    } else {
        RayHit {
            distance: t_exit,
            local_normal: exit_normal,
        }
    })
}

/// Ray–sphere intersection for a normalised direction, returns Some(t) or None.
pub fn ray_sphere_hit_t(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let (near, far) = (-b - root, -b + root);
    if far < 0.0 {
        return None;
    }
    Some(if near >= 0.0 { near } else { far })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_face_hit_reports_outward_normal() {
        let hit = ray_aabb_hit(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::NEG_Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        )
        .unwrap();

        assert_eq!(hit.distance, 9.0);
        assert_eq!(hit.local_normal, Vec3::Z);
    }

    #[test]
    fn side_entry_picks_the_last_entered_slab() {
        // Enters through the +X face at a shallow angle.
        let dir = Vec3::new(-1.0, 0.0, -0.1).normalize();
        let hit = ray_aabb_hit(
            Vec3::new(5.0, 0.0, 0.3),
            dir,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        )
        .unwrap();

        assert_eq!(hit.local_normal, Vec3::X);
    }

    #[test]
    fn parallel_ray_outside_slab_misses() {
        let hit = ray_aabb_hit(
            Vec3::new(0.0, 3.0, 10.0),
            Vec3::NEG_Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn box_behind_origin_is_ignored() {
        let hit = ray_aabb_hit(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::Z,
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn obb_respects_rotation_and_scale() {
        let xf = GlobalTransform::from(
            Transform::from_xyz(0.0, 0.0, -2.0)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2))
                .with_scale(Vec3::splat(2.0)),
        );

        // Unit box scaled by 2 spans z in [-3, -1] after the transform.
        let hit = ray_hits_obb(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, &xf, Vec3::ONE).unwrap();
        assert!((hit.distance - 11.0).abs() < 1e-4);

        // World +Z maps to local -X after a quarter turn around Y.
        assert!(hit.local_normal.abs_diff_eq(Vec3::NEG_X, 1e-5));
    }

    #[test]
    fn sphere_hit_from_outside_and_inside() {
        let t = ray_sphere_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::ZERO, 1.0);
        assert_eq!(t, Some(4.0));

        let inside = ray_sphere_hit_t(Vec3::ZERO, Vec3::NEG_Z, Vec3::ZERO, 1.0);
        assert_eq!(inside, Some(1.0));

        let miss = ray_sphere_hit_t(Vec3::new(2.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::ZERO, 1.0);
        assert!(miss.is_none());
    }
}
