//! World, NDC and pixel conversions shared by the picker and the projector.

use super::error::AnnotationError;
use bevy::prelude::*;

/// Renderer output surface: physical pixel size and pixel density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub physical_size: UVec2,
    pub scale_factor: f32,
}

impl Viewport {
    pub fn new(physical_size: UVec2, scale_factor: f32) -> Self {
        Self {
            physical_size,
            scale_factor,
        }
    }

    pub fn from_window(window: &Window) -> Self {
        Self::new(
            UVec2::new(
                window.resolution.physical_width(),
                window.resolution.physical_height(),
            ),
            window.resolution.scale_factor(),
        )
    }

    /// Size in logical pixels, the space pointer events and panels live in.
    pub fn logical_size(&self) -> Vec2 {
        self.physical_size.as_vec2() / self.scale_factor
    }

    /// Map a logical pointer position to [-1, 1] NDC with +Y up.
    /// Returns `None` for a zero-sized surface.
    pub fn pointer_to_ndc(&self, pointer: Vec2) -> Option<Vec2> {
        let size = self.logical_size();
        if !(size.x > 0.0 && size.y > 0.0 && size.is_finite()) {
            return None;
        }
        Some(Vec2::new(
            (pointer.x / size.x) * 2.0 - 1.0,
            -(pointer.y / size.y) * 2.0 + 1.0,
        ))
    }

    /// Map NDC to rounded logical pixels (top-left origin). No clamping.
    pub fn ndc_to_screen(&self, ndc: Vec2) -> IVec2 {
        let size = self.logical_size();
        IVec2::new(
            ((0.5 + ndc.x / 2.0) * size.x).round() as i32,
            ((0.5 - ndc.y / 2.0) * size.y).round() as i32,
        )
    }
}

/// Camera view/projection snapshot used for picking and projection.
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    clip_from_world: Mat4,
    world_from_clip: Mat4,
}

impl CameraView {
    pub fn new(
        camera_transform: &GlobalTransform,
        projection: &Projection,
    ) -> Result<Self, AnnotationError> {
        match projection {
            Projection::Perspective(perspective) => {
                Ok(Self::from_perspective(camera_transform, perspective))
            }
            _ => Err(AnnotationError::UnsupportedProjection),
        }
    }

    pub fn from_perspective(
        camera_transform: &GlobalTransform,
        perspective: &PerspectiveProjection,
    ) -> Self {
        // Same reversed-Z infinite projection bevy renders with.
        let clip_from_view = Mat4::perspective_infinite_reverse_rh(
            perspective.fov,
            perspective.aspect_ratio,
            perspective.near,
        );
        let clip_from_world = clip_from_view * camera_transform.compute_matrix().inverse();
        Self {
            clip_from_world,
            world_from_clip: clip_from_world.inverse(),
        }
    }

    /// Project a world point to NDC. Points behind the camera are still
    /// projected; their coordinates simply land outside [-1, 1] or mirror.
    pub fn world_to_ndc(&self, point: Vec3) -> Vec3 {
        self.clip_from_world.project_point3(point)
    }

    /// Ray from the near plane through an NDC position.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        let near = self.world_from_clip.project_point3(ndc.extend(1.0));
        let far = self.world_from_clip.project_point3(ndc.extend(0.5));
        if !near.is_finite() || !far.is_finite() {
            return None;
        }
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d::new(near, direction))
    }

    /// Projector mapping: world point to rounded logical pixels.
    pub fn world_to_screen(&self, viewport: &Viewport, point: Vec3) -> IVec2 {
        viewport.ndc_to_screen(self.world_to_ndc(point).truncate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(UVec2::new(800, 600), 1.0)
    }

    fn camera_at(position: Vec3) -> CameraView {
        let transform = GlobalTransform::from(
            Transform::from_translation(position).looking_at(Vec3::ZERO, Vec3::Y),
        );
        CameraView::from_perspective(
            &transform,
            &PerspectiveProjection {
                aspect_ratio: 800.0 / 600.0,
                ..default()
            },
        )
    }

    #[test]
    fn viewport_corners_normalise_to_ndc_corners() {
        let vp = viewport();
        assert_eq!(vp.pointer_to_ndc(Vec2::ZERO), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(
            vp.pointer_to_ndc(Vec2::new(800.0, 600.0)),
            Some(Vec2::new(1.0, -1.0))
        );
    }

    #[test]
    fn corner_rays_are_finite() {
        let view = camera_at(Vec3::new(0.0, 0.0, 10.0));
        for ndc in [Vec2::new(-1.0, 1.0), Vec2::new(1.0, -1.0)] {
            let ray = view.ray_from_ndc(ndc).unwrap();
            assert!(ray.origin.is_finite());
            assert!(ray.direction.as_vec3().is_finite());
        }
    }

    #[test]
    fn zero_sized_viewport_has_no_ndc() {
        let vp = Viewport::new(UVec2::new(0, 600), 1.0);
        assert!(vp.pointer_to_ndc(Vec2::ZERO).is_none());
    }

    #[test]
    fn point_on_view_axis_projects_to_centre() {
        for distance in [2.0, 10.0, 250.0] {
            let view = camera_at(Vec3::new(0.0, 0.0, distance));
            assert_eq!(
                view.world_to_screen(&viewport(), Vec3::ZERO),
                IVec2::new(400, 300)
            );
        }
    }

    #[test]
    fn pixel_density_divides_out() {
        let view = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let hidpi = Viewport::new(UVec2::new(1600, 1200), 2.0);
        assert_eq!(view.world_to_screen(&hidpi, Vec3::ZERO), IVec2::new(400, 300));
    }

    #[test]
    fn centre_ray_points_down_view_axis() {
        let view = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let ray = view.ray_from_ndc(Vec2::ZERO).unwrap();
        assert!(ray.direction.as_vec3().abs_diff_eq(Vec3::NEG_Z, 1e-5));
        assert!((ray.origin.z - 9.9).abs() < 1e-3);
    }

    #[test]
    fn points_behind_camera_still_project() {
        let view = camera_at(Vec3::new(0.0, 0.0, 10.0));
        let screen_ndc = view.world_to_ndc(Vec3::new(1.0, 1.0, 20.0));
        assert!(screen_ndc.is_finite());
    }
}
