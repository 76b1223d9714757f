use super::error::AnnotationError;
use super::panels::{AnnotationPanels, report};
use super::placement::{marker_scale, scene_size, spawn_marker};
use super::projection::{CameraView, Viewport};
use super::ray::{ray_hits_obb, ray_sphere_hit_t};
use super::settings::AnnotationSettings;
use super::state::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

/// Geometry a candidate is intersected as.
#[derive(Debug, Clone, Copy)]
pub enum PickShape {
    /// Oriented box of the given object-local size.
    Box(Vec3),
    /// World-space sphere around the entity origin.
    Sphere(f32),
}

#[derive(Debug, Clone, Copy)]
pub struct PickCandidate {
    pub entity: Entity,
    pub transform: GlobalTransform,
    pub shape: PickShape,
}

/// Nearest intersection along a pointer ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    pub entity: Entity,
    pub point: Vec3,
    /// Surface normal in the hit object's local frame.
    pub normal: Vec3,
    pub distance: f32,
}

/// Intersect a ray against every candidate and keep the nearest hit.
/// On equal distances the earlier candidate wins.
pub fn pick_nearest(ray: Ray3d, candidates: impl IntoIterator<Item = PickCandidate>) -> Option<HitResult> {
    let origin = ray.origin;
    let dir = ray.direction.as_vec3();

    let mut best: Option<HitResult> = None;
    for candidate in candidates {
        let hit = match candidate.shape {
            PickShape::Box(size) => ray_hits_obb(origin, dir, &candidate.transform, size)
                .map(|hit| (hit.distance, hit.local_normal)),
            PickShape::Sphere(radius) => {
                let center = candidate.transform.translation();
                ray_sphere_hit_t(origin, dir, center, radius).map(|t| {
                    let world_normal = (origin + dir * t - center).normalize_or_zero();
                    let (_, rotation, _) = candidate.transform.to_scale_rotation_translation();
                    (t, rotation.inverse() * world_normal)
                })
            }
        };

        let Some((distance, normal)) = hit else {
            continue;
        };
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(HitResult {
                entity: candidate.entity,
                point: origin + dir * distance,
                normal,
                distance,
            });
        }
    }
    best
}

/// Read access to everything the picker casts against.
#[derive(SystemParam)]
pub struct AnnotationPicker<'w, 's> {
    cameras: Query<'w, 's, (&'static GlobalTransform, &'static Projection)>,
    windows: Query<'w, 's, &'static Window>,
    scene: Query<
        'w,
        's,
        (Entity, &'static GlobalTransform, &'static PickBounds),
        Without<AnnotationMarker>,
    >,
    markers: Query<'w, 's, (Entity, &'static GlobalTransform, &'static AnnotationMarker)>,
}

impl AnnotationPicker<'_, '_> {
    pub fn viewport(&self, manager: &AnnotationManager) -> Result<Viewport, AnnotationError> {
        self.windows
            .get(manager.window())
            .map(Viewport::from_window)
            .map_err(|_| AnnotationError::MissingViewport)
    }

    pub fn camera_view(&self, manager: &AnnotationManager) -> Result<CameraView, AnnotationError> {
        let (transform, projection) = self
            .cameras
            .get(manager.camera())
            .map_err(|_| AnnotationError::MissingViewport)?;
        CameraView::new(transform, projection)
    }

    /// Pointer pixels to NDC using the injected window.
    pub fn pointer_ndc(
        &self,
        manager: &AnnotationManager,
        position: Vec2,
    ) -> Result<Vec2, AnnotationError> {
        self.viewport(manager)?
            .pointer_to_ndc(position)
            .ok_or(AnnotationError::MissingViewport)
    }

    pub fn pick(
        &self,
        manager: &AnnotationManager,
        ndc: Vec2,
        candidates: CandidateSet,
    ) -> Result<HitResult, AnnotationError> {
        let ray = self
            .camera_view(manager)?
            .ray_from_ndc(ndc)
            .ok_or(AnnotationError::NoIntersection)?;

        let hit = match candidates {
            CandidateSet::Markers => pick_nearest(
                ray,
                self.markers.iter().map(|(entity, transform, marker)| PickCandidate {
                    entity,
                    transform: *transform,
                    shape: PickShape::Sphere(marker.radius),
                }),
            ),
            CandidateSet::Scene => pick_nearest(
                ray,
                self.scene.iter().map(|(entity, transform, bounds)| PickCandidate {
                    entity,
                    transform: *transform,
                    shape: PickShape::Box(bounds.0),
                }),
            ),
        };
        hit.ok_or(AnnotationError::NoIntersection)
    }

    /// World size of every pickable scene object together.
    pub fn scene_size(&self) -> Vec3 {
        scene_size(self.scene.iter().map(|(_, transform, bounds)| (transform, bounds.0)))
    }

    pub fn object_transform(&self, entity: Entity) -> Option<&GlobalTransform> {
        self.scene.get(entity).ok().map(|(_, transform, _)| transform)
    }
}

/// Dispatch pointer events: marker hits select, scene hits create.
#[allow(clippy::too_many_arguments)]
pub fn handle_pointer_events(
    mut events: EventReader<AnnotationPointerEvent>,
    mut manager: ResMut<AnnotationManager>,
    picker: AnnotationPicker,
    settings: Res<AnnotationSettings>,
    mut panels: ResMut<AnnotationPanels>,
    templates: Query<&Name, With<PanelTemplate>>,
    camera_positions: Query<&Transform, With<Projection>>,
    mut commands: Commands,
    mut selections: EventWriter<SelectAnnotationEvent>,
    mut created: EventWriter<AnnotationCreatedEvent>,
    mut diagnostics: EventWriter<AnnotationDiagnostic>,
) {
    for event in events.read() {
        let ndc = match picker.pointer_ndc(&manager, event.position) {
            Ok(ndc) => ndc,
            Err(error) => {
                report(&mut diagnostics, error);
                continue;
            }
        };
        manager.set_pointer_ndc(ndc);

        let hit = match picker.pick(&manager, ndc, event.candidates) {
            Ok(hit) => hit,
            Err(AnnotationError::NoIntersection) => {
                debug!("No {:?} hit at {}", event.candidates, event.position);
                continue;
            }
            Err(error) => {
                report(&mut diagnostics, error);
                continue;
            }
        };

        match event.candidates {
            CandidateSet::Markers => {
                if let Some(annotation) = manager.find_by_marker(hit.entity) {
                    selections.write(SelectAnnotationEvent { id: annotation.id() });
                }
            }
            CandidateSet::Scene => {
                let Some(anchor_transform) = picker.object_transform(hit.entity) else {
                    continue;
                };
                let Ok(camera) = camera_positions.get(manager.camera()) else {
                    report(&mut diagnostics, AnnotationError::MissingViewport);
                    continue;
                };

                let id = manager.allocate_id();
                let scale = marker_scale(picker.scene_size(), settings.marker_scene_divisor);
                let marker = spawn_marker(&mut commands, id, &hit, anchor_transform, scale);

                let mut has_panel = false;
                if let Some(selector) = settings.template_selector.as_deref() {
                    if templates.iter().any(|name| name.as_str() == selector) {
                        panels.attach(id, settings.panel_fade_in_secs);
                        has_panel = true;
                    } else {
                        report(
                            &mut diagnostics,
                            AnnotationError::MissingTemplate {
                                selector: selector.to_string(),
                            },
                        );
                    }
                }

                manager.push(Annotation::new(id, marker, hit.entity, camera.translation, has_panel));
                info!("Created {} on {} at {}", id, hit.entity, hit.point);
                created.write(AnnotationCreatedEvent {
                    id,
                    marker,
                    anchor: hit.entity,
                    has_panel,
                });
            }
        }
    }
}
