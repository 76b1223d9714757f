use super::error::AnnotationError;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable identifier correlating a marker with its panel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AnnotationId(pub u32);

impl std::fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "annotation-{}", self.0)
    }
}

// Components

/// Pickable box in object-local space, centred on the entity origin.
#[derive(Component, Debug, Clone, Copy)]
pub struct PickBounds(pub Vec3);

/// Billboard marker, parented to the object it was placed on.
#[derive(Component, Debug, Clone, Copy)]
pub struct AnnotationMarker {
    pub id: AnnotationId,
    /// World-space pick radius at placement time.
    pub radius: f32,
}

/// UI entity cloned for every annotation panel, located by its `Name`.
#[derive(Component, Debug, Default)]
pub struct PanelTemplate;

/// One annotation: marker, anchor and the viewpoint captured at creation.
#[derive(Debug, Clone)]
pub struct Annotation {
    id: AnnotationId,
    marker: Entity,
    anchor: Entity,
    captured_camera_position: Vec3,
    has_panel: bool,
    pub(crate) screen_position: Option<IVec2>,
}

impl Annotation {
    pub(crate) fn new(
        id: AnnotationId,
        marker: Entity,
        anchor: Entity,
        captured_camera_position: Vec3,
        has_panel: bool,
    ) -> Self {
        Self {
            id,
            marker,
            anchor,
            captured_camera_position,
            has_panel,
            screen_position: None,
        }
    }

    pub fn id(&self) -> AnnotationId {
        self.id
    }

    pub fn marker(&self) -> Entity {
        self.marker
    }

    /// Object the marker is attached to.
    pub fn anchor(&self) -> Entity {
        self.anchor
    }

    /// Camera position at creation, used as the fly-to target.
    pub fn captured_camera_position(&self) -> Vec3 {
        self.captured_camera_position
    }

    pub fn has_panel(&self) -> bool {
        self.has_panel
    }

    /// Pixel position computed by the last projection pass.
    pub fn screen_position(&self) -> Option<IVec2> {
        self.screen_position
    }
}

/// Per-viewer annotation session.
///
/// The camera and window entities are injected by the caller and borrowed for
/// the session lifetime. Annotations are append-only, in creation order.
#[derive(Resource, Debug)]
pub struct AnnotationManager {
    camera: Entity,
    window: Entity,
    annotations: Vec<Annotation>,
    pointer_ndc: Option<Vec2>,
    next_id: u32,
}

impl AnnotationManager {
    pub fn new(camera: Entity, window: Entity) -> Self {
        Self {
            camera,
            window,
            annotations: Vec::new(),
            pointer_ndc: None,
            next_id: 0,
        }
    }

    pub fn camera(&self) -> Entity {
        self.camera
    }

    pub fn window(&self) -> Entity {
        self.window
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn find_by_marker(&self, marker: Entity) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.marker == marker)
    }

    /// Last pointer position in normalised device coordinates.
    pub fn pointer_ndc(&self) -> Option<Vec2> {
        self.pointer_ndc
    }

    pub(crate) fn set_pointer_ndc(&mut self, ndc: Vec2) {
        self.pointer_ndc = Some(ndc);
    }

    pub(crate) fn allocate_id(&mut self) -> AnnotationId {
        let id = AnnotationId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn push(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    pub(crate) fn annotations_mut(&mut self) -> &mut [Annotation] {
        &mut self.annotations
    }
}

// Events

/// Which objects a pointer ray is tested against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSet {
    /// Existing markers only; a hit selects that annotation.
    Markers,
    /// Every pickable scene object; a hit creates an annotation.
    Scene,
}

/// Pointer interaction in logical window pixels (top-left origin).
#[derive(Event, Debug, Clone, Copy)]
pub struct AnnotationPointerEvent {
    pub position: Vec2,
    pub candidates: CandidateSet,
}

impl AnnotationPointerEvent {
    pub fn create(position: Vec2) -> Self {
        Self {
            position,
            candidates: CandidateSet::Scene,
        }
    }

    pub fn select(position: Vec2) -> Self {
        Self {
            position,
            candidates: CandidateSet::Markers,
        }
    }
}

/// Request a camera flight to an annotation's captured viewpoint.
#[derive(Event, Debug, Clone, Copy)]
pub struct SelectAnnotationEvent {
    pub id: AnnotationId,
}

/// The user started interacting with the view; open panels fade out.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct HidePanelsEvent;

#[derive(Event, Debug, Clone, Copy)]
pub struct AnnotationCreatedEvent {
    pub id: AnnotationId,
    pub marker: Entity,
    pub anchor: Entity,
    pub has_panel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    Started,
    Finished,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct AnnotationFlightEvent {
    pub id: AnnotationId,
    pub phase: FlightPhase,
}

/// Developer diagnostic for a degraded, non-fatal failure.
#[derive(Event, Debug, Clone)]
pub struct AnnotationDiagnostic(pub AnnotationError);
