//! Spatially anchored annotations over a 3D scene.
//!
//! An annotation is a camera-facing marker attached to a point on a pickable
//! object, the camera position captured when it was created, and an optional
//! detail panel that follows the marker on screen.
//!
//! ## Responsibilities
//!
//! - **Picker** (`picker`): pointer pixels to NDC to a camera ray, intersected
//!   against either existing markers or every pickable scene object.
//! - **Marker factory** (`placement`): scene-relative marker scale, offset off
//!   the hit surface, attached to the hit object keeping its world placement.
//! - **Projector** (`projector`): every marker to logical pixels each frame,
//!   written to open panels.
//! - **Navigator** (`navigator`): eased camera flight to the captured viewpoint,
//!   then a delayed panel reveal.
//! - **Panel lifecycle** (`panels`): typed panel state and the single open gate.
//!
//! ## Frame Order
//!
//! ```text
//! Update (AnnotationSet::Interaction)
//!   handle_pointer_events ─> begin_camera_flights ─> advance_camera_flights
//!     ─> hide_panels_on_interaction ─> tick_panel_timers
//! PostUpdate
//!   face_markers_to_camera ─> TransformPropagate ─> project_annotations
//! ```
//!
//! The projector always runs after the navigator's camera write of the same
//! frame, so panels never lag the camera.
//!
//! ## Session
//!
//! Insert an [`AnnotationManager`] built from the viewer's camera and window
//! entities to start a session. Every system is idle until one exists.
//!
//! ```rust,ignore
//! commands.insert_resource(AnnotationManager::new(camera, window));
//! pointer_events.write(AnnotationPointerEvent::create(cursor));
//! ```

pub mod error;
pub mod navigator;
pub mod notify;
pub mod overlay;
pub mod panels;
pub mod picker;
pub mod placement;
pub mod projection;
pub mod projector;
pub mod ray;
pub mod settings;
pub mod state;
pub mod visuals;

use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;
use bevy::transform::TransformSystem;

pub use error::AnnotationError;
pub use navigator::CameraFlights;
pub use panels::{AnnotationPanels, PanelDisplay, PanelState};
pub use settings::{AnnotationSettings, FlightOverlap};
pub use state::*;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationSet {
    /// Pointer handling, camera flights and panel lifecycle.
    Interaction,
    /// Marker billboarding and screen projection.
    Projection,
}

/// Core annotation systems. Needs no rendering, so it also runs headless.
pub struct AnnotationPlugin;

impl Plugin for AnnotationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AnnotationSettings>()
            .init_resource::<AnnotationPanels>()
            .init_resource::<CameraFlights>()
            .add_event::<AnnotationPointerEvent>()
            .add_event::<SelectAnnotationEvent>()
            .add_event::<HidePanelsEvent>()
            .add_event::<AnnotationCreatedEvent>()
            .add_event::<AnnotationFlightEvent>()
            .add_event::<AnnotationDiagnostic>()
            .add_systems(
                Update,
                (
                    picker::handle_pointer_events,
                    navigator::begin_camera_flights,
                    navigator::advance_camera_flights,
                    panels::hide_panels_on_interaction,
                    panels::tick_panel_timers,
                )
                    .chain()
                    .in_set(AnnotationSet::Interaction)
                    .run_if(resource_exists::<AnnotationManager>),
            )
            .add_systems(
                PostUpdate,
                (
                    projector::face_markers_to_camera
                        .before(TransformSystem::TransformPropagate),
                    projector::project_annotations
                        .after(TransformSystem::TransformPropagate),
                )
                    .in_set(AnnotationSet::Projection)
                    .run_if(resource_exists::<AnnotationManager>),
            )
            .add_systems(
                Update,
                (
                    notify::notify_annotation_created,
                    notify::notify_annotation_flights,
                    notify::notify_panels_updated,
                    notify::notify_diagnostics,
                )
                    .after(AnnotationSet::Interaction)
                    .run_if(resource_exists::<AnnotationManager>)
                    .run_if(resource_exists::<WebRpcInterface>),
            );
    }
}
