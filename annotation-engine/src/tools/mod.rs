//! Interactive tools layered over the 3D scene.
//!
//! ## Annotation Tool
//!
//! - **Creation**: left double click (native) or `add_annotation` RPC picks
//!   the scene under the pointer and attaches a marker to the hit object.
//! - **Selection**: left click on a marker (native) or `select_annotation_at` /
//!   `select_annotation` RPC flies the camera to the viewpoint captured when
//!   the annotation was created, then reveals its panel.
//! - **Hiding**: right or middle press, mouse wheel, or
//!   `hide_annotation_panels` RPC fades every open panel out.
//!
//! ### Creation Flow
//!
//! ```text
//! Pointer/RPC Input
//!   └─> AnnotationPointerEvent { candidates: Scene }
//!       └─> handle_pointer_events()
//!           ├─> Pick nearest PickBounds box
//!           ├─> Spawn marker as child of the hit object
//!           ├─> Attach panel (if a template is configured)
//!           └─> AnnotationCreatedEvent ─> RPC notification
//! ```
//!
//! ## Cross-Platform Considerations
//!
//! ### Native Builds
//! - Panels render as bevy UI nodes cloned from the template node
//! - Markers render as unlit disc and halo meshes
//!
//! ### WASM Builds
//! - Panel state is pushed to the web page via `annotation_panels_updated`
//! - Creation and selection are also driven by JSON-RPC 2.0

/// Spatially anchored annotations: picking, marker placement, projection,
/// camera flights and panel lifecycle.
pub mod annotation;
