//! JSON-RPC 2.0 bridge between the annotation viewer and its host page.
//!
//! The WASM build runs inside an iframe. The host page drives annotations
//! with requests and renders panels from notifications, exchanged via
//! `postMessage`.
//!
//! ```text
//! Host page (parent window)  <──postMessage──>  Viewer (iframe)
//!        │                                          │
//!        ├─ add_annotation {x, y} (id 1) ─────────> │ AnnotationPointerEvent
//!        │ <──────────────────── {success} (id) ────┤
//!        │ <──── annotation_created (no id) ────────┤
//!        │ <──── annotation_panels_updated ─────────┤ every change of gate,
//!        │                                          │ visibility or offset
//! ```
//!
//! Requests without an `id` still run; they just get no response. Commands
//! are mapped by `parse_annotation_command()` so the method table can be
//! tested without a running app.
//!
//! ## Error Handling
//!
//! Standard JSON-RPC 2.0 error codes:
//! - `-32601`: Method not found
//! - `-32602`: Invalid params (missing coordinates, unknown annotation id)
//! - `-32603`: Internal error (no annotation session)
//!
//! ## Existing Methods
//!
//! ### Annotations
//! - `add_annotation`: Create an annotation under `{x, y}` (logical pixels)
//! - `select_annotation_at`: Select the marker under `{x, y}` and fly to it
//! - `select_annotation`: Fly to annotation `{id}`
//! - `hide_annotation_panels`: Fade out every open panel
//! - `get_annotations`: Ids, captured viewpoints, screen positions and gate
//!
//! ### Notifications
//! - `annotation_created`, `annotation_flight_started`,
//!   `annotation_flight_finished`, `annotation_panels_updated`,
//!   `annotation_diagnostic`, `fps_update`
//!
//! ### Diagnostics
//! - `get_fps`: Retrieve current frame rate

/// JSON-RPC 2.0 bidirectional communication system for React integration.
///
/// Handles request-response patterns, notifications, and WASM message listeners.
pub mod web_rpc;
