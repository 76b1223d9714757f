//! Demo scene for the annotation viewer binary.

/// Pickable objects, camera, panel template and the annotation session.
pub mod demo_scene;
