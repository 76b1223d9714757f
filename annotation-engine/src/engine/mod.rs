//! Demo viewer around the annotation core: app setup, loading, camera
//! controller, input wiring and scene.

pub mod camera;
pub mod core;
pub mod loading;
pub mod scene;
pub mod systems;
