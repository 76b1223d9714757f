//! Viewport camera for demo scene navigation.
//!
//! Orbits around a focus point and yields to annotation camera flights.

/// Viewport camera resource and orbit controller system.
pub mod viewport_camera;
