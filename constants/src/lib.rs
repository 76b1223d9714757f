/// Behavioural defaults for annotation picking, flights and panel timing.
pub mod annotation;

/// Marker billboard appearance.
pub mod render_settings;
