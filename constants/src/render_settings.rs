use bevy::color::Color;

/// Inner disc radius in marker-local units (the marker quad is 1x1).
pub const MARKER_DISC_RADIUS: f32 = 0.45;

/// Inner edge of the white rim drawn around the disc.
pub const MARKER_RIM_INNER_RADIUS: f32 = 0.4;

/// Outer halo radius in marker-local units.
pub const MARKER_HALO_RADIUS: f32 = 0.5;

pub const MARKER_DISC_COLOUR: Color = Color::srgb(0.0, 0.0, 0.0);
pub const MARKER_RIM_COLOUR: Color = Color::srgb(1.0, 1.0, 1.0);

/// Halo opacity, matches the translucent outer sprite.
pub const MARKER_HALO_ALPHA: f32 = 0.2;

/// Pushes marker quads towards the camera so they never z-fight their anchor.
pub const MARKER_DEPTH_BIAS: f32 = 8.0;
