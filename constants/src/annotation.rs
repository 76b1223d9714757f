/// Markers are sized to the largest scene dimension divided by this value.
pub const MARKER_SCENE_DIVISOR: f32 = 80.0;

/// Duration of the camera flight towards a selected annotation (milliseconds).
pub const FLIGHT_DURATION_MS: u64 = 1000;

/// Delay between flight completion and panel reveal (milliseconds).
pub const REVEAL_DELAY_MS: u64 = 100;

/// Delay between a panel fading out and it being removed from layout (milliseconds).
pub const PANEL_HIDE_DELAY_MS: u64 = 600;

/// Opacity transition applied to freshly cloned panels (seconds).
pub const PANEL_FADE_IN_SECS: f32 = 0.5;

/// Maximum gap between two presses that still counts as a double click (milliseconds).
pub const DOUBLE_CLICK_MS: u64 = 300;

/// Maximum cursor travel between the presses of a double click (logical pixels).
pub const DOUBLE_CLICK_SLOP_PX: f32 = 4.0;

/// Name of the UI entity cloned for every annotation panel.
pub const DEFAULT_TEMPLATE_SELECTOR: &str = "annotation";

/// Settings asset, relative to the asset root.
pub const SETTINGS_ASSET_PATH: &str = "annotation_settings.json";
