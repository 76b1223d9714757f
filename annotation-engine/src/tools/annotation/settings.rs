use bevy::prelude::*;
use constants::annotation::{
    DEFAULT_TEMPLATE_SELECTOR, DOUBLE_CLICK_MS, FLIGHT_DURATION_MS, MARKER_SCENE_DIVISOR,
    PANEL_FADE_IN_SECS, PANEL_HIDE_DELAY_MS, REVEAL_DELAY_MS,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What happens when a marker is selected while a flight is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightOverlap {
    /// The new selection replaces the running flight and any pending reveal.
    #[default]
    Cancel,
    /// Selections fly one after another.
    Queue,
}

/// Tunable annotation behaviour, loadable from `annotation_settings.json`.
/// Missing fields fall back to the workspace constants.
#[derive(Resource, Asset, TypePath, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationSettings {
    /// Name of the panel template entity; `None` disables panels.
    pub template_selector: Option<String>,
    pub marker_scene_divisor: f32,
    pub flight_duration_ms: u64,
    pub reveal_delay_ms: u64,
    pub panel_hide_delay_ms: u64,
    pub panel_fade_in_secs: f32,
    pub double_click_ms: u64,
    pub flight_overlap: FlightOverlap,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            template_selector: Some(DEFAULT_TEMPLATE_SELECTOR.to_string()),
            marker_scene_divisor: MARKER_SCENE_DIVISOR,
            flight_duration_ms: FLIGHT_DURATION_MS,
            reveal_delay_ms: REVEAL_DELAY_MS,
            panel_hide_delay_ms: PANEL_HIDE_DELAY_MS,
            panel_fade_in_secs: PANEL_FADE_IN_SECS,
            double_click_ms: DOUBLE_CLICK_MS,
            flight_overlap: FlightOverlap::Cancel,
        }
    }
}

impl AnnotationSettings {
    /// Settings with template panels switched off.
    pub fn without_panels() -> Self {
        Self {
            template_selector: None,
            ..default()
        }
    }

    pub fn panels_enabled(&self) -> bool {
        self.template_selector.is_some()
    }

    pub fn flight_duration(&self) -> Duration {
        Duration::from_millis(self.flight_duration_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn panel_hide_delay(&self) -> Duration {
        Duration::from_millis(self.panel_hide_delay_ms)
    }

    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: AnnotationSettings =
            serde_json::from_str(r#"{ "flight_duration_ms": 250, "flight_overlap": "queue" }"#)
                .unwrap();

        assert_eq!(settings.flight_duration(), Duration::from_millis(250));
        assert_eq!(settings.flight_overlap, FlightOverlap::Queue);
        assert_eq!(settings.marker_scene_divisor, MARKER_SCENE_DIVISOR);
        assert_eq!(
            settings.template_selector.as_deref(),
            Some(DEFAULT_TEMPLATE_SELECTOR)
        );
    }

    #[test]
    fn null_selector_disables_panels() {
        let settings: AnnotationSettings =
            serde_json::from_str(r#"{ "template_selector": null }"#).unwrap();
        assert!(!settings.panels_enabled());
        assert_eq!(settings, AnnotationSettings::without_panels());
    }
}
