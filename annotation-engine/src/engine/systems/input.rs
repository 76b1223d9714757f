//! Native pointer wiring for the annotation manager.
//!
//! Left click selects a marker, left double click creates an annotation, and
//! right or middle press or the mouse wheel count as "interaction began".

use crate::tools::annotation::{AnnotationPointerEvent, AnnotationSettings, HidePanelsEvent};
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::annotation::DOUBLE_CLICK_SLOP_PX;
use std::time::Duration;

/// Double click detection from successive left presses.
#[derive(Resource, Debug, Default)]
pub struct ClickTracker {
    last_press: Option<(Duration, Vec2)>,
}

impl ClickTracker {
    /// Record a press. Returns true when it completes a double click; the
    /// press after a double click starts a new sequence.
    pub fn press(&mut self, now: Duration, position: Vec2, window: Duration) -> bool {
        let is_double = self.last_press.is_some_and(|(at, last)| {
            now.saturating_sub(at) <= window && last.distance(position) <= DOUBLE_CLICK_SLOP_PX
        });
        self.last_press = if is_double { None } else { Some((now, position)) };
        is_double
    }
}

pub fn annotation_pointer_input(
    time: Res<Time>,
    settings: Res<AnnotationSettings>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut scroll_events: EventReader<MouseWheel>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut clicks: ResMut<ClickTracker>,
    mut pointer_events: EventWriter<AnnotationPointerEvent>,
    mut hide_events: EventWriter<HidePanelsEvent>,
) {
    let scrolled = scroll_events.read().count() > 0;
    if scrolled || mouse_button.any_just_pressed([MouseButton::Right, MouseButton::Middle]) {
        hide_events.write(HidePanelsEvent);
    }

    if !mouse_button.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    pointer_events.write(AnnotationPointerEvent::select(cursor));
    if clicks.press(time.elapsed(), cursor, settings.double_click_window()) {
        pointer_events.write(AnnotationPointerEvent::create(cursor));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn quick_second_press_is_double_click() {
        let mut clicks = ClickTracker::default();
        assert!(!clicks.press(Duration::from_millis(1000), Vec2::new(10.0, 10.0), WINDOW));
        assert!(clicks.press(Duration::from_millis(1200), Vec2::new(11.0, 10.0), WINDOW));
    }

    #[test]
    fn slow_or_distant_presses_are_single_clicks() {
        let mut clicks = ClickTracker::default();
        clicks.press(Duration::from_millis(0), Vec2::ZERO, WINDOW);
        assert!(!clicks.press(Duration::from_millis(400), Vec2::ZERO, WINDOW));
        assert!(!clicks.press(Duration::from_millis(500), Vec2::new(50.0, 0.0), WINDOW));
    }

    #[test]
    fn triple_click_is_one_double_click() {
        let mut clicks = ClickTracker::default();
        clicks.press(Duration::from_millis(0), Vec2::ZERO, WINDOW);
        assert!(clicks.press(Duration::from_millis(100), Vec2::ZERO, WINDOW));
        assert!(!clicks.press(Duration::from_millis(200), Vec2::ZERO, WINDOW));
    }
}
