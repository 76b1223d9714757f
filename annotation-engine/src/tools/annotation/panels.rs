//! Panel lifecycle: a typed map from annotation id to panel state, plus the
//! single "some panel is open" gate.
//!
//! Nothing here touches UI directly. The overlay and RPC layers read this
//! state and render it.

use super::error::AnnotationError;
use super::settings::AnnotationSettings;
use super::state::{AnnotationDiagnostic, AnnotationId, HidePanelsEvent};
use bevy::prelude::*;
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelDisplay {
    Block,
    None,
}

#[derive(Debug, Clone)]
pub struct PanelState {
    pub display: PanelDisplay,
    pub opacity: f32,
    /// Opacity transition length in seconds, applied by the renderer.
    pub transition_secs: f32,
    /// Top-left offset in logical pixels, written by the projector.
    pub position: Option<IVec2>,
    hide_timer: Option<Timer>,
}

impl PanelState {
    fn visible(transition_secs: f32) -> Self {
        Self {
            display: PanelDisplay::Block,
            opacity: 1.0,
            transition_secs,
            position: None,
            hide_timer: None,
        }
    }

    pub fn is_displayed(&self) -> bool {
        self.display == PanelDisplay::Block
    }

    pub fn hide_pending(&self) -> bool {
        self.hide_timer.is_some()
    }
}

#[derive(Resource, Debug, Default)]
pub struct AnnotationPanels {
    panels: BTreeMap<AnnotationId, PanelState>,
    open: bool,
}

impl AnnotationPanels {
    /// The global gate. Closed on start-up.
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn get(&self, id: AnnotationId) -> Option<&PanelState> {
        self.panels.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AnnotationId, &PanelState)> {
        self.panels.iter().map(|(id, panel)| (*id, panel))
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Register the panel cloned for a new annotation. It starts displayed and
    /// fades in; the gate opens so the projector starts positioning it.
    pub fn attach(&mut self, id: AnnotationId, fade_in_secs: f32) {
        self.panels.insert(id, PanelState::visible(fade_in_secs));
        self.open = true;
    }

    /// Show one annotation's panel at full opacity and open the gate.
    ///
    /// The gate opens even when the panel is missing, so the caller can report
    /// the error without the session state diverging.
    pub fn reveal(&mut self, id: AnnotationId) -> Result<(), AnnotationError> {
        self.open = true;
        let panel = self
            .panels
            .get_mut(&id)
            .ok_or(AnnotationError::MissingPanelForId(id))?;
        panel.display = PanelDisplay::Block;
        panel.opacity = 1.0;
        panel.hide_timer = None;
        Ok(())
    }

    /// Fade every panel out and close the gate. Each panel stops displaying
    /// once `delay` has elapsed. Does nothing while the gate is closed.
    ///
    /// Returns whether anything changed.
    pub fn hide_all(&mut self, delay: Duration) -> bool {
        if !self.open {
            return false;
        }
        for panel in self.panels.values_mut() {
            panel.opacity = 0.0;
            if panel.is_displayed() && panel.hide_timer.is_none() {
                panel.hide_timer = Some(Timer::new(delay, TimerMode::Once));
            }
        }
        self.open = false;
        true
    }

    /// Advance pending hide timers. Returns the ids that stopped displaying.
    pub fn tick(&mut self, delta: Duration) -> Vec<AnnotationId> {
        let mut hidden = Vec::new();
        for (id, panel) in self.panels.iter_mut() {
            let Some(timer) = panel.hide_timer.as_mut() else {
                continue;
            };
            timer.tick(delta);
            if timer.finished() {
                panel.display = PanelDisplay::None;
                panel.hide_timer = None;
                hidden.push(*id);
            }
        }
        hidden
    }

    pub fn has_pending_hides(&self) -> bool {
        self.panels.values().any(PanelState::hide_pending)
    }

    /// Write a projected offset. Returns whether the stored value changed.
    pub(crate) fn set_position(
        &mut self,
        id: AnnotationId,
        position: IVec2,
    ) -> Result<bool, AnnotationError> {
        let panel = self
            .panels
            .get_mut(&id)
            .ok_or(AnnotationError::MissingPanelForId(id))?;
        if panel.position == Some(position) {
            return Ok(false);
        }
        panel.position = Some(position);
        Ok(true)
    }
}

/// "Interaction began" handler.
pub fn hide_panels_on_interaction(
    mut events: EventReader<HidePanelsEvent>,
    settings: Res<AnnotationSettings>,
    mut panels: ResMut<AnnotationPanels>,
) {
    if events.is_empty() {
        return;
    }
    events.clear();

    if panels.hide_all(settings.panel_hide_delay()) {
        info!("Hiding {} annotation panels", panels.len());
    }
}

pub fn tick_panel_timers(time: Res<Time>, mut panels: ResMut<AnnotationPanels>) {
    if !panels.has_pending_hides() {
        return;
    }
    for id in panels.tick(time.delta()) {
        debug!("Panel for {} no longer displayed", id);
    }
}

pub(crate) fn report(diagnostics: &mut EventWriter<AnnotationDiagnostic>, error: AnnotationError) {
    warn!("{}", error);
    diagnostics.write(AnnotationDiagnostic(error));
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(600);

    fn two_open_panels() -> AnnotationPanels {
        let mut panels = AnnotationPanels::default();
        panels.attach(AnnotationId(0), 0.5);
        panels.attach(AnnotationId(1), 0.5);
        panels
    }

    #[test]
    fn gate_starts_closed() {
        let panels = AnnotationPanels::default();
        assert!(!panels.is_open());
        assert!(panels.is_empty());
    }

    #[test]
    fn attach_opens_gate_with_fade_in() {
        let panels = two_open_panels();
        assert!(panels.is_open());
        let panel = panels.get(AnnotationId(1)).unwrap();
        assert!(panel.is_displayed());
        assert_eq!(panel.transition_secs, 0.5);
    }

    #[test]
    fn hide_all_fades_then_stops_displaying() {
        let mut panels = two_open_panels();
        assert!(panels.hide_all(DELAY));
        assert!(!panels.is_open());
        for (_, panel) in panels.iter() {
            assert_eq!(panel.opacity, 0.0);
            assert!(panel.is_displayed());
        }

        assert!(panels.tick(Duration::from_millis(599)).is_empty());
        let hidden = panels.tick(Duration::from_millis(1));
        assert_eq!(hidden, vec![AnnotationId(0), AnnotationId(1)]);
        assert!(panels.iter().all(|(_, p)| !p.is_displayed()));
    }

    #[test]
    fn hide_all_twice_matches_once() {
        let mut once = two_open_panels();
        once.hide_all(DELAY);
        once.tick(DELAY);

        let mut twice = two_open_panels();
        twice.hide_all(DELAY);
        assert!(!twice.hide_all(DELAY));
        twice.tick(DELAY);

        assert_eq!(once.is_open(), twice.is_open());
        for ((_, a), (_, b)) in once.iter().zip(twice.iter()) {
            assert_eq!(a.display, b.display);
            assert_eq!(a.opacity, b.opacity);
        }
    }

    #[test]
    fn reveal_cancels_pending_hide() {
        let mut panels = two_open_panels();
        panels.hide_all(DELAY);
        panels.reveal(AnnotationId(0)).unwrap();
        panels.tick(DELAY);

        assert!(panels.is_open());
        let revealed = panels.get(AnnotationId(0)).unwrap();
        assert!(revealed.is_displayed());
        assert_eq!(revealed.opacity, 1.0);
        assert!(!panels.get(AnnotationId(1)).unwrap().is_displayed());
    }

    #[test]
    fn reveal_of_unknown_panel_reports_but_opens_gate() {
        let mut panels = AnnotationPanels::default();
        assert_eq!(
            panels.reveal(AnnotationId(7)),
            Err(AnnotationError::MissingPanelForId(AnnotationId(7)))
        );
        assert!(panels.is_open());
    }

    #[test]
    fn position_write_reports_changes() {
        let mut panels = two_open_panels();
        assert_eq!(panels.set_position(AnnotationId(0), IVec2::new(4, 5)), Ok(true));
        assert_eq!(panels.set_position(AnnotationId(0), IVec2::new(4, 5)), Ok(false));
        assert!(panels.set_position(AnnotationId(9), IVec2::ZERO).is_err());
    }
}
