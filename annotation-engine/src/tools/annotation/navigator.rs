use super::panels::{AnnotationPanels, report};
use super::settings::{AnnotationSettings, FlightOverlap};
use super::state::*;
use bevy::math::curve::{Curve, EaseFunction};
use bevy::prelude::*;
use std::collections::VecDeque;
use std::time::Duration;

/// One eased camera move toward an annotation's captured viewpoint.
#[derive(Debug, Clone)]
pub struct CameraFlight {
    pub id: AnnotationId,
    pub start: Vec3,
    pub end: Vec3,
    duration: Duration,
    elapsed: Duration,
}

impl CameraFlight {
    pub fn new(id: AnnotationId, start: Vec3, end: Vec3, duration: Duration) -> Self {
        Self {
            id,
            start,
            end,
            duration,
            elapsed: Duration::ZERO,
        }
    }

    /// Linear progress in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Eased position. Exactly `end` once finished.
    pub fn position(&self) -> Vec3 {
        if self.is_finished() {
            return self.end;
        }
        let t = EaseFunction::QuadraticInOut.sample_clamped(self.progress());
        self.start.lerp(self.end, t)
    }

    pub fn advance(&mut self, delta: Duration) -> Vec3 {
        self.elapsed = (self.elapsed + delta).min(self.duration);
        self.position()
    }
}

/// Navigator state: the active flight, queued selections and panel reveals
/// waiting for the camera to settle.
#[derive(Resource, Debug, Default)]
pub struct CameraFlights {
    active: Option<CameraFlight>,
    queue: VecDeque<AnnotationId>,
    pending_reveals: Vec<(AnnotationId, Timer)>,
    /// Set when a flight starts; its clock begins on the following frame.
    just_started: bool,
}

impl CameraFlights {
    pub fn active(&self) -> Option<&CameraFlight> {
        self.active.as_ref()
    }

    pub fn is_flying(&self) -> bool {
        self.active.is_some()
    }

    pub fn queued(&self) -> impl Iterator<Item = AnnotationId> + '_ {
        self.queue.iter().copied()
    }

    pub fn has_pending_reveal(&self) -> bool {
        !self.pending_reveals.is_empty()
    }

    /// Record a selection. `Cancel` drops the running flight, anything queued
    /// and any pending reveal; `Queue` waits for the running flight.
    pub fn request(&mut self, id: AnnotationId, overlap: FlightOverlap) {
        if overlap == FlightOverlap::Cancel {
            if let Some(flight) = self.active.take() {
                debug!("Cancelled flight to {}", flight.id);
            }
            self.queue.clear();
            self.pending_reveals.clear();
        }
        self.queue.push_back(id);
    }

    /// Start the next queued flight from `from` if none is running.
    fn start_next(
        &mut self,
        from: Vec3,
        manager: &AnnotationManager,
        duration: Duration,
    ) -> Option<AnnotationId> {
        if self.active.is_some() {
            return None;
        }
        while let Some(id) = self.queue.pop_front() {
            let Some(annotation) = manager.get(id) else {
                warn!("Cannot fly to unknown {}", id);
                continue;
            };
            let end = annotation.captured_camera_position();
            info!("Flying to {} ({} -> {})", id, from, end);
            self.active = Some(CameraFlight::new(id, from, end, duration));
            self.just_started = true;
            return Some(id);
        }
        None
    }

    fn finish(&mut self, reveal_delay: Duration) -> Option<AnnotationId> {
        let flight = self.active.take()?;
        self.pending_reveals
            .push((flight.id, Timer::new(reveal_delay, TimerMode::Once)));
        Some(flight.id)
    }

    fn tick_reveals(&mut self, delta: Duration) -> Vec<AnnotationId> {
        let mut due = Vec::new();
        self.pending_reveals.retain_mut(|(id, timer)| {
            timer.tick(delta);
            if timer.finished() {
                due.push(*id);
                false
            } else {
                true
            }
        });
        due
    }
}

pub fn begin_camera_flights(
    mut selections: EventReader<SelectAnnotationEvent>,
    manager: Res<AnnotationManager>,
    settings: Res<AnnotationSettings>,
    mut flights: ResMut<CameraFlights>,
    cameras: Query<&Transform>,
    mut flight_events: EventWriter<AnnotationFlightEvent>,
) {
    for selection in selections.read() {
        flights.request(selection.id, settings.flight_overlap);
    }

    if flights.is_flying() || flights.queue.is_empty() {
        return;
    }
    let Ok(camera) = cameras.get(manager.camera()) else {
        return;
    };
    if let Some(id) = flights.start_next(camera.translation, &manager, settings.flight_duration()) {
        flight_events.write(AnnotationFlightEvent {
            id,
            phase: FlightPhase::Started,
        });
    }
}

/// Step the active flight and fire reveals whose delay has elapsed.
///
/// A flight started this frame takes a zero step, so its first frame sits on
/// the start position (zero-duration flights still land immediately).
#[allow(clippy::too_many_arguments)]
pub fn advance_camera_flights(
    time: Res<Time>,
    manager: Res<AnnotationManager>,
    settings: Res<AnnotationSettings>,
    mut flights: ResMut<CameraFlights>,
    mut panels: ResMut<AnnotationPanels>,
    mut cameras: Query<&mut Transform>,
    mut flight_events: EventWriter<AnnotationFlightEvent>,
    mut diagnostics: EventWriter<AnnotationDiagnostic>,
) {
    let delta = time.delta();

    for id in flights.tick_reveals(delta) {
        if !settings.panels_enabled() {
            continue;
        }
        match panels.reveal(id) {
            Ok(()) => info!("Revealed panel for {}", id),
            Err(error) => report(&mut diagnostics, error),
        }
    }

    let step = if std::mem::take(&mut flights.just_started) {
        Duration::ZERO
    } else {
        delta
    };
    let Some(flight) = flights.active.as_mut() else {
        return;
    };
    let Ok(mut camera) = cameras.get_mut(manager.camera()) else {
        return;
    };
    camera.translation = flight.advance(step);
    if !flight.is_finished() {
        return;
    }

    if let Some(id) = flights.finish(settings.reveal_delay()) {
        flight_events.write(AnnotationFlightEvent {
            id,
            phase: FlightPhase::Finished,
        });
    }
    if let Some(id) = flights.start_next(camera.translation, &manager, settings.flight_duration()) {
        flight_events.write(AnnotationFlightEvent {
            id,
            phase: FlightPhase::Started,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_millis(1000);

    fn flight() -> CameraFlight {
        CameraFlight::new(AnnotationId(0), Vec3::ZERO, Vec3::new(10.0, -4.0, 2.5), SECOND)
    }

    #[test]
    fn zero_duration_lands_exactly() {
        let end = Vec3::new(0.1, 0.2, 0.3);
        let mut flight = CameraFlight::new(AnnotationId(0), Vec3::splat(7.0), end, Duration::ZERO);
        assert_eq!(flight.advance(Duration::ZERO), end);
        assert!(flight.is_finished());
    }

    #[test]
    fn quadratic_ease_is_symmetric() {
        let mut f = flight();
        let quarter = f.advance(Duration::from_millis(250));
        // Quadratic in-out: 2t^2 for t < 0.5.
        assert!(quarter.abs_diff_eq(f.end * 0.125, 1e-4));

        let half = f.advance(Duration::from_millis(250));
        assert!(half.abs_diff_eq(f.end * 0.5, 1e-4));

        let three_quarters = f.advance(Duration::from_millis(250));
        assert!(three_quarters.abs_diff_eq(f.end * 0.875, 1e-4));
    }

    #[test]
    fn overshooting_clamps_to_end() {
        let mut f = flight();
        f.advance(Duration::from_millis(600));
        assert_eq!(f.advance(Duration::from_millis(600)), f.end);
        assert_eq!(f.progress(), 1.0);
    }

    #[test]
    fn cancel_replaces_queue_and_reveals() {
        let mut flights = CameraFlights::default();
        flights.active = Some(flight());
        flights
            .pending_reveals
            .push((AnnotationId(5), Timer::new(SECOND, TimerMode::Once)));

        flights.request(AnnotationId(1), FlightOverlap::Cancel);

        assert!(!flights.is_flying());
        assert!(!flights.has_pending_reveal());
        assert_eq!(flights.queued().collect::<Vec<_>>(), vec![AnnotationId(1)]);
    }

    #[test]
    fn queue_waits_for_running_flight() {
        let mut flights = CameraFlights::default();
        flights.active = Some(flight());
        flights.request(AnnotationId(1), FlightOverlap::Queue);
        flights.request(AnnotationId(2), FlightOverlap::Queue);

        assert!(flights.is_flying());
        assert_eq!(
            flights.queued().collect::<Vec<_>>(),
            vec![AnnotationId(1), AnnotationId(2)]
        );
    }

    #[test]
    fn reveal_fires_after_delay() {
        let mut flights = CameraFlights::default();
        flights.active = Some(flight());
        assert_eq!(flights.finish(Duration::from_millis(100)), Some(AnnotationId(0)));

        assert!(flights.tick_reveals(Duration::from_millis(50)).is_empty());
        assert_eq!(
            flights.tick_reveals(Duration::from_millis(50)),
            vec![AnnotationId(0)]
        );
        assert!(!flights.has_pending_reveal());
    }
}
