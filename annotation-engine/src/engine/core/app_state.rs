use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States, Resource)]
pub enum AppState {
    /// Waiting for `annotation_settings.json`.
    #[default]
    Loading,
    Running,
}

#[derive(Component)]
pub struct FpsText;

#[derive(Event, Debug, Clone, Copy)]
pub struct SettingsReady;

// Final transition to running state
pub fn transition_to_running(
    mut ready: EventReader<SettingsReady>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    if ready.read().last().is_some() {
        info!("→ Settings ready, transitioning to Running state");
        next_state.set(AppState::Running);
    }
}
