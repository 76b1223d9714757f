use crate::engine::core::app_state::SettingsReady;
use crate::tools::annotation::AnnotationSettings;
use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::annotation::SETTINGS_ASSET_PATH;

#[derive(Resource, Default)]
pub struct SettingsLoader {
    handle: Option<Handle<AnnotationSettings>>,
    finished: bool,
}

// Start the loading process
pub fn start_loading(mut settings_loader: ResMut<SettingsLoader>, asset_server: Res<AssetServer>) {
    info!("Loading annotation settings from: {}", SETTINGS_ASSET_PATH);
    settings_loader.handle = Some(asset_server.load(SETTINGS_ASSET_PATH));
}

/// Install the loaded settings, or keep the defaults when the file is missing
/// or malformed.
pub fn load_settings_system(
    mut settings_loader: ResMut<SettingsLoader>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    settings_assets: Res<Assets<AnnotationSettings>>,
    mut ready: EventWriter<SettingsReady>,
) {
    if settings_loader.finished {
        return;
    }
    let Some(handle) = settings_loader.handle.clone() else {
        return;
    };

    if let Some(settings) = settings_assets.get(&handle) {
        info!("✓ Annotation settings loaded: {:?}", settings);
        commands.insert_resource(settings.clone());
    } else if let Some(LoadState::Failed(error)) = asset_server.get_load_state(&handle) {
        warn!("Annotation settings unavailable, using defaults: {}", error);
    } else {
        return;
    }

    settings_loader.finished = true;
    ready.write(SettingsReady);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::core::app_state::{AppState, transition_to_running};
    use bevy::state::app::StatesPlugin;
    use bevy_common_assets::json::JsonAssetPlugin;
    use std::time::Duration;

    fn loading_app(asset_root: &str) -> App {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            AssetPlugin {
                file_path: asset_root.to_string(),
                ..default()
            },
            StatesPlugin,
            JsonAssetPlugin::<AnnotationSettings>::new(&["json"]),
        ))
        .init_state::<AppState>()
        .init_resource::<SettingsLoader>()
        .add_event::<SettingsReady>()
        .add_systems(Startup, start_loading)
        .add_systems(
            Update,
            (load_settings_system, transition_to_running)
                .chain()
                .run_if(in_state(AppState::Loading)),
        );
        app
    }

    /// Pump frames until the app leaves `Loading`; asset IO runs on task pools.
    fn run_until_running(app: &mut App) {
        for _ in 0..500 {
            app.update();
            if *app.world().resource::<State<AppState>>().get() == AppState::Running {
                return;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        panic!("settings never finished loading");
    }

    #[test]
    fn missing_file_keeps_defaults_and_starts() {
        let mut app = loading_app("no-such-asset-dir");
        app.init_resource::<AnnotationSettings>();

        run_until_running(&mut app);

        assert!(app.world().resource::<SettingsLoader>().finished);
        let ready = app.world().resource::<Events<SettingsReady>>();
        assert_eq!(ready.get_cursor().read(ready).count(), 1);
        assert_eq!(
            *app.world().resource::<AnnotationSettings>(),
            AnnotationSettings::default()
        );
    }

    #[test]
    fn bundled_settings_are_installed() {
        let mut app = loading_app("assets");
        app.insert_resource(AnnotationSettings::without_panels());

        run_until_running(&mut app);

        // The bundled file enables panels, so it replaced the resource.
        assert_eq!(
            *app.world().resource::<AnnotationSettings>(),
            AnnotationSettings::default()
        );
    }
}
