use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

// Crate engine modules
use crate::engine::camera::viewport_camera::camera_controller;
use crate::engine::core::app_state::{AppState, FpsText, SettingsReady, transition_to_running};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::settings_loader::{SettingsLoader, load_settings_system, start_loading};
use crate::engine::scene::demo_scene::{spawn_demo_scene, spin_objects};
use crate::engine::systems::fps_tracking::{fps_notification_system, fps_text_update_system};
use crate::engine::systems::input::{ClickTracker, annotation_pointer_input};
// Crate tools modules
use crate::tools::annotation::overlay::PanelOverlayPlugin;
use crate::tools::annotation::visuals::MarkerVisualsPlugin;
use crate::tools::annotation::{AnnotationPlugin, AnnotationSet, AnnotationSettings};
// Create Web RPC modules
use crate::rpc::web_rpc::WebRpcPlugin;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers AnnotationSettings as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<AnnotationSettings>::new(&["json"]))
        .add_plugins(WebRpcPlugin)
        .add_plugins(AnnotationPlugin)
        .add_plugins(MarkerVisualsPlugin)
        .add_plugins(PanelOverlayPlugin);

    app.init_resource::<SettingsLoader>()
        .init_resource::<ClickTracker>()
        .add_event::<SettingsReady>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, spawn_demo_scene, start_loading).chain())
        .add_systems(
            Update,
            (load_settings_system, transition_to_running)
                .chain()
                .run_if(in_state(AppState::Loading)),
        );

    // Input feeds the annotation systems, the camera controller reads the
    // navigator's result of the same frame.
    app.add_systems(
        Update,
        (
            annotation_pointer_input.before(AnnotationSet::Interaction),
            camera_controller.after(AnnotationSet::Interaction),
            spin_objects,
            fps_notification_system,
        )
            .run_if(in_state(AppState::Running)),
    );

    // Add fps_text_update_system only for native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(Update, fps_text_update_system);
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    let log_config = LogPlugin {
        filter: "wgpu=error,naga=warn,annotation_engine=debug".into(),
        ..default()
    };

    DefaultPlugins
        .set(window_config)
        .set(asset_config)
        .set(log_config)
}
