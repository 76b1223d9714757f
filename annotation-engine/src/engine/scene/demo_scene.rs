use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::tools::annotation::{AnnotationManager, PanelTemplate, PickBounds};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::annotation::DEFAULT_TEMPLATE_SELECTOR;

/// Rotates an object about Y so markers visibly ride along with it.
#[derive(Component, Debug)]
pub struct Spin {
    pub radians_per_sec: f32,
}

struct DemoObject {
    name: &'static str,
    size: Vec3,
    translation: Vec3,
    colour: Color,
    spin: Option<f32>,
}

const DEMO_OBJECTS: [DemoObject; 4] = [
    DemoObject {
        name: "Ground",
        size: Vec3::new(24.0, 0.2, 24.0),
        translation: Vec3::new(0.0, -0.1, 0.0),
        colour: Color::srgb(0.35, 0.38, 0.35),
        spin: None,
    },
    DemoObject {
        name: "Tower",
        size: Vec3::new(2.0, 6.0, 2.0),
        translation: Vec3::new(-4.0, 3.0, -2.0),
        colour: Color::srgb(0.72, 0.55, 0.4),
        spin: None,
    },
    DemoObject {
        name: "Block",
        size: Vec3::new(4.0, 2.0, 3.0),
        translation: Vec3::new(3.0, 1.0, 1.0),
        colour: Color::srgb(0.45, 0.55, 0.75),
        spin: None,
    },
    DemoObject {
        name: "Turntable",
        size: Vec3::new(2.5, 1.0, 2.5),
        translation: Vec3::new(0.0, 0.5, 5.0),
        colour: Color::srgb(0.8, 0.75, 0.35),
        spin: Some(0.4),
    },
];

pub fn spawn_demo_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    windows: Query<Entity, With<PrimaryWindow>>,
) {
    for object in &DEMO_OBJECTS {
        let mut entity = commands.spawn((
            Mesh3d(meshes.add(Cuboid::from_size(object.size))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: object.colour,
                perceptual_roughness: 0.9,
                ..default()
            })),
            Transform::from_translation(object.translation),
            PickBounds(object.size),
            Name::new(object.name),
        ));
        if let Some(radians_per_sec) = object.spin {
            entity.insert(Spin { radians_per_sec });
        }
    }

    let camera = commands
        .spawn((
            Camera3d::default(),
            Transform::from_xyz(-6.0, 9.0, 16.0).looking_at(Vec3::ZERO, Vec3::Y),
        ))
        .id();
    commands.insert_resource(ViewportCamera::default());

    spawn_panel_template(&mut commands);

    let Ok(window) = windows.single() else {
        warn!("No primary window, annotations disabled");
        return;
    };
    commands.insert_resource(AnnotationManager::new(camera, window));
}

/// The node every annotation panel is cloned from. `{id}` in its text is
/// replaced with the annotation number.
fn spawn_panel_template(commands: &mut Commands) {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                padding: UiRect::all(Val::Px(8.0)),
                margin: UiRect {
                    left: Val::Px(14.0),
                    top: Val::Px(-14.0),
                    ..default()
                },
                max_width: Val::Px(220.0),
                ..default()
            },
            BackgroundColor(Color::srgba(0.05, 0.05, 0.08, 0.85)),
            Name::new(DEFAULT_TEMPLATE_SELECTOR),
            PanelTemplate,
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Annotation {id}"),
                TextFont {
                    font_size: 14.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

pub fn spin_objects(time: Res<Time>, mut objects: Query<(&mut Transform, &Spin)>) {
    for (mut transform, spin) in &mut objects {
        transform.rotate_y(spin.radians_per_sec * time.delta_secs());
    }
}
