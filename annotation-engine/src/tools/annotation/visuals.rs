//! Native marker rendering: an opaque disc with a light rim, plus a faint
//! halo child. Markers are unit sized; placement scales them.

use super::state::AnnotationMarker;
use bevy::prelude::*;
use constants::render_settings::{
    MARKER_DEPTH_BIAS, MARKER_DISC_COLOUR, MARKER_DISC_RADIUS, MARKER_HALO_ALPHA,
    MARKER_HALO_RADIUS, MARKER_RIM_COLOUR, MARKER_RIM_INNER_RADIUS,
};

/// Mesh and material handles shared by every marker.
#[derive(Resource)]
pub struct MarkerAssets {
    disc: Handle<Mesh>,
    rim: Handle<Mesh>,
    halo: Handle<Mesh>,
    disc_material: Handle<StandardMaterial>,
    rim_material: Handle<StandardMaterial>,
    halo_material: Handle<StandardMaterial>,
}

pub struct MarkerVisualsPlugin;

impl Plugin for MarkerVisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, create_marker_assets)
            .add_systems(
                Update,
                attach_marker_meshes.run_if(resource_exists::<MarkerAssets>),
            );
    }
}

fn create_marker_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let flat = |colour: Color, alpha_mode: AlphaMode, depth_bias: f32| StandardMaterial {
        base_color: colour,
        unlit: true,
        double_sided: true,
        cull_mode: None,
        alpha_mode,
        depth_bias,
        ..default()
    };

    commands.insert_resource(MarkerAssets {
        disc: meshes.add(Circle::new(MARKER_DISC_RADIUS)),
        rim: meshes.add(Annulus::new(MARKER_RIM_INNER_RADIUS, MARKER_DISC_RADIUS)),
        halo: meshes.add(Circle::new(MARKER_HALO_RADIUS)),
        disc_material: materials.add(flat(MARKER_DISC_COLOUR, AlphaMode::Opaque, 0.0)),
        rim_material: materials.add(flat(MARKER_RIM_COLOUR, AlphaMode::Opaque, 1.0)),
        // Pulled towards the camera so it still shows faintly behind nearby geometry.
        halo_material: materials.add(flat(
            MARKER_RIM_COLOUR.with_alpha(MARKER_HALO_ALPHA),
            AlphaMode::Blend,
            MARKER_DEPTH_BIAS,
        )),
    });
}

fn attach_marker_meshes(
    mut commands: Commands,
    assets: Res<MarkerAssets>,
    markers: Query<(Entity, &AnnotationMarker), Added<AnnotationMarker>>,
) {
    for (entity, marker) in &markers {
        debug!("Attaching marker meshes for {}", marker.id);
        commands.entity(entity).with_children(|parent| {
            parent.spawn((
                Mesh3d(assets.disc.clone()),
                MeshMaterial3d(assets.disc_material.clone()),
                Transform::default(),
            ));
            parent.spawn((
                Mesh3d(assets.rim.clone()),
                MeshMaterial3d(assets.rim_material.clone()),
                Transform::from_xyz(0.0, 0.0, 0.001),
            ));
            parent.spawn((
                Mesh3d(assets.halo.clone()),
                MeshMaterial3d(assets.halo_material.clone()),
                Transform::from_xyz(0.0, 0.0, -0.001),
            ));
        });
    }
}
