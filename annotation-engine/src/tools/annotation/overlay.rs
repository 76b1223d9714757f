//! Native panel overlay: renders [`AnnotationPanels`] as bevy UI nodes.
//!
//! Each panel is a clone of the template node tagged with its annotation id.
//! This layer only reads panel state; the gate and timers live in `panels`.

use super::panels::{AnnotationPanels, PanelDisplay};
use super::settings::AnnotationSettings;
use super::state::{AnnotationCreatedEvent, AnnotationId, PanelTemplate};
use bevy::prelude::*;

/// UI node showing one annotation's panel.
#[derive(Component, Debug)]
pub struct AnnotationPanelNode {
    pub id: AnnotationId,
    /// Rendered opacity, eased towards the panel's target opacity.
    alpha: f32,
    /// Template background alpha at full opacity.
    background_alpha: f32,
}

pub struct PanelOverlayPlugin;

impl Plugin for PanelOverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (hide_panel_templates, spawn_panel_nodes, sync_panel_nodes).chain(),
        );
    }
}

/// Templates are never shown themselves.
fn hide_panel_templates(mut templates: Query<&mut Node, Added<PanelTemplate>>) {
    for mut node in &mut templates {
        node.display = Display::None;
    }
}

fn spawn_panel_nodes(
    mut commands: Commands,
    mut created: EventReader<AnnotationCreatedEvent>,
    settings: Res<AnnotationSettings>,
    templates: Query<
        (&Name, &Node, Option<&BackgroundColor>, Option<&Children>),
        With<PanelTemplate>,
    >,
    texts: Query<(&Text, Option<&TextFont>, Option<&TextColor>)>,
) {
    let Some(selector) = settings.template_selector.as_deref() else {
        created.clear();
        return;
    };

    for event in created.read().filter(|event| event.has_panel) {
        let Some((_, template_node, background, children)) =
            templates.iter().find(|(name, ..)| name.as_str() == selector)
        else {
            continue;
        };

        let node = Node {
            display: Display::Flex,
            position_type: PositionType::Absolute,
            ..template_node.clone()
        };
        let background = background.map_or(Color::NONE, |background| background.0);
        let panel = commands
            .spawn((
                node,
                BackgroundColor(background.with_alpha(0.0)),
                AnnotationPanelNode {
                    id: event.id,
                    alpha: 0.0,
                    background_alpha: background.alpha(),
                },
                Name::new(format!("Panel {}", event.id)),
            ))
            .id();

        for child in children.into_iter().flatten() {
            let Ok((text, font, colour)) = texts.get(*child) else {
                continue;
            };
            let text = Text::new(text.0.replace("{id}", &event.id.0.to_string()));
            let label = commands
                .spawn((
                    text,
                    font.cloned().unwrap_or_default(),
                    colour.cloned().unwrap_or_default(),
                ))
                .id();
            commands.entity(panel).add_child(label);
        }
        debug!("Spawned panel node for {}", event.id);
    }
}

/// Apply display, offset and fading opacity to every panel node.
fn sync_panel_nodes(
    time: Res<Time>,
    panels: Option<Res<AnnotationPanels>>,
    mut nodes: Query<(
        &mut AnnotationPanelNode,
        &mut Node,
        &mut BackgroundColor,
        Option<&Children>,
    )>,
    mut text_colours: Query<&mut TextColor>,
) {
    let Some(panels) = panels else {
        return;
    };

    for (mut panel_node, mut node, mut background, children) in &mut nodes {
        let Some(state) = panels.get(panel_node.id) else {
            continue;
        };

        let display = match state.display {
            PanelDisplay::Block => Display::Flex,
            PanelDisplay::None => Display::None,
        };
        if node.display != display {
            node.display = display;
        }
        if let Some(position) = state.position {
            let (left, top) = (Val::Px(position.x as f32), Val::Px(position.y as f32));
            if node.left != left || node.top != top {
                node.left = left;
                node.top = top;
            }
        }

        let step = if state.transition_secs > 0.0 {
            time.delta_secs() / state.transition_secs
        } else {
            1.0
        };
        let alpha = move_towards(panel_node.alpha, state.opacity, step);
        if alpha == panel_node.alpha {
            continue;
        }
        panel_node.alpha = alpha;
        background.0.set_alpha(alpha * panel_node.background_alpha);
        for child in children.into_iter().flatten() {
            if let Ok(mut colour) = text_colours.get_mut(*child) {
                colour.0.set_alpha(alpha);
            }
        }
    }
}

fn move_towards(current: f32, target: f32, step: f32) -> f32 {
    if (target - current).abs() <= step {
        target
    } else {
        current + step.copysign(target - current)
    }
}
