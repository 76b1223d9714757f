//! Frontend notifications. The web overlay renders panels from these.

use super::panels::{AnnotationPanels, PanelDisplay, PanelState};
use super::state::*;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::prelude::*;
use serde_json::{Value, json};

fn panel_json(id: AnnotationId, panel: &PanelState) -> Value {
    json!({
        "id": id,
        "display": match panel.display {
            PanelDisplay::Block => "block",
            PanelDisplay::None => "none",
        },
        "opacity": panel.opacity,
        "transition_secs": panel.transition_secs,
        "left": panel.position.map(|p| p.x),
        "top": panel.position.map(|p| p.y),
    })
}

/// Snapshot of every annotation, used by `get_annotations`.
pub fn annotations_json(manager: &AnnotationManager, panels: &AnnotationPanels) -> Value {
    let annotations: Vec<Value> = manager
        .annotations()
        .iter()
        .map(|annotation| {
            json!({
                "id": annotation.id(),
                "captured_camera_position": annotation.captured_camera_position().to_array(),
                "screen_position": annotation.screen_position().map(|p| p.to_array()),
                "has_panel": annotation.has_panel(),
            })
        })
        .collect();

    json!({
        "panels_open": panels.is_open(),
        "annotations": annotations,
    })
}

pub fn notify_annotation_created(
    mut created: EventReader<AnnotationCreatedEvent>,
    manager: Res<AnnotationManager>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in created.read() {
        let captured = manager
            .get(event.id)
            .map(|annotation| annotation.captured_camera_position().to_array());
        rpc_interface.send_notification(
            "annotation_created",
            json!({
                "id": event.id,
                "has_panel": event.has_panel,
                "captured_camera_position": captured,
            }),
        );
    }
}

pub fn notify_annotation_flights(
    mut flights: EventReader<AnnotationFlightEvent>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in flights.read() {
        let method = match event.phase {
            FlightPhase::Started => "annotation_flight_started",
            FlightPhase::Finished => "annotation_flight_finished",
        };
        rpc_interface.send_notification(method, json!({ "id": event.id }));
    }
}

/// Push panel state whenever the gate, visibility or offsets change.
pub fn notify_panels_updated(
    panels: Res<AnnotationPanels>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if !panels.is_changed() {
        return;
    }
    let states: Vec<Value> = panels.iter().map(|(id, panel)| panel_json(id, panel)).collect();
    rpc_interface.send_notification(
        "annotation_panels_updated",
        json!({
            "open": panels.is_open(),
            "panels": states,
        }),
    );
}

pub fn notify_diagnostics(
    mut diagnostics: EventReader<AnnotationDiagnostic>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for AnnotationDiagnostic(error) in diagnostics.read() {
        rpc_interface.send_notification(
            "annotation_diagnostic",
            json!({ "message": error.to_string() }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lists_annotations_in_creation_order() {
        let mut manager = AnnotationManager::new(Entity::PLACEHOLDER, Entity::PLACEHOLDER);
        let mut panels = AnnotationPanels::default();
        for n in 0..2 {
            let id = manager.allocate_id();
            manager.push(Annotation::new(
                id,
                Entity::PLACEHOLDER,
                Entity::PLACEHOLDER,
                Vec3::splat(n as f32),
                n == 1,
            ));
        }
        panels.attach(AnnotationId(1), 0.5);

        let snapshot = annotations_json(&manager, &panels);
        assert_eq!(snapshot["panels_open"], json!(true));
        assert_eq!(snapshot["annotations"][0]["id"], json!(0));
        assert_eq!(snapshot["annotations"][1]["has_panel"], json!(true));
        assert_eq!(
            snapshot["annotations"][1]["captured_camera_position"],
            json!([1.0, 1.0, 1.0])
        );
        assert_eq!(snapshot["annotations"][0]["screen_position"], Value::Null);
    }

    #[test]
    fn hidden_panel_serialises_as_none() {
        let mut panels = AnnotationPanels::default();
        panels.attach(AnnotationId(3), 0.5);
        panels.hide_all(std::time::Duration::ZERO);
        panels.tick(std::time::Duration::ZERO);

        let (id, panel) = panels.iter().next().unwrap();
        let value = panel_json(id, panel);
        assert_eq!(value["display"], json!("none"));
        assert_eq!(value["opacity"], json!(0.0));
        assert_eq!(value["left"], Value::Null);
    }
}
