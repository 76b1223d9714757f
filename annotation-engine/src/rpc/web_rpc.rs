use crate::tools::annotation::notify::annotations_json;
use crate::tools::annotation::{
    AnnotationId, AnnotationManager, AnnotationPanels, AnnotationPointerEvent, HidePanelsEvent,
    SelectAnnotationEvent,
};
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub result: Option<serde_json::Value>,
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

/// Resource managing bidirectional RPC communication between React and Bevy.
/// Handles both request-response patterns and notification broadcasting.
#[derive(Resource, Default)]
pub struct WebRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl WebRpcInterface {
    /// Send notification to React frontend without expecting response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    /// Notifications queued for the next send.
    pub fn pending_notifications(&self) -> &[RpcNotification] {
        &self.outgoing_notifications
    }

    /// Queue response for transmission to React frontend.
    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Plugin establishing WebRPC communication layer for iframe-based deployment.
pub struct WebRpcPlugin;

impl Plugin for WebRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WebRpcInterface>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain(),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(mut commands: Commands) {
    use std::sync::Arc;
    use std::sync::Mutex;

    // Thread-safe message queue for cross-thread communication.
    let message_queue: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let queue_clone = message_queue.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        // Filter messages to ensure they contain string data.
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message_str: String = data.into();

            // Attempt JSON parsing to validate RPC format before queuing.
            if message_str.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message_str);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {:?}", e);
        }
    }

    // Prevent closure from being dropped by transferring ownership to JS.
    closure.forget();
    commands.insert_resource(MessageQueue(message_queue));
}

/// Resource wrapping thread-safe message queue for WASM event handling.
#[derive(Resource)]
struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

/// Event representing incoming RPC message from React frontend.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

fn process_incoming_messages(
    message_queue: Option<Res<MessageQueue>>,
    mut message_events: EventWriter<IncomingRpcMessage>,
) {
    let Some(queue_res) = message_queue else {
        return;
    };

    let messages = if let Ok(mut queue) = queue_res.0.lock() {
        std::mem::take(&mut *queue)
    } else {
        Vec::new()
    };

    // Write events using the non-deprecated method.
    for message_str in messages {
        message_events.write(IncomingRpcMessage {
            content: message_str,
        });
    }
}

/// Annotation commands reachable over RPC.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationCommand {
    /// Create an annotation under a pointer position (logical pixels).
    Add(Vec2),
    /// Select whichever marker lies under a pointer position.
    SelectAt(Vec2),
    /// Fly to a known annotation.
    Select(AnnotationId),
    HidePanels,
    /// Snapshot of every annotation and the panel gate.
    List,
}

/// Map an RPC request onto an annotation command.
pub fn parse_annotation_command(request: &RpcRequest) -> Result<AnnotationCommand, RpcError> {
    #[derive(Deserialize)]
    struct PointerParams {
        x: f32,
        y: f32,
    }

    #[derive(Deserialize)]
    struct SelectParams {
        id: AnnotationId,
    }

    let pointer = |params: &serde_json::Value| {
        serde_json::from_value::<PointerParams>(params.clone())
            .map(|p| Vec2::new(p.x, p.y))
            .map_err(|_| RpcError::invalid_params("Expected 'x' and 'y' parameters"))
    };

    match request.method.as_str() {
        "add_annotation" => pointer(&request.params).map(AnnotationCommand::Add),
        "select_annotation_at" => pointer(&request.params).map(AnnotationCommand::SelectAt),
        "select_annotation" => serde_json::from_value::<SelectParams>(request.params.clone())
            .map(|p| AnnotationCommand::Select(p.id))
            .map_err(|_| RpcError::invalid_params("Expected 'id' parameter")),
        "hide_annotation_panels" => Ok(AnnotationCommand::HidePanels),
        "get_annotations" => Ok(AnnotationCommand::List),
        _ => Err(RpcError::method_not_found(&request.method)),
    }
}

/// Everything RPC handlers read from or write to the annotation session.
#[derive(SystemParam)]
pub struct AnnotationRpc<'w> {
    manager: Option<Res<'w, AnnotationManager>>,
    panels: Option<Res<'w, AnnotationPanels>>,
    pointer_events: EventWriter<'w, AnnotationPointerEvent>,
    select_events: EventWriter<'w, SelectAnnotationEvent>,
    hide_events: EventWriter<'w, HidePanelsEvent>,
}

impl AnnotationRpc<'_> {
    fn execute(&mut self, command: AnnotationCommand) -> Result<serde_json::Value, RpcError> {
        let (Some(manager), Some(panels)) = (self.manager.as_deref(), self.panels.as_deref())
        else {
            return Err(RpcError::internal_error("No annotation session"));
        };

        match command {
            AnnotationCommand::Add(position) => {
                self.pointer_events
                    .write(AnnotationPointerEvent::create(position));
                Ok(serde_json::json!({ "success": true }))
            }
            AnnotationCommand::SelectAt(position) => {
                self.pointer_events
                    .write(AnnotationPointerEvent::select(position));
                Ok(serde_json::json!({ "success": true }))
            }
            AnnotationCommand::Select(id) => {
                if manager.get(id).is_none() {
                    return Err(RpcError::invalid_params(&format!("Unknown annotation: {}", id)));
                }
                self.select_events.write(SelectAnnotationEvent { id });
                Ok(serde_json::json!({ "success": true, "id": id }))
            }
            AnnotationCommand::HidePanels => {
                self.hide_events.write(HidePanelsEvent);
                Ok(serde_json::json!({ "success": true }))
            }
            AnnotationCommand::List => Ok(annotations_json(manager, panels)),
        }
    }
}

fn handle_rpc_messages(
    mut events: EventReader<IncomingRpcMessage>,
    diagnostics: Res<DiagnosticsStore>,
    mut rpc_interface: ResMut<WebRpcInterface>,
    mut annotations: AnnotationRpc,
) {
    for event in events.read() {
        match serde_json::from_str::<RpcRequest>(&event.content) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, &diagnostics, &mut annotations)
                {
                    rpc_interface.queue_response(response);
                }
            }
            Err(parse_error) => {
                warn!("RPC parse error: {}", parse_error);
                rpc_interface.send_notification(
                    "debug_message",
                    serde_json::json!({
                        "message": format!("Parse error: {}", parse_error)
                    }),
                );
            }
        }
    }
}

/// Handle individual RPC request and generate response based on method.
///
/// Requests without an ID are notifications: they still run, but get no
/// response.
fn handle_rpc_request(
    request: &RpcRequest,
    diagnostics: &DiagnosticsStore,
    annotations: &mut AnnotationRpc,
) -> Option<RpcResponse> {
    let result = match request.method.as_str() {
        "get_fps" => handle_get_fps(diagnostics),
        _ => parse_annotation_command(request).and_then(|command| annotations.execute(command)),
    };

    let id = request.id.clone()?;
    match result {
        Ok(result_value) => Some(RpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        }),
        Err(error) => {
            warn!("RPC {} failed: {}", request.method, error.message);
            Some(create_error_response(id, error.code, &error.message, error.data))
        }
    }
}

/// Handle FPS retrieval with diagnostic system integration.
fn handle_get_fps(diagnostics: &DiagnosticsStore) -> Result<serde_json::Value, RpcError> {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps_diagnostic| fps_diagnostic.smoothed())
        .unwrap_or(0.0) as f32;

    Ok(serde_json::json!({
        "fps": fps
    }))
}

/// Create standardized error response with optional data payload.
fn create_error_response(
    id: serde_json::Value,
    code: i32,
    message: &str,
    data: Option<serde_json::Value>,
) -> RpcResponse {
    RpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(RpcError {
            code,
            message: message.to_string(),
            data,
        }),
        id: Some(id),
    }
}

/// Send queued notifications and responses to React frontend.
fn send_outgoing_messages(mut rpc_interface: ResMut<WebRpcInterface>) {
    // Send notifications first.
    for notification in rpc_interface.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }

    // Send responses second to maintain order.
    for response in rpc_interface.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send serialized message to parent window (React frontend).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {:?}", e);
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                } else {
                    error!("Window object not available");
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {}", e);
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // No-op for non-WASM targets.
        let _ = message;
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::annotation::CandidateSet;

    fn request(method: &str, params: serde_json::Value) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: Some(serde_json::json!(1)),
        }
    }

    #[test]
    fn pointer_commands_carry_position() {
        let add = parse_annotation_command(&request(
            "add_annotation",
            serde_json::json!({ "x": 400.0, "y": 300.5 }),
        ));
        assert_eq!(add, Ok(AnnotationCommand::Add(Vec2::new(400.0, 300.5))));

        let select = parse_annotation_command(&request(
            "select_annotation_at",
            serde_json::json!({ "x": 1, "y": 2 }),
        ));
        assert_eq!(select, Ok(AnnotationCommand::SelectAt(Vec2::new(1.0, 2.0))));
    }

    #[test]
    fn select_by_id() {
        let select = parse_annotation_command(&request(
            "select_annotation",
            serde_json::json!({ "id": 3 }),
        ));
        assert_eq!(select, Ok(AnnotationCommand::Select(AnnotationId(3))));
    }

    #[test]
    fn missing_params_are_invalid() {
        let error = parse_annotation_command(&request(
            "add_annotation",
            serde_json::json!({ "x": 1.0 }),
        ))
        .unwrap_err();
        assert_eq!(error.code, -32602);
    }

    #[test]
    fn unknown_method_is_not_found() {
        let error =
            parse_annotation_command(&request("delete_annotation", serde_json::Value::Null))
                .unwrap_err();
        assert_eq!(error.code, -32601);
        assert_eq!(error.data, Some(serde_json::json!({ "method": "delete_annotation" })));
    }

    #[test]
    fn parameterless_methods_ignore_params() {
        assert_eq!(
            parse_annotation_command(&request("hide_annotation_panels", serde_json::Value::Null)),
            Ok(AnnotationCommand::HidePanels)
        );
        assert_eq!(
            parse_annotation_command(&request("get_annotations", serde_json::json!({}))),
            Ok(AnnotationCommand::List)
        );
    }

    fn rpc_app(with_session: bool) -> App {
        let mut app = App::new();
        app.init_resource::<WebRpcInterface>()
            .init_resource::<DiagnosticsStore>()
            .add_event::<IncomingRpcMessage>()
            .add_event::<AnnotationPointerEvent>()
            .add_event::<SelectAnnotationEvent>()
            .add_event::<HidePanelsEvent>()
            .add_systems(Update, handle_rpc_messages);
        if with_session {
            app.insert_resource(AnnotationManager::new(Entity::PLACEHOLDER, Entity::PLACEHOLDER))
                .init_resource::<AnnotationPanels>();
        }
        app
    }

    fn deliver(app: &mut App, message: serde_json::Value) {
        app.world_mut().send_event(IncomingRpcMessage {
            content: message.to_string(),
        });
        app.update();
    }

    fn responses(app: &App) -> &[RpcResponse] {
        &app.world().resource::<WebRpcInterface>().outgoing_responses
    }

    fn written<E: Event + Clone>(app: &App) -> Vec<E> {
        let events = app.world().resource::<Events<E>>();
        events.get_cursor().read(events).cloned().collect()
    }

    #[test]
    fn add_request_writes_pointer_event_and_responds() {
        let mut app = rpc_app(true);
        deliver(
            &mut app,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "add_annotation",
                "params": { "x": 120.0, "y": 80.0 },
                "id": 7
            }),
        );

        let pointer = written::<AnnotationPointerEvent>(&app);
        assert_eq!(pointer.len(), 1);
        assert_eq!(pointer[0].position, Vec2::new(120.0, 80.0));
        assert_eq!(pointer[0].candidates, CandidateSet::Scene);

        let responses = responses(&app);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, Some(serde_json::json!(7)));
        assert_eq!(responses[0].result, Some(serde_json::json!({ "success": true })));
        assert!(responses[0].error.is_none());
    }

    #[test]
    fn request_without_id_runs_silently() {
        let mut app = rpc_app(true);
        deliver(
            &mut app,
            serde_json::json!({ "jsonrpc": "2.0", "method": "hide_annotation_panels" }),
        );

        assert_eq!(written::<HidePanelsEvent>(&app).len(), 1);
        assert!(responses(&app).is_empty());
    }

    #[test]
    fn selecting_unknown_annotation_is_invalid() {
        let mut app = rpc_app(true);
        deliver(
            &mut app,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "select_annotation",
                "params": { "id": 42 },
                "id": "a"
            }),
        );

        assert!(written::<SelectAnnotationEvent>(&app).is_empty());
        let responses = responses(&app);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].id, Some(serde_json::json!("a")));
        assert_eq!(responses[0].error.as_ref().map(|e| e.code), Some(-32602));
    }

    #[test]
    fn commands_without_session_are_internal_errors() {
        let mut app = rpc_app(false);
        deliver(
            &mut app,
            serde_json::json!({
                "jsonrpc": "2.0",
                "method": "get_annotations",
                "id": 3
            }),
        );

        let responses = responses(&app);
        assert_eq!(responses.len(), 1);
        assert_eq!(
            responses[0].error,
            Some(RpcError::internal_error("No annotation session"))
        );
    }

    #[test]
    fn get_fps_works_without_session() {
        let mut app = rpc_app(false);
        deliver(
            &mut app,
            serde_json::json!({ "jsonrpc": "2.0", "method": "get_fps", "id": 1 }),
        );

        let responses = responses(&app);
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].result, Some(serde_json::json!({ "fps": 0.0 })));
    }
}
