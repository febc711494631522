use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use web_sys::{MessageEvent, window};

use crate::customization::pricing::total_price;
use crate::customization::registry::{SelectionChange, SlotRegistry};
use crate::customization::serializer::{build_saved_configuration, rehydrate};
use crate::engine::assets::configuration::SelectedOptionRecord;
use crate::engine::assets::option_catalog::OptionCatalog;
use crate::engine::camera::turntable_camera::TurntableCamera;
use crate::engine::capture::frame_capture::{CaptureRequest, CurrentPreview};
use crate::engine::core::app_state::FrameSet;
use crate::engine::loading::vehicle_loader::{VehicleLoader, VehicleRequest};
use crate::error::StudioError;

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

/// JSON-RPC error structure following specification.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl RpcError {
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

    fn from_studio_error(error: &StudioError) -> Self {
        Self {
            code: -32000,
            message: error.to_string(),
            data: None,
        }
    }
}

/// Resource managing bidirectional RPC traffic between the hosting frontend
/// and the engine. Outgoing messages are queued here and flushed once per
/// frame; incoming raw messages arrive through [`MessageQueue`].
#[derive(Resource, Default)]
pub struct StudioRpcInterface {
    outgoing_notifications: Vec<RpcNotification>,
    outgoing_responses: Vec<RpcResponse>,
}

impl StudioRpcInterface {
    /// Send notification to the frontend without expecting a response.
    pub fn send_notification(&mut self, method: &str, params: serde_json::Value) {
        self.outgoing_notifications.push(RpcNotification {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        });
    }

    fn queue_response(&mut self, response: RpcResponse) {
        self.outgoing_responses.push(response);
    }
}

/// Thread-safe queue of raw incoming messages. Fed by the postMessage
/// listener on wasm32 and by [`MessageQueue::push`] elsewhere (tests, local
/// drivers).
#[derive(Resource, Default)]
pub struct MessageQueue(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

impl MessageQueue {
    pub fn push(&self, raw: String) {
        if let Ok(mut queue) = self.0.lock() {
            queue.push(raw);
        }
    }

    fn drain(&self) -> Vec<String> {
        self.0
            .lock()
            .map(|mut queue| std::mem::take(&mut *queue))
            .unwrap_or_default()
    }
}

/// Event representing one incoming RPC message.
#[derive(Event)]
struct IncomingRpcMessage {
    content: String,
}

/// Plugin establishing the RPC communication layer.
pub struct StudioRpcPlugin;

impl Plugin for StudioRpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StudioRpcInterface>()
            .init_resource::<MessageQueue>()
            .add_event::<IncomingRpcMessage>()
            .add_systems(
                Update,
                (
                    process_incoming_messages,
                    handle_rpc_messages,
                    send_outgoing_messages,
                )
                    .chain()
                    .in_set(FrameSet::Mutate),
            );

        #[cfg(target_arch = "wasm32")]
        app.add_systems(Startup, setup_message_listener);
    }
}

#[cfg(target_arch = "wasm32")]
fn setup_message_listener(queue: Res<MessageQueue>) {
    let queue_clone = queue.0.clone();

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message: String = data.into();
            // Only queue strings that can plausibly be RPC envelopes.
            if message.contains("jsonrpc") {
                if let Ok(mut queue) = queue_clone.lock() {
                    queue.push(message);
                }
            }
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    if let Some(window) = window() {
        if let Err(e) =
            window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            error!("Failed to register message listener: {e:?}");
        }
    }

    // Transfer ownership to JS so the listener outlives this system.
    closure.forget();
}

fn process_incoming_messages(
    queue: Res<MessageQueue>,
    mut messages: EventWriter<IncomingRpcMessage>,
) {
    for content in queue.drain() {
        messages.write(IncomingRpcMessage { content });
    }
}

fn handle_rpc_messages(
    mut messages: EventReader<IncomingRpcMessage>,
    mut rpc: ResMut<StudioRpcInterface>,
    mut registry: ResMut<SlotRegistry>,
    catalog: Option<Res<OptionCatalog>>,
    loader: Res<VehicleLoader>,
    preview: Res<CurrentPreview>,
    mut camera: ResMut<TurntableCamera>,
    mut vehicle_requests: EventWriter<VehicleRequest>,
    mut capture_requests: EventWriter<CaptureRequest>,
) {
    for message in messages.read() {
        let request = match serde_json::from_str::<RpcRequest>(&message.content) {
            Ok(request) => request,
            Err(parse_error) => {
                warn!("Discarding unparseable RPC message: {parse_error}");
                continue;
            }
        };

        // Notifications (no id) get no response.
        let Some(id) = request.id.clone() else {
            continue;
        };

        let catalog = catalog.as_deref();
        let result = match request.method.as_str() {
            "set_vehicle" => handle_set_vehicle(&request.params).map(|vehicle_request| {
                let value = serde_json::json!({
                    "model": vehicle_request.model,
                    "year": vehicle_request.year,
                    "loading": true,
                });
                vehicle_requests.write(vehicle_request);
                value
            }),
            "select_option" => handle_select_option(&request.params, &mut registry, catalog),
            "clear_selections" => handle_clear_selections(&mut registry),
            "get_summary" => handle_get_summary(&registry, catalog, &loader),
            "save_configuration" => {
                handle_save_configuration(&request.params, &registry, catalog, &loader, &preview)
                    .inspect(|record| {
                        rpc.send_notification("configuration_saved", record.clone());
                    })
            }
            "load_configuration" => {
                handle_load_configuration(&request.params, &mut registry, catalog)
            }
            "capture_preview" => {
                capture_requests.write(CaptureRequest);
                Ok(serde_json::json!({ "queued": true }))
            }
            "nudge_rotation" => handle_nudge_rotation(&request.params, &mut camera),
            _ => {
                warn!("Unknown RPC method: {}", request.method);
                rpc.queue_response(RpcResponse {
                    jsonrpc: "2.0".to_string(),
                    result: None,
                    error: Some(RpcError {
                        code: -32601,
                        message: "Method not found".to_string(),
                        data: Some(serde_json::json!({ "method": request.method })),
                    }),
                    id: Some(id),
                });
                continue;
            }
        };

        let response = match result {
            Ok(value) => RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(value),
                error: None,
                id: Some(id),
            },
            Err(error) => RpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(error),
                id: Some(id),
            },
        };
        rpc.queue_response(response);
    }
}

fn handle_set_vehicle(params: &serde_json::Value) -> Result<VehicleRequest, RpcError> {
    #[derive(Deserialize)]
    struct SetVehicleParams {
        model: String,
        year: u16,
    }

    let params = serde_json::from_value::<SetVehicleParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'model' and 'year' parameters"))?;
    if params.model.trim().is_empty() {
        return Err(RpcError::invalid_params("'model' must not be empty"));
    }
    Ok(VehicleRequest {
        model: params.model,
        year: params.year,
    })
}

fn handle_select_option(
    params: &serde_json::Value,
    registry: &mut SlotRegistry,
    catalog: Option<&OptionCatalog>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SelectOptionParams {
        option_id: String,
    }

    let catalog =
        catalog.ok_or_else(|| RpcError::internal_error("Option catalog not loaded yet"))?;
    let params = serde_json::from_value::<SelectOptionParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'option_id' parameter"))?;

    let (slot, change) = registry
        .select_by_id(catalog, &params.option_id)
        .map_err(|error| RpcError::from_studio_error(&error))?;

    Ok(serde_json::json!({
        "slot": slot.label(),
        "change": match change {
            SelectionChange::Selected => "selected",
            SelectionChange::Cleared => "cleared",
        },
        "totalAmount": total_price(registry, catalog),
    }))
}

fn handle_clear_selections(registry: &mut SlotRegistry) -> Result<serde_json::Value, RpcError> {
    registry.clear_all();
    Ok(serde_json::json!({ "cleared": true }))
}

fn handle_get_summary(
    registry: &SlotRegistry,
    catalog: Option<&OptionCatalog>,
    loader: &VehicleLoader,
) -> Result<serde_json::Value, RpcError> {
    let catalog =
        catalog.ok_or_else(|| RpcError::internal_error("Option catalog not loaded yet"))?;

    let selections: Vec<serde_json::Value> = registry
        .selected_options(catalog)
        .into_iter()
        .map(|(slot, option)| {
            serde_json::json!({
                "slot": slot.label(),
                "option": option.id,
                "title": option.title.clone().unwrap_or_else(|| slot.label().to_string()),
                "price": option.price,
                "colorCode": option.colour_code,
            })
        })
        .collect();

    Ok(serde_json::json!({
        "model": loader.identity().map(|id| id.model.clone()),
        "year": loader.identity().map(|id| id.year),
        "selections": selections,
        "totalAmount": total_price(registry, catalog),
    }))
}

fn handle_save_configuration(
    params: &serde_json::Value,
    registry: &SlotRegistry,
    catalog: Option<&OptionCatalog>,
    loader: &VehicleLoader,
    preview: &CurrentPreview,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize, Default)]
    #[serde(rename_all = "camelCase")]
    struct SaveParams {
        #[serde(default)]
        customer_id: Option<String>,
        #[serde(default)]
        notes: Option<String>,
    }

    let catalog =
        catalog.ok_or_else(|| RpcError::internal_error("Option catalog not loaded yet"))?;
    let identity = loader
        .identity()
        .ok_or_else(|| RpcError::invalid_params("No vehicle selected; call set_vehicle first"))?;
    let params = serde_json::from_value::<SaveParams>(params.clone()).unwrap_or_default();

    let configuration = build_saved_configuration(
        registry,
        catalog,
        &identity.model,
        identity.year,
        preview.image.as_ref().map(|image| image.to_data_uri()),
        params.notes,
        params.customer_id,
    );
    serde_json::to_value(&configuration)
        .map_err(|e| RpcError::internal_error(&format!("Failed to serialize configuration: {e}")))
}

fn handle_load_configuration(
    params: &serde_json::Value,
    registry: &mut SlotRegistry,
    catalog: Option<&OptionCatalog>,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct LoadParams {
        selected_options: Vec<SelectedOptionRecord>,
    }

    let catalog =
        catalog.ok_or_else(|| RpcError::internal_error("Option catalog not loaded yet"))?;
    let params = serde_json::from_value::<LoadParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'selectedOptions' record list"))?;

    let report = rehydrate(&params.selected_options, catalog, registry);
    Ok(serde_json::json!({
        "applied": report
            .applied
            .iter()
            .map(|(slot, option)| serde_json::json!({ "slot": slot.label(), "option": option }))
            .collect::<Vec<_>>(),
        "skipped": report
            .skipped
            .iter()
            .map(|skipped| serde_json::json!({
                "option": skipped.option,
                "reason": skipped.reason.to_string(),
            }))
            .collect::<Vec<_>>(),
        "totalAmount": total_price(registry, catalog),
    }))
}

fn handle_nudge_rotation(
    params: &serde_json::Value,
    camera: &mut TurntableCamera,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct NudgeParams {
        direction: f32,
    }

    let params = serde_json::from_value::<NudgeParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'direction' parameter"))?;
    if params.direction == 0.0 {
        return Err(RpcError::invalid_params("'direction' must be non-zero"));
    }
    camera.nudge(params.direction);
    Ok(serde_json::json!({ "spinning": true }))
}

/// Flush queued notifications and responses to the frontend, in that order.
fn send_outgoing_messages(mut rpc: ResMut<StudioRpcInterface>) {
    for notification in rpc.outgoing_notifications.drain(..) {
        send_message_to_parent(&notification);
    }
    for response in rpc.outgoing_responses.drain(..) {
        send_message_to_parent(&response);
    }
}

/// Send a serialized message to the parent window (hosting frontend).
fn send_message_to_parent<T: Serialize>(message: &T) {
    #[cfg(target_arch = "wasm32")]
    {
        match serde_json::to_string(message) {
            Ok(json) => {
                if let Some(window) = window() {
                    if let Some(parent) = window.parent().ok().flatten() {
                        if let Err(e) = parent.post_message(&JsValue::from_str(&json), "*") {
                            error!("Failed to send message to parent: {e:?}");
                        }
                    } else {
                        warn!("No parent window available for message transmission");
                    }
                }
            }
            Err(e) => {
                error!("Failed to serialize message: {e}");
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        // Native builds have no parent frame; traffic stays in the queues for
        // whatever drove them (tests, local tooling).
        let _ = message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customization::registry::test_catalog::catalog;

    #[test]
    fn set_vehicle_requires_a_real_identity() {
        let request =
            handle_set_vehicle(&serde_json::json!({ "model": "Thar", "year": 2023 })).unwrap();
        assert_eq!(request.model, "Thar");
        assert_eq!(request.year, 2023);

        assert!(handle_set_vehicle(&serde_json::json!({ "model": "  ", "year": 2023 })).is_err());
        assert!(handle_set_vehicle(&serde_json::json!({ "year": 2023 })).is_err());
    }

    #[test]
    fn select_option_toggles_and_reports_the_total() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();

        let result = handle_select_option(
            &serde_json::json!({ "option_id": "hood-crimson" }),
            &mut registry,
            Some(&catalog),
        )
        .unwrap();
        assert_eq!(result["change"], "selected");
        assert_eq!(result["slot"], "Hood");
        assert_eq!(result["totalAmount"], 500);

        let result = handle_select_option(
            &serde_json::json!({ "option_id": "hood-crimson" }),
            &mut registry,
            Some(&catalog),
        )
        .unwrap();
        assert_eq!(result["change"], "cleared");
        assert_eq!(result["totalAmount"], 0);
    }

    #[test]
    fn select_option_surfaces_catalog_errors() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();

        let error = handle_select_option(
            &serde_json::json!({ "option_id": "gone" }),
            &mut registry,
            Some(&catalog),
        )
        .unwrap_err();
        assert_eq!(error.code, -32000);

        let error = handle_select_option(
            &serde_json::json!({ "option_id": "hood-crimson" }),
            &mut registry,
            None,
        )
        .unwrap_err();
        assert_eq!(error.code, -32603);
    }

    #[test]
    fn load_configuration_reports_partial_failures() {
        let catalog = catalog();
        let mut registry = SlotRegistry::default();

        let result = handle_load_configuration(
            &serde_json::json!({
                "selectedOptions": [
                    { "option": "X", "title": "Hood" },
                    { "option": "rim-alloy", "title": "Rim", "price": 300 },
                ]
            }),
            &mut registry,
            Some(&catalog),
        )
        .unwrap();

        assert_eq!(result["applied"].as_array().unwrap().len(), 1);
        assert_eq!(result["skipped"].as_array().unwrap().len(), 1);
        assert_eq!(result["skipped"][0]["option"], "X");
        assert_eq!(result["totalAmount"], 300);
    }

    #[test]
    fn nudge_rotation_validates_direction() {
        let mut camera = TurntableCamera::default();
        assert!(
            handle_nudge_rotation(&serde_json::json!({ "direction": 1.0 }), &mut camera).is_ok()
        );
        assert!(camera.spin_velocity() > 0.0);
        assert!(
            handle_nudge_rotation(&serde_json::json!({ "direction": 0.0 }), &mut camera).is_err()
        );
    }
}
