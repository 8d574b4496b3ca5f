//! Wires the Tool Surface into an MCP server speaking the protocol over
//! stdio, using the `rmcp` crate's `#[tool]` macro. This is the one module
//! with no direct precedent in the corpus (the teacher crate exposes its
//! RPC surface as a Rust library, not an MCP server), so the wiring here is
//! plain translation: one `#[tool]` method per Tool Surface operation,
//! `serde_json` for the result payload, `BridgeError::kind()` for the
//! stable error envelope (spec §4.6/§7).

use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{tool, Error as McpError, ServerHandler};

use crate::transport::ble::BleTransport;
use crate::tools::ToolSurface;
use crate::BridgeError;

/// The live MCP server, backed by a real `btleplug` transport.
#[derive(Clone)]
pub struct Thingy52Server {
    tools: ToolSurface<BleTransport>,
}

impl Thingy52Server {
    pub fn new(tools: ToolSurface<BleTransport>) -> Self {
        Self { tools }
    }
}

/// Renders a `BridgeError` as the MCP error envelope `{error: {kind, message}}`
/// (spec §4.6), rather than as a protocol-level tool-call failure: a
/// `NotConnected` or `InvalidArgument` is a normal, structured tool result,
/// not a server fault.
fn bridge_result<R: serde::Serialize>(result: Result<R, BridgeError>) -> Result<CallToolResult, McpError> {
    let payload = match result {
        Ok(value) => serde_json::json!({ "ok": true, "result": value }),
        Err(err) => serde_json::json!({
            "ok": false,
            "error": { "kind": err.kind(), "message": err.to_string() },
        }),
    };
    let text = serde_json::to_string(&payload)
        .unwrap_or_else(|_| r#"{"ok":false,"error":{"kind":"Internal","message":"failed to encode result"}}"#.to_string());
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

#[tool(tool_box)]
impl Thingy52Server {
    #[tool(description = "Scan for advertising Thingy:52 peripherals")]
    async fn scan_devices(
        &self,
        #[tool(param)]
        #[schemars(description = "scan duration in seconds, 1..60, default 10")]
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.scan_devices(timeout_secs).await)
    }

    #[tool(description = "Connect to a Thingy:52 by BLE address")]
    async fn connect_device(
        &self,
        #[tool(param)] address: String,
        #[tool(param)]
        #[schemars(description = "connect timeout in seconds, default 30")]
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.connect_device(&address, timeout_secs).await)
    }

    #[tool(description = "Disconnect the active Thingy:52 session")]
    async fn disconnect_device(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.disconnect_device().await)
    }

    #[tool(description = "Report connection state, address, name, and battery level")]
    async fn get_device_status(&self) -> Result<CallToolResult, McpError> {
        bridge_result(Ok::<_, BridgeError>(self.tools.get_device_status().await))
    }

    #[tool(description = "Read the ambient temperature in degrees Celsius")]
    async fn read_temperature(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_temperature().await)
    }

    #[tool(description = "Read the relative humidity percentage")]
    async fn read_humidity(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_humidity().await)
    }

    #[tool(description = "Read barometric pressure in hPa")]
    async fn read_pressure(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_pressure().await)
    }

    #[tool(description = "Read CO2-equivalent and TVOC air quality readings")]
    async fn read_air_quality(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_air_quality().await)
    }

    #[tool(description = "Read raw RGBC color sensor channels")]
    async fn read_color_sensor(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_color_sensor().await)
    }

    #[tool(description = "Read an approximate ambient light level in lux")]
    async fn read_light_intensity(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_light_intensity().await)
    }

    #[tool(description = "Read every Environment Service sensor in one call")]
    async fn read_all_sensors(&self) -> Result<CallToolResult, McpError> {
        bridge_result(Ok::<_, BridgeError>(self.tools.read_all_sensors().await))
    }

    #[tool(description = "Read the fused orientation quaternion")]
    async fn read_quaternion(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_quaternion().await)
    }

    #[tool(description = "Read fused roll/pitch/yaw Euler angles")]
    async fn read_euler_angles(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_euler_angles().await)
    }

    #[tool(description = "Read the fused compass heading in degrees")]
    async fn read_heading(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_heading().await)
    }

    #[tool(description = "Read the coarse device orientation (portrait/landscape)")]
    async fn read_orientation(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_orientation().await)
    }

    #[tool(description = "Read raw accelerometer, gyroscope, and magnetometer vectors")]
    async fn read_raw_motion(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_raw_motion().await)
    }

    #[tool(description = "Read the cumulative step count and elapsed time")]
    async fn read_step_count(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_step_count().await)
    }

    #[tool(description = "Wait for a tap event; returns no result if none happens in time")]
    async fn read_tap_event(
        &self,
        #[tool(param)]
        #[schemars(description = "max seconds to wait for a tap, default 10")]
        timeout_secs: Option<u64>,
    ) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.read_tap_event(timeout_secs).await)
    }

    #[tool(description = "Set a constant LED color by name or explicit red/green/blue")]
    async fn set_led_color(
        &self,
        #[tool(param)]
        #[schemars(description = "a named color, e.g. 'red' or 'warm_white'")]
        color: Option<String>,
        #[tool(param)] red: Option<u16>,
        #[tool(param)] green: Option<u16>,
        #[tool(param)] blue: Option<u16>,
        #[tool(param)]
        #[schemars(description = "0..100 percent brightness, default 100")]
        intensity_percent: Option<u8>,
    ) -> Result<CallToolResult, McpError> {
        bridge_result(
            self.tools
                .set_led_color(color.as_deref(), red, green, blue, intensity_percent)
                .await,
        )
    }

    #[tool(description = "Start a breathing LED animation in one of seven preset colors")]
    async fn set_led_breathe(
        &self,
        #[tool(param)]
        #[schemars(description = "one of: red, green, yellow, blue, cyan, magenta, white")]
        color: String,
        #[tool(param)]
        #[schemars(description = "0..100 percent brightness, default 20")]
        intensity_percent: Option<u8>,
        #[tool(param)]
        #[schemars(description = "50..10000 milliseconds, default 1000")]
        delay_ms: Option<u16>,
    ) -> Result<CallToolResult, McpError> {
        bridge_result(
            self.tools
                .set_led_breathe(&color, intensity_percent, delay_ms)
                .await,
        )
    }

    #[tool(description = "Turn the LED off")]
    async fn turn_off_led(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.turn_off_led().await)
    }

    #[tool(description = "Play one of the firmware's eight preset sounds (1..8)")]
    async fn play_sound(&self, #[tool(param)] id: u8) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.play_sound(id).await)
    }

    #[tool(description = "Play the default beep preset")]
    async fn beep(&self) -> Result<CallToolResult, McpError> {
        bridge_result(self.tools.beep().await)
    }
}

#[tool(tool_box)]
impl ServerHandler for Thingy52Server {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Exposes a Nordic Thingy:52's sensors and actuators as tool calls. \
                 Call connect_device with an address from scan_devices before using \
                 any other tool."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}
