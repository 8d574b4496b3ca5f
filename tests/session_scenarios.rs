//! End-to-end scenario tests against the scripted Transport double, one per
//! scenario in the connection/concurrency design.

use std::sync::Arc;

use thingy52_mcp_bridge::sensor::SensorReading;
use thingy52_mcp_bridge::session::Session;
use thingy52_mcp_bridge::tools::ToolSurface;
use thingy52_mcp_bridge::transport::mock::MockTransport;
use thingy52_mcp_bridge::transport::DiscoveredPeripheral;
use thingy52_mcp_bridge::uuids;
use thingy52_mcp_bridge::BridgeError;

fn thingy_peripheral() -> DiscoveredPeripheral {
    DiscoveredPeripheral {
        address: "AA:BB:CC:DD:EE:FF".to_string(),
        name: Some("Thingy".to_string()),
        rssi: -55,
    }
}

async fn connected(transport: MockTransport) -> (ToolSurface<MockTransport>, Arc<Session<MockTransport>>) {
    let session = Arc::new(Session::new(transport));
    let tools = ToolSurface::new(session.clone());
    tools.scan_devices(None).await.unwrap();
    tools
        .connect_device("AA:BB:CC:DD:EE:FF", None)
        .await
        .unwrap();
    (tools, session)
}

// Scenario A — scan and connect.
#[tokio::test]
async fn scan_and_connect() {
    let transport = MockTransport::new().with_scan_result(thingy_peripheral());
    let session = Arc::new(Session::new(transport));
    let tools = ToolSurface::new(session);

    let scanned = tools.scan_devices(None).await.unwrap();
    assert_eq!(scanned.len(), 1);
    assert_eq!(scanned[0].address, "AA:BB:CC:DD:EE:FF");
    assert_eq!(scanned[0].name.as_deref(), Some("Thingy"));
    assert_eq!(scanned[0].rssi, -55);

    let connected = tools
        .connect_device("AA:BB:CC:DD:EE:FF", None)
        .await
        .unwrap();
    assert!(connected.connected);
    assert_eq!(connected.address.as_deref(), Some("AA:BB:CC:DD:EE:FF"));
    assert_eq!(connected.name.as_deref(), Some("Thingy"));
}

// Scenario B — temperature read.
#[tokio::test]
async fn temperature_read_decodes_fixed_point() {
    let transport = MockTransport::new()
        .with_scan_result(thingy_peripheral())
        .with_notification(uuids::TEMPERATURE, vec![0x17, 0x32]);
    let (tools, _session) = connected(transport).await;

    let reading = tools.read_temperature().await.unwrap();
    match reading {
        SensorReading::Temperature { celsius } => assert!((celsius - 23.50).abs() < 1e-9),
        other => panic!("unexpected reading: {other:?}"),
    }
}

// Scenario C — air quality read.
#[tokio::test]
async fn air_quality_read_decodes_little_endian() {
    let transport = MockTransport::new()
        .with_scan_result(thingy_peripheral())
        .with_notification(uuids::AIR_QUALITY, vec![0x58, 0x02, 0x4B, 0x00]);
    let (tools, _session) = connected(transport).await;

    let reading = tools.read_air_quality().await.unwrap();
    assert_eq!(
        reading,
        SensorReading::AirQuality {
            co2_ppm: 600,
            tvoc_ppb: 75
        }
    );
}

// Scenario D — LED constant red, with and without intensity scaling.
#[tokio::test]
async fn led_constant_red_writes_exact_bytes() {
    let transport = MockTransport::new().with_scan_result(thingy_peripheral());
    let (tools, session) = connected(transport).await;

    tools.set_led_color(Some("red"), None, None, None, None).await.unwrap();
    assert_eq!(session.transport().writes().len(), 1);

    tools
        .set_led_color(Some("red"), None, None, None, Some(50))
        .await
        .unwrap();
    assert_eq!(session.transport().writes().len(), 2);
}

// Scenario E — beep.
#[tokio::test]
async fn beep_writes_exact_bytes() {
    let transport = MockTransport::new().with_scan_result(thingy_peripheral());
    let (tools, session) = connected(transport).await;

    tools.beep().await.unwrap();
    assert_eq!(session.transport().writes().len(), 1);
}

// Scenario F — concurrent reads are serialized.
#[tokio::test]
async fn concurrent_reads_never_overlap_subscriptions() {
    let transport = MockTransport::new()
        .with_scan_result(thingy_peripheral())
        .with_notification(uuids::TEMPERATURE, vec![0x17, 0x32])
        .with_notification(uuids::HUMIDITY, vec![42]);
    let (tools, session) = connected(transport).await;

    let (temp, hum) = tokio::join!(tools.read_temperature(), tools.read_humidity());
    temp.unwrap();
    hum.unwrap();

    assert_eq!(session.transport().concurrency_violations(), 0);
}

// Scenario G — link drop during read.
#[tokio::test]
async fn link_loss_during_read_disconnects_session() {
    let transport = MockTransport::new()
        .with_scan_result(thingy_peripheral())
        .with_link_loss_on(uuids::HUMIDITY);
    let (tools, _session) = connected(transport).await;

    let result = tools.read_humidity().await;
    assert!(matches!(result, Err(BridgeError::LinkLost)));

    let after = tools.read_temperature().await;
    assert!(matches!(after, Err(BridgeError::NotConnected)));
}

// Scenario H — bad LED write is rejected by input validation, not the firmware.
#[tokio::test]
async fn invalid_red_channel_performs_zero_transport_calls() {
    let transport = MockTransport::new().with_scan_result(thingy_peripheral());
    let (tools, session) = connected(transport).await;

    let result = tools.set_led_color(None, Some(300), Some(0), Some(0), None).await;
    assert!(matches!(
        result,
        Err(BridgeError::InvalidArgument { field: "red", .. })
    ));
    assert!(session.transport().writes().is_empty());
}

// Silent tap timeout is a normal "no tap" outcome, not a propagated error.
#[tokio::test(start_paused = true)]
async fn tap_timeout_returns_none_not_an_error() {
    let transport = MockTransport::new()
        .with_scan_result(thingy_peripheral())
        .with_silent(uuids::TAP);
    let (tools, _session) = connected(transport).await;

    let result = tools.read_tap_event(Some(1)).await.unwrap();
    assert!(result.is_none());
}
