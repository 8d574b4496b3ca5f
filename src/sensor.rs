//! Tagged sum type for everything a sensor read can produce.
//!
//! Spec §9 calls this out explicitly: "Dynamic dicts for sensor readings →
//! tagged variants." Every tool's return shape is statically known through
//! this one enum; `read_all_sensors` is the sole place that instead uses a
//! struct-of-options, because it must represent *per-sensor* failure without
//! aborting the whole call.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SensorReading {
    Temperature { celsius: f64 },
    Humidity { percent: u8 },
    Pressure { hpa: f64 },
    AirQuality { co2_ppm: u16, tvoc_ppb: u16 },
    Color { r: u16, g: u16, b: u16, clear: u16 },
    Light { lux: f64 },
    StepCount { steps: u32, elapsed_ms: u32 },
    Quaternion { w: f64, x: f64, y: f64, z: f64 },
    Euler { roll: f64, pitch: f64, yaw_deg: f64 },
    Heading { deg: f64 },
    Orientation { value: Orientation },
    RawMotion { accel: Vec3, gyro: Vec3, mag: Vec3 },
    TapEvent { direction: u8, count: u8 },
    Battery { percent: u8 },
}

/// Aggregate result for `read_all_sensors` (spec §4.5): individual failures
/// surface as `None` plus an entry in `errors`, never as aborting the call.
#[derive(Debug, Default, Serialize)]
pub struct AllSensorsReading {
    pub temperature: Option<SensorReading>,
    pub humidity: Option<SensorReading>,
    pub pressure: Option<SensorReading>,
    pub air_quality: Option<SensorReading>,
    pub color: Option<SensorReading>,
    pub light: Option<SensorReading>,
    pub errors: Vec<SensorError>,
}

#[derive(Debug, Serialize)]
pub struct SensorError {
    pub sensor: &'static str,
    pub kind: &'static str,
    pub message: String,
}
