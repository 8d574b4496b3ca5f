//! Codecs for the Motion Service's fusion and raw-sensor characteristics.
//!
//! Fixed-point formats are bit-exact per spec §4.2: quaternion components are
//! Q30, Euler angles are Q16, heading is Q16, and the raw accelerometer/
//! gyroscope/magnetometer vectors use Q10/Q5/Q4 respectively.

use super::{expect_len, le_i16, le_i32, le_u32, CodecError};
use crate::sensor::{Orientation, SensorReading, Vec3};

const Q30: f64 = (1i64 << 30) as f64;
const Q16: f64 = (1i64 << 16) as f64;
const Q10: f64 = (1i64 << 10) as f64;
const Q5: f64 = (1i64 << 5) as f64;
const Q4: f64 = (1i64 << 4) as f64;

pub fn decode_quaternion(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("quaternion", bytes, 16)?;
    let w = le_i32(bytes, 0) as f64 / Q30;
    let x = le_i32(bytes, 4) as f64 / Q30;
    let y = le_i32(bytes, 8) as f64 / Q30;
    let z = le_i32(bytes, 12) as f64 / Q30;
    Ok(SensorReading::Quaternion { w, x, y, z })
}

pub fn decode_euler(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("euler", bytes, 12)?;
    let roll = le_i32(bytes, 0) as f64 / Q16;
    let pitch = le_i32(bytes, 4) as f64 / Q16;
    let yaw_deg = le_i32(bytes, 8) as f64 / Q16;
    Ok(SensorReading::Euler { roll, pitch, yaw_deg })
}

pub fn decode_heading(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("heading", bytes, 4)?;
    let raw_deg = le_i32(bytes, 0) as f64 / Q16;
    let deg = raw_deg.rem_euclid(360.0);
    Ok(SensorReading::Heading { deg })
}

pub fn decode_orientation(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("orientation", bytes, 1)?;
    let value = match bytes[0] {
        0 => Orientation::Portrait,
        1 => Orientation::Landscape,
        2 => Orientation::ReversePortrait,
        3 => Orientation::ReverseLandscape,
        other => return Err(CodecError::out_of_range("orientation", other as f64)),
    };
    Ok(SensorReading::Orientation { value })
}

pub fn decode_step_count(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("step_counter", bytes, 8)?;
    Ok(SensorReading::StepCount {
        steps: le_u32(bytes, 0),
        elapsed_ms: le_u32(bytes, 4),
    })
}

pub fn decode_tap(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("tap", bytes, 2)?;
    Ok(SensorReading::TapEvent {
        direction: bytes[0],
        count: bytes[1],
    })
}

pub fn decode_raw_motion(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("raw_motion", bytes, 18)?;
    let accel = Vec3 {
        x: le_i16(bytes, 0) as f64 / Q10,
        y: le_i16(bytes, 2) as f64 / Q10,
        z: le_i16(bytes, 4) as f64 / Q10,
    };
    let gyro = Vec3 {
        x: le_i16(bytes, 6) as f64 / Q5,
        y: le_i16(bytes, 8) as f64 / Q5,
        z: le_i16(bytes, 10) as f64 / Q5,
    };
    let mag = Vec3 {
        x: le_i16(bytes, 12) as f64 / Q4,
        y: le_i16(bytes, 14) as f64 / Q4,
        z: le_i16(bytes, 16) as f64 / Q4,
    };
    Ok(SensorReading::RawMotion { accel, gyro, mag })
}

/// Encodes the Motion Service configuration record written by
/// `Session::configure_motion` (spec §4.4.5). The firmware's fusion outputs
/// stay silent until this is written at least once.
///
/// Layout: five `uint16 LE` update periods in milliseconds, one per fusion
/// output, in the order the firmware expects: step counter, temperature
/// compensation, magnetometer, quaternion (motion processing unit), and
/// Euler/heading/gravity/raw-motion ("wake on motion") period.
pub fn encode_motion_config(frequencies: &MotionFrequencies) -> [u8; 10] {
    let mut out = [0u8; 10];
    out[0..2].copy_from_slice(&frequencies.step_counter_period_ms.to_le_bytes());
    out[2..4].copy_from_slice(&frequencies.temp_compensation_period_ms.to_le_bytes());
    out[4..6].copy_from_slice(&frequencies.magnetometer_period_ms.to_le_bytes());
    out[6..8].copy_from_slice(&frequencies.motion_processing_period_ms.to_le_bytes());
    out[8..10].copy_from_slice(&frequencies.wake_on_motion_period_ms.to_le_bytes());
    out
}

/// Update periods (milliseconds) for each Motion Service fusion output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionFrequencies {
    pub step_counter_period_ms: u16,
    pub temp_compensation_period_ms: u16,
    pub magnetometer_period_ms: u16,
    pub motion_processing_period_ms: u16,
    pub wake_on_motion_period_ms: u16,
}

impl Default for MotionFrequencies {
    /// Nordic's reference defaults: a responsive but not power-hungry
    /// fusion rate, suitable for auto-configuration on first use.
    fn default() -> Self {
        Self {
            step_counter_period_ms: 100,
            temp_compensation_period_ms: 5000,
            magnetometer_period_ms: 100,
            motion_processing_period_ms: 100,
            wake_on_motion_period_ms: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quaternion_round_trips_through_q30_quantum() {
        let w = 0.5f64;
        let raw = (w * Q30).round() as i32;
        let mut bytes = [0u8; 16];
        bytes[0..4].copy_from_slice(&raw.to_le_bytes());
        let reading = decode_quaternion(&bytes).unwrap();
        match reading {
            SensorReading::Quaternion { w: decoded, .. } => {
                assert!((decoded - w).abs() < 1e-9);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn heading_normalizes_to_0_360() {
        let raw = (-10.0f64 * Q16) as i32;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&raw.to_le_bytes());
        let reading = decode_heading(&bytes).unwrap();
        match reading {
            SensorReading::Heading { deg } => assert!((deg - 350.0).abs() < 1e-6),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn orientation_rejects_out_of_range_enum() {
        assert!(decode_orientation(&[4]).is_err());
        assert!(decode_orientation(&[3]).is_ok());
    }

    #[test]
    fn raw_motion_scales_each_vector_independently() {
        let mut bytes = [0u8; 18];
        bytes[0..2].copy_from_slice(&(1024i16).to_le_bytes()); // accel.x = 1.0 g
        bytes[6..8].copy_from_slice(&(32i16).to_le_bytes()); // gyro.x = 1.0 dps
        bytes[12..14].copy_from_slice(&(16i16).to_le_bytes()); // mag.x = 1.0 uT
        let reading = decode_raw_motion(&bytes).unwrap();
        match reading {
            SensorReading::RawMotion { accel, gyro, mag } => {
                assert!((accel.x - 1.0).abs() < 1e-9);
                assert!((gyro.x - 1.0).abs() < 1e-9);
                assert!((mag.x - 1.0).abs() < 1e-9);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn motion_config_encodes_ten_bytes_little_endian() {
        let bytes = encode_motion_config(&MotionFrequencies::default());
        assert_eq!(bytes.len(), 10);
        assert_eq!(u16::from_le_bytes([bytes[0], bytes[1]]), 100);
    }
}
