//! Codecs for the Environment Service characteristics and the standard
//! Battery Level characteristic, plus the derived "light intensity" reading.
//!
//! Bit-exact formats per spec §4.2. The Thingy:52's Environment Service has
//! no dedicated ambient-light characteristic (it isn't in the UUID registry
//! either, spec §4.1); `decode_light` derives an approximate lux value from
//! the clear channel of the Color/RGBC sensor, the same channel used by the
//! vendor's own reference mobile apps to show a light-level estimate.

use super::{expect_len, le_i32, le_u16, CodecError};
use crate::sensor::SensorReading;

pub fn decode_temperature(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("temperature", bytes, 2)?;
    let integer = bytes[0] as i8 as f64;
    let hundredths = bytes[1] as f64;
    let celsius = integer + hundredths / 100.0;
    if !(-40.0..=85.0).contains(&celsius) {
        return Err(CodecError::out_of_range("temperature", celsius));
    }
    Ok(SensorReading::Temperature { celsius })
}

pub fn decode_humidity(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("humidity", bytes, 1)?;
    let percent = bytes[0];
    if percent > 100 {
        return Err(CodecError::out_of_range("humidity", percent as f64));
    }
    Ok(SensorReading::Humidity { percent })
}

pub fn decode_pressure(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("pressure", bytes, 5)?;
    let integer_pascals = le_i32(bytes, 0) as i64;
    let hundredths_pascal = bytes[4] as i64;
    let hpa = (integer_pascals * 100 + hundredths_pascal) as f64 / 10_000.0;
    if !(260.0..=1260.0).contains(&hpa) {
        return Err(CodecError::out_of_range("pressure", hpa));
    }
    Ok(SensorReading::Pressure { hpa })
}

pub fn decode_air_quality(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("air_quality", bytes, 4)?;
    let co2_ppm = le_u16(bytes, 0);
    let tvoc_ppb = le_u16(bytes, 2);
    if !(400..=8192).contains(&co2_ppm) {
        return Err(CodecError::out_of_range("air_quality.co2_ppm", co2_ppm as f64));
    }
    if !(0..=1187).contains(&tvoc_ppb) {
        return Err(CodecError::out_of_range("air_quality.tvoc_ppb", tvoc_ppb as f64));
    }
    Ok(SensorReading::AirQuality { co2_ppm, tvoc_ppb })
}

pub fn decode_color(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("color", bytes, 8)?;
    Ok(SensorReading::Color {
        r: le_u16(bytes, 0),
        g: le_u16(bytes, 2),
        b: le_u16(bytes, 4),
        clear: le_u16(bytes, 6),
    })
}

/// Derives an approximate lux reading from the Color characteristic's clear
/// channel. Not a vendor-documented conversion; see module docs.
pub fn decode_light(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("light", bytes, 8)?;
    let clear = le_u16(bytes, 6) as f64;
    Ok(SensorReading::Light { lux: clear / 256.0 })
}

pub fn decode_battery(bytes: &[u8]) -> Result<SensorReading, CodecError> {
    expect_len("battery_level", bytes, 1)?;
    let percent = bytes[0];
    if percent > 100 {
        return Err(CodecError::out_of_range("battery_level", percent as f64));
    }
    Ok(SensorReading::Battery { percent })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_23_5_celsius() {
        let reading = decode_temperature(&[0x17, 0x32]).unwrap();
        match reading {
            SensorReading::Temperature { celsius } => {
                assert!((celsius - 23.50).abs() < 1e-9);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn temperature_negative_integer_part() {
        // -5 integer, 25 hundredths -> -4.75
        let reading = decode_temperature(&[(-5i8) as u8, 25]).unwrap();
        match reading {
            SensorReading::Temperature { celsius } => assert!((celsius - (-4.75)).abs() < 1e-9),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn temperature_wrong_length_is_error() {
        assert!(decode_temperature(&[0x17]).is_err());
        assert!(decode_temperature(&[0x17, 0x32, 0x00]).is_err());
    }

    #[test]
    fn humidity_rejects_over_100() {
        assert!(decode_humidity(&[101]).is_err());
        assert!(decode_humidity(&[100]).is_ok());
    }

    #[test]
    fn air_quality_decodes_little_endian() {
        let reading = decode_air_quality(&[0x58, 0x02, 0x4B, 0x00]).unwrap();
        assert_eq!(
            reading,
            SensorReading::AirQuality {
                co2_ppm: 600,
                tvoc_ppb: 75
            }
        );
    }

    #[test]
    fn color_decodes_four_u16_channels() {
        let reading = decode_color(&[1, 0, 2, 0, 3, 0, 4, 0]).unwrap();
        assert_eq!(
            reading,
            SensorReading::Color {
                r: 1,
                g: 2,
                b: 3,
                clear: 4
            }
        );
    }

    #[test]
    fn battery_in_range() {
        assert_eq!(decode_battery(&[42]).unwrap(), SensorReading::Battery { percent: 42 });
        assert!(decode_battery(&[101]).is_err());
    }

    #[test]
    fn decoders_never_panic_on_correct_length_inputs() {
        for b0 in [0u8, 1, 100, 200, 255] {
            for b1 in [0u8, 1, 50, 99, 255] {
                let _ = decode_temperature(&[b0, b1]);
            }
        }
    }
}
