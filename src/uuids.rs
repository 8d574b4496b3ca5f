//! Static table mapping symbolic Thingy:52 sensor/actuator names to GATT
//! service and characteristic UUIDs.
//!
//! Nordic's Thingy:52 exposes five vendor services, each a 128-bit UUID of
//! the form `EF68zzzz-9B35-4933-9B10-52FFA9740042`, plus the standard
//! Bluetooth SIG Battery service. This module is a read-only lookup table;
//! it owns no state and performs no I/O.

use uuid::Uuid;

/// Whether Session should attempt a direct `read_char` before falling back
/// to the notify/wait/unsubscribe pattern, per spec §4.4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadPolicy {
    /// Known to support direct GATT reads on stock Thingy:52 firmware.
    DirectThenNotify,
    /// Notify-only; a direct read returns `NotPermitted`.
    NotifyOnly,
}

/// One entry in the registry: the characteristic's UUID plus its read policy.
#[derive(Debug, Clone, Copy)]
pub struct CharacteristicRef {
    pub uuid: Uuid,
    pub read_policy: ReadPolicy,
}

/// Builds a Thingy:52 vendor UUID `EF68zzzz-9B35-4933-9B10-52FFA9740042`
/// from its 16-bit service/characteristic identifier.
const fn thingy_uuid(zzzz: u32) -> Uuid {
    let high = 0xEF680000u128 | (zzzz as u128);
    Uuid::from_u128((high << 96) | 0x9B35_4933_9B10_52FF_A974_0042u128)
}

// Environment Service (0200)
pub const ENVIRONMENT_SERVICE: Uuid = thingy_uuid(0x0200);
pub const TEMPERATURE: Uuid = thingy_uuid(0x0201);
pub const PRESSURE: Uuid = thingy_uuid(0x0202);
pub const HUMIDITY: Uuid = thingy_uuid(0x0203);
pub const AIR_QUALITY: Uuid = thingy_uuid(0x0204);
pub const COLOR: Uuid = thingy_uuid(0x0205);
pub const GAS_MODE: Uuid = thingy_uuid(0x0206);

// UI Service (0300)
pub const UI_SERVICE: Uuid = thingy_uuid(0x0300);
pub const LED: Uuid = thingy_uuid(0x0301);
pub const BUTTON: Uuid = thingy_uuid(0x0302);

// Motion Service (0400)
pub const MOTION_SERVICE: Uuid = thingy_uuid(0x0400);
pub const MOTION_CONFIG: Uuid = thingy_uuid(0x0401);
pub const TAP: Uuid = thingy_uuid(0x0402);
pub const ORIENTATION: Uuid = thingy_uuid(0x0403);
pub const QUATERNION: Uuid = thingy_uuid(0x0404);
pub const STEP_COUNTER: Uuid = thingy_uuid(0x0405);
pub const RAW_MOTION: Uuid = thingy_uuid(0x0406);
pub const EULER: Uuid = thingy_uuid(0x0407);
pub const ROTATION_MATRIX: Uuid = thingy_uuid(0x0408);
pub const HEADING: Uuid = thingy_uuid(0x0409);
pub const GRAVITY: Uuid = thingy_uuid(0x040a);

// Sound Service (0500)
pub const SOUND_SERVICE: Uuid = thingy_uuid(0x0500);
pub const SPEAKER_DATA: Uuid = thingy_uuid(0x0501);
pub const SPEAKER_STATUS: Uuid = thingy_uuid(0x0502);
pub const MICROPHONE: Uuid = thingy_uuid(0x0503);

/// Standard Bluetooth SIG Battery Service / Battery Level characteristic.
pub const BATTERY_SERVICE: Uuid = Uuid::from_u128(0x0000180f_0000_1000_8000_00805f9b34fb);
pub const BATTERY_LEVEL: Uuid = Uuid::from_u128(0x00002a19_0000_1000_8000_00805f9b34fb);

/// Looks up a characteristic by its symbolic registry name.
///
/// Returns `None` for unknown names; callers treat that as an
/// `InvalidArgument` at the Tool Surface, never as a Transport call.
pub fn characteristic(name: &str) -> Option<CharacteristicRef> {
    use ReadPolicy::*;
    let (uuid, read_policy) = match name {
        "temperature" => (TEMPERATURE, NotifyOnly),
        "pressure" => (PRESSURE, NotifyOnly),
        "humidity" => (HUMIDITY, NotifyOnly),
        "air_quality" => (AIR_QUALITY, NotifyOnly),
        "color" => (COLOR, NotifyOnly),
        "gas_mode" => (GAS_MODE, DirectThenNotify),
        "led" => (LED, DirectThenNotify),
        "button" => (BUTTON, NotifyOnly),
        "speaker_data" => (SPEAKER_DATA, DirectThenNotify),
        "speaker_status" => (SPEAKER_STATUS, NotifyOnly),
        "microphone" => (MICROPHONE, NotifyOnly),
        "motion_config" => (MOTION_CONFIG, DirectThenNotify),
        "tap" => (TAP, NotifyOnly),
        "orientation" => (ORIENTATION, NotifyOnly),
        "quaternion" => (QUATERNION, DirectThenNotify),
        "step_counter" => (STEP_COUNTER, NotifyOnly),
        "raw_motion" => (RAW_MOTION, NotifyOnly),
        "euler" => (EULER, NotifyOnly),
        "rotation_matrix" => (ROTATION_MATRIX, NotifyOnly),
        "heading" => (HEADING, NotifyOnly),
        "gravity" => (GRAVITY, NotifyOnly),
        "battery_level" => (BATTERY_LEVEL, DirectThenNotify),
        _ => return None,
    };
    Some(CharacteristicRef { uuid, read_policy })
}

/// UUID of the Environment Service, used to filter scan results (spec §4.3).
pub fn advertised_service() -> Uuid {
    ENVIRONMENT_SERVICE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert!(characteristic("temperature").is_some());
        assert!(characteristic("battery_level").is_some());
        assert_eq!(
            characteristic("battery_level").unwrap().uuid,
            BATTERY_LEVEL
        );
    }

    #[test]
    fn unknown_name_resolves_to_none() {
        assert!(characteristic("not_a_real_sensor").is_none());
    }

    #[test]
    fn temperature_uuid_matches_vendor_form() {
        assert_eq!(
            TEMPERATURE.to_string(),
            "ef680201-9b35-4933-9b10-52ffa9740042"
        );
    }
}
