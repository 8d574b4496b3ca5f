//! LED characteristic encoder.
//!
//! The repository's critical historical fix, called out in spec §4.2: every
//! write is **exactly four bytes, never five**. An extra trailing byte makes
//! the firmware reject the write as "not permitted". This module's whole
//! job is to make that bug structurally unreachable by returning a fixed-size
//! array rather than a `Vec`.

/// A command for the LED characteristic, already validated by the Tool
/// Surface (named colors resolved, ranges checked).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedCommand {
    Off,
    Constant { r: u8, g: u8, b: u8 },
    Breathe { color_code: u8, intensity: u8, delay_ms: u16 },
    OneShot { color_code: u8, intensity: u8 },
}

/// Encodes a [`LedCommand`] into the firmware's fixed `[mode, p1, p2, p3]`
/// wire format. Always exactly 4 bytes.
pub fn encode_led(command: LedCommand) -> [u8; 4] {
    match command {
        LedCommand::Off => [0, 0, 0, 0],
        LedCommand::Constant { r, g, b } => [1, r, g, b],
        LedCommand::Breathe {
            color_code,
            intensity,
            ..
        } => [2, color_code, intensity, 0],
        LedCommand::OneShot {
            color_code,
            intensity,
        } => [3, color_code, intensity, 0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_encodes_to_exactly_four_bytes() {
        let commands = [
            LedCommand::Off,
            LedCommand::Constant { r: 1, g: 2, b: 3 },
            LedCommand::Breathe {
                color_code: 1,
                intensity: 50,
                delay_ms: 1000,
            },
            LedCommand::OneShot {
                color_code: 1,
                intensity: 50,
            },
        ];
        for command in commands {
            assert_eq!(encode_led(command).len(), 4);
        }
    }

    #[test]
    fn constant_red_is_ff0000() {
        assert_eq!(
            encode_led(LedCommand::Constant { r: 255, g: 0, b: 0 }),
            [0x01, 0xFF, 0x00, 0x00]
        );
    }

    #[test]
    fn constant_red_at_half_intensity_floors() {
        // 255 * 0.5 floors to 127 = 0x7F, per scenario D.
        let scaled = (255.0 * 0.5).floor() as u8;
        assert_eq!(scaled, 0x7F);
        assert_eq!(
            encode_led(LedCommand::Constant {
                r: scaled,
                g: 0,
                b: 0
            }),
            [0x01, 0x7F, 0x00, 0x00]
        );
    }

    #[test]
    fn off_ignores_params() {
        assert_eq!(encode_led(LedCommand::Off), [0, 0, 0, 0]);
    }
}
