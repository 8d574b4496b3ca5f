//! Sound characteristic encoder.

/// A command for the speaker data characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCommand {
    /// One of the firmware's eight preset sounds, 1..8.
    PresetSound { id: u8 },
    /// Shorthand for `PresetSound { id: 1 }`.
    Beep,
}

const SOUND_MODE_SAMPLE: u8 = 3;

/// Encodes a [`SoundCommand`] into the firmware's `[mode, sound_id]` format.
pub fn encode_sound(command: SoundCommand) -> [u8; 2] {
    let id = match command {
        SoundCommand::PresetSound { id } => id,
        SoundCommand::Beep => 1,
    };
    [SOUND_MODE_SAMPLE, id]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beep_is_preset_sound_one() {
        assert_eq!(encode_sound(SoundCommand::Beep), [0x03, 0x01]);
        assert_eq!(
            encode_sound(SoundCommand::PresetSound { id: 1 }),
            encode_sound(SoundCommand::Beep)
        );
    }

    #[test]
    fn preset_sound_is_two_bytes() {
        assert_eq!(encode_sound(SoundCommand::PresetSound { id: 8 }), [0x03, 0x08]);
    }
}
