//! Named-color lookup tables used by the LED Tool Surface (spec §4.2).
//!
//! Two separate, smaller mappings: one from a color *name* to an RGB triplet
//! (used by `set_led_color`), one from a breathe-mode color *name* to the
//! firmware's 1..7 color code (used by `set_led_breathe`/`play_sound`-style
//! one-shot flashes). They are intentionally not unified: the firmware's
//! breathe/one-shot modes only understand the seven color codes, never RGB.

/// An RGB triplet, each channel 0..255.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Resolves a constant-mode color name to its RGB triplet.
pub fn named_rgb(name: &str) -> Option<Rgb> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "red" => Rgb { r: 255, g: 0, b: 0 },
        "green" => Rgb { r: 0, g: 255, b: 0 },
        "blue" => Rgb { r: 0, g: 0, b: 255 },
        "white" => Rgb { r: 255, g: 255, b: 255 },
        "warm_white" => Rgb { r: 255, g: 214, b: 170 },
        "cool_white" => Rgb { r: 212, g: 235, b: 255 },
        "yellow" => Rgb { r: 255, g: 255, b: 0 },
        "cyan" => Rgb { r: 0, g: 255, b: 255 },
        "magenta" => Rgb { r: 255, g: 0, b: 255 },
        "purple" => Rgb { r: 128, g: 0, b: 128 },
        "orange" => Rgb { r: 255, g: 165, b: 0 },
        "pink" => Rgb { r: 255, g: 105, b: 180 },
        _ => return None,
    };
    Some(rgb)
}

/// Resolves a breathe-mode color name to the firmware's 1..7 color code.
pub fn breathe_color_code(name: &str) -> Option<u8> {
    match name.to_ascii_lowercase().as_str() {
        "red" => Some(1),
        "green" => Some(2),
        "yellow" => Some(3),
        "blue" => Some(4),
        "cyan" => Some(5),
        "magenta" => Some(6),
        "white" => Some(7),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_is_pure() {
        assert_eq!(named_rgb("red"), Some(Rgb { r: 255, g: 0, b: 0 }));
        assert_eq!(named_rgb("RED"), Some(Rgb { r: 255, g: 0, b: 0 }));
    }

    #[test]
    fn unknown_color_name_is_none() {
        assert!(named_rgb("chartreuse").is_none());
    }

    #[test]
    fn breathe_codes_cover_seven_colors_1_to_7() {
        let mut codes: Vec<u8> = ["red", "green", "yellow", "blue", "cyan", "magenta", "white"]
            .iter()
            .map(|name| breathe_color_code(name).unwrap())
            .collect();
        codes.sort_unstable();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
