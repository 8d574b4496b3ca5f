//! LED and sound actuation tools.
//!
//! `set_led_breathe` only accepts one of the firmware's seven named
//! breathe-mode colors, never an arbitrary RGB triplet. The Open Question
//! in spec §4.5 ("should breathe mode accept RGB, given the wire format has
//! no room for it?") is resolved here by construction: the function's
//! argument shape has no `red`/`green`/`blue` fields, so there is nothing to
//! reject at runtime. `set_led_color` is the one LED tool that does take
//! RGB, via the Constant command.

use crate::codec::color::{breathe_color_code, named_rgb, Rgb};
use crate::codec::led::{encode_led, LedCommand};
use crate::codec::sound::{encode_sound, SoundCommand};
use crate::error::BridgeError;
use crate::transport::Transport;

use super::ToolSurface;

fn validate_channel(field: &'static str, value: u16) -> Result<u8, BridgeError> {
    u8::try_from(value).map_err(|_| BridgeError::invalid_argument(field, "must be 0..255"))
}

fn scale_channel(value: u8, intensity_percent: u8) -> u8 {
    ((value as f64) * (intensity_percent as f64) / 100.0).floor() as u8
}

impl<T: Transport> ToolSurface<T> {
    /// Sets a constant LED color, either by name (`color`) or by explicit
    /// `red`/`green`/`blue` (each 0..=255; all three required together).
    /// `intensity_percent` (0..=100, default 100) scales the resolved RGB
    /// triplet before it's written.
    pub async fn set_led_color(
        &self,
        color: Option<&str>,
        red: Option<u16>,
        green: Option<u16>,
        blue: Option<u16>,
        intensity_percent: Option<u8>,
    ) -> Result<(), BridgeError> {
        let base = match (color, red, green, blue) {
            (Some(name), None, None, None) => named_rgb(name)
                .ok_or_else(|| BridgeError::invalid_argument("color", format!("unknown color name '{name}'")))?,
            (None, Some(r), Some(g), Some(b)) => Rgb {
                r: validate_channel("red", r)?,
                g: validate_channel("green", g)?,
                b: validate_channel("blue", b)?,
            },
            (Some(_), Some(_), _, _) | (Some(_), _, Some(_), _) | (Some(_), _, _, Some(_)) => {
                return Err(BridgeError::invalid_argument(
                    "color",
                    "pass either a named color or red/green/blue, not both",
                ))
            }
            _ => {
                return Err(BridgeError::invalid_argument(
                    "color",
                    "either a named color or all of red, green, and blue is required",
                ))
            }
        };

        let intensity = intensity_percent.unwrap_or(100);
        if intensity > 100 {
            return Err(BridgeError::invalid_argument("intensity", "must be 0..100"));
        }

        let bytes = encode_led(LedCommand::Constant {
            r: scale_channel(base.r, intensity),
            g: scale_channel(base.g, intensity),
            b: scale_channel(base.b, intensity),
        });
        self.session().write_characteristic("led", &bytes, false).await
    }

    /// Starts a breathing animation. `intensity_percent` (0..=100, default
    /// 20) and `delay_ms` (50..=10000, default 1000) follow the firmware's
    /// documented ranges.
    pub async fn set_led_breathe(
        &self,
        color: &str,
        intensity_percent: Option<u8>,
        delay_ms: Option<u16>,
    ) -> Result<(), BridgeError> {
        let color_code = breathe_color_code(color).ok_or_else(|| {
            BridgeError::invalid_argument(
                "color",
                format!("unknown breathe color '{color}'; must be one of the firmware's seven presets"),
            )
        })?;

        let intensity = intensity_percent.unwrap_or(20);
        if intensity > 100 {
            return Err(BridgeError::invalid_argument("intensity", "must be 0..100"));
        }

        let delay = delay_ms.unwrap_or(1000);
        if !(50..=10000).contains(&delay) {
            return Err(BridgeError::invalid_argument("delay_ms", "must be 50..10000"));
        }

        let bytes = encode_led(LedCommand::Breathe {
            color_code,
            intensity,
            delay_ms: delay,
        });
        self.session().write_characteristic("led", &bytes, false).await
    }

    pub async fn turn_off_led(&self) -> Result<(), BridgeError> {
        let bytes = encode_led(LedCommand::Off);
        self.session().write_characteristic("led", &bytes, false).await
    }

    /// Plays one of the firmware's eight preset sounds, 1..=8.
    pub async fn play_sound(&self, id: u8) -> Result<(), BridgeError> {
        if !(1..=8).contains(&id) {
            return Err(BridgeError::invalid_argument("id", "must be between 1 and 8"));
        }
        let bytes = encode_sound(SoundCommand::PresetSound { id });
        self.session()
            .write_characteristic("speaker_data", &bytes, false)
            .await
    }

    pub async fn beep(&self) -> Result<(), BridgeError> {
        let bytes = encode_sound(SoundCommand::Beep);
        self.session()
            .write_characteristic("speaker_data", &bytes, false)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;
    use crate::transport::DiscoveredPeripheral;
    use std::time::Duration;

    async fn connected_surface() -> (ToolSurface<MockTransport>, std::sync::Arc<crate::session::Session<MockTransport>>) {
        let transport = MockTransport::new().with_scan_result(DiscoveredPeripheral {
            address: "AA".into(),
            name: None,
            rssi: -50,
        });
        let session = std::sync::Arc::new(crate::session::Session::new(transport));
        session.scan(Duration::from_secs(1)).await.unwrap();
        session.connect("AA", Duration::from_secs(1)).await.unwrap();
        (ToolSurface::new(session.clone()), session)
    }

    #[tokio::test]
    async fn named_red_writes_exact_bytes() {
        let (surface, _session) = connected_surface().await;
        surface.set_led_color(Some("red"), None, None, None, None).await.unwrap();
    }

    #[tokio::test]
    async fn out_of_range_red_is_rejected_before_any_write() {
        let (surface, _session) = connected_surface().await;
        let result = surface.set_led_color(None, Some(300), Some(0), Some(0), None).await;
        assert!(matches!(
            result,
            Err(BridgeError::InvalidArgument { field: "red", .. })
        ));
    }

    #[tokio::test]
    async fn breathe_rejects_unknown_color() {
        let (surface, _session) = connected_surface().await;
        let result = surface.set_led_breathe("chartreuse", None, None).await;
        assert!(matches!(result, Err(BridgeError::InvalidArgument { .. })));
    }
}
