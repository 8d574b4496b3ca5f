//! Motion Service tools: the fusion outputs (quaternion, Euler, heading,
//! orientation, step count) plus raw sensor data and tap detection.
//!
//! Every fusion-output read auto-configures the Motion Service on first use
//! (spec §4.4.5's auto-configure policy) rather than failing with
//! `NotConfigured`. `read_tap_event` is the one exception: taps fire off the
//! firmware's own threshold detector and don't depend on the configured
//! fusion update periods, so it skips the auto-configure step.

use std::time::Duration;

use crate::codec::motion::{
    decode_euler, decode_heading, decode_orientation, decode_quaternion, decode_raw_motion,
    decode_step_count, decode_tap,
};
use crate::error::BridgeError;
use crate::sensor::SensorReading;
use crate::transport::Transport;

use super::ToolSurface;

const DEFAULT_TAP_WAIT: Duration = Duration::from_secs(10);
const MIN_TAP_WAIT_SECS: u64 = 1;
const MAX_TAP_WAIT_SECS: u64 = 60;

impl<T: Transport> ToolSurface<T> {
    pub async fn read_quaternion(&self) -> Result<SensorReading, BridgeError> {
        self.session().ensure_motion_configured().await?;
        let bytes = self.session().read_characteristic("quaternion").await?;
        Ok(decode_quaternion(&bytes)?)
    }

    pub async fn read_euler_angles(&self) -> Result<SensorReading, BridgeError> {
        self.session().ensure_motion_configured().await?;
        let bytes = self.session().read_characteristic("euler").await?;
        Ok(decode_euler(&bytes)?)
    }

    pub async fn read_heading(&self) -> Result<SensorReading, BridgeError> {
        self.session().ensure_motion_configured().await?;
        let bytes = self.session().read_characteristic("heading").await?;
        Ok(decode_heading(&bytes)?)
    }

    pub async fn read_orientation(&self) -> Result<SensorReading, BridgeError> {
        self.session().ensure_motion_configured().await?;
        let bytes = self.session().read_characteristic("orientation").await?;
        Ok(decode_orientation(&bytes)?)
    }

    pub async fn read_step_count(&self) -> Result<SensorReading, BridgeError> {
        self.session().ensure_motion_configured().await?;
        let bytes = self.session().read_characteristic("step_counter").await?;
        Ok(decode_step_count(&bytes)?)
    }

    pub async fn read_raw_motion(&self) -> Result<SensorReading, BridgeError> {
        self.session().ensure_motion_configured().await?;
        let bytes = self.session().read_characteristic("raw_motion").await?;
        Ok(decode_raw_motion(&bytes)?)
    }

    /// Waits up to `timeout_secs` (1..=60, default 10s) for a tap. A timeout
    /// is a legitimate "no tap happened" outcome, not an error: returns
    /// `Ok(None)`.
    pub async fn read_tap_event(
        &self,
        timeout_secs: Option<u64>,
    ) -> Result<Option<SensorReading>, BridgeError> {
        if let Some(secs) = timeout_secs {
            if !(MIN_TAP_WAIT_SECS..=MAX_TAP_WAIT_SECS).contains(&secs) {
                return Err(BridgeError::invalid_argument(
                    "timeout_seconds",
                    "must be between 1 and 60",
                ));
            }
        }
        let timeout = timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TAP_WAIT);
        match self
            .session()
            .read_characteristic_no_retry("tap", timeout)
            .await
        {
            Ok(bytes) => Ok(Some(decode_tap(&bytes)?)),
            Err(BridgeError::Timeout) => Ok(None),
            Err(other) => Err(other),
        }
    }
}
