//! Environment Service tools: individual sensor reads plus the aggregate
//! `read_all_sensors`.

use crate::codec::environment::{
    decode_air_quality, decode_color, decode_humidity, decode_light, decode_pressure,
    decode_temperature,
};
use crate::error::BridgeError;
use crate::sensor::{AllSensorsReading, SensorError, SensorReading};
use crate::transport::Transport;

use super::ToolSurface;

impl<T: Transport> ToolSurface<T> {
    pub async fn read_temperature(&self) -> Result<SensorReading, BridgeError> {
        let bytes = self.session().read_characteristic("temperature").await?;
        Ok(decode_temperature(&bytes)?)
    }

    pub async fn read_humidity(&self) -> Result<SensorReading, BridgeError> {
        let bytes = self.session().read_characteristic("humidity").await?;
        Ok(decode_humidity(&bytes)?)
    }

    pub async fn read_pressure(&self) -> Result<SensorReading, BridgeError> {
        let bytes = self.session().read_characteristic("pressure").await?;
        Ok(decode_pressure(&bytes)?)
    }

    pub async fn read_air_quality(&self) -> Result<SensorReading, BridgeError> {
        let bytes = self.session().read_characteristic("air_quality").await?;
        Ok(decode_air_quality(&bytes)?)
    }

    pub async fn read_color_sensor(&self) -> Result<SensorReading, BridgeError> {
        let bytes = self.session().read_characteristic("color").await?;
        Ok(decode_color(&bytes)?)
    }

    /// Derived from the Color characteristic's clear channel (spec §4.1's
    /// registry has no dedicated ambient-light characteristic).
    pub async fn read_light_intensity(&self) -> Result<SensorReading, BridgeError> {
        let bytes = self.session().read_characteristic("color").await?;
        Ok(decode_light(&bytes)?)
    }

    /// Reads every Environment Service sensor, folding individual failures
    /// into `errors` rather than aborting the whole call (spec §4.5).
    pub async fn read_all_sensors(&self) -> AllSensorsReading {
        let mut out = AllSensorsReading::default();

        macro_rules! collect {
            ($field:ident, $sensor:expr, $call:expr) => {
                match $call.await {
                    Ok(reading) => out.$field = Some(reading),
                    Err(err) => out.errors.push(SensorError {
                        sensor: $sensor,
                        kind: err.kind(),
                        message: err.to_string(),
                    }),
                }
            };
        }

        collect!(temperature, "temperature", self.read_temperature());
        collect!(humidity, "humidity", self.read_humidity());
        collect!(pressure, "pressure", self.read_pressure());
        collect!(air_quality, "air_quality", self.read_air_quality());
        collect!(color, "color", self.read_color_sensor());
        collect!(light, "light", self.read_light_intensity());

        out
    }
}
