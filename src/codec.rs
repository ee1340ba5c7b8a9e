//! Partial-update encoding for control commands.
//!
//! Every field of [`ControlParameters`] is tracked as present or absent on its
//! own. Absent fields are left out of the JSON entirely; present fields are
//! written with their value even when that value is `0` (off, auto) or
//! `false`.

use serde::Serialize;

use crate::models::comfort::{EcoMode, FanSpeed, OperationMode, Power};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operate: Option<Power>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_mode: Option<OperationMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_set: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_speed: Option<FanSpeed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fan_auto_mode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eco_mode: Option<EcoMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eco_navi: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eco_function_data: Option<i64>,
    #[serde(rename = "airSwingLR", skip_serializing_if = "Option::is_none")]
    pub air_swing_lr: Option<i64>,
    #[serde(rename = "airSwingUD", skip_serializing_if = "Option::is_none")]
    pub air_swing_ud: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub air_direction: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nanoe: Option<i64>,
    #[serde(rename = "iAuto", skip_serializing_if = "Option::is_none")]
    pub i_auto: Option<i64>,
}

impl ControlParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_power(mut self, power: Power) -> Self {
        self.operate = Some(power);
        self
    }

    pub fn with_mode(mut self, mode: OperationMode) -> Self {
        self.operation_mode = Some(mode);
        self
    }

    /// The value is passed through as given; the unit enforces its own bounds.
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature_set = Some(celsius);
        self
    }

    pub fn with_fan_speed(mut self, speed: FanSpeed) -> Self {
        self.fan_speed = Some(speed);
        self
    }

    pub fn with_eco_mode(mut self, mode: EcoMode) -> Self {
        self.eco_mode = Some(mode);
        self
    }

    pub fn with_air_swing(mut self, left_right: Option<i64>, up_down: Option<i64>) -> Self {
        if left_right.is_some() {
            self.air_swing_lr = left_right;
        }
        if up_down.is_some() {
            self.air_swing_ud = up_down;
        }
        self
    }

    pub fn with_nanoe(mut self, nanoe: i64) -> Self {
        self.nanoe = Some(nanoe);
        self
    }

    /// True when no field has been set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Body of a control request: one device, a sparse set of parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlCommand {
    pub device_guid: String,
    pub parameters: ControlParameters,
}

impl ControlCommand {
    pub fn new(device_guid: impl Into<String>, parameters: ControlParameters) -> Self {
        Self {
            device_guid: device_guid.into(),
            parameters,
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
