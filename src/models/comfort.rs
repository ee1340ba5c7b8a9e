//! Models for the Comfort Cloud JSON documents.
//!
//! Notes
//! - Field names follow the vendor's camelCase keys exactly.
//! - Integer-coded settings are modeled as enums; decoding an unknown code fails.
//! - Inbound capability fields are optional: older units omit several of them.

use serde::{Deserialize, Serialize};

/// Marker the history endpoint uses for "no data in this bucket".
pub const NO_DATA: f64 = -255.0;

// =====================
// Integer-coded enums
// =====================

macro_rules! int_coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($what:literal) {
            $($variant:ident = $code:literal => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Integer sent to and received from the API.
            pub fn code(self) -> i64 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            /// Name accepted on the command line.
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_code(code: i64) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl core::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let names = Self::ALL.iter().map(|v| v.name()).collect::<Vec<_>>().join(",");
                        format!("invalid {} '{}', expected one of: {}", $what, s, names)
                    })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i64(self.code())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let code = i64::deserialize(deserializer)?;
                $name::from_code(code).ok_or_else(|| {
                    serde::de::Error::invalid_value(serde::de::Unexpected::Signed(code), &$what)
                })
            }
        }
    };
}

int_coded_enum! {
    /// Power state (`operate`).
    pub enum Power ("power state") {
        Off = 0 => "off",
        On = 1 => "on",
    }
}

int_coded_enum! {
    /// Air-conditioning mode (`operationMode`).
    pub enum OperationMode ("operation mode") {
        Auto = 0 => "auto",
        Dry = 1 => "dry",
        Cool = 2 => "cool",
        Heat = 3 => "heat",
        Fan = 4 => "fan",
    }
}

int_coded_enum! {
    /// Eco setting (`ecoMode`).
    pub enum EcoMode ("eco mode") {
        Auto = 0 => "auto",
        Powerful = 1 => "powerful",
        Quiet = 2 => "quiet",
    }
}

int_coded_enum! {
    /// Fan speed (`fanSpeed`); 0 lets the unit decide.
    pub enum FanSpeed ("fan speed") {
        Auto = 0 => "auto",
        Level1 = 1 => "1",
        Level2 = 2 => "2",
        Level3 = 3 => "3",
        Level4 = 4 => "4",
        Level5 = 5 => "5",
    }
}

int_coded_enum! {
    /// Aggregation window of a history query (`dataMode`).
    pub enum HistoryDataMode ("history timeframe") {
        Day = 0 => "day",
        Week = 1 => "week",
        Month = 2 => "month",
        Year = 3 => "year",
    }
}

// =====================
// Session
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "uToken")]
    pub u_token: String,
    #[serde(default)]
    pub language: Option<i64>,
    #[serde(default)]
    pub result: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest<'a> {
    pub language: i64,
    pub login_id: &'a str,
    pub password: &'a str,
}

// =====================
// Groups and devices
// =====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Groups {
    pub group_count: Option<i64>,
    #[serde(rename = "groupList")]
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_id: Option<i64>,
    pub group_name: String,
    #[serde(rename = "deviceList")]
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ModeAvailability {
    pub auto_mode: Option<i64>,
    pub fan_mode: Option<i64>,
}

/// Read-only feature set of a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DeviceCapabilities {
    pub auto_mode: Option<bool>,
    pub heat_mode: Option<bool>,
    pub fan_mode: Option<bool>,
    pub dry_mode: Option<bool>,
    pub cool_mode: Option<bool>,
    pub eco_navi: Option<bool>,
    pub nanoe: Option<bool>,
    pub powerful_mode: Option<bool>,
    pub quiet_mode: Option<bool>,
    #[serde(rename = "airSwingLR")]
    pub air_swing_lr: Option<bool>,
    #[serde(rename = "iAutoX")]
    pub i_auto_x: Option<bool>,
    pub eco_function: Option<i64>,
    pub temperature_unit: Option<i64>,
    #[serde(rename = "modeAvlList")]
    pub mode_availability: Option<ModeAvailability>,
    pub auto_temp_max: Option<i64>,
    pub auto_temp_min: Option<i64>,
    pub dry_temp_max: Option<i64>,
    pub dry_temp_min: Option<i64>,
    pub cool_temp_max: Option<i64>,
    pub cool_temp_min: Option<i64>,
    pub heat_temp_max: Option<i64>,
    pub heat_temp_min: Option<i64>,
    pub fan_speed_mode: Option<i64>,
    pub fan_direction_mode: Option<i64>,
}

impl DeviceCapabilities {
    pub fn supports(&self, mode: OperationMode) -> bool {
        let flag = match mode {
            OperationMode::Auto => self.auto_mode,
            OperationMode::Dry => self.dry_mode,
            OperationMode::Cool => self.cool_mode,
            OperationMode::Heat => self.heat_mode,
            OperationMode::Fan => self.fan_mode,
        };
        flag.unwrap_or(false)
    }

    /// Advertised `(min, max)` set point for a mode. Fan mode has no set point.
    pub fn temperature_range(&self, mode: OperationMode) -> Option<(i64, i64)> {
        let (min, max) = match mode {
            OperationMode::Auto => (self.auto_temp_min, self.auto_temp_max),
            OperationMode::Dry => (self.dry_temp_min, self.dry_temp_max),
            OperationMode::Cool => (self.cool_temp_min, self.cool_temp_max),
            OperationMode::Heat => (self.heat_temp_min, self.heat_temp_max),
            OperationMode::Fan => return None,
        };
        Some((min?, max?))
    }
}

/// Current state of a unit, as reported by the status and group endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceParameters {
    pub operate: Power,
    pub operation_mode: OperationMode,
    pub temperature_set: f64,
    pub fan_speed: FanSpeed,
    pub eco_mode: EcoMode,
    pub fan_auto_mode: Option<i64>,
    #[serde(rename = "airSwingLR")]
    pub air_swing_lr: Option<i64>,
    #[serde(rename = "airSwingUD")]
    pub air_swing_ud: Option<i64>,
    pub eco_navi: Option<i64>,
    pub nanoe: Option<i64>,
    #[serde(rename = "iAuto")]
    pub i_auto: Option<i64>,
    pub actual_nanoe: Option<i64>,
    pub air_direction: Option<i64>,
    pub eco_function_data: Option<i64>,
    pub inside_temperature: Option<f64>,
    #[serde(rename = "outTemperature")]
    pub outside_temperature: Option<f64>,
    pub online: Option<bool>,
    pub error_status: Option<i64>,
    pub error_code: Option<i64>,
    pub update_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_guid: Option<String>,
    pub device_type: Option<String>,
    pub device_name: Option<String>,
    pub device_module_number: Option<String>,
    pub device_hash_guid: Option<String>,
    pub permission: Option<i64>,
    pub summer_house: Option<i64>,
    pub timestamp: Option<i64>,
    #[serde(flatten)]
    pub capabilities: DeviceCapabilities,
    pub parameters: DeviceParameters,
}

// =====================
// History
// =====================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest<'a> {
    /// Sent as a decimal string, not a number.
    pub data_mode: String,
    /// `YYYYMMDD`
    pub date: String,
    pub device_guid: &'a str,
    pub os_timezone: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct History {
    pub energy_consumption: Option<f64>,
    pub estimated_cost: Option<f64>,
    pub device_register_time: Option<String>,
    pub currency_unit: Option<String>,
    pub temperature_unit: Option<i64>,
    #[serde(rename = "historyDataList")]
    pub entries: Vec<HistoryEntry>,
}

/// One aggregation bucket. Values equal to [`NO_DATA`] are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub data_number: i64,
    pub consumption: f64,
    pub cost: f64,
    pub average_setting_temp: f64,
    pub average_inside_temp: f64,
    pub average_outside_temp: f64,
}

impl HistoryEntry {
    /// True when at least one measurement of the bucket is not the no-data marker.
    pub fn has_data(&self) -> bool {
        [
            self.consumption,
            self.cost,
            self.average_setting_temp,
            self.average_inside_temp,
            self.average_outside_temp,
        ]
        .iter()
        .any(|v| !is_no_data(*v))
    }
}

pub fn is_no_data(value: f64) -> bool {
    value == NO_DATA
}
