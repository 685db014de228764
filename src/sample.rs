//! Per-tick telemetry records

use serde::Serialize;
use std::fmt;

/// Fan reading of one device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanSpeed {
    /// Percentage of maximum fan speed
    Percent(u32),
    /// The device reports no fan (passive cooling) or the query failed
    Unsupported,
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FanSpeed::Percent(p) => write!(f, "{}%", p),
            FanSpeed::Unsupported => write!(f, "N/A"),
        }
    }
}

/// One device's metrics for one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceSample {
    /// 0-based enumeration ordinal
    pub index: u32,
    pub name: String,
    pub temperature_celsius: u32,
    pub fan: FanSpeed,
    pub memory_used_mib: f64,
    pub memory_total_mib: f64,
    /// 0 when the total is 0
    pub memory_used_percent: f64,
    pub gpu_util_percent: u32,
    pub power_usage_watts: f64,
    pub power_limit_watts: f64,
    /// 0 when the limit is 0
    pub power_used_percent: f64,
    /// System-wide, repeated on every device
    pub driver_version: String,
}

/// Sampler output for one tick
///
/// Either every enumerated device was read, or the subsystem could not be used at all.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleResult {
    Devices { devices: Vec<DeviceSample> },
    Unavailable { message: String },
}

impl SampleResult {
    pub fn devices(devices: Vec<DeviceSample>) -> Self {
        SampleResult::Devices { devices }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        SampleResult::Unavailable {
            message: message.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SampleResult::Unavailable { .. })
    }
}

/// `part / whole * 100`, or 0 when `whole` is not positive
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
