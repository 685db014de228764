//! Frame construction
//!
//! [`render`] turns a [`SampleResult`] into a [`Frame`]: every string and severity the
//! screen will show, decided up front. Drawing the frame onto a terminal buffer lives in
//! `ui.rs`.

use crate::config::{TEMP_CRITICAL_CELSIUS, TEMP_WARNING_CELSIUS};
use crate::sample::{DeviceSample, FanSpeed, SampleResult};
use chrono::NaiveDateTime;

/// Footer timestamp format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column headers, in display order
pub const COLUMNS: [&str; 7] = [
    "ID",
    "GPU Name",
    "Temp",
    "Fan",
    "Power (W)",
    "Memory (MiB)",
    "GPU Util",
];

/// Source of the footer timestamp
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Temperature band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Warning,
    Critical,
}

impl Severity {
    pub fn from_celsius(celsius: u32) -> Self {
        match celsius {
            t if t >= TEMP_CRITICAL_CELSIUS => Severity::Critical,
            t if t >= TEMP_WARNING_CELSIUS => Severity::Warning,
            _ => Severity::Normal,
        }
    }
}

/// Text plus a bar on a fixed 0-100 scale
#[derive(Debug, Clone, PartialEq)]
pub struct Meter {
    pub label: String,
    /// True percentage; may exceed 100
    pub percent: f64,
}

impl Meter {
    /// Bar fill in `[0, 1]`
    pub fn ratio(&self) -> f64 {
        if self.percent.is_nan() {
            return 0.0;
        }
        (self.percent / 100.0).clamp(0.0, 1.0)
    }
}

/// One table row
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRow {
    pub id: String,
    pub name: String,
    pub temperature: String,
    pub severity: Severity,
    pub fan: FanSpeed,
    pub power: Meter,
    pub memory: Meter,
    pub utilization: Meter,
}

impl DeviceRow {
    fn from_sample(gpu: &DeviceSample) -> Self {
        Self {
            id: gpu.index.to_string(),
            name: gpu.name.clone(),
            temperature: format!("{}°C", gpu.temperature_celsius),
            severity: Severity::from_celsius(gpu.temperature_celsius),
            fan: gpu.fan,
            power: Meter {
                label: format!(
                    "{:.1}W / {:.0}W",
                    gpu.power_usage_watts, gpu.power_limit_watts
                ),
                percent: gpu.power_used_percent,
            },
            memory: Meter {
                label: format!(
                    "{:.0}MiB / {:.0}MiB",
                    gpu.memory_used_mib, gpu.memory_total_mib
                ),
                percent: gpu.memory_used_percent,
            },
            utilization: Meter {
                label: format!("{}%", gpu.gpu_util_percent),
                percent: gpu.gpu_util_percent as f64,
            },
        }
    }
}

/// Footer line of the table frame
#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    pub driver_version: String,
    pub timestamp: String,
}

impl Footer {
    pub fn text(&self) -> String {
        format!(
            "NVIDIA Driver: {} | Last updated: {}",
            self.driver_version, self.timestamp
        )
    }
}

/// Everything shown for one tick
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// The subsystem could not be used
    Error { message: String },
    /// Metrics table, one row per device
    Table { rows: Vec<DeviceRow>, footer: Footer },
}

impl Frame {
    pub fn rows(&self) -> &[DeviceRow] {
        match self {
            Frame::Table { rows, .. } => rows.as_slice(),
            Frame::Error { .. } => &[],
        }
    }
}

/// Build the frame for one sample
pub fn render(result: &SampleResult, clock: &dyn Clock) -> Frame {
    match result {
        SampleResult::Unavailable { message } => Frame::Error {
            message: message.clone(),
        },
        SampleResult::Devices { devices } => {
            let rows = devices.iter().map(DeviceRow::from_sample).collect();
            let driver_version = devices
                .first()
                .map(|gpu| gpu.driver_version.clone())
                .unwrap_or_else(|| "N/A".to_string());
            Frame::Table {
                rows,
                footer: Footer {
                    driver_version,
                    timestamp: clock.now().format(TIMESTAMP_FORMAT).to_string(),
                },
            }
        }
    }
}
