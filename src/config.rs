//! Dashboard settings
//!
//! Refresh rate, columns and thresholds are fixed for this tool. The values live here in
//! one place so the renderer and loop driver read the same numbers; there is no config
//! file or command-line override.

use std::time::Duration;

/// Temperature at or above which a device is shown as critical (°C)
pub const TEMP_CRITICAL_CELSIUS: u32 = 80;

/// Temperature at or above which a device is shown as a warning (°C)
pub const TEMP_WARNING_CELSIUS: u32 = 65;

/// Width of the meter bars in terminal cells
pub const BAR_WIDTH: u16 = 20;

/// Title of the metrics table and of the error panel
pub const TITLE: &str = "GPU Monitor";

/// Title of the outer panel around the metrics table
pub const STATUS_TITLE: &str = "GPU Status";

/// Loop timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Time between two samples
    pub tick_rate: Duration,
    /// Longest stretch the interrupt wait blocks before re-checking for SIGINT
    pub poll_slice: Duration,
}

fn default_tick_rate() -> Duration {
    Duration::from_secs(1)
}

fn default_poll_slice() -> Duration {
    Duration::from_millis(100)
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            poll_slice: default_poll_slice(),
        }
    }
}
