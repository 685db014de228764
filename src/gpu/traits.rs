//! Traits for the hardware-management subsystem
//!
//! A [`Subsystem`] hands out a [`Session`] per sampling pass. The session keeps the
//! management library initialized for as long as it lives and shuts it down when
//! dropped, so every pass is acquire, query, release.

use crate::error::Result;

/// Memory usage of a device in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryInfo {
    /// Used memory in bytes
    pub used: u64,
    /// Total memory in bytes
    pub total: u64,
}

/// Entry point to a hardware-management library
pub trait Subsystem {
    /// Initialize the library and open a session.
    ///
    /// Fails when the library or driver is unavailable. No shutdown is needed after a
    /// failed open.
    fn open(&self) -> Result<Box<dyn Session + '_>>;
}

/// An initialized management library; shuts the library down on drop
pub trait Session {
    /// Number of devices visible to the library
    fn device_count(&self) -> Result<u32>;

    /// System-wide driver version string
    fn driver_version(&self) -> Result<String>;

    /// Handle to the device at `index` (0-based)
    fn device(&self, index: u32) -> Result<Box<dyn Device + '_>>;
}

/// Per-device queries
pub trait Device {
    /// Product name (e.g., "NVIDIA GeForce RTX 4090")
    fn name(&self) -> Result<String>;

    /// GPU die temperature in °C
    fn temperature(&self) -> Result<u32>;

    /// Fan speed as a percentage of maximum; fails on passively cooled boards
    fn fan_speed(&self) -> Result<u32>;

    /// Memory usage in bytes
    fn memory(&self) -> Result<MemoryInfo>;

    /// GPU utilization percentage over the last sample period
    fn utilization(&self) -> Result<u32>;

    /// Current power draw in milliwatts
    fn power_usage(&self) -> Result<u32>;

    /// Enforced power limit in milliwatts
    fn power_limit(&self) -> Result<u32>;
}
