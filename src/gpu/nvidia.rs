// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2024 NervoSys

//! NVIDIA GPU backend via NVML
//!
//! Each [`Session`] owns an `Nvml` instance. `nvml-wrapper` calls `nvmlShutdown` when
//! that instance is dropped, which ends the session.

use crate::error::{Error, Result};
use crate::gpu::traits::*;

#[cfg(feature = "nvidia")]
use nvml_wrapper::{enum_wrappers::device::TemperatureSensor, Device as NvmlDevice, Nvml};

/// NVML-backed subsystem
#[derive(Debug, Default, Clone, Copy)]
pub struct NvmlSubsystem;

impl NvmlSubsystem {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "nvidia")]
impl Subsystem for NvmlSubsystem {
    fn open(&self) -> Result<Box<dyn Session + '_>> {
        let nvml = Nvml::init()?;
        log::debug!("NVML initialized");
        Ok(Box::new(NvmlSession { nvml }))
    }
}

#[cfg(not(feature = "nvidia"))]
impl Subsystem for NvmlSubsystem {
    fn open(&self) -> Result<Box<dyn Session + '_>> {
        Err(Error::Subsystem(
            "NVIDIA support not compiled in".to_string(),
        ))
    }
}

#[cfg(feature = "nvidia")]
struct NvmlSession {
    nvml: Nvml,
}

#[cfg(feature = "nvidia")]
impl Session for NvmlSession {
    fn device_count(&self) -> Result<u32> {
        Ok(self.nvml.device_count()?)
    }

    fn driver_version(&self) -> Result<String> {
        Ok(self.nvml.sys_driver_version()?)
    }

    fn device(&self, index: u32) -> Result<Box<dyn Device + '_>> {
        let device = self.nvml.device_by_index(index)?;
        Ok(Box::new(NvidiaGpu { device }))
    }
}

#[cfg(feature = "nvidia")]
impl Drop for NvmlSession {
    fn drop(&mut self) {
        log::debug!("NVML session released");
    }
}

#[cfg(feature = "nvidia")]
struct NvidiaGpu<'nvml> {
    device: NvmlDevice<'nvml>,
}

#[cfg(feature = "nvidia")]
impl Device for NvidiaGpu<'_> {
    fn name(&self) -> Result<String> {
        Ok(self.device.name()?)
    }

    fn temperature(&self) -> Result<u32> {
        Ok(self.device.temperature(TemperatureSensor::Gpu)?)
    }

    fn fan_speed(&self) -> Result<u32> {
        self.device.fan_speed(0).map_err(|e| match e {
            nvml_wrapper::error::NvmlError::NotSupported => Error::NotSupported,
            other => Error::Nvml(other),
        })
    }

    fn memory(&self) -> Result<MemoryInfo> {
        let mem = self.device.memory_info()?;
        Ok(MemoryInfo {
            used: mem.used,
            total: mem.total,
        })
    }

    fn utilization(&self) -> Result<u32> {
        Ok(self.device.utilization_rates()?.gpu)
    }

    fn power_usage(&self) -> Result<u32> {
        Ok(self.device.power_usage()?)
    }

    fn power_limit(&self) -> Result<u32> {
        Ok(self.device.enforced_power_limit()?)
    }
}
