// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2024 NervoSys

//! Hardware-management subsystem layer
//!
//! The [`Subsystem`] / [`Session`] / [`Device`] traits describe what the sampler needs from
//! a GPU management library. [`NvmlSubsystem`] implements them on NVIDIA's NVML;
//! [`FakeSubsystem`] is an in-memory stand-in for tests and hardware-free runs.
//!
//! # Example
//!
//! ```no_run
//! use gpulive::gpu::{Device, NvmlSubsystem, Session, Subsystem};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let nvml = NvmlSubsystem::new();
//! let session = nvml.open()?;
//! for index in 0..session.device_count()? {
//!     let device = session.device(index)?;
//!     println!("GPU {}: {} at {}°C", index, device.name()?, device.temperature()?);
//! }
//! // NVML shuts down when `session` is dropped
//! # Ok(())
//! # }
//! ```

pub mod fake;
pub mod nvidia;
pub mod traits;

pub use fake::{FakeDevice, FakeSubsystem};
pub use nvidia::NvmlSubsystem;
pub use traits::{Device, MemoryInfo, Session, Subsystem};
