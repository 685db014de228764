//! # gpulive
//!
//! A live terminal dashboard for NVIDIA GPUs. Once a second it reads temperature, fan
//! speed, memory, utilization and power for every device through NVML and redraws a
//! full-screen table until interrupted.
//!
//! ## Features
//!
//! - **Per-tick sessions**: NVML is initialized and shut down on every sample, so the
//!   dashboard picks the driver back up as soon as it becomes available
//! - **Degrades, never crashes**: a missing driver becomes an error panel and polling goes
//!   on; a fanless board shows `N/A` in the fan column
//! - **Testable core**: the sampler, renderer and loop run against an in-memory subsystem
//!   and any ratatui backend
//!
//! ## Quick Start
//!
//! ```no_run
//! use gpulive::{render, LocalClock, NvmlSubsystem, Sampler};
//!
//! let sampler = Sampler::new(NvmlSubsystem::new());
//! let frame = render(&sampler.sample(), &LocalClock);
//! println!("{:#?}", frame);
//! ```
//!
//! ## Feature Flags
//!
//! - `nvidia` (default) - NVIDIA GPU support via NVML (requires the NVIDIA driver at runtime)

pub mod config; // Fixed dashboard settings
pub mod error;
pub mod gpu; // Hardware-management subsystem abstraction
pub mod sample; // Per-tick telemetry records
pub mod sampler;
pub mod tui; // Terminal UI and loop driver

pub use config::DashboardConfig;
pub use error::{Error, Result};
pub use gpu::{FakeDevice, FakeSubsystem, NvmlSubsystem, Subsystem};
pub use sample::{DeviceSample, FanSpeed, SampleResult};
pub use sampler::Sampler;
pub use tui::{render, App, Clock, FixedClock, Frame, LocalClock, Severity};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
