//! Application state

use super::frame::{render, Clock, Frame, LocalClock};
use crate::config::DashboardConfig;
use crate::gpu::traits::Subsystem;
use crate::sampler::Sampler;
use std::time::Duration;

/// Produces one [`Frame`] per tick
///
/// Holds no per-tick state; every frame comes from a fresh sample.
pub struct App<S, C = LocalClock> {
    sampler: Sampler<S>,
    clock: C,
    config: DashboardConfig,
}

impl<S: Subsystem, C: Clock> App<S, C> {
    pub fn new(sampler: Sampler<S>, clock: C, config: DashboardConfig) -> Self {
        Self {
            sampler,
            clock,
            config,
        }
    }

    /// Time between two frames
    pub fn tick_rate(&self) -> Duration {
        self.config.tick_rate
    }

    /// Sample the GPUs and build the frame for this tick
    pub fn next_frame(&self) -> Frame {
        let result = self.sampler.sample();
        render(&result, &self.clock)
    }
}
