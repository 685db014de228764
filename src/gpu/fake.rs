//! Scripted in-memory subsystem
//!
//! Stands in for NVML when no hardware is present. Clones share state, so a test can keep
//! a handle, hand another to the [`Sampler`](crate::Sampler), and then flip availability or
//! inspect how many sessions were opened and released.

use crate::error::{Error, Result};
use crate::gpu::traits::*;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

const MIB: u64 = 1024 * 1024;

/// One simulated device
#[derive(Debug, Clone, PartialEq)]
pub struct FakeDevice {
    pub name: String,
    pub temperature: u32,
    /// `None` for a passively cooled board
    pub fan_speed: Option<u32>,
    pub memory: MemoryInfo,
    pub utilization: u32,
    /// Milliwatts
    pub power_usage: u32,
    /// Milliwatts
    pub power_limit: u32,
    /// When set, the temperature query fails with this message
    pub query_failure: Option<String>,
}

impl FakeDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temperature: 40,
            fan_speed: Some(30),
            memory: MemoryInfo {
                used: 1024 * MIB,
                total: 8192 * MIB,
            },
            utilization: 0,
            power_usage: 50_000,
            power_limit: 250_000,
            query_failure: None,
        }
    }

    pub fn temperature(mut self, celsius: u32) -> Self {
        self.temperature = celsius;
        self
    }

    pub fn fan(mut self, percent: Option<u32>) -> Self {
        self.fan_speed = percent;
        self
    }

    pub fn memory_mib(mut self, used: u64, total: u64) -> Self {
        self.memory = MemoryInfo {
            used: used * MIB,
            total: total * MIB,
        };
        self
    }

    pub fn utilization(mut self, percent: u32) -> Self {
        self.utilization = percent;
        self
    }

    pub fn power_watts(mut self, usage: u32, limit: u32) -> Self {
        self.power_usage = usage * 1000;
        self.power_limit = limit * 1000;
        self
    }

    pub fn failing_query(mut self, message: impl Into<String>) -> Self {
        self.query_failure = Some(message.into());
        self
    }
}

#[derive(Debug, Default)]
struct FakeState {
    devices: RefCell<Vec<FakeDevice>>,
    driver_version: RefCell<String>,
    /// Messages for upcoming failed opens, consumed front first
    scripted_failures: RefCell<VecDeque<String>>,
    /// Fails every open while set
    outage: RefCell<Option<String>>,
    opens: Cell<usize>,
    live_sessions: Cell<usize>,
}

/// Scripted subsystem
#[derive(Debug, Clone, Default)]
pub struct FakeSubsystem {
    state: Rc<FakeState>,
}

impl FakeSubsystem {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        let fake = Self::default();
        *fake.state.devices.borrow_mut() = devices;
        *fake.state.driver_version.borrow_mut() = "550.54.14".to_string();
        fake
    }

    /// A subsystem whose every open fails with `message`
    pub fn unavailable(message: impl Into<String>) -> Self {
        let fake = Self::new(Vec::new());
        fake.set_outage(Some(message.into()));
        fake
    }

    pub fn with_driver_version(self, version: impl Into<String>) -> Self {
        *self.state.driver_version.borrow_mut() = version.into();
        self
    }

    /// Fail the next `messages.len()` opens, in order
    pub fn fail_next_opens<I, S>(self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state
            .scripted_failures
            .borrow_mut()
            .extend(messages.into_iter().map(Into::into));
        self
    }

    pub fn set_outage(&self, message: Option<String>) {
        *self.state.outage.borrow_mut() = message;
    }

    pub fn set_devices(&self, devices: Vec<FakeDevice>) {
        *self.state.devices.borrow_mut() = devices;
    }

    /// Number of successful and failed open attempts so far
    pub fn opens(&self) -> usize {
        self.state.opens.get()
    }

    /// Sessions opened and not yet dropped
    pub fn live_sessions(&self) -> usize {
        self.state.live_sessions.get()
    }
}

impl Subsystem for FakeSubsystem {
    fn open(&self) -> Result<Box<dyn Session + '_>> {
        self.state.opens.set(self.state.opens.get() + 1);

        if let Some(message) = self.state.scripted_failures.borrow_mut().pop_front() {
            return Err(Error::Subsystem(message));
        }
        if let Some(message) = self.state.outage.borrow().clone() {
            return Err(Error::Subsystem(message));
        }

        self.state
            .live_sessions
            .set(self.state.live_sessions.get() + 1);
        Ok(Box::new(FakeSession {
            state: self.state.as_ref(),
            devices: self.state.devices.borrow().clone(),
        }))
    }
}

struct FakeSession<'a> {
    state: &'a FakeState,
    devices: Vec<FakeDevice>,
}

impl Session for FakeSession<'_> {
    fn device_count(&self) -> Result<u32> {
        Ok(self.devices.len() as u32)
    }

    fn driver_version(&self) -> Result<String> {
        Ok(self.state.driver_version.borrow().clone())
    }

    fn device(&self, index: u32) -> Result<Box<dyn Device + '_>> {
        self.devices
            .get(index as usize)
            .map(|device| Box::new(device) as Box<dyn Device + '_>)
            .ok_or_else(|| Error::Subsystem(format!("Invalid Argument: device {}", index)))
    }
}

impl Drop for FakeSession<'_> {
    fn drop(&mut self) {
        self.state
            .live_sessions
            .set(self.state.live_sessions.get().saturating_sub(1));
    }
}

impl Device for &FakeDevice {
    fn name(&self) -> Result<String> {
        Ok(self.name.clone())
    }

    fn temperature(&self) -> Result<u32> {
        match &self.query_failure {
            Some(message) => Err(Error::Subsystem(message.clone())),
            None => Ok(self.temperature),
        }
    }

    fn fan_speed(&self) -> Result<u32> {
        self.fan_speed.ok_or(Error::NotSupported)
    }

    fn memory(&self) -> Result<MemoryInfo> {
        Ok(self.memory)
    }

    fn utilization(&self) -> Result<u32> {
        Ok(self.utilization)
    }

    fn power_usage(&self) -> Result<u32> {
        Ok(self.power_usage)
    }

    fn power_limit(&self) -> Result<u32> {
        Ok(self.power_limit)
    }
}
