//! GPU sampling
//!
//! [`Sampler::sample`] performs one complete pass over the hardware-management subsystem:
//! open a session, read every device, release the session. Subsystem failures come back
//! as [`SampleResult::Unavailable`] so the dashboard can show them and keep polling.

use crate::error::Result;
use crate::gpu::traits::{Session, Subsystem};
use crate::sample::{percent_of, DeviceSample, FanSpeed, SampleResult};

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;
const MILLIWATTS_PER_WATT: f64 = 1000.0;

/// Reads one [`SampleResult`] per call from a [`Subsystem`]
#[derive(Debug, Clone)]
pub struct Sampler<S> {
    subsystem: S,
}

impl<S: Subsystem> Sampler<S> {
    pub fn new(subsystem: S) -> Self {
        Self { subsystem }
    }

    /// Sample every device once.
    ///
    /// Never fails: an unusable subsystem yields [`SampleResult::Unavailable`] with the
    /// subsystem's diagnostic text. The session is dropped, and the library shut down,
    /// before this returns on every path.
    pub fn sample(&self) -> SampleResult {
        let session = match self.subsystem.open() {
            Ok(session) => session,
            Err(e) => {
                log::warn!("GPU subsystem unavailable: {}", e);
                return SampleResult::unavailable(e.to_string());
            }
        };

        match read_devices(session.as_ref()) {
            Ok(devices) => {
                log::debug!("Sampled {} GPU(s)", devices.len());
                SampleResult::devices(devices)
            }
            Err(e) => {
                log::warn!("GPU query failed: {}", e);
                SampleResult::unavailable(e.to_string())
            }
        }
    }
}

fn read_devices(session: &dyn Session) -> Result<Vec<DeviceSample>> {
    let count = session.device_count()?;
    let driver_version = session.driver_version()?;

    let mut devices = Vec::with_capacity(count as usize);
    for index in 0..count {
        devices.push(read_device(session, index, &driver_version)?);
    }
    Ok(devices)
}

fn read_device(session: &dyn Session, index: u32, driver_version: &str) -> Result<DeviceSample> {
    let device = session.device(index)?;

    let name = device.name()?;
    let temperature_celsius = device.temperature()?;

    // Passively cooled boards fail this query; the rest of the sample still stands.
    let fan = match device.fan_speed() {
        Ok(percent) => FanSpeed::Percent(percent),
        Err(e) => {
            log::debug!("GPU {} fan speed unavailable: {}", index, e);
            FanSpeed::Unsupported
        }
    };

    let memory = device.memory()?;
    let memory_used_mib = memory.used as f64 / BYTES_PER_MIB;
    let memory_total_mib = memory.total as f64 / BYTES_PER_MIB;

    let gpu_util_percent = device.utilization()?;

    let power_usage_watts = device.power_usage()? as f64 / MILLIWATTS_PER_WATT;
    let power_limit_watts = device.power_limit()? as f64 / MILLIWATTS_PER_WATT;

    Ok(DeviceSample {
        index,
        name,
        temperature_celsius,
        fan,
        memory_used_mib,
        memory_total_mib,
        memory_used_percent: percent_of(memory_used_mib, memory_total_mib),
        gpu_util_percent,
        power_usage_watts,
        power_limit_watts,
        power_used_percent: percent_of(power_usage_watts, power_limit_watts),
        driver_version: driver_version.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::fake::{FakeDevice, FakeSubsystem};

    fn devices_of(result: SampleResult) -> Vec<DeviceSample> {
        match result {
            SampleResult::Devices { devices } => devices,
            SampleResult::Unavailable { message } => panic!("unexpected outage: {}", message),
        }
    }

    #[test]
    fn test_sample_reads_all_fields() {
        let fake = FakeSubsystem::new(vec![FakeDevice::new("NVIDIA A100")
            .temperature(85)
            .fan(None)
            .memory_mib(8192, 16384)
            .utilization(42)
            .power_watts(150, 250)])
        .with_driver_version("535.104.05");
        let sampler = Sampler::new(fake.clone());

        let devices = devices_of(sampler.sample());
        assert_eq!(devices.len(), 1);

        let gpu = &devices[0];
        assert_eq!(gpu.index, 0);
        assert_eq!(gpu.name, "NVIDIA A100");
        assert_eq!(gpu.temperature_celsius, 85);
        assert_eq!(gpu.fan, FanSpeed::Unsupported);
        assert_eq!(gpu.memory_used_mib, 8192.0);
        assert_eq!(gpu.memory_total_mib, 16384.0);
        assert_eq!(gpu.memory_used_percent, 50.0);
        assert_eq!(gpu.gpu_util_percent, 42);
        assert_eq!(gpu.power_usage_watts, 150.0);
        assert_eq!(gpu.power_limit_watts, 250.0);
        assert_eq!(gpu.power_used_percent, 60.0);
        assert_eq!(gpu.driver_version, "535.104.05");
        assert_eq!(fake.live_sessions(), 0);
    }

    #[test]
    fn test_sample_preserves_enumeration_order() {
        let fake = FakeSubsystem::new(vec![
            FakeDevice::new("GPU A"),
            FakeDevice::new("GPU B").fan(Some(70)),
            FakeDevice::new("GPU C"),
        ]);
        let devices = devices_of(Sampler::new(fake).sample());

        let names: Vec<_> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["GPU A", "GPU B", "GPU C"]);
        let indices: Vec<_> = devices.iter().map(|d| d.index).collect();
        assert_eq!(indices, [0, 1, 2]);
        assert_eq!(devices[1].fan, FanSpeed::Percent(70));
    }

    #[test]
    fn test_unsupported_fan_only_affects_its_device() {
        let fake = FakeSubsystem::new(vec![
            FakeDevice::new("Passive").fan(None),
            FakeDevice::new("Active").fan(Some(55)),
        ]);
        let devices = devices_of(Sampler::new(fake).sample());
        assert_eq!(devices[0].fan, FanSpeed::Unsupported);
        assert_eq!(devices[1].fan, FanSpeed::Percent(55));
    }

    #[test]
    fn test_zero_totals_give_zero_percent() {
        let fake = FakeSubsystem::new(vec![FakeDevice::new("Odd")
            .memory_mib(0, 0)
            .power_watts(0, 0)]);
        let devices = devices_of(Sampler::new(fake).sample());
        assert_eq!(devices[0].memory_used_percent, 0.0);
        assert_eq!(devices[0].power_used_percent, 0.0);

        let fake = FakeSubsystem::new(vec![FakeDevice::new("No limit").power_watts(120, 0)]);
        let devices = devices_of(Sampler::new(fake).sample());
        assert_eq!(devices[0].power_used_percent, 0.0);
        assert_eq!(devices[0].power_usage_watts, 120.0);
    }

    #[test]
    fn test_no_devices_is_ok() {
        let fake = FakeSubsystem::new(Vec::new());
        assert_eq!(
            Sampler::new(fake).sample(),
            SampleResult::devices(Vec::new())
        );
    }

    #[test]
    fn test_init_failure_is_reported_as_data() {
        let sampler = Sampler::new(FakeSubsystem::unavailable("Driver not loaded"));
        assert_eq!(
            sampler.sample(),
            SampleResult::unavailable("Driver not loaded")
        );
    }

    #[test]
    fn test_repeated_outage_is_stable() {
        let fake = FakeSubsystem::unavailable("Driver not loaded");
        let sampler = Sampler::new(fake.clone());
        for _ in 0..5 {
            assert!(sampler.sample().is_unavailable());
        }
        assert_eq!(fake.opens(), 5);
        assert_eq!(fake.live_sessions(), 0);
    }

    #[test]
    fn test_recovers_when_subsystem_returns() {
        let fake = FakeSubsystem::new(vec![FakeDevice::new("GPU 0")])
            .fail_next_opens(["Driver not loaded"]);
        let sampler = Sampler::new(fake);

        assert!(sampler.sample().is_unavailable());
        assert_eq!(devices_of(sampler.sample()).len(), 1);
    }

    #[test]
    fn test_device_query_failure_fails_whole_sample() {
        let fake = FakeSubsystem::new(vec![
            FakeDevice::new("Healthy"),
            FakeDevice::new("Broken").failing_query("GPU is lost"),
        ]);
        let sampler = Sampler::new(fake.clone());

        assert_eq!(sampler.sample(), SampleResult::unavailable("GPU is lost"));
        assert_eq!(fake.opens(), 1);
        assert_eq!(fake.live_sessions(), 0);
    }
}
