//! Hardware-facing motion source implementations.
//!
//! Each backend provides a different way to reach the device accelerometer.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Duration;

use punchmeter_common::config::FAST_SAMPLE_INTERVAL_MS;
use punchmeter_common::error::{PunchError, PunchResult};
use punchmeter_motion_model::MotionSample;

use crate::{MotionSource, SampleHandler, Subscription};

const IIO_DEVICES_DIR: &str = "/sys/bus/iio/devices";

/// Linux Industrial I/O accelerometer read through sysfs.
///
/// Raw axis counts are multiplied by `in_accel_scale` to get m/s². The
/// reported magnitude includes gravity.
pub struct IioAccelerometerSource {
    device_dir: PathBuf,
    scale: f64,
    interval: Duration,
}

impl IioAccelerometerSource {
    /// Open the accelerometer exposed at `device_dir`.
    pub fn open(device_dir: impl Into<PathBuf>) -> PunchResult<Self> {
        let device_dir = device_dir.into();
        if !device_dir.join("in_accel_x_raw").exists() {
            return Err(PunchError::motion_source(format!(
                "{} does not expose an accelerometer",
                device_dir.display()
            )));
        }

        let scale = match read_value(&device_dir.join("in_accel_scale")) {
            Ok(scale) => scale,
            Err(e) => {
                tracing::warn!(error = %e, "No usable in_accel_scale, assuming 1.0");
                1.0
            }
        };

        Ok(Self {
            device_dir,
            scale,
            interval: Duration::from_millis(FAST_SAMPLE_INTERVAL_MS),
        })
    }

    /// Find the first IIO device with accelerometer channels.
    pub fn discover() -> Option<PathBuf> {
        discover_in(Path::new(IIO_DEVICES_DIR))
    }

    /// Read one scaled sample.
    pub fn read_sample(&self) -> PunchResult<MotionSample> {
        read_sample(&self.device_dir, self.scale)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

fn discover_in(root: &Path) -> Option<PathBuf> {
    let mut devices: Vec<PathBuf> = std::fs::read_dir(root)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.join("in_accel_x_raw").exists())
        .collect();
    devices.sort();
    devices.into_iter().next()
}

fn read_value(path: &Path) -> PunchResult<f64> {
    let text = std::fs::read_to_string(path)?;
    text.trim().parse::<f64>().map_err(|e| {
        PunchError::motion_source(format!("Failed to parse {}: {e}", path.display()))
    })
}

fn read_sample(device_dir: &Path, scale: f64) -> PunchResult<MotionSample> {
    let x = read_value(&device_dir.join("in_accel_x_raw"))?;
    let y = read_value(&device_dir.join("in_accel_y_raw"))?;
    let z = read_value(&device_dir.join("in_accel_z_raw"))?;
    Ok(MotionSample::new(x, y, z).scaled(scale))
}

impl MotionSource for IioAccelerometerSource {
    fn name(&self) -> &str {
        "iio-accel"
    }

    fn is_available(&self) -> bool {
        self.device_dir.join("in_accel_x_raw").exists()
    }

    fn set_sample_interval(&mut self, interval: Duration) {
        self.interval = interval.max(Duration::from_millis(1));
    }

    fn subscribe(&mut self, mut handler: SampleHandler) -> PunchResult<Subscription> {
        let device_dir = self.device_dir.clone();
        let scale = self.scale;
        let interval = self.interval;

        tracing::info!(
            device = %device_dir.display(),
            interval_ms = interval.as_millis() as u64,
            "Polling IIO accelerometer"
        );

        Ok(Subscription::spawn(move |active| async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            while active.load(Ordering::SeqCst) {
                ticker.tick().await;
                if !active.load(Ordering::SeqCst) {
                    break;
                }
                match read_sample(&device_dir, scale) {
                    Ok(sample) => handler(sample),
                    Err(e) => tracing::warn!(error = %e, "Accelerometer read failed"),
                }
            }
        }))
    }
}

/// A source for platforms without motion sensing.
pub struct UnavailableSource {
    reason: String,
}

impl UnavailableSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl MotionSource for UnavailableSource {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn set_sample_interval(&mut self, _interval: Duration) {}

    fn subscribe(&mut self, _handler: SampleHandler) -> PunchResult<Subscription> {
        Err(PunchError::unsupported_platform(self.name()))
    }
}

/// Detect the best available motion source for the current system.
pub fn detect_motion_source() -> Box<dyn MotionSource> {
    if cfg!(target_os = "linux") {
        if let Some(device_dir) = IioAccelerometerSource::discover() {
            match IioAccelerometerSource::open(&device_dir) {
                Ok(source) => {
                    tracing::info!(device = %device_dir.display(), "Using IIO accelerometer");
                    return Box::new(source);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to open IIO accelerometer");
                }
            }
        }
    }

    let reason = if cfg!(target_os = "linux") {
        format!("no accelerometer found under {IIO_DEVICES_DIR}")
    } else {
        "motion sensing is not supported on this platform".to_string()
    };
    tracing::warn!(%reason, "No motion source available");
    Box::new(UnavailableSource::new(reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_device(name: &str, x: &str, y: &str, z: &str, scale: Option<&str>) -> PathBuf {
        let root = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&root);
        let device = root.join("iio:device0");
        std::fs::create_dir_all(&device).unwrap();
        std::fs::write(device.join("in_accel_x_raw"), x).unwrap();
        std::fs::write(device.join("in_accel_y_raw"), y).unwrap();
        std::fs::write(device.join("in_accel_z_raw"), z).unwrap();
        if let Some(scale) = scale {
            std::fs::write(device.join("in_accel_scale"), scale).unwrap();
        }
        std::fs::create_dir_all(root.join("iio:device1")).unwrap();
        root
    }

    #[test]
    fn reads_scaled_sample_from_sysfs() {
        let root = fake_device("punchmeter_test_iio", "300\n", "-400\n", "0\n", Some("0.01\n"));
        let device = discover_in(&root).unwrap();
        assert!(device.ends_with("iio:device0"));

        let source = IioAccelerometerSource::open(&device).unwrap();
        assert!(source.is_available());
        let sample = source.read_sample().unwrap();
        assert!((sample.magnitude() - 5.0).abs() < 1e-9);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn missing_scale_defaults_to_one() {
        let root = fake_device("punchmeter_test_iio_noscale", "1", "2", "2", None);
        let source = IioAccelerometerSource::open(root.join("iio:device0")).unwrap();
        assert_eq!(source.scale(), 1.0);
        assert_eq!(source.read_sample().unwrap().magnitude(), 3.0);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn garbage_reading_is_an_error() {
        let root = fake_device("punchmeter_test_iio_garbage", "abc", "0", "0", None);
        let source = IioAccelerometerSource::open(root.join("iio:device0")).unwrap();
        assert!(matches!(
            source.read_sample(),
            Err(PunchError::MotionSource { .. })
        ));
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn directory_without_channels_is_rejected() {
        let root = std::env::temp_dir().join("punchmeter_test_iio_empty");
        std::fs::create_dir_all(&root).unwrap();
        assert!(IioAccelerometerSource::open(&root).is_err());
        assert!(discover_in(&root).is_none());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn unavailable_source_refuses_subscription() {
        let mut source = UnavailableSource::new("no sensor");
        assert!(!source.is_available());
        assert_eq!(source.reason(), "no sensor");
        assert!(matches!(
            source.subscribe(Box::new(|_| {})),
            Err(PunchError::UnsupportedPlatform { .. })
        ));
    }
}
