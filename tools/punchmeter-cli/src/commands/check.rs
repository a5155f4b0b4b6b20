//! Check for a usable motion sensor.

use punchmeter_common::config::{config_file_path, AppConfig};
use punchmeter_motion_source::{detect_motion_source, IioAccelerometerSource};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("PunchMeter System Check");
    println!("{}", "=".repeat(50));

    let source = detect_motion_source();
    if source.is_available() {
        println!("[OK] Motion source: {}", source.name());
    } else {
        println!("[WARN] Motion source: {} (punch --source synthetic still works)", source.name());
    }

    if let Some(device_dir) = IioAccelerometerSource::discover() {
        match IioAccelerometerSource::open(&device_dir).and_then(|s| s.read_sample()) {
            Ok(sample) => println!(
                "     {} reads ({:.2}, {:.2}, {:.2}) |a| = {:.2} m/s²",
                device_dir.display(),
                sample.x,
                sample.y,
                sample.z,
                sample.magnitude()
            ),
            Err(e) => println!("[WARN] {} is not readable: {e}", device_dir.display()),
        }
    }

    println!();
    println!("Config: {}", config_file_path().display());
    let session = &config.session;
    println!("     duration:       {} ms", session.duration_ms);
    println!("     reference:      {} m/s²", session.reference_speed);
    println!("     debounce:       {}", session.debounce_epsilon);
    println!("     sample interval: {} ms", session.sample_interval_ms);

    println!();
    if source.is_available() {
        println!("A motion sensor is available. PunchMeter is ready.");
    } else {
        println!("No motion sensor found. Sessions on this machine will be refused.");
    }

    Ok(())
}
