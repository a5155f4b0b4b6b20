//! Classify a peak without running a session.

use punchmeter_common::config::AppConfig;
use punchmeter_session_engine::ResultClassifier;

pub fn run(config: &AppConfig, peak: f64, reference: Option<f64>, json: bool) -> anyhow::Result<()> {
    let mut defaults = config.session.clone();
    if let Some(reference) = reference {
        defaults.reference_speed = reference;
    }
    defaults.validate()?;
    if !peak.is_finite() || peak < 0.0 {
        anyhow::bail!("peak must be a non-negative number, got {peak}");
    }

    let result = ResultClassifier::new(defaults.reference_speed).classify(peak);
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{result}");
        println!("Tier: {} (reference {} m/s)", result.tier, defaults.reference_speed);
    }
    Ok(())
}
