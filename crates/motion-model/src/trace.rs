//! Recorded sample traces.
//!
//! A trace is a JSONL file with one sample per line. Lines starting with `#`
//! are comments. The `t` field is the offset in milliseconds from the start
//! of the recording; it may be omitted, in which case a replaying source
//! falls back to its configured sample interval.
//!
//! ```text
//! # right hook, phone in hand
//! {"t":0,"x":0.02,"y":0.01,"z":0.03}
//! {"t":16,"x":4.1,"y":1.2,"z":0.8}
//! ```

use serde::{Deserialize, Serialize};

use crate::sample::MotionSample;

/// Milliseconds since the start of a trace.
pub type OffsetMs = u64;

/// A sample with its optional position in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub offset_ms: Option<OffsetMs>,

    #[serde(flatten)]
    pub sample: MotionSample,
}

impl TraceSample {
    pub fn at(offset_ms: OffsetMs, sample: MotionSample) -> Self {
        Self {
            offset_ms: Some(offset_ms),
            sample,
        }
    }

    pub fn untimed(sample: MotionSample) -> Self {
        Self {
            offset_ms: None,
            sample,
        }
    }
}

/// Parse a JSONL trace, skipping blank and comment lines.
pub fn parse_trace(jsonl: &str) -> Result<Vec<TraceSample>, serde_json::Error> {
    jsonl
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(serde_json::from_str)
        .collect()
}

/// Serialize samples to JSONL format.
pub fn serialize_trace(samples: &[TraceSample]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for sample in samples {
        output.push_str(&serde_json::to_string(sample)?);
        output.push('\n');
    }
    Ok(output)
}

/// Whether the offsets of `samples` never go backwards.
pub fn is_time_ordered(samples: &[TraceSample]) -> bool {
    samples
        .iter()
        .filter_map(|s| s.offset_ms)
        .try_fold(0, |prev, t| (t >= prev).then_some(t))
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_comments_and_blank_lines() {
        let jsonl = "# warmup\n\n{\"t\":0,\"x\":0.0,\"y\":0.0,\"z\":0.05}\n  {\"t\":16,\"x\":12.0,\"y\":0.0,\"z\":0.0}\n";
        let samples = parse_trace(jsonl).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].offset_ms, Some(16));
        assert_eq!(samples[1].sample.magnitude(), 12.0);
    }

    #[test]
    fn offset_is_optional() {
        let samples = parse_trace(r#"{"x":1.0,"y":2.0,"z":2.0}"#).unwrap();
        assert_eq!(samples[0], TraceSample::untimed(MotionSample::new(1.0, 2.0, 2.0)));
        let json = serialize_trace(&samples).unwrap();
        assert!(!json.contains("\"t\""));
    }

    #[test]
    fn malformed_line_is_an_error() {
        assert!(parse_trace("{\"t\":0,\"x\":1.0}").is_err());
    }

    #[test]
    fn detects_out_of_order_offsets() {
        let ordered = vec![
            TraceSample::at(0, MotionSample::default()),
            TraceSample::untimed(MotionSample::default()),
            TraceSample::at(16, MotionSample::default()),
        ];
        assert!(is_time_ordered(&ordered));

        let unordered = vec![
            TraceSample::at(32, MotionSample::default()),
            TraceSample::at(16, MotionSample::default()),
        ];
        assert!(!is_time_ordered(&unordered));
    }
}
