//! Run one sampling session.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tokio::sync::mpsc;

use punchmeter_common::config::{AppConfig, SessionDefaults};
use punchmeter_motion_source::{
    detect_motion_source, MotionSource, PunchProfile, ReplaySource, SyntheticPunchSource,
    UnavailableSource,
};
use punchmeter_session_engine::{SamplingSession, SessionConfig, SessionNotification};

use crate::SourceKind;

const BAR_WIDTH: usize = 30;

pub struct PunchArgs {
    pub source: SourceKind,
    pub trace: Option<PathBuf>,
    pub duration_ms: Option<u64>,
    pub reference: Option<f64>,
    pub epsilon: Option<f64>,
    pub interval_ms: Option<u64>,
    pub json: bool,
}

pub async fn run(config: &AppConfig, args: PunchArgs) -> anyhow::Result<()> {
    let defaults = session_defaults(config, &args);
    defaults.validate()?;

    let source = build_source(&args, &defaults)?;
    let json = args.json;

    if !json {
        println!("Source: {}", source.name());
        println!("Hold your phone and get ready to punch!");
        println!();
    }

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(print_notifications(rx, json));

    let mut session = SamplingSession::new(SessionConfig::from(&defaults), source, Box::new(tx))?;

    let handle = session.handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl+C received, stopping early");
            handle.stop();
        }
    });

    let outcome = session.run_round().await;
    ctrl_c.abort();
    drop(session);
    printer.await?;

    match outcome {
        Ok(_) => {
            if !json {
                println!();
                println!("Ready for another round?");
            }
            Ok(())
        }
        Err(e) if e.is_recoverable() => {
            Err(anyhow::Error::new(e).context("Cannot start a punch session, try again later"))
        }
        Err(e) => Err(e.into()),
    }
}

fn session_defaults(config: &AppConfig, args: &PunchArgs) -> SessionDefaults {
    let mut defaults = config.session.clone();
    if let Some(duration_ms) = args.duration_ms {
        defaults.duration_ms = duration_ms;
    }
    if let Some(reference) = args.reference {
        defaults.reference_speed = reference;
    }
    if let Some(epsilon) = args.epsilon {
        defaults.debounce_epsilon = epsilon;
    }
    if let Some(interval_ms) = args.interval_ms {
        defaults.sample_interval_ms = interval_ms;
    }
    defaults
}

fn build_source(
    args: &PunchArgs,
    defaults: &SessionDefaults,
) -> anyhow::Result<Box<dyn MotionSource>> {
    let source: Box<dyn MotionSource> = match args.source {
        SourceKind::Auto => detect_motion_source(),
        SourceKind::Synthetic => Box::new(SyntheticPunchSource::new(PunchProfile {
            total_ms: defaults.duration_ms,
            ..PunchProfile::default()
        })),
        SourceKind::Replay => {
            let Some(path) = args.trace.as_ref() else {
                bail!("--source replay requires --trace <PATH>");
            };
            let replay = ReplaySource::from_path(path)
                .with_context(|| format!("Failed to load trace {}", path.display()))?;
            Box::new(replay)
        }
        SourceKind::Unavailable => Box::new(UnavailableSource::new("disabled on the command line")),
    };
    Ok(source)
}

async fn print_notifications(mut rx: mpsc::UnboundedReceiver<SessionNotification>, json: bool) {
    while let Some(notification) = rx.recv().await {
        if json {
            match serde_json::to_string(&notification) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize notification"),
            }
            continue;
        }

        match notification {
            SessionNotification::Armed => println!("🥊 PUNCH NOW! 🥊"),
            SessionNotification::Progress { normalized } => {
                print!("\r{}", progress_bar(normalized));
                std::io::stdout().flush().ok();
            }
            SessionNotification::Result { result } => {
                println!();
                println!();
                println!("{result}");
            }
            SessionNotification::Rejected { reason } => {
                println!("Motion sensing is not available here: {reason}");
            }
        }
    }
}

fn progress_bar(normalized: f64) -> String {
    let filled = (normalized.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3.0}%",
        "#".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        normalized * 100.0
    )
}
