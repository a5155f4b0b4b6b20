use std::time::Duration;

use proptest::prelude::*;
use tokio::sync::mpsc;

use punchmeter_common::config::SESSION_DURATION_MS;
use punchmeter_motion_model::{MotionSample, ResultTier, TraceSample};
use punchmeter_motion_source::{
    PunchProfile, ReplaySource, StubSource, SyntheticPunchSource, UnavailableSource,
};
use punchmeter_session_engine::{
    RecordingObserver, SamplingSession, SessionConfig, SessionNotification, SessionState,
};

fn trace_of(magnitudes: &[f64]) -> Vec<TraceSample> {
    magnitudes
        .iter()
        .map(|&m| TraceSample::untimed(MotionSample::along_x(m)))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn synthetic_punch_is_classified_at_timeout() {
    punchmeter_common::logging::init_default_logging();

    let observer = RecordingObserver::new();
    let mut session = SamplingSession::new(
        SessionConfig::default(),
        Box::new(SyntheticPunchSource::new(PunchProfile::default())),
        Box::new(observer.clone()),
    )
    .unwrap();

    let result = session.run_round().await.unwrap();

    assert!((result.peak_magnitude - 12.0).abs() < 1e-9);
    assert!((result.percent_of_reference - 79.365).abs() < 1e-2);
    assert_eq!(result.tier, ResultTier::Contender);

    let progress = observer.progress();
    assert!(!progress.is_empty());
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!(progress.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[tokio::test(start_paused = true)]
async fn manual_stop_wins_over_timeout() {
    let (tx, mut rx) = mpsc::unbounded_channel::<SessionNotification>();
    let source = ReplaySource::new("test", trace_of(&[0.05, 4.0, 9.0, 2.0]));

    let mut session = SamplingSession::new(
        SessionConfig {
            sample_interval: Duration::from_millis(100),
            ..SessionConfig::default()
        },
        Box::new(source),
        Box::new(tx),
    )
    .unwrap();
    let handle = session.handle();

    let runner = tokio::spawn(async move {
        session.run().await;
        session
    });

    handle.start();
    tokio::time::sleep(Duration::from_millis(250)).await;
    handle.stop();
    handle.stop();
    tokio::time::sleep(Duration::from_millis(SESSION_DURATION_MS * 2)).await;
    handle.shutdown();

    let session = runner.await.unwrap();
    assert_eq!(session.state(), SessionState::Idle);
    drop(session);

    let mut notifications = Vec::new();
    while let Some(notification) = rx.recv().await {
        notifications.push(notification);
    }

    assert_eq!(notifications.first(), Some(&SessionNotification::Armed));
    let results: Vec<_> = notifications
        .iter()
        .filter_map(|n| match n {
            SessionNotification::Result { result } => Some(result.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].peak_magnitude, 9.0);

    let progress = notifications
        .iter()
        .filter(|n| matches!(n, SessionNotification::Progress { .. }))
        .count();
    assert_eq!(progress, 2);
}

#[tokio::test(start_paused = true)]
async fn unstopped_round_finishes_once_within_tolerance() {
    let observer = RecordingObserver::new();
    let mut session = SamplingSession::new(
        SessionConfig::default(),
        Box::new(StubSource::new()),
        Box::new(observer.clone()),
    )
    .unwrap();
    let handle = session.handle();

    let started = tokio::time::Instant::now();
    let runner = tokio::spawn(async move { session.run().await });
    handle.start();

    tokio::time::sleep(Duration::from_millis(SESSION_DURATION_MS - 10)).await;
    assert!(observer.results().is_empty());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(observer.results().len(), 1);
    assert!(started.elapsed() < Duration::from_millis(SESSION_DURATION_MS + 100));

    tokio::time::sleep(Duration::from_millis(SESSION_DURATION_MS)).await;
    assert_eq!(observer.results().len(), 1);

    handle.shutdown();
    runner.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_mid_round_releases_without_result() {
    let source = StubSource::new();
    let feed = source.feed();
    let observer = RecordingObserver::new();
    let mut session = SamplingSession::new(
        SessionConfig::default(),
        Box::new(source),
        Box::new(observer.clone()),
    )
    .unwrap();
    let handle = session.handle();

    let runner = tokio::spawn(async move { session.run().await });
    handle.start();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(feed.is_subscribed());

    handle.shutdown();
    runner.await.unwrap();
    assert!(!feed.is_subscribed());
    assert!(observer.results().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unsupported_platform_leaves_session_usable() {
    let observer = RecordingObserver::new();
    let mut session = SamplingSession::new(
        SessionConfig::default(),
        Box::new(UnavailableSource::new("no accelerometer")),
        Box::new(observer.clone()),
    )
    .unwrap();

    assert!(session.run_round().await.is_err());
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(observer.rejections().len(), 1);
    assert!(observer.results().is_empty());
}

proptest! {
    #[test]
    fn final_peak_is_max_of_non_noise_samples(
        magnitudes in proptest::collection::vec(0.0f64..30.0, 1..40),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .start_paused(true)
            .build()
            .unwrap();

        let result = runtime.block_on(async {
            let source = StubSource::new();
            let feed = source.feed();
            let observer = RecordingObserver::new();
            let mut session = SamplingSession::new(
                SessionConfig::default(),
                Box::new(source),
                Box::new(observer.clone()),
            )
            .unwrap();

            session.start().unwrap();
            for &m in &magnitudes {
                feed.push(MotionSample::along_x(m));
            }
            session.process_pending();
            let result = session.stop().unwrap();
            (result, observer.progress().len())
        });

        let accepted: Vec<f64> = magnitudes.iter().copied().filter(|&m| m > 0.1).collect();
        let expected = accepted.iter().copied().fold(0.0, f64::max);
        prop_assert_eq!(result.0.peak_magnitude, expected);
        prop_assert_eq!(result.1, accepted.len());
    }
}
