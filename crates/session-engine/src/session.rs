//! Sampling session management.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use punchmeter_common::clock::SessionClock;
use punchmeter_common::config::{
    validate_session_parameters, SessionDefaults, DEBOUNCE_EPSILON, FAST_SAMPLE_INTERVAL_MS,
    REFERENCE_PUNCH_SPEED, SESSION_DURATION_MS,
};
use punchmeter_common::error::{PunchError, PunchResult};
use punchmeter_motion_model::{ClassificationResult, MotionSample};
use punchmeter_motion_source::{MotionSource, Subscription};

use crate::classify::ResultClassifier;
use crate::observer::SessionObserver;
use crate::peak::PeakTracker;
use crate::progress::ProgressProjector;

/// How late a finalization may run past the configured duration before it
/// is logged as an overrun.
const OVERRUN_TOLERANCE: Duration = Duration::from_millis(250);

/// Parameters of a sampling session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// How long a round tracks before it finalizes on its own.
    pub duration: Duration,

    /// Peak magnitude treated as 100%.
    pub reference_speed: f64,

    /// Magnitudes at or below this are ignored.
    pub debounce_epsilon: f64,

    /// Interval requested from the motion source.
    pub sample_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(SESSION_DURATION_MS),
            reference_speed: REFERENCE_PUNCH_SPEED,
            debounce_epsilon: DEBOUNCE_EPSILON,
            sample_interval: Duration::from_millis(FAST_SAMPLE_INTERVAL_MS),
        }
    }
}

impl From<&SessionDefaults> for SessionConfig {
    fn from(defaults: &SessionDefaults) -> Self {
        Self {
            duration: defaults.duration(),
            reference_speed: defaults.reference_speed,
            debounce_epsilon: defaults.debounce_epsilon,
            sample_interval: defaults.sample_interval(),
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> PunchResult<()> {
        validate_session_parameters(
            self.reference_speed,
            self.debounce_epsilon,
            self.duration,
            self.sample_interval,
        )
    }
}

/// State of a sampling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not tracking; ready for `start`.
    Idle,
    /// Sampling in progress.
    Tracking,
    /// Classifying the final peak. Only observable from inside `on_result`.
    Finalizing,
}

/// Identifies one round from arming to finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(u64);

impl SessionToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// What ended a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Manual,
    Timeout,
}

/// Events processed by the session loop, one at a time and in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionInput {
    Start,
    Stop,
    Sample {
        token: SessionToken,
        sample: MotionSample,
    },
    Timeout {
        token: SessionToken,
    },
    /// Tear down any active round and leave the loop.
    Shutdown,
}

/// Outcome of handling one [`SessionInput`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Continue,
    Finished(ClassificationResult),
    Shutdown,
}

/// Cloneable handle for driving a session from other tasks.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inputs: mpsc::UnboundedSender<SessionInput>,
}

impl SessionHandle {
    pub fn start(&self) -> bool {
        self.inputs.send(SessionInput::Start).is_ok()
    }

    pub fn stop(&self) -> bool {
        self.inputs.send(SessionInput::Stop).is_ok()
    }

    pub fn shutdown(&self) -> bool {
        self.inputs.send(SessionInput::Shutdown).is_ok()
    }
}

struct ActiveRound {
    token: SessionToken,
    subscription: Subscription,
    timer: JoinHandle<()>,
    clock: SessionClock,
    accepted: u64,
    debounced: u64,
}

/// A sampling session that arms a motion source for a fixed duration and
/// classifies the peak it saw.
///
/// Starting while tracking and stopping while idle are no-ops. A round ends
/// exactly once, by whichever of the timeout and a manual stop is handled
/// first.
pub struct SamplingSession {
    config: SessionConfig,
    source: Box<dyn MotionSource>,
    observer: Box<dyn SessionObserver>,
    tracker: PeakTracker,
    projector: ProgressProjector,
    classifier: ResultClassifier,
    state: SessionState,
    round: Option<ActiveRound>,
    next_token: u64,
    inputs_tx: mpsc::UnboundedSender<SessionInput>,
    inputs_rx: mpsc::UnboundedReceiver<SessionInput>,
}

impl SamplingSession {
    /// Create an idle session.
    pub fn new(
        config: SessionConfig,
        source: Box<dyn MotionSource>,
        observer: Box<dyn SessionObserver>,
    ) -> PunchResult<Self> {
        config.validate()?;
        let (inputs_tx, inputs_rx) = mpsc::unbounded_channel();
        Ok(Self {
            tracker: PeakTracker::new(config.debounce_epsilon),
            projector: ProgressProjector::new(config.reference_speed),
            classifier: ResultClassifier::new(config.reference_speed),
            config,
            source,
            observer,
            state: SessionState::Idle,
            round: None,
            next_token: 1,
            inputs_tx,
            inputs_rx,
        })
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            inputs: self.inputs_tx.clone(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.state == SessionState::Tracking
    }

    /// Running peak of the current (or last) round.
    pub fn peak(&self) -> f64 {
        self.tracker.peak()
    }

    /// Token of the round being tracked, if any.
    pub fn active_token(&self) -> Option<SessionToken> {
        self.round.as_ref().map(|round| round.token)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Arm the motion source and the timeout.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> PunchResult<()> {
        if self.state != SessionState::Idle {
            tracing::debug!(state = ?self.state, "Start ignored, session already tracking");
            return Ok(());
        }

        if !self.source.is_available() {
            let error = PunchError::unsupported_platform(self.source.name());
            return Err(self.reject(error));
        }

        let token = SessionToken(self.next_token);
        self.source.set_sample_interval(self.config.sample_interval);

        let inputs = self.inputs_tx.clone();
        let subscription = match self.source.subscribe(Box::new(move |sample| {
            inputs.send(SessionInput::Sample { token, sample }).ok();
        })) {
            Ok(subscription) => subscription,
            Err(error @ PunchError::UnsupportedPlatform { .. }) => return Err(self.reject(error)),
            Err(error) => {
                tracing::warn!(error = %error, "Failed to subscribe to motion source");
                return Err(error);
            }
        };
        self.next_token += 1;
        self.tracker.reset();

        let timer = spawn_timeout(self.inputs_tx.clone(), token, self.config.duration);
        let clock = SessionClock::start();

        tracing::info!(
            source = %self.source.name(),
            token = token.id(),
            duration_ms = self.config.duration.as_millis() as u64,
            epoch_wall = %clock.epoch_wall(),
            "Sampling session armed"
        );

        self.round = Some(ActiveRound {
            token,
            subscription,
            timer,
            clock,
            accepted: 0,
            debounced: 0,
        });
        self.state = SessionState::Tracking;
        self.observer.on_armed();
        Ok(())
    }

    /// End the current round now. Returns `None` when nothing was tracking.
    pub fn stop(&mut self) -> Option<ClassificationResult> {
        if self.state != SessionState::Tracking {
            tracing::debug!(state = ?self.state, "Stop ignored, session not tracking");
            return None;
        }
        self.finalize(StopReason::Manual)
    }

    /// Feed one sample produced for round `token`.
    pub fn on_sample(&mut self, token: SessionToken, sample: MotionSample) {
        let Some(round) = self.round.as_mut().filter(|round| round.token == token) else {
            tracing::trace!(token = token.id(), "Dropping sample from a finished round");
            return;
        };

        let observation = self.tracker.observe(&sample);
        if !observation.accepted {
            round.debounced += 1;
            return;
        }
        round.accepted += 1;

        let normalized = self.projector.project(observation.peak);
        tracing::debug!(
            magnitude = observation.magnitude,
            peak = observation.peak,
            normalized,
            "Sample accepted"
        );
        self.observer.on_progress(normalized);
    }

    /// Handle the timeout armed for round `token`.
    pub fn on_timeout(&mut self, token: SessionToken) -> Option<ClassificationResult> {
        if self.active_token() != Some(token) {
            tracing::trace!(token = token.id(), "Ignoring timeout of a finished round");
            return None;
        }
        self.finalize(StopReason::Timeout)
    }

    /// Handle one input.
    pub fn dispatch(&mut self, input: SessionInput) -> Dispatch {
        match input {
            SessionInput::Start => {
                if let Err(e) = self.start() {
                    tracing::debug!(error = %e, "Start request failed");
                }
                Dispatch::Continue
            }
            SessionInput::Stop => self.stop().map_or(Dispatch::Continue, Dispatch::Finished),
            SessionInput::Sample { token, sample } => {
                self.on_sample(token, sample);
                Dispatch::Continue
            }
            SessionInput::Timeout { token } => self
                .on_timeout(token)
                .map_or(Dispatch::Continue, Dispatch::Finished),
            SessionInput::Shutdown => {
                self.teardown();
                Dispatch::Shutdown
            }
        }
    }

    /// Handle every input already queued, without waiting.
    pub fn process_pending(&mut self) -> Vec<Dispatch> {
        let mut dispatched = Vec::new();
        while let Ok(input) = self.inputs_rx.try_recv() {
            dispatched.push(self.dispatch(input));
        }
        dispatched
    }

    /// Start a round and process inputs until it produces a result.
    ///
    /// Inputs queued before the call are handled first. If they already
    /// complete a round, that result is returned; if they leave a round
    /// tracking, that round is awaited instead of arming another.
    pub async fn run_round(&mut self) -> PunchResult<ClassificationResult> {
        for dispatch in self.process_pending() {
            match dispatch {
                Dispatch::Continue => {}
                Dispatch::Finished(result) => return Ok(result),
                Dispatch::Shutdown => {
                    return Err(PunchError::session("session shut down before starting"));
                }
            }
        }
        if !self.is_tracking() {
            self.start()?;
        }

        loop {
            let Some(input) = self.inputs_rx.recv().await else {
                return Err(PunchError::session("session input channel closed"));
            };
            match self.dispatch(input) {
                Dispatch::Continue => {}
                Dispatch::Finished(result) => return Ok(result),
                Dispatch::Shutdown => {
                    return Err(PunchError::session("session shut down before a result"));
                }
            }
        }
    }

    /// Process inputs until a shutdown request arrives. Results are reported
    /// through the observer.
    pub async fn run(&mut self) {
        tracing::info!(source = %self.source.name(), "Session loop started");
        while let Some(input) = self.inputs_rx.recv().await {
            if self.dispatch(input) == Dispatch::Shutdown {
                break;
            }
        }
        tracing::info!("Session loop stopped");
    }

    /// Release the subscription and timer of an active round without
    /// producing a result.
    pub fn teardown(&mut self) {
        if let Some(mut round) = self.round.take() {
            round.subscription.unsubscribe();
            round.timer.abort();
            tracing::info!(
                token = round.token.id(),
                "Sampling session torn down without a result"
            );
        }
        self.state = SessionState::Idle;
    }

    fn reject(&mut self, error: PunchError) -> PunchError {
        tracing::warn!(error = %error, "Refusing to start sampling session");
        self.observer.on_rejected(&error);
        error
    }

    fn finalize(&mut self, reason: StopReason) -> Option<ClassificationResult> {
        let mut round = self.round.take()?;
        self.state = SessionState::Finalizing;
        round.subscription.unsubscribe();
        round.timer.abort();

        let record = self.tracker.record();
        let result = self.classifier.classify(record.magnitude);
        let elapsed_ms = round.clock.elapsed_ms();

        if round
            .clock
            .has_exceeded(self.config.duration, OVERRUN_TOLERANCE)
        {
            tracing::warn!(elapsed_ms, "Session finalized past its configured duration");
        }

        tracing::info!(
            token = round.token.id(),
            ?reason,
            elapsed_ms,
            peak = record.magnitude,
            percent = result.percent_of_reference,
            tier = %result.tier,
            accepted = round.accepted,
            debounced = round.debounced,
            "Sampling session finished"
        );

        self.observer.on_result(&result);
        self.state = SessionState::Idle;
        Some(result)
    }
}

impl Drop for SamplingSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn spawn_timeout(
    inputs: mpsc::UnboundedSender<SessionInput>,
    token: SessionToken,
    duration: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        inputs.send(SessionInput::Timeout { token }).ok();
    })
}
