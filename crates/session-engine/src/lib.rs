//! PunchMeter Session Engine
//!
//! Runs finite-duration sampling sessions: arms a motion source, tracks the
//! running peak of incoming samples, projects progress, and classifies the
//! peak once the session ends by timeout or manual stop.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 SamplingSession                   │
//! │                                                   │
//! │  MotionSource ──sample──┐      timer ──timeout──┐ │
//! │                         ▼                       ▼ │
//! │              ┌────────────────────────────────┐   │
//! │  start/stop ─▶     SessionInput channel       │   │
//! │              └───────────────┬────────────────┘   │
//! │                              ▼                    │
//! │   PeakTracker ─▶ ProgressProjector ─▶ on_progress │
//! │        │                                          │
//! │        └─ finalize ─▶ ResultClassifier ─▶ on_result│
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! Every input is handled to completion before the next one is read, and
//! samples and timeouts carry the token of the round that produced them so
//! anything arriving after that round ended is dropped.

pub mod classify;
pub mod observer;
pub mod peak;
pub mod progress;
pub mod session;

pub use classify::*;
pub use observer::*;
pub use peak::*;
pub use progress::*;
pub use session::*;
