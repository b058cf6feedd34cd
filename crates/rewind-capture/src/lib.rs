//! # Rewind Capture
//!
//! The recording half of the engine: observes raw browser-level events from
//! monitored content frames, coalesces and classifies them into semantic
//! actions, and maintains the recording session lifecycle.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐  EventSink   ┌────────────────────┐
//! │ CaptureAgent  │ ───────────► │ SessionController  │
//! │ (per frame)   │  RawEvent    │  (one per shell)   │
//! └───────────────┘              └─────────┬──────────┘
//!                                          │
//!                    ┌─────────────────────┼──────────────────────┐
//!                    ▼                     ▼                      ▼
//!           TextInputAggregator    ActionClassifier     NavigationDetector
//!                    └─────────────────────┴──────────────────────┘
//!                                          ▼
//!                                  RecordingSession
//! ```
//!
//! Delivery from agent to controller is fire-and-forget; ordering is
//! preserved per originating frame but not across frames. Capture-side
//! errors are logged and swallowed, never surfaced into the monitored page.

mod agent;
mod aggregator;
mod classifier;
mod controller;
mod descriptor;
mod frame;
mod navigation;
mod redirect;

pub use agent::CaptureAgent;
pub use aggregator::{BufferKey, TextInputAggregator};
pub use classifier::ActionClassifier;
pub use controller::{SessionController, SessionManager};
pub use descriptor::DescriptorBuilder;
pub use frame::{ContentFrame, DomEventHandler};
pub use navigation::{NavigationDetector, NavigationKind};
pub use redirect::{QueryParamUnwrapper, RedirectUnwrapper, UnwrapperSet};

#[cfg(test)]
mod test_support;
