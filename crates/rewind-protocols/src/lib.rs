//! # Rewind Protocols
//!
//! Core data model for the Rewind recording and replay engine.
//! Contains the shared types that cross component boundaries - element
//! descriptors, semantic actions, raw capture events, recording sessions,
//! execution steps - plus the per-domain error enums.
//!
//! ## Core Types
//!
//! - [`ElementDescriptor`] - A ranked, relocatable description of a DOM element
//! - [`SemanticAction`] - A normalized, classified interaction
//! - [`RawEvent`] - An unclassified event emitted by a capture agent
//! - [`RecordingSession`] - An ordered, append-only action log
//! - [`ExecuteStep`] / [`ExecuteTask`] - Instructions for the execution engine
//! - [`EventSink`] - The frame-to-host delivery channel abstraction

pub mod action;
pub mod descriptor;
pub mod error;
pub mod event;
pub mod session;
pub mod task;

pub use action::{ActionType, PageContext, SemanticAction};
pub use descriptor::{ElementDescriptor, ElementPurpose, Rect, SelectorKind, SelectorStrategy};
pub use error::{CaptureError, ClassifyError, ExecuteError, StoreError};
pub use event::{ElementSnapshot, EventSink, FormSnapshot, FrameId, RawEvent, RawEventKind};
pub use session::{RecordingSession, SessionMetadata};
pub use task::{
    ExecuteResult, ExecuteStep, ExecuteTask, ExpectedOutcome, StepFailure, StepStatus, TaskStatus,
};
