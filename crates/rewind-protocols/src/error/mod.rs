//! Per-domain error enums.
//!
//! The boundaries matter more than the variants: capture errors never cross
//! the frame boundary, classification errors drop a single event, execution
//! errors are per-step recoverable except validation, which fails the task
//! before any side effect.

mod capture;
mod classify;
mod execute;
mod store;

pub use capture::CaptureError;
pub use classify::ClassifyError;
pub use execute::ExecuteError;
pub use store::StoreError;
