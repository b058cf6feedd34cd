//! # Rewind Engine
//!
//! The replay half of the engine: validates execution tasks, resolves
//! recorded selector ladders against a live page, and runs steps
//! sequentially with retry, outcome verification and cancellation.

mod executor;
mod page;
mod replay;
mod resolver;
mod validator;

pub use executor::TaskExecutor;
pub use page::{PageDriver, PageElement};
pub use replay::task_from_session;
pub use resolver::SelectorResolver;
pub use validator::ActionValidator;

#[cfg(test)]
mod test_support;
