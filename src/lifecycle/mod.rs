// ABOUTME: Pool lifecycle: the type-state `up` pipeline and the orchestrator.
// ABOUTME: Generation stays pure; all side effects go through the runtime traits.

mod driver;
mod error;
mod launch;
mod state;

pub use driver::Orchestrator;
pub use error::ExecutionError;
pub use launch::{ConfirmError, Launch};
pub use state::{Confirmed, LifecycleState, Pending, Rendered, Started, Written};
