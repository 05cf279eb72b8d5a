// ABOUTME: Command module aggregator for the tunnelfleet CLI.
// ABOUTME: Re-exports the up, down, list, run and interactive handlers.

mod context;
mod down;
mod list;
mod run;
mod up;

pub use down::down;
pub use list::list;
pub use run::{interactive, run};
pub use up::up;
