// ABOUTME: List command implementation.
// ABOUTME: Prints the services of the project as reported by the runtime.

use std::path::Path;

use tunnelfleet::error::Result;
use tunnelfleet::output::Output;

use super::context::Context;

pub async fn list(config: Option<&Path>, output: Output) -> Result<()> {
    let ctx = Context::load(config)?;
    let services = ctx.orchestrator()?.list().await?;
    output.services(&services);
    Ok(())
}
