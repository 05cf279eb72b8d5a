// ABOUTME: Down command implementation.
// ABOUTME: Stops and removes the pool; generated descriptors stay on disk.

use std::path::Path;

use tunnelfleet::error::Result;
use tunnelfleet::output::Output;

use super::context::Context;

pub async fn down(config: Option<&Path>, mut output: Output) -> Result<()> {
    output.start_timer();
    let ctx = Context::load(config)?;
    let mut orchestrator = ctx.orchestrator()?;

    output.progress("Stopping services...");
    orchestrator.down().await?;
    output.warnings(orchestrator.diagnostics());

    output.success(&format!("Pool `{}` is down", ctx.config.global.project));
    Ok(())
}
