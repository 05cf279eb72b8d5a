// ABOUTME: Run and interactive command implementations.
// ABOUTME: Both route traffic through the pool's proxy and return the child's exit code.

use std::path::Path;

use tunnelfleet::error::Result;
use tunnelfleet::output::Output;

use super::context::Context;

pub async fn run(config: Option<&Path>, command: &[String], output: Output) -> Result<i32> {
    let ctx = Context::load(config)?;
    let mut orchestrator = ctx.orchestrator()?;

    let routed = orchestrator.run(command).await?;
    output.routed(&routed);
    Ok(routed.exit_code)
}

pub async fn interactive(config: Option<&Path>, shell: &str) -> Result<i32> {
    let ctx = Context::load(config)?;
    let mut orchestrator = ctx.orchestrator()?;
    orchestrator.interactive(shell).await
}
