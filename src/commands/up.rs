// ABOUTME: Up command implementation.
// ABOUTME: Builds the topology, regenerates descriptors and starts the pool.

use std::path::Path;

use tunnelfleet::diagnostics::Diagnostics;
use tunnelfleet::error::Result;
use tunnelfleet::output::Output;

use super::context::Context;

pub async fn up(config: Option<&Path>, mut output: Output) -> Result<()> {
    output.start_timer();
    let ctx = Context::load(config)?;
    let mut diag = Diagnostics::default();

    let topology = ctx.topology(&mut diag)?;
    output.warnings(&diag);
    output.progress(&format!(
        "Generating descriptors for {} tunnel(s) across {} provider(s)",
        topology.len(),
        ctx.config.providers.len()
    ));

    let mut orchestrator = ctx.orchestrator()?;
    output.progress("Starting services...");
    let services = orchestrator.up(&topology).await?;

    let running = services.iter().filter(|s| s.is_running()).count();
    output.success(&format!(
        "Pool `{}` is up: {running}/{} service(s) running, proxy on port {}",
        ctx.config.global.project,
        services.len(),
        ctx.config.global.proxy_port
    ));
    Ok(())
}
