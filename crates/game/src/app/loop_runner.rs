use std::process::ExitCode;

use engine::run_headless;
use tracing::info;

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        loop_config,
        mut simulation,
    } = app;

    let summary = run_headless(&loop_config, &mut simulation);

    let registry = &simulation.hooks().context().registry;
    info!(
        ticks = summary.ticks_run,
        final_tick = summary.final_tick,
        clamp_events = summary.clamp_events,
        live_agents = registry.roster().len(),
        active = ?registry.active().map(|id| id.0),
        tps = ?summary.last_metrics.map(|metrics| metrics.tps),
        "session_summary"
    );
    ExitCode::SUCCESS
}
