use std::path::PathBuf;

use engine::{
    builtin_cell_registry, compile_cell_registry, CellDefError, CellTypeRegistry, GridError,
    LoopConfig, Simulation,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::agent::{AgentCell, AgentKinds, AgentSystem};
use super::config::{AppConfig, ConfigError};
use super::demo::build_demo_world;

const DEF_DIRS_ENV_VAR: &str = "CELL_AGENT_DEF_DIRS";

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("cell definitions: {0}")]
    Defs(#[from] CellDefError),
    #[error("world: {0}")]
    World(#[from] GridError),
}

pub(crate) struct AppWiring {
    pub(crate) loop_config: LoopConfig,
    pub(crate) simulation: Simulation<AgentCell, AgentSystem>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Cell Agent Startup ===");

    let config = AppConfig::from_env()?;
    let (registry, kinds) = build_registry(&parse_def_dirs_from_env())?;
    let system = AgentSystem::new(kinds, config.tuning, config.world.seed);
    let system = system.with_script(config.script);
    let world = build_demo_world(&config.world, registry, system.kinds())?;

    Ok(AppWiring {
        loop_config: config.loop_config,
        simulation: Simulation::new(world, system),
    })
}

/// Builtin cells, then the agent cells, then any external definition
/// directories. Agent ids are resolved last so overrides keep them valid.
pub(crate) fn build_registry(
    def_dirs: &[PathBuf],
) -> Result<(CellTypeRegistry, AgentKinds), CellDefError> {
    let mut registry = builtin_cell_registry();
    AgentKinds::register(&mut registry)?;
    let registry = compile_cell_registry(registry, def_dirs)?;
    let kinds = AgentKinds::resolve(&registry)?;
    info!(
        cell_types = registry.len(),
        def_dirs = def_dirs.len(),
        "cell_registry_ready"
    );
    Ok((registry, kinds))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_def_dirs_from_env() -> Vec<PathBuf> {
    std::env::var(DEF_DIRS_ENV_VAR).ok().map(|raw| parse_def_dirs(&raw)).unwrap_or_default()
}

fn parse_def_dirs(raw: &str) -> Vec<PathBuf> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}
