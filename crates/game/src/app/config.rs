use std::fs;
use std::path::{Path, PathBuf};

use engine::{InputAction, LoopConfig};
use serde::Deserialize;
use thiserror::Error;

use super::agent::AgentTuning;

pub(crate) const CONFIG_ENV_VAR: &str = "CELL_AGENT_CONFIG";

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct DemoWorldConfig {
    pub width: u32,
    pub height: u32,
    pub seed: u64,
}

impl Default for DemoWorldConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 40,
            seed: 7,
        }
    }
}

/// One timed entry of a replayed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub(crate) enum ScriptedEvent {
    Key {
        tick: u64,
        action: InputAction,
        pressed: bool,
    },
    /// Drops an agent seed at the cell.
    Spawn { tick: u64, x: i32, y: i32 },
    /// Simulation reset: selection and key state clear, agents stay.
    Reset { tick: u64 },
}

impl ScriptedEvent {
    pub(crate) fn tick(&self) -> u64 {
        match *self {
            Self::Key { tick, .. } | Self::Spawn { tick, .. } | Self::Reset { tick } => tick,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    #[serde(rename = "loop")]
    pub loop_config: LoopConfig,
    pub tuning: AgentTuning,
    pub world: DemoWorldConfig,
    pub script: Vec<ScriptedEvent>,
}

impl AppConfig {
    /// Defaults when the env var is unset; a set but unreadable path is an error.
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    pub(crate) fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize::<_, AppConfig>(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            let source = error.into_inner();
            let message = if json_path.is_empty() || json_path == "." {
                source.to_string()
            } else {
                format!("at {json_path}: {source}")
            };
            ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = AppConfig::parse(Path::new("inline.json"), "{}").expect("parse");
        assert_eq!(config.tuning, AgentTuning::default());
        assert_eq!(config.loop_config.target_tps, 60);
        assert!(config.script.is_empty());
    }

    #[test]
    fn partial_tuning_overrides_only_named_fields() {
        let raw = r#"{ "tuning": { "decay_ticks": 30 }, "loop": { "max_ticks": 90 } }"#;
        let config = AppConfig::parse(Path::new("inline.json"), raw).expect("parse");

        assert_eq!(config.tuning.decay_ticks, 30);
        assert_eq!(config.tuning.validation_interval_ticks, 15);
        assert_eq!(config.loop_config.max_ticks, Some(90));
    }

    #[test]
    fn script_entries_parse_by_event_tag() {
        let raw = r#"{ "script": [
            { "event": "key", "tick": 5, "action": "Punch", "pressed": true },
            { "event": "spawn", "tick": 9, "x": 4, "y": 2 },
            { "event": "reset", "tick": 30 }
        ] }"#;
        let config = AppConfig::parse(Path::new("inline.json"), raw).expect("parse");
        assert_eq!(
            config.script,
            vec![
                ScriptedEvent::Key {
                    tick: 5,
                    action: InputAction::Punch,
                    pressed: true,
                },
                ScriptedEvent::Spawn {
                    tick: 9,
                    x: 4,
                    y: 2,
                },
                ScriptedEvent::Reset { tick: 30 },
            ]
        );
        assert_eq!(config.script[2].tick(), 30);
    }

    #[test]
    fn unknown_script_event_is_rejected() {
        let raw = r#"{ "script": [ { "event": "explode", "tick": 1 } ] }"#;
        let err = AppConfig::parse(Path::new("inline.json"), raw).expect_err("should fail");
        assert!(err.to_string().contains("explode"), "{err}");
    }

    #[test]
    fn parse_error_reports_json_path() {
        let raw = r#"{ "tuning": { "punch_damage": "hard" } }"#;
        let err = AppConfig::parse(Path::new("bad.json"), raw).expect_err("should fail");
        let rendered = err.to_string();
        assert!(rendered.contains("tuning.punch_damage"), "{rendered}");
        assert!(rendered.contains("bad.json"));
    }

    #[test]
    fn load_reads_from_disk() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("agent.json");
        fs::write(&path, r#"{ "world": { "width": 32, "height": 20 } }"#).expect("write");

        let config = AppConfig::load(&path).expect("load");
        assert_eq!(config.world.width, 32);
        assert_eq!(config.world.height, 20);
        assert_eq!(config.world.seed, 7);
    }

    #[test]
    fn missing_file_is_read_error() {
        let temp = TempDir::new().expect("tempdir");
        let err = AppConfig::load(&temp.path().join("absent.json")).expect_err("missing");
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
