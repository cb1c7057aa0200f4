use crate::store::{CorruptStorePolicy, TASK_FILE};
use anyhow::Context;
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;

/// Name of the optional configuration file looked up next to the executable.
pub const CONFIG_FILE: &str = "task-cli.toml";
/// Prefix of the environment variables that override configuration keys.
pub const ENV_PREFIX: &str = "TASK_CLI";

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Where the task file lives. Defaults to `tasks.json` next to the executable.
    #[serde(default)]
    pub store_path: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub on_corrupt: CorruptStorePolicy,
}

impl Config {
    /// Loads configuration from the given file (or the optional default file) and
    /// from `TASK_CLI_*` environment variables, the latter taking precedence.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::from(exe_dir()?.join(CONFIG_FILE)).required(false),
        };
        Self::from_builder(
            config::Config::builder()
                .add_source(file)
                .add_source(Environment::with_prefix(ENV_PREFIX)),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<Self> {
        let settings = builder.build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(exe_dir()?.join(TASK_FILE)),
        }
    }

    pub fn log_level(&self) -> anyhow::Result<LevelFilter> {
        match &self.log_level {
            Some(level) => level
                .parse()
                .with_context(|| format!("invalid log_level '{level}'")),
            None => Ok(LevelFilter::WARN),
        }
    }
}

fn exe_dir() -> anyhow::Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    Ok(exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(".")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(toml_str: &str) -> anyhow::Result<Config> {
        Config::from_builder(
            config::Config::builder().add_source(File::from_str(toml_str, FileFormat::Toml)),
        )
    }

    #[test]
    fn test_config_deserialize_from_toml() {
        // Arrange
        let toml_str = r#"
            store_path = "/var/lib/tasks/tasks.json"
            log_level = "debug"
            on_corrupt = "keep"
        "#;

        // Act
        let config = from_toml(toml_str).unwrap();

        // Assert
        assert_eq!(
            config.store_path,
            Some(PathBuf::from("/var/lib/tasks/tasks.json"))
        );
        assert_eq!(config.log_level().unwrap(), LevelFilter::DEBUG);
        assert_eq!(config.on_corrupt, CorruptStorePolicy::Keep);
    }

    #[test]
    fn test_config_defaults_when_empty() {
        let config = from_toml("").unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.on_corrupt, CorruptStorePolicy::Backup);
        assert_eq!(config.log_level().unwrap(), LevelFilter::WARN);
    }

    #[test]
    fn test_default_store_path_sits_next_to_executable() {
        let config = Config::default();

        let path = config.store_path().unwrap();

        assert_eq!(path.file_name().unwrap(), TASK_FILE);
        assert_eq!(path.parent().unwrap(), exe_dir().unwrap());
    }

    #[test]
    fn test_invalid_log_level_is_reported() {
        let config = from_toml(r#"log_level = "loud""#).unwrap();

        let err = config.log_level().unwrap_err();

        assert!(err.to_string().contains("loud"));
    }

    #[test]
    fn test_unknown_corrupt_policy_is_rejected() {
        assert!(from_toml(r#"on_corrupt = "shrug""#).is_err());
    }

    #[test]
    fn test_missing_explicit_config_file_is_an_error() {
        let missing = Path::new("/definitely/not/here/task-cli.toml");

        assert!(Config::load(Some(missing)).is_err());
    }
}
