use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "config/tracker";
pub const ENV_PREFIX: &str = "EV_TRACKER";

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct TrackerConfig {
    pub storage: StorageSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    /// Keep the log in memory only; nothing survives the session.
    #[serde(default)]
    pub in_memory: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExportSettings {
    pub dir: PathBuf,
}

/// Defaults, then `config/tracker.{toml,json,...}` if present, then
/// `EV_TRACKER_*` environment variables (`__` separates nested keys).
pub fn load_tracker_config() -> anyhow::Result<TrackerConfig> {
    build_tracker_config(
        config::File::with_name(CONFIG_FILE).required(false),
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__"),
    )
}

fn build_tracker_config<F, E>(file: F, env: E) -> anyhow::Result<TrackerConfig>
where
    F: config::Source + Send + Sync + 'static,
    E: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .set_default("storage.data_dir", "data")?
        .set_default("storage.in_memory", false)?
        .set_default("export.dir", ".")?
        .add_source(file)
        .add_source(env)
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .source(Some(HashMap::new()))
    }

    #[test]
    fn test_defaults() {
        let config = build_tracker_config(
            config::File::from_str("", config::FileFormat::Toml),
            no_env(),
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert!(!config.storage.in_memory);
        assert_eq!(config.export.dir, PathBuf::from("."));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            [storage]
            data_dir = "/var/lib/ev-range"

            [export]
            dir = "exports"
        "#;
        let config = build_tracker_config(
            config::File::from_str(toml, config::FileFormat::Toml),
            no_env(),
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/ev-range"));
        assert_eq!(config.export.dir, PathBuf::from("exports"));
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut vars = HashMap::new();
        vars.insert("EV_TRACKER_STORAGE__IN_MEMORY".to_string(), "true".to_string());
        vars.insert("EV_TRACKER_EXPORT__DIR".to_string(), "/tmp/out".to_string());
        let env = config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(Some(vars));

        let config = build_tracker_config(
            config::File::from_str("[export]\ndir = \"exports\"", config::FileFormat::Toml),
            env,
        )
        .unwrap();

        assert!(config.storage.in_memory);
        assert_eq!(config.export.dir, PathBuf::from("/tmp/out"));
    }
}
