//! Layered CLI configuration: defaults, then an optional TOML file, then
//! `VOTING_*` environment variables. Command-line flags are applied last by
//! the caller.

use anyhow::{bail, Result};
use ::config::{Config, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "voting.toml";
pub const DEFAULT_DATA_DIR: &str = "./data/voting";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CliConfig {
    /// Directory of the sled database holding registry state.
    pub data_dir: PathBuf,
    pub log_level: String,
    /// `pretty` for multi-line output, anything else for compact lines.
    pub log_format: String,
}

impl CliConfig {
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        let resolved_path = if let Some(path) = config_path_override {
            if !path.exists() {
                bail!(
                    "Configuration file {} not found (specified via --config)",
                    path.display()
                );
            }
            Some(path.to_path_buf())
        } else {
            let path = PathBuf::from(DEFAULT_CONFIG_FILE);
            path.exists().then_some(path)
        };

        let mut builder = Config::builder()
            .set_default("data_dir", DEFAULT_DATA_DIR)?
            .set_default("log_level", "info")?
            .set_default("log_format", "compact")?;

        if let Some(path) = &resolved_path {
            builder = builder.add_source(ConfigFile::from(path.as_path()));
        }

        builder = builder.add_source(Environment::with_prefix("VOTING"));

        Ok(builder.build()?.try_deserialize()?)
    }
}
