//! Layered CLI configuration: defaults, then a TOML file, then `CADENCE_*`
//! environment variables.

use std::path::Path;

use anyhow::Result;
use cadence_engine::options::{DEFAULT_LIMIT, DEFAULT_SCAN_LIMIT};
use cadence_engine::EngineOptions;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub engine: EngineOptions,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// Load settings. `path` names a required config file; without it an
    /// optional `cadence.toml` in the working directory is read.
    ///
    /// Environment variables use a double underscore between section and key,
    /// e.g. `CADENCE_ENGINE__DEFAULT_LIMIT=10`.
    ///
    /// # Errors
    /// Returns an error if a source cannot be read or the result does not
    /// deserialize into `Settings`.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let builder = Config::builder()
            .set_default("engine.default_limit", DEFAULT_LIMIT as i64)?
            .set_default("engine.scan_limit", DEFAULT_SCAN_LIMIT as i64)?
            .set_default("engine.dst_policy", "shift_forward")?
            .set_default("engine.strict_timezones", false)?
            .set_default("logging.level", "warn")?;

        let builder = match path {
            Some(path) => builder.add_source(config::File::from(Path::new(path)).required(true)),
            None => builder.add_source(config::File::with_name("cadence.toml").required(false)),
        };

        Ok(builder
            .add_source(
                config::Environment::with_prefix("CADENCE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }
}
