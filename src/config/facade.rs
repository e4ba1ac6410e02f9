//! Config loading entry point: assembles sources and validates the result.

use super::sources::{global_file, project_file};
use super::DimConfig;
use crate::error::DimError;
use config::{Config, ConfigBuilder, Environment, File};
use config::builder::DefaultState;
use std::path::Path;

/// Environment overrides use `DIM__<SECTION>__<KEY>`, e.g. `DIM__PATHS__DATA_DIR`.
const ENV_PREFIX: &str = "DIM";
const ENV_SEPARATOR: &str = "__";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the project rooted at `project_root`.
    ///
    /// Precedence (lowest to highest): defaults, global file, project file, environment.
    pub fn load(project_root: &Path) -> Result<DimConfig, DimError> {
        let builder = Config::builder();
        let builder = global_file::add_to_builder(builder)?;
        let builder = project_file::add_to_builder(builder, project_root)?;
        Self::finish(builder)
    }

    /// Load configuration from exactly one file (plus environment overrides).
    pub fn load_from_file(path: &Path) -> Result<DimConfig, DimError> {
        if !path.exists() {
            return Err(DimError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let builder = Config::builder().add_source(File::from(path).required(true));
        Self::finish(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<DimConfig, DimError> {
        let config: DimConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR),
            )
            .build()?
            .try_deserialize()?;

        config.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            DimError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(config)
    }
}
