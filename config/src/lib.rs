//! Configuration for a cloud-objects incremental source.
//!
//! Options are read from a TOML file into [`SourceConfigToml`], where every
//! field is optional, then `-c key=value` overrides are applied and the
//! result is resolved into a [`SourceConfig`] with defaults filled in.

mod error;
mod overrides;
mod types;

pub use error::ConfigError;
pub use overrides::apply_overrides;
pub use overrides::parse_override;
pub use types::CloudSourceOptions;
pub use types::CloudSourceOptionsToml;
pub use types::DEFAULT_FETCH_PARALLELISM;
pub use types::DEFAULT_NUM_INSTANTS_PER_FETCH;
pub use types::KeyGeneratorOptions;
pub use types::KeyGeneratorOptionsToml;
pub use types::SourceConfig;
pub use types::SourceConfigToml;

use std::path::Path;
use toml::Value as TomlValue;

/// Load the config file at `path` (when given), apply `overrides` on top and
/// resolve the result. Relative paths are resolved against `base_dir`, or the
/// config file's directory when `base_dir` is `None`.
pub async fn load_source_config(
    path: Option<&Path>,
    overrides: &[(String, TomlValue)],
    base_dir: Option<&Path>,
) -> Result<SourceConfig, ConfigError> {
    let mut root = match path {
        Some(path) => {
            let contents =
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ConfigError::Read {
                        path: path.to_path_buf(),
                        source,
                    })?;
            toml::from_str::<TomlValue>(&contents).map_err(|source| ConfigError::Parse {
                origin: path.display().to_string(),
                source,
            })?
        }
        None => TomlValue::Table(toml::Table::new()),
    };
    apply_overrides(&mut root, overrides)?;

    let raw: SourceConfigToml = root.try_into().map_err(|source| ConfigError::Parse {
        origin: path.map_or_else(
            || "command line overrides".to_string(),
            |path| path.display().to_string(),
        ),
        source,
    })?;

    let base_dir = base_dir
        .map(Path::to_path_buf)
        .or_else(|| path.and_then(Path::parent).map(Path::to_path_buf))
        .unwrap_or_default();
    SourceConfig::resolve(raw, &base_dir)
}
