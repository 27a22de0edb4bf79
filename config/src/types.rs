//! Raw (`*Toml`) and resolved option types.

use crate::ConfigError;
use cloud_incr_protocol::FileFormat;
use cloud_incr_protocol::MissingCheckpointStrategy;
use serde::Deserialize;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

pub const DEFAULT_NUM_INSTANTS_PER_FETCH: usize = 5;
pub const DEFAULT_FETCH_PARALLELISM: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfigToml {
    /// Root of the timeline that records which objects changed.
    pub src_path: Option<PathBuf>,
    /// Root the object paths are relative to. Defaults to `src_path`.
    pub blob_root: Option<PathBuf>,
    pub num_instants_per_fetch: Option<usize>,
    pub missing_checkpoint_strategy: Option<MissingCheckpointStrategy>,
    pub check_if_file_exists: Option<bool>,
    /// Format of the timeline's metadata commits.
    pub source_file_format: Option<FileFormat>,
    /// Format of the objects themselves.
    pub data_file_format: Option<FileFormat>,
    #[serde(default)]
    pub cloud: CloudSourceOptionsToml,
    #[serde(default)]
    pub key_generator: KeyGeneratorOptionsToml,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CloudSourceOptionsToml {
    pub select_relpath_prefix: Option<String>,
    pub ignore_relpath_prefix: Option<String>,
    pub ignore_relpath_substring: Option<String>,
    pub select_file_extension: Option<String>,
    pub partition_fields_from_path: Option<Vec<String>>,
    pub fetch_parallelism: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyGeneratorOptionsToml {
    pub record_key_field: Option<String>,
    pub partition_path_field: Option<String>,
    pub hive_style_partitioning: Option<bool>,
    pub url_encode_partitioning: Option<bool>,
}

/// Resolved source configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub src_path: PathBuf,
    pub blob_root: PathBuf,
    pub num_instants_per_fetch: usize,
    /// Only consulted when there is no checkpoint, so it stays optional here
    /// and is enforced at resolution time.
    pub missing_checkpoint_strategy: Option<MissingCheckpointStrategy>,
    pub check_if_file_exists: bool,
    pub source_file_format: FileFormat,
    pub data_file_format: FileFormat,
    pub cloud: CloudSourceOptions,
    pub key_generator: KeyGeneratorOptions,
}

/// Which objects to pick from the metadata and how to read them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudSourceOptions {
    pub select_relpath_prefix: Option<String>,
    pub ignore_relpath_prefix: Option<String>,
    pub ignore_relpath_substring: Option<String>,
    pub select_file_extension: String,
    pub partition_fields_from_path: Vec<String>,
    pub fetch_parallelism: usize,
}

/// Passed through to the downstream writer untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyGeneratorOptions {
    pub record_key_field: Option<String>,
    pub partition_path_field: Option<String>,
    pub hive_style_partitioning: bool,
    pub url_encode_partitioning: bool,
}

impl SourceConfig {
    pub fn resolve(raw: SourceConfigToml, base_dir: &Path) -> Result<Self, ConfigError> {
        let SourceConfigToml {
            src_path,
            blob_root,
            num_instants_per_fetch,
            missing_checkpoint_strategy,
            check_if_file_exists,
            source_file_format,
            data_file_format,
            cloud,
            key_generator,
        } = raw;

        let src_path = src_path
            .filter(|path| !path.as_os_str().is_empty())
            .ok_or(ConfigError::MissingRequired { key: "src_path" })?;
        let src_path = base_dir.join(src_path);
        let blob_root = blob_root.map_or_else(|| src_path.clone(), |root| base_dir.join(root));

        let num_instants_per_fetch =
            num_instants_per_fetch.unwrap_or(DEFAULT_NUM_INSTANTS_PER_FETCH);
        if num_instants_per_fetch == 0 {
            return Err(ConfigError::InvalidValue {
                key: "num_instants_per_fetch",
                message: "must be a positive number of instants".to_string(),
            });
        }

        let data_file_format = data_file_format.unwrap_or_default();
        Ok(Self {
            src_path,
            blob_root,
            num_instants_per_fetch,
            missing_checkpoint_strategy,
            check_if_file_exists: check_if_file_exists.unwrap_or(false),
            source_file_format: source_file_format.unwrap_or_default(),
            data_file_format,
            cloud: CloudSourceOptions::resolve(cloud, data_file_format)?,
            key_generator: KeyGeneratorOptions::from(key_generator),
        })
    }
}

impl CloudSourceOptions {
    fn resolve(raw: CloudSourceOptionsToml, format: FileFormat) -> Result<Self, ConfigError> {
        let fetch_parallelism = raw.fetch_parallelism.unwrap_or(DEFAULT_FETCH_PARALLELISM);
        if fetch_parallelism == 0 {
            return Err(ConfigError::InvalidValue {
                key: "cloud.fetch_parallelism",
                message: "must be at least 1".to_string(),
            });
        }
        let select_file_extension = raw
            .select_file_extension
            .filter(|extension| !extension.is_empty())
            .unwrap_or_else(|| format.default_extension().to_string());
        Ok(Self {
            select_relpath_prefix: non_empty(raw.select_relpath_prefix),
            ignore_relpath_prefix: non_empty(raw.ignore_relpath_prefix),
            ignore_relpath_substring: non_empty(raw.ignore_relpath_substring),
            select_file_extension,
            partition_fields_from_path: raw.partition_fields_from_path.unwrap_or_default(),
            fetch_parallelism,
        })
    }
}

impl Default for CloudSourceOptions {
    fn default() -> Self {
        Self {
            select_relpath_prefix: None,
            ignore_relpath_prefix: None,
            ignore_relpath_substring: None,
            select_file_extension: FileFormat::default().default_extension().to_string(),
            partition_fields_from_path: Vec::new(),
            fetch_parallelism: DEFAULT_FETCH_PARALLELISM,
        }
    }
}

impl From<KeyGeneratorOptionsToml> for KeyGeneratorOptions {
    fn from(raw: KeyGeneratorOptionsToml) -> Self {
        Self {
            record_key_field: non_empty(raw.record_key_field),
            partition_path_field: non_empty(raw.partition_path_field),
            hive_style_partitioning: raw.hive_style_partitioning.unwrap_or(false),
            url_encode_partitioning: raw.url_encode_partitioning.unwrap_or(false),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
