use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FileFormat {
    /// One JSON object per line.
    #[default]
    #[serde(alias = "jsonl")]
    Json,
    /// Comma separated values with a header row.
    Csv,
}

impl FileFormat {
    /// Extension objects of this format carry when none is configured.
    pub fn default_extension(self) -> &'static str {
        match self {
            FileFormat::Json => ".json",
            FileFormat::Csv => ".csv",
        }
    }
}
