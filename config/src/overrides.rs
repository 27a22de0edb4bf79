use crate::ConfigError;
use toml::Value as TomlValue;

/// Parse a single `key=value` override. The value is read as a TOML literal
/// and falls back to a plain string, so `-c cloud.select_relpath_prefix=country`
/// works without quoting.
pub fn parse_override(raw: &str) -> Result<(String, TomlValue), ConfigError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(ConfigError::InvalidOverride {
            raw: raw.to_string(),
            message: "expected key=value".to_string(),
        });
    };
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(ConfigError::InvalidOverride {
            raw: raw.to_string(),
            message: "empty key segment".to_string(),
        });
    }
    let value = value.trim();
    let parsed = parse_toml_literal(value).unwrap_or_else(|| TomlValue::String(value.to_string()));
    Ok((key.to_string(), parsed))
}

fn parse_toml_literal(value: &str) -> Option<TomlValue> {
    let wrapped = format!("_v_ = {value}");
    let mut table = toml::from_str::<toml::Table>(&wrapped).ok()?;
    table.remove("_v_")
}

/// Set each dotted key on `root`, creating intermediate tables as needed.
pub fn apply_overrides(
    root: &mut TomlValue,
    overrides: &[(String, TomlValue)],
) -> Result<(), ConfigError> {
    for (path, value) in overrides {
        apply_one(root, path, value.clone())?;
    }
    Ok(())
}

fn apply_one(root: &mut TomlValue, path: &str, value: TomlValue) -> Result<(), ConfigError> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = root;
    for segment in parents {
        let TomlValue::Table(table) = current else {
            return Err(not_a_table(path, segment));
        };
        current = table
            .entry((*segment).to_string())
            .or_insert(TomlValue::Table(toml::Table::new()));
    }
    match current {
        TomlValue::Table(table) => {
            table.insert((*last).to_string(), value);
            Ok(())
        }
        _ => Err(not_a_table(path, last)),
    }
}

fn not_a_table(path: &str, segment: &str) -> ConfigError {
    ConfigError::InvalidOverride {
        raw: path.to_string(),
        message: format!("`{segment}` is not nested under a table"),
    }
}
