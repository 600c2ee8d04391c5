//! Configuration file loading
//!
//! A configuration file is a mapping from application name to that
//! application's section:
//!
//! ```json
//! {
//!   "indexer": { "max-retry-count": 5, "peers": ["a:1", "b:2"] },
//!   "gateway": { "verbose": true }
//! }
//! ```
//!
//! Files ending in `.toml` are read as TOML; everything else as JSON.

use super::error::{ConfigError, Result};
use super::schema::{FieldKind, FieldValue};
use crate::app::AppName;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::Path;

/// Raw per-application block
pub type SectionBlock = Map<String, Value>;

/// Read `path` and return the block stored under `app`, if any
pub fn load_app_section(path: &Path, app: &AppName) -> Result<Option<SectionBlock>> {
    let mut document: Map<String, Value> = load_document(path)?;

    match document.remove(app.as_str()) {
        None | Some(Value::Null) => {
            tracing::debug!(path = %path.display(), app = %app, "No section for application in config file");
            Ok(None)
        }
        Some(Value::Object(block)) => Ok(Some(block)),
        Some(_) => Err(ConfigError::config_file(
            path,
            format!("section '{app}' must be a mapping"),
        )),
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::config_file(path, e))?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&text).map_err(|e| ConfigError::config_file(path, e))
    } else {
        serde_json::from_str(&text).map_err(|e| ConfigError::config_file(path, e))
    }
}

/// Decode the value of one field from a section block
///
/// The flag name is the canonical key; the declared field identifier is
/// accepted as an alias. A missing key or `null` yields `None`.
pub fn decode_field(
    path: &Path,
    block: &SectionBlock,
    name: &str,
    flag: &str,
    kind: FieldKind,
) -> Result<Option<FieldValue>> {
    let Some(raw) = block.get(flag).or_else(|| block.get(name)) else {
        return Ok(None);
    };

    let value = match (kind, raw) {
        (_, Value::Null) => return Ok(None),
        (FieldKind::Bool, Value::Bool(v)) => Some(FieldValue::Bool(*v)),
        (FieldKind::Int, Value::Number(n)) => n.as_i64().map(FieldValue::Int),
        (FieldKind::String, Value::String(s)) => Some(FieldValue::String(s.clone())),
        (FieldKind::StringList, Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map(FieldValue::StringList),
        _ => None,
    };

    value.map(Some).ok_or_else(|| ConfigError::FieldType {
        path: path.to_path_buf(),
        field: flag.to_owned(),
        expected: kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_json_section() {
        let file = write_file(
            ".json",
            r#"{"indexer": {"max-retry-count": 5}, "other": {"x": 1}}"#,
        );

        let block = load_app_section(file.path(), &AppName::new("indexer"))
            .unwrap()
            .unwrap();
        assert_eq!(block.get("max-retry-count"), Some(&Value::from(5)));
    }

    #[test]
    fn test_toml_section() {
        let file = write_file(
            ".toml",
            "[indexer]\nverbose = true\npeers = [\"a\", \"b\"]\n",
        );

        let block = load_app_section(file.path(), &AppName::new("indexer"))
            .unwrap()
            .unwrap();
        let peers = decode_field(file.path(), &block, "peers", "peers", FieldKind::StringList)
            .unwrap();
        assert_eq!(
            peers,
            Some(FieldValue::StringList(vec!["a".into(), "b".into()]))
        );
    }

    #[test]
    fn test_missing_app_is_not_an_error() {
        let file = write_file(".json", r#"{"other": {}}"#);
        assert!(load_app_section(file.path(), &AppName::new("indexer"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_invalid_documents() {
        let file = write_file(".json", "{not json");
        assert!(matches!(
            load_app_section(file.path(), &AppName::new("indexer")),
            Err(ConfigError::ConfigFile { .. })
        ));

        let file = write_file(".json", r#"{"indexer": 3}"#);
        assert!(matches!(
            load_app_section(file.path(), &AppName::new("indexer")),
            Err(ConfigError::ConfigFile { .. })
        ));

        let missing = Path::new("/nonexistent/runkit/config.json");
        assert!(matches!(
            load_app_section(missing, &AppName::new("indexer")),
            Err(ConfigError::ConfigFile { .. })
        ));
    }

    #[test]
    fn test_decode_field_types() {
        let path = Path::new("cfg.json");
        let block: SectionBlock = serde_json::from_str(
            r#"{"verbose": "yes", "max_retry_count": 4, "name": null}"#,
        )
        .unwrap();

        let err = decode_field(path, &block, "verbose", "verbose", FieldKind::Bool).unwrap_err();
        assert!(matches!(err, ConfigError::FieldType { expected: FieldKind::Bool, .. }));

        let alias = decode_field(
            path,
            &block,
            "max_retry_count",
            "max-retry-count",
            FieldKind::Int,
        )
        .unwrap();
        assert_eq!(alias, Some(FieldValue::Int(4)));

        assert_eq!(
            decode_field(path, &block, "name", "name", FieldKind::String).unwrap(),
            None
        );
        assert_eq!(
            decode_field(path, &block, "absent", "absent", FieldKind::String).unwrap(),
            None
        );
    }
}
