//! Loading a record from a config file.
//!
//! This is the lowest-precedence layer: whatever a file provides is later
//! overridden by command-line flags and then by environment variables. The
//! format follows the file extension: `.json` is read with serde_json,
//! anything else is read as TOML.
//!
//! Records usually carry `#[serde(default)]` so a file only has to name the
//! keys it wants to set.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::BindError;

/// Supported file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => FileFormat::Json,
            _ => FileFormat::Toml,
        }
    }
}

/// Decode `content` as `format`. `path` is only used for error messages.
pub fn parse_str<T: DeserializeOwned>(
    content: &str,
    format: FileFormat,
    path: &Path,
) -> Result<T, BindError> {
    match format {
        FileFormat::Toml => toml::from_str(content).map_err(|e| BindError::ParseError {
            path: path.to_path_buf(),
            source: e,
        }),
        FileFormat::Json => serde_json::from_str(content).map_err(|e| BindError::JsonError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read and decode the file at `path`.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, BindError> {
    let content = std::fs::read_to_string(path).map_err(|e| BindError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_str(&content, FileFormat::from_path(path), path)
}

/// Like [`load_file`], but a missing file yields `Ok(None)`.
/// Other I/O errors (permissions, etc.) are still propagated.
pub fn load_optional_file<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, BindError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_str(&content, FileFormat::from_path(path), path).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BindError::IoError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::Record;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn format_follows_extension() {
        assert_eq!(FileFormat::from_path(Path::new("a/app.json")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("app.JSON")), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("app.toml")), FileFormat::Toml);
        assert_eq!(FileFormat::from_path(Path::new("app")), FileFormat::Toml);
    }

    #[test]
    fn toml_file_loads_nested_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.toml");
        fs::write(
            &path,
            r#"
int_val = 10
int64 = 11
str_val = "some string"
int_slice = [1, 2, 3]

[data]
fl64 = 12.5
bool_val = true
"#,
        )
        .unwrap();

        let record: Record = load_file(&path).unwrap();
        assert_eq!(record.int_val, 10);
        assert_eq!(record.int64, 11);
        assert_eq!(record.str_val, "some string");
        assert_eq!(record.int_slice, vec![1, 2, 3]);
        assert_eq!(record.data.fl64, 12.5);
        assert!(record.data.bool_val);
    }

    #[test]
    fn json_file_loads_partial_record() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.json");
        fs::write(&path, r#"{"int_val": 3, "data": {"fl64": 0.5}}"#).unwrap();

        let record: Record = load_file(&path).unwrap();
        assert_eq!(record.int_val, 3);
        assert_eq!(record.data.fl64, 0.5);
        assert_eq!(record.str_val, "");
    }

    #[test]
    fn missing_required_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_file::<Record>(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, BindError::IoError { .. }));
    }

    #[test]
    fn missing_optional_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let loaded = load_optional_file::<Record>(&dir.path().join("nope.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn malformed_toml_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "int_val = [unclosed").unwrap();
        let err = load_file::<Record>(&path).unwrap_err();
        assert!(matches!(err, BindError::ParseError { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn wrong_type_in_json_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"int_val": "ten"}"#).unwrap();
        let err = load_file::<Record>(&path).unwrap_err();
        assert!(matches!(err, BindError::JsonError { .. }));
    }
}
