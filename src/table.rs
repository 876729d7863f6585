use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("The file {} was not found", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON format in the data file: {0}")]
    Format(#[from] serde_json::Error),

    #[error("{0}")]
    Schema(String),
}

/// Headers plus positionally aligned rows. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Read and validate a table from a JSON file on disk.
pub fn load(path: &Path) -> Result<Table, TableError> {
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => TableError::NotFound(path.to_path_buf()),
        _ => TableError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let table = from_json_slice(&bytes)?;
    info!(
        path = %path.display(),
        columns = table.column_count(),
        rows = table.row_count(),
        "table loaded"
    );
    Ok(table)
}

/// Parse and validate a table from JSON text.
pub fn from_json_str(text: &str) -> Result<Table, TableError> {
    from_json_slice(text.as_bytes())
}

/// Parse and validate a table from raw JSON bytes. Bytes that are not
/// UTF-8 are a format error, not an I/O error.
///
/// Every row must have exactly one value per header; an empty `rows`
/// array is accepted.
pub fn from_json_slice(bytes: &[u8]) -> Result<Table, TableError> {
    let doc: Value = serde_json::from_slice(bytes)?;
    let obj = doc
        .as_object()
        .ok_or_else(|| schema("JSON must be an object containing 'headers' and 'rows'"))?;

    let (Some(headers), Some(rows)) = (obj.get("headers"), obj.get("rows")) else {
        return Err(schema("JSON must contain 'headers' and 'rows'"));
    };

    let headers = headers
        .as_array()
        .ok_or_else(|| schema("'headers' must be an array of strings"))?
        .iter()
        .map(|h| h.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| schema("'headers' must be an array of strings"))?;

    let rows = rows
        .as_array()
        .ok_or_else(|| schema("'rows' must be an array of arrays"))?
        .iter()
        .map(|r| r.as_array().cloned())
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| schema("'rows' must be an array of arrays"))?;

    for (i, row) in rows.iter().enumerate() {
        if row.len() != headers.len() {
            return Err(schema(format!(
                "Header count doesn't match row columns (row {}: {} values, {} headers)",
                i,
                row.len(),
                headers.len()
            )));
        }
    }

    Ok(Table { headers, rows })
}

fn schema(msg: impl Into<String>) -> TableError {
    TableError::Schema(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid() {
        let table = from_json_str(
            r#"{"headers": ["Month", "Sales", "Date"], "rows": [["Jan", 100, "Jan-20"], ["Feb", 150.5, "Feb-20"]]}"#,
        )
        .unwrap();
        assert_eq!(table.headers(), ["Month", "Sales", "Date"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1][1], serde_json::json!(150.5));
    }

    #[test]
    fn test_empty_rows_accepted() {
        let table = from_json_str(r#"{"headers": ["A"], "rows": []}"#).unwrap();
        assert_eq!(table.column_count(), 1);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_extra_keys_ignored() {
        let table = from_json_str(r#"{"headers": ["A"], "rows": [[1]], "title": "x"}"#).unwrap();
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_invalid_json() {
        let err = from_json_str("{\"headers\": [").unwrap_err();
        assert!(matches!(err, TableError::Format(_)));
        assert!(err.to_string().starts_with("Invalid JSON format"));
    }

    #[test]
    fn test_missing_headers() {
        let err = from_json_str(r#"{"rows": [[1]]}"#).unwrap_err();
        assert!(matches!(err, TableError::Schema(_)));
        assert_eq!(err.to_string(), "JSON must contain 'headers' and 'rows'");
    }

    #[test]
    fn test_missing_rows() {
        let err = from_json_str(r#"{"headers": ["A"]}"#).unwrap_err();
        assert!(matches!(err, TableError::Schema(_)));
    }

    #[test]
    fn test_not_an_object() {
        let err = from_json_str("[1, 2]").unwrap_err();
        assert!(matches!(err, TableError::Schema(_)));
    }

    #[test]
    fn test_non_string_header() {
        let err = from_json_str(r#"{"headers": ["A", 2], "rows": []}"#).unwrap_err();
        assert!(matches!(err, TableError::Schema(_)));
    }

    #[test]
    fn test_row_not_array() {
        let err = from_json_str(r#"{"headers": ["A"], "rows": ["x"]}"#).unwrap_err();
        assert!(matches!(err, TableError::Schema(_)));
    }

    #[test]
    fn test_first_row_mismatch() {
        let err = from_json_str(r#"{"headers": ["A", "B"], "rows": [[1]]}"#).unwrap_err();
        assert!(matches!(err, TableError::Schema(_)));
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn test_later_row_mismatch_rejected() {
        let err = from_json_str(r#"{"headers": ["A", "B"], "rows": [[1, 2], [3, 4], [5]]}"#)
            .unwrap_err();
        assert!(matches!(err, TableError::Schema(_)));
        assert!(err.to_string().contains("row 2: 1 values, 2 headers"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"headers": ["Month", "Sales"], "rows": [["Jan", 100]]}}"#).unwrap();

        let table = load(file.path()).unwrap();
        assert_eq!(table.headers(), ["Month", "Sales"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");

        let err = load(&path).unwrap_err();
        assert!(matches!(err, TableError::NotFound(_)));
        assert!(err.to_string().contains("missing.json"));
    }

    #[test]
    fn test_load_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, TableError::Format(_)));
    }

    #[test]
    fn test_load_non_utf8_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{\"headers\": [\"A\"], \"rows\": [[\"\xff\xfe\"]]}")
            .unwrap();

        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, TableError::Format(_)));
    }

    #[test]
    fn test_stray_byte_is_format_error() {
        let err = from_json_slice(b"\xff").unwrap_err();
        assert!(matches!(err, TableError::Format(_)));
    }
}
