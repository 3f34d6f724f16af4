//! Rendering of command results: JSON/YAML for descriptors, CSV for result sets

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use fireboltctl_core::QueryResult;
use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;

use crate::error::{CliError, Result as CliResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let json_value = serde_json::to_value(data)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_value)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&json_value)?);
        }
    }

    Ok(())
}

/// Join a destination folder and file name into one normalized path.
///
/// An empty folder yields the file name alone. `.` components are dropped and
/// `..` is resolved lexically, without touching the filesystem.
pub fn combine_folder_and_file_name(folder: &str, file: &str) -> PathBuf {
    let joined = if folder.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", folder, file)
    };
    normalize_path(Path::new(&joined))
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    if normalized.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        normalized
    }
}

/// Create the destination folder (and parents) unless it is empty
pub fn ensure_folder(folder: &str) -> CliResult<()> {
    if folder.is_empty() {
        return Ok(());
    }

    fs::create_dir_all(folder).map_err(|e| CliError::FileError {
        path: folder.to_string(),
        message: e.to_string(),
    })
}

/// Write a result set to `path` as CSV.
///
/// Rows go to a temporary file next to `path` first; `path` only appears
/// once every row has been written.
pub fn write_csv_file(result: &QueryResult, path: &Path, header: bool) -> CliResult<()> {
    let file_error = |e: std::io::Error| CliError::FileError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir).map_err(file_error)?;
    write_csv(result, staged.as_file_mut(), header)?;
    staged.persist(path).map_err(|e| file_error(e.error))?;
    Ok(())
}

/// Write a result set as CSV.
///
/// Columns follow the order of `meta`. Each row must carry every declared
/// column; a missing one fails the whole write.
pub fn write_csv<W: Write>(result: &QueryResult, writer: W, header: bool) -> CliResult<()> {
    let columns = result.column_names();
    let mut csv_writer = csv::Writer::from_writer(writer);

    if header {
        csv_writer.write_record(&columns)?;
    }

    for (index, row) in result.data.iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len());
        for column in &columns {
            let value = row.get(*column).ok_or_else(|| CliError::OutputError {
                message: format!("row {} has no value for column '{}'", index + 1, column),
            })?;
            record.push(csv_field(value));
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush().map_err(|e| CliError::OutputError {
        message: format!("IO error: {}", e),
    })?;
    Ok(())
}

fn csv_field(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn result_set() -> QueryResult {
        serde_json::from_value(json!({
            "meta": [
                {"name": "region", "type": "String"},
                {"name": "total", "type": "Int64"},
                {"name": "note", "type": "Nullable(String)"}
            ],
            "data": [
                {"total": 10, "region": "emea", "note": null},
                {"note": "has, comma", "region": "apac", "total": 7}
            ],
            "rows": 2
        }))
        .unwrap()
    }

    fn render(result: &QueryResult, header: bool) -> CliResult<String> {
        let mut buffer = Vec::new();
        write_csv(result, &mut buffer, header)?;
        Ok(String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn test_csv_with_header_follows_meta_order() {
        let csv = render(&result_set(), true).unwrap();
        assert_eq!(
            csv,
            "region,total,note\nemea,10,\napac,7,\"has, comma\"\n"
        );
    }

    #[test]
    fn test_csv_without_header() {
        let csv = render(&result_set(), false).unwrap();
        assert_eq!(csv, "emea,10,\napac,7,\"has, comma\"\n");
    }

    #[test]
    fn test_csv_missing_column_is_an_error() {
        let result: QueryResult = serde_json::from_value(json!({
            "meta": [{"name": "a"}, {"name": "b"}],
            "data": [{"a": 1, "b": 2}, {"a": 3}]
        }))
        .unwrap();

        let err = render(&result, true).unwrap_err();
        assert!(matches!(err, CliError::OutputError { .. }));
        assert!(err.to_string().contains("row 2"));
        assert!(err.to_string().contains("'b'"));
    }

    #[test]
    fn test_csv_nested_values_are_json() {
        let result: QueryResult = serde_json::from_value(json!({
            "meta": [{"name": "tags"}, {"name": "ok"}],
            "data": [{"tags": ["a", "b"], "ok": true}]
        }))
        .unwrap();

        let csv = render(&result, false).unwrap();
        assert_eq!(csv, "\"[\"\"a\"\",\"\"b\"\"]\",true\n");
    }

    #[test]
    fn test_empty_result_writes_only_header() {
        let result: QueryResult =
            serde_json::from_value(json!({"meta": [{"name": "x"}], "data": []})).unwrap();
        assert_eq!(render(&result, true).unwrap(), "x\n");
        assert_eq!(render(&result, false).unwrap(), "");
    }

    #[test]
    fn test_combine_without_folder() {
        assert_eq!(
            combine_folder_and_file_name("", "output.csv"),
            PathBuf::from("output.csv")
        );
    }

    #[test]
    fn test_combine_with_folder() {
        assert_eq!(
            combine_folder_and_file_name("exports/", "output.csv"),
            PathBuf::from("exports/output.csv")
        );
        assert_eq!(
            combine_folder_and_file_name("/tmp/exports", "output.csv"),
            PathBuf::from("/tmp/exports/output.csv")
        );
    }

    #[test]
    fn test_combine_normalizes_dots() {
        assert_eq!(
            combine_folder_and_file_name("./exports/../daily", "./output.csv"),
            PathBuf::from("daily/output.csv")
        );
        assert_eq!(
            combine_folder_and_file_name("../shared", "output.csv"),
            PathBuf::from("../shared/output.csv")
        );
    }

    #[test]
    fn test_ensure_folder_creates_nested_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("a/b/c");
        ensure_folder(nested.to_str().unwrap()).unwrap();
        assert!(nested.is_dir());
        ensure_folder("").unwrap();
    }

    #[test]
    fn test_write_csv_file_leaves_nothing_behind_on_bad_row() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        let result: QueryResult = serde_json::from_value(json!({
            "meta": [{"name": "a"}, {"name": "b"}],
            "data": [{"a": 1, "b": 2}, {"a": 3}]
        }))
        .unwrap();

        let err = write_csv_file(&result, &path, true).unwrap_err();
        assert!(matches!(err, CliError::OutputError { .. }));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_write_csv_file_replaces_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale").unwrap();

        write_csv_file(&result_set(), &path, false).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "emea,10,\napac,7,\"has, comma\"\n"
        );
    }

    #[test]
    fn test_write_csv_file_reports_bad_destination() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing/output.csv");
        let err = write_csv_file(&result_set(), &path, true).unwrap_err();
        assert!(matches!(err, CliError::FileError { .. }));
    }
}
