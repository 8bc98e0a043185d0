//! Reading and writing dbt source YAML files

use crate::source_file::SourceFile;
use std::path::Path;

/// Errors from YAML file I/O
#[derive(Debug, thiserror::Error)]
pub enum YamlError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}

/// Read a dbt source YAML file
///
/// Returns `Ok(None)` when the file does not exist.
pub fn read_source_file(path: &Path) -> Result<Option<SourceFile>, YamlError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to read source file");
        YamlError::IoError(format!("{}: {}", path.display(), e))
    })?;

    let file = serde_yaml::from_str(&contents).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to parse source file");
        YamlError::ParseError(format!("{}: {}", path.display(), e))
    })?;

    Ok(Some(file))
}

/// Write a dbt source YAML file, creating parent directories as needed
pub fn write_source_file(path: &Path, file: &SourceFile) -> Result<(), YamlError> {
    let rendered =
        serde_yaml::to_string(file).map_err(|e| YamlError::SerializeError(e.to_string()))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .map_err(|e| YamlError::IoError(format!("{}: {}", parent.display(), e)))?;
        }
    }

    std::fs::write(path, rendered).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "failed to write source file");
        YamlError::IoError(format!("{}: {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::{Source, SourceColumn, SourceTable};
    use pretty_assertions::assert_eq;

    fn sample_file() -> SourceFile {
        let mut id = SourceColumn::new("id");
        id.data_type = Some("INT64".to_string());
        id.description = Some("Primary key".to_string());

        let mut name = SourceColumn::new("name");
        name.data_type = Some("STRING".to_string());
        name.description = Some("Name field".to_string());

        let mut table = SourceTable::new("test_table");
        table.description = Some("Test table description".to_string());
        table.columns = vec![id, name];

        let mut source = Source::new("test_source");
        source.database = Some("test_project".to_string());
        source.schema = Some("test_dataset".to_string());
        source.description = Some("Test source description".to_string());
        source.tables = vec![table];

        SourceFile {
            version: 2,
            sources: vec![source],
        }
    }

    #[test]
    fn write_and_read_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.yml");

        write_source_file(&path, &sample_file()).unwrap();
        let read_back = read_source_file(&path).unwrap().unwrap();

        assert_eq!(read_back.version, 2);
        assert_eq!(read_back.sources.len(), 1);

        let source = &read_back.sources[0];
        assert_eq!(source.name, "test_source");
        assert_eq!(source.database.as_deref(), Some("test_project"));
        assert_eq!(source.schema.as_deref(), Some("test_dataset"));
        assert_eq!(source.tables.len(), 1);

        let table = &source.tables[0];
        assert_eq!(table.name, "test_table");
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[0].name, "id");
        assert_eq!(table.columns[0].data_type.as_deref(), Some("INT64"));
        assert_eq!(table.columns[0].description.as_deref(), Some("Primary key"));
    }

    #[test]
    fn read_nonexistent_file_returns_none() {
        let result = read_source_file(Path::new("/nonexistent/sources.yml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn read_invalid_yaml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yml");
        std::fs::write(&path, "sources: [not: {closed").unwrap();

        let result = read_source_file(&path);
        assert!(matches!(result, Err(YamlError::ParseError(_))));
    }

    #[test]
    fn write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("staging").join("sources.yml");

        write_source_file(&path, &sample_file()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn rendered_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.yml");

        write_source_file(&path, &sample_file()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();

        assert!(content.contains("version: 2"));
        assert!(content.contains("sources:"));
        assert!(content.contains("name: test_source"));
        assert!(content.contains("tables:"));
        // Blank-description elision: nothing but the fields we set
        assert!(!content.contains("identifier"));
        assert!(!content.contains("meta"));
    }

    #[test]
    fn empty_column_list_survives_round_trip() {
        let mut file = sample_file();
        file.sources[0].tables[0].columns.clear();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.yml");

        write_source_file(&path, &file).unwrap();
        let read_back = read_source_file(&path).unwrap().unwrap();
        assert!(read_back.sources[0].tables[0].columns.is_empty());
    }
}
