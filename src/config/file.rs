//! TOML file loading.

use std::path::Path;

use toml::Table;

use super::ConfigError;

/// Reads and parses a TOML file into a table.
///
/// A missing file is reported as [`ConfigError::ModuleNotFound`] so callers
/// can tell it apart from unreadable or malformed files.
pub fn load_table(path: &Path) -> Result<Table, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::ModuleNotFound(path.to_path_buf()))
        }
        Err(e) => Err(ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_loads_nested_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table["server"]["port"].as_integer(), Some(4000));
    }

    #[test]
    fn test_absent_file_is_module_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");

        let result = load_table(&path);
        assert!(matches!(result, Err(ConfigError::ModuleNotFound(ref p)) if *p == path));
    }

    #[test]
    fn test_directory_is_read_error_not_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::create_dir(&path).unwrap();

        let result = load_table(&path);
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "port = ").unwrap();

        let result = load_table(&path);
        assert!(matches!(
            result,
            Err(ConfigError::ParseError { path: ref failed, .. }) if *failed == path
        ));
    }
}
