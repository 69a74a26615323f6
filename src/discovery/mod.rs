//! Locating the application's configuration module at startup.

use std::path::Path;

use tracing::debug;

use crate::config::{load_table, Config, ConfigError, Environment, Init};

/// What a configuration module exported.
#[derive(Debug)]
pub enum ModuleExport {
    /// A ready-made store.
    Store(Config),
    /// The module's default-export slot.
    Default(Box<ModuleExport>),
    /// Anything that is not a store.
    Other,
}

/// Loads the configuration module at a path given without extension.
///
/// Implementations report a missing module as
/// [`ConfigError::ModuleNotFound`]; any other error is treated as fatal by
/// [`find_or_create_app_config`].
pub trait ModuleLoader {
    fn load(&self, path: &Path) -> Result<ModuleExport, ConfigError>;

    /// Environment for the empty store built when no module provides one.
    fn environment(&self) -> Environment {
        Environment::from_process()
    }
}

impl<F> ModuleLoader for F
where
    F: Fn(&Path) -> Result<ModuleExport, ConfigError>,
{
    fn load(&self, path: &Path) -> Result<ModuleExport, ConfigError> {
        self(path)
    }
}

/// Loads `<path>.toml` as a configuration module.
///
/// A file whose only top-level entry is a `default` table is treated as a
/// default export of that table; any other file exports itself.
#[derive(Debug, Clone)]
pub struct TomlModuleLoader {
    env: Environment,
}

impl TomlModuleLoader {
    /// Creates a loader whose stores use the current process environment.
    pub fn new() -> Self {
        Self::with_environment(Environment::from_process())
    }

    /// Creates a loader whose stores, including the empty fallback, use `env`.
    pub fn with_environment(env: Environment) -> Self {
        Self { env }
    }
}

impl Default for TomlModuleLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleLoader for TomlModuleLoader {
    fn load(&self, path: &Path) -> Result<ModuleExport, ConfigError> {
        let file = path.with_extension("toml");
        let mut table = load_table(&file)?;
        debug!(path = %file.display(), keys = table.len(), "loaded config module");

        if table.len() == 1 && table.get("default").is_some_and(toml::Value::is_table) {
            if let Some(toml::Value::Table(inner)) = table.remove("default") {
                let store = Config::create_in(Init::Mapping(inner), self.env.clone())?;
                return Ok(ModuleExport::Default(Box::new(ModuleExport::Store(store))));
            }
        }

        let store = Config::create_in(Init::Mapping(table), self.env.clone())?;
        Ok(ModuleExport::Store(store))
    }

    fn environment(&self) -> Environment {
        self.env.clone()
    }
}

/// Loads `<base_dir>/app/config.toml`, or returns an empty [`Config`] if
/// there is none.
pub fn find_or_create_app_config(base_dir: impl AsRef<Path>) -> Result<Config, ConfigError> {
    find_or_create_app_config_with(base_dir, &TomlModuleLoader::new())
}

/// Like [`find_or_create_app_config`], with a custom module loader.
///
/// A missing module yields an empty store, as does a module whose export is
/// neither a store nor a default export holding one. Other load errors are
/// returned.
pub fn find_or_create_app_config_with(
    base_dir: impl AsRef<Path>,
    loader: &impl ModuleLoader,
) -> Result<Config, ConfigError> {
    let path = base_dir.as_ref().join("app").join("config");

    let export = match loader.load(&path) {
        Ok(export) => export,
        Err(ConfigError::ModuleNotFound(missing)) => {
            debug!(path = %missing.display(), "no config module found, using empty config");
            return Ok(Config::with_environment(loader.environment()));
        }
        Err(e) => return Err(e),
    };

    match export {
        ModuleExport::Store(config) => Ok(config),
        ModuleExport::Default(inner) => match *inner {
            ModuleExport::Store(config) => Ok(config),
            _ => {
                debug!(path = %path.display(), "default export is not a config, using empty config");
                Ok(Config::with_environment(loader.environment()))
            }
        },
        ModuleExport::Other => {
            debug!(path = %path.display(), "config module exports no config, using empty config");
            Ok(Config::with_environment(loader.environment()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_module(dir: &TempDir, contents: &str) {
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();
        fs::write(app.join("config.toml"), contents).unwrap();
    }

    #[test]
    fn test_missing_module_yields_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = find_or_create_app_config(dir.path()).unwrap();
        assert!(config.to_object().is_empty());
    }

    #[test]
    fn test_missing_module_keeps_loader_environment() {
        let dir = TempDir::new().unwrap();
        let loader = TomlModuleLoader::with_environment(Environment::named("prod"));
        let config = find_or_create_app_config_with(dir.path(), &loader).unwrap();
        assert!(config.to_object().is_empty());
        assert_eq!(config.env(), "prod");
    }

    #[test]
    fn test_non_store_export_keeps_loader_environment() {
        struct PinnedLoader;

        impl ModuleLoader for PinnedLoader {
            fn load(&self, _path: &Path) -> Result<ModuleExport, ConfigError> {
                Ok(ModuleExport::Default(Box::new(ModuleExport::Other)))
            }

            fn environment(&self) -> Environment {
                Environment::named("staging")
            }
        }

        let config = find_or_create_app_config_with("/srv/site", &PinnedLoader).unwrap();
        assert!(config.to_object().is_empty());
        assert!(config.is("staging"));
    }

    #[test]
    fn test_loads_module_as_store() {
        let dir = TempDir::new().unwrap();
        write_module(
            &dir,
            r#"
            [server]
            port = 4000
            "#,
        );
        let config = find_or_create_app_config(dir.path()).unwrap();
        assert_eq!(config.get("server.port"), Some(toml::Value::Integer(4000)));
    }

    #[test]
    fn test_unwraps_default_export() {
        let dir = TempDir::new().unwrap();
        write_module(
            &dir,
            r#"
            [default]
            name = "app"
            "#,
        );
        let config = find_or_create_app_config(dir.path()).unwrap();
        assert_eq!(config.get("name"), Some(toml::Value::String("app".into())));
        assert_eq!(config.get("default"), None);
    }

    #[test]
    fn test_default_table_beside_other_keys_is_plain_data() {
        let dir = TempDir::new().unwrap();
        write_module(
            &dir,
            r#"
            name = "app"
            [default]
            retries = 3
            "#,
        );
        let config = find_or_create_app_config(dir.path()).unwrap();
        assert_eq!(config.get("default.retries"), Some(toml::Value::Integer(3)));
    }

    #[test]
    fn test_parse_errors_propagate() {
        let dir = TempDir::new().unwrap();
        write_module(&dir, "port = ");
        let result = find_or_create_app_config(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_loader_receives_conventional_path() {
        let loader = |path: &Path| -> Result<ModuleExport, ConfigError> {
            assert_eq!(path, Path::new("/srv/site/app/config"));
            Ok(ModuleExport::Other)
        };
        let config = find_or_create_app_config_with("/srv/site", &loader).unwrap();
        assert!(config.to_object().is_empty());
    }

    #[test]
    fn test_non_store_default_export_yields_empty_config() {
        let loader = |_: &Path| -> Result<ModuleExport, ConfigError> {
            Ok(ModuleExport::Default(Box::new(ModuleExport::Other)))
        };
        let config = find_or_create_app_config_with("/srv/site", &loader).unwrap();
        assert!(config.to_object().is_empty());
    }

    #[test]
    fn test_custom_loader_store_is_returned_as_is() {
        let loader = |_: &Path| -> Result<ModuleExport, ConfigError> {
            let mut config = Config::with_environment(Environment::named("test"));
            config.set("name", "custom")?;
            Ok(ModuleExport::Default(Box::new(ModuleExport::Store(config))))
        };
        let config = find_or_create_app_config_with("/srv/site", &loader).unwrap();
        assert_eq!(config.get("name"), Some(toml::Value::String("custom".into())));
        assert!(config.is("test"));
    }

    #[test]
    fn test_other_loader_errors_propagate() {
        let loader = |path: &Path| -> Result<ModuleExport, ConfigError> {
            Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        };
        let result = find_or_create_app_config_with("/srv/site", &loader);
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }
}
