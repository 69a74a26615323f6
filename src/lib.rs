pub mod config;
pub mod discovery;

pub use config::{AssignSource, Config, ConfigError, Environment, Init, PathSpec};
pub use discovery::{find_or_create_app_config, ModuleExport, ModuleLoader, TomlModuleLoader};
