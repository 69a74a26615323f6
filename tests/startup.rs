use std::fs;

use nested_config::config::path::join;
use nested_config::discovery::find_or_create_app_config_with;
use nested_config::{Config, Environment, TomlModuleLoader};
use tempfile::TempDir;
use toml::Value;

fn load(dir: &TempDir, env: &str) -> Config {
    let loader = TomlModuleLoader::with_environment(Environment::named(env));
    find_or_create_app_config_with(dir.path(), &loader).unwrap()
}

#[test]
fn startup_populates_and_reads_config() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("app")).unwrap();
    fs::write(
        dir.path().join("app/config.toml"),
        r#"
        [default]
        name = "shop"

        [default.server]
        port = 4000
        "#,
    )
    .unwrap();

    let mut config = load(&dir, "prod");
    assert_eq!(config.env(), "prod");
    assert_eq!(config.get("server.port"), Some(Value::Integer(4000)));

    let ssl = !config.is("dev");
    config.set(join("server", "ssl.on"), ssl).unwrap();
    config.push("server.hosts", "a.example.com").unwrap();
    config.push("server.hosts", "b.example.com").unwrap();

    let mut plugins = toml::Table::new();
    plugins.insert("cache".into(), Value::Boolean(true));
    config.assign_at(plugins, "plugins").unwrap();

    assert!(config.has("server.ssl.on"));
    assert_eq!(
        config.get("server.hosts.1"),
        Some(Value::String("b.example.com".into()))
    );
    assert_eq!(config.get("plugins.cache"), Some(Value::Boolean(true)));
    assert_eq!(config.get("cache"), Some(Value::Boolean(true)));
    assert_eq!(config.get_required("name").unwrap(), Value::String("shop".into()));
}

#[test]
fn startup_without_module_is_empty() {
    let dir = TempDir::new().unwrap();
    let config = load(&dir, "prod");
    assert!(config.to_object().is_empty());
    assert_eq!(config.env(), "prod");
    assert!(config.get_required("name").is_err());
}
