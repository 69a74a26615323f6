use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::DeserializeOwned;
use toml::{Table, Value};
use tracing::{debug, trace};

use super::env::Environment;
use super::path::PathSpec;
use super::tree;
use super::ConfigError;

/// Callback that populates a freshly created [`Config`].
pub type BuildFn<'a> = Box<dyn FnOnce(&mut Config) -> Result<(), ConfigError> + 'a>;

/// The ways a [`Config`] can be initialized.
pub enum Init<'a> {
    /// An empty root table.
    Empty,
    /// A callback that populates the new store through its own API.
    Builder(BuildFn<'a>),
    /// Alias the root of another store.
    Existing(&'a Config),
    /// Adopt a table as the root.
    Mapping(Table),
}

impl<'a> Init<'a> {
    pub fn builder(f: impl FnOnce(&mut Config) -> Result<(), ConfigError> + 'a) -> Self {
        Init::Builder(Box::new(f))
    }
}

impl From<Table> for Init<'_> {
    fn from(table: Table) -> Self {
        Init::Mapping(table)
    }
}

impl<'a> From<&'a Config> for Init<'a> {
    fn from(config: &'a Config) -> Self {
        Init::Existing(config)
    }
}

/// Something that can be merged into a [`Config`] with [`Config::assign`].
#[derive(Debug)]
pub enum AssignSource<'a> {
    /// A plain value; only tables are accepted.
    Value(Value),
    /// The root table of another store.
    Store(&'a Config),
    /// A default-export wrapper, unwrapped before merging.
    Default(Box<AssignSource<'a>>),
}

impl AssignSource<'_> {
    fn into_table(self) -> Result<Table, ConfigError> {
        match self {
            AssignSource::Value(Value::Table(table)) => Ok(table),
            AssignSource::Value(other) => Err(ConfigError::InvalidArgument {
                found: other.type_str(),
            }),
            AssignSource::Store(config) => Ok(config.to_object()),
            AssignSource::Default(inner) => inner.into_table(),
        }
    }
}

impl From<Value> for AssignSource<'_> {
    fn from(value: Value) -> Self {
        AssignSource::Value(value)
    }
}

impl From<Table> for AssignSource<'_> {
    fn from(table: Table) -> Self {
        AssignSource::Value(Value::Table(table))
    }
}

impl<'a> From<&'a Config> for AssignSource<'a> {
    fn from(config: &'a Config) -> Self {
        AssignSource::Store(config)
    }
}

/// A tree of configuration values addressed by dotted paths.
///
/// Reads never fail on missing segments. Writes create intermediate tables
/// as they go, and [`push`](Self::push) creates arrays on demand.
///
/// ## Example
///
/// ```
/// use nested_config::{Config, ConfigError, Environment, Init};
///
/// let config = Config::create_in(
///     Init::builder(|c| {
///         c.set("server.port", 4000)?;
///         let ssl = !c.is("dev");
///         c.set("server.ssl.on", ssl)?;
///         Ok(())
///     }),
///     Environment::named("prod"),
/// )?;
///
/// assert_eq!(config.get("server.port"), Some(toml::Value::Integer(4000)));
/// assert!(config.has("server.ssl.on"));
/// # Ok::<(), ConfigError>(())
/// ```
///
/// ## Aliasing
///
/// [`Config::from_existing`] shares the other store's root: in-place writes
/// through either handle are visible to both until one of them replaces its
/// root wholesale, either through [`assign`](Self::assign) or
/// [`replace`](Self::replace).
#[derive(Debug)]
pub struct Config {
    root: Arc<RwLock<Table>>,
    env: Environment,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// Creates an empty store for the current process environment.
    pub fn new() -> Self {
        Self::with_environment(Environment::from_process())
    }

    /// Creates an empty store for the given environment.
    pub fn with_environment(env: Environment) -> Self {
        Self::from_mapping_in(Table::new(), env)
    }

    /// Creates a store from any [`Init`] shape, using the process environment.
    pub fn create<'a>(init: impl Into<Init<'a>>) -> Result<Self, ConfigError> {
        Self::create_in(init, Environment::from_process())
    }

    /// Creates a store from any [`Init`] shape in the given environment.
    pub fn create_in<'a>(
        init: impl Into<Init<'a>>,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        match init.into() {
            Init::Empty => Ok(Self::with_environment(env)),
            Init::Builder(f) => Self::from_builder_in(f, env),
            Init::Existing(other) => Ok(Self {
                root: Arc::clone(&other.root),
                env,
            }),
            Init::Mapping(table) => Ok(Self::from_mapping_in(table, env)),
        }
    }

    /// Creates a store and hands it to `f` to populate.
    pub fn from_builder(
        f: impl FnOnce(&mut Config) -> Result<(), ConfigError>,
    ) -> Result<Self, ConfigError> {
        Self::from_builder_in(f, Environment::from_process())
    }

    fn from_builder_in(
        f: impl FnOnce(&mut Config) -> Result<(), ConfigError>,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::with_environment(env);
        f(&mut config)?;
        Ok(config)
    }

    /// Creates a store that aliases `other`'s root and environment.
    pub fn from_existing(other: &Config) -> Self {
        Self {
            root: Arc::clone(&other.root),
            env: other.env.clone(),
        }
    }

    /// Creates a store that adopts `table` as its root.
    pub fn from_mapping(table: Table) -> Self {
        Self::from_mapping_in(table, Environment::from_process())
    }

    fn from_mapping_in(table: Table, env: Environment) -> Self {
        Self {
            root: Arc::new(RwLock::new(table)),
            env,
        }
    }

    /// Returns the value at `path`, or `None` if any segment is missing.
    pub fn get<'p>(&self, path: impl Into<PathSpec<'p>>) -> Option<Value> {
        self.lookup(&path.into().segments())
    }

    /// Returns the value at `path`, or `default` if nothing is stored there.
    pub fn get_or<'p>(
        &self,
        path: impl Into<PathSpec<'p>>,
        default: impl Into<Value>,
    ) -> Value {
        self.get(path).unwrap_or_else(|| default.into())
    }

    /// Returns the value at `path`, failing if nothing is stored there.
    pub fn get_required<'p>(&self, path: impl Into<PathSpec<'p>>) -> Result<Value, ConfigError> {
        let path = path.into();
        self.lookup(&path.segments())
            .ok_or_else(|| ConfigError::MissingRequiredValue(path.to_string()))
    }

    /// Like [`get_required`](Self::get_required), but with a default
    /// supplied. Never fails, even when the default itself is `None`.
    pub fn get_required_or<'p>(
        &self,
        path: impl Into<PathSpec<'p>>,
        default: Option<Value>,
    ) -> Option<Value> {
        self.get(path).or(default)
    }

    /// Deserializes the value at `path` into `T`.
    ///
    /// Returns `Ok(None)` when nothing is stored at `path`.
    pub fn get_as<'p, T: DeserializeOwned>(
        &self,
        path: impl Into<PathSpec<'p>>,
    ) -> Result<Option<T>, ConfigError> {
        let path = path.into();
        match self.lookup(&path.segments()) {
            None => Ok(None),
            Some(value) => value
                .try_into()
                .map(Some)
                .map_err(|source| ConfigError::Deserialize {
                    path: path.to_string(),
                    source,
                }),
        }
    }

    /// Deserializes the whole tree into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        Value::Table(self.to_object())
            .try_into()
            .map_err(|source| ConfigError::Deserialize {
                path: String::new(),
                source,
            })
    }

    /// Truthiness of the value at `path`.
    ///
    /// This is *not* a presence check: `false`, `0`, `0.0` and `""` count as
    /// absent even when stored. Use [`contains`](Self::contains) for that.
    pub fn has<'p>(&self, path: impl Into<PathSpec<'p>>) -> bool {
        tree::has(&self.read(), &path.into().segments())
    }

    /// Whether any value is stored at `path`.
    pub fn contains<'p>(&self, path: impl Into<PathSpec<'p>>) -> bool {
        tree::contains(&self.read(), &path.into().segments())
    }

    /// Whether the value at `path` equals `value`. No coercion happens, so an
    /// integer never equals a float.
    pub fn equals<'p>(&self, path: impl Into<PathSpec<'p>>, value: impl Into<Value>) -> bool {
        let value: Value = value.into();
        self.get(path) == Some(value)
    }

    /// Writes `value` at `path`, creating intermediate tables. Returns the
    /// written value.
    pub fn set<'p>(
        &mut self,
        path: impl Into<PathSpec<'p>>,
        value: impl Into<Value>,
    ) -> Result<Value, ConfigError> {
        self.store(&path.into().segments(), value.into())
    }

    /// Writes `value` at `path` only if nothing is stored there yet, and
    /// returns whatever is stored there afterwards.
    pub fn set_if_not_defined<'p>(
        &mut self,
        path: impl Into<PathSpec<'p>>,
        value: impl Into<Value>,
    ) -> Result<Value, ConfigError> {
        let segments = path.into().segments();
        match self.lookup(&segments) {
            Some(existing) => Ok(existing),
            None => self.store(&segments, value.into()),
        }
    }

    /// Replaces the value at `path` with `transform` applied to it.
    pub fn update<'p>(
        &mut self,
        path: impl Into<PathSpec<'p>>,
        transform: impl FnOnce(Option<Value>) -> Value,
    ) -> Result<Value, ConfigError> {
        let segments = path.into().segments();
        let updated = transform(self.lookup(&segments));
        self.store(&segments, updated)
    }

    /// Appends `value` to the array at `path`, creating it if needed.
    /// Returns the appended value.
    pub fn push<'p>(
        &mut self,
        path: impl Into<PathSpec<'p>>,
        value: impl Into<Value>,
    ) -> Result<Value, ConfigError> {
        let segments = path.into().segments();
        let appended = tree::push(&mut self.write(), &segments, value.into())?.clone();
        trace!(path = %tree::dotted(&segments), "appended config value");
        Ok(appended)
    }

    /// Shallow-merges `other` into the top level of the tree.
    pub fn assign<'a>(&mut self, other: impl Into<AssignSource<'a>>) -> Result<(), ConfigError> {
        let overlay = other.into().into_table()?;
        self.merge_top_level(overlay);
        Ok(())
    }

    /// Shallow-merges `other` into the table at `path`, creating it if
    /// needed, and then into the top level as well.
    ///
    /// A non-table value already stored at `path` is replaced by `other`.
    pub fn assign_at<'a, 'p>(
        &mut self,
        other: impl Into<AssignSource<'a>>,
        path: impl Into<PathSpec<'p>>,
    ) -> Result<(), ConfigError> {
        let overlay = other.into().into_table()?;
        let segments = path.into().segments();

        let mut scoped = match self.set_if_not_defined(&segments[..], Table::new())? {
            Value::Table(table) => table,
            found => {
                debug!(
                    path = %tree::dotted(&segments),
                    found = found.type_str(),
                    "replacing non-table value with assigned table"
                );
                Table::new()
            }
        };
        tree::merge_shallow(&mut scoped, &overlay);
        self.store(&segments, Value::Table(scoped))?;

        self.merge_top_level(overlay);
        Ok(())
    }

    /// Installs `table` as this store's root. Stores aliasing the old root
    /// keep it.
    pub fn replace(&mut self, table: Table) {
        self.root = Arc::new(RwLock::new(table));
    }

    /// Returns a copy of the root table.
    pub fn to_object(&self) -> Table {
        self.read().clone()
    }

    /// The environment name: `ENV`, then `NODE_ENV`, then `"dev"`.
    pub fn env(&self) -> &str {
        self.env.name()
    }

    /// Whether [`env`](Self::env) is `name`.
    pub fn is(&self, name: &str) -> bool {
        self.env.is(name)
    }

    /// The environment snapshot this store was created with.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Whether both stores currently share the same root.
    pub fn shares_root_with(&self, other: &Config) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    fn lookup(&self, segments: &[String]) -> Option<Value> {
        tree::get(&self.read(), segments).cloned()
    }

    fn store(&mut self, segments: &[String], value: Value) -> Result<Value, ConfigError> {
        let written = tree::set(&mut self.write(), segments, value)?.clone();
        trace!(path = %tree::dotted(segments), "set config value");
        Ok(written)
    }

    fn merge_top_level(&mut self, overlay: Table) {
        let mut root = self.to_object();
        tree::merge_shallow(&mut root, &overlay);
        debug!(keys = overlay.len(), "merged table into config root");
        self.replace(root);
    }

    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.root.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&mut self) -> RwLockWriteGuard<'_, Table> {
        self.root.write().unwrap_or_else(PoisonError::into_inner)
    }
}
