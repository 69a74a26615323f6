//! Environment name selection.

/// Name used when neither `ENV` nor `NODE_ENV` is set.
pub const DEFAULT_ENV: &str = "dev";

/// A snapshot of the variables that decide the environment name.
///
/// Stores carry one of these instead of consulting the process environment on
/// every call, so the name is fixed for the lifetime of the store and tests
/// can inject their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    env: Option<String>,
    node_env: Option<String>,
}

impl Environment {
    /// Captures `ENV` and `NODE_ENV` from the current process.
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Builds a snapshot from explicit `(name, value)` pairs. Pairs other than
    /// `ENV` and `NODE_ENV` are ignored.
    pub fn from_vars<K, V>(vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut snapshot = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                "ENV" => snapshot.env = Some(value.into()),
                "NODE_ENV" => snapshot.node_env = Some(value.into()),
                _ => {}
            }
        }
        snapshot
    }

    /// Snapshot that always names `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            env: Some(name.into()),
            node_env: None,
        }
    }

    /// The environment name: `ENV`, then `NODE_ENV`, then `"dev"`.
    pub fn name(&self) -> &str {
        self.env
            .as_deref()
            .or(self.node_env.as_deref())
            .unwrap_or(DEFAULT_ENV)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name() == name
    }
}
