//! Path specifications and their normalization into traversal segments.
//!
//! A path is either a single dotted string (`"server.ssl.on"`) or an ordered
//! collection of fragments (`["server", "ssl.on"]`). Fragments are joined
//! with `.` before splitting, so both forms above resolve to the same
//! segments.

use std::borrow::Cow;
use std::fmt;

/// A path into a configuration tree, before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSpec<'a> {
    Dotted(Cow<'a, str>),
    Fragments(Vec<Cow<'a, str>>),
}

impl PathSpec<'_> {
    /// Splits the path into its segments.
    ///
    /// No validation happens here: empty segments are kept, and numeric
    /// segments stay strings until the tree decides how to use them.
    pub fn segments(&self) -> Vec<String> {
        split(&self.dotted())
    }

    /// The joined, dot-delimited form of the path.
    pub fn dotted(&self) -> Cow<'_, str> {
        match self {
            PathSpec::Dotted(s) => Cow::Borrowed(s.as_ref()),
            PathSpec::Fragments(parts) => Cow::Owned(parts.join(".")),
        }
    }
}

impl fmt::Display for PathSpec<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

/// Normalizes a path specification into its ordered segments.
pub fn resolve<'a>(path: impl Into<PathSpec<'a>>) -> Vec<String> {
    path.into().segments()
}

/// Composes a prefix path and a suffix path into one.
///
/// ```
/// use nested_config::config::path::{join, resolve};
///
/// assert_eq!(resolve(join("server", "ssl.on")), ["server", "ssl", "on"]);
/// ```
pub fn join<'a, 'b>(
    prefix: impl Into<PathSpec<'a>>,
    suffix: impl Into<PathSpec<'b>>,
) -> PathSpec<'static> {
    let prefix = prefix.into();
    let suffix = suffix.into();
    PathSpec::Fragments(vec![
        Cow::Owned(prefix.dotted().into_owned()),
        Cow::Owned(suffix.dotted().into_owned()),
    ])
}

fn split(path: &str) -> Vec<String> {
    path.split('.').map(str::to_owned).collect()
}

impl<'a> From<&'a str> for PathSpec<'a> {
    fn from(path: &'a str) -> Self {
        PathSpec::Dotted(Cow::Borrowed(path))
    }
}

impl<'a> From<&'a String> for PathSpec<'a> {
    fn from(path: &'a String) -> Self {
        PathSpec::Dotted(Cow::Borrowed(path.as_str()))
    }
}

impl From<String> for PathSpec<'static> {
    fn from(path: String) -> Self {
        PathSpec::Dotted(Cow::Owned(path))
    }
}

impl<'a, S: AsRef<str>> From<&'a [S]> for PathSpec<'a> {
    fn from(parts: &'a [S]) -> Self {
        PathSpec::Fragments(parts.iter().map(|p| Cow::Borrowed(p.as_ref())).collect())
    }
}

impl<'a, S: AsRef<str>, const N: usize> From<&'a [S; N]> for PathSpec<'a> {
    fn from(parts: &'a [S; N]) -> Self {
        PathSpec::from(&parts[..])
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for PathSpec<'static> {
    fn from(parts: [S; N]) -> Self {
        PathSpec::Fragments(
            parts
                .iter()
                .map(|p| Cow::Owned(p.as_ref().to_owned()))
                .collect(),
        )
    }
}

impl<S: AsRef<str>> From<Vec<S>> for PathSpec<'static> {
    fn from(parts: Vec<S>) -> Self {
        PathSpec::Fragments(
            parts
                .iter()
                .map(|p| Cow::Owned(p.as_ref().to_owned()))
                .collect(),
        )
    }
}
