//! Path-addressed configuration storage.

mod env;
mod error;
mod file;
pub mod path;
mod store;
pub mod tree;

pub use env::{Environment, DEFAULT_ENV};
pub use error::ConfigError;
pub use file::load_table;
pub use path::PathSpec;
pub use store::{AssignSource, BuildFn, Config, Init};
