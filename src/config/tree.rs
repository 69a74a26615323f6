//! Path-based access to a `toml::Table` tree.
//!
//! Reads never fail: a missing segment or a scalar in the middle of a path
//! simply yields `None`. Writes create missing intermediates as tables and
//! fail when they would have to walk through a scalar.

use toml::map::Entry;
use toml::{Table, Value};

use super::ConfigError;

enum Parent<'a> {
    Table(&'a mut Table),
    Array(&'a mut Vec<Value>),
}

/// Looks up the value at `segments`.
///
/// Numeric segments index into arrays; on tables they are ordinary keys.
pub fn get<'a>(root: &'a Table, segments: &[String]) -> Option<&'a Value> {
    let (first, rest) = segments.split_first()?;
    let mut current = root.get(first)?;
    for segment in rest {
        current = match current {
            Value::Table(table) => table.get(segment)?,
            Value::Array(array) => array.get(index(segment)?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `segments`, creating intermediate tables as needed.
///
/// Existing intermediates are reused in place. Walking through a scalar is an
/// error rather than an overwrite, and arrays only grow by one slot at a time.
pub fn set<'a>(
    root: &'a mut Table,
    segments: &[String],
    value: Value,
) -> Result<&'a mut Value, ConfigError> {
    let (parent, last) = parent_mut(root, segments)?;
    let slot = entry(parent, last, segments, || Value::Table(Table::new()))?;
    *slot = value;
    Ok(slot)
}

/// Appends `value` to the array at `segments`, creating the array if nothing
/// is there yet. Returns the appended element.
pub fn push<'a>(
    root: &'a mut Table,
    segments: &[String],
    value: Value,
) -> Result<&'a mut Value, ConfigError> {
    let (parent, last) = parent_mut(root, segments)?;
    match entry(parent, last, segments, || Value::Array(Vec::new()))? {
        Value::Array(items) => {
            let at = items.len();
            items.push(value);
            Ok(&mut items[at])
        }
        other => Err(ConfigError::NotAppendable {
            path: dotted(segments),
            found: other.type_str(),
        }),
    }
}

/// Truthiness of the value at `segments`.
///
/// Defined-but-falsy values (`false`, `0`, `0.0`, `""`) count as absent here.
/// Use [`contains`] to ask whether anything is stored at all.
pub fn has(root: &Table, segments: &[String]) -> bool {
    get(root, segments).is_some_and(is_truthy)
}

/// Whether any value is stored at `segments`.
pub fn contains(root: &Table, segments: &[String]) -> bool {
    get(root, segments).is_some()
}

/// Truthiness of a single value: `false`, `0`, `0.0`, `NaN` and `""` are
/// falsy, everything else (including empty tables and arrays) is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0 && !f.is_nan(),
        Value::String(s) => !s.is_empty(),
        Value::Datetime(_) | Value::Array(_) | Value::Table(_) => true,
    }
}

/// Copies every top-level key of `overlay` into `base`, replacing existing
/// values wholesale. Nested tables are not merged.
pub fn merge_shallow(base: &mut Table, overlay: &Table) {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
}

pub(crate) fn dotted(segments: &[String]) -> String {
    segments.join(".")
}

fn index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn parent_mut<'a, 's>(
    root: &'a mut Table,
    segments: &'s [String],
) -> Result<(Parent<'a>, &'s str), ConfigError> {
    let (last, parents) = match segments.split_last() {
        Some((last, parents)) => (last.as_str(), parents),
        None => ("", segments),
    };

    let mut parent = Parent::Table(root);
    for segment in parents {
        parent = match entry(parent, segment, segments, || Value::Table(Table::new()))? {
            Value::Table(table) => Parent::Table(table),
            Value::Array(array) => Parent::Array(array),
            other => {
                return Err(ConfigError::NotTraversable {
                    path: dotted(segments),
                    segment: segment.clone(),
                    found: other.type_str(),
                })
            }
        };
    }

    Ok((parent, last))
}

/// Returns the slot for `segment` under `parent`, filling a vacant slot with
/// `vacant()`.
fn entry<'a>(
    parent: Parent<'a>,
    segment: &str,
    path: &[String],
    vacant: impl FnOnce() -> Value,
) -> Result<&'a mut Value, ConfigError> {
    match parent {
        Parent::Table(table) => Ok(match table.entry(segment) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(slot) => slot.insert(vacant()),
        }),
        Parent::Array(array) => {
            let len = array.len();
            match index(segment) {
                Some(i) if i < len => Ok(&mut array[i]),
                Some(i) if i == len => {
                    array.push(vacant());
                    Ok(&mut array[i])
                }
                Some(i) => Err(ConfigError::IndexOutOfBounds {
                    path: dotted(path),
                    index: i,
                    len,
                }),
                None => Err(ConfigError::NotTraversable {
                    path: dotted(path),
                    segment: segment.to_owned(),
                    found: "array",
                }),
            }
        }
    }
}
