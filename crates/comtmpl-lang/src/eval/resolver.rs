//! Dot-path traversal over [`Value`]s.
//!
//! A path that runs into missing data resolves to `Null`; a path that runs
//! into data it cannot read or descend into is an [`AccessError`].

use smallvec::SmallVec;
use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};

use super::error::AccessError;
use crate::value::{NULL, Value};

/// A non-empty sequence of field names, e.g. `.User.Name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(SmallVec<[SmolStr; 4]>);

impl FieldPath {
    /// Returns `None` when `segments` is empty.
    pub fn new<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let segments: SmallVec<[SmolStr; 4]> = segments.into_iter().map(Into::into).collect();
        (!segments.is_empty()).then_some(Self(segments))
    }

    /// Parses `.A.B` (the leading dot is optional).
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.strip_prefix('.').unwrap_or(path);
        if path.is_empty() || path.split('.').any(str::is_empty) {
            return None;
        }
        Self::new(path.split('.'))
    }

    pub fn segments(&self) -> &[SmolStr] {
        &self.0
    }

    #[inline(always)]
    pub fn resolve<'a>(&self, root: &'a Value) -> Result<&'a Value, AccessError> {
        resolve(root, &self.0)
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|segment| write!(f, ".{}", segment))
    }
}

/// Resolves `path` against `root`, borrowing the result from `root`.
pub fn resolve<'a, S: AsRef<str>>(root: &'a Value, path: &[S]) -> Result<&'a Value, AccessError> {
    let mut current = root;

    for segment in path {
        let segment = segment.as_ref();
        current = match current {
            Value::Null => return Ok(&NULL),
            Value::Map(map) => match map.get(segment) {
                Some(value) => value,
                None => return Ok(&NULL),
            },
            Value::Record(record) => match record.get(segment) {
                Some(field) if field.is_readable() => &field.value,
                Some(_) => {
                    return Err(AccessError::Unreadable {
                        record: record.name.clone(),
                        field: segment.into(),
                    });
                }
                None => return Ok(&NULL),
            },
            Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::List(_) => {
                return Err(AccessError::NotTraversable {
                    field: segment.into(),
                    kind: current.kind(),
                });
            }
        };
    }

    Ok(current)
}
