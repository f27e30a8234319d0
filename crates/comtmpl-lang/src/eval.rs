// Runtime support shared by compiled and generated render routines:
// dot-path field resolution and name-based function dispatch.
pub mod builtin;
pub mod error;
pub mod function;
pub mod resolver;

use crate::value::Value;
use error::AccessError;

/// Resolves `path` against `data`.
///
/// This is the entry point generated render routines call for every field
/// action.
#[inline(always)]
pub fn eval_field<'a>(data: &'a Value, path: &[&str]) -> Result<&'a Value, AccessError> {
    resolver::resolve(data, path)
}
