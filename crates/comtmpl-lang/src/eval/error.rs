use smol_str::SmolStr;
use thiserror::Error;

use crate::value::Kind;

type FunctionName = SmolStr;
type FieldName = SmolStr;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("Cannot access unexported field \"{field}\" of \"{record}\"")]
    Unreadable { record: SmolStr, field: FieldName },
    #[error("Cannot access \"{field}\" in {kind} value")]
    NotTraversable { field: FieldName, kind: Kind },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    #[error("\"{0}\" is not defined")]
    NotFound(FunctionName),
    #[error("\"{0}\" is already defined")]
    AlreadyDefined(FunctionName),
    #[error("Invalid number of arguments in \"{name}\", expected {}{expected}, got {got}", at_least(.variadic))]
    ArityMismatch {
        name: FunctionName,
        expected: usize,
        got: usize,
        variadic: bool,
    },
    #[error("Invalid type for argument {index} of \"{name}\", expected {expected}, got {found}")]
    TypeMismatch {
        name: FunctionName,
        index: usize,
        expected: SmolStr,
        found: Kind,
    },
    #[error("\"{name}\" does not support {kind} values")]
    Unsupported { name: FunctionName, kind: Kind },
    #[error("\"{name}\" failed: {message}")]
    Failed { name: FunctionName, message: String },
}

fn at_least(variadic: &bool) -> &'static str {
    if *variadic { "at least " } else { "" }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Template \"{0}\" not found")]
    NotFound(SmolStr),
}

/// Everything that can stop a render call.
///
/// A failed render may already have written a prefix of its output to the
/// sink.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("Failed to write output: {0}")]
    Write(#[from] std::io::Error),
}

impl RenderError {
    pub fn as_access(&self) -> Option<&AccessError> {
        match self {
            RenderError::Access(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_dispatch(&self) -> Option<&DispatchError> {
        match self {
            RenderError::Dispatch(e) => Some(e),
            _ => None,
        }
    }
}
