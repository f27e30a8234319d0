use smol_str::SmolStr;
use thiserror::Error;

use crate::ast::node::Offset;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Unsupported {kind} in template \"{template}\"")]
    Unsupported {
        kind: SmolStr,
        template: SmolStr,
        offset: Offset,
    },
    #[error("Invalid module name \"{0}\"")]
    InvalidModuleName(SmolStr),
}

impl CompileError {
    pub fn offset(&self) -> Offset {
        match self {
            CompileError::Unsupported { offset, .. } => *offset,
            CompileError::InvalidModuleName(_) => 0,
        }
    }

    /// The name of the rejected construct, e.g. `if` or `variable`.
    pub fn kind(&self) -> &str {
        match self {
            CompileError::Unsupported { kind, .. } => kind,
            CompileError::InvalidModuleName(_) => "module name",
        }
    }
}
