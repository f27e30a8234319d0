use thiserror::Error;

use super::node::Offset;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unclosed action")]
    UnclosedAction { offset: Offset },
    #[error("Unclosed comment")]
    UnclosedComment { offset: Offset },
    #[error("Missing value for command")]
    EmptyCommand { offset: Offset },
    #[error("Unexpected `{found}` in action")]
    UnexpectedInput { offset: Offset, found: String },
}

impl ParseError {
    pub fn offset(&self) -> Offset {
        match self {
            ParseError::UnclosedAction { offset }
            | ParseError::UnclosedComment { offset }
            | ParseError::EmptyCommand { offset }
            | ParseError::UnexpectedInput { offset, .. } => *offset,
        }
    }
}
