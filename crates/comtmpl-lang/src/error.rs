use miette::{Diagnostic, SourceOffset, SourceSpan};
use smol_str::SmolStr;

use crate::{ast::error::ParseError, compiler::CompileError};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InnerError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// A parse or compile failure, with the template source for diagnostics.
#[derive(PartialEq, Debug, thiserror::Error)]
#[error("{cause}")]
pub struct Error {
    pub cause: InnerError,
    /// Name of the template the error was raised for.
    pub template: SmolStr,
    pub source_code: String,
    pub location: SourceSpan,
}

impl Error {
    pub fn from_error(template: &str, source_code: impl Into<String>, cause: InnerError) -> Self {
        let source_code = source_code.into();
        let offset = match &cause {
            InnerError::Parse(err) => err.offset(),
            InnerError::Compile(err) => err.offset(),
        }
        .min(source_code.len());
        let length = if offset < source_code.len() { 1 } else { 0 };

        Self {
            cause,
            template: SmolStr::new(template),
            location: SourceSpan::new(SourceOffset::from(offset), length),
            source_code,
        }
    }

    /// 1-based line of the error location.
    pub fn line(&self) -> usize {
        crate::LineIndex::new(&self.source_code).line_number_at(self.location.offset())
    }
}

impl Diagnostic for Error {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let c = match &self.cause {
            InnerError::Parse(ParseError::UnclosedAction { .. }) => "ParseError::UnclosedAction",
            InnerError::Parse(ParseError::UnclosedComment { .. }) => "ParseError::UnclosedComment",
            InnerError::Parse(ParseError::EmptyCommand { .. }) => "ParseError::EmptyCommand",
            InnerError::Parse(ParseError::UnexpectedInput { .. }) => "ParseError::UnexpectedInput",
            InnerError::Compile(CompileError::Unsupported { .. }) => "CompileError::Unsupported",
            InnerError::Compile(CompileError::InvalidModuleName(_)) => "CompileError::InvalidModuleName",
        };

        Some(Box::new(c))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        let msg = match &self.cause {
            InnerError::Parse(ParseError::UnclosedAction { .. }) => {
                "Close the action with the right delimiter, e.g. `}}`.".to_string()
            }
            InnerError::Parse(ParseError::UnclosedComment { .. }) => {
                "Comments must end with `*/` right before the closing delimiter.".to_string()
            }
            InnerError::Parse(ParseError::EmptyCommand { .. }) => {
                "Every command of a pipeline needs a field, a literal or a function name.".to_string()
            }
            InnerError::Parse(ParseError::UnexpectedInput { .. }) => {
                "Check for misplaced characters inside the action.".to_string()
            }
            InnerError::Compile(CompileError::Unsupported { kind, .. }) => format!(
                "`{}` cannot be compiled. Only text, fields and function pipelines are supported.",
                kind
            ),
            InnerError::Compile(CompileError::InvalidModuleName(_)) => {
                "Module names must be Rust identifiers that are not keywords, e.g. `views`.".to_string()
            }
        };

        Some(Box::new(msg))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = miette::LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(miette::LabeledSpan::new_with_span(
            Some(format!("{}", self.cause)),
            self.location,
        ))))
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.source_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::parse(
        InnerError::Parse(ParseError::EmptyCommand { offset: 6 }),
        "a\nb {{ }}",
        6,
        2,
        "ParseError::EmptyCommand"
    )]
    #[case::compile(
        InnerError::Compile(CompileError::Unsupported { kind: "if".into(), template: "t".into(), offset: 0 }),
        "{{if .X}}",
        0,
        1,
        "CompileError::Unsupported"
    )]
    #[case::eof(
        InnerError::Parse(ParseError::UnclosedAction { offset: 100 }),
        "{{.A",
        4,
        1,
        "ParseError::UnclosedAction"
    )]
    fn test_from_error(
        #[case] cause: InnerError,
        #[case] source: &str,
        #[case] expected_offset: usize,
        #[case] expected_line: usize,
        #[case] expected_code: &str,
    ) {
        let error = Error::from_error("t", source, cause);

        assert_eq!(error.location.offset(), expected_offset);
        assert_eq!(error.line(), expected_line);
        assert_eq!(error.code().unwrap().to_string(), expected_code);
        assert!(error.help().is_some());
        assert_eq!(error.labels().unwrap().count(), 1);
    }
}
