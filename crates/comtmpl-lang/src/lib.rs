//! `comtmpl-lang` compiles Go-style text templates into render routines.
//!
//! Templates are parsed once, lowered into field reads and function pipelines,
//! and turned either into in-process routines or into Rust source.
//!
//! ## Examples
//!
//! ```rust
//! use comtmpl_lang::{Engine, Value};
//!
//! let engine = Engine::default();
//! let templates = engine
//!     .compile_all([("hello", "Hello {{.Name | upper}}!")])
//!     .unwrap();
//! let data = Value::from_iter([("Name", "world")]);
//!
//! assert_eq!(templates.render_to_string("hello", &data).unwrap(), "Hello WORLD!");
//!
//! // Emit Rust source for ahead-of-time use
//! let source = engine.generate([("hello", "Hello {{.Name}}!")], None).unwrap();
//! assert!(source.contains("pub fn render_hello("));
//! ```
mod ast;
mod codegen;
mod compiler;
mod engine;
mod error;
mod eval;
mod line_index;
mod number;
mod template;
mod value;

pub use ast::Nodes;
pub use ast::error::ParseError;
pub use ast::node::{Arg as AstArg, Command as AstCommand, Keyword, Node as AstNode, Offset, Pipe as AstPipe};
pub use ast::parser::Options as ParseOptions;
pub use ast::parser::Parser as AstParser;
pub use codegen::Generator;
pub use compiler::{CompileError, CompiledTemplate, Compiler, Routine};
pub use engine::{Engine, Options};
pub use error::{Error, InnerError};
pub use eval::builtin::{BUILTIN_FUNCTIONS, BuiltinFunction, MAX_REPEAT_LEN};
pub use eval::error::{AccessError, DispatchError, RegistryError, RenderError};
pub use eval::eval_field;
pub use eval::function::{
    Callable, DispatchOptions, FallibleFn, FunctionEntry, FunctionResult, Functions, NativeFn, ParamType,
};
pub use eval::resolver::{FieldPath, resolve};
pub use line_index::LineIndex;
pub use number::Number;
pub use template::Templates;
pub use value::{Field, Kind, Record, Value, Visibility};

/// Parses `source` with the default `{{`/`}}` delimiters.
#[allow(clippy::result_large_err)]
pub fn parse(name: &str, source: &str) -> Result<Nodes, Error> {
    AstParser::default()
        .parse(source)
        .map_err(|e| Error::from_error(name, source, InnerError::Parse(e)))
}
