//! Compiles parsed templates into render routines.
//!
//! Every node is first lowered into a [`Unit`](lower::Unit): literal text or
//! an output pipeline that only uses supported constructs. Anything else is
//! rejected with [`CompileError::Unsupported`] instead of being dropped.
//!
//! Units are then turned into closures by [`Compiler`], or into Rust source
//! by [`crate::codegen::Generator`].

mod compile;
pub(crate) mod compiled;
pub mod error;
pub(crate) mod lower;

pub use compile::Compiler;
pub use compiled::{CompiledTemplate, Routine};
pub use error::CompileError;
