//! Compiled template types.

use smol_str::SmolStr;
use std::fmt;
use std::io::Write;

use crate::eval::error::RenderError;
use crate::eval::function::Functions;
use crate::value::Value;

/// A render routine as emitted by the Rust source generator.
pub type Routine = fn(&Functions, &mut dyn Write, &Value) -> Result<(), RenderError>;

/// One compiled unit: writes a text span or the result of a pipeline.
pub type CompiledStep = Box<dyn Fn(&Functions, &mut dyn Write, &Value) -> Result<(), RenderError> + Send + Sync>;

pub(crate) struct TracedStep {
    pub line: usize,
    pub step: CompiledStep,
}

enum Body {
    Steps(Vec<TracedStep>),
    Routine(Routine),
}

/// A named render routine.
///
/// Rendering writes to the sink and reads the data; nothing else is touched.
pub struct CompiledTemplate {
    name: SmolStr,
    body: Body,
}

impl CompiledTemplate {
    pub(crate) fn from_steps(name: SmolStr, steps: Vec<TracedStep>) -> Self {
        Self {
            name,
            body: Body::Steps(steps),
        }
    }

    pub fn from_routine(name: impl Into<SmolStr>, routine: Routine) -> Self {
        Self {
            name: name.into(),
            body: Body::Routine(routine),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render(&self, functions: &Functions, writer: &mut dyn Write, data: &Value) -> Result<(), RenderError> {
        match &self.body {
            Body::Routine(routine) => routine(functions, writer, data),
            Body::Steps(steps) => steps.iter().try_for_each(|TracedStep { line, step }| {
                step(functions, writer, data).inspect_err(|e| log::debug!("{}:{}: {}", self.name, line, e))
            }),
        }
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = match &self.body {
            Body::Steps(steps) => format!("{} steps", steps.len()),
            Body::Routine(_) => "routine".to_string(),
        };
        f.debug_struct("CompiledTemplate")
            .field("name", &self.name)
            .field("body", &body)
            .finish()
    }
}
