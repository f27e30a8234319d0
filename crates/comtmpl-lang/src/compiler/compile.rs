//! Turns lowered units into closures.

use smol_str::SmolStr;

use super::compiled::{CompiledStep, CompiledTemplate, TracedStep};
use super::error::CompileError;
use super::lower::{self, Unit, UnitKind};
use crate::ast::node::Node;
use crate::line_index::LineIndex;

/// Compiler for a single template.
#[derive(Debug, Clone)]
pub struct Compiler<'a> {
    name: SmolStr,
    lines: &'a LineIndex,
}

impl<'a> Compiler<'a> {
    /// `lines` must index the source `nodes` were parsed from.
    pub fn new(name: &str, lines: &'a LineIndex) -> Self {
        Self {
            name: SmolStr::new(name),
            lines,
        }
    }

    pub fn compile(&self, nodes: &[Node]) -> Result<CompiledTemplate, CompileError> {
        let steps = lower::lower(&self.name, nodes, self.lines)?
            .into_iter()
            .map(|unit| self.compile_unit(unit))
            .collect::<Vec<_>>();

        log::debug!("compiled template \"{}\" into {} steps", self.name, steps.len());
        Ok(CompiledTemplate::from_steps(self.name.clone(), steps))
    }

    fn compile_unit(&self, unit: Unit) -> TracedStep {
        let step: CompiledStep = match unit.kind {
            UnitKind::Text(text) => Box::new(move |_, writer, _| Ok(writer.write_all(text.as_bytes())?)),
            UnitKind::Output(pipeline) => match pipeline.as_operand().cloned() {
                Some(operand) => Box::new(move |_, writer, data| Ok(write!(writer, "{}", operand.eval(data)?)?)),
                None => Box::new(move |functions, writer, data| {
                    Ok(write!(writer, "{}", pipeline.eval(functions, data)?)?)
                }),
            },
        };

        TracedStep { line: unit.line, step }
    }
}
