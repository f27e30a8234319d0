use smol_str::SmolStr;

use super::error::CompileError;
use crate::ast::node::{Arg, Command, Node, Offset, Pipe};
use crate::eval::error::RenderError;
use crate::eval::function::Functions;
use crate::eval::resolver::FieldPath;
use crate::line_index::LineIndex;
use crate::value::Value;

/// A value known at compile time or read from the data.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Field(FieldPath),
    Dot,
    Literal(Value),
}

/// Where a pipeline gets its first value from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Source {
    Operand(Operand),
    Call { name: SmolStr, args: Vec<Operand> },
}

/// A function call receiving the previous result as its first argument.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Stage {
    pub name: SmolStr,
    pub args: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Pipeline {
    pub source: Source,
    pub stages: Vec<Stage>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UnitKind {
    Text(String),
    Output(Pipeline),
}

/// One step of a render routine with the source line it came from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Unit {
    pub line: usize,
    pub kind: UnitKind,
}

pub(crate) fn lower(template: &str, nodes: &[Node], lines: &LineIndex) -> Result<Vec<Unit>, CompileError> {
    let lowerer = Lowerer { template };

    nodes
        .iter()
        .filter_map(|node| {
            lowerer
                .lower_node(node)
                .map(|kind| {
                    kind.map(|kind| Unit {
                        line: lines.line_number_at(node.pos()),
                        kind,
                    })
                })
                .transpose()
        })
        .collect()
}

struct Lowerer<'a> {
    template: &'a str,
}

impl Lowerer<'_> {
    fn unsupported(&self, kind: impl Into<SmolStr>, offset: Offset) -> CompileError {
        CompileError::Unsupported {
            kind: kind.into(),
            template: self.template.into(),
            offset,
        }
    }

    fn lower_node(&self, node: &Node) -> Result<Option<UnitKind>, CompileError> {
        match node {
            Node::Text { text, .. } => Ok(Some(UnitKind::Text(text.clone()))),
            Node::Comment { .. } => Ok(None),
            Node::Control { pos, keyword } => Err(self.unsupported(keyword.as_str(), *pos)),
            Node::Action { pipe, .. } => self.lower_pipe(pipe).map(|pipeline| Some(UnitKind::Output(pipeline))),
        }
    }

    fn lower_pipe(&self, pipe: &Pipe) -> Result<Pipeline, CompileError> {
        if !pipe.decls.is_empty() {
            return Err(self.unsupported("variable declaration", pipe.pos));
        }

        let (first, rest) = pipe
            .cmds
            .split_first()
            .ok_or_else(|| self.unsupported("empty pipeline", pipe.pos))?;

        Ok(Pipeline {
            source: self.lower_source(first)?,
            stages: rest.iter().map(|cmd| self.lower_stage(cmd)).collect::<Result<_, _>>()?,
        })
    }

    fn lower_source(&self, cmd: &Command) -> Result<Source, CompileError> {
        match cmd.args.as_slice() {
            [] => Err(self.unsupported("empty command", cmd.pos)),
            [Arg::Ident(name), args @ ..] => Ok(Source::Call {
                name: name.clone(),
                args: self.lower_args(args, cmd.pos)?,
            }),
            [Arg::Field(_), _, ..] => Err(self.unsupported("method call", cmd.pos)),
            [arg] => self.lower_operand(arg, cmd.pos).map(Source::Operand),
            [arg, _, ..] => match arg {
                Arg::Dot | Arg::Bool(_) | Arg::Number(_) | Arg::String(_) | Arg::Nil => {
                    Err(self.unsupported("arguments to non-function", cmd.pos))
                }
                arg => Err(self.unsupported(arg.kind(), cmd.pos)),
            },
        }
    }

    fn lower_stage(&self, cmd: &Command) -> Result<Stage, CompileError> {
        match cmd.args.as_slice() {
            [] => Err(self.unsupported("empty command", cmd.pos)),
            [Arg::Ident(name), args @ ..] => Ok(Stage {
                name: name.clone(),
                args: self.lower_args(args, cmd.pos)?,
            }),
            [arg @ (Arg::Variable(_) | Arg::Pipe(_)), ..] => Err(self.unsupported(arg.kind(), cmd.pos)),
            [arg, ..] => Err(self.unsupported(format!("{} in non-initial pipe stage", arg.kind()), cmd.pos)),
        }
    }

    fn lower_args(&self, args: &[Arg], pos: Offset) -> Result<Vec<Operand>, CompileError> {
        args.iter().map(|arg| self.lower_operand(arg, pos)).collect()
    }

    fn lower_operand(&self, arg: &Arg, pos: Offset) -> Result<Operand, CompileError> {
        match arg {
            Arg::Field(path) => Ok(Operand::Field(path.clone())),
            Arg::Dot => Ok(Operand::Dot),
            Arg::Bool(b) => Ok(Operand::Literal(Value::Bool(*b))),
            Arg::Number(n) => Ok(Operand::Literal(Value::Number(*n))),
            Arg::String(s) => Ok(Operand::Literal(Value::String(s.clone()))),
            Arg::Nil => Ok(Operand::Literal(Value::Null)),
            Arg::Ident(_) => Err(self.unsupported("nested function call", pos)),
            Arg::Variable(_) | Arg::Pipe(_) => Err(self.unsupported(arg.kind(), pos)),
        }
    }
}

impl Operand {
    #[inline(always)]
    pub(crate) fn eval<'a>(&'a self, data: &'a Value) -> Result<&'a Value, RenderError> {
        match self {
            Operand::Field(path) => Ok(path.resolve(data)?),
            Operand::Dot => Ok(data),
            Operand::Literal(value) => Ok(value),
        }
    }
}

impl Pipeline {
    /// Runs the pipeline against `data` and writes nothing.
    pub(crate) fn eval(&self, functions: &Functions, data: &Value) -> Result<Value, RenderError> {
        let mut current = match &self.source {
            Source::Operand(operand) => operand.eval(data)?.clone(),
            Source::Call { name, args } => functions.call(name, eval_args(None, args, data)?)?,
        };

        for stage in &self.stages {
            current = functions.call(&stage.name, eval_args(Some(current), &stage.args, data)?)?;
        }

        Ok(current)
    }

    /// A single field or the dot, written without going through a function.
    pub(crate) fn as_operand(&self) -> Option<&Operand> {
        match (&self.source, self.stages.is_empty()) {
            (Source::Operand(operand), true) => Some(operand),
            _ => None,
        }
    }
}

fn eval_args(first: Option<Value>, args: &[Operand], data: &Value) -> Result<Vec<Value>, RenderError> {
    let mut values = Vec::with_capacity(args.len() + 1);
    values.extend(first);
    for arg in args {
        values.push(arg.eval(data)?.clone());
    }
    Ok(values)
}
