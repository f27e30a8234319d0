use smol_str::SmolStr;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::eval::resolver::FieldPath;
use crate::number::Number;

/// Byte offset into the template source.
pub type Offset = usize;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text { pos: Offset, text: String },
    Action { pos: Offset, pipe: Pipe },
    Comment { pos: Offset },
    Control { pos: Offset, keyword: Keyword },
}

impl Node {
    pub fn pos(&self) -> Offset {
        match self {
            Node::Text { pos, .. }
            | Node::Action { pos, .. }
            | Node::Comment { pos }
            | Node::Control { pos, .. } => *pos,
        }
    }
}

/// Keywords that open or close a control structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    If,
    Range,
    With,
    Template,
    Block,
    Define,
    Else,
    End,
    Break,
    Continue,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Keyword::If => "if",
            Keyword::Range => "range",
            Keyword::With => "with",
            Keyword::Template => "template",
            Keyword::Block => "block",
            Keyword::Define => "define",
            Keyword::Else => "else",
            Keyword::End => "end",
            Keyword::Break => "break",
            Keyword::Continue => "continue",
        }
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "if" => Ok(Keyword::If),
            "range" => Ok(Keyword::Range),
            "with" => Ok(Keyword::With),
            "template" => Ok(Keyword::Template),
            "block" => Ok(Keyword::Block),
            "define" => Ok(Keyword::Define),
            "else" => Ok(Keyword::Else),
            "end" => Ok(Keyword::End),
            "break" => Ok(Keyword::Break),
            "continue" => Ok(Keyword::Continue),
            _ => Err(()),
        }
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `[$x :=] command (| command)*`
#[derive(Debug, Clone, PartialEq)]
pub struct Pipe {
    pub pos: Offset,
    pub decls: Vec<SmolStr>,
    pub cmds: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub pos: Offset,
    pub args: Vec<Arg>,
}

/// A single operand of a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Field(FieldPath),
    Dot,
    Ident(SmolStr),
    Bool(bool),
    Number(Number),
    String(String),
    Nil,
    Variable(SmolStr),
    Pipe(Pipe),
}

impl Arg {
    pub fn kind(&self) -> &'static str {
        match self {
            Arg::Field(_) => "field",
            Arg::Dot => "dot",
            Arg::Ident(_) => "identifier",
            Arg::Bool(_) => "bool",
            Arg::Number(_) => "number",
            Arg::String(_) => "string",
            Arg::Nil => "nil",
            Arg::Variable(_) => "variable",
            Arg::Pipe(_) => "parenthesized pipeline",
        }
    }
}
