use nom::Parser as _;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_until, take_while_m_n},
    character::complete::{alpha1, alphanumeric1, char, multispace0, multispace1, none_of, one_of},
    combinator::{map, map_opt, map_res, opt, peek, recognize, rest, value},
    multi::{many0, many1, separated_list1},
    number::complete::double,
    sequence::{delimited, pair, preceded, terminated},
};
use nom_locate::LocatedSpan;
use smol_str::SmolStr;

use super::error::ParseError;
use super::node::{Arg, Command, Keyword, Node, Offset, Pipe};
use crate::eval::resolver::FieldPath;
use crate::number::Number;

type Span<'a> = LocatedSpan<&'a str>;
type PResult<'a, T> = IResult<Span<'a>, T>;

const WHITESPACE: &[char] = &[' ', '\t', '\r', '\n'];

#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub left_delim: String,
    pub right_delim: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            left_delim: "{{".to_string(),
            right_delim: "}}".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: Options,
}

impl Parser {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Splits `input` into text, action, comment and control nodes.
    pub fn parse(&self, input: &str) -> Result<Vec<Node>, ParseError> {
        let left = self.options.left_delim.as_str();
        let mut nodes = Vec::new();
        let mut input = Span::new(input);
        let mut trim_leading = false;

        loop {
            let (after_text, text_span) = text(input, left)?;

            if after_text.fragment().is_empty() {
                push_text(&mut nodes, text_span, trim_leading, false);
                break;
            }

            let pos = after_text.location_offset();
            let (body, trim_trailing) = left_delim(after_text, left)?;
            push_text(&mut nodes, text_span, trim_leading, trim_trailing);

            let (rest, node, trim) = self.action(body, pos)?;
            nodes.push(node);
            trim_leading = trim;
            input = rest;
        }

        Ok(nodes)
    }

    fn action<'a>(&self, body: Span<'a>, pos: Offset) -> Result<(Span<'a>, Node, bool), ParseError> {
        let right = self.options.right_delim.as_str();

        if !body.fragment().contains(right) {
            return Err(ParseError::UnclosedAction { offset: pos });
        }

        let (input, _) = whitespace(body)?;

        if input.fragment().starts_with("/*") {
            let (input, _) = comment(input).map_err(|_| ParseError::UnclosedComment { offset: pos })?;
            let (input, trim) = close(input, right).map_err(|_| ParseError::UnclosedComment { offset: pos })?;
            return Ok((input, Node::Comment { pos }, trim));
        }

        if let Ok((input, keyword)) = keyword(input) {
            let (input, skipped) = until(input, right)?;
            let (input, _) = delim(input, right)?;
            let trim = skipped
                .fragment()
                .strip_suffix('-')
                .is_some_and(|s| s.ends_with(WHITESPACE));
            return Ok((input, Node::Control { pos, keyword }, trim));
        }

        if input.fragment().starts_with('|') || close(input, right).is_ok() {
            return Err(ParseError::EmptyCommand {
                offset: input.location_offset(),
            });
        }

        let (input, pipe) = pipeline(input)?;

        match close(input, right) {
            Ok((input, trim)) => Ok((input, Node::Action { pos, pipe }, trim)),
            Err(_) => {
                let (input, _) = whitespace(input)?;
                if input.fragment().starts_with('|') {
                    Err(ParseError::EmptyCommand {
                        offset: input.location_offset(),
                    })
                } else {
                    Err(unexpected(input))
                }
            }
        }
    }
}

impl<'a> From<nom::Err<nom::error::Error<Span<'a>>>> for ParseError {
    fn from(err: nom::Err<nom::error::Error<Span<'a>>>) -> Self {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => unexpected(e.input),
            nom::Err::Incomplete(_) => unreachable!(),
        }
    }
}

fn unexpected(input: Span) -> ParseError {
    ParseError::UnexpectedInput {
        offset: input.location_offset(),
        found: input
            .fragment()
            .chars()
            .next()
            .map(String::from)
            .unwrap_or_else(|| "EOF".to_string()),
    }
}

fn push_text(nodes: &mut Vec<Node>, span: Span, trim_leading: bool, trim_trailing: bool) {
    let mut text: &str = span.fragment();
    let mut pos = span.location_offset();

    if trim_leading {
        let trimmed = text.trim_start_matches(WHITESPACE);
        pos += text.len() - trimmed.len();
        text = trimmed;
    }
    if trim_trailing {
        text = text.trim_end_matches(WHITESPACE);
    }
    if !text.is_empty() {
        nodes.push(Node::Text {
            pos,
            text: text.to_string(),
        });
    }
}

fn text<'a>(input: Span<'a>, left: &str) -> PResult<'a, Span<'a>> {
    alt((take_until(left), rest)).parse(input)
}

fn left_delim<'a>(input: Span<'a>, left: &str) -> PResult<'a, bool> {
    let (input, _) = tag(left).parse(input)?;
    let (input, trim) = opt(terminated(char('-'), peek(multispace1))).parse(input)?;
    Ok((input, trim.is_some()))
}

/// The closing delimiter, optionally preceded by a ` -` trim marker.
fn close<'a>(input: Span<'a>, right: &str) -> PResult<'a, bool> {
    alt((
        value(true, (multispace1, char('-'), tag(right))),
        value(false, (multispace0, tag(right))),
    ))
    .parse(input)
}

fn delim<'a>(input: Span<'a>, right: &str) -> PResult<'a, Span<'a>> {
    tag(right).parse(input)
}

fn until<'a>(input: Span<'a>, right: &str) -> PResult<'a, Span<'a>> {
    take_until(right).parse(input)
}

fn whitespace(input: Span) -> PResult<Span> {
    multispace0(input)
}

fn comment(input: Span) -> PResult<()> {
    value((), (tag("/*"), take_until("*/"), tag("*/"))).parse(input)
}

fn ident(input: Span) -> PResult<Span> {
    recognize(pair(alt((alpha1, tag("_"))), many0(alt((alphanumeric1, tag("_")))))).parse(input)
}

fn keyword(input: Span) -> PResult<Keyword> {
    map_opt(ident, |span: Span| span.fragment().parse::<Keyword>().ok()).parse(input)
}

fn pipeline(input: Span) -> PResult<Pipe> {
    let pos = input.location_offset();
    let (input, decls) = opt(declarations).parse(input)?;
    let (input, cmds) = separated_list1((multispace0, char('|'), multispace0), command).parse(input)?;

    Ok((
        input,
        Pipe {
            pos,
            decls: decls.unwrap_or_default(),
            cmds,
        },
    ))
}

fn declarations(input: Span) -> PResult<Vec<SmolStr>> {
    terminated(
        separated_list1(
            (multispace0, char(','), multispace0),
            map(recognize((char('$'), opt(ident))), |span: Span| SmolStr::new(span.fragment())),
        ),
        (multispace0, alt((tag(":="), tag("="))), multispace0),
    )
    .parse(input)
}

fn command(input: Span) -> PResult<Command> {
    let pos = input.location_offset();
    map(separated_list1(multispace1, operand), move |args| Command { pos, args }).parse(input)
}

fn operand(input: Span) -> PResult<Arg> {
    alt((
        field,
        value(Arg::Dot, char('.')),
        variable,
        map(string_literal, Arg::String),
        map(raw_string, Arg::String),
        map(number_literal, Arg::Number),
        map(parenthesized, Arg::Pipe),
        word,
    ))
    .parse(input)
}

fn field(input: Span) -> PResult<Arg> {
    map_opt(recognize(many1(preceded(char('.'), ident))), |span: Span| {
        FieldPath::parse(span.fragment()).map(Arg::Field)
    })
    .parse(input)
}

fn variable(input: Span) -> PResult<Arg> {
    map(
        recognize((char('$'), opt(ident), many0(preceded(char('.'), ident)))),
        |span: Span| Arg::Variable(SmolStr::new(span.fragment())),
    )
    .parse(input)
}

fn word(input: Span) -> PResult<Arg> {
    map(ident, |span: Span| match *span.fragment() {
        "true" => Arg::Bool(true),
        "false" => Arg::Bool(false),
        "nil" => Arg::Nil,
        name => Arg::Ident(SmolStr::new(name)),
    })
    .parse(input)
}

fn number_literal(input: Span) -> PResult<Number> {
    map(preceded(peek(one_of("+-0123456789")), double), Number::new).parse(input)
}

fn parenthesized(input: Span) -> PResult<Pipe> {
    delimited((char('('), multispace0), pipeline, (multispace0, char(')'))).parse(input)
}

fn unicode(input: Span) -> PResult<char> {
    map_opt(
        map_res(
            preceded(char('u'), take_while_m_n(4, 4, |c: char| c.is_ascii_hexdigit())),
            |span: Span| u32::from_str_radix(span.fragment(), 16),
        ),
        char::from_u32,
    )
    .parse(input)
}

fn string_literal(input: Span) -> PResult<String> {
    alt((
        value(String::new(), tag("\"\"")),
        delimited(
            char('"'),
            escaped_transform(
                none_of("\"\\"),
                '\\',
                alt((
                    value('\\', char('\\')),
                    value('\"', char('\"')),
                    value('\r', char('r')),
                    value('\n', char('n')),
                    value('\t', char('t')),
                    unicode,
                )),
            ),
            char('"'),
        ),
    ))
    .parse(input)
}

fn raw_string(input: Span) -> PResult<String> {
    map(delimited(char('`'), take_until("`"), char('`')), |span: Span| {
        span.fragment().to_string()
    })
    .parse(input)
}
