use itertools::Itertools;
use std::cmp::Ordering;
use std::sync::LazyLock;

use super::error::DispatchError;
use super::function::{FunctionResult, ParamType};
use crate::value::Value;

#[derive(Clone, Debug)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub params: &'static [ParamType],
    pub variadic: bool,
    pub func: fn(&[Value]) -> FunctionResult,
}

impl BuiltinFunction {
    const fn new(
        name: &'static str,
        params: &'static [ParamType],
        variadic: bool,
        func: fn(&[Value]) -> FunctionResult,
    ) -> Self {
        BuiltinFunction {
            name,
            params,
            variadic,
            func,
        }
    }
}

const BOOL: &[ParamType] = &[ParamType::Bool];
const ANY: &[ParamType] = &[ParamType::Any];
const ANY2: &[ParamType] = &[ParamType::Any, ParamType::Any];
const STRING: &[ParamType] = &[ParamType::String];
const STRING2: &[ParamType] = &[ParamType::String, ParamType::String];

pub static BUILTIN_FUNCTIONS: LazyLock<Vec<BuiltinFunction>> = LazyLock::new(|| {
    vec![
        BuiltinFunction::new("and", BOOL, true, |args| {
            Ok(args.iter().all(Value::is_truthy).into())
        }),
        BuiltinFunction::new("or", BOOL, true, |args| {
            Ok(args.iter().any(Value::is_truthy).into())
        }),
        BuiltinFunction::new("not", BOOL, false, |args| Ok((!args[0].is_truthy()).into())),
        BuiltinFunction::new("len", ANY, false, |args| match &args[0] {
            Value::String(s) => Ok(s.len().into()),
            Value::List(items) => Ok(items.len().into()),
            Value::Map(map) => Ok(map.len().into()),
            a => Err(DispatchError::Unsupported {
                name: "len".into(),
                kind: a.kind(),
            }),
        }),
        BuiltinFunction::new("print", ANY, true, |args| Ok(sprint(args).into())),
        BuiltinFunction::new("printf", &[ParamType::String, ParamType::Any], true, |args| match args {
            [Value::String(format), rest @ ..] => Ok(sprintf(format, rest).into()),
            _ => unreachable!(),
        }),
        BuiltinFunction::new("println", ANY, true, |args| Ok(sprintln(args).into())),
        BuiltinFunction::new("upper", STRING, false, |args| match args {
            [Value::String(s)] => Ok(s.to_uppercase().into()),
            _ => unreachable!(),
        }),
        BuiltinFunction::new("lower", STRING, false, |args| match args {
            [Value::String(s)] => Ok(s.to_lowercase().into()),
            _ => unreachable!(),
        }),
        BuiltinFunction::new("title", STRING, false, |args| match args {
            [Value::String(s)] => Ok(title(s).into()),
            _ => unreachable!(),
        }),
        BuiltinFunction::new("trim", STRING, false, |args| match args {
            [Value::String(s)] => Ok(s.trim().into()),
            _ => unreachable!(),
        }),
        BuiltinFunction::new("repeat", &[ParamType::String, ParamType::Number], false, |args| {
            match args {
                [Value::String(s), Value::Number(n)] => repeat(s, n.value()).map(Into::into),
                _ => unreachable!(),
            }
        }),
        BuiltinFunction::new("default", ANY2, false, |args| match args {
            [value, fallback] if !value.is_truthy() => Ok(fallback.clone()),
            [value, _] => Ok(value.clone()),
            _ => unreachable!(),
        }),
        BuiltinFunction::new("join", &[ParamType::List, ParamType::String], false, |args| match args {
            [Value::List(items), Value::String(sep)] => Ok(items.iter().join(sep).into()),
            _ => unreachable!(),
        }),
        BuiltinFunction::new("contains", STRING2, false, |args| match args {
            [Value::String(s), Value::String(sub)] => Ok(s.contains(sub.as_str()).into()),
            _ => unreachable!(),
        }),
        BuiltinFunction::new("eq", ANY2, false, |args| Ok((args[0] == args[1]).into())),
        BuiltinFunction::new("ne", ANY2, false, |args| Ok((args[0] != args[1]).into())),
        BuiltinFunction::new("lt", ANY2, false, |args| {
            compare("lt", args).map(|o| (o == Ordering::Less).into())
        }),
        BuiltinFunction::new("le", ANY2, false, |args| {
            compare("le", args).map(|o| (o != Ordering::Greater).into())
        }),
        BuiltinFunction::new("gt", ANY2, false, |args| {
            compare("gt", args).map(|o| (o == Ordering::Greater).into())
        }),
        BuiltinFunction::new("ge", ANY2, false, |args| {
            compare("ge", args).map(|o| (o != Ordering::Less).into())
        }),
    ]
});

/// Upper bound in bytes for the output of `repeat`.
pub const MAX_REPEAT_LEN: usize = 16 * 1024 * 1024;

/// Negative and NaN counts repeat zero times.
fn repeat(s: &str, count: f64) -> Result<String, DispatchError> {
    let count = if count > 0.0 { count } else { 0.0 };
    if s.is_empty() {
        return Ok(String::new());
    }

    let fits = (count <= usize::MAX as f64)
        .then(|| s.len().checked_mul(count as usize))
        .flatten()
        .is_some_and(|len| len <= MAX_REPEAT_LEN);

    if !fits {
        return Err(DispatchError::Failed {
            name: "repeat".into(),
            message: format!(
                "repeating {} bytes {} times exceeds the limit of {} bytes",
                s.len(),
                count,
                MAX_REPEAT_LEN
            ),
        });
    }

    Ok(s.repeat(count as usize))
}

fn compare(name: &str, args: &[Value]) -> Result<Ordering, DispatchError> {
    match args {
        [Value::Number(a), Value::Number(b)] => Ok(a.cmp(b)),
        [Value::String(a), Value::String(b)] => Ok(a.cmp(b)),
        [Value::Number(_) | Value::String(_), b] => Err(DispatchError::Unsupported {
            name: name.into(),
            kind: b.kind(),
        }),
        [a, _] => Err(DispatchError::Unsupported {
            name: name.into(),
            kind: a.kind(),
        }),
        _ => unreachable!(),
    }
}

/// Upper-cases the first letter of every word, like Go's `strings.Title`.
fn title(s: &str) -> String {
    let mut prev_is_separator = true;
    s.chars()
        .map(|c| {
            let mapped = if prev_is_separator { c.to_uppercase().collect::<String>() } else { c.to_string() };
            prev_is_separator = !(c.is_alphanumeric() || c == '_');
            mapped
        })
        .collect()
}

/// `fmt.Sprint`: spaces are added between operands when neither is a string.
pub(crate) fn sprint(args: &[Value]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        let is_string = matches!(arg, Value::String(_));
        if i > 0 && !is_string && !matches!(args[i - 1], Value::String(_)) {
            out.push(' ');
        }
        out.push_str(&arg.to_string());
    }
    out
}

/// `fmt.Sprintln`: operands are always space separated and a newline is appended.
pub(crate) fn sprintln(args: &[Value]) -> String {
    format!("{}\n", args.iter().join(" "))
}

/// `fmt.Sprintf` over the verbs `%v %s %d %f %t %q %%`, with an optional
/// precision such as `%.2f`.
pub(crate) fn sprintf(format: &str, args: &[Value]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let precision = chars.next_if_eq(&'.').map(|_| {
            let mut digits = String::new();
            while let Some(d) = chars.next_if(char::is_ascii_digit) {
                digits.push(d);
            }
            digits.parse::<usize>().unwrap_or(0)
        });

        match chars.next() {
            None => out.push_str("%!(NOVERB)"),
            Some('%') => out.push('%'),
            Some(verb) => match args.next() {
                Some(arg) => out.push_str(&format_verb(verb, precision, arg)),
                None => out.push_str(&format!("%!{}(MISSING)", verb)),
            },
        }
    }

    let extra = args.map(|arg| format!("{}={}", arg.kind(), arg)).join(", ");
    if !extra.is_empty() {
        out.push_str(&format!("%!(EXTRA {})", extra));
    }
    out
}

fn format_verb(verb: char, precision: Option<usize>, arg: &Value) -> String {
    match (verb, arg) {
        ('v', _) => arg.to_string(),
        ('s', Value::Number(_) | Value::Bool(_)) => bad_verb(verb, arg),
        ('s', _) => arg.to_string(),
        // `+ 0.0` folds -0 into 0
        ('d', Value::Number(n)) if n.value().is_finite() => format!("{:.0}", n.value().trunc() + 0.0),
        ('f', Value::Number(n)) => format!("{:.*}", precision.unwrap_or(6), n.value()),
        ('t', Value::Bool(b)) => b.to_string(),
        ('q', Value::String(s)) => format!("{:?}", s),
        _ => bad_verb(verb, arg),
    }
}

fn bad_verb(verb: char, arg: &Value) -> String {
    format!("%!{}({}={})", verb, arg.kind(), arg)
}
