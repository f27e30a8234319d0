use crate::number::Number;
use itertools::Itertools;
use smol_str::SmolStr;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{self, Display, Formatter},
};

/// Any datum a template can read.
///
/// Host data is converted into `Value` once, at the ingestion boundary, and is
/// only read while a template renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Record(Record),
}

/// Shared `Null` that borrowed lookups can point at.
pub(crate) static NULL: Value = Value::Null;

/// The kind of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Number,
    String,
    List,
    Map,
    Record,
}

impl Display for Kind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Null => "null",
            Kind::Bool => "bool",
            Kind::Number => "number",
            Kind::String => "string",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Record => "record",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: SmolStr,
    pub value: Value,
    pub visibility: Visibility,
}

impl Field {
    pub fn is_readable(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

/// A structured value with named fields, the counterpart of a host struct.
///
/// Fields keep their declaration order. Private fields can be looked up but
/// not read through a template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    pub name: SmolStr,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.push(name, value, Visibility::Public);
        self
    }

    pub fn with_private_field(mut self, name: impl Into<SmolStr>, value: impl Into<Value>) -> Self {
        self.push(name, value, Visibility::Private);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    fn push(&mut self, name: impl Into<SmolStr>, value: impl Into<Value>, visibility: Visibility) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value;
                field.visibility = visibility;
            }
            None => self.fields.push(Field {
                name,
                value,
                visibility,
            }),
        }
    }
}

impl Value {
    pub const NULL: Value = Value::Null;
    pub const TRUE: Value = Value::Bool(true);
    pub const FALSE: Value = Value::Bool(false);

    #[inline(always)]
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Record(_) => Kind::Record,
        }
    }

    #[inline(always)]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Go template truthiness: zero values are false.
    #[inline(always)]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !n.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::List(l) => !l.is_empty(),
            Value::Map(m) => !m.is_empty(),
            Value::Record(_) => true,
        }
    }

    /// Converts any serializable host value through its JSON data model.
    ///
    /// Structs become maps, so field visibility is not preserved. Build a
    /// [`Record`] directly when private fields matter.
    pub fn from_serialize<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Value::from)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(items) => write!(f, "[{}]", items.iter().join(" ")),
            Value::Map(map) => write!(
                f,
                "map[{}]",
                map.iter().map(|(k, v)| format!("{}:{}", k, v)).join(" ")
            ),
            Value::Record(record) => write!(
                f,
                "{{{}}}",
                record.fields.iter().map(|field| &field.value).join(" ")
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<SmolStr> for Value {
    fn from(s: SmolStr) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(map: BTreeMap<K, V>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>, S> From<HashMap<K, V, S>> for Value {
    fn from(map: HashMap<K, V, S>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::from).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Value::Null, "")]
    #[case(Value::Bool(true), "true")]
    #[case(Value::from(42), "42")]
    #[case(Value::from(2.5), "2.5")]
    #[case(Value::from("hello"), "hello")]
    #[case(Value::from(vec![1, 2, 3]), "[1 2 3]")]
    #[case(Value::from_iter([("b", 2), ("a", 1)]), "map[a:1 b:2]")]
    #[case(Value::from(Record::new("User").with_field("Name", "John").with_field("Age", 30)), "{John 30}")]
    #[case(Value::from(vec![Value::Null, Value::from("x")]), "[ x]")]
    fn test_display(#[case] value: Value, #[case] expected: &str) {
        assert_eq!(value.to_string(), expected);
    }

    #[rstest]
    #[case(Value::Null, false)]
    #[case(Value::Bool(false), false)]
    #[case(Value::from(0), false)]
    #[case(Value::from(1), true)]
    #[case(Value::from(""), false)]
    #[case(Value::from("a"), true)]
    #[case(Value::List(Vec::new()), false)]
    #[case(Value::from(Record::new("Empty")), true)]
    fn test_is_truthy(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(value.is_truthy(), expected);
    }

    #[test]
    fn test_option_unwraps_at_boundary() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
        assert_eq!(Value::from(Some(Some(3))), Value::from(3));
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"Title": "Hi", "Items": [1, 2.5, null], "Ok": true});
        let value = Value::from(json);

        assert_eq!(
            value,
            Value::from_iter([
                ("Items", Value::from(vec![Value::from(1), Value::from(2.5), Value::Null])),
                ("Ok", Value::Bool(true)),
                ("Title", Value::from("Hi")),
            ])
        );
    }

    #[test]
    fn test_from_serialize() {
        #[derive(serde::Serialize)]
        struct User {
            name: &'static str,
            tags: Vec<&'static str>,
        }

        let value = Value::from_serialize(&User {
            name: "John",
            tags: vec!["a"],
        })
        .unwrap();

        assert_eq!(
            value,
            Value::from_iter([("name", Value::from("John")), ("tags", Value::from(vec!["a"]))])
        );
    }

    #[test]
    fn test_record_field_override() {
        let record = Record::new("User")
            .with_field("Name", "a")
            .with_private_field("Name", "b");

        assert_eq!(record.fields.len(), 1);
        assert!(!record.get("Name").unwrap().is_readable());
    }
}
