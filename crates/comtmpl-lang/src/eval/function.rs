//! Name-keyed function registry with arity and type checked dispatch.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use smol_str::SmolStr;
use std::{fmt, sync::Arc};

use super::builtin::BUILTIN_FUNCTIONS;
use super::error::DispatchError;
use crate::value::{Kind, Value};

pub type FunctionResult = Result<Value, DispatchError>;

/// A callable operating directly on already-coerced arguments.
pub type NativeFn = Arc<dyn Fn(&[Value]) -> FunctionResult + Send + Sync>;

/// A callable that reports failures as a secondary output next to its value.
pub type FallibleFn = Arc<dyn Fn(&[Value]) -> (Value, Option<String>) + Send + Sync>;

/// The type a parameter accepts. `Null` arguments become the zero value of
/// the type; any other kind mismatch is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Any,
    Bool,
    Number,
    String,
    List,
    Map,
}

impl ParamType {
    fn zero(self) -> Value {
        match self {
            ParamType::Any => Value::Null,
            ParamType::Bool => Value::Bool(false),
            ParamType::Number => Value::from(0),
            ParamType::String => Value::String(String::new()),
            ParamType::List => Value::List(Vec::new()),
            ParamType::Map => Value::Map(Default::default()),
        }
    }

    fn accepts(self, kind: Kind) -> bool {
        matches!(
            (self, kind),
            (ParamType::Any, _)
                | (ParamType::Bool, Kind::Bool)
                | (ParamType::Number, Kind::Number)
                | (ParamType::String, Kind::String)
                | (ParamType::List, Kind::List)
                | (ParamType::Map, Kind::Map)
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            ParamType::Any => "any",
            ParamType::Bool => "bool",
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::List => "list",
            ParamType::Map => "map",
        }
    }
}

#[derive(Clone)]
pub enum Callable {
    Native(NativeFn),
    Fallible(FallibleFn),
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "Callable::Native"),
            Callable::Fallible(_) => write!(f, "Callable::Fallible"),
        }
    }
}

/// A registered function.
///
/// The arity is the number of declared parameters. For a variadic function
/// the last parameter absorbs every argument past `arity - 1`.
#[derive(Clone, Debug)]
pub struct FunctionEntry {
    pub name: SmolStr,
    pub params: SmallVec<[ParamType; 4]>,
    pub variadic: bool,
    pub callable: Callable,
}

impl FunctionEntry {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    #[inline(always)]
    fn check_arity(&self, num_args: usize) -> Result<(), DispatchError> {
        let valid = if self.variadic {
            num_args + 1 >= self.arity()
        } else {
            num_args == self.arity()
        };

        if valid {
            Ok(())
        } else {
            Err(DispatchError::ArityMismatch {
                name: self.name.clone(),
                expected: if self.variadic {
                    self.arity().saturating_sub(1)
                } else {
                    self.arity()
                },
                got: num_args,
                variadic: self.variadic,
            })
        }
    }

    #[inline(always)]
    fn param_type(&self, index: usize) -> ParamType {
        match self.params.get(index) {
            Some(param) if !(self.variadic && index + 1 == self.arity()) => *param,
            _ => self.params.last().copied().unwrap_or(ParamType::Any),
        }
    }

    fn coerce(&self, args: Vec<Value>) -> Result<Vec<Value>, DispatchError> {
        args.into_iter()
            .enumerate()
            .map(|(index, arg)| {
                let param = self.param_type(index);
                match arg {
                    Value::Null => Ok(param.zero()),
                    arg if param.accepts(arg.kind()) => Ok(arg),
                    arg => Err(DispatchError::TypeMismatch {
                        name: self.name.clone(),
                        index,
                        expected: param.name().into(),
                        found: arg.kind(),
                    }),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Turn the secondary error output of fallible functions into
    /// [`DispatchError::Failed`] instead of discarding it.
    pub surface_secondary_errors: bool,
}

/// The function registry.
///
/// Built once, then shared read-only by every render that uses it.
#[derive(Debug, Clone, Default)]
pub struct Functions {
    entries: FxHashMap<SmolStr, FunctionEntry>,
    options: DispatchOptions,
}

impl Functions {
    /// An empty registry. Use [`Functions::builtins`] for the standard set.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every builtin function.
    pub fn builtins() -> Self {
        let mut functions = Self::new();
        for builtin in BUILTIN_FUNCTIONS.iter() {
            let func = builtin.func;
            functions.entries.insert(
                builtin.name.into(),
                FunctionEntry {
                    name: builtin.name.into(),
                    params: builtin.params.iter().copied().collect(),
                    variadic: builtin.variadic,
                    callable: Callable::Native(Arc::new(move |args: &[Value]| func(args))),
                },
            );
        }
        functions
    }

    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    pub fn register<F>(&mut self, name: &str, params: &[ParamType], variadic: bool, func: F) -> Result<(), DispatchError>
    where
        F: Fn(&[Value]) -> FunctionResult + Send + Sync + 'static,
    {
        self.insert(name, params, variadic, Callable::Native(Arc::new(func)))
    }

    /// Registers a function that returns its failure next to its value.
    pub fn register_fallible<F>(
        &mut self,
        name: &str,
        params: &[ParamType],
        variadic: bool,
        func: F,
    ) -> Result<(), DispatchError>
    where
        F: Fn(&[Value]) -> (Value, Option<String>) + Send + Sync + 'static,
    {
        self.insert(name, params, variadic, Callable::Fallible(Arc::new(func)))
    }

    fn insert(&mut self, name: &str, params: &[ParamType], variadic: bool, callable: Callable) -> Result<(), DispatchError> {
        let name = SmolStr::new(name);
        if self.entries.contains_key(&name) {
            return Err(DispatchError::AlreadyDefined(name));
        }

        self.entries.insert(
            name.clone(),
            FunctionEntry {
                name,
                params: params.iter().copied().collect(),
                variadic: variadic && !params.is_empty(),
                callable,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FunctionEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Looks up `name` and invokes it with `args`.
    pub fn call(&self, name: &str, args: Vec<Value>) -> FunctionResult {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| DispatchError::NotFound(name.into()))?;

        entry.check_arity(args.len())?;
        let args = entry.coerce(args)?;

        match &entry.callable {
            Callable::Native(func) => func(&args),
            Callable::Fallible(func) => match func(&args) {
                (value, None) => Ok(value),
                (_, Some(message)) if self.options.surface_secondary_errors => Err(DispatchError::Failed {
                    name: entry.name.clone(),
                    message,
                }),
                (value, Some(message)) => {
                    log::warn!("discarding secondary error from \"{}\": {}", entry.name, message);
                    Ok(value)
                }
            },
        }
    }
}
