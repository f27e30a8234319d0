use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::io::Write;
use std::sync::Arc;

use crate::compiler::{CompiledTemplate, Routine};
use crate::eval::error::{RegistryError, RenderError};
use crate::eval::function::Functions;
use crate::value::Value;

/// Compiled templates by name, together with the functions they call.
///
/// Read-only once built; share it between threads behind an `Arc`.
#[derive(Debug, Default)]
pub struct Templates {
    functions: Arc<Functions>,
    templates: FxHashMap<SmolStr, CompiledTemplate>,
}

impl Templates {
    pub fn new(functions: impl Into<Arc<Functions>>) -> Self {
        Self {
            functions: functions.into(),
            templates: FxHashMap::default(),
        }
    }

    /// Builds a registry from plain render routines, as emitted by the Rust
    /// source generator.
    pub fn from_routines<I, S>(functions: impl Into<Arc<Functions>>, routines: I) -> Self
    where
        I: IntoIterator<Item = (S, Routine)>,
        S: Into<SmolStr>,
    {
        let mut templates = Self::new(functions);
        for (name, routine) in routines {
            templates.insert(CompiledTemplate::from_routine(name, routine));
        }
        templates
    }

    /// Adds `template`, replacing any template with the same name.
    pub fn insert(&mut self, template: CompiledTemplate) {
        self.templates.insert(SmolStr::new(template.name()), template);
    }

    pub fn functions(&self) -> &Functions {
        &self.functions
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Template names in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Renders the template `name` with `data` into `writer`.
    ///
    /// On failure the writer may already hold part of the output.
    pub fn render(&self, name: &str, data: &Value, writer: &mut dyn Write) -> Result<(), RenderError> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| RegistryError::NotFound(name.into()))?;

        log::debug!("rendering template \"{}\"", name);
        template.render(&self.functions, writer, data)
    }

    pub fn render_to_string(&self, name: &str, data: &Value) -> Result<String, RenderError> {
        let mut buf = Vec::new();
        self.render(name, data, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn hello(_: &Functions, writer: &mut dyn Write, data: &Value) -> Result<(), RenderError> {
        writer.write_all(b"Hello ")?;
        write!(writer, "{}", crate::eval::eval_field(data, &["Name"])?)?;
        Ok(())
    }

    fn shout(funcs: &Functions, writer: &mut dyn Write, data: &Value) -> Result<(), RenderError> {
        let value = funcs.call("upper", vec![crate::eval::eval_field(data, &["Name"])?.clone()])?;
        write!(writer, "{}", value)?;
        Ok(())
    }

    #[fixture]
    fn templates() -> Templates {
        Templates::from_routines(
            Functions::builtins(),
            [("hello", hello as Routine), ("shout", shout as Routine)],
        )
    }

    #[rstest]
    #[case("hello", "Hello John")]
    #[case("shout", "JOHN")]
    fn test_render(templates: Templates, #[case] name: &str, #[case] expected: &str) {
        let data = Value::from_iter([("Name", "John")]);
        assert_eq!(templates.render_to_string(name, &data).unwrap(), expected);
    }

    #[rstest]
    fn test_render_not_found(templates: Templates) {
        let err = templates.render_to_string("missing", &Value::Null).unwrap_err();
        assert!(matches!(err, RenderError::Registry(RegistryError::NotFound(name)) if name == "missing"));
    }

    #[rstest]
    fn test_names(templates: Templates) {
        let mut names = templates.names().collect::<Vec<_>>();
        names.sort();

        assert_eq!(names, vec!["hello", "shout"]);
        assert!(templates.contains("hello"));
        assert!(!templates.contains("nope"));
        assert_eq!(templates.len(), 2);
    }

    #[test]
    fn test_templates_are_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Templates>();
    }
}
