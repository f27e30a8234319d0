use std::sync::Arc;

use crate::{
    ast::{Nodes, parser},
    codegen::Generator,
    compiler::{CompiledTemplate, Compiler},
    error::{Error, InnerError},
    eval::function::{DispatchOptions, Functions},
    line_index::LineIndex,
    template::Templates,
};

#[derive(Debug, Clone, Default)]
pub struct Options {
    pub parse: parser::Options,
    pub dispatch: DispatchOptions,
}

/// Parses and compiles templates against one function registry.
#[derive(Debug, Clone)]
pub struct Engine {
    pub(crate) options: Options,
    functions: Functions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Engine {
    pub fn new(options: Options) -> Self {
        Self {
            functions: Functions::builtins().with_options(options.dispatch.clone()),
            options,
        }
    }

    /// Replaces the builtin registry. The engine's dispatch options are applied to it.
    pub fn with_functions(mut self, functions: Functions) -> Self {
        self.functions = functions.with_options(self.options.dispatch.clone());
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn functions(&self) -> &Functions {
        &self.functions
    }

    pub fn set_delimiters(&mut self, left: &str, right: &str) {
        self.options.parse.left_delim = left.to_string();
        self.options.parse.right_delim = right.to_string();
    }

    pub fn set_surface_secondary_errors(&mut self, surface: bool) {
        self.options.dispatch.surface_secondary_errors = surface;
        self.functions = self.functions.clone().with_options(self.options.dispatch.clone());
    }

    #[allow(clippy::result_large_err)]
    pub fn parse(&self, name: &str, source: &str) -> Result<Nodes, Error> {
        parser::Parser::new(self.options.parse.clone())
            .parse(source)
            .map_err(|e| Error::from_error(name, source, InnerError::Parse(e)))
    }

    #[allow(clippy::result_large_err)]
    pub fn compile(&self, name: &str, source: &str) -> Result<CompiledTemplate, Error> {
        let nodes = self.parse(name, source)?;
        let lines = LineIndex::new(source);

        Compiler::new(name, &lines)
            .compile(&nodes)
            .map_err(|e| Error::from_error(name, source, InnerError::Compile(e)))
    }

    /// Compiles every `(name, source)` pair into a registry sharing this
    /// engine's functions. Stops at the first error.
    #[allow(clippy::result_large_err)]
    pub fn compile_all<'a, I>(&self, sources: I) -> Result<Templates, Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut templates = Templates::new(Arc::new(self.functions.clone()));

        for (name, source) in sources {
            templates.insert(self.compile(name, source)?);
        }

        log::debug!("compiled {} templates", templates.len());
        Ok(templates)
    }

    /// Emits Rust source with one render routine per template.
    #[allow(clippy::result_large_err)]
    pub fn generate<'a, I>(&self, sources: I, module_name: Option<&str>) -> Result<String, Error>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut generator = Generator::new(module_name)
            .map_err(|e| Error::from_error(module_name.unwrap_or_default(), "", InnerError::Compile(e)))?;

        for (name, source) in sources {
            let nodes = self.parse(name, source)?;
            generator
                .add(name, &nodes, &LineIndex::new(source))
                .map_err(|e| Error::from_error(name, source, InnerError::Compile(e)))?;
        }

        Ok(generator.finish())
    }
}
