//! Emits Rust source for a set of templates.
//!
//! The generated module exposes one render routine per template and a
//! `templates()` constructor that registers them all:
//!
//! ```rust,ignore
//! let templates = generated::templates();
//! let html = templates.render_to_string("index.html", &data)?;
//! ```

use rustc_hash::FxHashSet;
use std::fmt::Write;

use crate::ast::node::Node;
use crate::compiler::CompileError;
use crate::compiler::lower::{self, Operand, Pipeline, Source, UnitKind};
use crate::line_index::LineIndex;
use crate::value::Value;

const INDENT: &str = "    ";

const KEYWORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate", "do", "dyn",
    "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in", "let", "loop", "macro",
    "match", "mod", "move", "mut", "override", "priv", "pub", "ref", "return", "self", "static", "struct", "super",
    "trait", "true", "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');

    starts_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') && name != "_" && !KEYWORDS.contains(&name)
}

#[derive(Debug, Clone, Default)]
pub struct Generator {
    module_name: Option<String>,
    routines: Vec<(String, String)>,
    body: String,
    used: FxHashSet<String>,
}

impl Generator {
    /// With a module name the output is wrapped in `pub mod <name> { .. }`.
    /// The name must be a plain ASCII identifier.
    pub fn new(module_name: Option<&str>) -> Result<Self, CompileError> {
        if let Some(name) = module_name.filter(|name| !is_identifier(name)) {
            return Err(CompileError::InvalidModuleName(name.into()));
        }

        Ok(Self {
            module_name: module_name.map(str::to_string),
            ..Default::default()
        })
    }

    /// Emits the render routine for the template `name`.
    pub fn add(&mut self, name: &str, nodes: &[Node], lines: &LineIndex) -> Result<(), CompileError> {
        let units = lower::lower(name, nodes, lines)?;
        let fn_name = self.routine_name(name);
        let label = name.escape_debug().to_string();
        let body = &mut self.body;

        let _ = writeln!(
            body,
            "\npub fn {}(funcs: &comtmpl_lang::Functions, writer: &mut dyn std::io::Write, data: &comtmpl_lang::Value) -> Result<(), comtmpl_lang::RenderError> {{",
            fn_name
        );
        let _ = writeln!(body, "{}let _ = (funcs, data);", INDENT);

        for unit in units {
            let _ = writeln!(body, "{}// {}:{}", INDENT, label, unit.line);
            match unit.kind {
                UnitKind::Text(text) => {
                    let _ = writeln!(body, "{}writer.write_all({:?}.as_bytes())?;", INDENT, text);
                }
                UnitKind::Output(pipeline) => emit_pipeline(body, &pipeline),
            }
        }

        let _ = writeln!(body, "{}Ok(())", INDENT);
        let _ = writeln!(body, "}}");

        log::debug!("generated routine {} for template \"{}\"", fn_name, name);
        self.routines.push((name.to_string(), fn_name));
        Ok(())
    }

    pub fn finish(self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "// Code generated by comtmpl. DO NOT EDIT.");

        let indent = if let Some(module_name) = &self.module_name {
            let _ = writeln!(out, "\npub mod {} {{", module_name);
            INDENT
        } else {
            ""
        };

        let mut items = self.body.clone();
        let _ = writeln!(items, "\npub fn templates() -> comtmpl_lang::Templates {{");
        let _ = writeln!(items, "{}with_functions(comtmpl_lang::Functions::builtins())", INDENT);
        let _ = writeln!(items, "}}");
        let _ = writeln!(
            items,
            "\npub fn with_functions(functions: comtmpl_lang::Functions) -> comtmpl_lang::Templates {{"
        );
        let _ = writeln!(items, "{}comtmpl_lang::Templates::from_routines(", INDENT);
        let _ = writeln!(items, "{}{}functions,", INDENT, INDENT);
        let _ = writeln!(items, "{}{}[", INDENT, INDENT);
        for (name, fn_name) in &self.routines {
            let _ = writeln!(
                items,
                "{}{}{}({:?}, {} as comtmpl_lang::Routine),",
                INDENT, INDENT, INDENT, name, fn_name
            );
        }
        let _ = writeln!(items, "{}{}],", INDENT, INDENT);
        let _ = writeln!(items, "{})", INDENT);
        let _ = writeln!(items, "}}");

        for line in items.lines() {
            if line.is_empty() {
                out.push('\n');
            } else {
                let _ = writeln!(out, "{}{}", indent, line);
            }
        }

        if self.module_name.is_some() {
            let _ = writeln!(out, "}}");
        }
        out
    }

    fn routine_name(&mut self, name: &str) -> String {
        let base = format!(
            "render_{}",
            name.chars()
                .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
                .collect::<String>()
        );

        let mut fn_name = base.clone();
        let mut n = 1;
        while !self.used.insert(fn_name.clone()) {
            n += 1;
            fn_name = format!("{}_{}", base, n);
        }
        fn_name
    }
}

fn emit_pipeline(body: &mut String, pipeline: &Pipeline) {
    if let Some(operand) = pipeline.as_operand() {
        let _ = writeln!(body, "{}write!(writer, \"{{}}\", {})?;", INDENT, operand_ref(operand));
        return;
    }

    let _ = writeln!(body, "{}{{", INDENT);
    let value = match &pipeline.source {
        Source::Operand(operand) => operand_value(operand),
        Source::Call { name, args } => call(name, None, args),
    };
    let _ = writeln!(body, "{}{}let value = {};", INDENT, INDENT, value);

    for stage in &pipeline.stages {
        let _ = writeln!(
            body,
            "{}{}let value = {};",
            INDENT,
            INDENT,
            call(&stage.name, Some("value"), &stage.args)
        );
    }

    let _ = writeln!(body, "{}{}write!(writer, \"{{}}\", value)?;", INDENT, INDENT);
    let _ = writeln!(body, "{}}}", INDENT);
}

fn call(name: &str, first: Option<&str>, args: &[Operand]) -> String {
    let args = first
        .map(str::to_string)
        .into_iter()
        .chain(args.iter().map(operand_value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("funcs.call({:?}, vec![{}])?", name, args)
}

/// An expression of type `&Value`.
fn operand_ref(operand: &Operand) -> String {
    match operand {
        Operand::Field(path) => format!(
            "comtmpl_lang::eval_field(data, &[{}])?",
            path.segments()
                .iter()
                .map(|segment| format!("{:?}", segment.as_str()))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Operand::Dot => "data".to_string(),
        Operand::Literal(value) => format!("&{}", literal(value)),
    }
}

/// An expression of type `Value`.
fn operand_value(operand: &Operand) -> String {
    match operand {
        Operand::Literal(value) => literal(value),
        operand => format!("{}.clone()", operand_ref(operand)),
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Bool(b) => format!("comtmpl_lang::Value::Bool({})", b),
        Value::Number(n) if n.value().is_infinite() && n.value() > 0.0 => {
            "comtmpl_lang::Value::from(f64::INFINITY)".to_string()
        }
        Value::Number(n) if n.value().is_infinite() => "comtmpl_lang::Value::from(f64::NEG_INFINITY)".to_string(),
        Value::Number(n) => format!("comtmpl_lang::Value::from({:?}_f64)", n.value()),
        Value::String(s) => format!("comtmpl_lang::Value::from({:?})", s),
        _ => "comtmpl_lang::Value::Null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::parser::Parser;
    use rstest::rstest;

    fn generate(module_name: Option<&str>, templates: &[(&str, &str)]) -> Result<String, CompileError> {
        let mut generator = Generator::new(module_name)?;
        for (name, source) in templates {
            let nodes = Parser::default().parse(source).unwrap();
            generator.add(name, &nodes, &LineIndex::new(source))?;
        }
        Ok(generator.finish())
    }

    #[test]
    fn test_generate_text_and_field() {
        let source = generate(None, &[("hello.txt", "Hello\n{{.User.Name}}!")]).unwrap();

        assert_eq!(
            source,
            r#"// Code generated by comtmpl. DO NOT EDIT.

pub fn render_hello_txt(funcs: &comtmpl_lang::Functions, writer: &mut dyn std::io::Write, data: &comtmpl_lang::Value) -> Result<(), comtmpl_lang::RenderError> {
    let _ = (funcs, data);
    // hello.txt:1
    writer.write_all("Hello\n".as_bytes())?;
    // hello.txt:2
    write!(writer, "{}", comtmpl_lang::eval_field(data, &["User", "Name"])?)?;
    // hello.txt:2
    writer.write_all("!".as_bytes())?;
    Ok(())
}

pub fn templates() -> comtmpl_lang::Templates {
    with_functions(comtmpl_lang::Functions::builtins())
}

pub fn with_functions(functions: comtmpl_lang::Functions) -> comtmpl_lang::Templates {
    comtmpl_lang::Templates::from_routines(
        functions,
        [
            ("hello.txt", render_hello_txt as comtmpl_lang::Routine),
        ],
    )
}
"#
        );
    }

    #[test]
    fn test_generate_pipeline() {
        let source = generate(None, &[("p", "{{.Title | printf \"%s-%v\" 1.5 true nil}}")]).unwrap();

        assert!(source.contains(
            "        let value = comtmpl_lang::eval_field(data, &[\"Title\"])?.clone();\n        let value = funcs.call(\"printf\", vec![value, comtmpl_lang::Value::from(\"%s-%v\"), comtmpl_lang::Value::from(1.5_f64), comtmpl_lang::Value::Bool(true), comtmpl_lang::Value::Null])?;\n        write!(writer, \"{}\", value)?;\n"
        ));
    }

    #[test]
    fn test_generate_call_source() {
        let source = generate(None, &[("p", "{{len .}}")]).unwrap();

        assert!(source.contains("let value = funcs.call(\"len\", vec![data.clone()])?;"));
    }

    #[test]
    fn test_generate_module_and_name_collisions() {
        let source = generate(Some("views"), &[("a-b", "x"), ("a_b", "y")]).unwrap();

        assert!(source.contains("\npub mod views {\n\n"));
        assert!(source.contains("    pub fn render_a_b("));
        assert!(source.contains("    pub fn render_a_b_2("));
        assert!(source.contains("(\"a_b\", render_a_b_2 as comtmpl_lang::Routine),"));
        assert!(source.ends_with("}\n"));
    }

    #[test]
    fn test_generate_escapes_names_in_annotations() {
        let source = generate(None, &[("a\nb\t\"c\".html", "x")]).unwrap();

        assert!(source.contains("    // a\\nb\\t\\\"c\\\".html:1\n    writer.write_all("));
        assert!(source.contains("(\"a\\nb\\t\\\"c\\\".html\", render_a_b__c__html as comtmpl_lang::Routine),"));
    }

    #[rstest]
    #[case::plain("views", true)]
    #[case::underscore("_views_2", true)]
    #[case::empty("", false)]
    #[case::space("my views", false)]
    #[case::newline("views\n", false)]
    #[case::leading_digit("2views", false)]
    #[case::path("a::b", false)]
    #[case::keyword("mod", false)]
    #[case::wildcard("_", false)]
    #[case::non_ascii("vües", false)]
    fn test_module_name(#[case] name: &str, #[case] valid: bool) {
        match Generator::new(Some(name)) {
            Ok(_) => assert!(valid),
            Err(err) => {
                assert!(!valid);
                assert_eq!(err, CompileError::InvalidModuleName(name.into()));
            }
        }
    }

    #[test]
    fn test_generate_unsupported() {
        let err = generate(None, &[("t", "{{range .Items}}x{{end}}")]).unwrap_err();
        assert_eq!(err.kind(), "range");
    }
}
