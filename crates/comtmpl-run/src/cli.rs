use clap::{Parser, Subcommand};
use comtmpl_lang::{Engine, Value};
use itertools::Itertools;
use miette::miette;
use miette::{IntoDiagnostic, NamedSource};
use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::{fs, path::Path, path::PathBuf};

#[derive(Parser, Debug)]
#[command(name = "comtmpl")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "Examples:\n\n\
    To generate Rust source for templates:\n\
    $ comtmpl generate --module-name views templates/*.html -o src/views.rs\n\n\
    To render a template with JSON data:\n\
    $ comtmpl render -t index.html -d data.json templates/*.html\n\n\
    To check templates:\n\
    $ comtmpl check templates/*.html")]
#[command(
    about = "comtmpl compiles Go-style text templates into render routines.",
    long_about = None
)]
pub struct Cli {
    #[clap(subcommand)]
    commands: Commands,

    #[command(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity,
}

#[derive(Clone, Debug, clap::Args)]
struct TemplateArgs {
    /// Left delimiter of actions
    #[arg(long, default_value = "{{")]
    left_delim: String,

    /// Right delimiter of actions
    #[arg(long, default_value = "}}")]
    right_delim: String,

    /// Template files. Templates are named after the file name.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate Rust source with one render routine per template
    Generate {
        /// Wrap the generated items in `pub mod <NAME>`
        #[arg(short, long, value_name = "NAME")]
        module_name: Option<String>,

        /// Output to the specified file
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output_file: Option<PathBuf>,

        #[clap(flatten)]
        templates: TemplateArgs,
    },
    /// Compile templates and render one of them
    Render {
        /// Name of the template to render
        #[arg(short, long)]
        template: String,

        /// JSON file with the data. Reads stdin when omitted.
        #[arg(short, long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Fail when a function reports a secondary error instead of discarding it
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Output to the specified file
        #[arg(short = 'o', long = "output", value_name = "FILE")]
        output_file: Option<PathBuf>,

        #[clap(flatten)]
        templates: TemplateArgs,
    },
    /// Check that templates parse and compile
    Check {
        #[clap(flatten)]
        templates: TemplateArgs,
    },
}

impl Cli {
    pub fn run(&self) -> miette::Result<()> {
        match &self.commands {
            Commands::Generate {
                module_name,
                output_file,
                templates,
            } => {
                let engine = create_engine(templates, false);
                let sources = read_templates(&templates.files)?;
                let source = engine
                    .generate(
                        sources.iter().map(|(name, source)| (name.as_str(), source.as_str())),
                        module_name.as_deref(),
                    )
                    .map_err(|e| report(e, &sources))?;

                write_output(output_file.as_deref(), source.as_bytes())
            }
            Commands::Render {
                template,
                data,
                strict,
                output_file,
                templates,
            } => {
                let engine = create_engine(templates, *strict);
                let sources = read_templates(&templates.files)?;
                let compiled = engine
                    .compile_all(sources.iter().map(|(name, source)| (name.as_str(), source.as_str())))
                    .map_err(|e| report(e, &sources))?;

                if !compiled.contains(template) {
                    let names = compiled.names().sorted().join(", ");
                    return Err(miette!(
                        help = format!("Available templates: {}", names),
                        "Template \"{}\" not found",
                        template
                    ));
                }

                let data = read_data(data.as_deref())?;

                let mut output = Vec::new();
                compiled.render(template, &data, &mut output).into_diagnostic()?;

                write_output(output_file.as_deref(), &output)
            }
            Commands::Check { templates } => {
                let engine = create_engine(templates, false);
                let sources = read_templates(&templates.files)?;

                for (name, source) in &sources {
                    engine.compile(name, source).map_err(|e| report(e, &sources))?;
                    log::info!("{}: ok", name);
                }

                Ok(())
            }
        }
    }
}

fn create_engine(args: &TemplateArgs, strict: bool) -> Engine {
    let mut engine = Engine::default();
    engine.set_delimiters(&args.left_delim, &args.right_delim);
    engine.set_surface_secondary_errors(strict);
    engine
}

/// Reads every file as `(file name, contents)`.
fn read_templates(files: &[PathBuf]) -> miette::Result<Vec<(String, String)>> {
    files
        .iter()
        .map(|file| {
            if !file.exists() {
                return Err(miette!("File not found: {}", file.display()));
            }

            let name = file
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .ok_or_else(|| miette!("Invalid template path: {}", file.display()))?;
            let content = fs::read_to_string(file).into_diagnostic()?;
            Ok((name, content))
        })
        .collect()
}

fn read_data(data: Option<&Path>) -> miette::Result<Value> {
    let json = match data {
        Some(path) => fs::read_to_string(path).into_diagnostic()?,
        None if io::stdin().is_terminal() => return Ok(Value::Null),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).into_diagnostic()?;
            input
        }
    };

    if json.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str::<serde_json::Value>(&json)
        .map(Value::from)
        .into_diagnostic()
}

fn write_output(output_file: Option<&Path>, content: &[u8]) -> miette::Result<()> {
    let stdout = io::stdout();
    let mut handle: Box<dyn Write> = if let Some(output_file) = output_file {
        let file = fs::File::create(output_file).into_diagnostic()?;
        Box::new(BufWriter::new(file))
    } else {
        Box::new(BufWriter::new(stdout.lock()))
    };

    handle.write_all(content).into_diagnostic()?;
    handle.flush().into_diagnostic()
}

/// Attaches the failing file to the diagnostic so the report shows its name.
fn report(err: comtmpl_lang::Error, sources: &[(String, String)]) -> miette::Report {
    let source = sources
        .iter()
        .find(|(name, _)| name == err.template.as_str())
        .map(|(name, source)| NamedSource::new(name, source.clone()));

    match source {
        Some(source) => miette::Report::new(err).with_source_code(source),
        None => miette::Report::new(err),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use scopeguard::defer;
    use std::fs::File;

    use super::*;

    fn create_file(name: &str, content: &str) -> PathBuf {
        let temp_file_path = std::env::temp_dir().join(name);
        let mut file = File::create(&temp_file_path).expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");

        temp_file_path
    }

    #[rstest]
    #[case::generate(vec!["comtmpl", "generate", "-m", "views", "a.html"])]
    #[case::render(vec!["comtmpl", "render", "-t", "a.html", "-d", "data.json", "a.html", "b.html"])]
    #[case::check(vec!["comtmpl", "check", "--left-delim", "[[", "--right-delim", "]]", "a.html"])]
    fn test_cli_parse(#[case] args: Vec<&str>) {
        assert!(Cli::try_parse_from(args).is_ok());
    }

    #[test]
    fn test_cli_requires_files() {
        assert!(Cli::try_parse_from(["comtmpl", "check"]).is_err());
    }

    #[test]
    fn test_read_templates_uses_file_names() {
        let path = create_file("comtmpl_cli_read.html", "x");
        let path_clone = path.clone();

        defer! {
            if path_clone.exists() {
                std::fs::remove_file(&path_clone).expect("Failed to delete temp file");
            }
        }

        let sources = read_templates(&[path]).unwrap();
        assert_eq!(sources, vec![("comtmpl_cli_read.html".to_string(), "x".to_string())]);
    }

    #[test]
    fn test_read_templates_missing_file() {
        assert!(read_templates(&[PathBuf::from("/nonexistent/comtmpl.html")]).is_err());
    }

    #[test]
    fn test_read_data_from_file() {
        let path = create_file("comtmpl_cli_data.json", r#"{"Name": "John", "Tags": ["a"]}"#);
        let path_clone = path.clone();

        defer! {
            if path_clone.exists() {
                std::fs::remove_file(&path_clone).expect("Failed to delete temp file");
            }
        }

        let data = read_data(Some(path.as_path())).unwrap();
        assert_eq!(
            data,
            Value::from_iter([("Name", Value::from("John")), ("Tags", Value::from(vec!["a"]))])
        );
    }

    #[test]
    fn test_check_reports_unsupported() {
        let path = create_file("comtmpl_cli_check.html", "{{if .X}}x{{end}}");
        let path_clone = path.clone();

        defer! {
            if path_clone.exists() {
                std::fs::remove_file(&path_clone).expect("Failed to delete temp file");
            }
        }

        let cli = Cli::try_parse_from(["comtmpl".into(), "check".into(), path.into_os_string()]).unwrap();
        let err = cli.run().unwrap_err();

        assert!(err.to_string().contains("Unsupported if"));
    }
}
