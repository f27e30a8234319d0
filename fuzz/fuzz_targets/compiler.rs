#![no_main]

use arbitrary::Arbitrary;
use itertools::Itertools;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum Piece {
    Text(String),
    Field(Vec<String>),
    Pipe(Vec<String>, Vec<String>),
    Comment(String),
    Raw(String),
}

#[derive(Debug, Clone, Arbitrary)]
struct ArbitraryTemplate {
    pieces: Vec<Piece>,
}

impl ArbitraryTemplate {
    fn to_source(&self) -> String {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Text(text) => text.clone(),
                Piece::Field(path) => format!("{{{{.{}}}}}", path.join(".")),
                Piece::Pipe(path, stages) => {
                    format!("{{{{.{} | {}}}}}", path.join("."), stages.iter().join(" | "))
                }
                Piece::Comment(text) => format!("{{{{/* {} */}}}}", text),
                Piece::Raw(action) => format!("{{{{{}}}}}", action),
            })
            .join("")
    }
}

#[derive(Debug, Clone, Arbitrary)]
struct Context {
    raw_source: Option<String>,
    generated: Option<ArbitraryTemplate>,
    data: Vec<(String, String)>,
}

fuzz_target!(|context: Context| {
    let source = match (&context.raw_source, &context.generated) {
        (Some(raw), _) => raw.clone(),
        (_, Some(generated)) => generated.to_source(),
        _ => "".to_string(),
    };

    let engine = comtmpl_lang::Engine::default();
    let _ = engine.generate([("fuzz", source.as_str())], None);

    if let Ok(templates) = engine.compile_all([("fuzz", source.as_str())]) {
        let data = comtmpl_lang::Value::from_iter(context.data);
        let _ = templates.render_to_string("fuzz", &data);
    }
});
