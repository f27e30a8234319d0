use comtmpl_lang::{Engine, Templates, Value};

const INDEX_HTML: &str = include_str!("../tests/templates/index.html");
const PIPE_HTML: &str = include_str!("../tests/templates/pipe.html");

fn main() {
    divan::main();
}

fn templates() -> Templates {
    Engine::default()
        .compile_all([("index.html", INDEX_HTML), ("pipe.html", PIPE_HTML)])
        .unwrap()
}

fn data() -> Value {
    Value::from_iter([
        ("Title", Value::from("Hello, World!")),
        (
            "User",
            Value::from_iter([
                ("Name", "John Doe"),
                ("Description", "This is a very long description about the user"),
            ]),
        ),
    ])
}

#[divan::bench(args = ["index.html", "pipe.html"])]
fn render(bencher: divan::Bencher, name: &str) {
    let templates = templates();
    let data = data();
    let mut buf = Vec::with_capacity(512);

    bencher.bench_local(|| {
        buf.clear();
        templates.render(name, &data, &mut buf).unwrap();
    });
}

#[divan::bench(name = "compile_all")]
fn compile_all() -> Templates {
    templates()
}

#[divan::bench(name = "generate")]
fn generate() -> String {
    Engine::default()
        .generate([("index.html", INDEX_HTML), ("pipe.html", PIPE_HTML)], None)
        .unwrap()
}

#[divan::bench(name = "resolve_field")]
fn resolve_field(bencher: divan::Bencher) {
    let data = data();
    bencher.bench_local(|| comtmpl_lang::eval_field(&data, &["User", "Name"]).map(|v| v.is_null()));
}
