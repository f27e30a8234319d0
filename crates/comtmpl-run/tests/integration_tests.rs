use assert_cmd::cargo;
use rstest::rstest;
use scopeguard::defer;
use std::io::Write;
use std::{fs::File, path::PathBuf};

pub fn create_file(name: &str, content: &str) -> PathBuf {
    let temp_dir = std::env::temp_dir().join("comtmpl-run-tests");
    std::fs::create_dir_all(&temp_dir).expect("Failed to create temp dir");
    let temp_file_path = temp_dir.join(name);
    let mut file = File::create(&temp_file_path).expect("Failed to create temp file");
    file.write_all(content.as_bytes()).expect("Failed to write to temp file");

    temp_file_path
}

#[test]
fn test_cli_render_with_stdin() -> Result<(), Box<dyn std::error::Error>> {
    let template = create_file("stdin.html", "<h1>{{.Title | upper}}</h1>");
    let template_clone = template.clone();

    defer! {
        if template_clone.exists() {
            std::fs::remove_file(&template_clone).expect("Failed to delete temp file");
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("comtmpl");
    let assert = cmd
        .arg("render")
        .arg("-t")
        .arg("stdin.html")
        .arg(&template)
        .write_stdin(r#"{"Title": "hello"}"#)
        .assert();
    assert.success().code(0).stdout("<h1>HELLO</h1>");

    Ok(())
}

#[rstest]
#[case::field("field.html", "Hello {{.User.Name}}!", r#"{"User": {"Name": "John"}}"#, "Hello John!")]
#[case::missing("missing.html", "Hello {{.User.Name}}!", "{}", "Hello !")]
#[case::len("len.html", "{{.Items | len}} items", r#"{"Items": [1, 2, 3]}"#, "3 items")]
#[case::printf("printf.html", "{{printf \"%s=%d\" .Key .Value}}", r#"{"Key": "a", "Value": 1}"#, "a=1")]
fn test_cli_render_with_data_file(
    #[case] name: &str,
    #[case] template: &str,
    #[case] data: &str,
    #[case] expected: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let template_path = create_file(name, template);
    let data_path = create_file(&format!("{}.json", name), data);
    let (template_clone, data_clone) = (template_path.clone(), data_path.clone());

    defer! {
        for path in [&template_clone, &data_clone] {
            if path.exists() {
                std::fs::remove_file(path).expect("Failed to delete temp file");
            }
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("comtmpl");
    let assert = cmd
        .args(["render", "-t", name, "-d"])
        .arg(&data_path)
        .arg(&template_path)
        .assert();
    assert.success().code(0).stdout(expected.to_string());

    Ok(())
}

#[test]
fn test_cli_render_unknown_template() -> Result<(), Box<dyn std::error::Error>> {
    let template = create_file("known.html", "x");
    let template_clone = template.clone();

    defer! {
        if template_clone.exists() {
            std::fs::remove_file(&template_clone).expect("Failed to delete temp file");
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("comtmpl");
    let assert = cmd
        .args(["render", "-t", "unknown.html"])
        .arg(&template)
        .write_stdin("")
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("Template \"unknown.html\" not found"));
    assert!(stderr.contains("Available templates: known.html"));

    Ok(())
}

#[test]
fn test_cli_generate() -> Result<(), Box<dyn std::error::Error>> {
    let template = create_file("gen.html", "<p>{{.Name}}</p>");
    let output = std::env::temp_dir().join("comtmpl-run-tests").join("gen_views.rs");
    let (template_clone, output_clone) = (template.clone(), output.clone());

    defer! {
        for path in [&template_clone, &output_clone] {
            if path.exists() {
                std::fs::remove_file(path).expect("Failed to delete temp file");
            }
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("comtmpl");
    cmd.args(["generate", "--module-name", "views", "-o"])
        .arg(&output)
        .arg(&template)
        .assert()
        .success()
        .code(0);

    let source = std::fs::read_to_string(&output)?;
    assert!(source.starts_with("// Code generated by comtmpl. DO NOT EDIT."));
    assert!(source.contains("pub mod views {"));
    assert!(source.contains("pub fn render_gen_html("));

    Ok(())
}

#[test]
fn test_cli_generate_invalid_module_name() -> Result<(), Box<dyn std::error::Error>> {
    let template = create_file("gen_invalid.html", "x");
    let template_clone = template.clone();

    defer! {
        if template_clone.exists() {
            std::fs::remove_file(&template_clone).expect("Failed to delete temp file");
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("comtmpl");
    let assert = cmd
        .args(["generate", "--module-name", "my views"])
        .arg(&template)
        .assert()
        .failure();

    let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
    assert!(stderr.contains("Invalid module name"));

    Ok(())
}

#[rstest]
#[case::valid("valid.html", "Hello {{.Name}}", true)]
#[case::unsupported("unsupported.html", "{{range .Items}}{{.}}{{end}}", false)]
#[case::unclosed("unclosed.html", "Hello {{.Name", false)]
fn test_cli_check(#[case] name: &str, #[case] template: &str, #[case] ok: bool) -> Result<(), Box<dyn std::error::Error>> {
    let template_path = create_file(name, template);
    let template_clone = template_path.clone();

    defer! {
        if template_clone.exists() {
            std::fs::remove_file(&template_clone).expect("Failed to delete temp file");
        }
    }

    let mut cmd = cargo::cargo_bin_cmd!("comtmpl");
    let assert = cmd.arg("check").arg(&template_path).assert();

    if ok {
        assert.success().code(0);
    } else {
        assert.failure();
    }

    Ok(())
}
