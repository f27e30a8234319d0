// Code generated by comtmpl. DO NOT EDIT.

pub fn render_index_html(funcs: &comtmpl_lang::Functions, writer: &mut dyn std::io::Write, data: &comtmpl_lang::Value) -> Result<(), comtmpl_lang::RenderError> {
    let _ = (funcs, data);
    // index.html:1
    writer.write_all("<html>\n  <head>\n    <title>".as_bytes())?;
    // index.html:3
    write!(writer, "{}", comtmpl_lang::eval_field(data, &["Title"])?)?;
    // index.html:3
    writer.write_all("</title>\n  </head>\n  <body>\n    <h1>".as_bytes())?;
    // index.html:6
    write!(writer, "{}", comtmpl_lang::eval_field(data, &["Title"])?)?;
    // index.html:6
    writer.write_all("</h1>\n    <p>Welcome, ".as_bytes())?;
    // index.html:7
    write!(writer, "{}", comtmpl_lang::eval_field(data, &["User", "Name"])?)?;
    // index.html:7
    writer.write_all("!</p>\n  </body>\n</html>\n".as_bytes())?;
    Ok(())
}

pub fn render_pipe_html(funcs: &comtmpl_lang::Functions, writer: &mut dyn std::io::Write, data: &comtmpl_lang::Value) -> Result<(), comtmpl_lang::RenderError> {
    let _ = (funcs, data);
    // pipe.html:1
    writer.write_all("<html>\n  <head>\n    <title>".as_bytes())?;
    // pipe.html:3
    {
        let value = comtmpl_lang::eval_field(data, &["Title"])?.clone();
        let value = funcs.call("upper", vec![value])?;
        write!(writer, "{}", value)?;
    }
    // pipe.html:3
    writer.write_all("</title>\n  </head>\n  <body>\n    <h1>".as_bytes())?;
    // pipe.html:6
    write!(writer, "{}", comtmpl_lang::eval_field(data, &["Title"])?)?;
    // pipe.html:6
    writer.write_all("</h1>\n    <p>Name length: ".as_bytes())?;
    // pipe.html:7
    {
        let value = comtmpl_lang::eval_field(data, &["User", "Name"])?.clone();
        let value = funcs.call("len", vec![value])?;
        write!(writer, "{}", value)?;
    }
    // pipe.html:7
    writer.write_all("</p>\n    <p>".as_bytes())?;
    // pipe.html:8
    {
        let value = comtmpl_lang::eval_field(data, &["User", "Description"])?.clone();
        let value = funcs.call("title", vec![value])?;
        write!(writer, "{}", value)?;
    }
    // pipe.html:8
    writer.write_all("</p>\n  </body>\n</html>\n".as_bytes())?;
    Ok(())
}

pub fn templates() -> comtmpl_lang::Templates {
    with_functions(comtmpl_lang::Functions::builtins())
}

pub fn with_functions(functions: comtmpl_lang::Functions) -> comtmpl_lang::Templates {
    comtmpl_lang::Templates::from_routines(
        functions,
        [
            ("index.html", render_index_html as comtmpl_lang::Routine),
            ("pipe.html", render_pipe_html as comtmpl_lang::Routine),
        ],
    )
}
