//! Prints a [`GoFile`] as gofmt-style Go source.

use std::fmt::{self, Write};

use thiserror::Error;

use crate::codegen::{Assertion, GoFile, Item, MethodImpl, MockStruct, Param, Stmt, TypeParam};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{context}: empty type text")]
    EmptyType { context: String },
    #[error("{context}: empty name")]
    EmptyName { context: String },
    #[error(transparent)]
    Fmt(#[from] fmt::Error),
}

pub fn render(file: &GoFile) -> Result<String, RenderError> {
    let mut out = String::new();

    if let Some(banner) = &file.banner {
        writeln!(out, "{}", banner.trim_end())?;
        writeln!(out)?;
    }
    writeln!(out, "package {}", file.package)?;

    if !file.imports.is_empty() {
        writeln!(out)?;
        writeln!(out, "import (")?;
        for spec in &file.imports {
            writeln!(out, "\t{spec}")?;
        }
        writeln!(out, ")")?;
    }

    let mut prev: Option<&Item> = None;
    for item in &file.items {
        // consecutive `var _ I = ...` lines stay together
        let grouped = matches!(
            (prev, item),
            (Some(Item::Assertion(a)), Item::Assertion(b)) if a.type_params.is_empty() && b.type_params.is_empty()
        );
        if !grouped {
            writeln!(out)?;
        }
        match item {
            Item::MockStruct(s) => mock_struct(&mut out, s)?,
            Item::Assertion(a) => assertion(&mut out, a)?,
            Item::Method(m) => method(&mut out, m)?,
        }
        prev = Some(item);
    }

    Ok(out)
}

fn type_param_decl(params: &[TypeParam], context: &str) -> Result<String, RenderError> {
    if params.is_empty() {
        return Ok(String::new());
    }
    let mut out = String::from("[");
    for (i, p) in params.iter().enumerate() {
        non_empty_type(&p.constraint, || format!("{context}: type parameter {}", p.name))?;
        if i > 0 {
            out.push_str(", ");
        }
        write!(out, "{} {}", p.name, p.constraint)?;
    }
    out.push(']');
    Ok(out)
}

fn type_args<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    let names: Vec<_> = names.into_iter().collect();
    if names.is_empty() {
        String::new()
    } else {
        format!("[{}]", names.join(", "))
    }
}

fn non_empty_type(typ: &str, context: impl FnOnce() -> String) -> Result<(), RenderError> {
    if typ.trim().is_empty() {
        return Err(RenderError::EmptyType { context: context() });
    }
    Ok(())
}

fn mock_struct(out: &mut String, s: &MockStruct) -> Result<(), RenderError> {
    if s.name.is_empty() {
        return Err(RenderError::EmptyName {
            context: format!("mock for {}", s.interface),
        });
    }
    writeln!(out, "// {} mocks the {} interface", s.name, s.interface)?;
    writeln!(
        out,
        "type {}{} struct {{",
        s.name,
        type_param_decl(&s.type_params, &s.name)?
    )?;
    for embed in &s.embeds {
        writeln!(out, "\t{embed}")?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn assertion(out: &mut String, a: &Assertion) -> Result<(), RenderError> {
    if a.type_params.is_empty() {
        writeln!(out, "var _ {} = &{}{{}}", a.interface, a.mock)?;
        return Ok(());
    }
    let args = type_args(a.type_params.iter().map(|p| p.name.as_str()));
    writeln!(out, "func _{}() {{", type_param_decl(&a.type_params, &a.mock)?)?;
    writeln!(out, "\tvar _ {}{args} = &{}{args}{{}}", a.interface, a.mock)?;
    writeln!(out, "}}")?;
    Ok(())
}

fn param_list(params: &[Param], context: &str) -> Result<String, RenderError> {
    let mut out = String::new();
    for (i, p) in params.iter().enumerate() {
        non_empty_type(&p.typ, || format!("{context}: parameter {}", p.name))?;
        if i > 0 {
            out.push_str(", ");
        }
        write!(out, "{} {}", p.name, p.typ)?;
    }
    Ok(out)
}

fn method(out: &mut String, m: &MethodImpl) -> Result<(), RenderError> {
    let context = format!("{}.{}", m.mock, m.name);
    let params = param_list(&m.params, &context)?;
    let results = match param_list(&m.results, &context)? {
        r if r.is_empty() => r,
        r => format!(" ({r})"),
    };
    let recv_args = type_args(m.type_args.iter().map(String::as_str));

    writeln!(out, "// {} mocks the {} method", m.name, m.name)?;
    writeln!(
        out,
        "func ({} *{}{recv_args}) {}({params}){results} {{",
        m.receiver, m.mock, m.name
    )?;
    for stmt in &m.body {
        statement(out, stmt)?;
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn statement(out: &mut String, stmt: &Stmt) -> Result<(), RenderError> {
    match stmt {
        Stmt::Record {
            receiver,
            args,
            into,
        } => {
            let call = format!("{receiver}.Called({})", args.join(", "));
            match into {
                Some(var) => writeln!(out, "\t{var} := {call}")?,
                None => writeln!(out, "\t{call}")?,
            }
        }
        Stmt::BindResult {
            from,
            index,
            slot,
            typ,
        } => {
            let message = go_quote(&format!(
                "incorrect type supplied for return value [{index}], expected {typ}"
            ));
            writeln!(out)?;
            writeln!(out, "\tif {from}.Get({index}) != nil {{")?;
            writeln!(out, "\t\targOk := false")?;
            writeln!(out, "\t\t{slot}, argOk = {from}.Get({index}).({typ})")?;
            writeln!(out, "\t\tif !argOk {{")?;
            writeln!(out, "\t\t\tpanic({message})")?;
            writeln!(out, "\t\t}}")?;
            writeln!(out, "\t}}")?;
        }
        Stmt::Return { values } => {
            writeln!(out)?;
            writeln!(out, "\treturn {}", values.join(", "))?;
        }
    }
    Ok(())
}

/// Go interpreted string literal for `s`.
fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
