//! Type expression resolver.
//!
//! Turns a [`TypeExpression`] plus the names sharing it into
//! [`ParameterDescriptor`]s carrying canonical Go type text. Pure and
//! deterministic: identical inputs always render byte-identical text.

use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::model::ParameterDescriptor;

/// Placeholder text for anonymous interface literals.
pub const ANY_CONTRACT: &str = "interface{}";

pub type Descriptors = SmallVec<[ParameterDescriptor; 2]>;

/// Closed set of type shapes the resolver understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpression {
    Identifier(String),
    Qualified { namespace: String, name: String },
    Pointer(Box<TypeExpression>),
    Slice(Box<TypeExpression>),
    /// `[len]T`; the length expression is kept as written.
    Array { len: String, elem: Box<TypeExpression> },
    Map { key: Box<TypeExpression>, value: Box<TypeExpression> },
    Chan { dir: ChanDir, elem: Box<TypeExpression> },
    Variadic(Box<TypeExpression>),
    Function { params: Vec<FieldExpression>, results: Vec<FieldExpression> },
    /// Anonymous `interface { ... }` literal.
    InlineContract,
    Generic { base: Box<TypeExpression>, args: Vec<TypeExpression> },
    /// Constraint type set: `~int | string`.
    Union(Vec<UnionTerm>),
    Unsupported(Shape),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

/// A parameter group inside a function type: `a, b int` or `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExpression {
    pub names: Vec<String>,
    pub typ: TypeExpression,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionTerm {
    pub tilde: bool,
    pub typ: TypeExpression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `struct { ... }` literal
    Struct,
}

impl Shape {
    /// Upper-case tag used in placeholder type text.
    pub fn tag(self) -> &'static str {
        match self {
            Shape::Struct => "STRUCT",
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Shape::Struct => "anonymous struct type",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unsupported type expression: {shape}")]
    Unsupported { shape: Shape },
}

impl ResolveError {
    /// Type text that cannot be mistaken for a real Go type.
    pub fn placeholder(&self) -> String {
        match self {
            ResolveError::Unsupported { shape } => format!("UNSUPPORTED_{}", shape.tag()),
        }
    }
}

/// Resolves `expr` for the parameter names that share it.
///
/// No names gives one anonymous descriptor; otherwise one descriptor per
/// name, in order, all with the same type text.
pub fn resolve<S: AsRef<str>>(expr: &TypeExpression, names: &[S]) -> Result<Descriptors, ResolveError> {
    let type_text = render(expr)?;
    if names.is_empty() {
        return Ok(smallvec::smallvec![ParameterDescriptor::anonymous(type_text)]);
    }
    Ok(names
        .iter()
        .map(|n| ParameterDescriptor::named(n.as_ref(), type_text.clone()))
        .collect())
}

/// Canonical Go text for `expr`.
pub fn render(expr: &TypeExpression) -> Result<String, ResolveError> {
    let mut out = String::new();
    render_into(expr, &mut out)?;
    Ok(out)
}

fn render_into(expr: &TypeExpression, out: &mut String) -> Result<(), ResolveError> {
    match expr {
        TypeExpression::Identifier(name) => out.push_str(name),
        TypeExpression::Qualified { namespace, name } => {
            out.push_str(namespace);
            out.push('.');
            out.push_str(name);
        }
        TypeExpression::Pointer(inner) => {
            out.push('*');
            render_into(inner, out)?;
        }
        TypeExpression::Slice(inner) => {
            out.push_str("[]");
            render_into(inner, out)?;
        }
        TypeExpression::Array { len, elem } => {
            out.push('[');
            out.push_str(len);
            out.push(']');
            render_into(elem, out)?;
        }
        TypeExpression::Map { key, value } => {
            out.push_str("map[");
            render_into(key, out)?;
            out.push(']');
            render_into(value, out)?;
        }
        TypeExpression::Chan { dir, elem } => {
            out.push_str(match dir {
                ChanDir::Both => "chan ",
                ChanDir::Send => "chan<- ",
                ChanDir::Recv => "<-chan ",
            });
            render_into(elem, out)?;
        }
        TypeExpression::Variadic(inner) => {
            out.push_str("...");
            render_into(inner, out)?;
        }
        TypeExpression::Function { params, results } => render_function(params, results, out)?,
        TypeExpression::InlineContract => out.push_str(ANY_CONTRACT),
        TypeExpression::Generic { base, args } => {
            render_into(base, out)?;
            out.push('[');
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_into(arg, out)?;
            }
            out.push(']');
        }
        TypeExpression::Union(terms) => {
            for (i, term) in terms.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                if term.tilde {
                    out.push('~');
                }
                render_into(&term.typ, out)?;
            }
        }
        TypeExpression::Unsupported(shape) => {
            return Err(ResolveError::Unsupported { shape: *shape });
        }
    }
    Ok(())
}

fn render_function(
    params: &[FieldExpression],
    results: &[FieldExpression],
    out: &mut String,
) -> Result<(), ResolveError> {
    out.push_str("func(");
    let mut first = true;
    for field in params {
        for param in resolve(&field.typ, field.names.as_slice())? {
            if !first {
                out.push_str(", ");
            }
            first = false;
            out.push_str(&param.type_text);
        }
    }
    out.push(')');

    let mut expanded: Vec<ParameterDescriptor> = Vec::new();
    for field in results {
        expanded.extend(resolve(&field.typ, field.names.as_slice())?);
    }

    match expanded.as_slice() {
        [] => {}
        [ParameterDescriptor {
            name: None,
            type_text,
        }] => {
            out.push(' ');
            out.push_str(type_text);
        }
        _ => {
            out.push_str(" (");
            for (i, result) in expanded.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                if let Some(name) = &result.name {
                    out.push_str(name);
                    out.push(' ');
                }
                out.push_str(&result.type_text);
            }
            out.push(')');
        }
    }
    Ok(())
}
