use smallvec::SmallVec;

use crate::ast::{self, FieldId, IdentName, Span, TypeId};
use crate::error::Diag;

/// One comma-separated entry of a parameter list, before grouping.
///
/// A lone identifier is ambiguous until the whole list is seen: in
/// `(a, b int)` it is a name, in `(int, string)` it is a type.
#[derive(Clone, Debug)]
pub enum ParamDecl {
    /// A single identifier with nothing after it.
    Bare(IdentName),
    /// `name [...]Type`
    Named {
        name: IdentName,
        ellipsis_pos: Option<Span>,
        typ: TypeId,
    },
    /// `[...]Type` with no name.
    Anon {
        ellipsis_pos: Option<Span>,
        typ: TypeId,
    },
}

/// Applies Go's grouping rule and allocates the resulting fields.
///
/// If any entry carries both a name and a type, every bare identifier is a
/// name grouped onto the next typed entry (`a, b int`). Otherwise every
/// entry is a type and bare identifiers become named types.
pub fn resolve_param_list(
    arena: &mut ast::AstArena,
    params: Vec<(ParamDecl, Span)>,
) -> Result<Vec<FieldId>, Diag> {
    let named_form = params
        .iter()
        .any(|(p, _)| matches!(p, ParamDecl::Named { .. }));

    let mut out = Vec::with_capacity(params.len());

    if !named_form {
        for (param, span) in params {
            let (ellipsis_pos, typ) = match param {
                ParamDecl::Bare(name) => (None, named_type_from_ident(arena, name)),
                ParamDecl::Anon { ellipsis_pos, typ } => (ellipsis_pos, typ),
                ParamDecl::Named { .. } => unreachable!("checked above"),
            };
            out.push(alloc_field(arena, ast::ListRef::EMPTY, ellipsis_pos, typ, span));
        }
        return Ok(out);
    }

    let mut pending: SmallVec<[IdentName; 4]> = SmallVec::new();
    let mut pending_start: Option<u32> = None;

    for (param, span) in params {
        match param {
            ParamDecl::Bare(name) => {
                pending_start.get_or_insert(span.start);
                pending.push(name);
            }
            ParamDecl::Named {
                name,
                ellipsis_pos,
                typ,
            } => {
                pending.push(name);
                let names = arena.list_ident_names(pending.drain(..));
                let start = pending_start.take().unwrap_or(span.start);
                let span = Span {
                    start,
                    end: span.end,
                };
                out.push(alloc_field(arena, names, ellipsis_pos, typ, span));
            }
            ParamDecl::Anon { .. } => {
                return Err(Diag::parse(span, "mixed named and unnamed parameters"));
            }
        }
    }

    if let Some(last) = pending.last() {
        return Err(Diag::parse(last.pos, "missing parameter type"));
    }

    Ok(out)
}

fn alloc_field(
    arena: &mut ast::AstArena,
    names: ast::ListRef<IdentName>,
    ellipsis_pos: Option<Span>,
    typ: TypeId,
    span: Span,
) -> FieldId {
    arena.fields.alloc(
        ast::Field {
            names,
            ellipsis_pos,
            typ,
            tag: None,
            is_embed: false,
        },
        span,
    )
}

fn named_type_from_ident(arena: &mut ast::AstArena, name: IdentName) -> TypeId {
    arena.types.alloc(
        ast::Type::Named {
            pkg: None,
            name,
            args: ast::ListRef::EMPTY,
        },
        name.pos,
    )
}
