//! Contract extractor: walks a parsed Go file and builds the descriptor
//! model for every package-level interface.

use go_decl_parser::ast::{
    self, AstArena, FieldId, FieldList, FuncDeclId, IdentName, ImportName, InterfaceElem, ListRef,
    Results, SignatureId, Type, TypeId, TypeParamsId, TypeSpecId,
};
use go_decl_parser::walk::{walk_file, Visitor};
use go_decl_parser::ParsedFile;
use smallvec::smallvec;
use tracing::{debug, warn};

use crate::model::{
    Contract, InterfaceDescriptor, MethodDescriptor, MockReference, ParameterDescriptor, Warning,
};
use crate::resolve::{
    self, ChanDir, Descriptors, FieldExpression, Shape, TypeExpression, UnionTerm,
};

/// Extracts every interface declared at package level in `parsed`.
///
/// Never fails: members that cannot be represented are recorded as
/// [`Warning`]s and either skipped (embeds) or given placeholder type text.
pub fn extract(parsed: &ParsedFile<'_>) -> Contract {
    let mut extractor = Extractor {
        parsed,
        interfaces: Vec::new(),
        warnings: Vec::new(),
    };
    walk_file(&parsed.arena, &parsed.file, &mut extractor);

    Contract {
        package: parsed.name(parsed.file.name).to_string(),
        imports: import_specs(parsed),
        interfaces: extractor.interfaces,
        warnings: extractor.warnings,
    }
}

struct Extractor<'p, 'src> {
    parsed: &'p ParsedFile<'src>,
    interfaces: Vec<InterfaceDescriptor>,
    warnings: Vec<Warning>,
}

impl<'p> Visitor<'p> for Extractor<'p, '_> {
    fn visit_type_spec(&mut self, a: &'p AstArena, id: TypeSpecId) {
        let spec = a.type_specs[id];
        let Type::Interface { elems } = a.types[unparen(a, spec.typ)] else {
            return;
        };
        let type_set = a.interface_elems(elems).iter().find_map(|elem| match *elem {
            InterfaceElem::Embed { typ } if is_type_set_term(self.parsed, typ) => Some(typ),
            _ => None,
        });
        if let Some(term) = type_set {
            let p = self.parsed;
            let name = p.name(spec.name).to_string();
            let text = p.text(a.types.span(term));
            self.warn(
                &name,
                text,
                format!("type set term `{text}` makes this a constraint; interface skipped"),
            );
            return;
        }
        let descriptor = self.interface(&spec, elems);
        self.interfaces.push(descriptor);
    }

    // Signatures of free functions and methods never declare interfaces.
    fn visit_func_decl(&mut self, _: &'p AstArena, _: FuncDeclId) {}
}

impl Extractor<'_, '_> {
    fn interface(&mut self, spec: &ast::TypeSpec, elems: ListRef<InterfaceElem>) -> InterfaceDescriptor {
        let p = self.parsed;
        let name = p.name(spec.name).to_string();
        debug!(interface = %name, "extracting interface");

        let type_params = match spec.type_params {
            Some(id) => self.type_params(&name, id),
            None => Vec::new(),
        };

        let mut embeds = Vec::new();
        let mut methods = Vec::new();
        for elem in p.arena.interface_elems(elems) {
            match *elem {
                InterfaceElem::Method { name: method, sig } => {
                    methods.push(self.method(&name, method, sig));
                }
                InterfaceElem::Embed { typ } => match embed_reference(p, typ) {
                    Some(reference) => embeds.push(reference),
                    None => {
                        let text = p.text(p.arena.types.span(typ));
                        self.warn(&name, text, format!("unsupported embedded type `{text}`; skipped"));
                    }
                },
            }
        }

        InterfaceDescriptor {
            name,
            type_params,
            embeds,
            methods,
        }
    }

    fn type_params(&mut self, iface: &str, id: TypeParamsId) -> Vec<ParameterDescriptor> {
        let p = self.parsed;
        let a = &p.arena;
        let mut out = Vec::new();
        for decl in a.type_param_decl_ids(a.type_params[id].params) {
            let decl = a.type_param_decls[*decl];
            let names = ident_strings(p, decl.names);
            let constraint = lower(p, decl.constraint);
            out.extend(self.resolve_group(iface, "type parameters", &constraint, &names));
        }
        out
    }

    fn method(&mut self, iface: &str, name: IdentName, sig: SignatureId) -> MethodDescriptor {
        let p = self.parsed;
        let method = p.name(name).to_string();
        let signature = p.arena.signatures[sig];

        let mut params = Vec::new();
        for field in field_expressions(p, signature.params) {
            for mut param in self.resolve_group(iface, &method, &field.typ, &field.names) {
                if param.name.as_deref() == Some("_") {
                    param.name = None;
                }
                params.push(param);
            }
        }

        let mut results = Vec::new();
        for field in result_expressions(p, signature.results) {
            results.extend(self.resolve_group(iface, &method, &field.typ, &field.names));
        }

        debug!(
            interface = iface,
            method = %method,
            params = params.len(),
            results = results.len(),
            "extracted method"
        );
        MethodDescriptor {
            name: method,
            params,
            results,
        }
    }

    /// Resolves one parameter group, substituting placeholder type text on failure.
    fn resolve_group(
        &mut self,
        iface: &str,
        member: &str,
        expr: &TypeExpression,
        names: &[String],
    ) -> Descriptors {
        match resolve::resolve(expr, names) {
            Ok(descriptors) => descriptors,
            Err(err) => {
                let placeholder = err.placeholder();
                self.warn(iface, member, err.to_string());
                if names.is_empty() {
                    smallvec![ParameterDescriptor::anonymous(placeholder)]
                } else {
                    names
                        .iter()
                        .map(|n| ParameterDescriptor::named(n.as_str(), placeholder.clone()))
                        .collect()
                }
            }
        }
    }

    fn warn(&mut self, iface: &str, member: &str, message: String) {
        warn!(interface = iface, member, "{message}");
        self.warnings.push(Warning {
            interface: iface.to_string(),
            member: member.to_string(),
            message,
        });
    }
}

fn unparen(a: &AstArena, mut id: TypeId) -> TypeId {
    while let Type::Paren { typ } = a.types[id] {
        id = typ;
    }
    id
}

fn ident_strings(p: &ParsedFile<'_>, names: ListRef<IdentName>) -> Vec<String> {
    p.arena
        .ident_names(names)
        .iter()
        .map(|n| p.name(*n).to_string())
        .collect()
}

/// `Foo`, `pkg.Foo`, `*Foo` and `*pkg.Foo`; anything else has no mock.
/// Predeclared types that are not interfaces, plus `comparable`.
const PREDECLARED_NON_INTERFACE: &[&str] = &[
    "bool", "byte", "comparable", "complex64", "complex128", "float32", "float64", "int",
    "int8", "int16", "int32", "int64", "rune", "string", "uint", "uint8", "uint16", "uint32",
    "uint64", "uintptr",
];

/// An embedded element that restricts the type set (`~int | string`, `int`,
/// `[]byte`), so the interface is usable only as a constraint.
fn is_type_set_term(p: &ParsedFile<'_>, id: TypeId) -> bool {
    let a = &p.arena;
    match a.types[unparen(a, id)] {
        Type::Union { .. } => true,
        Type::Named { pkg: None, name, .. } => PREDECLARED_NON_INTERFACE.contains(&p.name(name)),
        Type::Named { .. } | Type::Pointer { .. } | Type::Interface { .. } => false,
        _ => true,
    }
}

fn embed_reference(p: &ParsedFile<'_>, id: TypeId) -> Option<MockReference> {
    let a = &p.arena;
    let (target, pointer) = match a.types[unparen(a, id)] {
        Type::Pointer { elem } => (unparen(a, elem), true),
        _ => (unparen(a, id), false),
    };
    match a.types[target] {
        Type::Named { pkg, name, args } if args.is_empty() => Some(MockReference {
            namespace: pkg.map(|ns| p.name(ns).to_string()),
            interface: p.name(name).to_string(),
            pointer,
        }),
        _ => None,
    }
}

fn field_expression(p: &ParsedFile<'_>, id: FieldId) -> FieldExpression {
    let field = p.arena.fields[id];
    let typ = lower(p, field.typ);
    FieldExpression {
        names: ident_strings(p, field.names),
        typ: match field.ellipsis_pos {
            Some(_) => TypeExpression::Variadic(Box::new(typ)),
            None => typ,
        },
    }
}

fn field_expressions(p: &ParsedFile<'_>, list: FieldList) -> Vec<FieldExpression> {
    p.arena
        .fields_list(list.fields)
        .iter()
        .map(|f| field_expression(p, *f))
        .collect()
}

fn result_expressions(p: &ParsedFile<'_>, results: Option<Results>) -> Vec<FieldExpression> {
    match results {
        None => Vec::new(),
        Some(Results::Params(list)) => field_expressions(p, list),
        Some(Results::Type(typ)) => vec![FieldExpression {
            names: Vec::new(),
            typ: lower(p, typ),
        }],
    }
}

/// Lowers a syntax tree type into the resolver's closed expression set.
fn lower(p: &ParsedFile<'_>, id: TypeId) -> TypeExpression {
    let a = &p.arena;
    match a.types[id] {
        Type::Named { pkg, name, args } => {
            let base = match pkg {
                Some(ns) => TypeExpression::Qualified {
                    namespace: p.name(ns).to_string(),
                    name: p.name(name).to_string(),
                },
                None => TypeExpression::Identifier(p.name(name).to_string()),
            };
            if args.is_empty() {
                base
            } else {
                TypeExpression::Generic {
                    base: Box::new(base),
                    args: a.types_list(args).iter().map(|t| lower(p, *t)).collect(),
                }
            }
        }
        Type::Pointer { elem } => TypeExpression::Pointer(Box::new(lower(p, elem))),
        Type::Array { len, elem } => TypeExpression::Array {
            len: p.text(len).to_string(),
            elem: Box::new(lower(p, elem)),
        },
        Type::Slice { elem } => TypeExpression::Slice(Box::new(lower(p, elem))),
        Type::Map { key, val } => TypeExpression::Map {
            key: Box::new(lower(p, key)),
            value: Box::new(lower(p, val)),
        },
        Type::Chan { dir, elem } => TypeExpression::Chan {
            dir: match dir {
                ast::ChanDir::Both => ChanDir::Both,
                ast::ChanDir::Send => ChanDir::Send,
                ast::ChanDir::Recv => ChanDir::Recv,
            },
            elem: Box::new(lower(p, elem)),
        },
        Type::Func { sig } => {
            let sig = a.signatures[sig];
            TypeExpression::Function {
                params: field_expressions(p, sig.params),
                results: result_expressions(p, sig.results),
            }
        }
        Type::Interface { .. } => TypeExpression::InlineContract,
        Type::Paren { typ } => lower(p, typ),
        Type::Union { terms } => TypeExpression::Union(
            a.type_terms(terms)
                .iter()
                .map(|t| UnionTerm {
                    tilde: t.tilde,
                    typ: lower(p, t.typ),
                })
                .collect(),
        ),
        Type::Struct { .. } => TypeExpression::Unsupported(Shape::Struct),
    }
}

/// Import specs as written: `"path"` or `name "path"`.
fn import_specs(p: &ParsedFile<'_>) -> Vec<String> {
    p.imports()
        .iter()
        .map(|spec| {
            let path = p.text(spec.path);
            match spec.name {
                None => path.to_string(),
                Some(ImportName::Dot(_)) => format!(". {path}"),
                Some(ImportName::Blank(_)) => format!("_ {path}"),
                Some(ImportName::Name(name)) => format!("{} {path}", p.name(name)),
            }
        })
        .collect()
}
