use go_decl_parser::ast::*;
use go_decl_parser::{parse_source, ParsedFile};

fn parse(src: &str) -> ParsedFile<'_> {
    parse_source(src).unwrap_or_else(|f| {
        let rendered: Vec<_> = f.diags.iter().map(|d| d.render(src)).collect();
        panic!("parse failed: {rendered:#?}")
    })
}

fn type_specs<'a>(p: &'a ParsedFile<'_>) -> Vec<&'a TypeSpec> {
    p.decls()
        .iter()
        .filter_map(|d| match d {
            TopLevelDecl::Type(id) => Some(&p.arena.type_specs[*id]),
            _ => None,
        })
        .collect()
}

fn interface_elems<'a>(p: &'a ParsedFile<'_>, spec: &TypeSpec) -> &'a [InterfaceElem] {
    match p.arena.types[spec.typ] {
        Type::Interface { elems } => p.arena.interface_elems(elems),
        other => panic!("not an interface: {other:?}"),
    }
}

fn type_text(p: &ParsedFile<'_>, id: TypeId) -> String {
    p.text(p.arena.types.span(id)).to_string()
}

#[test]
fn interface_methods_and_embeds() {
    let src = r#"package store

import (
	"context"
	"io"
)

// Store persists things.
type Store interface {
	io.Closer
	*pkg.Thing
	Get(ctx context.Context, key string) ([]byte, error)
	Put(context.Context, string, []byte) error
	Watch(prefix string) <-chan Event
	Each(fn func(k, v string) bool)
	Log(format string, args ...interface{})
}
"#;
    let p = parse(src);
    assert_eq!(p.name(p.file.name), "store");
    assert_eq!(p.imports().len(), 2);

    let specs = type_specs(&p);
    assert_eq!(specs.len(), 1);
    let elems = interface_elems(&p, specs[0]);
    assert_eq!(elems.len(), 7);

    let InterfaceElem::Embed { typ } = elems[0] else {
        panic!("expected embed");
    };
    assert_eq!(type_text(&p, typ), "io.Closer");
    let InterfaceElem::Embed { typ } = elems[1] else {
        panic!("expected embed");
    };
    assert!(matches!(p.arena.types[typ], Type::Pointer { .. }));

    let InterfaceElem::Method { name, sig } = elems[6] else {
        panic!("expected method");
    };
    assert_eq!(p.name(name), "Log");
    let params = p.arena.fields_list(p.arena.signatures[sig].params.fields);
    let variadic = &p.arena.fields[params[1]];
    assert!(variadic.ellipsis_pos.is_some());
    assert_eq!(type_text(&p, variadic.typ), "interface{}");
}

#[test]
fn generic_interfaces_and_constraints() {
    let src = "package p\n\
               type Number interface { ~int | ~float64 }\n\
               type Repo[K comparable, V any] interface {\n\
               \tFind(k K) (V, bool)\n\
               \tAll() map[K]V\n\
               }\n";
    let p = parse(src);
    let specs = type_specs(&p);
    assert_eq!(specs.len(), 2);

    let union = interface_elems(&p, specs[0]);
    let InterfaceElem::Embed { typ } = union[0] else {
        panic!("expected union embed");
    };
    let Type::Union { terms } = p.arena.types[typ] else {
        panic!("expected union");
    };
    assert!(p.arena.type_terms(terms).iter().all(|t| t.tilde));

    let tp = specs[1].type_params.expect("type params");
    let decls = p.arena.type_param_decl_ids(p.arena.type_params[tp].params);
    assert_eq!(decls.len(), 2);
    let first = &p.arena.type_param_decls[decls[0]];
    assert_eq!(type_text(&p, first.constraint), "comparable");
}

#[test]
fn generic_type_arguments_in_params() {
    let src = "package p\n\
               type I interface {\n\
               \tM(List[T], pkg.Map[string, int]) (out []List[T])\n\
               \tN(a [4]byte, b []string)\n\
               }\n";
    let p = parse(src);
    let elems = interface_elems(&p, type_specs(&p)[0]);

    let InterfaceElem::Method { sig, .. } = elems[0] else {
        panic!("expected method");
    };
    let params = p.arena.fields_list(p.arena.signatures[sig].params.fields);
    assert_eq!(params.len(), 2);
    assert!(params.iter().all(|f| p.arena.fields[*f].names.is_empty()));
    assert_eq!(type_text(&p, p.arena.fields[params[1]].typ), "pkg.Map[string, int]");

    let InterfaceElem::Method { sig, .. } = elems[1] else {
        panic!("expected method");
    };
    let params = p.arena.fields_list(p.arena.signatures[sig].params.fields);
    let a = &p.arena.fields[params[0]];
    assert_eq!(a.names.len(), 1);
    assert!(matches!(p.arena.types[a.typ], Type::Array { .. }));
}

#[test]
fn channels_keep_direction() {
    let src = "package p\ntype C interface { M(a chan int, b chan<- int, c <-chan int) }\n";
    let p = parse(src);
    let elems = interface_elems(&p, type_specs(&p)[0]);
    let InterfaceElem::Method { sig, .. } = elems[0] else {
        panic!("expected method");
    };
    let dirs: Vec<_> = p
        .arena
        .fields_list(p.arena.signatures[sig].params.fields)
        .iter()
        .map(|f| match p.arena.types[p.arena.fields[*f].typ] {
            Type::Chan { dir, .. } => dir,
            other => panic!("not a chan: {other:?}"),
        })
        .collect();
    assert_eq!(dirs, [ChanDir::Both, ChanDir::Send, ChanDir::Recv]);
}

#[test]
fn structs_with_embeds_and_tags() {
    let src = "package p\n\
               type S struct {\n\
               \tio.Reader\n\
               \t*Base\n\
               \tGeneric[int]\n\
               \tName, Alias string `json:\"name\"`\n\
               \tbuf [8]byte\n\
               }\n";
    let p = parse(src);
    let Type::Struct { fields } = p.arena.types[type_specs(&p)[0].typ] else {
        panic!("expected struct");
    };
    let fields: Vec<_> = p.arena.fields_list(fields).iter().map(|f| p.arena.fields[*f]).collect();
    assert_eq!(fields.len(), 5);
    assert!(fields[..3].iter().all(|f| f.is_embed));
    assert_eq!(fields[3].names.len(), 2);
    assert!(fields[3].tag.is_some());
    assert!(!fields[4].is_embed);
}

#[test]
fn methods_and_generic_functions() {
    let src = "package p\n\
               func (s *Store) Get(key string) (v []byte, err error) {\n\treturn nil, nil\n}\n\
               func Map[T, U any](xs []T, f func(T) U) []U { return nil }\n\
               func External() int\n";
    let p = parse(src);
    let funcs: Vec<_> = p
        .decls()
        .iter()
        .filter_map(|d| match d {
            TopLevelDecl::Func(id) => Some(p.arena.funcs[*id]),
            _ => None,
        })
        .collect();
    assert_eq!(funcs.len(), 3);
    assert!(funcs[0].recv.is_some());
    assert!(funcs[1].type_params.is_some());
    assert!(funcs[2].body.is_none());
}

#[test]
fn alias_declarations() {
    let p = parse("package p\ntype (\n\tA = io.Reader\n\tB int\n)\n");
    let specs = type_specs(&p);
    assert!(specs[0].alias);
    assert!(!specs[1].alias);
}

#[test]
fn syntax_errors_are_positioned() {
    let src = "package p\n\ntype I interface {\n\tM(\n}\n";
    let err = parse_source(src).unwrap_err();
    let rendered = err.diags[0].render(src);
    assert!(rendered.starts_with("5:1: "), "{rendered}");
}
