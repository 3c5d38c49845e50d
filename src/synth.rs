//! Mock synthesizer: descriptor model in, [`GoFile`] out.
//!
//! Each interface becomes a `Mock<Name>` struct embedding the testify
//! recorder plus one field per embedded mock, a compile-time assertion, and
//! one forwarding method per interface method.

use std::collections::HashSet;

use tracing::debug;

use crate::codegen::{Assertion, GoFile, Item, MethodImpl, MockStruct, Param, Stmt, TypeParam};
use crate::model::{Contract, InterfaceDescriptor, MethodDescriptor};

/// Import of the recorder every generated mock embeds.
pub const RECORDER_IMPORT: &str = "\"github.com/stretchr/testify/mock\"";
/// Embedded recorder field.
pub const RECORDER_TYPE: &str = "mock.Mock";

const RECEIVER: &str = "mock";
const CALL_RESULT: &str = "args";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthOptions {
    /// Comment block printed above the package clause.
    pub banner: Option<String>,
}

impl SynthOptions {
    pub fn with_banner(banner: impl Into<String>) -> Self {
        Self {
            banner: Some(banner.into()),
        }
    }
}

/// Standard generated-code marker plus the name of the source file.
pub fn default_banner(source_name: &str) -> String {
    format!("// Code generated by ridicule. DO NOT EDIT.\n// Source: {source_name}")
}

pub fn synthesize(contract: &Contract, options: &SynthOptions) -> GoFile {
    let mut imports = Vec::with_capacity(contract.imports.len() + 1);
    imports.push(RECORDER_IMPORT.to_string());
    imports.extend(contract.imports.iter().cloned());

    let mut items: Vec<Item> = contract
        .interfaces
        .iter()
        .map(|iface| Item::MockStruct(mock_struct(iface)))
        .collect();
    items.extend(
        contract
            .interfaces
            .iter()
            .map(|iface| Item::Assertion(assertion(iface))),
    );
    for iface in &contract.interfaces {
        debug!(interface = %iface.name, methods = iface.methods.len(), "synthesizing mock");
        items.extend(
            iface
                .methods
                .iter()
                .map(|m| Item::Method(forwarding_method(iface, m))),
        );
    }

    GoFile {
        banner: options.banner.clone(),
        package: contract.package.clone(),
        imports,
        items,
    }
}

fn type_params(iface: &InterfaceDescriptor) -> Vec<TypeParam> {
    iface
        .type_params
        .iter()
        .map(|p| TypeParam {
            name: p.name.clone().unwrap_or_default(),
            constraint: p.type_text.clone(),
        })
        .collect()
}

fn mock_struct(iface: &InterfaceDescriptor) -> MockStruct {
    let mut embeds = Vec::with_capacity(iface.embeds.len() + 1);
    embeds.push(RECORDER_TYPE.to_string());
    embeds.extend(iface.embeds.iter().map(ToString::to_string));
    MockStruct {
        name: iface.mock_name(),
        interface: iface.name.clone(),
        type_params: type_params(iface),
        embeds,
    }
}

fn assertion(iface: &InterfaceDescriptor) -> Assertion {
    Assertion {
        interface: iface.name.clone(),
        mock: iface.mock_name(),
        type_params: type_params(iface),
    }
}

/// Identifiers already bound in one generated function.
#[derive(Default)]
struct Scope {
    taken: HashSet<String>,
}

impl Scope {
    /// `base`, or `base` behind enough underscores to be unique.
    fn fresh(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        while self.taken.contains(&name) {
            name.insert(0, '_');
        }
        self.taken.insert(name.clone());
        name
    }
}

fn forwarding_method(iface: &InterfaceDescriptor, m: &MethodDescriptor) -> MethodImpl {
    // anonymous parameters always get `p<index>`; a named one in the way moves
    let mut scope = Scope::default();
    for (i, p) in m.params.iter().enumerate() {
        if p.name.is_none() {
            scope.taken.insert(format!("p{i}"));
        }
    }

    let params: Vec<Param> = m
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| Param {
            name: match &p.name {
                Some(name) => scope.fresh(name),
                None => format!("p{i}"),
            },
            typ: p.type_text.clone(),
        })
        .collect();

    let receiver = scope.fresh(RECEIVER);
    let results: Vec<Param> = m
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| Param {
            name: scope.fresh(&format!("r{i}")),
            typ: r.type_text.clone(),
        })
        .collect();

    let args = params.iter().map(|p| p.name.clone()).collect();
    let mut body = Vec::with_capacity(results.len() + 2);
    if results.is_empty() {
        body.push(Stmt::Record {
            receiver: receiver.clone(),
            args,
            into: None,
        });
    } else {
        let from = scope.fresh(CALL_RESULT);
        body.push(Stmt::Record {
            receiver: receiver.clone(),
            args,
            into: Some(from.clone()),
        });
        body.extend(results.iter().enumerate().map(|(index, r)| Stmt::BindResult {
            from: from.clone(),
            index,
            slot: r.name.clone(),
            typ: r.typ.clone(),
        }));
        body.push(Stmt::Return {
            values: results.iter().map(|r| r.name.clone()).collect(),
        });
    }

    MethodImpl {
        receiver,
        mock: iface.mock_name(),
        type_args: iface
            .type_params
            .iter()
            .filter_map(|p| p.name.clone())
            .collect(),
        name: m.name.clone(),
        params,
        results,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MockReference, ParameterDescriptor};

    fn method(name: &str, params: Vec<ParameterDescriptor>, results: Vec<ParameterDescriptor>) -> MethodDescriptor {
        MethodDescriptor {
            name: name.into(),
            params,
            results,
        }
    }

    fn iface(name: &str, methods: Vec<MethodDescriptor>) -> InterfaceDescriptor {
        InterfaceDescriptor {
            name: name.into(),
            type_params: vec![],
            embeds: vec![],
            methods,
        }
    }

    fn methods(file: &GoFile) -> Vec<&MethodImpl> {
        file.items
            .iter()
            .filter_map(|i| match i {
                Item::Method(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn item_order_is_structs_then_assertions_then_methods() {
        let contract = Contract {
            package: "p".into(),
            imports: vec!["\"io\"".into()],
            interfaces: vec![
                iface("A", vec![method("M", vec![], vec![])]),
                iface("B", vec![method("N", vec![], vec![]), method("O", vec![], vec![])]),
            ],
            warnings: vec![],
        };
        let file = synthesize(&contract, &SynthOptions::default());
        let kinds: Vec<_> = file
            .items
            .iter()
            .map(|i| match i {
                Item::MockStruct(s) => format!("struct {}", s.name),
                Item::Assertion(a) => format!("assert {}", a.mock),
                Item::Method(m) => format!("method {}.{}", m.mock, m.name),
            })
            .collect();
        assert_eq!(
            kinds,
            [
                "struct MockA",
                "struct MockB",
                "assert MockA",
                "assert MockB",
                "method MockA.M",
                "method MockB.N",
                "method MockB.O",
            ]
        );
        assert_eq!(file.imports, [RECORDER_IMPORT, "\"io\""]);
    }

    #[test]
    fn anonymous_params_get_positional_names() {
        let m = method(
            "Put",
            vec![
                ParameterDescriptor::anonymous("string"),
                ParameterDescriptor::anonymous("[]byte"),
            ],
            vec![],
        );
        let out = forwarding_method(&iface("S", vec![]), &m);
        let names: Vec<_> = out.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["p0", "p1"]);
        assert_eq!(
            out.body,
            [Stmt::Record {
                receiver: "mock".into(),
                args: vec!["p0".into(), "p1".into()],
                into: None,
            }]
        );
    }

    #[test]
    fn placeholders_keep_their_positions() {
        let m = method(
            "M",
            vec![
                ParameterDescriptor::anonymous("string"),
                ParameterDescriptor::named("p0", "int"),
                ParameterDescriptor::anonymous("bool"),
            ],
            vec![],
        );
        let out = forwarding_method(&iface("S", vec![]), &m);
        let names: Vec<_> = out.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["p0", "_p0", "p2"]);
        let Stmt::Record { args, .. } = &out.body[0] else {
            panic!("first statement records the call");
        };
        assert_eq!(args, &["p0", "_p0", "p2"]);
    }

    #[test]
    fn colliding_names_are_renamed() {
        let m = method(
            "Do",
            vec![
                ParameterDescriptor::named("mock", "int"),
                ParameterDescriptor::named("args", "...int"),
            ],
            vec![ParameterDescriptor::anonymous("error")],
        );
        let out = forwarding_method(&iface("S", vec![]), &m);
        assert_eq!(out.receiver, "_mock");
        let Stmt::Record { into, args, .. } = &out.body[0] else {
            panic!("first statement records the call");
        };
        assert_eq!(into.as_deref(), Some("_args"));
        assert_eq!(args, &["mock", "args"]);
    }

    #[test]
    fn generic_and_embedded_mocks() {
        let mut repo = iface(
            "Repo",
            vec![method(
                "Get",
                vec![ParameterDescriptor::anonymous("K")],
                vec![ParameterDescriptor::anonymous("V")],
            )],
        );
        repo.type_params = vec![
            ParameterDescriptor::named("K", "comparable"),
            ParameterDescriptor::named("V", "any"),
        ];
        repo.embeds = vec![MockReference {
            namespace: Some("io".into()),
            interface: "Closer".into(),
            pointer: false,
        }];
        let contract = Contract {
            package: "p".into(),
            interfaces: vec![repo],
            ..Contract::default()
        };
        let file = synthesize(&contract, &SynthOptions::default());

        let Item::MockStruct(s) = &file.items[0] else {
            panic!("struct first");
        };
        assert_eq!(s.embeds, ["mock.Mock", "io.MockCloser"]);
        assert_eq!(methods(&file)[0].type_args, ["K", "V"]);
    }
}
