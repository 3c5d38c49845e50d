//! Descriptor model built by the extractor and consumed by the synthesizer.
//!
//! Built once per run and never mutated afterwards.

use std::fmt;

/// One parameter, result or type parameter after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParameterDescriptor {
    /// `None` for anonymous parameters (and for `_`).
    pub name: Option<String>,
    /// Canonical Go type text; for type parameters, the constraint.
    pub type_text: String,
}

impl ParameterDescriptor {
    pub fn named(name: impl Into<String>, type_text: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            type_text: type_text.into(),
        }
    }

    pub fn anonymous(type_text: impl Into<String>) -> Self {
        Self {
            name: None,
            type_text: type_text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: Vec<ParameterDescriptor>,
    pub results: Vec<ParameterDescriptor>,
}

/// Reference to the mock of an embedded interface.
///
/// Displays as the Go type of the composed field: `MockFoo`, `pkg.MockFoo`,
/// `*MockFoo` or `*pkg.MockFoo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockReference {
    pub namespace: Option<String>,
    /// Name of the embedded interface (without the `Mock` prefix).
    pub interface: String,
    pub pointer: bool,
}

impl fmt::Display for MockReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.pointer {
            f.write_str("*")?;
        }
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}.")?;
        }
        write!(f, "{}", mock_name(&self.interface))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub name: String,
    /// Type parameters in declaration order; `type_text` holds the constraint.
    pub type_params: Vec<ParameterDescriptor>,
    pub embeds: Vec<MockReference>,
    /// Methods in declaration order.
    pub methods: Vec<MethodDescriptor>,
}

impl InterfaceDescriptor {
    pub fn mock_name(&self) -> String {
        mock_name(&self.name)
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

pub fn mock_name(interface: &str) -> String {
    format!("Mock{interface}")
}

/// A member that could not be mocked faithfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub interface: String,
    pub member: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.interface, self.member, self.message)
    }
}

/// Everything extracted from one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contract {
    pub package: String,
    /// Import specs as written in the source: `"path"` or `name "path"`.
    pub imports: Vec<String>,
    pub interfaces: Vec<InterfaceDescriptor>,
    pub warnings: Vec<Warning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_reference_display() {
        let local = MockReference {
            namespace: None,
            interface: "Closer".into(),
            pointer: false,
        };
        assert_eq!(local.to_string(), "MockCloser");

        let foreign = MockReference {
            namespace: Some("io".into()),
            interface: "Reader".into(),
            pointer: true,
        };
        assert_eq!(foreign.to_string(), "*io.MockReader");
    }
}
