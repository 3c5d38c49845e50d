//! In-memory model of the generated Go file.
//!
//! The synthesizer builds this; [`crate::render`] prints it.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFile {
    /// Comment lines printed verbatim above the package clause.
    pub banner: Option<String>,
    pub package: String,
    /// Import specs: `"path"` or `name "path"`.
    pub imports: Vec<String>,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    MockStruct(MockStruct),
    Assertion(Assertion),
    Method(MethodImpl),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub constraint: String,
}

/// `type MockX[...] struct { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockStruct {
    pub name: String,
    pub interface: String,
    pub type_params: Vec<TypeParam>,
    /// Embedded field types, recorder first.
    pub embeds: Vec<String>,
}

/// Compile-time check that the mock implements its interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub interface: String,
    pub mock: String,
    pub type_params: Vec<TypeParam>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub typ: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodImpl {
    pub receiver: String,
    pub mock: String,
    /// Type parameter names threaded onto the receiver type.
    pub type_args: Vec<String>,
    pub name: String,
    pub params: Vec<Param>,
    pub results: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// `receiver.Called(args...)`, assigned to `into` when results follow.
    Record {
        receiver: String,
        args: Vec<String>,
        into: Option<String>,
    },
    /// Type-checked copy of queued value `index` of `from` into `slot`.
    BindResult {
        from: String,
        index: usize,
        slot: String,
        typ: String,
    },
    Return { values: Vec<String> },
}
