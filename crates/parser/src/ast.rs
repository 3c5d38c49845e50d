//! # Go declaration AST
//!
//! Syntax tree for the declaration layer of a Go source file: the package
//! clause, imports, type declarations and function signatures. Function
//! bodies and value declarations are recorded by span only.
//!
//! ## Architecture
//!
//! - **Nodes**: allocated in typed arenas (`SpannedArena<T>`) and referenced by `Id<T>`
//! - **Lists**: stored in centralized buffers (`ExtraData`) and referenced by `ListRef<T>`
//! - **Spans**: kept in side tables next to each arena
//! - **Symbols**: identifiers are interned once (`Interner`) and compared by `Symbol`
//!
//! Walk/Visitor infrastructure lives in `walk.rs`; `#[derive(WalkAst)]`
//! generates the `Walk` impls for the node types below.

use ast_derive::WalkAst;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::hash::{BuildHasher, BuildHasherDefault, Hasher, RandomState};

pub use crate::error::Span;

// =============================================================================
// Core Foundation Types
// =============================================================================

/// Type-safe identifier for arena-allocated nodes.
#[derive(Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Id<T> {
    raw: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Id<T> {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn to_usize(self) -> usize {
        self.raw as usize
    }
}

/// Typed reference into a centralized list buffer.
#[derive(Debug, PartialEq, Eq)]
pub struct ListRef<T> {
    start: u32,
    len: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Copy for ListRef<T> {}

impl<T> Clone for ListRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Default for ListRef<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> ListRef<T> {
    pub const EMPTY: Self = Self {
        start: 0,
        len: 0,
        _marker: PhantomData,
    };

    #[inline]
    pub const fn new(start: u32, len: u32) -> Self {
        Self {
            start,
            len,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    const fn range(&self) -> core::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

// =============================================================================
// Symbol Interning
// =============================================================================

/// Interned identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Symbol(u32);

/// Identifier occurrence: interned symbol plus its source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentName {
    pub sym: Symbol,
    pub pos: Span,
}

#[derive(Default)]
struct U64IdentityHasher(u64);

impl Hasher for U64IdentityHasher {
    fn write(&mut self, _b: &[u8]) {
        unreachable!("U64IdentityHasher only supports write_u64")
    }

    #[inline]
    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

type U64IdentityBuild = BuildHasherDefault<U64IdentityHasher>;

/// String interner; identical strings share one `Symbol`.
#[derive(Debug, Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    buckets: HashMap<u64, SmallVec<[Symbol; 1]>, U64IdentityBuild>,
    state: RandomState,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        let h = self.state.hash_one(s);
        let entry = self.buckets.entry(h).or_default();

        if let Some(&sym) = entry
            .iter()
            .find(|sym| self.strings[sym.0 as usize].as_ref() == s)
        {
            return sym;
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.into());
        entry.push(sym);
        sym
    }

    /// Resolves a symbol back to its string (empty for a foreign symbol).
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings.get(sym.0 as usize).map_or("", |s| s.as_ref())
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

// =============================================================================
// Arena Allocation
// =============================================================================

/// Arena for nodes with side-table spans.
#[derive(Debug)]
pub struct SpannedArena<T> {
    data: Vec<T>,
    spans: Vec<Span>,
}

impl<T> Default for SpannedArena<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            spans: Vec::new(),
        }
    }
}

impl<T> SpannedArena<T> {
    #[inline]
    pub fn alloc(&mut self, node: T, span: Span) -> Id<T> {
        let id = Id::from_raw(self.data.len() as u32);
        self.data.push(node);
        self.spans.push(span);
        id
    }

    #[inline]
    pub fn span(&self, id: Id<T>) -> Span {
        self.spans[id.to_usize()]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> Index<Id<T>> for SpannedArena<T> {
    type Output = T;
    fn index(&self, id: Id<T>) -> &T {
        &self.data[id.to_usize()]
    }
}

impl<T> IndexMut<Id<T>> for SpannedArena<T> {
    fn index_mut(&mut self, id: Id<T>) -> &mut T {
        &mut self.data[id.to_usize()]
    }
}

pub type TypeSpecId = Id<TypeSpec>;
pub type FuncDeclId = Id<FuncDecl>;
pub type TypeId = Id<Type>;
pub type FieldId = Id<Field>;
pub type SignatureId = Id<Signature>;
pub type TypeParamsId = Id<TypeParams>;
pub type TypeParamDeclId = Id<TypeParamDecl>;

// =============================================================================
// Centralized List Storage
// =============================================================================

#[derive(Debug, Default)]
pub struct ExtraData {
    pub ident_names: Vec<IdentName>,
    pub imports: Vec<ImportSpec>,
    pub top_decls: Vec<TopLevelDecl>,
    pub types: Vec<TypeId>,
    pub fields: Vec<FieldId>,
    pub interface_elems: Vec<InterfaceElem>,
    pub type_terms: Vec<TypeTerm>,
    pub type_param_decl_ids: Vec<TypeParamDeclId>,
}

/// Central arena holding all AST nodes and list buffers.
#[derive(Debug, Default)]
pub struct AstArena {
    pub type_specs: SpannedArena<TypeSpec>,
    pub funcs: SpannedArena<FuncDecl>,
    pub types: SpannedArena<Type>,
    pub signatures: SpannedArena<Signature>,
    pub fields: SpannedArena<Field>,
    pub type_params: SpannedArena<TypeParams>,
    pub type_param_decls: SpannedArena<TypeParamDecl>,
    pub extras: ExtraData,
}

macro_rules! list_accessors {
    ($($builder:ident / $getter:ident => $buf:ident : $t:ty),* $(,)?) => {
        impl AstArena {
            $(
                pub fn $builder(&mut self, items: impl IntoIterator<Item = $t>) -> ListRef<$t> {
                    let start = self.extras.$buf.len();
                    self.extras.$buf.extend(items);
                    let len = self.extras.$buf.len() - start;
                    ListRef::new(start as u32, len as u32)
                }

                #[inline]
                pub fn $getter(&self, r: ListRef<$t>) -> &[$t] {
                    &self.extras.$buf[r.range()]
                }
            )*
        }
    };
}

list_accessors! {
    list_ident_names / ident_names => ident_names: IdentName,
    list_imports / imports => imports: ImportSpec,
    list_top_decls / top_decls => top_decls: TopLevelDecl,
    list_types / types_list => types: TypeId,
    list_fields / fields_list => fields: FieldId,
    list_interface_elems / interface_elems => interface_elems: InterfaceElem,
    list_type_terms / type_terms => type_terms: TypeTerm,
    list_type_param_decl_ids / type_param_decl_ids => type_param_decl_ids: TypeParamDeclId,
}

impl AstArena {
    pub fn new() -> Self {
        Self::default()
    }
}

// =============================================================================
// Source File (Root Node)
// =============================================================================

/// A parsed Go source file.
///
/// ```text
/// SourceFile = PackageClause ";" { ImportDecl ";" } { TopLevelDecl ";" }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct SourceFile {
    pub package_pos: Span,
    pub name: IdentName,
    /// Import specs flattened across every import declaration, in source order.
    pub imports: ListRef<ImportSpec>,
    pub decls: ListRef<TopLevelDecl>,
}

/// Import specification: `ImportSpec = [ "." | PackageName ] ImportPath`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct ImportSpec {
    pub name: Option<ImportName>,
    /// Span of the quoted path literal, quotes included.
    pub path: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum ImportName {
    /// `import . "pkg"`
    Dot(Span),
    /// `import _ "pkg"`
    Blank(Span),
    /// `import name "pkg"`
    Name(IdentName),
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum TopLevelDecl {
    Type(TypeSpecId),
    Func(FuncDeclId),
    /// `const`/`var` declaration, kept by span only.
    Value(#[walk(skip)] Span),
}

/// `TypeSpec = AliasDecl | TypeDef`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct TypeSpec {
    pub name: IdentName,
    pub type_params: Option<TypeParamsId>,
    pub typ: TypeId,
    /// True for `type A = B`.
    #[walk(skip)]
    pub alias: bool,
}

/// Function or method declaration; the body is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct FuncDecl {
    pub recv: Option<FieldList>,
    pub name: IdentName,
    pub type_params: Option<TypeParamsId>,
    pub signature: SignatureId,
    #[walk(skip)]
    pub body: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct TypeParams {
    pub params: ListRef<TypeParamDeclId>,
}

/// `TypeParamDecl = IdentifierList TypeConstraint`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct TypeParamDecl {
    pub names: ListRef<IdentName>,
    pub constraint: TypeId,
}

// =============================================================================
// Signatures and Fields
// =============================================================================

/// `Signature = Parameters [ Result ]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Signature {
    pub params: FieldList,
    pub results: Option<Results>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Results {
    /// Parenthesized results: `(int, error)` or `(n int, err error)`
    Params(FieldList),
    /// Single unnamed result: `error`
    Type(TypeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct FieldList {
    pub fields: ListRef<FieldId>,
}

/// Field in a parameter list or struct.
///
/// `ParameterDecl = [ IdentifierList ] [ "..." ] Type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct Field {
    /// Empty for anonymous parameters and embedded struct fields.
    pub names: ListRef<IdentName>,
    #[walk(skip)]
    pub ellipsis_pos: Option<Span>,
    pub typ: TypeId,
    #[walk(skip)]
    pub tag: Option<Span>,
    #[walk(skip)]
    pub is_embed: bool,
}

// =============================================================================
// Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum Type {
    /// `Name`, `pkg.Name`, `Name[Args]`, `pkg.Name[Args]`
    Named {
        pkg: Option<IdentName>,
        name: IdentName,
        args: ListRef<TypeId>,
    },

    /// `*T`
    Pointer { elem: TypeId },

    /// `[N]T`; the length expression is kept as source text.
    Array {
        #[walk(skip)]
        len: Span,
        elem: TypeId,
    },

    /// `[]T`
    Slice { elem: TypeId },

    /// `map[K]V`
    Map { key: TypeId, val: TypeId },

    /// `chan T`, `<-chan T`, `chan<- T`
    Chan {
        #[walk(skip)]
        dir: ChanDir,
        elem: TypeId,
    },

    /// `struct { ... }`
    Struct { fields: ListRef<FieldId> },

    /// `interface { ... }`
    Interface { elems: ListRef<InterfaceElem> },

    /// `func(...) ...`
    Func { sig: SignatureId },

    /// `(T)`
    Paren { typ: TypeId },

    /// Constraint union: `~int | string`
    Union { terms: ListRef<TypeTerm> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub struct TypeTerm {
    #[walk(skip)]
    pub tilde: bool,
    pub typ: TypeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, WalkAst)]
pub enum InterfaceElem {
    /// `Method(...) ...`
    Method { name: IdentName, sig: SignatureId },

    /// Embedded type (`io.Reader`, `*Foo`) or type-set union (`~int | ~string`).
    Embed { typ: TypeId },
}
