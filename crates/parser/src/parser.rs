//! Recursive-descent parser for the declaration layer of a Go file.
//!
//! Covers the package clause, imports, `type` declarations with the full
//! type grammar, and function/method signatures. Function bodies and
//! `const`/`var` declarations are skipped by bracket matching.

use crate::ast::*;
use crate::error::{Diag, ParseFailure};
use crate::lexer::{Lexer, Tok};
use crate::parser_support::{resolve_param_list, ParamDecl};

type PResult<T> = Result<T, Diag>;

/// A successfully parsed file together with the storage its nodes live in.
#[derive(Debug)]
pub struct ParsedFile<'src> {
    pub src: &'src str,
    pub arena: AstArena,
    pub interner: Interner,
    pub file: SourceFile,
}

impl<'src> ParsedFile<'src> {
    #[inline]
    pub fn text(&self, span: Span) -> &'src str {
        span.text(self.src)
    }

    #[inline]
    pub fn name(&self, ident: IdentName) -> &str {
        self.interner.resolve(ident.sym)
    }

    /// Import path with its quotes removed.
    pub fn import_path(&self, spec: &ImportSpec) -> &'src str {
        let quoted = self.text(spec.path);
        quoted
            .get(1..quoted.len().saturating_sub(1))
            .unwrap_or(quoted)
    }

    pub fn imports(&self) -> &[ImportSpec] {
        self.arena.imports(self.file.imports)
    }

    pub fn decls(&self) -> &[TopLevelDecl] {
        self.arena.top_decls(self.file.decls)
    }
}

/// Parses a Go source file.
///
/// Returns the parsed file, or every lexer diagnostic plus the first parse
/// error. A file with lexical errors never parses successfully.
pub fn parse_source(src: &str) -> Result<ParsedFile<'_>, ParseFailure> {
    let mut lexer = Lexer::new(src);
    let toks: Vec<_> = lexer.by_ref().collect();
    let mut diags = lexer.take_diags();

    let mut p = Parser {
        src,
        toks,
        pos: 0,
        arena: AstArena::new(),
        interner: Interner::new(),
    };

    match p.source_file() {
        Ok(file) if diags.is_empty() => Ok(ParsedFile {
            src,
            arena: p.arena,
            interner: p.interner,
            file,
        }),
        Ok(_) => Err(ParseFailure { diags }),
        Err(d) => {
            diags.push(d);
            Err(ParseFailure { diags })
        }
    }
}

struct Parser<'src> {
    src: &'src str,
    toks: Vec<(usize, Tok<'src>, usize)>,
    pos: usize,
    arena: AstArena,
    interner: Interner,
}

// =============================================================================
// Token cursor
// =============================================================================

impl<'src> Parser<'src> {
    #[inline]
    fn peek(&self) -> Option<Tok<'src>> {
        self.peek_at(0)
    }

    #[inline]
    fn peek_at(&self, n: usize) -> Option<Tok<'src>> {
        self.toks.get(self.pos + n).map(|(_, t, _)| *t)
    }

    #[inline]
    fn at(&self, tok: Tok<'src>) -> bool {
        self.peek() == Some(tok)
    }

    #[inline]
    fn at_eof(&self) -> bool {
        self.pos >= self.toks.len()
    }

    fn cur_span(&self) -> Span {
        match self.toks.get(self.pos) {
            Some((s, _, e)) => Span::new(*s, *e),
            None => Span::empty_at(self.src.len()),
        }
    }

    fn prev_end(&self) -> u32 {
        match self.pos.checked_sub(1).and_then(|i| self.toks.get(i)) {
            Some((_, _, e)) => Span::empty_at(*e).end,
            None => 0,
        }
    }

    fn since(&self, start: Span) -> Span {
        Span {
            start: start.start,
            end: self.prev_end().max(start.start),
        }
    }

    fn bump(&mut self) -> Span {
        let span = self.cur_span();
        self.pos += 1;
        span
    }

    fn eat(&mut self, tok: Tok<'src>) -> bool {
        if self.at(tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> Diag {
        match self.peek() {
            Some(found) => Diag::unexpected(self.cur_span(), &found, expected),
            None => Diag::unexpected_eof(self.src.len(), expected),
        }
    }

    fn expect(&mut self, tok: Tok<'src>, expected: &str) -> PResult<Span> {
        if self.at(tok) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn ident(&mut self, expected: &str) -> PResult<IdentName> {
        match self.peek() {
            Some(Tok::Ident(text)) => {
                let pos = self.bump();
                Ok(IdentName {
                    sym: self.interner.intern(text),
                    pos,
                })
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Statement terminator: `;`, or nothing before a closing `)`/`}` or EOF.
    fn terminator(&mut self) -> PResult<()> {
        if self.eat(Tok::Semi) || self.at_eof() || self.at(Tok::RParen) || self.at(Tok::RBrace) {
            Ok(())
        } else {
            Err(self.unexpected("`;` or newline"))
        }
    }

    /// Skips from an opening bracket at the cursor to its matching close.
    fn skip_balanced(&mut self) -> PResult<Span> {
        let start = self.cur_span();
        let mut depth = 0usize;
        while let Some(tok) = self.peek() {
            self.pos += 1;
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(self.since(start));
                    }
                }
                _ => {}
            }
        }
        Err(Diag::parse(start, "unclosed bracket"))
    }

    /// With the cursor `offset` tokens before a `[`, decides whether the
    /// bracket holds type arguments (`List[T]`) rather than an array length
    /// or slice (`name [N]T`, `name []T`): type arguments are followed by a
    /// list separator or terminator, array/slice brackets by their element type.
    fn bracket_is_type_args(&self, offset: usize) -> bool {
        if self.peek_at(offset + 1) == Some(Tok::RBrack) {
            return false;
        }
        let mut depth = 0usize;
        let mut i = offset;
        while let Some(tok) = self.peek_at(i) {
            match tok {
                Tok::LParen | Tok::LBrack | Tok::LBrace => depth += 1,
                Tok::RParen | Tok::RBrack | Tok::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return matches!(
                            self.peek_at(i + 1),
                            None | Some(
                                Tok::Comma
                                    | Tok::RParen
                                    | Tok::Semi
                                    | Tok::RBrace
                                    | Tok::StringLit(_)
                                    | Tok::RawStringLit(_)
                            )
                        );
                    }
                }
                _ => {}
            }
            i += 1;
        }
        false
    }
}

impl<'src> Parser<'src> {
    /// `type A[T any] ...` vs `type A [N]T`: a type parameter list is an
    /// identifier followed by a `,` or the start of a constraint. Anything
    /// else (`]`, `.`, an operator, a literal, a call) is an array length.
    fn bracket_opens_type_params(&self) -> bool {
        if !self.at(Tok::LBrack) || !matches!(self.peek_at(1), Some(Tok::Ident(_))) {
            return false;
        }
        matches!(
            self.peek_at(2),
            Some(
                Tok::Comma
                    | Tok::Ident(_)
                    | Tok::Tilde
                    | Tok::LBrack
                    | Tok::Arrow
                    | Tok::KwMap
                    | Tok::KwChan
                    | Tok::KwFunc
                    | Tok::KwInterface
                    | Tok::KwStruct
            )
        )
    }
}

fn starts_type(tok: Option<Tok<'_>>) -> bool {
    matches!(
        tok,
        Some(
            Tok::Ident(_)
                | Tok::Star
                | Tok::LBrack
                | Tok::LParen
                | Tok::Arrow
                | Tok::KwMap
                | Tok::KwChan
                | Tok::KwFunc
                | Tok::KwInterface
                | Tok::KwStruct
        )
    )
}

// =============================================================================
// Declarations
// =============================================================================

impl<'src> Parser<'src> {
    fn source_file(&mut self) -> PResult<SourceFile> {
        while self.eat(Tok::Semi) {}
        let package_pos = self.expect(Tok::KwPackage, "`package`")?;
        let name = self.ident("package name")?;
        self.terminator()?;

        let mut imports = Vec::new();
        while self.at(Tok::KwImport) {
            self.import_decl(&mut imports)?;
            self.terminator()?;
        }

        let mut decls = Vec::new();
        loop {
            while self.eat(Tok::Semi) {}
            let Some(tok) = self.peek() else { break };
            match tok {
                Tok::KwType => self.type_decl(&mut decls)?,
                Tok::KwFunc => {
                    let id = self.func_decl()?;
                    decls.push(TopLevelDecl::Func(id));
                }
                Tok::KwConst | Tok::KwVar => {
                    let span = self.value_decl()?;
                    decls.push(TopLevelDecl::Value(span));
                }
                Tok::KwImport => {
                    return Err(Diag::parse(
                        self.cur_span(),
                        "imports must appear before other declarations",
                    ))
                }
                _ => return Err(self.unexpected("declaration")),
            }
            self.terminator()?;
        }

        Ok(SourceFile {
            package_pos,
            name,
            imports: self.arena.list_imports(imports),
            decls: self.arena.list_top_decls(decls),
        })
    }

    fn import_decl(&mut self, out: &mut Vec<ImportSpec>) -> PResult<()> {
        self.bump();
        if self.eat(Tok::LParen) {
            while !self.at(Tok::RParen) {
                out.push(self.import_spec()?);
                if !self.eat(Tok::Semi) {
                    break;
                }
            }
            self.expect(Tok::RParen, "`)`")?;
        } else {
            out.push(self.import_spec()?);
        }
        Ok(())
    }

    fn import_spec(&mut self) -> PResult<ImportSpec> {
        let name = match self.peek() {
            Some(Tok::Dot) => Some(ImportName::Dot(self.bump())),
            Some(Tok::Ident("_")) => Some(ImportName::Blank(self.bump())),
            Some(Tok::Ident(_)) => Some(ImportName::Name(self.ident("import name")?)),
            _ => None,
        };
        match self.peek() {
            Some(Tok::StringLit(_) | Tok::RawStringLit(_)) => Ok(ImportSpec {
                name,
                path: self.bump(),
            }),
            _ => Err(self.unexpected("import path")),
        }
    }

    fn type_decl(&mut self, out: &mut Vec<TopLevelDecl>) -> PResult<()> {
        self.bump();
        if self.eat(Tok::LParen) {
            while !self.at(Tok::RParen) {
                let id = self.type_spec()?;
                out.push(TopLevelDecl::Type(id));
                if !self.eat(Tok::Semi) {
                    break;
                }
            }
            self.expect(Tok::RParen, "`)`")?;
        } else {
            let id = self.type_spec()?;
            out.push(TopLevelDecl::Type(id));
        }
        Ok(())
    }

    fn type_spec(&mut self) -> PResult<TypeSpecId> {
        let start = self.cur_span();
        let name = self.ident("type name")?;

        let type_params = if self.bracket_opens_type_params() {
            Some(self.type_params()?)
        } else {
            None
        };

        let alias = self.eat(Tok::Assign);
        let typ = self.typ()?;
        let span = self.since(start);
        Ok(self.arena.type_specs.alloc(
            TypeSpec {
                name,
                type_params,
                typ,
                alias,
            },
            span,
        ))
    }

    fn type_params(&mut self) -> PResult<TypeParamsId> {
        let start = self.expect(Tok::LBrack, "`[`")?;
        let mut decls = Vec::new();
        while !self.at(Tok::RBrack) {
            let decl_start = self.cur_span();
            let mut names = vec![self.ident("type parameter name")?];
            while self.eat(Tok::Comma) {
                names.push(self.ident("type parameter name")?);
            }
            let constraint = self.constraint()?;
            let names = self.arena.list_ident_names(names);
            let span = self.since(decl_start);
            decls.push(
                self.arena
                    .type_param_decls
                    .alloc(TypeParamDecl { names, constraint }, span),
            );
            if !self.eat(Tok::Comma) {
                break;
            }
        }
        self.expect(Tok::RBrack, "`]`")?;
        let params = self.arena.list_type_param_decl_ids(decls);
        let span = self.since(start);
        Ok(self.arena.type_params.alloc(TypeParams { params }, span))
    }

    /// `TypeElem = TypeTerm { "|" TypeTerm }` where `TypeTerm = [ "~" ] Type`.
    fn constraint(&mut self) -> PResult<TypeId> {
        let start = self.cur_span();
        let mut terms = Vec::new();
        loop {
            let tilde = self.eat(Tok::Tilde);
            let typ = self.typ()?;
            terms.push(TypeTerm { tilde, typ });
            if !self.eat(Tok::Pipe) {
                break;
            }
        }

        if let [TypeTerm { tilde: false, typ }] = terms.as_slice() {
            return Ok(*typ);
        }
        let terms = self.arena.list_type_terms(terms);
        let span = self.since(start);
        Ok(self.arena.types.alloc(Type::Union { terms }, span))
    }

    fn func_decl(&mut self) -> PResult<FuncDeclId> {
        let start = self.bump();
        let recv = if self.at(Tok::LParen) {
            Some(self.param_list()?)
        } else {
            None
        };
        let name = self.ident("function name")?;
        let type_params = if self.at(Tok::LBrack) {
            Some(self.type_params()?)
        } else {
            None
        };
        let signature = self.signature()?;
        let body = if self.at(Tok::LBrace) {
            Some(self.skip_balanced()?)
        } else {
            None
        };
        let span = self.since(start);
        Ok(self.arena.funcs.alloc(
            FuncDecl {
                recv,
                name,
                type_params,
                signature,
                body,
            },
            span,
        ))
    }

    fn value_decl(&mut self) -> PResult<Span> {
        let start = self.bump();
        if self.at(Tok::LParen) {
            self.skip_balanced()?;
            return Ok(self.since(start));
        }
        while let Some(tok) = self.peek() {
            match tok {
                Tok::Semi => break,
                Tok::LParen | Tok::LBrack | Tok::LBrace => {
                    self.skip_balanced()?;
                }
                _ => self.pos += 1,
            }
        }
        Ok(self.since(start))
    }
}

// =============================================================================
// Signatures and parameter lists
// =============================================================================

impl<'src> Parser<'src> {
    fn signature(&mut self) -> PResult<SignatureId> {
        let start = self.cur_span();
        let params = self.param_list()?;
        let results = if self.at(Tok::LParen) {
            Some(Results::Params(self.param_list()?))
        } else if starts_type(self.peek()) {
            Some(Results::Type(self.typ()?))
        } else {
            None
        };
        let span = self.since(start);
        Ok(self
            .arena
            .signatures
            .alloc(Signature { params, results }, span))
    }

    fn param_list(&mut self) -> PResult<FieldList> {
        self.expect(Tok::LParen, "`(`")?;
        let mut entries = Vec::new();
        while !self.at(Tok::RParen) {
            let start = self.cur_span();
            let entry = self.param_entry()?;
            entries.push((entry, self.since(start)));
            if !self.eat(Tok::Comma) {
                break;
            }
        }
        self.expect(Tok::RParen, "`)`")?;
        let fields = resolve_param_list(&mut self.arena, entries)?;
        Ok(FieldList {
            fields: self.arena.list_fields(fields),
        })
    }

    fn param_entry(&mut self) -> PResult<ParamDecl> {
        match self.peek() {
            Some(Tok::Ident(_)) => match self.peek_at(1) {
                Some(Tok::Comma | Tok::RParen) => Ok(ParamDecl::Bare(self.ident("parameter")?)),
                Some(Tok::Dot) => Ok(ParamDecl::Anon {
                    ellipsis_pos: None,
                    typ: self.typ()?,
                }),
                Some(Tok::LBrack) if self.bracket_is_type_args(1) => Ok(ParamDecl::Anon {
                    ellipsis_pos: None,
                    typ: self.typ()?,
                }),
                Some(Tok::Ellipsis) => {
                    let name = self.ident("parameter name")?;
                    let ellipsis_pos = Some(self.bump());
                    Ok(ParamDecl::Named {
                        name,
                        ellipsis_pos,
                        typ: self.typ()?,
                    })
                }
                next if starts_type(next) => {
                    let name = self.ident("parameter name")?;
                    Ok(ParamDecl::Named {
                        name,
                        ellipsis_pos: None,
                        typ: self.typ()?,
                    })
                }
                _ => Ok(ParamDecl::Anon {
                    ellipsis_pos: None,
                    typ: self.typ()?,
                }),
            },
            Some(Tok::Ellipsis) => {
                let ellipsis_pos = Some(self.bump());
                Ok(ParamDecl::Anon {
                    ellipsis_pos,
                    typ: self.typ()?,
                })
            }
            _ => Ok(ParamDecl::Anon {
                ellipsis_pos: None,
                typ: self.typ()?,
            }),
        }
    }
}

// =============================================================================
// Types
// =============================================================================

impl<'src> Parser<'src> {
    fn typ(&mut self) -> PResult<TypeId> {
        let start = self.cur_span();
        let node = match self.peek() {
            Some(Tok::Ident(_)) => self.named_type()?,
            Some(Tok::Star) => {
                self.bump();
                Type::Pointer { elem: self.typ()? }
            }
            Some(Tok::LBrack) => {
                self.bump();
                if self.eat(Tok::RBrack) {
                    Type::Slice { elem: self.typ()? }
                } else {
                    let len = self.array_len()?;
                    Type::Array {
                        len,
                        elem: self.typ()?,
                    }
                }
            }
            Some(Tok::KwMap) => {
                self.bump();
                self.expect(Tok::LBrack, "`[`")?;
                let key = self.typ()?;
                self.expect(Tok::RBrack, "`]`")?;
                Type::Map {
                    key,
                    val: self.typ()?,
                }
            }
            Some(Tok::KwChan) => {
                self.bump();
                let dir = if self.eat(Tok::Arrow) {
                    ChanDir::Send
                } else {
                    ChanDir::Both
                };
                Type::Chan {
                    dir,
                    elem: self.typ()?,
                }
            }
            Some(Tok::Arrow) => {
                self.bump();
                self.expect(Tok::KwChan, "`chan`")?;
                Type::Chan {
                    dir: ChanDir::Recv,
                    elem: self.typ()?,
                }
            }
            Some(Tok::KwFunc) => {
                self.bump();
                Type::Func {
                    sig: self.signature()?,
                }
            }
            Some(Tok::KwInterface) => self.interface_type()?,
            Some(Tok::KwStruct) => self.struct_type()?,
            Some(Tok::LParen) => {
                self.bump();
                let typ = self.typ()?;
                self.expect(Tok::RParen, "`)`")?;
                Type::Paren { typ }
            }
            _ => return Err(self.unexpected("type")),
        };
        let span = self.since(start);
        Ok(self.arena.types.alloc(node, span))
    }

    fn named_type(&mut self) -> PResult<Type> {
        let first = self.ident("type name")?;
        let (pkg, name) = if self.eat(Tok::Dot) {
            (Some(first), self.ident("qualified type name")?)
        } else {
            (None, first)
        };

        let mut args = Vec::new();
        if self.eat(Tok::LBrack) {
            while !self.at(Tok::RBrack) {
                args.push(self.typ()?);
                if !self.eat(Tok::Comma) {
                    break;
                }
            }
            self.expect(Tok::RBrack, "`]`")?;
        }

        Ok(Type::Named {
            pkg,
            name,
            args: self.arena.list_types(args),
        })
    }

    /// Array length with the opening `[` consumed; returns the span of the
    /// length expression and consumes the closing `]`.
    fn array_len(&mut self) -> PResult<Span> {
        let start = self.cur_span();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => return Err(Diag::parse(start, "unclosed array length")),
                Some(Tok::RBrack) if depth == 0 => break,
                Some(Tok::LParen | Tok::LBrack | Tok::LBrace) => depth += 1,
                Some(Tok::RParen | Tok::RBrack | Tok::RBrace) => depth = depth.saturating_sub(1),
                Some(_) => {}
            }
            self.pos += 1;
        }
        let len = self.since(start);
        if len.is_empty() {
            return Err(self.unexpected("array length"));
        }
        self.bump();
        Ok(len)
    }

    fn interface_type(&mut self) -> PResult<Type> {
        self.bump();
        self.expect(Tok::LBrace, "`{`")?;
        let mut elems = Vec::new();
        while !self.at(Tok::RBrace) {
            let elem = match (self.peek(), self.peek_at(1)) {
                (Some(Tok::Ident(_)), Some(Tok::LParen)) => InterfaceElem::Method {
                    name: self.ident("method name")?,
                    sig: self.signature()?,
                },
                _ => InterfaceElem::Embed {
                    typ: self.constraint()?,
                },
            };
            elems.push(elem);
            if !self.eat(Tok::Semi) {
                break;
            }
        }
        self.expect(Tok::RBrace, "`}`")?;
        Ok(Type::Interface {
            elems: self.arena.list_interface_elems(elems),
        })
    }

    fn struct_type(&mut self) -> PResult<Type> {
        self.bump();
        self.expect(Tok::LBrace, "`{`")?;
        let mut fields = Vec::new();
        while !self.at(Tok::RBrace) {
            fields.push(self.struct_field()?);
            if !self.eat(Tok::Semi) {
                break;
            }
        }
        self.expect(Tok::RBrace, "`}`")?;
        Ok(Type::Struct {
            fields: self.arena.list_fields(fields),
        })
    }

    fn struct_field(&mut self) -> PResult<FieldId> {
        let start = self.cur_span();
        let embedded = match (self.peek(), self.peek_at(1)) {
            (Some(Tok::Star), _) => true,
            (Some(Tok::Ident(_)), next) => match next {
                None
                | Some(
                    Tok::Dot | Tok::Semi | Tok::RBrace | Tok::StringLit(_) | Tok::RawStringLit(_),
                ) => true,
                Some(Tok::LBrack) => self.bracket_is_type_args(1),
                _ => false,
            },
            _ => return Err(self.unexpected("field")),
        };

        let mut names = Vec::new();
        if !embedded {
            names.push(self.ident("field name")?);
            while self.eat(Tok::Comma) {
                names.push(self.ident("field name")?);
            }
        }
        let typ = self.typ()?;
        let tag = match self.peek() {
            Some(Tok::StringLit(_) | Tok::RawStringLit(_)) => Some(self.bump()),
            _ => None,
        };

        let names = self.arena.list_ident_names(names);
        let span = self.since(start);
        Ok(self.arena.fields.alloc(
            Field {
                names,
                ellipsis_pos: None,
                typ,
                tag,
                is_embed: embedded,
            },
            span,
        ))
    }
}
