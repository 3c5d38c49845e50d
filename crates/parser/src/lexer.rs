use crate::error::{Diag, LexError, LexErrorKind, Span};
use logos::{Lexer as LogosLexer, Logos};
use std::ops::Range;

// =============================================================================
// 0. Byte helpers
// =============================================================================

#[inline(always)]
const fn first_newline_offset(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        if matches!(bytes[i], b'\n' | b'\r') {
            return Some(i);
        }
        i += 1;
    }

    None
}

#[inline(always)]
const fn is_hex_digit(b: u8) -> bool {
    b.is_ascii_hexdigit()
}

#[inline(always)]
const fn is_octal_digit(b: u8) -> bool {
    matches!(b, b'0'..=b'7')
}

// =============================================================================
// 1. Trivia and literal callbacks
// =============================================================================

fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr::memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;
        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }
        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

fn unterminated(_: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    Err(LexErrorKind::UnterminatedString)
}

/// Validates one escape sequence starting right after the backslash.
/// Returns the number of bytes consumed (the backslash excluded).
fn escape_len(body: &[u8], quote: u8) -> Result<usize, LexErrorKind> {
    let Some(&c) = body.first() else {
        return Err(LexErrorKind::InvalidEscape);
    };

    let hex_run = |n: usize| -> Result<usize, LexErrorKind> {
        let digits = body.get(1..=n).ok_or(LexErrorKind::InvalidEscape)?;
        if !digits.iter().all(|b| is_hex_digit(*b)) {
            return Err(LexErrorKind::InvalidEscape);
        }
        let value = digits
            .iter()
            .fold(0u32, |acc, b| (acc << 4) | (*b as char).to_digit(16).unwrap_or(0));
        if n > 2 && (value > 0x10_FFFF || (0xD800..=0xDFFF).contains(&value)) {
            return Err(LexErrorKind::InvalidEscape);
        }
        Ok(n + 1)
    };

    match c {
        b'a' | b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'\\' => Ok(1),
        q if q == quote => Ok(1),
        b'x' => hex_run(2),
        b'u' => hex_run(4),
        b'U' => hex_run(8),
        b'0'..=b'7' => {
            let digits = body.get(..3).ok_or(LexErrorKind::InvalidEscape)?;
            if !digits.iter().all(|b| is_octal_digit(*b)) {
                return Err(LexErrorKind::InvalidEscape);
            }
            let value = digits.iter().fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
            if value > 255 {
                return Err(LexErrorKind::InvalidEscape);
            }
            Ok(3)
        }
        _ => Err(LexErrorKind::InvalidEscape),
    }
}

fn validate_interpreted_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let s = lex.slice().as_bytes();
    let body = &s[1..s.len() - 1];

    let mut i = 0;
    while let Some(off) = memchr::memchr(b'\\', &body[i..]) {
        let at = i + off + 1;
        i = at + escape_len(&body[at..], b'"')?;
    }
    Ok(())
}

fn validate_rune(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let s = lex.slice();
    let body = &s[1..s.len() - 1];

    let consumed = match body.as_bytes().first() {
        Some(b'\\') => 1 + escape_len(&body.as_bytes()[1..], b'\'')?,
        Some(_) => body.chars().next().map_or(0, char::len_utf8),
        None => return Err(LexErrorKind::InvalidToken),
    };

    if consumed != body.len() {
        return Err(LexErrorKind::InvalidToken);
    }
    Ok(())
}

/// Maximal munch over a numeric literal; classification happens in the wrapper.
fn lex_number(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let src = lex.source().as_bytes();
    let start = lex.span().start;
    let mut i = lex.span().end;

    let hex = src.get(start) == Some(&b'0') && matches!(src.get(start + 1), Some(b'x' | b'X'));

    while i < src.len() {
        let b = src[i];
        let exp = if hex {
            matches!(b, b'p' | b'P')
        } else {
            matches!(b, b'e' | b'E')
        };

        if exp && matches!(src.get(i + 1), Some(b'+' | b'-')) {
            i += 2;
        } else if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' {
            i += 1;
        } else {
            break;
        }
    }

    let already = lex.span().end;
    lex.bump(i - already);
    Ok(())
}

/// Classifies a munched numeric literal. Underscores must sit between digits.
fn classify_number(lit: &str) -> Result<NumberKind, LexErrorKind> {
    let (digits, imag) = match lit.strip_suffix('i') {
        Some(rest) => (rest, true),
        None => (lit, false),
    };

    let lower = digits.to_ascii_lowercase();
    let (radix, body) = match lower.get(..2) {
        Some("0x") => (16, &lower[2..]),
        Some("0b") => (2, &lower[2..]),
        Some("0o") => (8, &lower[2..]),
        _ => (10, lower.as_str()),
    };

    if body.is_empty() || body.starts_with('_') && radix == 10 || body.ends_with('_') {
        return Err(LexErrorKind::InvalidNumber);
    }
    if body.contains("__") || body.contains("_.") || body.contains("._") {
        return Err(LexErrorKind::InvalidNumber);
    }

    let exp_char = if radix == 16 { 'p' } else { 'e' };
    let (mantissa, exponent) = match body.split_once(exp_char) {
        Some((m, e)) => (m, Some(e)),
        None => (body, None),
    };

    let is_float = mantissa.contains('.') || exponent.is_some();
    if is_float && matches!(radix, 2 | 8) {
        return Err(LexErrorKind::InvalidNumber);
    }
    if mantissa.matches('.').count() > 1 {
        return Err(LexErrorKind::InvalidNumber);
    }

    let digit_ok = |c: char| c == '_' || c == '.' || c.is_digit(radix);
    if !mantissa.chars().all(digit_ok) || mantissa.chars().all(|c| c == '.' || c == '_') {
        return Err(LexErrorKind::InvalidNumber);
    }

    if let Some(exp) = exponent {
        let exp = exp.trim_start_matches(['+', '-']);
        if exp.is_empty() || !exp.chars().all(|c| c.is_ascii_digit() || c == '_') {
            return Err(LexErrorKind::InvalidNumber);
        }
    } else if radix == 16 && mantissa.contains('.') {
        // hex floats need a 'p' exponent
        return Err(LexErrorKind::InvalidNumber);
    }

    Ok(match (imag, is_float) {
        (true, _) => NumberKind::Imag,
        (false, true) => NumberKind::Float,
        (false, false) => NumberKind::Int,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumberKind {
    Int,
    Float,
    Imag,
}

// =============================================================================
// 2. Raw token definition (logos DFA)
// =============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t]+")]
#[rustfmt::skip]
enum RawTok {
    #[token("\u{FEFF}")] Bom,

    // Trivia
    #[regex(r"\r\n|\n|\r")] Newline,
    #[regex(r"//[^\n\r]*", logos::skip, allow_greedy = true)] _LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Keywords (before Ident)
    #[token("break")] KwBreak,
    #[token("case")] KwCase,
    #[token("chan")] KwChan,
    #[token("const")] KwConst,
    #[token("continue")] KwContinue,
    #[token("default")] KwDefault,
    #[token("defer")] KwDefer,
    #[token("else")] KwElse,
    #[token("fallthrough")] KwFallthrough,
    #[token("for")] KwFor,
    #[token("func")] KwFunc,
    #[token("go")] KwGo,
    #[token("goto")] KwGoto,
    #[token("if")] KwIf,
    #[token("import")] KwImport,
    #[token("interface")] KwInterface,
    #[token("map")] KwMap,
    #[token("package")] KwPackage,
    #[token("range")] KwRange,
    #[token("return")] KwReturn,
    #[token("select")] KwSelect,
    #[token("struct")] KwStruct,
    #[token("switch")] KwSwitch,
    #[token("type")] KwType,
    #[token("var")] KwVar,

    #[regex(r"[_\p{L}][_\p{L}\p{Nd}]*")] Ident,

    #[regex(r"[0-9]|\.[0-9]", lex_number)] Number,

    #[regex(r"`[^`]*`")] RawString,
    #[regex(r"`[^`]*", unterminated, allow_greedy = true)] UnterminatedRaw,
    #[regex(r#""([^"\\\n\r]|\\.)*""#, validate_interpreted_string)] String,
    #[regex(r#""([^"\\\n\r]|\\.)*"#, unterminated)] UnterminatedString,
    #[regex(r"'([^'\\\n\r]|\\.)+'", validate_rune)] Rune,

    // Operators the declaration grammar cares about
    #[token("...")] Ellipsis,
    #[token("<-")] Arrow,
    #[token("=")] Assign,
    #[token("*")] Star,
    #[token("|")] Pipe,
    #[token("~")] Tilde,

    // Everything else is an opaque operator
    #[token("<<=")] #[token(">>=")] #[token("&^=")]
    #[token("+=")] #[token("-=")] #[token("*=")] #[token("/=")] #[token("%=")]
    #[token("&=")] #[token("|=")] #[token("^=")]
    #[token("<<")] #[token(">>")] #[token("&^")] #[token("&&")] #[token("||")]
    #[token("==")] #[token("!=")] #[token("<=")] #[token(">=")] #[token(":=")]
    #[token("+")] #[token("-")] #[token("/")] #[token("%")] #[token("&")]
    #[token("^")] #[token("!")] #[token("<")] #[token(">")]
    Op,
    #[token("++")] #[token("--")] IncDec,

    // Delimiters
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("[")] LBrack,
    #[token("]")] RBrack,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
    #[token(":")] Colon,
    #[token(".")] Dot,

    // Catch-all (lowest priority)
    #[regex(r".", priority = 0)] Error,
}

impl RawTok {
    /// Go spec: a newline after one of these tokens becomes a `;`.
    #[inline(always)]
    const fn can_insert_semicolon(self) -> bool {
        matches!(
            self,
            Self::Ident
                | Self::Number
                | Self::Rune
                | Self::String
                | Self::RawString
                | Self::KwBreak
                | Self::KwContinue
                | Self::KwFallthrough
                | Self::KwReturn
                | Self::IncDec
                | Self::RParen
                | Self::RBrack
                | Self::RBrace
        )
    }

    fn to_token<'src>(self, slice: &'src str) -> Tok<'src> {
        macro_rules! same_name {
            ($($v:ident),* $(,)?) => {
                match self {
                    $(Self::$v => Tok::$v,)*
                    Self::Ident => Tok::Ident(slice),
                    Self::Rune => Tok::RuneLit(slice),
                    Self::String => Tok::StringLit(slice),
                    Self::RawString => Tok::RawStringLit(slice),
                    Self::Op | Self::IncDec => Tok::Op(slice),
                    // wrapper handles trivia, numbers, BOM and unterminated literals
                    _ => Tok::Error,
                }
            };
        }

        same_name! {
            KwBreak, KwCase, KwChan, KwConst, KwContinue, KwDefault, KwDefer, KwElse,
            KwFallthrough, KwFor, KwFunc, KwGo, KwGoto, KwIf, KwImport, KwInterface,
            KwMap, KwPackage, KwRange, KwReturn, KwSelect, KwStruct, KwSwitch, KwType, KwVar,
            Ellipsis, Arrow, Assign, Star, Pipe, Tilde,
            LParen, RParen, LBrack, RBrack, LBrace, RBrace, Comma, Semi, Colon, Dot,
        }
    }
}

// =============================================================================
// 3. Public token (zero-copy)
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tok<'input> {
    Ident(&'input str),
    IntLit(&'input str),
    FloatLit(&'input str),
    ImagLit(&'input str),
    RuneLit(&'input str),
    StringLit(&'input str),
    RawStringLit(&'input str),

    // Keywords
    KwBreak,
    KwCase,
    KwChan,
    KwConst,
    KwContinue,
    KwDefault,
    KwDefer,
    KwElse,
    KwFallthrough,
    KwFor,
    KwFunc,
    KwGo,
    KwGoto,
    KwIf,
    KwImport,
    KwInterface,
    KwMap,
    KwPackage,
    KwRange,
    KwReturn,
    KwSelect,
    KwStruct,
    KwSwitch,
    KwType,
    KwVar,

    Ellipsis,
    Arrow,
    Assign,
    Star,
    Pipe,
    Tilde,
    /// Any operator without a role in declarations (`+`, `<<=`, `++`, ...).
    Op(&'input str),

    LParen,
    RParen,
    LBrack,
    RBrack,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Colon,
    Dot,

    Error,
}

impl<'input> std::fmt::Display for Tok<'input> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Ident(s) => write!(f, "identifier `{s}`"),
            Tok::IntLit(s) | Tok::FloatLit(s) | Tok::ImagLit(s) => write!(f, "number `{s}`"),
            Tok::RuneLit(s) | Tok::StringLit(s) | Tok::RawStringLit(s) => {
                write!(f, "literal {s}")
            }
            Tok::Op(s) => write!(f, "`{s}`"),
            Tok::Ellipsis => f.write_str("`...`"),
            Tok::Arrow => f.write_str("`<-`"),
            Tok::Assign => f.write_str("`=`"),
            Tok::Star => f.write_str("`*`"),
            Tok::Pipe => f.write_str("`|`"),
            Tok::Tilde => f.write_str("`~`"),
            Tok::LParen => f.write_str("`(`"),
            Tok::RParen => f.write_str("`)`"),
            Tok::LBrack => f.write_str("`[`"),
            Tok::RBrack => f.write_str("`]`"),
            Tok::LBrace => f.write_str("`{`"),
            Tok::RBrace => f.write_str("`}`"),
            Tok::Comma => f.write_str("`,`"),
            Tok::Semi => f.write_str("`;`"),
            Tok::Colon => f.write_str("`:`"),
            Tok::Dot => f.write_str("`.`"),
            Tok::Error => f.write_str("invalid token"),
            kw => {
                let name = format!("{kw:?}");
                write!(f, "keyword `{}`", name.trim_start_matches("Kw").to_lowercase())
            }
        }
    }
}

// =============================================================================
// 4. Lexer wrapper: semicolon insertion + diags
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    pending: Option<(usize, Tok<'src>, usize)>,
    diags: Vec<Diag>,
    last_can_insert_semi: bool,
    src_len: usize,
    eof_done: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            pending: None,
            diags: Vec::new(),
            last_can_insert_semi: false,
            src_len: input.len(),
            eof_done: false,
        }
    }

    pub fn take_diags(&mut self) -> Vec<Diag> {
        std::mem::take(&mut self.diags)
    }

    fn error_at(&mut self, kind: LexErrorKind, span: Range<usize>) -> (usize, Tok<'src>, usize) {
        self.diags.push(
            LexError {
                kind,
                span: Span::from_range(span.clone()),
            }
            .diag(),
        );
        self.last_can_insert_semi = false;
        (span.start, Tok::Error, span.end)
    }

    /// Returns true when `raw` was trivia (consumed without emitting a real token).
    fn handle_trivia(&mut self, raw: RawTok, span: &Range<usize>, slice: &str) -> bool {
        match raw {
            RawTok::Newline => {
                if std::mem::take(&mut self.last_can_insert_semi) {
                    self.pending = Some((span.start, Tok::Semi, span.start));
                }
                true
            }
            RawTok::BlockComment => {
                if self.last_can_insert_semi {
                    if let Some(off) = first_newline_offset(slice) {
                        self.last_can_insert_semi = false;
                        let pos = span.start + off;
                        self.pending = Some((pos, Tok::Semi, pos));
                    }
                }
                true
            }
            _ => false,
        }
    }

    fn number(&mut self, span: Range<usize>, slice: &'src str) -> (usize, Tok<'src>, usize) {
        match classify_number(slice) {
            Ok(kind) => {
                self.last_can_insert_semi = true;
                let tok = match kind {
                    NumberKind::Int => Tok::IntLit(slice),
                    NumberKind::Float => Tok::FloatLit(slice),
                    NumberKind::Imag => Tok::ImagLit(slice),
                };
                (span.start, tok, span.end)
            }
            Err(kind) => self.error_at(kind, span),
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = (usize, Tok<'src>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(tok) = self.pending.take() {
                return Some(tok);
            }

            if self.eof_done {
                return None;
            }

            let raw = match self.logos.next() {
                None => {
                    // the final ';' (if any) goes through `pending` on the next turn
                    self.eof_done = true;
                    if std::mem::take(&mut self.last_can_insert_semi) {
                        self.pending = Some((self.src_len, Tok::Semi, self.src_len));
                    }
                    continue;
                }
                Some(Err(kind)) => {
                    let span = self.logos.span();
                    return Some(self.error_at(kind, span));
                }
                Some(Ok(raw)) => raw,
            };

            let span = self.logos.span();
            let slice = self.logos.slice();

            if raw == RawTok::Bom {
                if span.start == 0 {
                    continue;
                }
                return Some(self.error_at(LexErrorKind::InvalidToken, span));
            }

            if self.handle_trivia(raw, &span, slice) {
                continue;
            }

            match raw {
                RawTok::Error => return Some(self.error_at(LexErrorKind::InvalidToken, span)),
                RawTok::Number => return Some(self.number(span, slice)),
                _ => {}
            }

            self.last_can_insert_semi = raw.can_insert_semicolon();
            return Some((span.start, raw.to_token(slice), span.end));
        }
    }
}
