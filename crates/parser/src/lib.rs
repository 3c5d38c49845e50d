//! Declaration-level Go parser (Logos lexer + recursive descent).
//!
//! - The lexer uses Logos and implements Go semicolon insertion.
//! - The parser builds an arena AST of the package clause, imports, type
//!   declarations and function signatures. Bodies are skipped.

pub mod ast;
pub mod error;
pub mod lexer;
mod parser;
mod parser_support;
pub mod walk;

pub use error::{Diag, ParseFailure, Span};
pub use lexer::{Lexer, Tok};
pub use parser::{parse_source, ParsedFile};
