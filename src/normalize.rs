//! Import block cleanup for generated files.
//!
//! Deduplicates import specs, drops the ones whose package name is known
//! and never used as a qualifier, and prints a single grouped block with
//! standard library paths first. An import whose package name can only be
//! guessed from its path is dropped only when no qualifier is left that it
//! could be providing.

use std::collections::{BTreeSet, HashSet};

use go_decl_parser::ast::{ImportName, TopLevelDecl};
use go_decl_parser::{parse_source, Lexer, ParseFailure, Span, Tok};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("{file}: generated source does not parse: {details}")]
    Parse {
        file: String,
        details: String,
        #[source]
        source: ParseFailure,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ImportEntry {
    path: String,
    name: Option<String>,
}

impl ImportEntry {
    fn is_std(&self) -> bool {
        let first = self.path.split('/').next().unwrap_or_default();
        !first.contains('.')
    }

    /// Blank and dot imports are kept regardless of use.
    fn always_kept(&self) -> bool {
        matches!(self.name.as_deref(), Some("_" | "."))
    }

    /// The package name is fixed by an alias or by a last path element
    /// that is a plain identifier other than a `vN` major version.
    fn name_is_certain(&self) -> bool {
        if self.name.is_some() {
            return true;
        }
        let last = self.path.rsplit('/').next().unwrap_or_default();
        is_identifier(last) && !is_major_version(last)
    }

    /// Names the package may be declared with, best guess first.
    fn candidate_names(&self) -> Vec<String> {
        if let Some(name) = &self.name {
            return vec![name.clone()];
        }
        let last = self.path.rsplit('/').next().unwrap_or_default();
        let mut names = vec![
            assumed_package_name(&self.path),
            last.to_string(),
            last.chars().filter(|&c| c == '_' || c.is_alphanumeric()).collect(),
        ];
        names.dedup();
        names
    }
}

/// Package name assumed for an import path without an explicit name.
///
/// Last path element; a `vN` element defers to its parent, a `go-` prefix
/// is dropped and the result stops at the first non-identifier character.
pub fn assumed_package_name(path: &str) -> String {
    let mut elems = path.rsplit('/');
    let mut base = elems.next().unwrap_or_default();
    if is_major_version(base) {
        if let Some(parent) = elems.next() {
            base = parent;
        }
    }
    let base = base.strip_prefix("go-").unwrap_or(base);
    let end = base
        .find(|c: char| !(c == '_' || c.is_alphanumeric()))
        .unwrap_or(base.len());
    base[..end].to_string()
}

fn is_major_version(elem: &str) -> bool {
    elem.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c == '_' || c.is_alphabetic())
        && chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// Rewrites the import declarations of `text`.
///
/// `file_hint` names the destination in error messages.
pub fn normalize(text: &str, file_hint: &str) -> Result<String, NormalizeError> {
    let parsed = parse_source(text).map_err(|source| NormalizeError::Parse {
        file: file_hint.to_string(),
        details: source
            .diags
            .first()
            .map(|d| d.render(text))
            .unwrap_or_default(),
        source,
    })?;

    let specs = parsed.imports();
    let Some(last_path_end) = specs.iter().map(|s| s.path.end as usize).max() else {
        return Ok(text.to_string());
    };

    let toks: Vec<_> = Lexer::new(text).collect();
    let Some(start) = toks
        .iter()
        .find(|(_, t, _)| *t == Tok::KwImport)
        .map(|(s, _, _)| *s)
    else {
        return Ok(text.to_string());
    };

    // a grouped declaration ends at its `)`
    let mut end = last_path_end;
    for (_, tok, e) in toks.iter().filter(|(s, _, _)| *s >= last_path_end) {
        match tok {
            Tok::Semi => continue,
            Tok::RParen => {
                end = *e;
                break;
            }
            _ => break,
        }
    }

    // inside bodies `args.Get` is a local, not a package
    let bodies: Vec<Span> = parsed
        .decls()
        .iter()
        .filter_map(|d| match d {
            TopLevelDecl::Func(id) => parsed.arena.funcs[*id].body,
            _ => None,
        })
        .collect();
    let used = qualifiers(&toks, end, &bodies);
    let entries: BTreeSet<ImportEntry> = specs
        .iter()
        .map(|spec| ImportEntry {
            path: parsed.import_path(spec).to_string(),
            name: match spec.name {
                None => None,
                Some(ImportName::Dot(_)) => Some(".".to_string()),
                Some(ImportName::Blank(_)) => Some("_".to_string()),
                Some(ImportName::Name(n)) => Some(parsed.name(n).to_string()),
            },
        })
        .collect();

    let unclaimed = used.iter().any(|q| {
        !entries
            .iter()
            .any(|e| e.candidate_names().iter().any(|n| n == q))
    });
    let (kept, dropped): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| {
        e.always_kept()
            || e.candidate_names().iter().any(|n| used.contains(n.as_str()))
            || (unclaimed && !e.name_is_certain())
    });
    for entry in &dropped {
        debug!(file = file_hint, path = %entry.path, "dropping unused import");
    }

    let (std, other): (Vec<_>, Vec<_>) = kept.into_iter().partition(ImportEntry::is_std);
    let mut rest = &text[end..];
    if std.is_empty() && other.is_empty() {
        rest = rest.trim_start_matches('\n');
        if rest.is_empty() {
            return Ok(format!("{}\n", text[..start].trim_end_matches('\n')));
        }
        return Ok(format!("{}{}", &text[..start], rest));
    }
    Ok(format!("{}{}{}", &text[..start], import_block(&std, &other), rest))
}

/// Identifiers used as `x.` qualifiers after byte offset `from`, outside `skip`.
fn qualifiers<'src>(
    toks: &[(usize, Tok<'src>, usize)],
    from: usize,
    skip: &[Span],
) -> HashSet<&'src str> {
    let mut used = HashSet::new();
    let mut prev = None;
    for window in toks.windows(2) {
        let (s, tok, _) = window[0];
        let in_skipped = skip
            .iter()
            .any(|b| (b.start as usize..b.end as usize).contains(&s));
        if s >= from && !in_skipped {
            if let (Tok::Ident(name), Tok::Dot) = (tok, window[1].1) {
                if prev != Some(Tok::Dot) {
                    used.insert(name);
                }
            }
        }
        prev = Some(tok);
    }
    used
}

fn import_block(std: &[ImportEntry], other: &[ImportEntry]) -> String {
    let mut out = String::from("import (\n");
    for (i, group) in [std, other].into_iter().filter(|g| !g.is_empty()).enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for entry in group {
            out.push('\t');
            if let Some(name) = &entry.name {
                out.push_str(name);
                out.push(' ');
            }
            out.push('"');
            out.push_str(&entry.path);
            out.push_str("\"\n");
        }
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assumed_names() {
        assert_eq!(assumed_package_name("context"), "context");
        assert_eq!(assumed_package_name("github.com/stretchr/testify/mock"), "mock");
        assert_eq!(assumed_package_name("github.com/jackc/pgx/v5"), "pgx");
        assert_eq!(assumed_package_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(assumed_package_name("github.com/mattn/go-sqlite3"), "sqlite3");
    }

    #[test]
    fn groups_dedupes_and_drops_unused() {
        let src = "// banner\n\npackage p\n\n\
                   import (\n\
                   \t\"github.com/stretchr/testify/mock\"\n\
                   \t\"io\"\n\
                   \t\"context\"\n\
                   \t\"io\"\n\
                   \t\"strings\"\n\
                   \t_ \"embed\"\n\
                   )\n\n\
                   type M struct {\n\tmock.Mock\n}\n\n\
                   func (m *M) R(ctx context.Context) io.Reader { return nil }\n";
        let out = normalize(src, "m_mock.go").unwrap();
        let expected_head = "// banner\n\npackage p\n\n\
                             import (\n\
                             \t\"context\"\n\
                             \t_ \"embed\"\n\
                             \t\"io\"\n\
                             \n\
                             \t\"github.com/stretchr/testify/mock\"\n\
                             )\n\ntype M struct {";
        assert!(out.starts_with(expected_head), "{out}");
        assert!(!out.contains("strings"));
    }

    #[test]
    fn aliased_imports_use_the_alias() {
        let src = "package p\n\nimport (\n\tctx2 \"context\"\n\tctx3 \"context\"\n)\n\nvar _ ctx2.Context\n";
        let out = normalize(src, "x.go").unwrap();
        assert!(out.contains("\tctx2 \"context\"\n"));
        assert!(!out.contains("ctx3"));
    }

    #[test]
    fn selector_chains_do_not_count() {
        // `a.mock.Called` uses `a`, not a package named `mock`
        let src = "package p\n\nimport \"github.com/x/mock\"\n\nvar x = a.mock.Called\n";
        let out = normalize(src, "x.go").unwrap();
        assert!(!out.contains("import"), "{out}");
        assert!(out.starts_with("package p\n\nvar x"), "{out}");
    }

    #[test]
    fn path_guesses_never_drop_a_needed_import() {
        let src = "package p\n\n\
                   import (\n\
                   \t\"github.com/foo/bar-baz\"\n\
                   \t\"k8s.io/api/core/v1\"\n\
                   )\n\n\
                   type M struct{}\n\n\
                   func (m *M) Get(name string) (r0 *v1.Pod, r1 barbaz.T) { return nil, nil }\n";
        let out = normalize(src, "x.go").unwrap();
        assert!(out.contains("\t\"github.com/foo/bar-baz\"\n"), "{out}");
        assert!(out.contains("\t\"k8s.io/api/core/v1\"\n"), "{out}");
    }

    #[test]
    fn unclaimed_qualifier_keeps_uncertain_imports() {
        // `papi` matches no candidate name, so the import may be providing it
        let src = "package p\n\nimport \"example.com/x/pods-api\"\n\nvar _ papi.List\n";
        let out = normalize(src, "x.go").unwrap();
        assert!(out.contains("\"example.com/x/pods-api\""), "{out}");
    }

    #[test]
    fn locals_in_bodies_do_not_keep_imports() {
        let src = "package p\n\n\
                   import (\n\
                   \t\"gopkg.in/yaml.v3\"\n\
                   \t\"github.com/stretchr/testify/mock\"\n\
                   )\n\n\
                   type M struct {\n\tmock.Mock\n}\n\n\
                   func (m *M) F() (r0 int) {\n\targs := m.Called()\n\treturn args.Int(0)\n}\n";
        let out = normalize(src, "x.go").unwrap();
        assert!(!out.contains("yaml"), "{out}");
        assert!(out.contains("\t\"github.com/stretchr/testify/mock\"\n"), "{out}");
    }

    #[test]
    fn unparsable_text_is_an_error() {
        let err = normalize("package p\nfunc (\n", "broken_mock.go").unwrap_err();
        assert!(err.to_string().starts_with("broken_mock.go: generated source does not parse"));
    }
}
