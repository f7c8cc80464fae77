//! Extracting import locations from program source.

use crate::{address::Address, program::ProgramKind};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::Path;
use thiserror::Error;

/// What the resolver needs to know about a program's source.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceSummary {
    pub kind: ProgramKind,
    /// The name of the declared contract, if any.
    pub name: Option<String>,
    /// Import locations in source order.
    pub imports: Vec<String>,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ParseError {
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("malformed import declaration on line {line}: `{text}`")]
    MalformedImport { line: usize, text: String },
}

/// Source language specific handling of imports.
pub trait ImportExtractor {
    /// Summarize the given source: its kind, declared name and the locations it imports.
    fn extract(&self, code: &str) -> Result<SourceSummary, ParseError>;

    /// Rewrite every import of a location in `addresses` to import from that address instead.
    fn replace_imports(&self, code: &str, addresses: &IndexMap<String, Address>) -> String;
}

impl<T: ImportExtractor + ?Sized> ImportExtractor for &T {
    fn extract(&self, code: &str) -> Result<SourceSummary, ParseError> {
        (**self).extract(code)
    }

    fn replace_imports(&self, code: &str, addresses: &IndexMap<String, Address>) -> String {
        (**self).replace_imports(code, addresses)
    }
}

static IMPORT_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*import\b").unwrap());
// Anchored at the start of an import. Names and `from` may be spread over several lines.
static IMPORT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^[ \t]*import\s+(?:[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*\s+from\s+)?(?:"([^"\n]+)"|0x[0-9a-fA-F]+|[A-Za-z_]\w*)[ \t]*;?[ \t]*(?:\r?\n|\z)"#,
    )
    .unwrap()
});
static STRING_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?m)^(?P<lead>[ \t]*import\s+)(?:(?P<names>[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s+from\s+)?"(?P<location>[^"\n]+)""#,
    )
    .unwrap()
});
static CONTRACT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*(?:(?:pub|priv|access\s*\([^)]*\))\s+)?contract\s+(?:interface\s+)?([A-Za-z_]\w*)",
    )
    .unwrap()
});

/// Extracts imports from Cadence source.
///
/// Only string locations (`import Foo from "./Foo.cdc"`, `import "Foo"`) are reported. Address
/// and identifier locations (`import Foo from 0x01`, `import Crypto`) already name their target
/// and need no resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct CadenceImports;

impl CadenceImports {
    /// Blank out comments, leaving string literals and line breaks in place.
    ///
    /// Block comments nest. Comment markers inside string literals are left alone.
    fn strip_comments(code: &str) -> Result<String, ParseError> {
        let mut stripped = String::with_capacity(code.len());
        let mut chars = code.chars();
        let mut depth = 0usize;
        let mut in_string = false;
        while let Some(c) = chars.next() {
            let next = chars.clone().next();
            if depth > 0 {
                match (c, next) {
                    ('/', Some('*')) => {
                        chars.next();
                        depth += 1;
                        stripped.push_str("  ");
                    }
                    ('*', Some('/')) => {
                        chars.next();
                        depth -= 1;
                        stripped.push_str("  ");
                    }
                    ('\n', _) => stripped.push('\n'),
                    _ => stripped.push(' '),
                }
            } else if in_string {
                stripped.push(c);
                match c {
                    '\\' => stripped.extend(chars.next()),
                    // Cadence strings cannot span lines.
                    '"' | '\n' => in_string = false,
                    _ => {}
                }
            } else {
                match (c, next) {
                    ('/', Some('/')) => {
                        while chars.clone().next().is_some_and(|c| c != '\n') {
                            chars.next();
                        }
                    }
                    ('/', Some('*')) => {
                        chars.next();
                        depth = 1;
                        stripped.push_str("  ");
                    }
                    ('"', _) => {
                        in_string = true;
                        stripped.push(c);
                    }
                    _ => stripped.push(c),
                }
            }
        }
        if depth > 0 {
            return Err(ParseError::UnterminatedComment);
        }
        Ok(stripped)
    }
}

impl ImportExtractor for CadenceImports {
    fn extract(&self, code: &str) -> Result<SourceSummary, ParseError> {
        let code = Self::strip_comments(code)?;

        let mut imports = vec![];
        for start in IMPORT_START.find_iter(&code) {
            let decl = &code[start.start()..];
            let caps = IMPORT_DECL
                .captures(decl)
                .ok_or_else(|| ParseError::MalformedImport {
                    line: code[..start.start()].matches('\n').count() + 1,
                    text: decl.lines().next().unwrap_or_default().trim().to_string(),
                })?;
            if let Some(location) = caps.get(1) {
                imports.push(location.as_str().to_string());
            }
        }

        let name = CONTRACT_DECL
            .captures(&code)
            .map(|caps| caps[1].to_string());
        let kind = match name {
            Some(_) => ProgramKind::Contract,
            None => ProgramKind::Script,
        };

        Ok(SourceSummary {
            kind,
            name,
            imports,
        })
    }

    fn replace_imports(&self, code: &str, addresses: &IndexMap<String, Address>) -> String {
        STRING_IMPORT
            .replace_all(code, |caps: &Captures| {
                let location = &caps["location"];
                let Some(address) = addresses.get(location) else {
                    return caps[0].to_string();
                };
                let names = caps
                    .name("names")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| contract_name_from_location(location));
                format!("{}{} from {}", &caps["lead"], names, address)
            })
            .into_owned()
    }
}

/// `./contracts/Foo.cdc` and `Foo` both name the contract `Foo`.
fn contract_name_from_location(location: &str) -> String {
    Path::new(location)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(location)
        .to_string()
}
