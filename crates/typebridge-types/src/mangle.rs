//! Native names for symbols.

use std::fmt::Write;

use typebridge_symbols::{Program, SymbolId};

use crate::error::{PreconditionViolation, TranslateResult};

/// Prefix of every mangled symbol path.
pub const MANGLE_PREFIX: &str = "_js_j";

/// Globally unique native identifier for `symbol`, derived from its
/// fully-qualified name.
///
/// Every character outside `[A-Za-z0-9]` is escaped, including `_` itself,
/// so distinct paths never collide (`a.b` and `a_db` mangle differently).
pub fn mangle_symbol_path(program: &Program, symbol: SymbolId) -> String {
    mangle_path(&program.fully_qualified_name(symbol))
}

pub fn mangle_path(path: &str) -> String {
    let mut out = String::with_capacity(MANGLE_PREFIX.len() + path.len() * 2);
    out.push_str(MANGLE_PREFIX);
    for c in path.chars() {
        match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => out.push(c),
            '_' => out.push_str("_u"),
            ',' => out.push_str("_c"),
            '.' => out.push_str("_d"),
            '-' => out.push_str("_m"),
            '"' => out.push_str("_q"),
            '\'' => out.push_str("_a"),
            ' ' => out.push_str("_s"),
            '/' => out.push_str("_l"),
            other => {
                let _ = write!(out, "_x{:x}_", other as u32);
            }
        }
    }
    out
}

/// Member-local native name: the symbol's own name with `-` turned into `_`.
pub fn cppify_local_name(program: &Program, symbol: SymbolId) -> TranslateResult<String> {
    cppify_name(&program.symbol(symbol).name)
}

pub fn cppify_name(name: &str) -> TranslateResult<String> {
    if name.is_empty() {
        return Err(PreconditionViolation::InvalidLocalName {
            name: String::new(),
            character: None,
        });
    }
    name.chars()
        .map(|c| match c {
            '-' => Ok('_'),
            'a'..='z' | 'A'..='Z' | '0'..='9' | '_' => Ok(c),
            other => Err(PreconditionViolation::InvalidLocalName {
                name: name.to_string(),
                character: Some(other),
            }),
        })
        .collect()
}

/// Expression that fetches the runtime object behind `symbol`, walking from
/// the global scope down through its parents.
pub fn boundary_lookup_expression(program: &Program, symbol: SymbolId) -> String {
    let data = program.symbol(symbol);
    match data.parent {
        None => format!("emscripten::val::global({})", cpp_string_literal(&data.name)),
        Some(parent) => format!(
            "{}[{}]",
            boundary_lookup_expression(program, parent),
            cpp_string_literal(&data.name)
        ),
    }
}

/// Quoted native string literal holding `text`.
pub fn cpp_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // Octal escapes stop after three digits, unlike `\x`.
            c if c.is_control() => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
