//! Depth-first traversal of the symbol graph.
//!
//! The walker queues every enum-like and class-like symbol it reaches and
//! records an indented trace of what it saw. Each symbol is expanded once;
//! later encounters are noted in the trace and not followed.

use fxhash::FxHashSet;
use log::{debug, warn};
use typebridge_symbols::{Program, SignatureKind, SymbolFlags, SymbolId};
use typebridge_types::{classify_symbol, SymbolClass};

/// Symbols queued for emission, in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Worklists {
    enums: Vec<SymbolId>,
    classes: Vec<SymbolId>,
}

impl Worklists {
    pub fn enums(&self) -> &[SymbolId] {
        &self.enums
    }

    pub fn classes(&self) -> &[SymbolId] {
        &self.classes
    }

    pub fn is_empty(&self) -> bool {
        self.enums.is_empty() && self.classes.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WalkOutput {
    pub worklists: Worklists,
    /// Indentation-structured trace of the traversal.
    pub trace: String,
}

pub struct Walker<'p> {
    program: &'p Program,
    visited: FxHashSet<SymbolId>,
    worklists: Worklists,
    trace: String,
}

impl<'p> Walker<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            visited: FxHashSet::default(),
            worklists: Worklists::default(),
            trace: String::new(),
        }
    }

    pub fn walk_root(&mut self, root: SymbolId) {
        debug!("walking module {}", self.program.symbol(root).name);
        self.walk(root, 0);
    }

    pub fn finish(self) -> WalkOutput {
        debug!(
            "walk queued {} enum(s) and {} class(es) from {} symbol(s)",
            self.worklists.enums.len(),
            self.worklists.classes.len(),
            self.visited.len()
        );
        WalkOutput {
            worklists: self.worklists,
            trace: self.trace,
        }
    }

    fn walk(&mut self, symbol: SymbolId, indent: usize) {
        let program = self.program;
        let data = program.symbol(symbol);
        self.line(
            indent,
            &format!("'{}', flags={}", program.fully_qualified_name(symbol), data.flags.bits()),
        );
        if !self.visited.insert(symbol) {
            self.line(indent + 2, "(already visited)");
            return;
        }

        match classify_symbol(data.flags) {
            SymbolClass::Enum => self.worklists.enums.push(symbol),
            SymbolClass::Class => self.worklists.classes.push(symbol),
            SymbolClass::Other => {}
        }

        self.line(indent + 2, "members");
        for member in program.members(symbol) {
            self.walk(member, indent + 4);
        }

        if data.flags.intersects(SymbolFlags::MODULE) {
            self.line(indent + 2, "exportsOfModule");
            for export in program.exports_of_module(symbol) {
                self.walk(export, indent + 4);
            }
        } else if data.exports.is_some() {
            self.line(indent + 2, "exports");
            for export in program.exports(symbol) {
                self.walk(export, indent + 4);
            }
        }

        let declared = program.declared_type_of_symbol(symbol);
        for (heading, kind) in [
            ("call signatures", SignatureKind::Call),
            ("constructors", SignatureKind::Construct),
        ] {
            self.line(indent + 2, heading);
            if let Some(ty) = declared {
                for &signature in program.signatures_of_type(ty, kind) {
                    self.line(indent + 4, program.signature_to_string(signature));
                }
            }
        }

        if let Some(ty) = declared.filter(|&ty| program.class_or_interface(ty).is_some()) {
            self.line(indent + 2, "base types");
            for &base in program.base_types(ty) {
                self.line(indent + 4, program.type_to_string(base));
            }
        }
    }

    fn line(&mut self, indent: usize, text: &str) {
        self.trace.extend(std::iter::repeat(' ').take(indent));
        self.trace.push_str(text);
        self.trace.push('\n');
    }
}

/// Module symbols of the requested files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RootResolution {
    /// In program source-file order.
    pub roots: Vec<SymbolId>,
    /// Requested files without a module symbol.
    pub missing: Vec<String>,
}

pub fn resolve_roots<S: AsRef<str>>(program: &Program, files: &[S]) -> RootResolution {
    let requested = |name: &str| files.iter().any(|file| file.as_ref() == name);
    let mut resolution = RootResolution::default();

    for file in program.source_files() {
        if !requested(&file.file_name) {
            continue;
        }
        match file.symbol {
            Some(symbol) => resolution.roots.push(symbol),
            None => {
                warn!("Module not found for {}", file.file_name);
                resolution.missing.push(file.file_name.clone());
            }
        }
    }

    for file in files {
        let file = file.as_ref();
        if program.source_file(file).is_none() && !resolution.missing.iter().any(|m| m == file) {
            warn!("{} is not part of the program", file);
            resolution.missing.push(file.to_string());
        }
    }

    resolution
}
