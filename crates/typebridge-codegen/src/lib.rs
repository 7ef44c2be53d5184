//! Walks a checked program and emits the native binding source for it.

pub mod config;
pub mod descriptor;
pub mod emit;
pub mod error;
pub mod walker;

pub use config::EmitConfig;
pub use descriptor::{ClassDescriptor, MethodDescriptor};
pub use emit::{Bindings, Emitter};
pub use error::CodegenError;
pub use walker::{resolve_roots, RootResolution, WalkOutput, Walker, Worklists};

use typebridge_symbols::{Program, SymbolId};

/// Walks every root in order with a single walker.
pub fn walk(program: &Program, roots: &[SymbolId]) -> WalkOutput {
    let mut walker = Walker::new(program);
    for &root in roots {
        walker.walk_root(root);
    }
    walker.finish()
}
