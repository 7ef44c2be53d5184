//! Symbol graph of a type-checked interface description.
//!
//! A [`Program`] is produced by a [`ProgramLoader`] (usually [`DumpLoader`])
//! or assembled with [`ProgramBuilder`], and is read-only afterwards.

pub mod builder;
pub mod error;
pub mod flags;
pub mod graph;
pub mod load;

pub use builder::{Param, ProgramBuilder};
pub use error::LoadError;
pub use flags::{ModifierFlags, SymbolFlags, TypeFlags};
pub use graph::{
    CheckerDiagnostic, ConstantValue, DeclId, DeclKind, Declaration, ObjectType, Program, Signature,
    SignatureId, SignatureKind, SourceFile, Symbol, SymbolId, SymbolTable, TypeData, TypeId,
};
pub use load::{DumpLoader, ProgramLoader};
