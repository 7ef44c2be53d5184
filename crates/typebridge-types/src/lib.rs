//! Classification, naming and type translation.
//!
//! These are the pure rules of the generator: given a [`Program`], decide
//! which symbols become native declarations, what they are called and which
//! native type expression stands for each checker type.
//!
//! [`Program`]: typebridge_symbols::Program

pub mod classify;
pub mod error;
pub mod mangle;
pub mod translate;

pub use classify::{classify_symbol, hybrid_kinds, is_class_like, is_enum_like, SymbolClass};
pub use error::{PreconditionViolation, TranslateResult};
pub use mangle::{
    boundary_lookup_expression, cpp_string_literal, cppify_local_name, cppify_name, mangle_path,
    mangle_symbol_path,
};
pub use translate::{classify_type, translate_type, TypeShape};
