use miette::Diagnostic;
use thiserror::Error;
use typebridge_symbols::{DeclKind, ModifierFlags, SymbolFlags};

/// Result type for classification and translation
pub type TranslateResult<T> = Result<T, PreconditionViolation>;

/// A construct the translation rules do not support.
///
/// Unsupported type shapes and unresolved enum constants are not violations;
/// they degrade to comments in the output instead.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum PreconditionViolation {
    /// A name that cannot become a native identifier
    #[error("cannot convert `{name}` to a native identifier")]
    #[diagnostic(
        code(typebridge::types::invalid_local_name),
        help("only ASCII letters, digits, `_` and `-` are accepted")
    )]
    InvalidLocalName {
        name: String,
        /// First offending character; `None` for an empty name
        character: Option<char>,
    },

    /// A union with fewer than two components
    #[error("union `{display}` has {components} component(s), expected at least 2")]
    #[diagnostic(code(typebridge::types::degenerate_union))]
    DegenerateUnion { display: String, components: usize },

    /// A class or interface type with type parameters or a polymorphic `this`
    #[error("type `{display}` is generic")]
    #[diagnostic(
        code(typebridge::types::generic_type),
        help("type parameters are not supported by the binding surface")
    )]
    GenericType { display: String },

    #[error("declaration of `{name}` carries unsupported modifiers (flags={})", .modifiers.bits())]
    #[diagnostic(code(typebridge::types::unexpected_modifiers))]
    UnexpectedModifiers { name: String, modifiers: ModifierFlags },

    #[error("declaration of `{name}` is a {kind:?}, not a method, method signature or constructor")]
    #[diagnostic(code(typebridge::types::missing_signature_declaration))]
    MissingSignatureDeclaration { name: String, kind: DeclKind },

    #[error("`{name}` has {found} declaration(s), expected {expected}")]
    #[diagnostic(code(typebridge::types::declaration_count))]
    DeclarationCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("`{name}` has flags={}, expected {expected}", .flags.bits())]
    #[diagnostic(code(typebridge::types::unexpected_symbol_flags))]
    UnexpectedSymbolFlags {
        name: String,
        flags: SymbolFlags,
        expected: &'static str,
    },

    #[error("no type is recorded for `{name}`")]
    #[diagnostic(code(typebridge::types::missing_declared_type))]
    MissingDeclaredType { name: String },
}
