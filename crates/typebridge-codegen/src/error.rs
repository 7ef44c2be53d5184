use miette::Diagnostic;
use thiserror::Error;
use typebridge_types::PreconditionViolation;

#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum CodegenError {
    /// A worklist symbol whose declarations break a translation rule
    #[error("cannot emit bindings for `{symbol}`")]
    #[diagnostic(code(typebridge::codegen::emit))]
    Emit {
        /// Fully-qualified name of the symbol being emitted
        symbol: String,
        #[source]
        #[diagnostic_source]
        source: PreconditionViolation,
    },
}

impl CodegenError {
    pub fn violation(&self) -> &PreconditionViolation {
        match self {
            CodegenError::Emit { source, .. } => source,
        }
    }
}
