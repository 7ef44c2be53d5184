use miette::Diagnostic;
use thiserror::Error;

use crate::handle::DynHandle;
use crate::pointer::PointerSafety;

/// Errors raised while installing or invoking callbacks.
#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum CallbackError {
    #[error("the runtime reports {mode:?} pointer safety; pointers cannot round-trip through integers")]
    #[diagnostic(
        code(typebridge::rt::pointer_safety),
        help("callbacks need a host with relaxed or preferred pointer safety")
    )]
    PointerSafety { mode: PointerSafety },

    #[error("function {handle:?} was detached from its native callback")]
    #[diagnostic(code(typebridge::rt::detached))]
    Detached { handle: DynHandle },

    #[error("value {handle:?} is not a function")]
    #[diagnostic(code(typebridge::rt::not_callable))]
    NotCallable { handle: DynHandle },

    #[error("value {handle:?} does not exist")]
    #[diagnostic(code(typebridge::rt::unknown_handle))]
    UnknownHandle { handle: DynHandle },
}
