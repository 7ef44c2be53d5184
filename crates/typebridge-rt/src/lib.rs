//! Native callbacks for the dynamic runtime.
//!
//! Native code hands the runtime a function pointer and a context pointer,
//! both encoded as [`PointerNumber`]s. When script code calls the resulting
//! function, the runtime passes both numbers back to [`CALL_PRIMITIVE`],
//! which rebuilds the pointers and calls into native code.

pub mod callback;
pub mod error;
pub mod handle;
pub mod local;
pub mod pointer;
pub mod trampoline;

pub use callback::{install, install_closure, CallbackHandle, DynamicRuntime};
pub use error::CallbackError;
pub use handle::DynHandle;
pub use local::{LocalRuntime, Value};
pub use pointer::{CallbackFn, ContextPointer, PointerNumber, PointerSafety};
pub use trampoline::{invoke, typebridge_callback_call, CALL_PRIMITIVE};
