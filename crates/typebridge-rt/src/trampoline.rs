//! Entry point the dynamic runtime calls to re-enter native code.

use crate::handle::DynHandle;
use crate::pointer::{number_to_context, number_to_function, PointerNumber};

/// Name under which [`typebridge_callback_call`] is registered with the
/// dynamic runtime.
pub const CALL_PRIMITIVE: &str = "typebridge_callback_call";

/// Calls the native function behind `function` with its context.
///
/// # Safety
///
/// `function` and `context` must be the numbers a [`crate::CallbackHandle`]
/// registered, and that handle must still be alive.
pub unsafe fn invoke(
    function: PointerNumber,
    context: PointerNumber,
    this: DynHandle,
    args: DynHandle,
) -> DynHandle {
    let function = number_to_function(function);
    function(number_to_context(context), this, args)
}

/// FFI: the call primitive exported to the dynamic runtime.
///
/// # Safety
///
/// See [`invoke`].
#[no_mangle]
pub unsafe extern "C" fn typebridge_callback_call(
    function: PointerNumber,
    context: PointerNumber,
    this: DynHandle,
    args: DynHandle,
) -> DynHandle {
    invoke(function, context, this, args)
}
