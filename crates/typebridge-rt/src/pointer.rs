//! Pointer <-> integer conversions at the runtime boundary.
//!
//! The dynamic runtime can only hold numbers, so function and context
//! pointers cross it as [`PointerNumber`]s. This module is the only place
//! that converts in either direction.

use std::ffi::c_void;
use std::mem;

use crate::handle::DynHandle;

/// Integer representation of a pointer handed to the dynamic runtime.
pub type PointerNumber = usize;

/// Opaque state passed back to a [`CallbackFn`].
pub type ContextPointer = *mut c_void;

/// Native entry point invoked by the dynamic runtime with the receiver and
/// an array value holding the call's arguments.
pub type CallbackFn = unsafe extern "C" fn(context: ContextPointer, this: DynHandle, args: DynHandle) -> DynHandle;

const _: () = assert!(mem::size_of::<PointerNumber>() >= mem::size_of::<*const ()>());
const _: () = assert!(
    mem::size_of::<PointerNumber>() >= mem::size_of::<CallbackFn>(),
    "PointerNumber cannot hold a CallbackFn"
);
const _: () = assert!(
    mem::size_of::<PointerNumber>() >= mem::size_of::<ContextPointer>(),
    "PointerNumber cannot hold a ContextPointer"
);

/// How strictly the host tracks pointer provenance.
///
/// A pointer rebuilt from an integer is only usable when provenance is not
/// strictly enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSafety {
    Strict,
    Relaxed,
    Preferred,
}

impl PointerSafety {
    pub fn allows_integer_round_trip(self) -> bool {
        matches!(self, PointerSafety::Relaxed | PointerSafety::Preferred)
    }
}

pub fn function_to_number(function: CallbackFn) -> PointerNumber {
    function as PointerNumber
}

pub fn context_to_number(context: ContextPointer) -> PointerNumber {
    context as PointerNumber
}

/// # Safety
///
/// `number` must come from [`function_to_number`].
pub(crate) unsafe fn number_to_function(number: PointerNumber) -> CallbackFn {
    mem::transmute::<PointerNumber, CallbackFn>(number)
}

pub(crate) fn number_to_context(number: PointerNumber) -> ContextPointer {
    number as ContextPointer
}
