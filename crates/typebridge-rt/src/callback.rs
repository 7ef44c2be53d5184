//! Installing native callables into the dynamic runtime.

use std::ffi::c_void;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{debug, error};

use crate::error::CallbackError;
use crate::handle::DynHandle;
use crate::pointer::{context_to_number, function_to_number, CallbackFn, ContextPointer, PointerNumber, PointerSafety};

/// The dynamic runtime as seen from native code.
pub trait DynamicRuntime {
    fn pointer_safety(&self) -> PointerSafety;

    /// Creates a dynamic function that, when called with a receiver and
    /// arguments, forwards `function` and `context` to the call primitive.
    fn create_function(&self, function: PointerNumber, context: PointerNumber) -> Result<DynHandle, CallbackError>;

    /// Disconnects a function created by [`DynamicRuntime::create_function`].
    /// Later calls to it fail instead of reaching native code.
    fn detach_function(&self, function: DynHandle);
}

// A boxed closure and the matching deallocator.
struct OwnedContext {
    pointer: ContextPointer,
    free: unsafe fn(ContextPointer),
}

/// Owns a native callback registration. Only the dynamic-side function is
/// exposed; dropping the handle detaches it.
pub struct CallbackHandle<'r, R: DynamicRuntime + ?Sized> {
    runtime: &'r R,
    function: DynHandle,
    owned: Option<OwnedContext>,
}

impl<'r, R: DynamicRuntime + ?Sized> CallbackHandle<'r, R> {
    /// The dynamic function to pass to the runtime.
    pub fn function(&self) -> DynHandle {
        self.function
    }
}

impl<R: DynamicRuntime + ?Sized> fmt::Debug for CallbackHandle<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackHandle")
            .field("function", &self.function)
            .field("owns_closure", &self.owned.is_some())
            .finish()
    }
}

impl<R: DynamicRuntime + ?Sized> Drop for CallbackHandle<'_, R> {
    fn drop(&mut self) {
        debug!("detaching callback {:?}", self.function);
        self.runtime.detach_function(self.function);
        if let Some(owned) = self.owned.take() {
            // SAFETY: detached above, so the runtime can no longer reach the context.
            unsafe { (owned.free)(owned.pointer) };
        }
    }
}

/// Registers `function` with `context` as a dynamic function.
///
/// # Safety
///
/// `context` must stay valid for `function` until the returned handle is dropped.
pub unsafe fn install<R: DynamicRuntime + ?Sized>(
    runtime: &R,
    function: CallbackFn,
    context: ContextPointer,
) -> Result<CallbackHandle<'_, R>, CallbackError> {
    let mode = runtime.pointer_safety();
    if !mode.allows_integer_round_trip() {
        return Err(CallbackError::PointerSafety { mode });
    }
    let handle = runtime.create_function(function_to_number(function), context_to_number(context))?;
    debug!("installed callback {:?}", handle);
    Ok(CallbackHandle {
        runtime,
        function: handle,
        owned: None,
    })
}

/// Registers a closure as a dynamic function. The closure receives the
/// receiver and the argument array, and is freed when the handle is dropped.
///
/// The closure owns its captures: a forgotten handle leaves the registration
/// live, so the closure must stay valid for as long as the runtime can call
/// it. Share state through `Rc`/`Arc`.
///
/// A panic inside the closure is logged and reported to the runtime as
/// `undefined`.
pub fn install_closure<R, F>(runtime: &R, closure: F) -> Result<CallbackHandle<'_, R>, CallbackError>
where
    R: DynamicRuntime + ?Sized,
    F: Fn(DynHandle, DynHandle) -> DynHandle + 'static,
{
    let pointer = Box::into_raw(Box::new(closure)) as ContextPointer;
    // SAFETY: the box lives until the handle frees it after detaching.
    match unsafe { install(runtime, call_closure::<F>, pointer) } {
        Ok(mut handle) => {
            handle.owned = Some(OwnedContext {
                pointer,
                free: free_closure::<F>,
            });
            Ok(handle)
        }
        Err(err) => {
            // SAFETY: never registered.
            unsafe { free_closure::<F>(pointer) };
            Err(err)
        }
    }
}

unsafe extern "C" fn call_closure<F>(context: ContextPointer, this: DynHandle, args: DynHandle) -> DynHandle
where
    F: Fn(DynHandle, DynHandle) -> DynHandle,
{
    let closure = &*(context as *const F);
    catch_unwind(AssertUnwindSafe(|| closure(this, args))).unwrap_or_else(|_| {
        error!("native callback panicked; returning undefined");
        DynHandle::UNDEFINED
    })
}

unsafe fn free_closure<F>(context: *mut c_void) {
    drop(Box::from_raw(context as *mut F));
}
