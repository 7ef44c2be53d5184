//! An in-process dynamic runtime.
//!
//! Hosts without an embedded engine (and the tests) use [`LocalRuntime`] to
//! hold dynamic values and dispatch calls through the same call primitive an
//! external engine would use.

use log::debug;
use parking_lot::Mutex;
use slab::Slab;

use crate::callback::DynamicRuntime;
use crate::error::CallbackError;
use crate::handle::DynHandle;
use crate::pointer::{PointerNumber, PointerSafety};
use crate::trampoline::invoke;

/// A dynamic value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<DynHandle>),
    /// A function backed by a native registration; `None` once detached.
    Function { registration: Option<usize> },
}

#[derive(Debug, Clone, Copy)]
struct Registration {
    function: PointerNumber,
    context: PointerNumber,
}

#[derive(Debug)]
struct State {
    values: Slab<Value>,
    registrations: Slab<Registration>,
}

#[derive(Debug)]
pub struct LocalRuntime {
    pointer_safety: PointerSafety,
    state: Mutex<State>,
}

impl Default for LocalRuntime {
    fn default() -> Self {
        Self::with_pointer_safety(PointerSafety::Relaxed)
    }
}

impl LocalRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pointer_safety(pointer_safety: PointerSafety) -> Self {
        let mut values = Slab::new();
        // Slot 0 is `DynHandle::UNDEFINED`.
        values.insert(Value::Undefined);
        Self {
            pointer_safety,
            state: Mutex::new(State {
                values,
                registrations: Slab::new(),
            }),
        }
    }

    pub fn alloc(&self, value: Value) -> DynHandle {
        DynHandle(self.state.lock().values.insert(value))
    }

    pub fn number(&self, value: f64) -> DynHandle {
        self.alloc(Value::Number(value))
    }

    pub fn string(&self, value: &str) -> DynHandle {
        self.alloc(Value::String(value.to_string()))
    }

    pub fn array(&self, items: &[DynHandle]) -> DynHandle {
        self.alloc(Value::Array(items.to_vec()))
    }

    pub fn get(&self, handle: DynHandle) -> Option<Value> {
        self.state.lock().values.get(handle.0).cloned()
    }

    pub fn as_number(&self, handle: DynHandle) -> Option<f64> {
        match self.get(handle)? {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Items of an array value.
    pub fn items(&self, handle: DynHandle) -> Option<Vec<DynHandle>> {
        match self.get(handle)? {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Frees a value. Releasing `undefined` or an unknown handle does nothing.
    ///
    /// A released slot may be reused by the next allocation, so neither the
    /// handle nor any copy of it may be used afterwards. Function values are
    /// never released: they keep their slot so that stale handles keep
    /// failing with [`CallbackError::Detached`].
    pub fn release(&self, handle: DynHandle) {
        if handle == DynHandle::UNDEFINED {
            return;
        }
        let mut state = self.state.lock();
        if let Some(Value::Function { .. }) = state.values.get(handle.0) {
            debug!("not releasing function {:?}", handle);
            return;
        }
        state.values.try_remove(handle.0);
    }

    /// Number of live values, including `undefined`.
    pub fn value_count(&self) -> usize {
        self.state.lock().values.len()
    }

    /// Calls a dynamic function the way script code would.
    ///
    /// The arguments are packed into an array value for the duration of the
    /// call. No lock is held while native code runs, so callbacks may call
    /// back into the runtime.
    pub fn call(&self, function: DynHandle, this: DynHandle, args: &[DynHandle]) -> Result<DynHandle, CallbackError> {
        let (registration, args) = {
            let mut state = self.state.lock();
            let registration = match state.values.get(function.0) {
                Some(Value::Function { registration }) => registration
                    .and_then(|key| state.registrations.get(key).copied())
                    .ok_or(CallbackError::Detached { handle: function })?,
                Some(_) => return Err(CallbackError::NotCallable { handle: function }),
                None => return Err(CallbackError::UnknownHandle { handle: function }),
            };
            let args = DynHandle(state.values.insert(Value::Array(args.to_vec())));
            (registration, args)
        };

        // SAFETY: the registration is only present while its CallbackHandle is alive.
        let result = unsafe { invoke(registration.function, registration.context, this, args) };
        self.release(args);
        Ok(result)
    }
}

impl DynamicRuntime for LocalRuntime {
    fn pointer_safety(&self) -> PointerSafety {
        self.pointer_safety
    }

    fn create_function(&self, function: PointerNumber, context: PointerNumber) -> Result<DynHandle, CallbackError> {
        let mut state = self.state.lock();
        let registration = state.registrations.insert(Registration { function, context });
        Ok(DynHandle(state.values.insert(Value::Function {
            registration: Some(registration),
        })))
    }

    fn detach_function(&self, function: DynHandle) {
        let mut state = self.state.lock();
        let registration = match state.values.get_mut(function.0) {
            Some(Value::Function { registration }) => registration.take(),
            _ => None,
        };
        if let Some(key) = registration {
            state.registrations.try_remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undefined_is_slot_zero() {
        let runtime = LocalRuntime::new();
        assert_eq!(runtime.get(DynHandle::UNDEFINED), Some(Value::Undefined));
        runtime.release(DynHandle::UNDEFINED);
        assert_eq!(runtime.value_count(), 1);
    }

    #[test]
    fn test_function_values_are_not_released() {
        let runtime = LocalRuntime::new();
        let function = runtime.create_function(0, 0).unwrap();
        runtime.detach_function(function);
        runtime.release(function);

        // The slot stays taken, so a new value cannot alias the stale handle.
        let number = runtime.number(1.0);
        assert_ne!(number, function);
        assert_eq!(
            runtime.call(function, DynHandle::UNDEFINED, &[]),
            Err(CallbackError::Detached { handle: function })
        );
    }

    #[test]
    fn test_calling_a_non_function() {
        let runtime = LocalRuntime::new();
        let number = runtime.number(1.0);
        assert_eq!(
            runtime.call(number, DynHandle::UNDEFINED, &[]),
            Err(CallbackError::NotCallable { handle: number })
        );
        assert_eq!(
            runtime.call(DynHandle(99), DynHandle::UNDEFINED, &[]),
            Err(CallbackError::UnknownHandle { handle: DynHandle(99) })
        );
    }
}
