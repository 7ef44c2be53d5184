use std::cell::Cell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use typebridge_rt::{
    install, install_closure, typebridge_callback_call, CallbackError, ContextPointer, DynHandle, DynamicRuntime,
    LocalRuntime, PointerSafety, Value,
};

// --- Test Helpers ---

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

unsafe extern "C" fn count_calls(context: ContextPointer, _this: DynHandle, _args: DynHandle) -> DynHandle {
    let counter = &*(context as *const AtomicUsize);
    counter.fetch_add(1, Ordering::SeqCst);
    DynHandle::UNDEFINED
}

#[test]
fn test_strict_pointer_safety_refuses_install() {
    init_logging();
    let runtime = LocalRuntime::with_pointer_safety(PointerSafety::Strict);
    let err = install_closure(&runtime, |_, _| DynHandle::UNDEFINED).unwrap_err();
    assert_eq!(err, CallbackError::PointerSafety { mode: PointerSafety::Strict });
    // Nothing was registered.
    assert_eq!(runtime.value_count(), 1);
}

#[test]
fn test_closure_receives_receiver_and_arguments() {
    init_logging();
    let runtime = Rc::new(LocalRuntime::new());
    let rt = Rc::clone(&runtime);
    let handle = install_closure(&*runtime, move |this, args| {
        let items = rt.items(args).unwrap();
        let sum: f64 = items.iter().map(|&item| rt.as_number(item).unwrap()).sum();
        let scale = rt.as_number(this).unwrap_or(1.0);
        rt.number(sum * scale)
    })
    .unwrap();

    let this = runtime.number(10.0);
    let a = runtime.number(1.0);
    let b = runtime.number(2.5);
    let result = runtime.call(handle.function(), this, &[a, b]).unwrap();
    assert_eq!(runtime.as_number(result), Some(35.0));
}

#[test]
fn test_dropping_the_handle_detaches() {
    init_logging();
    let runtime = LocalRuntime::new();
    let calls = Rc::new(Cell::new(0));
    let counted = Rc::clone(&calls);
    let handle = install_closure(&runtime, move |_, _| {
        counted.set(counted.get() + 1);
        DynHandle::UNDEFINED
    })
    .unwrap();
    let function = handle.function();

    runtime.call(function, DynHandle::UNDEFINED, &[]).unwrap();
    drop(handle);

    assert_eq!(
        runtime.call(function, DynHandle::UNDEFINED, &[]),
        Err(CallbackError::Detached { handle: function })
    );
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_detached_slot_is_not_reused_by_new_callback() {
    let runtime = LocalRuntime::new();
    let first = install_closure(&runtime, |_, _| DynHandle::UNDEFINED).unwrap();
    let stale = first.function();
    drop(first);
    let second = install_closure(&runtime, |_, _| DynHandle(1)).unwrap();

    assert!(runtime.call(stale, DynHandle::UNDEFINED, &[]).is_err());
    assert!(runtime.call(second.function(), DynHandle::UNDEFINED, &[]).is_ok());
}

#[test]
fn test_callbacks_can_reenter_the_runtime() {
    init_logging();
    let runtime = Rc::new(LocalRuntime::new());
    let rt = Rc::clone(&runtime);
    let inner = install_closure(&*runtime, move |_, _| rt.string("inner")).unwrap();
    let inner_function = inner.function();
    let rt = Rc::clone(&runtime);
    let outer = install_closure(&*runtime, move |_, _| {
        rt.call(inner_function, DynHandle::UNDEFINED, &[]).unwrap()
    })
    .unwrap();

    let result = runtime.call(outer.function(), DynHandle::UNDEFINED, &[]).unwrap();
    assert_eq!(runtime.get(result), Some(Value::String("inner".to_string())));
}

#[test]
fn test_raw_install_with_context_pointer() {
    init_logging();
    let runtime = LocalRuntime::with_pointer_safety(PointerSafety::Preferred);
    let counter = AtomicUsize::new(0);
    let handle = unsafe {
        install(&runtime, count_calls, &counter as *const AtomicUsize as ContextPointer).unwrap()
    };

    for _ in 0..3 {
        runtime.call(handle.function(), DynHandle::UNDEFINED, &[]).unwrap();
    }
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[test]
fn test_panicking_closure_yields_undefined() {
    init_logging();
    let runtime = LocalRuntime::new();
    let handle = install_closure(&runtime, |_, _| panic!("boom")).unwrap();
    let result = runtime.call(handle.function(), DynHandle::UNDEFINED, &[]).unwrap();
    assert_eq!(result, DynHandle::UNDEFINED);
}

#[test]
fn test_argument_arrays_are_released_after_the_call() {
    let runtime = Rc::new(LocalRuntime::new());
    let rt = Rc::clone(&runtime);
    let handle = install_closure(&*runtime, move |_, args| {
        assert_eq!(rt.items(args).map(|items| items.len()), Some(1));
        DynHandle::UNDEFINED
    })
    .unwrap();
    let arg = runtime.number(1.0);
    let before = runtime.value_count();
    runtime.call(handle.function(), DynHandle::UNDEFINED, &[arg]).unwrap();
    assert_eq!(runtime.value_count(), before);
}

#[test]
fn test_dropping_the_handle_frees_the_closure() {
    let runtime = LocalRuntime::new();
    let captured = Rc::new(());
    let owned = Rc::clone(&captured);
    let handle = install_closure(&runtime, move |_, _| {
        let _keep = &owned;
        DynHandle::UNDEFINED
    })
    .unwrap();

    assert_eq!(Rc::strong_count(&captured), 2);
    drop(handle);
    assert_eq!(Rc::strong_count(&captured), 1);
}

#[test]
fn test_forgotten_handle_keeps_its_closure_alive() {
    init_logging();
    let runtime = Rc::new(LocalRuntime::new());
    let rt = Rc::clone(&runtime);
    let bytes = vec![0xAAu8; 4];
    let handle = install_closure(&*runtime, move |_, _| rt.number(f64::from(bytes[0]))).unwrap();
    let function = handle.function();
    std::mem::forget(handle);

    // Churn the allocator; the closure's captures must be untouched.
    let churn = vec![vec![0x55u8; 4]; 16];
    drop(churn);

    let result = runtime.call(function, DynHandle::UNDEFINED, &[]).unwrap();
    assert_eq!(runtime.as_number(result), Some(f64::from(0xAAu8)));
}

// A runtime that records the numbers it was handed and dispatches through
// the exported primitive, like an external engine would.
#[derive(Default)]
struct RecordingRuntime {
    registered: std::sync::Mutex<Vec<(usize, usize)>>,
}

impl DynamicRuntime for RecordingRuntime {
    fn pointer_safety(&self) -> PointerSafety {
        PointerSafety::Relaxed
    }

    fn create_function(&self, function: usize, context: usize) -> Result<DynHandle, CallbackError> {
        let mut registered = self.registered.lock().unwrap();
        registered.push((function, context));
        Ok(DynHandle(registered.len()))
    }

    fn detach_function(&self, _function: DynHandle) {}
}

#[test]
fn test_exported_call_primitive_dispatches() {
    let runtime = RecordingRuntime::default();
    let counter = AtomicUsize::new(0);
    let _handle = unsafe {
        install(&runtime, count_calls, &counter as *const AtomicUsize as ContextPointer).unwrap()
    };

    let (function, context) = runtime.registered.lock().unwrap()[0];
    let result = unsafe { typebridge_callback_call(function, context, DynHandle::UNDEFINED, DynHandle::UNDEFINED) };
    assert_eq!(result, DynHandle::UNDEFINED);
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}
