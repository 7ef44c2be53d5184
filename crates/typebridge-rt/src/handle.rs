/// Reference to a value owned by the dynamic runtime.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DynHandle(pub usize);

impl DynHandle {
    /// The runtime's `undefined`; always valid and never released.
    pub const UNDEFINED: DynHandle = DynHandle(0);
}
