//! Decides which symbols become native declarations.
//!
//! Matching is exact: a symbol qualifies only when its flag set equals one of
//! the listed kinds. Any other combination produced by declaration merging
//! is traversed by the walker but never emitted.

use typebridge_symbols::SymbolFlags;

/// Flag sets emitted as native enumerations.
pub const ENUM_KINDS: [SymbolFlags; 2] = [SymbolFlags::REGULAR_ENUM, SymbolFlags::CONST_ENUM];

/// Flag sets emitted as native binding structs.
pub const CLASS_KINDS: [SymbolFlags; 6] = [
    SymbolFlags::CLASS,
    SymbolFlags::INTERFACE,
    SymbolFlags::INTERFACE.union(SymbolFlags::FUNCTION_SCOPED_VARIABLE),
    SymbolFlags::VALUE_MODULE,
    SymbolFlags::VALUE_MODULE.union(SymbolFlags::INTERFACE),
    SymbolFlags::NAMESPACE_MODULE,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolClass {
    Enum,
    Class,
    /// Traversed, never emitted.
    Other,
}

pub fn is_enum_like(flags: SymbolFlags) -> bool {
    ENUM_KINDS.contains(&flags)
}

pub fn is_class_like(flags: SymbolFlags) -> bool {
    CLASS_KINDS.contains(&flags)
}

pub fn classify_symbol(flags: SymbolFlags) -> SymbolClass {
    if is_enum_like(flags) {
        SymbolClass::Enum
    } else if is_class_like(flags) {
        SymbolClass::Class
    } else {
        SymbolClass::Other
    }
}

/// The merged-declaration combinations accepted as class-like.
pub fn hybrid_kinds() -> impl Iterator<Item = SymbolFlags> {
    CLASS_KINDS.into_iter().filter(|flags| flags.bits().count_ones() > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_hybrids_are_pinned() {
        let hybrids: Vec<u32> = hybrid_kinds().map(|flags| flags.bits()).collect();
        // Interface|FunctionScopedVariable, ValueModule|Interface
        assert_eq!(hybrids, [65, 576]);
        for flags in hybrid_kinds() {
            assert_eq!(classify_symbol(flags), SymbolClass::Class);
        }
    }

    #[test]
    fn test_unlisted_hybrids_are_excluded() {
        let excluded = [
            SymbolFlags::CLASS | SymbolFlags::NAMESPACE_MODULE,
            SymbolFlags::CLASS | SymbolFlags::INTERFACE,
            SymbolFlags::REGULAR_ENUM | SymbolFlags::VALUE_MODULE,
            SymbolFlags::INTERFACE | SymbolFlags::BLOCK_SCOPED_VARIABLE,
            SymbolFlags::FUNCTION | SymbolFlags::NAMESPACE_MODULE,
        ];
        for flags in excluded {
            assert_eq!(classify_symbol(flags), SymbolClass::Other, "flags={}", flags.bits());
        }
    }

    #[test]
    fn test_enum_kinds() {
        assert!(is_enum_like(SymbolFlags::REGULAR_ENUM));
        assert!(is_enum_like(SymbolFlags::CONST_ENUM));
        assert!(!is_enum_like(SymbolFlags::ENUM_MEMBER));
        assert!(!is_class_like(SymbolFlags::REGULAR_ENUM));
    }

    #[test]
    fn test_plain_kinds() {
        for flags in [SymbolFlags::CLASS, SymbolFlags::INTERFACE, SymbolFlags::VALUE_MODULE, SymbolFlags::NAMESPACE_MODULE] {
            assert!(is_class_like(flags));
        }
        assert_eq!(classify_symbol(SymbolFlags::METHOD), SymbolClass::Other);
        assert_eq!(classify_symbol(SymbolFlags::PROPERTY), SymbolClass::Other);
        assert_eq!(classify_symbol(SymbolFlags::empty()), SymbolClass::Other);
    }
}
