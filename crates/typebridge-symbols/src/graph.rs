//! The checked program: symbols, declarations, types and signatures.
//!
//! Everything is stored in flat tables addressed by typed indices. The loader
//! (or [`crate::ProgramBuilder`]) owns construction; the rest of the pipeline
//! only borrows a `&Program` and follows ids.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::flags::{ModifierFlags, SymbolFlags, TypeFlags};

/// Index of a symbol in [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(pub usize);

/// Index of a declaration in [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub usize);

/// Index of a type in [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(pub usize);

/// Index of a signature in [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureId(pub usize);

/// Ordered name -> symbol table, as found on `members` and `exports`.
pub type SymbolTable = IndexMap<String, SymbolId>;

/// A named entity of the interface description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    /// Unqualified name. Module symbols of source files keep their quotes.
    pub name: String,
    pub flags: SymbolFlags,
    /// Owning symbol, if any. A back reference only.
    #[serde(default)]
    pub parent: Option<SymbolId>,
    #[serde(default)]
    pub declarations: Vec<DeclId>,
    /// Directly declared instance members.
    #[serde(default)]
    pub members: Option<SymbolTable>,
    /// Nested static members and types.
    #[serde(default)]
    pub exports: Option<SymbolTable>,
    /// The type this symbol declares (classes, interfaces, enums).
    #[serde(default)]
    pub declared_type: Option<TypeId>,
    /// The type of the symbol used as a value.
    #[serde(default)]
    pub value_type: Option<TypeId>,
    /// Target of an `export =` assignment on a module symbol.
    #[serde(default)]
    pub export_equals: Option<SymbolId>,
}

/// Syntactic form of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    SourceFile,
    Module,
    Class,
    Interface,
    Enum,
    EnumMember,
    PropertyDeclaration,
    PropertySignature,
    MethodDeclaration,
    MethodSignature,
    Constructor,
    Parameter,
    Variable,
    Function,
    Other,
}

/// Statically computed value of an enum member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConstantValue {
    Number(f64),
    String(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclKind,
    #[serde(default)]
    pub modifiers: ModifierFlags,
    /// Type of the declared symbol at this declaration.
    #[serde(default, rename = "type")]
    pub ty: Option<TypeId>,
    #[serde(default)]
    pub signature: Option<SignatureId>,
    #[serde(default)]
    pub constant_value: Option<ConstantValue>,
}

/// Object-type details; present on class, interface and anonymous object types.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectType {
    pub class_or_interface: bool,
    pub type_parameters: Vec<TypeId>,
    pub outer_type_parameters: Vec<TypeId>,
    pub local_type_parameters: Vec<TypeId>,
    /// Polymorphic `this` type, if the checker created one.
    pub this_type: Option<TypeId>,
    pub base_types: Vec<TypeId>,
    pub call_signatures: Vec<SignatureId>,
    pub construct_signatures: Vec<SignatureId>,
}

impl ObjectType {
    /// True when the type carries no type parameters of any kind.
    pub fn is_monomorphic(&self) -> bool {
        self.type_parameters.is_empty()
            && self.outer_type_parameters.is_empty()
            && self.local_type_parameters.is_empty()
            && self.this_type.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeData {
    pub flags: TypeFlags,
    /// Checker rendering of the type, e.g. `string | number`.
    pub display: String,
    #[serde(default)]
    pub symbol: Option<SymbolId>,
    /// Components of a union type, in declared order.
    #[serde(default)]
    pub union: Vec<TypeId>,
    #[serde(default)]
    pub object: Option<ObjectType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signature {
    /// Checker rendering, e.g. `(x: number): void`.
    pub display: String,
    #[serde(default)]
    pub type_parameters: Vec<TypeId>,
    #[serde(default)]
    pub parameters: Vec<SymbolId>,
    pub return_type: TypeId,
    #[serde(default)]
    pub declaration: Option<DeclId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    Call,
    Construct,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub file_name: String,
    /// Module symbol of the file; absent when the file is not a module.
    #[serde(default)]
    pub symbol: Option<SymbolId>,
}

/// A diagnostic reported by the checker before emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckerDiagnostic {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub code: Option<u32>,
    pub message: String,
}

/// A type-checked program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    #[serde(default)]
    pub(crate) source_files: Vec<SourceFile>,
    #[serde(default)]
    pub(crate) diagnostics: Vec<CheckerDiagnostic>,
    #[serde(default)]
    pub(crate) symbols: Vec<Symbol>,
    #[serde(default)]
    pub(crate) declarations: Vec<Declaration>,
    #[serde(default)]
    pub(crate) types: Vec<TypeData>,
    #[serde(default)]
    pub(crate) signatures: Vec<Signature>,
}

impl Program {
    pub fn source_files(&self) -> &[SourceFile] {
        &self.source_files
    }

    pub fn diagnostics(&self) -> &[CheckerDiagnostic] {
        &self.diagnostics
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    pub fn declaration(&self, id: DeclId) -> &Declaration {
        &self.declarations[id.0]
    }

    pub fn ty(&self, id: TypeId) -> &TypeData {
        &self.types[id.0]
    }

    pub fn signature(&self, id: SignatureId) -> &Signature {
        &self.signatures[id.0]
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Looks up a source file by the name it was checked under.
    pub fn source_file(&self, file_name: &str) -> Option<&SourceFile> {
        self.source_files.iter().find(|file| file.file_name == file_name)
    }

    /// Dotted path from the outermost parent down to `id`.
    pub fn fully_qualified_name(&self, id: SymbolId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(symbol_id) = current {
            let symbol = self.symbol(symbol_id);
            segments.push(symbol.name.as_str());
            current = symbol.parent;
        }
        segments.reverse();
        segments.join(".")
    }

    pub fn members(&self, id: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbol(id).members.iter().flat_map(|table| table.values().copied())
    }

    pub fn exports(&self, id: SymbolId) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbol(id).exports.iter().flat_map(|table| table.values().copied())
    }

    /// Exports of a module. A module with `export = Target` exposes the
    /// exports of `Target` rather than `Target` itself.
    pub fn exports_of_module(&self, id: SymbolId) -> Vec<SymbolId> {
        match self.symbol(id).export_equals {
            Some(target) => self.exports(target).collect(),
            None => self.exports(id).collect(),
        }
    }

    pub fn declared_type_of_symbol(&self, id: SymbolId) -> Option<TypeId> {
        self.symbol(id).declared_type
    }

    /// Type of `symbol` as seen at `declaration`, falling back to its value type.
    pub fn type_of_symbol_at_location(&self, symbol: SymbolId, declaration: DeclId) -> Option<TypeId> {
        self.declaration(declaration).ty.or(self.symbol(symbol).value_type)
    }

    pub fn signature_from_declaration(&self, declaration: DeclId) -> Option<SignatureId> {
        self.declaration(declaration).signature
    }

    pub fn combined_modifier_flags(&self, declaration: DeclId) -> ModifierFlags {
        self.declaration(declaration).modifiers
    }

    pub fn constant_value(&self, declaration: DeclId) -> Option<&ConstantValue> {
        self.declaration(declaration).constant_value.as_ref()
    }

    pub fn signatures_of_type(&self, ty: TypeId, kind: SignatureKind) -> &[SignatureId] {
        match &self.ty(ty).object {
            Some(object) => match kind {
                SignatureKind::Call => &object.call_signatures,
                SignatureKind::Construct => &object.construct_signatures,
            },
            None => &[],
        }
    }

    /// The object details of `ty` if it is a class or interface type.
    pub fn class_or_interface(&self, ty: TypeId) -> Option<&ObjectType> {
        self.ty(ty).object.as_ref().filter(|object| object.class_or_interface)
    }

    pub fn base_types(&self, ty: TypeId) -> &[TypeId] {
        self.class_or_interface(ty)
            .map(|object| object.base_types.as_slice())
            .unwrap_or(&[])
    }

    pub fn type_to_string(&self, ty: TypeId) -> &str {
        &self.ty(ty).display
    }

    pub fn signature_to_string(&self, signature: SignatureId) -> &str {
        &self.signature(signature).display
    }

    /// Checks that every id stored in the tables points into its table and
    /// that every parent chain reaches a root.
    pub fn validate(&self) -> Result<(), LoadError> {
        for file in &self.source_files {
            let owner = || format!("source file `{}`", file.file_name);
            if let Some(symbol) = file.symbol {
                check_index("symbol", symbol.0, self.symbols.len(), &owner)?;
            }
        }

        for (index, symbol) in self.symbols.iter().enumerate() {
            let owner = || format!("symbol #{} `{}`", index, symbol.name);
            for id in symbol.parent.iter().chain(symbol.export_equals.iter()) {
                check_index("symbol", id.0, self.symbols.len(), &owner)?;
            }
            for table in symbol.members.iter().chain(symbol.exports.iter()) {
                for id in table.values() {
                    check_index("symbol", id.0, self.symbols.len(), &owner)?;
                }
            }
            for id in &symbol.declarations {
                check_index("declaration", id.0, self.declarations.len(), &owner)?;
            }
            for id in symbol.declared_type.iter().chain(symbol.value_type.iter()) {
                check_index("type", id.0, self.types.len(), &owner)?;
            }
        }

        for (index, declaration) in self.declarations.iter().enumerate() {
            let owner = || format!("declaration #{}", index);
            if let Some(ty) = declaration.ty {
                check_index("type", ty.0, self.types.len(), &owner)?;
            }
            if let Some(signature) = declaration.signature {
                check_index("signature", signature.0, self.signatures.len(), &owner)?;
            }
        }

        for (index, ty) in self.types.iter().enumerate() {
            let owner = || format!("type #{} `{}`", index, ty.display);
            if let Some(symbol) = ty.symbol {
                check_index("symbol", symbol.0, self.symbols.len(), &owner)?;
            }
            for id in &ty.union {
                check_index("type", id.0, self.types.len(), &owner)?;
            }
            if let Some(object) = &ty.object {
                for id in object
                    .type_parameters
                    .iter()
                    .chain(&object.outer_type_parameters)
                    .chain(&object.local_type_parameters)
                    .chain(object.this_type.iter())
                    .chain(&object.base_types)
                {
                    check_index("type", id.0, self.types.len(), &owner)?;
                }
                for id in object.call_signatures.iter().chain(&object.construct_signatures) {
                    check_index("signature", id.0, self.signatures.len(), &owner)?;
                }
            }
        }

        for (index, signature) in self.signatures.iter().enumerate() {
            let owner = || format!("signature #{} `{}`", index, signature.display);
            check_index("type", signature.return_type.0, self.types.len(), &owner)?;
            for id in &signature.type_parameters {
                check_index("type", id.0, self.types.len(), &owner)?;
            }
            for id in &signature.parameters {
                check_index("symbol", id.0, self.symbols.len(), &owner)?;
            }
            if let Some(declaration) = signature.declaration {
                check_index("declaration", declaration.0, self.declarations.len(), &owner)?;
            }
        }

        self.check_parent_chains()
    }

    // Parent links must end at a root; every name walk relies on it.
    fn check_parent_chains(&self) -> Result<(), LoadError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Unseen,
            OnChain,
            Rooted,
        }

        let mut marks = vec![Mark::Unseen; self.symbols.len()];
        let mut chain = Vec::new();
        for start in 0..self.symbols.len() {
            let mut current = Some(start);
            while let Some(index) = current {
                match marks[index] {
                    Mark::Rooted => break,
                    Mark::OnChain => {
                        return Err(LoadError::ParentCycle {
                            index,
                            name: self.symbols[index].name.clone(),
                        })
                    }
                    Mark::Unseen => {
                        marks[index] = Mark::OnChain;
                        chain.push(index);
                        current = self.symbols[index].parent.map(|parent| parent.0);
                    }
                }
            }
            for index in chain.drain(..) {
                marks[index] = Mark::Rooted;
            }
        }
        Ok(())
    }
}

fn check_index(
    table: &'static str,
    index: usize,
    len: usize,
    owner: &dyn Fn() -> String,
) -> Result<(), LoadError> {
    if index < len {
        Ok(())
    } else {
        Err(LoadError::DanglingReference {
            table,
            index,
            owner: owner(),
        })
    }
}
