//! In-memory construction of a [`Program`].
//!
//! The low-level `add_*` methods append raw table entries. The higher-level
//! helpers (`class`, `method`, `enumeration`, ...) produce the same shapes the
//! checker export step writes for the corresponding declarations, so hosts
//! and tests can describe an interface without going through a dump file.

use indexmap::IndexMap;

use crate::flags::{ModifierFlags, SymbolFlags, TypeFlags};
use crate::graph::{
    CheckerDiagnostic, ConstantValue, DeclId, DeclKind, Declaration, ObjectType, Program, Signature,
    SignatureId, SourceFile, Symbol, SymbolId, TypeData, TypeId,
};

/// A parameter given to [`ProgramBuilder::method`] and friends: name and type.
pub type Param<'a> = (&'a str, TypeId);

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Raw tables ---

    pub fn add_symbol(&mut self, name: impl Into<String>, flags: SymbolFlags) -> SymbolId {
        let id = SymbolId(self.program.symbols.len());
        self.program.symbols.push(Symbol {
            name: name.into(),
            flags,
            parent: None,
            declarations: Vec::new(),
            members: None,
            exports: None,
            declared_type: None,
            value_type: None,
            export_equals: None,
        });
        id
    }

    /// Appends a declaration and attaches it to `symbol`.
    pub fn add_declaration(&mut self, symbol: SymbolId, declaration: Declaration) -> DeclId {
        let id = DeclId(self.program.declarations.len());
        self.program.declarations.push(declaration);
        self.program.symbols[symbol.0].declarations.push(id);
        id
    }

    pub fn add_type(&mut self, ty: TypeData) -> TypeId {
        let id = TypeId(self.program.types.len());
        self.program.types.push(ty);
        id
    }

    pub fn add_signature(&mut self, signature: Signature) -> SignatureId {
        let id = SignatureId(self.program.signatures.len());
        self.program.signatures.push(signature);
        id
    }

    /// Inserts `member` into the member table of `owner` and makes `owner` its parent.
    pub fn add_member(&mut self, owner: SymbolId, member: SymbolId) {
        let name = self.program.symbols[member.0].name.clone();
        self.program.symbols[member.0].parent = Some(owner);
        self.program.symbols[owner.0]
            .members
            .get_or_insert_with(IndexMap::new)
            .insert(name, member);
    }

    /// Inserts `export` into the export table of `owner` and makes `owner` its parent.
    pub fn add_export(&mut self, owner: SymbolId, export: SymbolId) {
        let name = self.program.symbols[export.0].name.clone();
        self.program.symbols[export.0].parent = Some(owner);
        self.program.symbols[owner.0]
            .exports
            .get_or_insert_with(IndexMap::new)
            .insert(name, export);
    }

    pub fn set_export_equals(&mut self, module: SymbolId, target: SymbolId) {
        self.program.symbols[module.0].export_equals = Some(target);
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.program.symbols[id.0]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.program.symbols[id.0]
    }

    pub fn declaration_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.program.declarations[id.0]
    }

    pub fn type_mut(&mut self, id: TypeId) -> &mut TypeData {
        &mut self.program.types[id.0]
    }

    pub fn diagnostic(&mut self, file: Option<&str>, code: Option<u32>, message: impl Into<String>) {
        self.program.diagnostics.push(CheckerDiagnostic {
            file: file.map(str::to_string),
            code,
            message: message.into(),
        });
    }

    // --- Declarations ---

    /// Adds a module source file and returns its module symbol.
    ///
    /// The symbol is named like the checker names external modules: the
    /// quoted file name without its `.d.ts`/`.ts` extension.
    pub fn source_file(&mut self, file_name: &str) -> SymbolId {
        let stem = file_name
            .strip_suffix(".d.ts")
            .or_else(|| file_name.strip_suffix(".ts"))
            .unwrap_or(file_name);
        let symbol = self.add_symbol(format!("\"{}\"", stem), SymbolFlags::VALUE_MODULE);
        self.add_declaration(symbol, plain(DeclKind::SourceFile));
        self.program.source_files.push(SourceFile {
            file_name: file_name.to_string(),
            symbol: Some(symbol),
        });
        symbol
    }

    /// Adds a file that is a global script rather than a module.
    pub fn script_file(&mut self, file_name: &str) {
        self.program.source_files.push(SourceFile {
            file_name: file_name.to_string(),
            symbol: None,
        });
    }

    pub fn namespace(&mut self, owner: SymbolId, name: &str) -> SymbolId {
        let symbol = self.add_symbol(name, SymbolFlags::NAMESPACE_MODULE);
        self.add_declaration(symbol, plain(DeclKind::Module));
        self.add_export(owner, symbol);
        symbol
    }

    pub fn primitive(&mut self, flags: TypeFlags, display: &str) -> TypeId {
        self.add_type(TypeData {
            flags,
            display: display.to_string(),
            symbol: None,
            union: Vec::new(),
            object: None,
        })
    }

    pub fn number(&mut self) -> TypeId {
        self.primitive(TypeFlags::NUMBER, "number")
    }

    pub fn string(&mut self) -> TypeId {
        self.primitive(TypeFlags::STRING, "string")
    }

    pub fn boolean(&mut self) -> TypeId {
        self.primitive(TypeFlags::BOOLEAN, "boolean")
    }

    pub fn void(&mut self) -> TypeId {
        self.primitive(TypeFlags::VOID, "void")
    }

    pub fn type_parameter(&mut self, name: &str) -> TypeId {
        self.primitive(TypeFlags::TYPE_PARAMETER, name)
    }

    pub fn union(&mut self, components: &[TypeId]) -> TypeId {
        let display = components
            .iter()
            .map(|id| self.program.types[id.0].display.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        self.add_type(TypeData {
            flags: TypeFlags::UNION,
            display,
            symbol: None,
            union: components.to_vec(),
            object: None,
        })
    }

    pub fn class(&mut self, owner: SymbolId, name: &str) -> SymbolId {
        self.object_symbol(owner, name, SymbolFlags::CLASS, DeclKind::Class)
    }

    pub fn interface(&mut self, owner: SymbolId, name: &str) -> SymbolId {
        self.object_symbol(owner, name, SymbolFlags::INTERFACE, DeclKind::Interface)
    }

    fn object_symbol(&mut self, owner: SymbolId, name: &str, flags: SymbolFlags, kind: DeclKind) -> SymbolId {
        let symbol = self.add_symbol(name, flags);
        self.add_declaration(symbol, plain(kind));
        let declared = self.add_type(TypeData {
            flags: TypeFlags::OBJECT,
            display: name.to_string(),
            symbol: Some(symbol),
            union: Vec::new(),
            object: Some(ObjectType {
                class_or_interface: true,
                ..ObjectType::default()
            }),
        });
        self.program.symbols[symbol.0].declared_type = Some(declared);
        self.add_export(owner, symbol);
        symbol
    }

    /// Records `base` as a base type of `derived`. Both must have declared types.
    pub fn base_type(&mut self, derived: SymbolId, base: SymbolId) {
        let (Some(derived_ty), Some(base_ty)) = (
            self.program.symbols[derived.0].declared_type,
            self.program.symbols[base.0].declared_type,
        ) else {
            return;
        };
        if let Some(object) = self.program.types[derived_ty.0].object.as_mut() {
            object.base_types.push(base_ty);
        }
    }

    pub fn enumeration(&mut self, owner: SymbolId, name: &str) -> SymbolId {
        let symbol = self.add_symbol(name, SymbolFlags::REGULAR_ENUM);
        self.add_declaration(symbol, plain(DeclKind::Enum));
        let declared = self.add_type(TypeData {
            flags: TypeFlags::ENUM,
            display: name.to_string(),
            symbol: Some(symbol),
            union: Vec::new(),
            object: None,
        });
        self.program.symbols[symbol.0].declared_type = Some(declared);
        self.add_export(owner, symbol);
        symbol
    }

    pub fn enum_member(&mut self, enumeration: SymbolId, name: &str, value: Option<ConstantValue>) -> SymbolId {
        let symbol = self.add_symbol(name, SymbolFlags::ENUM_MEMBER);
        self.add_declaration(
            symbol,
            Declaration {
                constant_value: value,
                ..plain(DeclKind::EnumMember)
            },
        );
        self.add_export(enumeration, symbol);
        symbol
    }

    pub fn property(&mut self, owner: SymbolId, name: &str, ty: TypeId, modifiers: ModifierFlags) -> SymbolId {
        let kind = if self.is_class(owner) {
            DeclKind::PropertyDeclaration
        } else {
            DeclKind::PropertySignature
        };
        let symbol = self.add_symbol(name, SymbolFlags::PROPERTY);
        self.add_declaration(
            symbol,
            Declaration {
                modifiers,
                ty: Some(ty),
                ..plain(kind)
            },
        );
        self.program.symbols[symbol.0].value_type = Some(ty);
        self.add_member(owner, symbol);
        symbol
    }

    /// Adds a method overload. Repeated calls with the same name add
    /// declarations to one method symbol.
    pub fn method(&mut self, owner: SymbolId, name: &str, params: &[Param<'_>], ret: TypeId) -> SymbolId {
        self.generic_method(owner, name, &[], params, ret)
    }

    pub fn generic_method(
        &mut self,
        owner: SymbolId,
        name: &str,
        type_parameters: &[TypeId],
        params: &[Param<'_>],
        ret: TypeId,
    ) -> SymbolId {
        let kind = if self.is_class(owner) {
            DeclKind::MethodDeclaration
        } else {
            DeclKind::MethodSignature
        };
        let existing = self.program.symbols[owner.0]
            .members
            .as_ref()
            .and_then(|members| members.get(name).copied());
        let symbol = match existing {
            Some(symbol) => symbol,
            None => {
                let symbol = self.add_symbol(name, SymbolFlags::METHOD);
                self.add_member(owner, symbol);
                symbol
            }
        };
        self.signature_declaration(symbol, kind, type_parameters, params, ret);
        symbol
    }

    /// Adds a constructor overload to a class. The constructor's return type
    /// is the class's declared type.
    pub fn constructor(&mut self, class: SymbolId, params: &[Param<'_>]) -> SymbolId {
        const NAME: &str = "__constructor";
        let existing = self.program.symbols[class.0]
            .members
            .as_ref()
            .and_then(|members| members.get(NAME).copied());
        let symbol = match existing {
            Some(symbol) => symbol,
            None => {
                let symbol = self.add_symbol(NAME, SymbolFlags::CONSTRUCTOR);
                self.add_member(class, symbol);
                symbol
            }
        };
        let ret = match self.program.symbols[class.0].declared_type {
            Some(ty) => ty,
            None => self.void(),
        };
        self.signature_declaration(symbol, DeclKind::Constructor, &[], params, ret);
        symbol
    }

    fn signature_declaration(
        &mut self,
        symbol: SymbolId,
        kind: DeclKind,
        type_parameters: &[TypeId],
        params: &[Param<'_>],
        ret: TypeId,
    ) -> DeclId {
        let declaration = self.add_declaration(symbol, plain(kind));
        let mut parameters = Vec::with_capacity(params.len());
        for &(name, ty) in params {
            let parameter = self.add_symbol(name, SymbolFlags::FUNCTION_SCOPED_VARIABLE);
            self.add_declaration(
                parameter,
                Declaration {
                    ty: Some(ty),
                    ..plain(DeclKind::Parameter)
                },
            );
            self.program.symbols[parameter.0].value_type = Some(ty);
            parameters.push(parameter);
        }

        let display = self.render_signature(type_parameters, params, ret);
        let signature = self.add_signature(Signature {
            display,
            type_parameters: type_parameters.to_vec(),
            parameters,
            return_type: ret,
            declaration: Some(declaration),
        });
        self.program.declarations[declaration.0].signature = Some(signature);
        declaration
    }

    fn render_signature(&self, type_parameters: &[TypeId], params: &[Param<'_>], ret: TypeId) -> String {
        let display = |id: TypeId| self.program.types[id.0].display.as_str();
        let mut out = String::new();
        if !type_parameters.is_empty() {
            let names: Vec<_> = type_parameters.iter().map(|&id| display(id)).collect();
            out.push('<');
            out.push_str(&names.join(", "));
            out.push('>');
        }
        let rendered: Vec<_> = params
            .iter()
            .map(|&(name, ty)| format!("{}: {}", name, display(ty)))
            .collect();
        out.push('(');
        out.push_str(&rendered.join(", "));
        out.push_str("): ");
        out.push_str(display(ret));
        out
    }

    fn is_class(&self, symbol: SymbolId) -> bool {
        self.program.symbols[symbol.0].flags.contains(SymbolFlags::CLASS)
    }

    pub fn finish(self) -> Program {
        self.program
    }
}

fn plain(kind: DeclKind) -> Declaration {
    Declaration {
        kind,
        modifiers: ModifierFlags::empty(),
        ty: None,
        signature: None,
        constant_value: None,
    }
}
