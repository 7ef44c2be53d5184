//! Per-class views of the symbol graph, built fresh for each emitted class.

use typebridge_symbols::{DeclId, DeclKind, Program, SignatureId, SymbolFlags, SymbolId, TypeId};
use typebridge_types::{cppify_local_name, translate_type, PreconditionViolation, TranslateResult};

/// One overload of a method or constructor.
#[derive(Debug, Clone)]
pub struct MethodDescriptor<'p> {
    pub symbol: SymbolId,
    pub declaration: DeclId,
    /// Syntactic form of the signature declaration.
    pub kind: DeclKind,
    pub signature: SignatureId,
    pub type_parameters: &'p [TypeId],
    /// Native parameter list (`double x, js_string name`). Only rendered for
    /// signatures without type parameters.
    pub parameters: Option<String>,
    /// Native names of the parameters, in order.
    pub arguments: Vec<String>,
}

impl<'p> MethodDescriptor<'p> {
    pub fn new(program: &'p Program, symbol: SymbolId, declaration: DeclId) -> TranslateResult<Self> {
        let name = &program.symbol(symbol).name;
        let kind = program.declaration(declaration).kind;
        if !matches!(
            kind,
            DeclKind::MethodSignature | DeclKind::MethodDeclaration | DeclKind::Constructor
        ) {
            return Err(PreconditionViolation::MissingSignatureDeclaration {
                name: name.clone(),
                kind,
            });
        }

        let modifiers = program.combined_modifier_flags(declaration);
        if !modifiers.is_empty() {
            return Err(PreconditionViolation::UnexpectedModifiers {
                name: name.clone(),
                modifiers,
            });
        }

        let signature = program
            .signature_from_declaration(declaration)
            .ok_or_else(|| PreconditionViolation::MissingSignatureDeclaration {
                name: name.clone(),
                kind,
            })?;
        let data = program.signature(signature);

        let arguments = data
            .parameters
            .iter()
            .map(|&parameter| cppify_local_name(program, parameter))
            .collect::<TranslateResult<Vec<_>>>()?;

        let parameters = if data.type_parameters.is_empty() {
            let rendered = data
                .parameters
                .iter()
                .zip(&arguments)
                .map(|(&parameter, argument)| -> TranslateResult<String> {
                    let ty = symbol_type(program, parameter)?;
                    Ok(format!("{} {}", translate_type(program, ty)?, argument))
                })
                .collect::<TranslateResult<Vec<_>>>()?;
            Some(rendered.join(", "))
        } else {
            None
        };

        Ok(Self {
            symbol,
            declaration,
            kind,
            signature,
            type_parameters: &data.type_parameters,
            parameters,
            arguments,
        })
    }

    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }
}

/// Everything emitted for one class-like symbol.
#[derive(Debug, Clone)]
pub struct ClassDescriptor<'p> {
    pub symbol: SymbolId,
    /// Nested static members and types, `export =` resolved.
    pub exports: Vec<SymbolId>,
    /// Directly declared members; inherited members are not repeated.
    pub members: Vec<SymbolId>,
    /// One entry per (method or constructor symbol, declaration) pair.
    pub methods: Vec<MethodDescriptor<'p>>,
    pub properties: Vec<SymbolId>,
    pub base_classes: Vec<SymbolId>,
}

impl<'p> ClassDescriptor<'p> {
    pub fn new(program: &'p Program, symbol: SymbolId) -> TranslateResult<Self> {
        let data = program.symbol(symbol);
        let exports = if data.exports.is_some() {
            program.exports_of_module(symbol)
        } else {
            Vec::new()
        };
        let members: Vec<SymbolId> = program.members(symbol).collect();

        let mut methods = Vec::new();
        for &member in &members {
            let flags = program.symbol(member).flags;
            if flags == SymbolFlags::METHOD || flags == SymbolFlags::CONSTRUCTOR {
                for &declaration in &program.symbol(member).declarations {
                    methods.push(MethodDescriptor::new(program, member, declaration)?);
                }
            }
        }

        let properties = members
            .iter()
            .copied()
            .filter(|&member| program.symbol(member).flags == SymbolFlags::PROPERTY)
            .collect();

        // Namespaces and other non-object kinds have no base classes.
        let base_classes = match data.declared_type {
            Some(ty) if program.class_or_interface(ty).is_some() => program
                .base_types(ty)
                .iter()
                .filter(|&&base| program.class_or_interface(base).is_some())
                .filter_map(|&base| program.ty(base).symbol)
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            symbol,
            exports,
            members,
            methods,
            properties,
            base_classes,
        })
    }
}

/// Type of a symbol at its first declaration, falling back to its value type.
pub(crate) fn symbol_type(program: &Program, symbol: SymbolId) -> TranslateResult<TypeId> {
    let data = program.symbol(symbol);
    let ty = match data.declarations.first() {
        Some(&declaration) => program.type_of_symbol_at_location(symbol, declaration),
        None => data.value_type,
    };
    ty.ok_or_else(|| PreconditionViolation::MissingDeclaredType {
        name: data.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use typebridge_symbols::{ModifierFlags, ProgramBuilder};

    #[test]
    fn test_overloads_yield_one_descriptor_each() {
        let mut builder = ProgramBuilder::new();
        let module = builder.source_file("a.d.ts");
        let class = builder.class(module, "Parser");
        let string = builder.string();
        let number = builder.number();
        builder.method(class, "parse", &[("text", string)], number);
        builder.method(class, "parse", &[("text", string), ("radix", number)], number);
        builder.constructor(class, &[]);
        let program = builder.finish();

        let descriptor = ClassDescriptor::new(&program, class).unwrap();
        assert_eq!(descriptor.methods.len(), 3);
        assert_eq!(descriptor.methods[1].parameters.as_deref(), Some("js_string text, double radix"));
        assert_eq!(descriptor.methods[1].arguments, ["text", "radix"]);
        assert_eq!(descriptor.methods[2].kind, DeclKind::Constructor);
    }

    #[test]
    fn test_static_method_is_refused() {
        let mut builder = ProgramBuilder::new();
        let module = builder.source_file("a.d.ts");
        let class = builder.class(module, "Factory");
        let number = builder.number();
        let method = builder.method(class, "create", &[], number);
        let declaration = builder.symbol(method).declarations[0];
        builder.declaration_mut(declaration).modifiers = ModifierFlags::STATIC;
        let program = builder.finish();

        let err = ClassDescriptor::new(&program, class).unwrap_err();
        assert_eq!(
            err,
            PreconditionViolation::UnexpectedModifiers {
                name: "create".to_string(),
                modifiers: ModifierFlags::STATIC,
            }
        );
    }

    #[test]
    fn test_generic_method_has_no_rendered_parameters() {
        let mut builder = ProgramBuilder::new();
        let module = builder.source_file("a.d.ts");
        let iface = builder.interface(module, "Mapper");
        let t = builder.type_parameter("T");
        let method = builder.generic_method(iface, "map", &[t], &[("value", t)], t);
        let program = builder.finish();

        let declaration = program.symbol(method).declarations[0];
        let descriptor = MethodDescriptor::new(&program, method, declaration).unwrap();
        assert!(descriptor.is_generic());
        assert_eq!(descriptor.parameters, None);
    }

    #[test]
    fn test_base_classes_follow_declared_type() {
        let mut builder = ProgramBuilder::new();
        let module = builder.source_file("a.d.ts");
        let base = builder.interface(module, "Base");
        let derived = builder.class(module, "Derived");
        builder.base_type(derived, base);
        let ns = builder.namespace(module, "util");
        let program = builder.finish();

        assert_eq!(ClassDescriptor::new(&program, derived).unwrap().base_classes, vec![base]);
        assert!(ClassDescriptor::new(&program, ns).unwrap().base_classes.is_empty());
    }
}
