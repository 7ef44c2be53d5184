//! Type shapes and their native type expressions.

use log::trace;
use typebridge_symbols::{ObjectType, Program, SymbolFlags, SymbolId, TypeFlags, TypeId};

use crate::classify::is_enum_like;
use crate::error::{PreconditionViolation, TranslateResult};
use crate::mangle::mangle_symbol_path;

/// What a checker type looks like to the translator.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeShape<'p> {
    Dynamic,
    String,
    Number,
    Boolean,
    Void,
    Undefined,
    Null,
    /// An enum type or one of its literal members; carries the enum symbol.
    Enum(SymbolId),
    Union(&'p [TypeId]),
    ClassOrInterface {
        symbol: SymbolId,
        object: &'p ObjectType,
    },
    Unrecognized {
        flags: TypeFlags,
        display: &'p str,
    },
}

/// Classifies `ty` by the fixed rule order; the first matching rule wins.
pub fn classify_type(program: &Program, ty: TypeId) -> TranslateResult<TypeShape<'_>> {
    let data = program.ty(ty);
    let flags = data.flags;

    let shape = if flags.intersects(TypeFlags::ANY | TypeFlags::UNKNOWN) {
        TypeShape::Dynamic
    } else if flags.contains(TypeFlags::STRING) {
        TypeShape::String
    } else if flags.contains(TypeFlags::NUMBER) {
        TypeShape::Number
    } else if flags.contains(TypeFlags::BOOLEAN) {
        TypeShape::Boolean
    } else if flags.contains(TypeFlags::VOID) {
        TypeShape::Void
    } else if flags.contains(TypeFlags::UNDEFINED) {
        TypeShape::Undefined
    } else if flags.contains(TypeFlags::NULL) {
        TypeShape::Null
    } else if let Some(symbol) = enum_symbol(program, ty) {
        TypeShape::Enum(symbol)
    } else if flags.contains(TypeFlags::UNION) {
        if data.union.len() < 2 {
            return Err(PreconditionViolation::DegenerateUnion {
                display: data.display.clone(),
                components: data.union.len(),
            });
        }
        TypeShape::Union(&data.union)
    } else if let (Some(object), Some(symbol)) = (program.class_or_interface(ty), data.symbol) {
        TypeShape::ClassOrInterface { symbol, object }
    } else {
        TypeShape::Unrecognized {
            flags,
            display: &data.display,
        }
    };
    Ok(shape)
}

// Enum types carry the enum symbol; enum literal types carry the member,
// whose parent is the enum.
fn enum_symbol(program: &Program, ty: TypeId) -> Option<SymbolId> {
    let data = program.ty(ty);
    if !data.flags.intersects(TypeFlags::ENUM | TypeFlags::ENUM_LITERAL) {
        return None;
    }
    let symbol = data.symbol?;
    let flags = program.symbol(symbol).flags;
    if is_enum_like(flags) {
        Some(symbol)
    } else if flags == SymbolFlags::ENUM_MEMBER {
        program
            .symbol(symbol)
            .parent
            .filter(|&parent| is_enum_like(program.symbol(parent).flags))
    } else {
        None
    }
}

/// Native type expression for `ty`.
pub fn translate_type(program: &Program, ty: TypeId) -> TranslateResult<String> {
    let translated = match classify_type(program, ty)? {
        TypeShape::Dynamic => "js_unknown".to_string(),
        TypeShape::String => "js_string".to_string(),
        TypeShape::Number => "double".to_string(),
        TypeShape::Boolean => "bool".to_string(),
        TypeShape::Void => "void".to_string(),
        TypeShape::Undefined => "js_undefined".to_string(),
        TypeShape::Null => "js_null".to_string(),
        TypeShape::Enum(symbol) => format!("_enum{}", mangle_symbol_path(program, symbol)),
        TypeShape::Union(components) => {
            let components = components
                .iter()
                .map(|&component| translate_type(program, component))
                .collect::<TranslateResult<Vec<_>>>()?;
            format!("js_union<{}>", components.join(", "))
        }
        TypeShape::ClassOrInterface { symbol, object } => {
            if !object.is_monomorphic() {
                return Err(PreconditionViolation::GenericType {
                    display: program.type_to_string(ty).to_string(),
                });
            }
            format!("js_ref<_impl{}>", mangle_symbol_path(program, symbol))
        }
        TypeShape::Unrecognized { flags, display } => {
            trace!("no translation for `{}` (flags={})", display, flags.bits());
            format!(
                "js_unknown /*flags={}: {}*/",
                flags.bits(),
                display.replace("*/", "* /")
            )
        }
    };
    Ok(translated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typebridge_symbols::{ConstantValue, ProgramBuilder, TypeData};

    // --- Test Helpers ---

    fn literal(builder: &mut ProgramBuilder, flags: TypeFlags, display: &str, symbol: Option<SymbolId>) -> TypeId {
        builder.add_type(TypeData {
            flags,
            display: display.to_string(),
            symbol,
            union: Vec::new(),
            object: None,
        })
    }

    #[test]
    fn test_primitive_translation() {
        let mut builder = ProgramBuilder::new();
        let number = builder.number();
        let string = builder.string();
        let boolean = builder.primitive(TypeFlags::BOOLEAN | TypeFlags::UNION, "boolean");
        let any = builder.primitive(TypeFlags::ANY, "any");
        let undefined = builder.primitive(TypeFlags::UNDEFINED, "undefined");
        let null = builder.primitive(TypeFlags::NULL, "null");
        let void = builder.void();
        let program = builder.finish();

        assert_eq!(translate_type(&program, number).unwrap(), "double");
        assert_eq!(translate_type(&program, string).unwrap(), "js_string");
        assert_eq!(translate_type(&program, boolean).unwrap(), "bool");
        assert_eq!(translate_type(&program, any).unwrap(), "js_unknown");
        assert_eq!(translate_type(&program, undefined).unwrap(), "js_undefined");
        assert_eq!(translate_type(&program, null).unwrap(), "js_null");
        assert_eq!(translate_type(&program, void).unwrap(), "void");
    }

    #[test]
    fn test_union_keeps_declared_order() {
        let mut builder = ProgramBuilder::new();
        let string = builder.string();
        let number = builder.number();
        let forward = builder.union(&[string, number]);
        let backward = builder.union(&[number, string]);
        let program = builder.finish();

        assert_eq!(translate_type(&program, forward).unwrap(), "js_union<js_string, double>");
        assert_eq!(translate_type(&program, backward).unwrap(), "js_union<double, js_string>");
    }

    #[test]
    fn test_degenerate_union_is_refused() {
        let mut builder = ProgramBuilder::new();
        let number = builder.number();
        let single = builder.union(&[number]);
        let program = builder.finish();

        assert_eq!(
            translate_type(&program, single),
            Err(PreconditionViolation::DegenerateUnion {
                display: "number".to_string(),
                components: 1,
            })
        );
    }

    #[test]
    fn test_class_reference_and_generic_refusal() {
        let mut builder = ProgramBuilder::new();
        let module = builder.source_file("a.d.ts");
        let class = builder.class(module, "Box");
        let generic = builder.interface(module, "List");
        let t = builder.type_parameter("T");
        let class_ty = builder.symbol(class).declared_type.unwrap();
        let generic_ty = builder.symbol(generic).declared_type.unwrap();
        builder.type_mut(generic_ty).object.as_mut().unwrap().type_parameters.push(t);
        let program = builder.finish();

        assert_eq!(translate_type(&program, class_ty).unwrap(), "js_ref<_impl_js_j_qa_q_dBox>");
        assert_eq!(
            translate_type(&program, generic_ty),
            Err(PreconditionViolation::GenericType { display: "List".to_string() })
        );
    }

    #[test]
    fn test_every_kind_of_type_parameter_is_refused() {
        let cases: [(&str, fn(&mut ObjectType, TypeId)); 4] = [
            ("Own", |object, t| object.type_parameters.push(t)),
            ("Outer", |object, t| object.outer_type_parameters.push(t)),
            ("Local", |object, t| object.local_type_parameters.push(t)),
            ("Polymorphic", |object, t| object.this_type = Some(t)),
        ];

        for (name, attach) in cases {
            let mut builder = ProgramBuilder::new();
            let module = builder.source_file("a.d.ts");
            let interface = builder.interface(module, name);
            let t = builder.type_parameter("T");
            let ty = builder.symbol(interface).declared_type.unwrap();
            attach(builder.type_mut(ty).object.as_mut().unwrap(), t);
            let program = builder.finish();

            assert_eq!(
                translate_type(&program, ty),
                Err(PreconditionViolation::GenericType { display: name.to_string() }),
                "{name}"
            );
        }
    }

    #[test]
    fn test_enum_and_enum_literal() {
        let mut builder = ProgramBuilder::new();
        let module = builder.source_file("a.d.ts");
        let color = builder.enumeration(module, "Color");
        let red = builder.enum_member(color, "Red", Some(ConstantValue::Number(0.0)));
        let color_ty = builder.symbol(color).declared_type.unwrap();
        let red_ty = literal(&mut builder, TypeFlags::ENUM_LITERAL | TypeFlags::NUMBER_LITERAL, "Color.Red", Some(red));
        let program = builder.finish();

        assert_eq!(classify_type(&program, color_ty).unwrap(), TypeShape::Enum(color));
        assert_eq!(translate_type(&program, red_ty).unwrap(), "_enum_js_j_qa_q_dColor");
    }

    #[test]
    fn test_unrecognized_shape_falls_back_with_comment() {
        let mut builder = ProgramBuilder::new();
        let literal_ty = literal(&mut builder, TypeFlags::STRING_LITERAL, "\"a*/b\"", None);
        let program = builder.finish();

        expect_test::expect![[r#"js_unknown /*flags=128: "a* /b"*/"#]]
            .assert_eq(&translate_type(&program, literal_ty).unwrap());
    }
}
