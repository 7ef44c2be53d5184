//! Native source emission.
//!
//! Output layout, inside the configured namespace:
//!
//! 1. one `enum class _enum<M>` per enum, tagged with `IsJsIntegralEnum`
//! 2. `struct _jsall` holding the enum aliases, then a forward declaration
//!    and `js_ref` alias per class, then one `_impl<M>` struct per class
//!
//! In keep-going mode a symbol that cannot be emitted is replaced by a
//! comment and a memberless definition under the same name.
//!
//! Generated bodies only ever call `_call`, `_getProperty`, `_setProperty`
//! and `new_` on a runtime lookup expression.

use log::{debug, info, warn};
use typebridge_symbols::{ConstantValue, DeclId, ModifierFlags, Program, SymbolFlags, SymbolId};
use typebridge_types::{
    boundary_lookup_expression, cpp_string_literal, cppify_local_name, is_class_like, is_enum_like,
    mangle_symbol_path, translate_type, PreconditionViolation, TranslateResult,
};

use crate::config::EmitConfig;
use crate::descriptor::{symbol_type, ClassDescriptor, MethodDescriptor};
use crate::error::CodegenError;
use crate::walker::Worklists;

/// Result of an emission run.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    pub source: String,
    /// Symbols replaced by a comment; only populated in keep-going mode.
    pub skipped: Vec<CodegenError>,
}

pub struct Emitter<'p> {
    program: &'p Program,
    config: &'p EmitConfig,
}

impl<'p> Emitter<'p> {
    pub fn new(program: &'p Program, config: &'p EmitConfig) -> Self {
        Self { program, config }
    }

    pub fn emit(&self, worklists: &Worklists) -> Result<Bindings, CodegenError> {
        let mut bindings = Bindings::default();
        bindings.source.push_str(&format!("namespace {} {{\n", self.config.namespace));

        // Enums come first: class members may refer to them.
        let mut emitted_enums = 0;
        for &symbol in worklists.enums() {
            debug!("emitting enum {}", self.program.fully_qualified_name(symbol));
            match self.enum_block(symbol) {
                Ok(block) => {
                    bindings.source.push_str(&block);
                    emitted_enums += 1;
                }
                Err(violation) => {
                    self.skip(symbol, violation, "", &mut bindings)?;
                    bindings.source.push_str(&enum_stub(&mangle_symbol_path(self.program, symbol)));
                }
            }
        }

        // Skipped symbols keep a stub definition, so every alias is declared.
        bindings.source.push_str("struct _jsall {\n");
        for &symbol in worklists.enums() {
            let mangled = mangle_symbol_path(self.program, symbol);
            bindings.source.push_str(&format!("\tusing {} = _enum{};\n", mangled, mangled));
        }
        for &symbol in worklists.classes() {
            let mangled = mangle_symbol_path(self.program, symbol);
            bindings.source.push_str(&format!("\tstruct _impl{};\n", mangled));
            bindings.source.push_str(&format!("\tusing {} = js_ref<_impl{}>;\n", mangled, mangled));
        }
        let mut emitted_classes = 0;
        for &symbol in worklists.classes() {
            debug!("emitting class {}", self.program.fully_qualified_name(symbol));
            match self.class_block(symbol) {
                Ok(block) => {
                    bindings.source.push_str(&block);
                    emitted_classes += 1;
                }
                Err(violation) => {
                    self.skip(symbol, violation, "\t", &mut bindings)?;
                    bindings.source.push_str(&class_stub(&mangle_symbol_path(self.program, symbol)));
                }
            }
        }
        bindings.source.push_str("};\n");
        bindings.source.push_str(&format!("}} // namespace {}\n", self.config.namespace));

        info!(
            "emitted {} enum(s) and {} class(es), skipped {}",
            emitted_enums,
            emitted_classes,
            bindings.skipped.len()
        );
        Ok(bindings)
    }

    fn skip(
        &self,
        symbol: SymbolId,
        violation: PreconditionViolation,
        indent: &str,
        bindings: &mut Bindings,
    ) -> Result<(), CodegenError> {
        let name = self.program.fully_qualified_name(symbol);
        let message = violation.to_string();
        let error = CodegenError::Emit {
            symbol: name.clone(),
            source: violation,
        };
        if !self.config.keep_going {
            return Err(error);
        }
        warn!("skipping {}: {}", name, message);
        bindings.source.push_str(&format!(
            "{}/* skipped {}: {} */\n",
            indent,
            comment_text(&name),
            comment_text(&message)
        ));
        bindings.skipped.push(error);
        Ok(())
    }

    fn enum_block(&self, symbol: SymbolId) -> TranslateResult<String> {
        let mangled = mangle_symbol_path(self.program, symbol);
        let mut out = format!("enum class _enum{} {{\n", mangled);
        for member in self.program.exports(symbol) {
            out.push_str(&self.enum_member(member)?);
        }
        out.push_str("};\n");
        out.push_str(&integral_enum_tag(&mangled));
        Ok(out)
    }

    fn enum_member(&self, member: SymbolId) -> TranslateResult<String> {
        let data = self.program.symbol(member);
        if data.flags != SymbolFlags::ENUM_MEMBER {
            return Err(PreconditionViolation::UnexpectedSymbolFlags {
                name: data.name.clone(),
                flags: data.flags,
                expected: "EnumMember",
            });
        }
        let declaration = self.single_declaration(member)?;
        let modifiers = self.program.combined_modifier_flags(declaration);
        if !modifiers.is_empty() {
            return Err(PreconditionViolation::UnexpectedModifiers {
                name: data.name.clone(),
                modifiers,
            });
        }

        match self.program.constant_value(declaration).and_then(integral_value) {
            Some(value) => Ok(format!("\t{} = {},\n", cppify_local_name(self.program, member)?, value)),
            None => {
                debug!("no integral value for {}", self.program.fully_qualified_name(member));
                Ok(format!("\t/*{} = ??? */\n", comment_text(&data.name)))
            }
        }
    }

    fn class_block(&self, symbol: SymbolId) -> TranslateResult<String> {
        let descriptor = ClassDescriptor::new(self.program, symbol)?;
        let mangled = mangle_symbol_path(self.program, symbol);

        let bases = if descriptor.base_classes.is_empty() {
            "virtual IObject".to_string()
        } else {
            descriptor
                .base_classes
                .iter()
                .map(|&base| format!("virtual _impl{}", mangle_symbol_path(self.program, base)))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut out = format!("\tstruct _impl{} : {} {{\n", mangled, bases);
        out.push_str("\t\tstruct _js_ref_definitions {\n");
        for &export in &descriptor.exports {
            let flags = self.program.symbol(export).flags;
            if is_enum_like(flags) || is_class_like(flags) {
                out.push_str(&format!(
                    "\t\t\tusing {} = {};\n",
                    cppify_local_name(self.program, export)?,
                    mangle_symbol_path(self.program, export)
                ));
            }
        }
        out.push_str("\t\t};\n");

        for &property in &descriptor.properties {
            out.push_str(&self.property(property)?);
        }
        for method in &descriptor.methods {
            out.push_str(&self.method(&descriptor, method)?);
        }
        out.push_str("\t};\n");
        Ok(out)
    }

    fn property(&self, property: SymbolId) -> TranslateResult<String> {
        let data = self.program.symbol(property);
        let declaration = self.single_declaration(property)?;
        let modifiers = self.program.combined_modifier_flags(declaration);
        let readonly = if modifiers.is_empty() {
            false
        } else if modifiers == ModifierFlags::READONLY {
            true
        } else {
            return Err(PreconditionViolation::UnexpectedModifiers {
                name: data.name.clone(),
                modifiers,
            });
        };

        let ty = translate_type(self.program, symbol_type(self.program, property)?)?;
        let local = cppify_local_name(self.program, property)?;
        let key = cpp_string_literal(&data.name);

        let mut out = format!(
            "\t\tauto {}() noexcept {{ return _getProperty<{}>({}); }}\n",
            local, ty, key
        );
        if !readonly {
            out.push_str(&format!(
                "\t\tvoid {}({} v) noexcept {{ _setProperty({}, v); }}\n",
                local, ty, key
            ));
        }
        Ok(out)
    }

    fn method(&self, class: &ClassDescriptor<'_>, method: &MethodDescriptor<'_>) -> TranslateResult<String> {
        let data = self.program.symbol(method.symbol);
        if method.is_generic() {
            let signature = self.program.signature_to_string(method.signature);
            return Ok(format!(
                "\t\t// {}{}: generic signatures are not supported\n",
                data.name,
                signature.replace(['\r', '\n'], " ")
            ));
        }
        let parameters = method.parameters.as_deref().unwrap_or_default();

        if data.flags == SymbolFlags::METHOD {
            let ret = translate_type(self.program, self.program.signature(method.signature).return_type)?;
            let arguments = std::iter::once(cpp_string_literal(&data.name))
                .chain(method.arguments.iter().cloned())
                .collect::<Vec<_>>()
                .join(", ");
            Ok(format!(
                "\t\tauto {}({}) noexcept {{\n\t\t\treturn _call<{}>({});\n\t\t}}\n",
                cppify_local_name(self.program, method.symbol)?,
                parameters,
                ret,
                arguments
            ))
        } else {
            let declared = self.program.declared_type_of_symbol(class.symbol).ok_or_else(|| {
                PreconditionViolation::MissingDeclaredType {
                    name: self.program.symbol(class.symbol).name.clone(),
                }
            })?;
            Ok(format!(
                "\t\tstatic auto _construct({}) noexcept {{\n\t\t\treturn {}({}.new_({}));\n\t\t}}\n",
                parameters,
                translate_type(self.program, declared)?,
                boundary_lookup_expression(self.program, class.symbol),
                method.arguments.join(", ")
            ))
        }
    }

    fn single_declaration(&self, symbol: SymbolId) -> TranslateResult<DeclId> {
        let data = self.program.symbol(symbol);
        match data.declarations.as_slice() {
            [declaration] => Ok(*declaration),
            declarations => Err(PreconditionViolation::DeclarationCount {
                name: data.name.clone(),
                expected: 1,
                found: declarations.len(),
            }),
        }
    }
}

fn integral_enum_tag(mangled: &str) -> String {
    format!(
        "template<> struct IsJsIntegralEnum<_enum{}> : std::true_type {{}};\n",
        mangled
    )
}

/// Memberless stand-in for an enum that could not be emitted.
fn enum_stub(mangled: &str) -> String {
    format!("enum class _enum{} {{\n}};\n{}", mangled, integral_enum_tag(mangled))
}

/// Memberless stand-in for a class that could not be emitted.
fn class_stub(mangled: &str) -> String {
    format!(
        "\tstruct _impl{} : virtual IObject {{\n\t\tstruct _js_ref_definitions {{\n\t\t}};\n\t}};\n",
        mangled
    )
}

/// Enum values that fit a native `int`.
fn integral_value(value: &ConstantValue) -> Option<i32> {
    match *value {
        ConstantValue::Number(n) if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 => {
            Some(n as i32)
        }
        _ => None,
    }
}

fn comment_text(text: &str) -> String {
    text.replace("*/", "* /")
}
