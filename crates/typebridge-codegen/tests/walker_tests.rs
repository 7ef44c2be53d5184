use typebridge_codegen::{resolve_roots, walk, Walker};
use typebridge_symbols::{ConstantValue, ModifierFlags, Program, ProgramBuilder, SymbolFlags, SymbolId};

// --- Test Helpers ---

fn shapes_program() -> (Program, SymbolId) {
    let mut builder = ProgramBuilder::new();
    let module = builder.source_file("shapes.d.ts");
    let color = builder.enumeration(module, "Color");
    builder.enum_member(color, "Red", Some(ConstantValue::Number(0.0)));
    builder.enum_member(color, "Green", Some(ConstantValue::Number(5.0)));
    let class = builder.class(module, "Box");
    let number = builder.number();
    builder.property(class, "value", number, ModifierFlags::empty());
    builder.method(class, "getValue", &[], number);
    (builder.finish(), module)
}

#[test]
fn test_trace_layout() {
    let (program, module) = shapes_program();
    let output = walk(&program, &[module]);

    expect_test::expect![[r#"
'"shapes"', flags=512
  members
  exportsOfModule
    '"shapes".Color', flags=256
      members
      exports
        '"shapes".Color.Red', flags=8
          members
          call signatures
          constructors
        '"shapes".Color.Green', flags=8
          members
          call signatures
          constructors
      call signatures
      constructors
    '"shapes".Box', flags=32
      members
        '"shapes".Box.value', flags=4
          members
          call signatures
          constructors
        '"shapes".Box.getValue', flags=8192
          members
          call signatures
          constructors
      call signatures
      constructors
      base types
  call signatures
  constructors
"#]]
    .assert_eq(&output.trace);
}

#[test]
fn test_worklists_in_discovery_order() {
    let (program, module) = shapes_program();
    let output = walk(&program, &[module]);

    let names = |ids: &[SymbolId]| -> Vec<String> { ids.iter().map(|&id| program.fully_qualified_name(id)).collect() };
    assert_eq!(names(output.worklists.enums()), ["\"shapes\".Color"]);
    assert_eq!(names(output.worklists.classes()), ["\"shapes\"", "\"shapes\".Box"]);
}

#[test]
fn test_symbol_reached_from_two_roots_is_queued_once() {
    let mut builder = ProgramBuilder::new();
    let first = builder.source_file("first.d.ts");
    let second = builder.source_file("second.d.ts");
    let shared = builder.interface(first, "Shared");
    // `second` re-exports the interface declared in `first`.
    builder
        .symbol_mut(second)
        .exports
        .get_or_insert_with(Default::default)
        .insert("Shared".to_string(), shared);
    let program = builder.finish();

    let output = walk(&program, &[first, second]);
    assert_eq!(output.worklists.classes(), &[first, shared, second]);
    assert!(output
        .trace
        .contains("    '\"first\".Shared', flags=64\n      (already visited)\n"));
}

#[test]
fn test_export_equals_is_followed_for_modules() {
    let mut builder = ProgramBuilder::new();
    let module = builder.source_file("lib.d.ts");
    let api = builder.add_symbol("Api", SymbolFlags::VALUE_MODULE | SymbolFlags::NAMESPACE_MODULE);
    builder.add_export(module, api);
    builder.set_export_equals(module, api);
    let client = builder.class(api, "Client");
    let program = builder.finish();

    let output = walk(&program, &[module]);
    // `Api` itself is hidden behind `export =`; its exports are walked directly.
    assert_eq!(output.worklists.classes(), &[module, client]);
}

#[test]
fn test_call_and_construct_signatures_are_traced() {
    let mut builder = ProgramBuilder::new();
    let module = builder.source_file("a.d.ts");
    let iface = builder.interface(module, "Callable");
    let base = builder.interface(module, "Base");
    builder.base_type(iface, base);
    let number = builder.number();
    let string = builder.string();
    let declared = builder.symbol(iface).declared_type.unwrap();
    let call = builder.add_signature(typebridge_symbols::Signature {
        display: "(x: number): string".to_string(),
        type_parameters: Vec::new(),
        parameters: Vec::new(),
        return_type: string,
        declaration: None,
    });
    let construct = builder.add_signature(typebridge_symbols::Signature {
        display: "new (): Callable".to_string(),
        type_parameters: Vec::new(),
        parameters: Vec::new(),
        return_type: number,
        declaration: None,
    });
    let object = builder.type_mut(declared).object.as_mut().unwrap();
    object.call_signatures.push(call);
    object.construct_signatures.push(construct);
    let program = builder.finish();

    let mut walker = Walker::new(&program);
    walker.walk_root(module);
    let trace = walker.finish().trace;

    assert!(trace.contains(concat!(
        "      call signatures\n",
        "        (x: number): string\n",
        "      constructors\n",
        "        new (): Callable\n",
        "      base types\n",
        "        Base\n",
    )));
}

#[test]
fn test_unresolved_files_are_reported_and_skipped() {
    let mut builder = ProgramBuilder::new();
    let module = builder.source_file("a.d.ts");
    builder.script_file("globals.d.ts");
    let program = builder.finish();

    let resolution = resolve_roots(&program, &["a.d.ts", "globals.d.ts"]);
    assert_eq!(resolution.roots, vec![module]);
    assert_eq!(resolution.missing, vec!["globals.d.ts".to_string()]);
}
