use alox::{
    chunk::Chunk, compiler::compile, debug::disassemble, memory::Heap, opcodes::Op, vm::Vm,
    InterpreterError,
};
use std::convert::TryFrom;

#[test]
fn test_type_error_is_not_a_compile_error() {
    let heap = Heap::new();
    let mut chunk = Chunk::init();
    assert!(compile("1 + \"a\"", &mut chunk, &heap).is_ok());

    let mut vm = Vm::with_output(&heap, Vec::new());
    match vm.execute(&chunk) {
        Err(InterpreterError::RuntimeError(err)) => {
            assert_eq!(
                err.to_string(),
                "Operands must be numbers.\n[line 1] in script"
            );
        }
        other => panic!("expected a runtime error, got {:?}", other),
    }
    assert!(vm.stack().is_empty());
    assert!(vm.into_output().is_empty());
}

#[test]
fn test_runtime_error_line_comes_from_the_operator() {
    let heap = Heap::new();
    let mut vm = Vm::with_output(&heap, Vec::new());
    match vm.interpret("1 +\n2 +\ntrue") {
        Err(InterpreterError::RuntimeError(err)) => assert_eq!(err.line, 3),
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

#[test]
fn test_missing_paren_never_executes() {
    let heap = Heap::new();
    let mut vm = Vm::with_output(&heap, Vec::new());
    match vm.interpret("(1 + 2") {
        Err(InterpreterError::CompileError(err)) => {
            assert_eq!(
                err.diagnostics,
                vec!["[line 1] Error at end: Expect ')' after expression.".to_string()]
            );
        }
        other => panic!("expected a compile error, got {:?}", other),
    }
    assert!(vm.into_output().is_empty());
}

#[test]
fn test_empty_source_needs_an_expression() {
    let heap = Heap::new();
    let mut vm = Vm::with_output(&heap, Vec::new());
    match vm.interpret("") {
        Err(InterpreterError::CompileError(err)) => {
            assert_eq!(err.to_string(), "[line 1] Error at end: Expect expression.");
        }
        other => panic!("expected a compile error, got {:?}", other),
    }
}

#[test]
fn test_disassembly_accounts_for_every_byte() {
    let heap = Heap::new();
    let mut chunk = Chunk::init();
    compile("!(1 >= 2) == \"s\"", &mut chunk, &heap).unwrap();

    let listing = disassemble(&chunk, "code");
    let mut lines = listing.lines();
    assert_eq!(lines.next(), Some("== code =="));

    let mut expected_offset = 0;
    let mut instructions = 0;
    for line in lines {
        let offset: usize = line[..4].parse().unwrap();
        assert_eq!(offset, expected_offset, "{}", line);
        let op = Op::try_from(chunk.code()[offset]).unwrap();
        assert!(line.contains(op.mnemonic()), "{}", line);
        expected_offset += 1 + op.operand_len();
        instructions += 1;
    }
    assert_eq!(expected_offset, chunk.len());
    assert_eq!(instructions, 8);
    assert!(listing.contains("OP_CONSTANT         2 's'"));
}

#[test]
fn test_deep_nesting_is_reported_not_crashed() {
    let heap = Heap::new();
    let mut vm = Vm::with_output(&heap, Vec::new());
    let source = format!("{}1{}", "(".repeat(200_000), ")".repeat(200_000));
    match vm.interpret(&source) {
        Err(InterpreterError::CompileError(err)) => {
            assert_eq!(err.diagnostics.len(), 1);
            assert!(err.diagnostics[0].ends_with("Expression nesting too deep."));
        }
        other => panic!("expected a compile error, got {:?}", other),
    }
    assert!(vm.into_output().is_empty());
}
