use std::{fs, process};

use alox::{
    chunk::Chunk,
    compiler::compile,
    config::{Config, DEFAULT_STACK_MAX},
    debug::disassemble,
    memory::Heap,
    repl::run_repl,
    vm::Vm,
    InterpreterError, InterpreterResult,
};
use clap::{App, Arg};

const EXIT_USAGE: i32 = 64;
const EXIT_COMPILE_ERROR: i32 = 65;
const EXIT_RUNTIME_ERROR: i32 = 70;
const EXIT_IO_ERROR: i32 = 74;

fn main() {
    env_logger::init();

    let matches = App::new("alox")
        .about("Bytecode interpreter for Lox expressions")
        .arg(
            Arg::with_name("PATH")
                .help("Script to run; starts a REPL when omitted")
                .index(1),
        )
        .arg(
            Arg::with_name("disassemble")
                .long("disassemble")
                .short("d")
                .help("Print the compiled bytecode before running it"),
        )
        .arg(
            Arg::with_name("stack-max")
                .long("stack-max")
                .takes_value(true)
                .value_name("SLOTS")
                .help("Maximum VM stack depth"),
        )
        .arg(
            Arg::with_name("trace")
                .long("trace")
                .help("Log each executed instruction (needs RUST_LOG=trace)"),
        )
        .get_matches();

    let stack_max = match matches.value_of("stack-max") {
        Some(raw) => match raw.parse::<usize>() {
            Ok(slots) if slots > 0 => slots,
            _ => {
                eprintln!("--stack-max expects a positive integer, got '{}'", raw);
                process::exit(EXIT_USAGE);
            }
        },
        None => DEFAULT_STACK_MAX,
    };
    let config = Config::new()
        .with_stack_max(stack_max)
        .with_trace_execution(matches.is_present("trace"));

    match matches.value_of("PATH") {
        Some(path) => run_file(path, config, matches.is_present("disassemble")),
        None => {
            if let Err(err) = run_repl(config) {
                eprintln!("{}", err);
                process::exit(EXIT_IO_ERROR);
            }
        }
    }
}

fn run_file(path: &str, config: Config, print_code: bool) {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not read file \"{}\": {}", path, err);
            process::exit(EXIT_IO_ERROR);
        }
    };

    let heap = Heap::new();
    let mut vm = Vm::with_config(&heap, config, std::io::stdout());
    let result = if print_code {
        run_with_listing(&mut vm, &heap, &source)
    } else {
        vm.interpret(&source)
    };

    if let Err(err) = result {
        eprintln!("{}", err);
        process::exit(match err {
            InterpreterError::CompileError(_) => EXIT_COMPILE_ERROR,
            InterpreterError::RuntimeError(_) => EXIT_RUNTIME_ERROR,
            InterpreterError::Output(_) => EXIT_IO_ERROR,
        });
    }
}

fn run_with_listing<'heap>(
    vm: &mut Vm<'heap>,
    heap: &'heap Heap,
    source: &str,
) -> InterpreterResult {
    let mut chunk = Chunk::init();
    compile(source, &mut chunk, heap)?;
    print!("{}", disassemble(&chunk, "code"));
    let result = vm.execute(&chunk);
    chunk.release();
    result
}
