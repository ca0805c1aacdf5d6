//! CLI command implementations.

use std::fs;

use stackvm_common::{Program, CATALOG};
use stackvm_vm::{DEFAULT_STACK_SIZE, VM};

/// Largest `--data-size` or `--stack-size` accepted, in slots.
const MAX_SLOTS: usize = 1 << 24;

/// Options accepted by `run`.
#[derive(Debug, PartialEq, Eq)]
struct RunOptions {
    entry: usize,
    data_size: usize,
    stack_size: usize,
    trace: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            entry: 0,
            data_size: 0,
            stack_size: DEFAULT_STACK_SIZE,
            trace: false,
        }
    }
}

/// Load and execute a program.
pub fn run(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: stackvm run <program.txt> [--entry N] [--data-size N] [--stack-size N] [--trace]");
        return Err(1);
    }

    let input = &args[0];
    let options = parse_run_options(&args[1..])?;
    let program = read_program(input)?;

    let mut vm = VM::new(&program, options.entry, options.data_size)
        .with_stack_size(options.stack_size);
    vm.set_trace(options.trace);

    vm.execute().map_err(|e| {
        eprintln!("runtime error: {e}");
        2
    })
}

/// Disassemble a program to an address-annotated listing.
pub fn disassemble(args: &[String]) -> Result<(), i32> {
    if args.is_empty() {
        eprintln!("error: disassemble requires an input file");
        eprintln!("Usage: stackvm disassemble <program.txt>");
        return Err(1);
    }

    let program = read_program(&args[0])?;
    print!("{}", stackvm_disasm::disassemble(&program));
    Ok(())
}

/// Print the instruction catalog: value, mnemonic, operand count.
pub fn opcodes() -> Result<(), i32> {
    for info in &CATALOG {
        println!("{:>2}  {:<7} {}", info.opcode as i64, info.name, info.operands);
    }
    Ok(())
}

// --- Helpers ---

/// Read and parse a program listing.
fn read_program(path: &str) -> Result<Program, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })?;

    Program::parse(&text).map_err(|e| {
        eprintln!("error: invalid program: {e}");
        1
    })
}

/// Parse the flags following `run <input>`.
fn parse_run_options(args: &[String]) -> Result<RunOptions, i32> {
    let mut options = RunOptions::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--trace" => options.trace = true,
            flag @ ("--entry" | "--data-size" | "--stack-size") => {
                let value = parse_count(flag, args.get(i + 1))?;
                if flag != "--entry" && value > MAX_SLOTS {
                    eprintln!("error: {flag} value {value} too large (max {MAX_SLOTS})");
                    return Err(1);
                }
                match flag {
                    "--entry" => options.entry = value,
                    "--data-size" => options.data_size = value,
                    _ => options.stack_size = value,
                }
                i += 1;
            }
            other => {
                eprintln!("error: unknown option '{other}'");
                return Err(1);
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Parse the non-negative value of a numeric flag.
fn parse_count(flag: &str, value: Option<&String>) -> Result<usize, i32> {
    let Some(value) = value else {
        eprintln!("error: {flag} requires a value");
        return Err(1);
    };
    value.parse::<usize>().map_err(|_| {
        eprintln!("error: {flag} expects a non-negative integer, got '{value}'");
        1
    })
}
