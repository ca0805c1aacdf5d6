//! stackvm CLI — run and disassemble integer bytecode programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage or load error
//! - 2: Runtime error

mod commands;

use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "disassemble" => commands::disassemble(&args[2..]),
        "opcodes" => commands::opcodes(),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

fn print_usage() {
    eprintln!("Usage: stackvm <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <program.txt> [options]     Execute a program");
    eprintln!("      --entry N                   Start address (default 0)");
    eprintln!("      --data-size N               Global slots (default 0)");
    eprintln!("      --stack-size N              Stack slots (default 1000)");
    eprintln!("      --trace                     Trace each instruction and dump memory");
    eprintln!("  disassemble <program.txt>       Print an address-annotated listing");
    eprintln!("  opcodes                         List the instruction catalog");
}
