// langur - The Langur programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::mem;
use std::path::Path;
use std::process;
use std::rc::Rc;

use langur_core::{builtins, eval_program, Env, Object};
use langur_vm::{Compiler, SymbolTable, Vm, GLOBALS_SIZE};

const PROMPT: &str = ">> ";

/// Which execution backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Compiler,
    Interpreter,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut mode = Mode::Compiler;
    let mut files: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--version" | "-v" => {
                println!("Langur v0.1.0");
                return;
            }
            "--mode" => {
                i += 1;
                match args.get(i).map(String::as_str) {
                    Some("compiler") => mode = Mode::Compiler,
                    Some("interpreter") => mode = Mode::Interpreter,
                    other => {
                        eprintln!(
                            "Error: --mode expects 'compiler' or 'interpreter', got '{}'",
                            other.unwrap_or("nothing")
                        );
                        process::exit(2);
                    }
                }
            }
            other => files.push(other.to_string()),
        }
        i += 1;
    }

    // If files provided, evaluate them; otherwise start the REPL.
    if files.is_empty() {
        run_repl(mode);
    } else {
        run_files(&files, mode);
    }
}

/// Evaluate a sequence of source files.
fn run_files(files: &[String], mode: Mode) {
    for file in files {
        if let Err(e) = run_file(file, mode) {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

/// Evaluate a single source file.
fn run_file(file_path: &str, mode: Mode) -> Result<(), String> {
    let path = Path::new(file_path);

    // Validate file extension
    match path.extension().and_then(|e| e.to_str()) {
        Some("lr") => {}
        Some(ext) => {
            return Err(format!(
                "Error: unsupported file extension '.{}' for '{}'",
                ext, file_path
            ));
        }
        None => {
            return Err(format!(
                "Error: file '{}' has no extension (expected .lr)",
                file_path
            ));
        }
    }

    let source =
        fs::read_to_string(path).map_err(|e| format!("Error reading '{}': {}", file_path, e))?;
    let program = langur_parser::parse(&source)
        .map_err(|e| format!("Error in '{}': {}", file_path, e))?;

    match mode {
        Mode::Interpreter => {
            let env = Env::new();
            eval_program(&program, &env)
                .map_err(|e| format!("Error in '{}': {}", file_path, e))?;
        }
        Mode::Compiler => {
            let mut compiler = Compiler::new();
            compiler
                .compile(&program)
                .map_err(|e| format!("Error in '{}': {}", file_path, e))?;
            let bytecode = compiler.bytecode();
            let mut vm = Vm::new(&bytecode);
            vm.run()
                .map_err(|e| format!("Error in '{}': {}", file_path, e))?;
        }
    }

    Ok(())
}

/// Run the interactive REPL.
fn run_repl(mode: Mode) {
    let mode_name = match mode {
        Mode::Compiler => "compiler",
        Mode::Interpreter => "interpreter",
    };
    println!("Langur v0.1.0 ({} mode)", mode_name);

    match mode {
        Mode::Compiler => repl_compiler(),
        Mode::Interpreter => repl_interpreter(),
    }
}

/// Compiler-mode REPL: one constant pool, one global symbol table and one
/// globals array persist across lines; each line prints the VM's last
/// popped value.
fn repl_compiler() {
    let symbols = SymbolTable::new();
    {
        let mut table = symbols.borrow_mut();
        for (index, builtin) in builtins::BUILTINS.iter().enumerate() {
            table.define_builtin(index, builtin.name);
        }
    }
    let mut constants: Vec<Object> = Vec::new();
    let mut globals = vec![Object::Null; GLOBALS_SIZE];

    loop {
        let line = match read_line() {
            Some(line) => line,
            None => break,
        };
        if line.is_empty() {
            continue;
        }

        let program = match langur_parser::parse(&line) {
            Ok(program) => program,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        let mut compiler = Compiler::with_state(constants.clone(), Rc::clone(&symbols));
        if let Err(e) = compiler.compile(&program) {
            eprintln!("Compile error: {}", e);
            continue;
        }

        let bytecode = compiler.bytecode();
        let mut vm = Vm::with_globals(&bytecode, mem::take(&mut globals));
        match vm.run() {
            Ok(()) => println!("{}", vm.last_popped()),
            Err(e) => eprintln!("Runtime error: {}", e),
        }
        globals = vm.take_globals();
        constants = bytecode.constants;
    }
}

/// Interpreter-mode REPL: a single environment persists across lines.
fn repl_interpreter() {
    let env = Env::new();

    loop {
        let line = match read_line() {
            Some(line) => line,
            None => break,
        };
        if line.is_empty() {
            continue;
        }

        match langur_parser::parse(&line) {
            Ok(program) => match eval_program(&program, &env) {
                Ok(result) => println!("{}", result),
                Err(e) => eprintln!("Error: {}", e),
            },
            Err(e) => eprintln!("{}", e),
        }
    }
}

/// Prompt and read one trimmed line; None on EOF or read error.
fn read_line() -> Option<String> {
    print!("{}", PROMPT);
    if io::stdout().flush().is_err() {
        return None;
    }

    let mut input = String::new();
    match io::stdin().lock().read_line(&mut input) {
        Ok(0) => {
            println!();
            None
        }
        Ok(_) => Some(input.trim().to_string()),
        Err(e) => {
            eprintln!("Read error: {}", e);
            None
        }
    }
}
