//! SIC Emulator - CLI Entry Point
//!
//! Commands:
//! - `sic-emu run <image>` - Run a program image for a number of steps
//! - `sic-emu pass1 <source>` - Run Pass One and print the symbol table
//! - `sic-emu disasm <image>` - Disassemble a program image
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=sic=trace`) to choose which events print.

use clap::{Parser, Subcommand};
use tracing::{event, Level};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(name = "sic-emu")]
#[command(version)]
#[command(about = "An emulator and Pass One assembler for the SIC computer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program image
    Run {
        /// Path to the JSON program image
        image: String,
        /// Number of instructions to execute
        #[arg(short, long, default_value = "100")]
        steps: u64,
        /// Print each instruction as it executes
        #[arg(short, long)]
        trace: bool,
        /// Dump memory words afterwards, as HEXADDR:COUNT
        #[arg(short, long, value_parser = parse_dump)]
        dump: Option<(u32, usize)>,
    },
    /// Run Pass One over an assembly source file
    Pass1 {
        /// Path to the source file
        source: String,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Disassemble a program image
    Disasm {
        /// Path to the JSON program image
        image: String,
    },
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { image, steps, trace, dump } => run_program(&image, steps, trace, dump),
        Commands::Pass1 { source, json } => pass_one(&source, json),
        Commands::Disasm { image } => disassemble_file(&image),
    }
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn parse_dump(arg: &str) -> Result<(u32, usize), String> {
    let (addr, count) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected HEXADDR:COUNT, got {}", arg))?;
    let addr = u32::from_str_radix(addr.trim_start_matches("0x"), 16)
        .map_err(|e| format!("bad address {}: {}", addr, e))?;
    let count = count
        .parse()
        .map_err(|e| format!("bad count {}: {}", count, e))?;
    Ok((addr, count))
}

fn load_or_exit(path: &str) -> sic::ProgramImage {
    match sic::load_image(path) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("❌ Failed to load image: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program(path: &str, steps: u64, trace: bool, dump: Option<(u32, usize)>) {
    use sic::{Machine, OpcodeTable};
    use sic::asm::disassemble_word;

    let image = load_or_exit(path);
    println!("📂 Loaded {} words at {:06X}", image.words.len(), image.start_address);

    let mut machine = Machine::new();
    if let Err(e) = machine.load_image(&image) {
        eprintln!("❌ Failed to load program: {}", e);
        std::process::exit(1);
    }

    let optab = OpcodeTable::new();
    let mut executed = 0u64;
    while executed < steps {
        let pc = machine.registers.pc();
        match machine.step() {
            Ok(instr) => {
                if trace {
                    println!("{:06X}: {:<20} {}", pc, disassemble_word(&optab, instr.word()), machine.registers);
                }
                executed += 1;
            }
            Err(e) => {
                event!(Level::ERROR, "execution stopped at {:06X}: {}", pc, e);
                eprintln!("❌ CPU error at PC={:06X}: {}", pc, e);
                print_registers(&machine, executed);
                std::process::exit(1);
            }
        }
    }

    print_registers(&machine, executed);

    if let Some((addr, count)) = dump {
        println!();
        for (addr, word) in machine.memory.dump_words(addr, count) {
            println!("{:06X}: {:06X}", addr, word);
        }
    }
}

fn print_registers(machine: &sic::Machine, executed: u64) {
    use sic::Register;

    println!();
    println!("━━━ Result ━━━");
    println!("Steps: {}", executed);
    for reg in Register::ALL {
        println!("{:<3} {:06X}", reg, machine.registers.get(reg));
    }
}

fn pass_one(path: &str, json: bool) {
    use sic::PassOne;

    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to read file: {}", e);
            std::process::exit(1);
        }
    };
    let lines: Vec<&str> = source.lines().collect();

    let (symtab, result) = match PassOne::new().run(lines.as_slice()) {
        Ok(out) => out,
        Err(e) => {
            eprintln!("❌ Assembly error: {}", e);
            std::process::exit(1);
        }
    };

    if json {
        let symbols: std::collections::BTreeMap<&str, u32> = symtab.iter().collect();
        let out = serde_json::json!({ "result": result, "symbols": symbols });
        match serde_json::to_string_pretty(&out) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ Failed to encode result: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Program:  {}", result.program_name.as_deref().unwrap_or("(unnamed)"));
    println!("Start:    {:06X}", result.start_address);
    println!("Length:   {:06X}", result.program_length);
    println!("Entry:    {:06X}", result.execution_start_address);
    println!();
    println!("━━━ SYMTAB ━━━");
    for (label, addr) in symtab.iter() {
        println!("{:<8} {:06X}", label, addr);
    }
}

fn disassemble_file(path: &str) {
    let image = load_or_exit(path);
    println!("{}", sic::disassemble(&image.words, image.start_address));
}
