use std::{fmt::Write, fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use t8_as::{lex::Lex, writer};
use t8_base::{
    image,
    runner::Signal,
    vm::{Cpu, Reg, MEMORY_SIZE, VIDEO_RAM},
};

#[derive(Parser)]
#[command(version, about, long_about, arg_required_else_help(true))]
struct Args {
    /// File to execute
    file: PathBuf,

    /// Assembly file
    #[arg(short, long)]
    assembly: bool,

    /// Output file for the hex image (--assembly)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Do not execute file
    #[arg(short, long)]
    no_exec: bool,

    /// Print the CPU state after execution
    #[arg(long)]
    dump: bool,
}

fn main() -> ExitCode {
    let Args {
        file,
        assembly,
        output,
        no_exec,
        dump,
    } = Args::parse();

    let source = match fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read file to UTF-8: {e}");

            return ExitCode::FAILURE;
        }
    };

    let hex = if assembly {
        let ctx = writer::Context::new();
        match ctx.generate(Lex::new(&source)) {
            Ok(bytes) => image::encode(&bytes),
            Err(e) => {
                eprintln!("error:{}: {}", e.line + 1, e.kind);

                return ExitCode::FAILURE;
            }
        }
    } else {
        source
    };

    if let Some(output) = output {
        if assembly {
            if let Err(e) = fs::write(output, &hex) {
                eprintln!("Failed to write to file: {e}");

                return ExitCode::FAILURE;
            }
        }
    }

    let program = match image::decode(hex.trim_end()) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("image-error: {e}");

            return ExitCode::FAILURE;
        }
    };

    let mut cpu = Cpu::new();
    if let Err(e) = cpu.load(&program) {
        eprintln!("load-error: {e}");

        return ExitCode::FAILURE;
    }

    if no_exec {
        return ExitCode::SUCCESS;
    }

    if let Signal::Fault = cpu.run() {
        eprintln!("runtime-error: fault at pc {:#04x}", cpu.pc);

        return ExitCode::FAILURE;
    }

    print_screen(&cpu);
    if dump {
        print_cpu(&cpu);
    }

    ExitCode::SUCCESS
}

/// Renders the display surface as an 8x8 framed grid of glyphs.
fn print_screen(cpu: &Cpu) {
    println!("|========|");
    println!("| SCREEN |");
    println!("|========|");
    for row in 0..VIDEO_RAM / 8 {
        let mut line = String::with_capacity(10);
        line.push('|');
        for col in 0..8 {
            line.push(cpu.glyph(row * 8 + col) as char);
        }
        line.push('|');
        println!("{line}");
    }
    println!("|========|");
}

/// Dumps registers, flags and the full RAM grid.
fn print_cpu(cpu: &Cpu) {
    println!("pc: {:#04x}  ir: {:#04x}", cpu.pc, cpu.ir);
    println!("carry: {}  zero: {}", cpu.carry, cpu.zero);
    for reg in Reg::VARIANTS {
        println!("{}: {:#04x}", reg.name(), cpu.get_register(*reg));
    }

    println!("ram:");
    for row in 0..MEMORY_SIZE / 16 {
        let mut line = String::with_capacity(52);
        let _ = write!(line, "{:02x}:", row * 16);
        for col in 0..16 {
            let _ = write!(line, " {:02x}", cpu.ram[row * 16 + col]);
        }
        println!("{line}");
    }
}
