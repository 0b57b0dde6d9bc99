//! Single-organism runner CLI.
//!
//! Loads a genome from a symbol file, executes it for a bounded number of
//! steps, and reports what happened. Offspring produced by division can be
//! written back out as symbol files and run in turn.
//!
//! # Usage
//! ```text
//! organism <genome-file> [OPTIONS]
//! ```
//!
//! # Arguments
//! - `genome-file`: Text file of instruction symbols (one character per code)
//!
//! # Options
//! - `-s, --steps <n>`: Instructions to execute (default 1000)
//! - `-o, --offspring <file>`: Write the divided-off offspring genome here
//! - `--status`: Print the full CPU status dump after the run
//! - `--trace <n>`: Print a status dump every n steps
//!
//! # Examples
//! ```text
//! organism replicator.gen
//! organism replicator.gen -s 500 -o child.gen
//! organism replicator.gen --trace 10
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::process;

use replivm::virtual_machine::cpu::Cpu;
use replivm::virtual_machine::inst_set::InstSet;
use replivm::{error, info, warn};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage(&args[0]);
        process::exit(if args.len() < 2 { 1 } else { 0 });
    }

    let genome_path = &args[1];
    let mut steps = 1000usize;
    let mut offspring_path: Option<String> = None;
    let mut show_status = false;
    let mut trace_every: Option<usize> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            k @ ("--steps" | "-s") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                steps = args[i].parse().unwrap_or_else(|_| {
                    error!("Invalid step count: '{}' is not a valid number", args[i]);
                    process::exit(1);
                });
                i += 1;
            }
            k @ ("--offspring" | "-o") => {
                i += 1;
                if i >= args.len() {
                    error!("{k} requires an argument");
                    process::exit(1);
                }
                offspring_path = Some(args[i].clone());
                i += 1;
            }
            "--status" => {
                show_status = true;
                i += 1;
            }
            "--trace" => {
                i += 1;
                if i >= args.len() {
                    error!("--trace requires an argument");
                    process::exit(1);
                }
                let n: usize = args[i].parse().unwrap_or_else(|_| {
                    error!("Invalid trace interval: '{}' is not a valid number", args[i]);
                    process::exit(1);
                });
                if n == 0 {
                    error!("Trace interval must be greater than 0");
                    process::exit(1);
                }
                trace_every = Some(n);
                i += 1;
            }
            other => {
                error!("Unexpected argument: {}\n", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    if !Path::new(genome_path).exists() {
        error!("Genome file does not exist: {}", genome_path);
        process::exit(1);
    }

    let text = fs::read_to_string(genome_path).unwrap_or_else(|e| {
        error!("Failed to read genome file: {}", e);
        process::exit(1);
    });
    let text = text.trim();

    let set = InstSet::default_set();
    let genome = set.genome_from_text(text).unwrap_or_else(|e| {
        error!("Invalid genome: {}", e);
        process::exit(1);
    });

    let mut cpu = Cpu::new(&set, genome).unwrap_or_else(|e| {
        error!("Failed to build CPU: {}", e);
        process::exit(1);
    });

    info!("Loaded {} ({} codes), running {} steps", genome_path, text.len(), steps);

    match trace_every {
        Some(n) => {
            for executed in (0..steps).step_by(n) {
                cpu.run(n.min(steps - executed));
                println!("--- step {} ---", (executed + n).min(steps));
                println!("{}", cpu.status());
            }
        }
        None => cpu.run(steps),
    }

    info!(
        "Run finished: genome {} codes, {} soft errors",
        cpu.genome().len(),
        cpu.error_count()
    );

    if show_status {
        println!("{}", cpu.status());
    }

    match cpu.take_offspring() {
        Some(child) => {
            let child_text = set.genome_to_text(&child);
            info!("Offspring divided off ({} codes): {}", child.len(), child_text);
            if let Some(path) = offspring_path {
                if let Err(e) = fs::write(&path, format!("{child_text}\n")) {
                    error!("Failed to write offspring file: {}", e);
                    process::exit(1);
                }
                info!("Offspring written to {}", path);
            }
        }
        None => {
            if offspring_path.is_some() {
                warn!("No offspring was produced; nothing written.");
            } else {
                info!("No offspring was produced.");
            }
        }
    }
}

const USAGE: &str = "\
Organism Runner

USAGE:
    {program} <genome-file> [OPTIONS]

ARGS:
    <genome-file>    Text file of instruction symbols (one character per code)

OPTIONS:
    -s, --steps <n>          Instructions to execute (default 1000)
    -o, --offspring <file>   Write the divided-off offspring genome here
    --status                 Print the full CPU status dump after the run
    --trace <n>              Print a status dump every n steps
    -h, --help               Print this help message

EXAMPLES:
    # Run a genome for the default step budget
    {program} replicator.gen

    # Run and harvest the offspring
    {program} replicator.gen -s 500 -o child.gen

    # Watch the copy loop work
    {program} replicator.gen --trace 10
";

fn print_usage(program: &str) {
    info!("{}", USAGE.replace("{program}", program));
}
