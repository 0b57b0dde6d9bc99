//! CPU benchmark binary.
//!
//! Measures instruction throughput over representative genomes.
//! Run with: `cargo run --release --bin bench`

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use replivm::virtual_machine::cpu::Cpu;
use replivm::virtual_machine::genome::Genome;
use replivm::virtual_machine::inst_set::InstSet;

/// The canonical self-copying genome: allocate, then a copy loop that
/// compares the read head position against the old genome end and divides
/// once the whole program has been copied.
const REPLICATOR: &str = "FHcbvbCzbaHbquwbG";

/// Add/Sub churn inside a scope restarted forever by Continue.
const ARITH_LOOP: &str = "vaggjgkw";

/// Nothing but modifiers; measures raw fetch overhead.
const NOP_SLED: &str = "abcdefabcdefabcdefabcdef";

// ---------------------------------------------------------------------------
// Benchmark harness
// ---------------------------------------------------------------------------

struct BenchResult {
    name: &'static str,
    iterations: u64,
    total: Duration,
    steps_per_iter: u64,
}

impl BenchResult {
    fn avg(&self) -> Duration {
        self.total / self.iterations as u32
    }

    fn print(&self) {
        let avg = self.avg();
        let ns_per_iter = avg.as_nanos();
        let ns_per_step = ns_per_iter as f64 / self.steps_per_iter as f64;
        println!(
            "  {:<24} {:>7} iters {:>10.3} us/iter {:>8.1} ns/step",
            self.name,
            self.iterations,
            ns_per_iter as f64 / 1000.0,
            ns_per_step,
        );
    }
}

/// Runs `f` for at least `min_duration`, returning aggregated results.
fn bench<F>(name: &'static str, min_duration: Duration, steps_per_iter: u64, mut f: F) -> BenchResult
where
    F: FnMut(),
{
    // Warmup
    for _ in 0..5 {
        f();
    }

    let mut iterations = 0u64;
    let start = Instant::now();
    while start.elapsed() < min_duration {
        f();
        iterations += 1;
    }
    let total = start.elapsed();

    BenchResult {
        name,
        iterations,
        total,
        steps_per_iter,
    }
}

fn run_genome(set: &InstSet, genome: &Genome, steps: usize) {
    let mut cpu = Cpu::new(set, genome.clone()).expect("cpu construction failed");
    cpu.run(steps);
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() {
    let min = Duration::from_secs(2);
    const STEPS: usize = 10_000;

    let set = InstSet::default_set();
    let replicator = set.genome_from_text(REPLICATOR).expect("bad genome");
    let arith = set.genome_from_text(ARITH_LOOP).expect("bad genome");
    let nops = set.genome_from_text(NOP_SLED).expect("bad genome");
    let mut rng = StdRng::seed_from_u64(42);
    let random = set.random_genome(&mut rng, 256);

    println!("CPU Benchmarks (each runs for >= 2s, {STEPS} steps per iter)\n");
    println!(
        "  {:<24} {:>7}       {:>14} {:>12}",
        "benchmark", "iters", "avg time", "throughput"
    );
    println!("  {}", "-".repeat(64));

    let r = bench("nop_sled", min, STEPS as u64, || {
        run_genome(&set, &nops, STEPS)
    });
    r.print();

    let r = bench("arith_loop", min, STEPS as u64, || {
        run_genome(&set, &arith, STEPS)
    });
    r.print();

    let r = bench("random(256)", min, STEPS as u64, || {
        run_genome(&set, &random, STEPS)
    });
    r.print();

    // One full replication cycle per iteration instead of a step budget.
    let repl_steps = {
        let mut cpu = Cpu::new(&set, replicator.clone()).expect("cpu construction failed");
        let mut steps = 0u64;
        while !cpu.has_offspring() {
            cpu.step();
            steps += 1;
        }
        steps
    };
    let r = bench("full_replication", min, repl_steps, || {
        let mut cpu = Cpu::new(&set, replicator.clone()).expect("cpu construction failed");
        while !cpu.has_offspring() {
            cpu.step();
        }
    });
    r.print();

    println!();
}
