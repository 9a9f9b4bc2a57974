//! MANTRA Vanity Address Generator CLI
//!
//! Usage:
//!   mantra_vanity -p xyz              # Find address containing "xyz"
//!   mantra_vanity -p xyz -t prefix    # Find address starting "mantra1xyz..."
//!   mantra_vanity -p xyz -t suffix    # Find address ending with "xyz"

use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;

use mantra_vanity::worker::{FallbackSearch, SearchStrategy, StepOutcome};
use mantra_vanity::{Config, Keypair, Result, SearchState};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .init();

    let config = Config::parse();

    let pattern = match config.to_pattern() {
        Ok(pattern) => pattern,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    println!("MANTRA Vanity Address Generator");
    println!("===============================");
    println!("Pattern:    {} ({})", pattern.pattern(), pattern.position());
    println!("Difficulty: {}", pattern.difficulty_description());
    println!("Workers:    {}", config.worker_count());
    println!();

    let stop_flag = Arc::new(AtomicBool::new(false));
    ctrlc_handler(stop_flag.clone());

    println!("Searching... (Press Ctrl+C to stop)\n");

    match run(&config, &pattern, stop_flag.clone()) {
        Ok(Some(keypair)) => print_result(&keypair),
        Ok(None) => {
            if stop_flag.load(Ordering::Relaxed) {
                println!("\nStopped by user.");
            } else {
                println!("\nNo match within {} attempts.", config.max_attempts);
            }
        }
        Err(e) => {
            eprintln!("Search failed: {}", e);
            process::exit(1);
        }
    }
}

fn run(
    config: &Config,
    pattern: &mantra_vanity::Pattern,
    stop_flag: Arc<AtomicBool>,
) -> Result<Option<Keypair>> {
    let mut strategy =
        FallbackSearch::new(config.workers, config.effective_batch_size(), stop_flag.clone());
    println!("Execution:  {}", strategy.name());

    let report_interval = Duration::from_secs(config.report_interval);
    let start = Instant::now();
    let mut last_report = Instant::now();

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            return Ok(None);
        }
        if config.max_attempts > 0 && strategy.total_attempts() >= config.max_attempts {
            return Ok(None);
        }

        match strategy.step(pattern)? {
            StepOutcome::Found(keypair) => return Ok(Some(keypair)),
            StepOutcome::Continue => {
                if strategy.state() == SearchState::Stopped {
                    return Ok(None);
                }
            }
        }

        if last_report.elapsed() >= report_interval {
            last_report = Instant::now();
            print_progress(&strategy, start);
        }
    }
}

fn print_result(keypair: &Keypair) {
    println!("=== Match found ===");
    println!("Address:  {}", keypair.address());
    println!("Mnemonic: {}", keypair.mnemonic());
}

fn print_progress(strategy: &dyn SearchStrategy, start: Instant) {
    let attempts = strategy.total_attempts();
    let elapsed = start.elapsed().as_secs();
    let rate = if elapsed > 0 {
        attempts / elapsed
    } else {
        attempts
    };
    println!(
        "[{:>4}s] Tested {} candidates ({}/s)",
        elapsed,
        format_number(attempts),
        format_number(rate)
    );
}

fn format_number(n: u64) -> String {
    if n >= 1_000_000_000 {
        format!("{:.2}B", n as f64 / 1_000_000_000.0)
    } else if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.2}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

fn ctrlc_handler(stop_flag: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        stop_flag.store(true, Ordering::Relaxed);
    })
    .expect("Error setting Ctrl-C handler");
}
