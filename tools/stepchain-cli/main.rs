mod demos;

use clap::{Parser, Subcommand};
use stepchain::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Build, compile and inspect transformation chains
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the bundled demo chains
    List,
    /// Compile a demo chain to its wire JSON
    Compile {
        /// Name of the demo, see `list`
        demo: String,
        /// Write the JSON to this file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        /// Override the chain id (defaults to the local development id)
        #[arg(long)]
        chain_id: Option<String>,
    },
    /// Print a compiled chain file as a tree
    Inspect {
        /// Path to a compiled chain JSON file
        path: PathBuf,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::List => run_list(),
        Command::Compile {
            demo,
            out,
            chain_id,
        } => run_compile(&demo, out, chain_id),
        Command::Inspect { path } => run_inspect(&path),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` directives, defaulting to `info`.
fn log_filter(directives: Option<String>) -> EnvFilter {
    EnvFilter::new(directives.unwrap_or_else(|| "info".into()))
}

fn run_list() {
    let width = demos::DEMOS
        .iter()
        .map(|demo| demo.name.len())
        .max()
        .unwrap_or(0);
    for demo in demos::DEMOS {
        println!("{:<width$}  {}", demo.name, demo.summary, width = width);
    }
}

fn run_compile(name: &str, out: Option<PathBuf>, chain_id: Option<String>) {
    let demo = demos::find(name).unwrap_or_else(|| {
        exit_with_error(&format!(
            "Unknown demo '{}'. Run `stepchain-cli list` to see the available demos.",
            name
        ))
    });

    let start = Instant::now();
    let mut chain = (demo.build)()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to define '{}': {}", name, e)));
    if let Some(id) = chain_id {
        chain.set_chain_id(&id);
    }
    let compiled = chain
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to compile '{}': {}", name, e)));
    let json = compiled
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize '{}': {}", name, e)));
    info!(
        demo = name,
        steps = compiled.steps().len(),
        duration = ?start.elapsed(),
        "compiled chain"
    );

    match out {
        Some(path) => {
            fs::write(&path, json).unwrap_or_else(|e| {
                exit_with_error(&format!("Failed to write '{}': {}", path.display(), e))
            });
            info!(path = %path.display(), "wrote compiled chain");
        }
        None => println!("{}", json),
    }
}

fn run_inspect(path: &Path) {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read '{}': {}", path.display(), e))
    });
    let compiled = CompiledChain::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse compiled chain: {}", e)));

    println!("{}", DisplayChain::new(&compiled));
    println!();
    println!("--- Dependencies ---");
    for step in compiled.steps() {
        let deps = step.dependencies();
        if deps.is_empty() {
            println!("{}: (none)", step.name);
        } else {
            println!("{}: {}", step.name, deps.join(", "));
        }
    }
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
