// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use jsontok::{Limits, Tokenizer};

/// Prints the flat token array of a JSON document.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// JSON file to tokenize
    path: PathBuf,
    /// Fail once this many tokens have been produced
    #[arg(long)]
    max_tokens: Option<usize>,
    /// Maximum container nesting depth
    #[arg(long)]
    max_depth: Option<usize>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let data = match fs::read(&args.path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!(
                "Error: Unable to read file '{}': {}",
                args.path.display(),
                e
            );
            std::process::exit(1);
        }
    };

    let mut tokenizer = Tokenizer::with_limits(Limits {
        max_tokens: args.max_tokens,
        max_depth: args.max_depth,
    });
    let tokens = match tokenizer.tokenize(&data) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("Error: JSON tokenizing failed: {}", e);
            std::process::exit(1);
        }
    };

    for (index, token) in tokens.iter().enumerate() {
        println!(
            "{:5} {:<9} {:>6}..{:<6} size {:<4} {}",
            index,
            format!("{:?}", token.kind),
            token.start,
            token.end,
            token.size,
            String::from_utf8_lossy(&data[token.span()])
        );
    }
}
