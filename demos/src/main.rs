// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::info;
use pixi_atlas::{Atlas, Limits, LoadError};

/// Loads TexturePacker / pixi.js JSON atlases and prints their frames.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Atlas files to dump, in order
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Fail once a document produces this many JSON tokens
    #[arg(long)]
    max_tokens: Option<usize>,
    /// Maximum container nesting depth
    #[arg(long)]
    max_depth: Option<usize>,
}

fn load(path: &Path, limits: Limits) -> Result<Atlas, LoadError> {
    let data = std::fs::read(path)?;
    Ok(Atlas::parse_with_limits(&data, limits)?)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let limits = Limits {
        max_tokens: args.max_tokens,
        max_depth: args.max_depth,
    };

    let mut failed = 0;
    for path in &args.files {
        info!("loading {}", path.display());
        match load(path, limits) {
            Ok(atlas) => atlas.dump(),
            Err(e) => {
                eprintln!("Error: unable to load atlas '{}': {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
