// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Command-line driver for the accel-rt inference runtime.

mod commands;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "accel-rt", version, about = "Compiled-model inference runtime")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Initialize an engine and run timed inference batches.
    Run {
        /// Path to the network description (JSON).
        model: PathBuf,
        /// Number of batches to run.
        #[arg(long, default_value_t = 8)]
        batches: usize,
        /// Optional runtime config (TOML); defaults apply otherwise.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Show the compiled plan and its binding table.
    Inspect {
        /// Path to the network description (JSON).
        model: PathBuf,
    },
    /// Show or clear the on-disk plan cache for a model.
    Cache {
        /// Path to the network description (JSON).
        model: PathBuf,
        /// Remove the cached plan artifact.
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    commands::init_tracing(cli.verbose);

    match cli.command {
        Command::Run {
            model,
            batches,
            config,
        } => commands::run::execute(&model, batches, config.as_deref()),
        Command::Inspect { model } => commands::inspect::execute(&model),
        Command::Cache { model, clear } => commands::cache::execute(&model, clear),
    }
}
