// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "dangle")]
#[command(version)]
#[command(
    about = "Find references left dangling by code a diff deletes",
    long_about = None
)]
pub struct Cli {
    /// Workspace root the diff applies to
    #[arg(short, long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Analysis backend (heuristic, anthropic)
    #[arg(short, long, global = true, env = "DANGLE_BACKEND")]
    pub backend: Option<String>,

    /// Model name for LLM backends
    #[arg(short, long, global = true, env = "DANGLE_MODEL")]
    pub model: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the unified diff comes from.
#[derive(Args, Debug, Clone, Default)]
pub struct DiffSource {
    /// Read the diff from a file ("-" for stdin)
    #[arg(short, long, value_name = "FILE", conflicts_with = "base")]
    pub diff: Option<PathBuf>,

    /// Diff the working tree against this revision (default HEAD)
    #[arg(long, value_name = "REV")]
    pub base: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// Every source file under the root
    #[default]
    Workspace,
    /// Only the files the diff touches
    Diff,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: DiffSource,

    /// Free-text description of the change (PR title, body)
    #[arg(short, long)]
    pub context: Option<String>,

    /// Which files are scanned for references
    #[arg(long, value_enum, default_value_t = Scope::Workspace)]
    pub scope: Scope,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the prompt built for the backend
    #[arg(long)]
    pub show_prompt: bool,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Analyze a diff for orphaned references
    Analyze(AnalyzeArgs),
    /// Parse a diff and print its structure
    Parse {
        #[command(flatten)]
        source: DiffSource,

        /// Print the parsed diff as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the changed regions of a diff with surrounding context
    Context {
        #[command(flatten)]
        source: DiffSource,

        /// Unchanged lines kept around each change (overrides config)
        #[arg(short = 'U', long)]
        lines: Option<usize>,

        /// Print the contextual diff as JSON
        #[arg(long)]
        json: bool,
    },
    /// Initialize config file
    Init,
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Store the Anthropic API key in the system keychain
    #[cfg(feature = "secure-storage")]
    SetKey,
    /// Check whether an Anthropic API key is stored in the keychain
    #[cfg(feature = "secure-storage")]
    GetKey,
}
