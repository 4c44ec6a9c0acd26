// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncReadExt;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{AnalyzeArgs, Cli, Commands, DiffSource, Scope};
use crate::config::{Backend, Config};
use crate::domain::{DeletionAnalysisRequest, ParsedDiff};
use crate::error::{Error, Result};
use crate::services::{
    context_extractor::ContextExtractor, deleted::extract_deleted_content,
    deletion::DeletionAnalyzer, diff_parser::DiffParser, flattener::CodebaseFlattener,
    git::GitService, report::render_report,
};

pub struct App {
    cli: Cli,
    config: Config,
    cancel_token: CancellationToken,
}

impl App {
    pub fn new(cli: Cli) -> Result<Self> {
        let config = Config::load(&cli)?;
        debug!(
            backend = %config.backend,
            model = %config.model,
            context_lines = config.context_lines,
            codebase_chars = config.budget.codebase_chars,
            "config loaded"
        );
        let cancel_token = CancellationToken::new();
        Ok(Self {
            cli,
            config,
            cancel_token,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup Ctrl+C handler with CancellationToken
        let cancel = self.cancel_token.clone();
        tokio::spawn(async move {
            signal::ctrl_c().await.ok();
            cancel.cancel();
        });

        match &self.cli.command {
            Commands::Analyze(args) => self.analyze(args).await,
            Commands::Parse { source, json } => {
                let diff = self.load_diff(source).await?;
                if *json {
                    print_json(&diff)
                } else {
                    Self::print_parsed(&diff);
                    Ok(())
                }
            }
            Commands::Context {
                source,
                lines,
                json,
            } => {
                let diff = self.load_diff(source).await?;
                let extractor = ContextExtractor::new(lines.unwrap_or(self.config.context_lines));
                let contextual = extractor.extract(&diff);
                if *json {
                    print_json(&contextual)
                } else {
                    print!("{}", ContextExtractor::render(&contextual));
                    Ok(())
                }
            }
            Commands::Init => {
                let path = Config::create_default()?;
                println!("Created config: {}", path.display());
                Ok(())
            }
            Commands::Config => {
                self.print_config();
                Ok(())
            }
            Commands::Completions { shell } => {
                let mut cmd = <Cli as clap::CommandFactory>::command();
                clap_complete::generate(*shell, &mut cmd, "dangle", &mut std::io::stdout());
                Ok(())
            }
            #[cfg(feature = "secure-storage")]
            Commands::SetKey => self.set_api_key(),
            #[cfg(feature = "secure-storage")]
            Commands::GetKey => self.get_api_key(),
        }
    }

    async fn analyze(&self, args: &AnalyzeArgs) -> Result<()> {
        let diff = self.load_diff(&args.source).await?;
        if diff.is_empty() {
            self.print_info("Diff contains no file changes");
        }

        let deleted_content = extract_deleted_content(&diff);
        debug!(
            files = diff.total_files,
            removed = diff.total_removed,
            deleted_blocks = deleted_content.len(),
            "diff parsed"
        );

        let root = self.cli.root.as_path();
        let flattener = CodebaseFlattener::new(self.config.workspace.clone());
        let codebase = match args.scope {
            Scope::Workspace => flattener.flatten_workspace(root)?,
            Scope::Diff => flattener.flatten_diff(root, &diff)?,
        };

        let request = DeletionAnalysisRequest {
            codebase,
            deleted_content,
            context: args.context.clone().unwrap_or_default(),
        };

        let analyzer = DeletionAnalyzer::from_config(&self.config)?;

        if args.show_prompt {
            let context = analyzer.build_context(&request)?;
            eprintln!("{}", style("--- PROMPT ---").dim());
            eprintln!("{}", context.system_prompt);
            eprintln!();
            eprintln!("{}", context.user_message());
            eprintln!("{}", style("--- END PROMPT ---").dim());
        }

        if self.cancel_token.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let spinner = (self.config.backend == Backend::Anthropic
            && !args.json
            && std::io::stderr().is_terminal())
        .then(|| {
            Self::spinner(&format!(
                "Asking {} ({}) about {} deleted block(s)...",
                analyzer.backend_name(),
                self.config.model,
                request.deleted_content.len()
            ))
        });

        let outcome = analyzer
            .analyze_deletions(&request, self.cancel_token.clone())
            .await;

        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        let result = outcome?;

        if args.json {
            return print_json(&result);
        }

        print!("{}", render_report(&result));
        if result.has_errors() {
            self.print_warning("deleted code is still referenced and will likely break the build");
        }
        Ok(())
    }

    async fn load_diff(&self, source: &DiffSource) -> Result<ParsedDiff> {
        let raw = self.read_diff(source).await?;
        DiffParser::parse(&raw)
    }

    async fn read_diff(&self, source: &DiffSource) -> Result<String> {
        match &source.diff {
            Some(path) if path == Path::new("-") => {
                let mut raw = String::new();
                tokio::io::stdin().read_to_string(&mut raw).await?;
                Ok(raw)
            }
            Some(path) => Ok(tokio::fs::read_to_string(path).await?),
            None => {
                let base = source.base.as_deref().unwrap_or("HEAD");
                self.print_status(&format!("Diffing working tree against {base}..."));
                let git = GitService::discover(&self.cli.root).await?;
                git.diff(base, self.config.context_lines).await
            }
        }
    }

    fn spinner(message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        spinner
    }

    fn print_parsed(diff: &ParsedDiff) {
        for file in &diff.files {
            let name = match &file.old_filename {
                Some(old) => format!("{old} → {}", file.filename),
                None => file.filename.clone(),
            };
            println!(
                "{} ({}, {}) {} {}, {} hunk(s)",
                style(name).bold(),
                file.status.as_str(),
                file.language,
                style(format!("+{}", file.additions)).green(),
                style(format!("-{}", file.deletions)).red(),
                file.hunks.len()
            );
        }
        println!(
            "{} file(s), {} {}",
            diff.total_files,
            style(format!("+{}", diff.total_added)).green(),
            style(format!("-{}", diff.total_removed)).red()
        );
    }

    fn print_config(&self) {
        println!("Backend: {}", self.config.backend);
        println!("Model: {}", self.config.model);
        println!(
            "API key: {}",
            if self.config.api_key.is_some() {
                "configured"
            } else {
                "not set"
            }
        );
        if let Some(ref url) = self.config.anthropic_base_url {
            println!("Anthropic base URL: {url}");
        }
        println!("Timeout: {}s", self.config.timeout_secs);
        println!("Temperature: {}", self.config.temperature);
        println!("Max tokens: {}", self.config.max_tokens);
        println!("Max retries: {}", self.config.max_retries);
        println!("Context lines: {}", self.config.context_lines);
        println!();
        println!("[budget]");
        println!("  codebase_chars: {}", self.config.budget.codebase_chars);
        println!("  deletion_chars: {}", self.config.budget.deletion_chars);
        println!();
        println!("[workspace]");
        println!("  max_file_size: {}", self.config.workspace.max_file_size);
        println!(
            "  excluded_dirs: {}",
            self.config.workspace.excluded_dirs.join(", ")
        );
        println!(
            "  allowed_extensions: {}",
            self.config.workspace.allowed_extensions.join(", ")
        );
        println!();
        match Config::config_path() {
            Some(path) if path.exists() => println!("Config file: {}", path.display()),
            Some(path) => println!("Config file: {} (not created)", path.display()),
            None => println!("Config file: unavailable"),
        }
    }

    // ─── Keyring Commands ───

    #[cfg(feature = "secure-storage")]
    fn set_api_key(&self) -> Result<()> {
        eprintln!(
            "Enter API key for {} (input will be hidden):",
            style("anthropic").bold()
        );

        let key = dialoguer::Password::new()
            .with_prompt("API key")
            .interact()?;

        if key.trim().is_empty() {
            return Err(Error::Config("API key cannot be empty".into()));
        }

        let entry = keyring::Entry::new("dangle", "anthropic")
            .map_err(|e| Error::Keyring(e.to_string()))?;
        entry
            .set_password(key.trim())
            .map_err(|e| Error::Keyring(e.to_string()))?;

        eprintln!("{} API key stored for anthropic", style("✓").green().bold());
        Ok(())
    }

    #[cfg(feature = "secure-storage")]
    fn get_api_key(&self) -> Result<()> {
        let entry = keyring::Entry::new("dangle", "anthropic")
            .map_err(|e| Error::Keyring(e.to_string()))?;

        match entry.get_password() {
            Ok(_) => {
                eprintln!(
                    "{} API key for anthropic is stored in keychain",
                    style("✓").green().bold()
                );
            }
            Err(keyring::Error::NoEntry) => {
                eprintln!(
                    "{} No API key found for anthropic in keychain",
                    style("✗").red().bold()
                );
                eprintln!("  Store one with: {}", style("dangle set-key").yellow());
            }
            Err(e) => return Err(Error::Keyring(e.to_string())),
        }

        Ok(())
    }

    // ─── Output Helpers ───

    fn print_status(&self, msg: &str) {
        eprintln!("{} {}", style("→").cyan(), msg);
    }

    fn print_info(&self, msg: &str) {
        eprintln!("{} {}", style("info:").cyan(), msg);
    }

    fn print_warning(&self, msg: &str) {
        eprintln!("{} {}", style("warning:").yellow().bold(), msg);
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
    println!("{json}");
    Ok(())
}
