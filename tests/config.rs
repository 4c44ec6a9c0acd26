// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use clap::Parser;
use dangle::cli::Cli;
use dangle::config::{Backend, Config, DEFAULT_EXCLUDED_DIRS};
use dangle::error::Error;
use tempfile::TempDir;

// ─── Default values ──────────────────────────────────────────────────────────

#[test]
fn default_config_values() {
    let config = Config::default();
    assert_eq!(config.backend, Backend::Heuristic);
    assert_eq!(config.model, "claude-sonnet-4-20250514");
    assert!(config.api_key.is_none());
    assert!(config.anthropic_base_url.is_none());
    assert_eq!(config.timeout_secs, 120);
    assert_eq!(config.max_tokens, 4096);
    assert!((config.temperature - 0.1).abs() < f32::EPSILON);
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.context_lines, 3);
    assert_eq!(config.budget.codebase_chars, 50_000);
    assert_eq!(config.budget.deletion_chars, 10_000);
    assert_eq!(config.workspace.max_file_size, 1024 * 1024);
    assert!(config.workspace.excluded_dirs.iter().any(|d| d == "node_modules"));
    assert!(config.workspace.allowed_extensions.iter().any(|e| e == "go"));
    assert!(config.validate().is_ok());
}

// ─── TOML deserialization ────────────────────────────────────────────────────

#[test]
fn load_from_valid_toml() {
    let toml_str = r#"
backend = "anthropic"
model = "claude-opus"
context_lines = 5

[budget]
codebase_chars = 20000

[workspace]
excluded_dirs = ["generated"]
max_file_size = 4096
"#;
    let config: Config = toml::from_str(toml_str).unwrap();
    assert_eq!(config.backend, Backend::Anthropic);
    assert_eq!(config.model, "claude-opus");
    assert_eq!(config.context_lines, 5);
    assert_eq!(config.budget.codebase_chars, 20_000);
    // Unset nested fields keep their defaults
    assert_eq!(config.budget.deletion_chars, 10_000);
    assert_eq!(config.workspace.excluded_dirs, ["generated"]);
    assert_eq!(config.workspace.max_file_size, 4096);
    assert!(config.workspace.allowed_extensions.iter().any(|e| e == "rs"));
}

#[test]
fn empty_toml_uses_defaults() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config.backend, Backend::Heuristic);
    assert_eq!(
        config.workspace.excluded_dirs.len(),
        DEFAULT_EXCLUDED_DIRS.len()
    );
}

#[test]
fn unknown_backend_in_toml_fails() {
    assert!(toml::from_str::<Config>(r#"backend = "ollama""#).is_err());
}

// ─── Backend parsing ─────────────────────────────────────────────────────────

#[test]
fn backend_from_str() {
    assert_eq!("heuristic".parse::<Backend>().unwrap(), Backend::Heuristic);
    assert_eq!("Anthropic".parse::<Backend>().unwrap(), Backend::Anthropic);
    assert_eq!("claude".parse::<Backend>().unwrap(), Backend::Anthropic);
    assert!(matches!("gpt".parse::<Backend>(), Err(Error::Config(_))));
    assert_eq!(Backend::Anthropic.to_string(), "anthropic");
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn rejects(config: Config, needle: &str) {
    match config.validate() {
        Err(Error::Config(message)) => {
            assert!(message.contains(needle), "{message} should mention {needle}")
        }
        other => panic!("expected Config error mentioning {needle}, got {other:?}"),
    }
}

#[test]
fn validate_rejects_out_of_range_values() {
    rejects(
        Config {
            context_lines: 101,
            ..Config::default()
        },
        "context_lines",
    );

    let mut config = Config::default();
    config.budget.codebase_chars = 999;
    rejects(config, "codebase_chars");

    let mut config = Config::default();
    config.budget.deletion_chars = 200_001;
    rejects(config, "deletion_chars");

    let mut config = Config::default();
    config.workspace.max_file_size = 0;
    rejects(config, "max_file_size");

    rejects(
        Config {
            timeout_secs: 0,
            ..Config::default()
        },
        "timeout_secs",
    );
    rejects(
        Config {
            temperature: 1.5,
            ..Config::default()
        },
        "temperature",
    );
    rejects(
        Config {
            max_retries: 11,
            ..Config::default()
        },
        "max_retries",
    );
    rejects(
        Config {
            anthropic_base_url: Some("ftp://example.com".into()),
            ..Config::default()
        },
        "anthropic_base_url",
    );
}

#[test]
fn anthropic_without_key_still_validates() {
    // The missing key surfaces when the client is built
    let config = Config {
        backend: Backend::Anthropic,
        api_key: None,
        ..Config::default()
    };
    assert!(config.validate().is_ok());
}

// ─── Layered loading ─────────────────────────────────────────────────────────

fn cli(root: &std::path::Path, extra: &[&str]) -> Cli {
    let mut args = vec!["dangle", "--root", root.to_str().unwrap()];
    args.extend_from_slice(extra);
    args.push("config");
    Cli::parse_from(args)
}

#[test]
fn project_file_is_layered_under_cli_flags() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".dangle.toml"),
        "model = \"from-project\"\ncontext_lines = 7\n\n[budget]\ndeletion_chars = 2000\n",
    )
    .unwrap();

    let config = Config::load(&cli(dir.path(), &[])).unwrap();
    assert_eq!(config.model, "from-project");
    assert_eq!(config.context_lines, 7);
    assert_eq!(config.budget.deletion_chars, 2000);

    let config = Config::load(&cli(dir.path(), &["--model", "from-cli"])).unwrap();
    assert_eq!(config.model, "from-cli");
    assert_eq!(config.context_lines, 7);
}

#[test]
fn invalid_project_file_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".dangle.toml"), "context_lines = 500\n").unwrap();

    let err = Config::load(&cli(dir.path(), &[])).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn cli_backend_flag_is_parsed() {
    let dir = TempDir::new().unwrap();
    let err = Config::load(&cli(dir.path(), &["--backend", "nope"])).unwrap_err();
    assert!(err.to_string().contains("unknown backend"));
}

// ─── Default file ────────────────────────────────────────────────────────────

#[test]
fn write_default_creates_parseable_file() {
    let dir = TempDir::new().unwrap();
    let path = Config::write_default(&dir.path().join("dangle")).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    let config: Config = toml::from_str(&content).unwrap();
    assert_eq!(config.backend, Backend::Heuristic);
    assert_eq!(config.budget.codebase_chars, 50_000);
    assert!(config.validate().is_ok());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
