// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use directories::ProjectDirs;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::error::{Error, Result};

/// Directory names that are never descended into when flattening a workspace.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    ".git",
    "dist",
    "build",
    "target",
    ".next",
    ".nuxt",
    "coverage",
    ".nyc_output",
    "tmp",
    "temp",
    "logs",
    ".cache",
    "__pycache__",
    ".pytest_cache",
    ".venv",
    "venv",
    "env",
];

/// File extensions read when flattening a workspace.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "go", "js", "ts", "jsx", "tsx", "py", "java", "c", "cpp", "h", "hpp", "cs", "rb", "php",
    "swift", "kt", "rs", "scala", "sh", "yaml", "yml", "json", "toml", "md", "sql", "html",
    "css",
];

/// Workspace traversal limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory base names pruned from the walk
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// File extensions (without dot) that are read
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    /// Files larger than this many bytes are skipped (default 1 MiB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
            allowed_extensions: default_allowed_extensions(),
            max_file_size: default_max_file_size(),
        }
    }
}

fn default_excluded_dirs() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}
fn default_allowed_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}
fn default_max_file_size() -> u64 {
    1024 * 1024
}

/// Prompt size budgets, in characters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ContextBudget {
    /// Budget for the flattened codebase section (default 50000)
    #[serde(default = "default_codebase_chars")]
    pub codebase_chars: usize,

    /// Budget for the deleted code section (default 10000)
    #[serde(default = "default_deletion_chars")]
    pub deletion_chars: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            codebase_chars: default_codebase_chars(),
            deletion_chars: default_deletion_chars(),
        }
    }
}

fn default_codebase_chars() -> usize {
    50_000
}
fn default_deletion_chars() -> usize {
    10_000
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Heuristic,
    Anthropic,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Heuristic => write!(f, "heuristic"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "heuristic" => Ok(Self::Heuristic),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => Err(Error::Config(format!(
                "unknown backend '{other}', expected heuristic or anthropic"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL for the Anthropic API (default: https://api.anthropic.com/v1)
    #[serde(default)]
    pub anthropic_base_url: Option<String>,

    /// Request timeout in seconds (default 120)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tokens to generate (default 4096)
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// LLM temperature (0.0-1.0, default 0.1)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retries for transient HTTP failures (default 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Unchanged lines kept around each change block (default 3)
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    #[serde(default)]
    pub budget: ContextBudget,

    #[serde(default)]
    pub workspace: WorkspaceConfig,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_temperature() -> f32 {
    0.1
}
fn default_max_retries() -> u32 {
    3
}
fn default_context_lines() -> usize {
    3
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            model: default_model(),
            api_key: None,
            anthropic_base_url: None,
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
            context_lines: default_context_lines(),
            budget: ContextBudget::default(),
            workspace: WorkspaceConfig::default(),
        }
    }
}

impl Config {
    /// Load with priority: CLI > ENV > user config > project config > defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Project-level config (.dangle.toml in the workspace root)
        let project_config = cli.root.join(".dangle.toml");
        if project_config.exists() {
            figment = figment.merge(Toml::file(&project_config));
        }

        // User-level config
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            figment = figment.merge(Toml::file(&path));
        }

        // Environment variables (DANGLE_MODEL, DANGLE_BACKEND, etc.)
        // Use __ separator for nested keys (e.g., DANGLE_BUDGET__CODEBASE_CHARS)
        figment = figment.merge(Env::prefixed("DANGLE_").split("__"));

        let mut config: Config = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        if config.api_key.is_none() && config.backend == Backend::Anthropic {
            config.api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }

        // Keyring fallback (if still no key and secure-storage feature is enabled)
        #[cfg(feature = "secure-storage")]
        if config.api_key.is_none()
            && config.backend == Backend::Anthropic
            && let Ok(entry) = keyring::Entry::new("dangle", "anthropic")
            && let Ok(key) = entry.get_password()
        {
            config.api_key = Some(key);
        }

        config.apply_cli(cli)?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dangle").map(|dirs| dirs.config_dir().to_path_buf())
    }

    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    fn apply_cli(&mut self, cli: &Cli) -> Result<()> {
        if let Some(ref b) = cli.backend {
            self.backend = b.parse()?;
            if self.backend == Backend::Anthropic && self.api_key.is_none() {
                self.api_key = std::env::var("ANTHROPIC_API_KEY").ok();
            }
        }
        if let Some(ref m) = cli.model {
            self.model = m.clone();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.context_lines > 100 {
            return Err(Error::Config(format!(
                "context_lines must be 0–100, got {}",
                self.context_lines
            )));
        }

        if !(1_000..=1_000_000).contains(&self.budget.codebase_chars) {
            return Err(Error::Config(format!(
                "budget.codebase_chars must be 1000–1000000, got {}",
                self.budget.codebase_chars
            )));
        }

        if !(500..=200_000).contains(&self.budget.deletion_chars) {
            return Err(Error::Config(format!(
                "budget.deletion_chars must be 500–200000, got {}",
                self.budget.deletion_chars
            )));
        }

        if self.workspace.max_file_size == 0 {
            return Err(Error::Config("workspace.max_file_size cannot be 0".into()));
        }

        if !(1..=3600).contains(&self.timeout_secs) {
            return Err(Error::Config(format!(
                "timeout_secs must be 1–3600, got {}",
                self.timeout_secs
            )));
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(Error::Config(format!(
                "temperature must be 0.0–1.0, got {}",
                self.temperature
            )));
        }

        if self.max_retries > 10 {
            return Err(Error::Config(format!(
                "max_retries must be 0–10, got {}",
                self.max_retries
            )));
        }

        if let Some(ref url) = self.anthropic_base_url
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            return Err(Error::Config(format!(
                "anthropic_base_url must start with http:// or https://, got '{url}'"
            )));
        }

        Ok(())
    }

    /// Create default config file with secure permissions
    pub fn create_default() -> Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            return Err(Error::Config("Cannot determine config directory".into()));
        };
        Self::write_default(&dir)
    }

    pub fn write_default(dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let path = dir.join("config.toml");
        let content = r#"# dangle configuration

# Analysis backend: heuristic (offline, textual matching) or anthropic
backend = "heuristic"

# Model used by the anthropic backend
model = "claude-sonnet-4-20250514"

# Unchanged lines kept around each change block
context_lines = 3

# Retries for transient API failures
# max_retries = 3

[budget]
# Characters of codebase included in the prompt
codebase_chars = 50000

# Characters of deleted code included in the prompt
deletion_chars = 10000

[workspace]
# Files larger than this (bytes) are skipped
max_file_size = 1048576

# Directory names never descended into
# excluded_dirs = ["node_modules", "vendor", ".git", "dist", "build", "target"]
"#;

        fs::write(&path, content)?;

        // Set secure permissions (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(path)
    }
}
