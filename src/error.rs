// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("failed to parse diff at line {line}: {message}")]
    #[diagnostic(
        code(dangle::diff::parse),
        help("Input must be a git unified diff (git diff, git format-patch)")
    )]
    DiffParse { line: usize, message: String },

    #[error("failed to flatten workspace {path}: {message}")]
    #[diagnostic(
        code(dangle::workspace::walk),
        help("Check that the workspace root exists and is readable")
    )]
    Workspace { path: String, message: String },

    #[error("failed to build analysis context: {0}")]
    #[diagnostic(code(dangle::context::build))]
    Context(String),

    #[error("analysis backend '{backend}' failed: {source}")]
    #[diagnostic(code(dangle::backend::failed))]
    Backend {
        backend: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Provider '{provider}' error: {message}")]
    #[diagnostic(code(dangle::provider::error))]
    Provider { provider: String, message: String },

    #[error("Invalid analysis response: {0}")]
    #[diagnostic(
        code(dangle::response::invalid),
        help("The model did not return the expected JSON object; retry or use --backend heuristic")
    )]
    InvalidResponse(String),

    #[error("Operation cancelled by user")]
    Cancelled,

    #[error("Configuration error: {0}")]
    #[diagnostic(code(dangle::config::error))]
    Config(String),

    #[error("Git error: {0}")]
    #[diagnostic(code(dangle::git::error))]
    Git(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("Dialog error: {0}")]
    Dialog(String),

    #[cfg(feature = "secure-storage")]
    #[error("Keyring error: {0}")]
    #[diagnostic(
        code(dangle::keyring::error),
        help("Check your system keychain configuration")
    )]
    Keyring(String),
}

impl Error {
    /// Wrap a backend failure with the backend's name.
    pub fn backend(backend: impl Into<String>, source: Error) -> Self {
        Error::Backend {
            backend: backend.into(),
            source: Box::new(source),
        }
    }

    /// Unwrap backend wrapping to the underlying cause.
    pub fn root(&self) -> &Error {
        match self {
            Error::Backend { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(e: dialoguer::Error) -> Self {
        Error::Dialog(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
