// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use super::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    Go,
    Node,
    Python,
    Rust,
}

impl ProjectType {
    /// First-match marker file lookup.
    pub fn from_marker(file_name: &str) -> Option<Self> {
        match file_name {
            "go.mod" | "main.go" => Some(Self::Go),
            "package.json" | "tsconfig.json" | "webpack.config.js" => Some(Self::Node),
            "requirements.txt" | "setup.py" | "pyproject.toml" => Some(Self::Python),
            "Cargo.toml" => Some(Self::Rust),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Go => "go",
            Self::Node => "node",
            Self::Python => "python",
            Self::Rust => "rust",
        }
    }
}

impl std::fmt::Display for ProjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectInfo {
    pub name: String,
    pub project_type: Option<ProjectType>,
    pub main_files: Vec<String>,
    pub config_files: Vec<String>,
    /// Top-level directory → purpose.
    pub structure: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileContent {
    pub path: PathBuf,
    /// Forward-slash separated path relative to the workspace root.
    pub relative_path: String,
    pub language: Language,
    pub content: String,
    pub line_count: usize,
    pub size: u64,
}

impl FileContent {
    pub fn new(path: PathBuf, relative_path: String, content: String) -> Self {
        let language = Language::from_path(&relative_path);
        let line_count = content.bytes().filter(|b| *b == b'\n').count() + 1;
        let size = content.len() as u64;
        Self {
            path,
            relative_path,
            language,
            content,
            line_count,
            size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlattenedCodebase {
    pub files: Vec<FileContent>,
    pub summary: String,
    pub total_files: usize,
    pub total_lines: usize,
    pub languages: BTreeSet<Language>,
    pub project_info: ProjectInfo,
}

impl FlattenedCodebase {
    pub fn from_files(files: Vec<FileContent>, project_info: ProjectInfo) -> Self {
        let total_files = files.len();
        let total_lines = files.iter().map(|f| f.line_count).sum();
        let languages: BTreeSet<Language> = files.iter().map(|f| f.language).collect();

        let summary = format!(
            "Project: {} ({}) | {} files, {} lines | Languages: {}",
            if project_info.name.is_empty() {
                "unnamed"
            } else {
                project_info.name.as_str()
            },
            project_info
                .project_type
                .map(|t| t.as_str())
                .unwrap_or("unknown"),
            total_files,
            total_lines,
            languages
                .iter()
                .map(|l| l.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self {
            files,
            summary,
            total_files,
            total_lines,
            languages,
            project_info,
        }
    }

    pub fn file(&self, relative_path: &str) -> Option<&FileContent> {
        self.files.iter().find(|f| f.relative_path == relative_path)
    }
}
