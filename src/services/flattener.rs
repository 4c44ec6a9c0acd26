// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::Path;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::config::WorkspaceConfig;
use crate::domain::{FileContent, FlattenedCodebase, ParsedDiff, ProjectInfo, ProjectType};
use crate::error::{Error, Result};

const MAIN_FILES: &[&str] = &[
    "main.go", "main.rs", "lib.rs", "index.js", "index.ts", "app.js", "server.js", "main.py",
    "app.py", "manage.py",
];

const CONFIG_FILES: &[&str] = &[
    "go.mod",
    "go.sum",
    "package.json",
    "tsconfig.json",
    "webpack.config.js",
    "requirements.txt",
    "setup.py",
    "pyproject.toml",
    "Cargo.toml",
    "Makefile",
    "Dockerfile",
    "docker-compose.yml",
    ".env.example",
];

fn directory_purpose(name: &str) -> Option<&'static str> {
    match name {
        "src" | "lib" => Some("source code"),
        "test" | "tests" | "__tests__" => Some("tests"),
        "docs" => Some("documentation"),
        "examples" => Some("examples"),
        "cmd" => Some("command line tools"),
        "pkg" => Some("packages/libraries"),
        "internal" => Some("internal packages"),
        _ => None,
    }
}

/// Accumulates project metadata from the file names seen during a walk.
struct ProjectDetector {
    info: ProjectInfo,
}

impl ProjectDetector {
    fn new(root: &Path) -> Self {
        let name = root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "project".to_string());

        Self {
            info: ProjectInfo {
                name,
                ..ProjectInfo::default()
            },
        }
    }

    fn observe_file(&mut self, relative_path: &str) {
        let name = relative_path.rsplit('/').next().unwrap_or(relative_path);

        // First marker wins
        if self.info.project_type.is_none() {
            self.info.project_type = ProjectType::from_marker(name);
        }
        if MAIN_FILES.contains(&name) {
            self.info.main_files.push(relative_path.to_string());
        }
        if CONFIG_FILES.contains(&name) {
            self.info.config_files.push(relative_path.to_string());
        }
    }

    fn observe_top_level_dir(&mut self, name: &str) {
        if let Some(purpose) = directory_purpose(name) {
            self.info
                .structure
                .insert(name.to_string(), purpose.to_string());
        }
    }

    fn finish(self) -> ProjectInfo {
        self.info
    }
}

/// Reads a workspace into memory for analysis.
pub struct CodebaseFlattener {
    config: WorkspaceConfig,
}

impl CodebaseFlattener {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self { config }
    }

    /// Walk `root`, keeping source files that pass the exclusion, size and
    /// extension filters. Only a failure to walk `root` itself is an error.
    pub fn flatten_workspace(&self, root: &Path) -> Result<FlattenedCodebase> {
        let mut detector = ProjectDetector::new(root);
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !self.is_excluded_dir(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(Error::Workspace {
                        path: root.display().to_string(),
                        message: err.to_string(),
                    });
                }
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };

            let relative = relative_path(root, entry.path());

            if entry.file_type().is_dir() {
                if entry.depth() == 1 {
                    detector.observe_top_level_dir(&relative);
                }
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            detector.observe_file(&relative);

            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(err) => {
                    debug!(path = %relative, error = %err, "skipping file without metadata");
                    continue;
                }
            };
            if size > self.config.max_file_size {
                debug!(path = %relative, size, "skipping oversized file");
                continue;
            }
            if !self.has_allowed_extension(entry.path()) {
                continue;
            }
            // Safety net for excluded names that slipped past directory pruning
            if self
                .config
                .excluded_dirs
                .iter()
                .any(|d| relative.contains(d.as_str()))
            {
                continue;
            }

            match fs::read_to_string(entry.path()) {
                Ok(content) => {
                    files.push(FileContent::new(entry.into_path(), relative, content));
                }
                Err(err) => debug!(path = %relative, error = %err, "skipping unreadable file"),
            }
        }

        let codebase = FlattenedCodebase::from_files(files, detector.finish());
        debug!(
            files = codebase.total_files,
            lines = codebase.total_lines,
            "workspace flattened"
        );
        Ok(codebase)
    }

    /// Read exactly the files named in `diff`. Missing or unreadable files are
    /// skipped; the size and extension filters are not applied.
    pub fn flatten_diff(&self, root: &Path, diff: &ParsedDiff) -> Result<FlattenedCodebase> {
        let mut files = Vec::new();

        for file in &diff.files {
            let path = root.join(&file.filename);
            match fs::read_to_string(&path) {
                Ok(content) => {
                    let mut content = FileContent::new(path, file.filename.clone(), content);
                    content.language = file.language;
                    files.push(content);
                }
                Err(err) => {
                    debug!(path = %file.filename, error = %err, "diff file not readable, skipping");
                }
            }
        }

        let codebase = FlattenedCodebase::from_files(files, Self::detect_top_level(root));
        debug!(files = codebase.total_files, "diff files flattened");
        Ok(codebase)
    }

    fn detect_top_level(root: &Path) -> ProjectInfo {
        let mut detector = ProjectDetector::new(root);

        let mut entries: Vec<_> = match fs::read_dir(root) {
            Ok(entries) => entries.filter_map(|e| e.ok()).collect(),
            Err(err) => {
                debug!(root = %root.display(), error = %err, "cannot list workspace root");
                Vec::new()
            }
        };
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.file_type() {
                Ok(ft) if ft.is_dir() => detector.observe_top_level_dir(&name),
                Ok(ft) if ft.is_file() => detector.observe_file(&name),
                _ => {}
            }
        }

        detector.finish()
    }

    fn is_excluded_dir(&self, entry: &DirEntry) -> bool {
        if !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy();
        self.config.excluded_dirs.iter().any(|d| *d == name)
    }

    fn has_allowed_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.config.allowed_extensions.iter().any(|a| *a == ext)
    }
}

fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
