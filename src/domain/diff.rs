// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use serde::Serialize;

use super::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Deleted => "deleted",
            Self::Renamed => "renamed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineType {
    Context,
    Added,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub line_type: LineType,
    pub content: String,
    /// Line number in the pre-change file; `None` for added lines.
    pub old_line_no: Option<usize>,
    /// Line number in the post-change file; `None` for removed lines.
    pub new_line_no: Option<usize>,
}

impl DiffLine {
    pub fn is_change(&self) -> bool {
        self.line_type != LineType::Context
    }

    /// The most specific line number available, preferring the new side.
    pub fn display_line(&self) -> usize {
        self.new_line_no.or(self.old_line_no).unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffHunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
    /// Text following the closing `@@`, usually the enclosing function.
    pub section: Option<String>,
    pub lines: Vec<DiffLine>,
}

impl DiffHunk {
    pub fn added_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.line_type == LineType::Added)
            .count()
    }

    pub fn removed_lines(&self) -> usize {
        self.lines
            .iter()
            .filter(|l| l.line_type == LineType::Removed)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub filename: String,
    /// Set for renames, when the pre-change path differs.
    pub old_filename: Option<String>,
    pub status: FileStatus,
    pub language: Language,
    pub additions: usize,
    pub deletions: usize,
    pub hunks: Vec<DiffHunk>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDiff {
    pub files: Vec<FileDiff>,
    pub total_files: usize,
    pub total_added: usize,
    pub total_removed: usize,
}

impl ParsedDiff {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file(&self, filename: &str) -> Option<&FileDiff> {
        self.files.iter().find(|f| f.filename == filename)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Addition,
    Deletion,
    Modification,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Deletion => "deletion",
            Self::Modification => "modification",
        }
    }

    /// Classify a run of changed lines.
    pub fn of_lines<'a>(lines: impl IntoIterator<Item = &'a DiffLine>) -> Self {
        let (mut added, mut removed) = (false, false);
        for line in lines {
            match line.line_type {
                LineType::Added => added = true,
                LineType::Removed => removed = true,
                LineType::Context => {}
            }
        }
        match (added, removed) {
            (true, false) => Self::Addition,
            (false, true) => Self::Deletion,
            _ => Self::Modification,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextBlock {
    pub start_line: usize,
    pub end_line: usize,
    pub change_type: ChangeType,
    pub description: String,
    pub lines: Vec<DiffLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileWithContext {
    pub file: FileDiff,
    pub context_blocks: Vec<ContextBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextualDiff {
    pub diff: ParsedDiff,
    pub files_with_context: Vec<FileWithContext>,
}
