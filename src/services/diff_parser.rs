// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{DiffHunk, DiffLine, FileDiff, FileStatus, Language, LineType, ParsedDiff};
use crate::error::{Error, Result};

static FILE_HEADER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^diff --git "?a/(.+?)"? "?b/(.+?)"?$"#).unwrap());

// Robust regex for parsing unified diff hunk headers
static HUNK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@\s*-(\d+)(?:,(\d+))?\s+\+(\d+)(?:,(\d+))?\s*@@(.*)$").unwrap()
});

/// Tracks line numbers and the declared counts still owed by the open hunk.
struct HunkCursor {
    old_line: usize,
    new_line: usize,
    old_remaining: usize,
    new_remaining: usize,
}

impl HunkCursor {
    fn new(hunk: &DiffHunk) -> Self {
        Self {
            old_line: hunk.old_start,
            new_line: hunk.new_start,
            old_remaining: hunk.old_count,
            new_remaining: hunk.new_count,
        }
    }

    fn expects_more(&self) -> bool {
        self.old_remaining > 0 || self.new_remaining > 0
    }

    fn context(&mut self, content: &str, line_no: usize) -> Result<DiffLine> {
        let line = DiffLine {
            line_type: LineType::Context,
            content: content.to_string(),
            old_line_no: Some(self.old_line),
            new_line_no: Some(self.new_line),
        };
        self.old_line = advance(self.old_line, line_no)?;
        self.new_line = advance(self.new_line, line_no)?;
        self.old_remaining = self.old_remaining.saturating_sub(1);
        self.new_remaining = self.new_remaining.saturating_sub(1);
        Ok(line)
    }

    fn added(&mut self, content: &str, line_no: usize) -> Result<DiffLine> {
        let line = DiffLine {
            line_type: LineType::Added,
            content: content.to_string(),
            old_line_no: None,
            new_line_no: Some(self.new_line),
        };
        self.new_line = advance(self.new_line, line_no)?;
        self.new_remaining = self.new_remaining.saturating_sub(1);
        Ok(line)
    }

    fn removed(&mut self, content: &str, line_no: usize) -> Result<DiffLine> {
        let line = DiffLine {
            line_type: LineType::Removed,
            content: content.to_string(),
            old_line_no: Some(self.old_line),
            new_line_no: None,
        };
        self.old_line = advance(self.old_line, line_no)?;
        self.old_remaining = self.old_remaining.saturating_sub(1);
        Ok(line)
    }
}

fn advance(number: usize, line_no: usize) -> Result<usize> {
    number.checked_add(1).ok_or_else(|| Error::DiffParse {
        line: line_no,
        message: "hunk line numbers exceed the representable range".into(),
    })
}

/// Parser for git unified diffs.
pub struct DiffParser;

impl DiffParser {
    /// Parse raw `git diff` output. An empty input yields an empty diff.
    pub fn parse(input: &str) -> Result<ParsedDiff> {
        let mut diff = ParsedDiff::default();
        let mut current: Option<FileDiff> = None;
        let mut cursor: Option<HunkCursor> = None;

        for (idx, raw) in input.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);

            if line.starts_with("diff --git ") {
                Self::finish_file(&mut diff, current.take());
                cursor = None;
                current = Some(Self::parse_file_header(line, line_no)?);
                continue;
            }

            // Anything before the first file header (commit message, stat) is noise
            let Some(file) = current.as_mut() else {
                continue;
            };

            if line.starts_with("@@") {
                let hunk = Self::parse_hunk_header(line, line_no)?;
                cursor = Some(HunkCursor::new(&hunk));
                file.hunks.push(hunk);
                continue;
            }

            let Some(active) = cursor.as_mut() else {
                Self::apply_header_line(file, line);
                continue;
            };

            let Some(hunk) = file.hunks.last_mut() else {
                continue;
            };

            if active.expects_more() {
                // Inside the declared range `---`/`+++` are real removed/added lines
                // and a bare empty line is an empty context line.
                if let Some(parsed) = Self::classify_body_line(active, line, line_no, true)? {
                    hunk.lines.push(parsed);
                }
                continue;
            }

            // Past the declared range: only accept unambiguous body lines
            if line.starts_with("--- ") || line.starts_with("+++ ") {
                continue;
            }
            if let Some(parsed) = Self::classify_body_line(active, line, line_no, false)? {
                hunk.lines.push(parsed);
            }
        }

        Self::finish_file(&mut diff, current.take());
        diff.total_files = diff.files.len();

        Ok(diff)
    }

    fn classify_body_line(
        cursor: &mut HunkCursor,
        line: &str,
        line_no: usize,
        empty_is_context: bool,
    ) -> Result<Option<DiffLine>> {
        let mut chars = line.chars();
        let parsed = match chars.next() {
            Some(' ') => cursor.context(chars.as_str(), line_no)?,
            Some('+') => cursor.added(chars.as_str(), line_no)?,
            Some('-') => cursor.removed(chars.as_str(), line_no)?,
            None if empty_is_context => cursor.context("", line_no)?,
            // `\ No newline at end of file` and anything unprefixed
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }

    fn parse_file_header(line: &str, line_no: usize) -> Result<FileDiff> {
        let caps = FILE_HEADER_REGEX
            .captures(line)
            .ok_or_else(|| Error::DiffParse {
                line: line_no,
                message: format!("cannot extract paths from file header '{line}'"),
            })?;

        let old_path = caps[1].to_string();
        let new_path = caps[2].to_string();

        let (status, old_filename) = if old_path != new_path {
            (FileStatus::Renamed, Some(old_path))
        } else {
            (FileStatus::Modified, None)
        };

        Ok(FileDiff {
            language: Language::from_path(&new_path),
            filename: new_path,
            old_filename,
            status,
            additions: 0,
            deletions: 0,
            hunks: Vec::new(),
        })
    }

    fn apply_header_line(file: &mut FileDiff, line: &str) {
        if line.starts_with("new file mode") {
            file.status = FileStatus::Added;
        } else if line.starts_with("deleted file mode") {
            file.status = FileStatus::Deleted;
        } else if let Some(from) = line.strip_prefix("rename from ") {
            file.status = FileStatus::Renamed;
            file.old_filename = Some(from.trim().to_string());
        } else if let Some(to) = line.strip_prefix("rename to ") {
            file.status = FileStatus::Renamed;
            file.filename = to.trim().to_string();
            file.language = Language::from_path(&file.filename);
        }
        // `---`, `+++`, `index`, mode and similarity lines carry nothing we keep
    }

    fn parse_hunk_header(line: &str, line_no: usize) -> Result<DiffHunk> {
        let malformed = |message: String| Error::DiffParse {
            line: line_no,
            message,
        };

        let caps = HUNK_REGEX
            .captures(line)
            .ok_or_else(|| malformed(format!("malformed hunk header '{line}'")))?;

        let number = |idx: usize, default: usize| -> Result<usize> {
            match caps.get(idx) {
                Some(m) => m
                    .as_str()
                    .parse()
                    .map_err(|_| malformed(format!("hunk number out of range in '{line}'"))),
                None => Ok(default),
            }
        };

        let section = caps
            .get(5)
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(DiffHunk {
            old_start: number(1, 0)?,
            old_count: number(2, 1)?,
            new_start: number(3, 0)?,
            new_count: number(4, 1)?,
            section,
            lines: Vec::new(),
        })
    }

    fn finish_file(diff: &mut ParsedDiff, file: Option<FileDiff>) {
        let Some(mut file) = file else {
            return;
        };

        file.additions = file.hunks.iter().map(DiffHunk::added_lines).sum();
        file.deletions = file.hunks.iter().map(DiffHunk::removed_lines).sum();

        diff.total_added += file.additions;
        diff.total_removed += file.deletions;
        diff.files.push(file);
    }
}
