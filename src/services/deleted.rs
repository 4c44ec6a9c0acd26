// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use crate::domain::{
    ChangeType, DeletedCode, DiffHunk, DiffLine, FileStatus, Language, LineType, ParsedDiff,
};

/// Collect the source removed by a diff.
///
/// A deleted file yields a single entry spanning all of its removed lines.
/// Any other file yields one entry per hunk that removes at least one line.
pub fn extract_deleted_content(diff: &ParsedDiff) -> Vec<DeletedCode> {
    let mut deleted = Vec::new();

    for file in &diff.files {
        if file.status == FileStatus::Deleted {
            let removed: Vec<&DiffLine> = file.hunks.iter().flat_map(removed_lines).collect();
            if let Some(code) = build(
                &file.filename,
                file.language,
                ChangeType::Deletion,
                &removed,
            ) {
                deleted.push(code);
            }
            continue;
        }

        for hunk in &file.hunks {
            let removed: Vec<&DiffLine> = removed_lines(hunk).collect();
            let change_type = if hunk.added_lines() > 0 {
                ChangeType::Modification
            } else {
                ChangeType::Deletion
            };
            if let Some(code) = build(&file.filename, file.language, change_type, &removed) {
                deleted.push(code);
            }
        }
    }

    deleted
}

fn removed_lines(hunk: &DiffHunk) -> impl Iterator<Item = &DiffLine> {
    hunk.lines
        .iter()
        .filter(|l| l.line_type == LineType::Removed)
}

fn build(
    file: &str,
    language: Language,
    change_type: ChangeType,
    removed: &[&DiffLine],
) -> Option<DeletedCode> {
    let first = removed.first()?;
    let last = removed.last()?;

    let content = removed
        .iter()
        .map(|l| l.content.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    Some(DeletedCode {
        file: file.to_string(),
        content,
        start_line: first.old_line_no.unwrap_or(0),
        end_line: last.old_line_no.unwrap_or(0),
        language,
        change_type,
    })
}
