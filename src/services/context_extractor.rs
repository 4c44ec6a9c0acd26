// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use crate::domain::{
    ChangeType, ContextBlock, ContextualDiff, DiffHunk, DiffLine, FileWithContext, LineType,
    ParsedDiff,
};

/// Groups changed lines into blocks with a window of surrounding context.
pub struct ContextExtractor {
    context_lines: usize,
}

impl ContextExtractor {
    pub fn new(context_lines: usize) -> Self {
        Self { context_lines }
    }

    /// Files without any change block are left out of `files_with_context`.
    pub fn extract(&self, diff: &ParsedDiff) -> ContextualDiff {
        let files_with_context = diff
            .files
            .iter()
            .filter_map(|file| {
                let context_blocks: Vec<_> = file
                    .hunks
                    .iter()
                    .flat_map(|hunk| self.blocks_for_hunk(hunk))
                    .collect();

                (!context_blocks.is_empty()).then(|| FileWithContext {
                    file: file.clone(),
                    context_blocks,
                })
            })
            .collect();

        ContextualDiff {
            diff: diff.clone(),
            files_with_context,
        }
    }

    pub fn blocks_for_hunk(&self, hunk: &DiffHunk) -> Vec<ContextBlock> {
        let lines = &hunk.lines;
        let mut blocks = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            if !lines[i].is_change() {
                i += 1;
                continue;
            }

            let run_start = i;
            while i < lines.len() && lines[i].is_change() {
                i += 1;
            }
            let run_end = i;

            // Extend over context lines only, never into a neighbouring run
            let mut start = run_start;
            while start > 0
                && run_start - start < self.context_lines
                && !lines[start - 1].is_change()
            {
                start -= 1;
            }
            let mut end = run_end;
            while end < lines.len()
                && end - run_end < self.context_lines
                && !lines[end].is_change()
            {
                end += 1;
            }

            let change_type = ChangeType::of_lines(&lines[run_start..run_end]);
            let block_lines = lines[start..end].to_vec();

            blocks.push(ContextBlock {
                start_line: block_lines.first().map(DiffLine::display_line).unwrap_or(0),
                end_line: block_lines.last().map(DiffLine::display_line).unwrap_or(0),
                change_type,
                description: Self::describe(&lines[run_start..run_end], hunk.section.as_deref()),
                lines: block_lines,
            });
        }

        blocks
    }

    fn describe(run: &[DiffLine], section: Option<&str>) -> String {
        let added = run.iter().filter(|l| l.line_type == LineType::Added).count();
        let removed = run
            .iter()
            .filter(|l| l.line_type == LineType::Removed)
            .count();

        let mut description = match (added, removed) {
            (a, 0) => format!("{} added", plural_lines(a)),
            (0, r) => format!("{} removed", plural_lines(r)),
            (a, r) => format!("{} removed, {} added", plural_lines(r), plural_lines(a)),
        };

        if let Some(section) = section {
            description.push_str(&format!(" in `{section}`"));
        }

        description
    }

    /// Human-readable listing of every block, prefixed like the diff itself.
    pub fn render(contextual: &ContextualDiff) -> String {
        let mut output = String::new();

        for file in &contextual.files_with_context {
            output.push_str(&format!(
                "{} ({}, {})\n",
                file.file.filename,
                file.file.status.as_str(),
                file.file.language
            ));

            for block in &file.context_blocks {
                output.push_str(&format!(
                    "  L{}-{} [{}] {}\n",
                    block.start_line, block.end_line, block.change_type, block.description
                ));
                for line in &block.lines {
                    let marker = match line.line_type {
                        LineType::Context => ' ',
                        LineType::Added => '+',
                        LineType::Removed => '-',
                    };
                    output.push_str(&format!("    {}{}\n", marker, line.content));
                }
            }
        }

        output
    }
}

fn plural_lines(n: usize) -> String {
    if n == 1 {
        "1 line".to_string()
    } else {
        format!("{n} lines")
    }
}
