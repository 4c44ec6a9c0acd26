// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Write;

use crate::domain::{DeletionAnalysisResult, OrphanedReference, Severity};

const SEVERITIES: [(Severity, &str, &str); 3] = [
    (Severity::Error, "Errors", "✗"),
    (Severity::Warning, "Warnings", "!"),
    (Severity::Info, "Info", "·"),
];

/// Plain-text report, orphaned references grouped by severity.
pub fn render_report(result: &DeletionAnalysisResult) -> String {
    let mut out = String::new();

    let verdict = if result.has_errors() {
        "UNSAFE"
    } else if result.is_safe() {
        "SAFE"
    } else {
        "REVIEW"
    };
    let _ = writeln!(
        out,
        "Deletion safety: {verdict} (confidence {:.2})",
        result.confidence
    );
    if !result.summary.trim().is_empty() {
        let _ = writeln!(out, "{}", result.summary.trim());
    }

    for (severity, heading, marker) in SEVERITIES {
        let group: Vec<&OrphanedReference> = result
            .orphaned_references
            .iter()
            .filter(|r| r.severity == severity)
            .collect();
        if group.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n{heading} ({})", group.len());
        for reference in group {
            let lines: Vec<String> = reference
                .referencing_lines
                .iter()
                .map(usize::to_string)
                .collect();
            let _ = writeln!(
                out,
                "  {marker} {} in {}:{} [{}]",
                reference.deleted_entity,
                reference.referencing_file,
                lines.join(","),
                reference.reference_type
            );
            if !reference.context.trim().is_empty() {
                let _ = writeln!(out, "      {}", reference.context.trim());
            }
            if !reference.suggestion.trim().is_empty() {
                let _ = writeln!(out, "      → {}", reference.suggestion.trim());
            }
        }
    }

    if !result.safe_deletions.is_empty() {
        let _ = writeln!(out, "\nSafe deletions ({})", result.safe_deletions.len());
        for name in &result.safe_deletions {
            let _ = writeln!(out, "  ✓ {name}");
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\nNotes ({})", result.warnings.len());
        for warning in &result.warnings {
            let _ = writeln!(
                out,
                "  [{}] {}: {}",
                warning.severity, warning.warning_type, warning.message
            );
        }
    }

    if result.orphaned_references.is_empty() && result.safe_deletions.is_empty() {
        let _ = writeln!(out, "\nNo deleted declarations were found.");
    }

    out
}
