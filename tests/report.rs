// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use dangle::domain::{
    DeletionAnalysisResult, OrphanedReference, ReferenceType, Severity, Warning,
};
use dangle::services::report::render_report;

fn reference(
    entity: &str,
    file: &str,
    lines: &[usize],
    reference_type: ReferenceType,
    severity: Severity,
) -> OrphanedReference {
    OrphanedReference {
        deleted_entity: entity.into(),
        referencing_file: file.into(),
        referencing_lines: lines.to_vec(),
        reference_type,
        severity,
        ..OrphanedReference::default()
    }
}

#[test]
fn mixed_severities_group_in_order() {
    let result = DeletionAnalysisResult {
        orphaned_references: vec![
            OrphanedReference {
                context: "result := CalculateSum(1, 2)".into(),
                suggestion: "Restore CalculateSum or update main.go".into(),
                ..reference(
                    "CalculateSum",
                    "main.go",
                    &[6],
                    ReferenceType::PotentialUsage,
                    Severity::Warning,
                )
            },
            OrphanedReference {
                suggestion: "Restore Config".into(),
                ..reference(
                    "Config",
                    "cmd/app.go",
                    &[3, 12],
                    ReferenceType::TypeUsage,
                    Severity::Error,
                )
            },
        ],
        safe_deletions: vec!["Multiply".into()],
        warnings: vec![Warning {
            warning_type: "orphaned_reference".into(),
            message: "`CalculateSum` is deleted but still referenced".into(),
            severity: Severity::Warning,
        }],
        summary: "Two references remain.".into(),
        confidence: 0.85,
    };

    let report = render_report(&result);
    insta::assert_snapshot!(report.trim_end(), @r"
Deletion safety: UNSAFE (confidence 0.85)
Two references remain.

Errors (1)
  ✗ Config in cmd/app.go:3,12 [type_usage]
      → Restore Config

Warnings (1)
  ! CalculateSum in main.go:6 [potential_usage]
      result := CalculateSum(1, 2)
      → Restore CalculateSum or update main.go

Safe deletions (1)
  ✓ Multiply

Notes (1)
  [warning] orphaned_reference: `CalculateSum` is deleted but still referenced
");
}

#[test]
fn warnings_only_needs_review() {
    let result = DeletionAnalysisResult {
        orphaned_references: vec![reference(
            "helper",
            "util.py",
            &[14],
            ReferenceType::FunctionCall,
            Severity::Info,
        )],
        confidence: 0.5,
        ..DeletionAnalysisResult::default()
    };

    let report = render_report(&result);
    insta::assert_snapshot!(report.trim_end(), @r"
Deletion safety: REVIEW (confidence 0.50)

Info (1)
  · helper in util.py:14 [function_call]
");
}

#[test]
fn safe_deletions_only() {
    let result = DeletionAnalysisResult {
        safe_deletions: vec!["Alpha".into(), "Beta".into()],
        summary: "Nothing references the removed code.".into(),
        confidence: 0.7,
        ..DeletionAnalysisResult::default()
    };

    let report = render_report(&result);
    insta::assert_snapshot!(report.trim_end(), @r"
Deletion safety: SAFE (confidence 0.70)
Nothing references the removed code.

Safe deletions (2)
  ✓ Alpha
  ✓ Beta
");
}

#[test]
fn empty_result() {
    let report = render_report(&DeletionAnalysisResult::default());
    insta::assert_snapshot!(report.trim_end(), @r"
Deletion safety: SAFE (confidence 0.00)

No deleted declarations were found.
");
}

#[test]
fn blank_summary_and_context_are_omitted() {
    let result = DeletionAnalysisResult {
        orphaned_references: vec![OrphanedReference {
            context: "   ".into(),
            suggestion: "\n".into(),
            ..reference("X", "a.go", &[1], ReferenceType::Other, Severity::Warning)
        }],
        summary: "  ".into(),
        confidence: 0.3,
        ..DeletionAnalysisResult::default()
    };

    let report = render_report(&result);
    assert_eq!(
        report,
        "Deletion safety: REVIEW (confidence 0.30)\n\nWarnings (1)\n  ! X in a.go:1 [other]\n"
    );
}
