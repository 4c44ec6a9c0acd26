// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

use super::{ChangeType, FlattenedCodebase, Language};

/// A contiguous block of source removed by a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletedCode {
    pub file: String,
    pub content: String,
    pub start_line: usize,
    pub end_line: usize,
    pub language: Language,
    pub change_type: ChangeType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    #[default]
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    FunctionCall,
    TypeUsage,
    Import,
    InterfaceImplementation,
    VariableReference,
    #[default]
    PotentialUsage,
    #[serde(other)]
    Other,
}

impl ReferenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FunctionCall => "function_call",
            Self::TypeUsage => "type_usage",
            Self::Import => "import",
            Self::InterfaceImplementation => "interface_implementation",
            Self::VariableReference => "variable_reference",
            Self::PotentialUsage => "potential_usage",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for ReferenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A surviving use of an identifier whose declaration was deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrphanedReference {
    #[serde(default)]
    pub deleted_entity: String,
    #[serde(default)]
    pub referencing_file: String,
    #[serde(default)]
    pub referencing_lines: Vec<usize>,
    #[serde(default)]
    pub reference_type: ReferenceType,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub suggestion: String,
}

impl OrphanedReference {
    pub fn is_well_formed(&self) -> bool {
        !self.deleted_entity.trim().is_empty()
            && !self.referencing_file.trim().is_empty()
            && !self.referencing_lines.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(rename = "type", default)]
    pub warning_type: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub severity: Severity,
}

#[derive(Debug, Clone, Default)]
pub struct DeletionAnalysisRequest {
    pub codebase: FlattenedCodebase,
    pub deleted_content: Vec<DeletedCode>,
    /// Free-text description of the change (PR title, body, ...).
    pub context: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletionAnalysisResult {
    #[serde(default)]
    pub orphaned_references: Vec<OrphanedReference>,
    #[serde(default)]
    pub safe_deletions: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub confidence: f64,
}

impl DeletionAnalysisResult {
    pub fn has_errors(&self) -> bool {
        self.orphaned_references
            .iter()
            .any(|r| r.severity == Severity::Error)
    }

    pub fn is_safe(&self) -> bool {
        self.orphaned_references.is_empty()
    }
}
