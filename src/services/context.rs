// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use crate::config::ContextBudget;
use crate::domain::{AiAnalysisContext, DeletedCode, FileContent, FlattenedCodebase};
use crate::error::{Error, Result};

pub const SYSTEM_PROMPT: &str = r#"You are a senior software engineer reviewing a code change for deletion safety.

You are given a snapshot of a codebase and the code that a change removes. Your job is to find every place in the remaining codebase that still depends on something the change deletes: function and method calls, type usages, imports, interface implementations and variable or constant references.

You are precise and conservative:
1. Only report references you can point to by file and line
2. Distinguish real usages from names that merely look alike (different package, shadowed local, comment text)
3. Prefer "warning" when you cannot tell whether a reference resolves to the deleted declaration
4. Output ONLY valid JSON"#;

pub const INSTRUCTIONS: &str = r#"1. List every declaration (function, method, type, interface, constant, variable) removed by the DELETED CODE section.
2. Search the CODEBASE section for remaining references to each of them.
3. Classify each reference with one of these reference_type values:
   - function_call: the deleted function or method is invoked
   - type_usage: the deleted type appears in a signature, declaration or conversion
   - import: the deleted symbol or its package is imported
   - interface_implementation: a type relies on a deleted interface or method set
   - variable_reference: a deleted constant or variable is read or written
   - potential_usage: a textual match whose resolution is uncertain
4. Assign a severity:
   - error: the code will not compile or will fail at runtime
   - warning: the reference is likely broken but could resolve elsewhere
   - info: worth a look, probably harmless
5. Put every deleted declaration with no remaining reference into safe_deletions.
6. Never list a name in safe_deletions if it has an orphaned reference.
7. Add warnings for risks that are not tied to a single reference (reflection, string-based lookups, public API removal).
8. Set confidence between 0.0 and 1.0 to reflect how complete the provided codebase context was.
9. Every orphaned reference must name the deleted entity, the referencing file and at least one line number."#;

pub const EXPECTED_FORMAT: &str = r#"{
  "orphaned_references": [
    {
      "deleted_entity": "CalculateTotal",
      "referencing_file": "handlers/order.go",
      "referencing_lines": [42, 87],
      "reference_type": "function_call",
      "context": "total := CalculateTotal(items)",
      "severity": "error",
      "suggestion": "Restore CalculateTotal or update handlers/order.go to use its replacement"
    }
  ],
  "safe_deletions": ["formatLegacyID"],
  "warnings": [
    {
      "type": "public_api",
      "message": "CalculateTotal was exported and may be used by external packages",
      "severity": "warning"
    }
  ],
  "summary": "One deleted function is still called in two places.",
  "confidence": 0.85
}"#;

/// Assembles the bounded prompt handed to analysis backends.
pub struct ContextBuilder {
    budget: ContextBudget,
}

impl ContextBuilder {
    pub fn new(budget: ContextBudget) -> Self {
        Self { budget }
    }

    pub fn build(
        &self,
        codebase: &FlattenedCodebase,
        deleted: &[DeletedCode],
        context: &str,
    ) -> Result<AiAnalysisContext> {
        for code in deleted {
            if code.file.trim().is_empty() {
                return Err(Error::Context("deleted code entry has no file path".into()));
            }
            if code.start_line > code.end_line {
                return Err(Error::Context(format!(
                    "deleted code in {} has inverted range {}-{}",
                    code.file, code.start_line, code.end_line
                )));
            }
        }

        Ok(AiAnalysisContext {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: Self::user_prompt(codebase, deleted, context),
            codebase_context: self.codebase_context(codebase),
            deletion_context: self.deletion_context(deleted),
            instructions: INSTRUCTIONS.to_string(),
            expected_format: EXPECTED_FORMAT.to_string(),
        })
    }

    fn user_prompt(codebase: &FlattenedCodebase, deleted: &[DeletedCode], context: &str) -> String {
        let files: Vec<&str> = {
            let mut files: Vec<&str> = deleted.iter().map(|d| d.file.as_str()).collect();
            files.dedup();
            files
        };

        let mut prompt = format!(
            "Analyze whether the code deleted by this change leaves orphaned references elsewhere in the codebase.\n\n\
             The change removes {} block(s) of code from: {}.\n\
             The codebase snapshot contains {} file(s).",
            deleted.len(),
            if files.is_empty() {
                "no files".to_string()
            } else {
                files.join(", ")
            },
            codebase.total_files,
        );

        let context = context.trim();
        if !context.is_empty() {
            prompt.push_str("\n\nCHANGE CONTEXT:\n");
            prompt.push_str(context);
        }

        prompt
    }

    /// Once the budget is exhausted every remaining file is listed by name only.
    fn codebase_context(&self, codebase: &FlattenedCodebase) -> String {
        let mut output = String::new();
        output.push_str(&codebase.summary);
        output.push('\n');

        if !codebase.project_info.structure.is_empty() {
            output.push_str("Structure:\n");
            for (dir, purpose) in &codebase.project_info.structure {
                output.push_str(&format!("- {dir}/: {purpose}\n"));
            }
        }
        output.push('\n');

        let mut exhausted = false;
        for file in &codebase.files {
            let block = Self::file_block(file);
            if !exhausted && output.len() + block.len() <= self.budget.codebase_chars {
                output.push_str(&block);
                continue;
            }

            exhausted = true;
            output.push_str(&format!(
                "{}[content omitted: codebase budget of {} characters exceeded]\n\n",
                Self::file_header(file),
                self.budget.codebase_chars
            ));
        }

        output
    }

    fn deletion_context(&self, deleted: &[DeletedCode]) -> String {
        if deleted.is_empty() {
            return "No code is deleted by this change.\n".to_string();
        }

        let mut output = String::new();
        let mut exhausted = false;

        for code in deleted {
            let header = format!(
                "### Deleted from {} (lines {}-{}, {}, {})\n",
                code.file, code.start_line, code.end_line, code.language, code.change_type
            );
            let block = format!(
                "{header}```{}\n{}\n```\n\n",
                code.language, code.content
            );

            if !exhausted && output.len() + block.len() <= self.budget.deletion_chars {
                output.push_str(&block);
                continue;
            }

            exhausted = true;
            output.push_str(&format!(
                "{header}[content omitted: deletion budget of {} characters exceeded]\n\n",
                self.budget.deletion_chars
            ));
        }

        output
    }

    fn file_header(file: &FileContent) -> String {
        format!(
            "### File: {} ({}, {} lines)\n",
            file.relative_path, file.language, file.line_count
        )
    }

    fn file_block(file: &FileContent) -> String {
        format!(
            "{}```{}\n{}\n```\n\n",
            Self::file_header(file),
            file.language,
            file.content.trim_end_matches('\n')
        )
    }
}
