// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use serde::Serialize;

/// Everything an analysis backend needs, already cut to the prompt budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AiAnalysisContext {
    pub system_prompt: String,
    pub user_prompt: String,
    pub codebase_context: String,
    pub deletion_context: String,
    pub instructions: String,
    pub expected_format: String,
}

impl AiAnalysisContext {
    /// Render the user-turn message: every section except the system prompt.
    pub fn user_message(&self) -> String {
        format!(
            r#"{user}

## CODEBASE
{codebase}

## DELETED CODE
{deleted}

## INSTRUCTIONS
{instructions}

## EXPECTED OUTPUT FORMAT
Respond with a single JSON object shaped like this example and nothing else:
{format}"#,
            user = self.user_prompt.trim(),
            codebase = self.codebase_context.trim_end(),
            deleted = self.deletion_context.trim_end(),
            instructions = self.instructions.trim(),
            format = self.expected_format.trim(),
        )
    }

    /// Total assembled size in characters.
    pub fn len(&self) -> usize {
        self.system_prompt.len()
            + self.user_prompt.len()
            + self.codebase_context.len()
            + self.deletion_context.len()
            + self.instructions.len()
            + self.expected_format.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
