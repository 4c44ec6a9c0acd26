// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

use std::collections::HashSet;

use tracing::warn;

use crate::domain::DeletionAnalysisResult;
use crate::error::{Error, Result};

/// Extract and validate a [`DeletionAnalysisResult`] from raw model output.
pub fn parse_analysis_response(raw: &str) -> Result<DeletionAnalysisResult> {
    ResponseSanitizer::sanitize(raw)
}

pub struct ResponseSanitizer;

impl ResponseSanitizer {
    /// Parse and validate an analysis result from raw model output.
    ///
    /// Guarantees on success: `confidence` is within `[0, 1]`, every orphaned
    /// reference names an entity, a file and at least one line, and no name
    /// in `safe_deletions` also has an orphaned reference.
    pub fn sanitize(raw: &str) -> Result<DeletionAnalysisResult> {
        let json = Self::extract_json(raw).ok_or_else(|| {
            Error::InvalidResponse(format!(
                "no JSON object found in response ({} chars)",
                raw.len()
            ))
        })?;

        let mut result: DeletionAnalysisResult = serde_json::from_str(json)
            .map_err(|e| Error::InvalidResponse(format!("malformed JSON: {e}")))?;

        Self::validate(&mut result)?;
        Ok(result)
    }

    fn extract_json(raw: &str) -> Option<&str> {
        let trimmed = raw.trim();

        // Direct JSON
        if trimmed.starts_with('{') && trimmed.ends_with('}') {
            return Some(trimmed);
        }

        // JSON in code fence
        if let Some(start) = trimmed.find("```json") {
            let after_fence = &trimmed[start + 7..];
            if let Some(end) = after_fence.find("```") {
                return Some(after_fence[..end].trim());
            }
        }

        // Plain code fence
        if let Some(start) = trimmed.find("```") {
            let after_fence = &trimmed[start + 3..];
            if let Some(end) = after_fence.find("```") {
                let content = after_fence[..end].trim();
                if content.starts_with('{') {
                    return Some(content);
                }
            }
        }

        // Object embedded in prose
        let start = trimmed.find('{')?;
        let end = trimmed.rfind('}')?;
        (end > start).then(|| &trimmed[start..=end])
    }

    fn validate(result: &mut DeletionAnalysisResult) -> Result<()> {
        if !result.confidence.is_finite() {
            return Err(Error::InvalidResponse(format!(
                "confidence must be a number, got {}",
                result.confidence
            )));
        }
        if !(0.0..=1.0).contains(&result.confidence) {
            warn!(
                confidence = result.confidence,
                "confidence out of range, clamping"
            );
            result.confidence = result.confidence.clamp(0.0, 1.0);
        }

        let before = result.orphaned_references.len();
        result.orphaned_references.retain(|r| r.is_well_formed());
        let dropped = before - result.orphaned_references.len();
        if dropped > 0 {
            warn!(dropped, "dropping incomplete orphaned references");
        }

        let referenced: HashSet<&str> = result
            .orphaned_references
            .iter()
            .map(|r| r.deleted_entity.as_str())
            .collect();
        let mut seen = HashSet::new();
        let safe: Vec<String> = result
            .safe_deletions
            .iter()
            .filter(|name| !referenced.contains(name.as_str()))
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();
        result.safe_deletions = safe;

        Ok(())
    }
}
