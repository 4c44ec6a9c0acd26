// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{Backend, Config, ContextBudget};
use crate::domain::{
    AiAnalysisContext, CodeEntity, DeletionAnalysisRequest, DeletionAnalysisResult, EntityType,
    OrphanedReference, ProjectType, ReferenceType, Severity, Warning,
};
use crate::error::{Error, Result};
use crate::services::context::ContextBuilder;
use crate::services::entities::{EntityParser, PatternScanner, ReferenceScanner};
use crate::services::llm::{self, LlmClient};

const BASE_CONFIDENCE: f64 = 0.6;
const LARGE_CONTEXT_CHARS: usize = 10_000;
const MANY_FILES: usize = 10;
const MANY_REFERENCES: usize = 10;

/// Strategy that turns an assembled context into a result.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        request: &DeletionAnalysisRequest,
        context: &AiAnalysisContext,
        cancel: CancellationToken,
    ) -> Result<DeletionAnalysisResult>;

    fn name(&self) -> &str;
}

/// Offline backend: textual identifier matching across the codebase.
pub struct HeuristicBackend {
    parser: Box<dyn EntityParser>,
    scanner: Box<dyn ReferenceScanner>,
}

impl Default for HeuristicBackend {
    fn default() -> Self {
        Self::new(Box::new(PatternScanner::new()), Box::new(PatternScanner::new()))
    }
}

impl HeuristicBackend {
    pub fn new(parser: Box<dyn EntityParser>, scanner: Box<dyn ReferenceScanner>) -> Self {
        Self { parser, scanner }
    }

    pub fn run(
        &self,
        request: &DeletionAnalysisRequest,
        context: &AiAnalysisContext,
    ) -> DeletionAnalysisResult {
        let mut orphaned: Vec<OrphanedReference> = Vec::new();
        // (entity, referencing file) → index into `orphaned`
        let mut by_key: HashMap<(String, String), usize> = HashMap::new();
        let mut deleted_entities: Vec<CodeEntity> = Vec::new();

        for deleted in &request.deleted_content {
            let entities = self.parser.parse_entities(&deleted.content, &deleted.file);
            if entities.is_empty() {
                continue;
            }
            debug!(file = %deleted.file, count = entities.len(), "entities in deleted code");

            for file in &request.codebase.files {
                if file.relative_path == deleted.file {
                    continue;
                }

                for reference in
                    self.scanner
                        .find_references(&file.content, &file.relative_path, &entities)
                {
                    let key = (reference.entity.clone(), file.relative_path.clone());
                    if let Some(&idx) = by_key.get(&key) {
                        let lines = &mut orphaned[idx].referencing_lines;
                        if !lines.contains(&reference.line_number) {
                            lines.push(reference.line_number);
                        }
                        continue;
                    }

                    let entity_type = entities
                        .iter()
                        .find(|e| e.name == reference.entity)
                        .map(|e| e.entity_type)
                        .unwrap_or(EntityType::Function);

                    by_key.insert(key, orphaned.len());
                    orphaned.push(OrphanedReference {
                        suggestion: suggestion(entity_type, &reference.entity, &file.relative_path),
                        deleted_entity: reference.entity,
                        referencing_file: file.relative_path.clone(),
                        referencing_lines: vec![reference.line_number],
                        reference_type: ReferenceType::PotentialUsage,
                        context: reference.line,
                        severity: Severity::Warning,
                    });
                }
            }

            deleted_entities.extend(entities);
        }

        let warnings = orphan_warnings(&orphaned);

        let referenced: HashSet<&str> = orphaned
            .iter()
            .map(|r| r.deleted_entity.as_str())
            .collect();
        let mut seen = HashSet::new();
        let safe_deletions: Vec<String> = deleted_entities
            .iter()
            .map(|e| e.name.as_str())
            .filter(|name| seen.insert(*name) && !referenced.contains(name))
            .map(str::to_string)
            .collect();

        let confidence = heuristic_confidence(
            context.len(),
            request.codebase.total_files,
            request.codebase.project_info.project_type,
            orphaned.len(),
        );

        let summary = if request.deleted_content.is_empty() {
            "No deleted code to analyze.".to_string()
        } else {
            format!(
                "Analyzed {} deleted block(s) declaring {} entit{}: {} potential orphaned reference(s), {} safe deletion(s).",
                request.deleted_content.len(),
                seen.len(),
                if seen.len() == 1 { "y" } else { "ies" },
                orphaned.len(),
                safe_deletions.len()
            )
        };

        DeletionAnalysisResult {
            orphaned_references: orphaned,
            safe_deletions,
            warnings,
            summary,
            confidence,
        }
    }
}

#[async_trait]
impl AnalysisBackend for HeuristicBackend {
    async fn analyze(
        &self,
        request: &DeletionAnalysisRequest,
        context: &AiAnalysisContext,
        _cancel: CancellationToken,
    ) -> Result<DeletionAnalysisResult> {
        Ok(self.run(request, context))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

/// Delegates to a model; its result is returned as-is.
pub struct LlmBackend {
    client: Box<dyn LlmClient>,
}

impl LlmBackend {
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AnalysisBackend for LlmBackend {
    async fn analyze(
        &self,
        _request: &DeletionAnalysisRequest,
        context: &AiAnalysisContext,
        cancel: CancellationToken,
    ) -> Result<DeletionAnalysisResult> {
        self.client.analyze_deletions(context, cancel).await
    }

    fn name(&self) -> &str {
        self.client.name()
    }
}

/// Builds the analysis context and hands it to the configured backend.
///
/// Holds no per-request state; concurrent calls on one instance are fine.
pub struct DeletionAnalyzer {
    builder: ContextBuilder,
    backend: Box<dyn AnalysisBackend>,
}

impl DeletionAnalyzer {
    pub fn new(builder: ContextBuilder, backend: Box<dyn AnalysisBackend>) -> Self {
        Self { builder, backend }
    }

    pub fn heuristic(budget: ContextBudget) -> Self {
        Self::new(
            ContextBuilder::new(budget),
            Box::new(HeuristicBackend::default()),
        )
    }

    pub fn with_llm(budget: ContextBudget, client: Box<dyn LlmClient>) -> Self {
        Self::new(
            ContextBuilder::new(budget),
            Box::new(LlmBackend::new(client)),
        )
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        match config.backend {
            Backend::Heuristic => Ok(Self::heuristic(config.budget)),
            Backend::Anthropic => Ok(Self::with_llm(config.budget, llm::create_client(config)?)),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Assemble the prompt context for `request` without running a backend.
    pub fn build_context(&self, request: &DeletionAnalysisRequest) -> Result<AiAnalysisContext> {
        self.builder
            .build(
                &request.codebase,
                &request.deleted_content,
                &request.context,
            )
            .map_err(|e| match e {
                Error::Context(_) => e,
                other => Error::Context(other.to_string()),
            })
    }

    pub async fn analyze_deletions(
        &self,
        request: &DeletionAnalysisRequest,
        cancel: CancellationToken,
    ) -> Result<DeletionAnalysisResult> {
        let started = Instant::now();
        let context = self.build_context(request)?;
        debug!(
            context_chars = context.len(),
            codebase_chars = context.codebase_context.len(),
            deleted_blocks = request.deleted_content.len(),
            "analysis context built"
        );

        let result = self
            .backend
            .analyze(request, &context, cancel)
            .await
            .map_err(|e| Error::backend(self.backend.name(), e))?;

        debug!(
            backend = self.backend.name(),
            orphaned = result.orphaned_references.len(),
            safe = result.safe_deletions.len(),
            confidence = result.confidence,
            elapsed = ?started.elapsed(),
            "deletion analysis finished"
        );
        Ok(result)
    }
}

fn suggestion(entity_type: EntityType, name: &str, file: &str) -> String {
    match entity_type {
        EntityType::Function => format!(
            "`{name}` is deleted but still called in {file}; restore the function or update the call to its replacement"
        ),
        t if t.is_type() => format!(
            "`{name}` is deleted but {file} still uses the type; restore the type or migrate the usage to its replacement"
        ),
        _ => format!(
            "`{name}` is deleted but still referenced in {file}; restore the declaration or replace the reference"
        ),
    }
}

fn orphan_warnings(orphaned: &[OrphanedReference]) -> Vec<Warning> {
    let mut order: Vec<&str> = Vec::new();
    let mut files: HashMap<&str, Vec<&str>> = HashMap::new();

    for reference in orphaned {
        let entry = files.entry(reference.deleted_entity.as_str()).or_default();
        if entry.is_empty() {
            order.push(reference.deleted_entity.as_str());
        }
        entry.push(reference.referencing_file.as_str());
    }

    order
        .into_iter()
        .map(|name| {
            let referencing = &files[name];
            Warning {
                warning_type: "orphaned_reference".into(),
                message: format!(
                    "`{name}` is deleted but still referenced in {} file(s): {}",
                    referencing.len(),
                    referencing.join(", ")
                ),
                severity: Severity::Warning,
            }
        })
        .collect()
}

fn heuristic_confidence(
    context_chars: usize,
    total_files: usize,
    project_type: Option<ProjectType>,
    references: usize,
) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    if context_chars > LARGE_CONTEXT_CHARS {
        confidence += 0.1;
    }
    if total_files > MANY_FILES {
        confidence += 0.1;
    }
    // Node projects are the javascript/typescript case
    if matches!(project_type, Some(ProjectType::Go | ProjectType::Node)) {
        confidence += 0.1;
    }
    if references == 0 {
        confidence += 0.1;
    } else if references > MANY_REFERENCES {
        confidence -= 0.1;
    }

    ((confidence * 100.0).round() / 100.0).clamp(0.1, 1.0)
}
