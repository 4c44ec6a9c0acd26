// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub mod anthropic;

use crate::config::{Backend, Config};
use crate::domain::{AiAnalysisContext, DeletionAnalysisResult};
use crate::error::{Error, Result};

/// A model-backed deletion analyzer.
///
/// Implementations must honor `cancel`, and on success return a result whose
/// confidence is within `[0, 1]` and whose orphaned references each carry an
/// entity name, a file and at least one line.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn analyze_deletions(
        &self,
        context: &AiAnalysisContext,
        cancel: CancellationToken,
    ) -> Result<DeletionAnalysisResult>;

    fn name(&self) -> &str;
}

pub fn create_client(config: &Config) -> Result<Box<dyn LlmClient>> {
    match config.backend {
        Backend::Anthropic => Ok(Box::new(anthropic::AnthropicClient::new(config)?)),
        Backend::Heuristic => Err(Error::Config(
            "the heuristic backend does not use an LLM client".into(),
        )),
    }
}
