// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
// SPDX-License-Identifier: GPL-3.0-only

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::debug;

use crate::error::{Error, Result};

/// Produces unified diffs by shelling out to `git`.
pub struct GitService {
    work_dir: PathBuf,
}

impl GitService {
    /// Fails unless `root` is inside a git work tree.
    pub async fn discover(root: &Path) -> Result<Self> {
        let service = Self {
            work_dir: root.to_path_buf(),
        };
        let inside = service.git(&["rev-parse", "--is-inside-work-tree"]).await?;
        if inside.trim() != "true" {
            return Err(Error::Git(format!(
                "{} is not inside a git work tree",
                root.display()
            )));
        }
        Ok(service)
    }

    /// Diff the working tree against `base`, with paths relative to the work dir.
    pub async fn diff(&self, base: &str, context_lines: usize) -> Result<String> {
        let unified = format!("--unified={context_lines}");
        // --relative keeps paths aligned with the flattened workspace root
        let diff = self
            .git(&[
                "diff",
                "--no-ext-diff",
                "--no-color",
                "--relative",
                &unified,
                base,
                "--",
            ])
            .await?;
        debug!(base, bytes = diff.len(), "git diff captured");
        Ok(diff)
    }

    async fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.work_dir)
            .output()
            .await
            .map_err(|e| Error::Git(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Git(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
