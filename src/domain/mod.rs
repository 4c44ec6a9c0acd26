// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

mod analysis;
mod codebase;
mod context;
mod diff;
mod entity;
mod language;

pub use analysis::*;
pub use codebase::*;
pub use context::*;
pub use diff::*;
pub use entity::*;
pub use language::*;
