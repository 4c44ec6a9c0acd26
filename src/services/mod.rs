// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

pub mod context;
pub mod context_extractor;
pub mod deleted;
pub mod deletion;
pub mod diff_parser;
pub mod entities;
pub mod flattener;
pub mod git;
pub mod llm;
pub mod report;
pub mod sanitizer;
