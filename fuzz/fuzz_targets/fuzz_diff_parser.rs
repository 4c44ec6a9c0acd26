// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use dangle::services::context_extractor::ContextExtractor;
use dangle::services::deleted::extract_deleted_content;
use dangle::services::diff_parser::DiffParser;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(diff) = DiffParser::parse(input) else {
        return;
    };

    let removed: usize = diff.files.iter().map(|f| f.deletions).sum();
    assert_eq!(removed, diff.total_removed);

    let contextual = ContextExtractor::new(3).extract(&diff);
    let _ = ContextExtractor::render(&contextual);
    let _ = extract_deleted_content(&diff);
});
