// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use dangle::services::entities::{EntityParser, PatternScanner, ReferenceScanner};
use libfuzzer_sys::fuzz_target;

const FILENAMES: [&str; 5] = ["a.go", "a.rs", "a.py", "a.ts", "a.txt"];

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(content) = std::str::from_utf8(rest) else {
        return;
    };
    let filename = FILENAMES[selector as usize % FILENAMES.len()];

    let scanner = PatternScanner::new();
    let entities = scanner.parse_entities(content, filename);
    for reference in scanner.find_references(content, filename, &entities) {
        assert!(reference.line_number >= 1);
    }
});
