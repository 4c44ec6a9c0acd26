// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

#![no_main]

use dangle::services::sanitizer::parse_analysis_response;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(raw) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(result) = parse_analysis_response(raw) {
        assert!((0.0..=1.0).contains(&result.confidence));
        assert!(result.orphaned_references.iter().all(|r| r.is_well_formed()));
    }
});
