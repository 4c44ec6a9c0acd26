// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

mod helpers;

use dangle::domain::{ChangeType, Language};
use dangle::services::deleted::extract_deleted_content;
use dangle::services::diff_parser::DiffParser;
use helpers::CALCULATE_SUM_DIFF;

#[test]
fn pure_removal_hunk_is_a_deletion() {
    let diff = DiffParser::parse(CALCULATE_SUM_DIFF).unwrap();
    let deleted = extract_deleted_content(&diff);

    assert_eq!(deleted.len(), 1);
    let code = &deleted[0];
    assert_eq!(code.file, "math.go");
    assert_eq!(code.language, Language::Go);
    assert_eq!(code.change_type, ChangeType::Deletion);
    assert_eq!((code.start_line, code.end_line), (3, 6));
    assert_eq!(
        code.content,
        "func CalculateSum(a, b int) int {\n\treturn a + b\n}\n"
    );
}

#[test]
fn hunk_with_additions_is_a_modification() {
    let input = "\
diff --git a/lib.rs b/lib.rs
--- a/lib.rs
+++ b/lib.rs
@@ -4,3 +4,3 @@
 use std::fmt;
-pub fn old_name() {}
+pub fn new_name() {}
 pub fn keep() {}
";
    let deleted = extract_deleted_content(&DiffParser::parse(input).unwrap());
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].change_type, ChangeType::Modification);
    assert_eq!(deleted[0].content, "pub fn old_name() {}");
    assert_eq!((deleted[0].start_line, deleted[0].end_line), (5, 5));
}

#[test]
fn one_entry_per_hunk_with_removals() {
    let input = "\
diff --git a/app.py b/app.py
--- a/app.py
+++ b/app.py
@@ -1,2 +1,3 @@
 import os
+import sys
 x = 1
@@ -10,3 +11,1 @@
-def first():
-    pass
 y = 2
@@ -20,2 +19,1 @@
 z = 3
-def second(): pass
";
    let deleted = extract_deleted_content(&DiffParser::parse(input).unwrap());
    assert_eq!(deleted.len(), 2);
    assert_eq!(deleted[0].content, "def first():\n    pass");
    assert_eq!((deleted[0].start_line, deleted[0].end_line), (10, 11));
    assert_eq!(deleted[1].content, "def second(): pass");
    assert_eq!(deleted[1].start_line, 21);
}

#[test]
fn deleted_file_is_a_single_entry() {
    let input = "\
diff --git a/util.js b/util.js
deleted file mode 100644
--- a/util.js
+++ /dev/null
@@ -1,3 +0,0 @@
-export function helper() {
-  return 1;
-}
";
    let deleted = extract_deleted_content(&DiffParser::parse(input).unwrap());
    assert_eq!(deleted.len(), 1);
    assert_eq!(deleted[0].change_type, ChangeType::Deletion);
    assert_eq!(deleted[0].language, Language::JavaScript);
    assert_eq!((deleted[0].start_line, deleted[0].end_line), (1, 3));
    assert_eq!(deleted[0].content.lines().count(), 3);
}

#[test]
fn additions_only_yield_nothing() {
    let input = "\
diff --git a/new.go b/new.go
new file mode 100644
--- /dev/null
+++ b/new.go
@@ -0,0 +1,1 @@
+package main
";
    assert!(extract_deleted_content(&DiffParser::parse(input).unwrap()).is_empty());
}
