// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};

use dangle::domain::{
    ChangeType, DeletedCode, FileContent, FlattenedCodebase, Language, ProjectInfo, ProjectType,
};

/// Two-file Go change: `CalculateSum` is removed from math.go while
/// main.go keeps calling it.
#[allow(dead_code)]
pub const CALCULATE_SUM_DIFF: &str = "\
diff --git a/math.go b/math.go
index 3b18e51..a1c2d3f 100644
--- a/math.go
+++ b/math.go
@@ -1,9 +1,5 @@ package math
 package math

-func CalculateSum(a, b int) int {
-\treturn a + b
-}
-
 func Multiply(a, b int) int {
 \treturn a * b
 }
";

#[allow(dead_code)]
pub const MAIN_GO: &str = "\
package main

import \"fmt\"

func main() {
\tresult := CalculateSum(1, 2)
\tfmt.Println(result)
}
";

/// Create an in-memory source file
#[allow(dead_code)]
pub fn make_file(relative_path: &str, content: &str) -> FileContent {
    FileContent::new(
        PathBuf::from(relative_path),
        relative_path.to_string(),
        content.to_string(),
    )
}

/// Create a codebase from files with an optional project type
#[allow(dead_code)]
pub fn make_codebase(
    files: Vec<FileContent>,
    project_type: Option<ProjectType>,
) -> FlattenedCodebase {
    FlattenedCodebase::from_files(
        files,
        ProjectInfo {
            name: "fixture".into(),
            project_type,
            ..ProjectInfo::default()
        },
    )
}

/// Create a DeletedCode entry spanning `start..=end` of `file`
#[allow(dead_code)]
pub fn make_deleted(file: &str, content: &str, start_line: usize, end_line: usize) -> DeletedCode {
    DeletedCode {
        file: file.to_string(),
        content: content.to_string(),
        start_line,
        end_line,
        language: Language::from_path(file),
        change_type: ChangeType::Deletion,
    }
}

/// Write `files` (relative path, content) under `root`, creating parents
#[allow(dead_code)]
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, content) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}
