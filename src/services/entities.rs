// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

//! Line-anchored declaration and reference scanning.
//!
//! This is a textual heuristic, not a parser: shadowed or duplicated names
//! over-match and aliased imports under-match. [`EntityParser`] and
//! [`ReferenceScanner`] are the seams for a language-accurate replacement.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{CodeEntity, EntityReference, EntityType, Language, ReferenceKind};

pub trait EntityParser: Send + Sync {
    /// Declarations found in `content`, in source order.
    fn parse_entities(&self, content: &str, filename: &str) -> Vec<CodeEntity>;
}

pub trait ReferenceScanner: Send + Sync {
    /// Uses of any of `entities` in `content`, at most one per entity per line.
    fn find_references(
        &self,
        content: &str,
        filename: &str,
        entities: &[CodeEntity],
    ) -> Vec<EntityReference>;
}

struct LinePattern {
    regex: Regex,
    entity_type: EntityType,
}

impl LinePattern {
    fn new(pattern: &str, entity_type: EntityType) -> Self {
        Self {
            regex: Regex::new(pattern).unwrap(),
            entity_type,
        }
    }
}

struct GoPatterns {
    func: Regex,
    composite_type: Regex,
    any_type: Regex,
    value: Regex,
    block_open: Regex,
    block_names: Regex,
    member_composite: Regex,
}

static GO: LazyLock<GoPatterns> = LazyLock::new(|| GoPatterns {
    // `func Name(`, `func (r *Recv) Name(`, `func Name[T any](`
    func: Regex::new(r"^\s*func\s+(?:\([^)]*\)\s*)?([A-Za-z_]\w*)\s*(?:\[[^\]]*\])?\s*\(")
        .unwrap(),
    composite_type: Regex::new(
        r"^\s*type\s+([A-Za-z_]\w*)(?:\s*\[[^\]]*\])?\s+(struct|interface)\b",
    )
    .unwrap(),
    any_type: Regex::new(r"^\s*type\s+([A-Za-z_]\w*)\b").unwrap(),
    value: Regex::new(r"^\s*(const|var)\s+([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)").unwrap(),
    // `var (`, optionally followed by a trailing comment
    block_open: Regex::new(r"^\s*(const|var|type)\s*\(\s*(?://.*|/\*.*)?$").unwrap(),
    block_names: Regex::new(r"^\s*([A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)").unwrap(),
    member_composite: Regex::new(r"^\s*[A-Za-z_]\w*(?:\s*\[[^\]]*\])?\s+(struct|interface)\b")
        .unwrap(),
});

const RUST_VIS: &str = r"^\s*(?:pub(?:\([^)]*\))?\s+)?";

static RUST: LazyLock<Vec<LinePattern>> = LazyLock::new(|| {
    vec![
        LinePattern::new(
            &format!(
                r#"{RUST_VIS}(?:(?:const|async|unsafe|extern\s+"[^"]*")\s+)*fn\s+([A-Za-z_]\w*)"#
            ),
            EntityType::Function,
        ),
        LinePattern::new(
            &format!(r"{RUST_VIS}(?:struct|enum|union)\s+([A-Za-z_]\w*)"),
            EntityType::Struct,
        ),
        LinePattern::new(
            &format!(r"{RUST_VIS}(?:unsafe\s+)?trait\s+([A-Za-z_]\w*)"),
            EntityType::Interface,
        ),
        LinePattern::new(
            &format!(r"{RUST_VIS}type\s+([A-Za-z_]\w*)"),
            EntityType::TypeAlias,
        ),
        LinePattern::new(
            &format!(r"{RUST_VIS}const\s+([A-Za-z_]\w*)\s*:"),
            EntityType::Constant,
        ),
        LinePattern::new(
            &format!(r"{RUST_VIS}static\s+(?:mut\s+)?([A-Za-z_]\w*)\s*:"),
            EntityType::Variable,
        ),
    ]
});

static PYTHON: LazyLock<Vec<LinePattern>> = LazyLock::new(|| {
    vec![
        LinePattern::new(
            r"^\s*(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(",
            EntityType::Function,
        ),
        LinePattern::new(r"^\s*class\s+([A-Za-z_]\w*)", EntityType::Struct),
        // Module-level UPPER_CASE assignments
        LinePattern::new(
            r"^([A-Z][A-Z0-9_]*)\s*(?::[^=]+)?=[^=]",
            EntityType::Constant,
        ),
    ]
});

const JS_EXPORT: &str = r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?";
const JS_IDENT: &str = r"([A-Za-z_$][\w$]*)";

static SCRIPT: LazyLock<Vec<LinePattern>> = LazyLock::new(|| {
    vec![
        LinePattern::new(
            &format!(r"{JS_EXPORT}(?:async\s+)?function\s*\*?\s*{JS_IDENT}"),
            EntityType::Function,
        ),
        LinePattern::new(
            &format!(r"{JS_EXPORT}(?:abstract\s+)?class\s+{JS_IDENT}"),
            EntityType::Struct,
        ),
        LinePattern::new(
            &format!(r"{JS_EXPORT}interface\s+{JS_IDENT}"),
            EntityType::Interface,
        ),
        LinePattern::new(
            &format!(r"{JS_EXPORT}type\s+{JS_IDENT}\s*(?:<[^>]*>)?\s*="),
            EntityType::TypeAlias,
        ),
        LinePattern::new(
            &format!(r"{JS_EXPORT}enum\s+{JS_IDENT}"),
            EntityType::TypeAlias,
        ),
        // Arrow functions and function expressions bound to a name
        LinePattern::new(
            &format!(
                r"{JS_EXPORT}(?:const|let|var)\s+{JS_IDENT}\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]+)?=>|[A-Za-z_$][\w$]*\s*=>)"
            ),
            EntityType::Function,
        ),
        LinePattern::new(
            &format!(r"{JS_EXPORT}const\s+{JS_IDENT}"),
            EntityType::Constant,
        ),
        LinePattern::new(
            &format!(r"{JS_EXPORT}(?:let|var)\s+{JS_IDENT}"),
            EntityType::Variable,
        ),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    Go,
    Rust,
    Python,
    Script,
}

impl Dialect {
    fn of(language: Language) -> Self {
        match language {
            Language::Rust => Self::Rust,
            Language::Python => Self::Python,
            Language::JavaScript | Language::TypeScript => Self::Script,
            // Go-style declarations double as the default
            _ => Self::Go,
        }
    }

    fn is_comment(&self, trimmed: &str) -> bool {
        match self {
            Self::Python => trimmed.starts_with('#'),
            _ => trimmed.starts_with("//") || trimmed.starts_with("/*"),
        }
    }

    fn is_ident_char(&self, c: char) -> bool {
        c.is_alphanumeric() || c == '_' || (*self == Self::Script && c == '$')
    }
}

/// Regex-per-line implementation of both [`EntityParser`] and [`ReferenceScanner`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternScanner;

impl PatternScanner {
    pub fn new() -> Self {
        Self
    }

    fn parse_go(content: &str, filename: &str, language: Language) -> Vec<CodeEntity> {
        let mut entities = Vec::new();
        // Open `const (`/`var (`/`type (` group and the brace depth inside it
        let mut block: Option<(&str, i32)> = None;

        for (idx, line) in content.lines().enumerate() {
            let line_number = idx + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || Dialect::Go.is_comment(trimmed) {
                continue;
            }

            if let Some((keyword, depth)) = block.as_mut() {
                if *depth == 0 && trimmed.starts_with(')') {
                    block = None;
                    continue;
                }
                if *depth == 0
                    && let Some(caps) = GO.block_names.captures(line)
                {
                    let entity_type = match *keyword {
                        "const" => EntityType::Constant,
                        "var" => EntityType::Variable,
                        _ => match GO.member_composite.captures(line) {
                            Some(kind) => composite_kind(&kind[1]),
                            None => EntityType::TypeAlias,
                        },
                    };
                    let names: Vec<&str> = if *keyword == "type" {
                        caps[1].split(',').take(1).collect()
                    } else {
                        caps[1].split(',').collect()
                    };
                    for name in names {
                        entities.push(make_entity(
                            entity_type,
                            name.trim(),
                            filename,
                            language,
                            line_number,
                        ));
                    }
                }
                *depth = (*depth + brace_delta(trimmed)).max(0);
                continue;
            }

            if let Some(caps) = GO.block_open.captures(line) {
                let keyword = match &caps[1] {
                    "const" => "const",
                    "var" => "var",
                    _ => "type",
                };
                block = Some((keyword, 0));
                continue;
            }

            if let Some(caps) = GO.func.captures(line) {
                entities.push(make_entity(
                    EntityType::Function,
                    &caps[1],
                    filename,
                    language,
                    line_number,
                ));
            } else if let Some(caps) = GO.composite_type.captures(line) {
                entities.push(make_entity(
                    composite_kind(&caps[2]),
                    &caps[1],
                    filename,
                    language,
                    line_number,
                ));
            } else if let Some(caps) = GO.any_type.captures(line) {
                entities.push(make_entity(
                    EntityType::TypeAlias,
                    &caps[1],
                    filename,
                    language,
                    line_number,
                ));
            } else if let Some(caps) = GO.value.captures(line) {
                let entity_type = if &caps[1] == "const" {
                    EntityType::Constant
                } else {
                    EntityType::Variable
                };
                for name in caps[2].split(',') {
                    entities.push(make_entity(
                        entity_type,
                        name.trim(),
                        filename,
                        language,
                        line_number,
                    ));
                }
            }
        }

        entities
    }

    fn parse_with(
        patterns: &[LinePattern],
        dialect: Dialect,
        content: &str,
        filename: &str,
        language: Language,
    ) -> Vec<CodeEntity> {
        let mut entities = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || dialect.is_comment(trimmed) {
                continue;
            }

            if let Some((pattern, caps)) = patterns
                .iter()
                .find_map(|p| p.regex.captures(line).map(|c| (p, c)))
            {
                entities.push(make_entity(
                    pattern.entity_type,
                    &caps[1],
                    filename,
                    language,
                    idx + 1,
                ));
            }
        }

        entities
    }
}

impl EntityParser for PatternScanner {
    fn parse_entities(&self, content: &str, filename: &str) -> Vec<CodeEntity> {
        let language = Language::from_path(filename);
        match Dialect::of(language) {
            Dialect::Go => Self::parse_go(content, filename, language),
            Dialect::Rust => Self::parse_with(&RUST, Dialect::Rust, content, filename, language),
            Dialect::Python => {
                Self::parse_with(&PYTHON, Dialect::Python, content, filename, language)
            }
            Dialect::Script => {
                Self::parse_with(&SCRIPT, Dialect::Script, content, filename, language)
            }
        }
    }
}

impl ReferenceScanner for PatternScanner {
    fn find_references(
        &self,
        content: &str,
        filename: &str,
        entities: &[CodeEntity],
    ) -> Vec<EntityReference> {
        let dialect = Dialect::of(Language::from_path(filename));

        let mut seen = HashSet::new();
        let names: Vec<&str> = entities
            .iter()
            .map(|e| e.name.as_str())
            .filter(|n| !n.is_empty() && seen.insert(*n))
            .collect();

        let mut references = Vec::new();
        if names.is_empty() {
            return references;
        }

        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || dialect.is_comment(trimmed) {
                continue;
            }

            for name in &names {
                if let Some(kind) = classify_occurrences(line, name, dialect) {
                    references.push(EntityReference {
                        entity: name.to_string(),
                        file: filename.to_string(),
                        line_number: idx + 1,
                        kind,
                        line: trimmed.to_string(),
                    });
                }
            }
        }

        references
    }
}

/// `Call` if any word-bounded occurrence of `name` is followed by `(`,
/// `TypeUsage` for any other occurrence, `None` when absent.
fn classify_occurrences(line: &str, name: &str, dialect: Dialect) -> Option<ReferenceKind> {
    let mut found = None;

    for (pos, _) in line.match_indices(name) {
        let before = line[..pos].chars().next_back();
        let after = &line[pos + name.len()..];

        if before.is_some_and(|c| dialect.is_ident_char(c))
            || after.chars().next().is_some_and(|c| dialect.is_ident_char(c))
        {
            continue;
        }

        if after.trim_start().starts_with('(') {
            return Some(ReferenceKind::Call);
        }
        found = Some(ReferenceKind::TypeUsage);
    }

    found
}

fn composite_kind(keyword: &str) -> EntityType {
    if keyword == "interface" {
        EntityType::Interface
    } else {
        EntityType::Struct
    }
}

fn brace_delta(line: &str) -> i32 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

fn make_entity(
    entity_type: EntityType,
    name: &str,
    filename: &str,
    language: Language,
    line_number: usize,
) -> CodeEntity {
    CodeEntity {
        entity_type,
        name: name.to_string(),
        file: filename.to_string(),
        language,
        line_number,
    }
}
