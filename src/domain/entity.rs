// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use serde::Serialize;

use super::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityType {
    Function,
    Struct,
    Interface,
    TypeAlias,
    Constant,
    Variable,
}

impl EntityType {
    pub fn is_type(&self) -> bool {
        matches!(self, Self::Struct | Self::Interface | Self::TypeAlias)
    }
}

/// A declaration recognized in source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeEntity {
    pub entity_type: EntityType,
    pub name: String,
    pub file: String,
    pub language: Language,
    pub line_number: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReferenceKind {
    Call,
    TypeUsage,
}

/// One textual use of an entity name on a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReference {
    pub entity: String,
    pub file: String,
    pub line_number: usize,
    pub kind: ReferenceKind,
    pub line: String,
}
