//! Maintenance directives.
//!
//! The advisor's output is a list of structured commands, never statement
//! text: a collaborator owns translation into engine-native statements and
//! their execution. Directives are produced fresh on every run and are not
//! persisted by the core.

use serde::{Deserialize, Serialize};

use crate::catalog::CompressionMode;

/// Kind of maintenance a directive requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    /// Reorganize one partition of an index in place
    Reorganize,
    /// Rebuild one partition of an index
    Rebuild,
    /// Drop an index
    DropIndex,
    /// Create an index
    CreateIndex,
    /// Refresh optimizer statistics for the whole table
    UpdateStatistics,
}

impl std::fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectiveKind::Reorganize => write!(f, "reorganize"),
            DirectiveKind::Rebuild => write!(f, "rebuild"),
            DirectiveKind::DropIndex => write!(f, "drop_index"),
            DirectiveKind::CreateIndex => write!(f, "create_index"),
            DirectiveKind::UpdateStatistics => write!(f, "update_statistics"),
        }
    }
}

/// Column layout carried by create directives so a collaborator can render
/// the full index definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Key columns in key order
    pub key_columns: Vec<String>,
    /// Included columns
    #[serde(default)]
    pub included_columns: Vec<String>,
}

/// One maintenance command for a collaborator to execute or log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceDirective {
    /// What to do
    pub kind: DirectiveKind,
    /// Target table
    pub table: String,
    /// Target index; absent for table-level directives
    #[serde(default)]
    pub index: Option<String>,
    /// Target partition for partition-scoped maintenance
    #[serde(default)]
    pub partition: Option<u32>,
    /// Compression to apply during a rebuild
    #[serde(default)]
    pub compression: Option<CompressionMode>,
    /// Filter predicate for a created index
    #[serde(default)]
    pub new_filter_predicate: Option<String>,
    /// Column layout for a created index
    #[serde(default)]
    pub definition: Option<IndexDefinition>,
    /// Pages the directive is expected to touch
    #[serde(default)]
    pub estimated_pages: Option<u64>,
}

impl MaintenanceDirective {
    /// Reorganize one partition of an index.
    pub fn reorganize(table: &str, index: &str, partition: u32, pages: u64) -> Self {
        Self {
            kind: DirectiveKind::Reorganize,
            table: table.to_string(),
            index: Some(index.to_string()),
            partition: Some(partition),
            compression: None,
            new_filter_predicate: None,
            definition: None,
            estimated_pages: Some(pages),
        }
    }

    /// Rebuild one partition of an index, optionally changing compression.
    pub fn rebuild(
        table: &str,
        index: &str,
        partition: u32,
        compression: Option<CompressionMode>,
        pages: u64,
    ) -> Self {
        Self {
            kind: DirectiveKind::Rebuild,
            table: table.to_string(),
            index: Some(index.to_string()),
            partition: Some(partition),
            compression,
            new_filter_predicate: None,
            definition: None,
            estimated_pages: Some(pages),
        }
    }

    /// Drop an index.
    pub fn drop_index(table: &str, index: &str) -> Self {
        Self {
            kind: DirectiveKind::DropIndex,
            table: table.to_string(),
            index: Some(index.to_string()),
            partition: None,
            compression: None,
            new_filter_predicate: None,
            definition: None,
            estimated_pages: None,
        }
    }

    /// Create a filtered index with the given layout and predicate.
    pub fn create_index(
        table: &str,
        index: &str,
        definition: IndexDefinition,
        predicate: &str,
    ) -> Self {
        Self {
            kind: DirectiveKind::CreateIndex,
            table: table.to_string(),
            index: Some(index.to_string()),
            partition: None,
            compression: None,
            new_filter_predicate: Some(predicate.to_string()),
            definition: Some(definition),
            estimated_pages: None,
        }
    }

    /// Refresh optimizer statistics for a table.
    pub fn update_statistics(table: &str) -> Self {
        Self {
            kind: DirectiveKind::UpdateStatistics,
            table: table.to_string(),
            index: None,
            partition: None,
            compression: None,
            new_filter_predicate: None,
            definition: None,
            estimated_pages: None,
        }
    }
}
