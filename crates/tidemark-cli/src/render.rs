//! Statement rendering for maintenance directives.
//!
//! The core emits structured directives; turning them into engine statements
//! is a presentation concern that lives here, next to the operator who will
//! paste them into a session.

use tidemark_core::directive::{DirectiveKind, MaintenanceDirective};

/// Render a directive list as an executable script.
pub fn render_script(directives: &[MaintenanceDirective]) -> String {
    directives
        .iter()
        .map(statement)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render one directive as an engine statement.
pub fn statement(directive: &MaintenanceDirective) -> String {
    let index = directive.index.as_deref().unwrap_or_default();

    match directive.kind {
        DirectiveKind::Reorganize => format!(
            "ALTER INDEX [{}] ON {} REORGANIZE PARTITION = {};",
            index,
            directive.table,
            directive.partition.unwrap_or_default()
        ),
        DirectiveKind::Rebuild => {
            let partition = directive.partition.unwrap_or_default();
            match directive.compression {
                Some(compression) => format!(
                    "ALTER INDEX [{}] ON {} REBUILD PARTITION = {} WITH (DATA_COMPRESSION = {});",
                    index, directive.table, partition, compression
                ),
                None => format!(
                    "ALTER INDEX [{}] ON {} REBUILD PARTITION = {};",
                    index, directive.table, partition
                ),
            }
        }
        DirectiveKind::DropIndex => {
            format!("DROP INDEX [{}] ON {};", index, directive.table)
        }
        DirectiveKind::CreateIndex => {
            let mut stmt = format!("CREATE NONCLUSTERED INDEX [{}] ON {}", index, directive.table);

            if let Some(definition) = &directive.definition {
                stmt.push_str(&format!(" ({})", bracketed(&definition.key_columns)));
                if !definition.included_columns.is_empty() {
                    stmt.push_str(&format!(
                        " INCLUDE ({})",
                        bracketed(&definition.included_columns)
                    ));
                }
            }

            if let Some(predicate) = &directive.new_filter_predicate {
                stmt.push_str(&format!(" WHERE {}", predicate));
            }

            stmt.push(';');
            stmt
        }
        DirectiveKind::UpdateStatistics => format!("UPDATE STATISTICS {};", directive.table),
    }
}

fn bracketed(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("[{}]", c))
        .collect::<Vec<_>>()
        .join(", ")
}
