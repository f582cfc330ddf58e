use crate::graph::GraphStats;
use tabled::{settings::Style, Table, Tabled};

/// One analyzed file in the `stats` table
#[derive(Tabled)]
pub struct FileStatsRow {
    #[tabled(rename = "File")]
    pub file: String,
    #[tabled(rename = "Scopes")]
    pub scopes: usize,
    #[tabled(rename = "Declarations")]
    pub declarations: usize,
    #[tabled(rename = "References")]
    pub references: usize,
    #[tabled(rename = "Resolved")]
    pub resolved: usize,
    #[tabled(rename = "Unresolved")]
    pub unresolved: usize,
    #[tabled(rename = "Duplicates")]
    pub duplicates: usize,
    #[tabled(rename = "Max hops")]
    pub max_hops: usize,
}

impl FileStatsRow {
    pub fn new(file: impl Into<String>, stats: &GraphStats) -> Self {
        Self {
            file: file.into(),
            scopes: stats.scopes,
            declarations: stats.declarations,
            references: stats.references,
            resolved: stats.resolved,
            unresolved: stats.unresolved,
            duplicates: stats.duplicates,
            max_hops: stats.max_hops,
        }
    }
}

pub fn stats_table(rows: &[FileStatsRow]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    Table::new(rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_table() {
        let stats = GraphStats {
            scopes: 3,
            declarations: 4,
            references: 5,
            resolved: 4,
            member_edges: 1,
            unresolved: 1,
            duplicates: 0,
            max_hops: 2,
        };
        let table = stats_table(&[FileStatsRow::new("src/app.js", &stats)]);
        assert!(table.contains("Declarations"));
        assert!(table.contains("src/app.js"));
        assert!(stats_table(&[]).is_empty());
    }
}
