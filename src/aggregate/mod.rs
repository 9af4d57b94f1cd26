//! Accumulation of selected rows into named groups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{FieldRole, Group, GroupedReport, Table};
use crate::resolve::SynonymTable;

/// Where a row's group name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingStrategy {
    /// The folder (or other location) the source file was listed under.
    #[default]
    SourceLocation,
    /// The value of the GROUP column inside the data; rows without one fall
    /// back to the source location.
    FieldValue,
}

/// Builds a [`GroupedReport`] across one run. Groups keep the order in which
/// they were first seen and are never dropped, even when they end up empty.
///
/// Group names that differ only in case or surrounding whitespace share one
/// group, named by its first spelling.
#[derive(Debug)]
pub struct Aggregator<'a> {
    strategy: GroupingStrategy,
    synonyms: &'a SynonymTable,
    groups: Vec<Group>,
    index: HashMap<String, usize>,
}

impl<'a> Aggregator<'a> {
    pub fn new(strategy: GroupingStrategy, synonyms: &'a SynonymTable) -> Self {
        Self {
            strategy,
            synonyms,
            groups: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Makes `name` present in the report, with no rows if none arrive.
    pub fn register(&mut self, name: &str) -> usize {
        let key = group_key(name);
        if let Some(&idx) = self.index.get(&key) {
            return idx;
        }
        let idx = self.groups.len();
        self.groups.push(Group {
            name: name.trim().to_string(),
            records: Vec::new(),
        });
        self.index.insert(key, idx);
        idx
    }

    /// Appends the rows of `table`, which was loaded from `source_group`.
    pub fn add(&mut self, source_group: &str, table: Table) {
        match self.strategy {
            GroupingStrategy::SourceLocation => {
                let idx = self.register(source_group);
                let records = table.into_records();
                debug!(group = source_group, rows = records.len(), "rows aggregated");
                self.groups[idx].records.extend(records);
            }
            GroupingStrategy::FieldValue => {
                let group_column = self
                    .synonyms
                    .resolve_role(FieldRole::Group, table.columns().iter().map(String::as_str));
                let Some(group_column) = group_column else {
                    debug!(group = source_group, "no group column, using source location");
                    let idx = self.register(source_group);
                    self.groups[idx].records.extend(table.into_records());
                    return;
                };

                for record in table.into_records() {
                    let name = record
                        .get(&group_column)
                        .map(str::trim)
                        .filter(|value| !value.is_empty())
                        .unwrap_or(source_group)
                        .to_string();
                    let idx = self.register(&name);
                    self.groups[idx].records.push(record);
                }
            }
        }
    }

    pub fn finish(self) -> GroupedReport {
        GroupedReport::new(self.groups)
    }
}

fn group_key(name: &str) -> String {
    name.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RawTable;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::from_raw(RawTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        })
    }

    #[test]
    fn source_location_keeps_empty_groups_and_order() {
        let synonyms = SynonymTable::default();
        let mut aggregator = Aggregator::new(GroupingStrategy::SourceLocation, &synonyms);
        aggregator.add("north", table(&["PARTY"], &[&["a"], &["b"]]));
        aggregator.add("south", table(&["PARTY"], &[]));
        aggregator.add("north", table(&["PARTY"], &[&["c"]]));

        let report = aggregator.finish();
        let names: Vec<_> = report.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["north", "south"]);
        let parties: Vec<_> = report.groups()[0]
            .records
            .iter()
            .filter_map(|r| r.get("PARTY"))
            .collect();
        assert_eq!(parties, vec!["a", "b", "c"]);
        assert!(report.groups()[1].records.is_empty());
    }

    #[test]
    fn field_value_splits_rows_and_falls_back_on_blank() {
        let synonyms = SynonymTable::default();
        let mut aggregator = Aggregator::new(GroupingStrategy::FieldValue, &synonyms);
        aggregator.add(
            "incoming",
            table(
                &["Godown ", "PARTY"],
                &[&["REDHILLS", "a"], &[" ", "b"], &["SR GLASS", "c"], &["REDHILLS", "d"]],
            ),
        );

        let report = aggregator.finish();
        let names: Vec<_> = report.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["REDHILLS", "incoming", "SR GLASS"]);
        assert_eq!(report.group("REDHILLS").map(|g| g.records.len()), Some(2));
    }

    #[test]
    fn group_names_differing_in_case_share_a_group() {
        let synonyms = SynonymTable::default();
        let mut aggregator = Aggregator::new(GroupingStrategy::FieldValue, &synonyms);
        aggregator.register("Redhills");
        aggregator.add(
            "incoming",
            table(
                &["GODOWN", "PARTY"],
                &[&["REDHILLS", "a"], &[" redhills ", "b"], &["SR Glass", "c"]],
            ),
        );

        let report = aggregator.finish();
        let names: Vec<_> = report.groups().iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Redhills", "SR Glass"]);
        assert_eq!(report.group("Redhills").map(|g| g.records.len()), Some(2));
    }
}
