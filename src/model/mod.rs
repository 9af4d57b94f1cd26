use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Table exactly as a format reader produced it: header labels as written in
/// the file and one positional vector of cell text per data row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// A source table with trimmed, unique column labels.
///
/// Every row holds exactly one value per column, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Normalizes a raw table: labels are trimmed, blank labels become
    /// `Unnamed: {index}` and repeated labels get `.1`, `.2`, ... suffixes.
    /// Rows are padded or cut to the header width.
    pub fn from_raw(raw: RawTable) -> Self {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut columns = Vec::with_capacity(raw.columns.len());

        for (idx, label) in raw.columns.iter().enumerate() {
            let trimmed = label.trim();
            let base = if trimmed.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                trimmed.to_string()
            };

            let mut candidate = base.clone();
            while let Some(count) = seen.get_mut(&candidate) {
                *count += 1;
                candidate = format!("{base}.{count}");
            }
            seen.insert(candidate.clone(), 0);
            columns.push(candidate);
        }

        let width = columns.len();
        let rows = raw
            .rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();

        Self { columns, rows }
    }

    /// Builds a table with the given labels and no rows.
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the column with exactly this label.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == label)
    }

    /// Keeps the rows for which `keep` returns true, preserving order.
    pub fn retain_rows<F>(self, mut keep: F) -> Self
    where
        F: FnMut(&[String]) -> bool,
    {
        let rows = self.rows.into_iter().filter(|row| keep(row)).collect();
        Self {
            columns: self.columns,
            rows,
        }
    }

    /// Detaches every row into a [`Record`] carrying its own labels.
    pub fn into_records(self) -> Vec<Record> {
        let columns = self.columns;
        self.rows
            .into_iter()
            .map(|row| Record {
                cells: columns.iter().cloned().zip(row).collect(),
            })
            .collect()
    }
}

/// Semantic meaning of a column, resolved per table through synonyms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldRole {
    Party,
    Material,
    Quantity,
    Rate,
    Vehicle,
    Date,
    Group,
    Status,
}

impl FieldRole {
    pub const ALL: [FieldRole; 8] = [
        FieldRole::Party,
        FieldRole::Material,
        FieldRole::Quantity,
        FieldRole::Rate,
        FieldRole::Vehicle,
        FieldRole::Date,
        FieldRole::Group,
        FieldRole::Status,
    ];

    /// Short heading used when a column spec does not name its own.
    pub fn heading(self) -> &'static str {
        match self {
            FieldRole::Party => "PARTY",
            FieldRole::Material => "MATERIAL",
            FieldRole::Quantity => "QTY",
            FieldRole::Rate => "RATE",
            FieldRole::Vehicle => "VEHICLE",
            FieldRole::Date => "DATE",
            FieldRole::Group => "GODOWN",
            FieldRole::Status => "STATUS",
        }
    }
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldRole::Party => "PARTY",
            FieldRole::Material => "MATERIAL",
            FieldRole::Quantity => "QUANTITY",
            FieldRole::Rate => "RATE",
            FieldRole::Vehicle => "VEHICLE",
            FieldRole::Date => "DATE",
            FieldRole::Group => "GROUP",
            FieldRole::Status => "STATUS",
        };
        f.pad(name)
    }
}

/// Partial role → column label mapping for one table. Missing roles are
/// simply absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnMapping {
    labels: BTreeMap<FieldRole, String>,
}

impl ColumnMapping {
    pub fn insert(&mut self, role: FieldRole, label: String) {
        self.labels.insert(role, label);
    }

    pub fn get(&self, role: FieldRole) -> Option<&str> {
        self.labels.get(&role).map(String::as_str)
    }
}

/// A selected row detached from its source table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    cells: Vec<(String, String)>,
}

impl Record {
    /// Builds a record from `(label, value)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        Self {
            cells: pairs
                .into_iter()
                .map(|(label, value)| (label.to_string(), value.to_string()))
                .collect(),
        }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(label, _)| label.as_str())
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(candidate, _)| candidate == label)
            .map(|(_, value)| value.as_str())
    }
}

/// One named bucket of selected records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Group {
    pub name: String,
    pub records: Vec<Record>,
}

/// Groups in first-seen order, each with its records in arrival order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedReport {
    groups: Vec<Group>,
}

impl GroupedReport {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|group| group.name == name)
    }

    /// Number of selected records across all groups, before any ceiling.
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(|group| group.records.len()).sum()
    }
}

/// Rendered block for a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub lines: Vec<String>,
    /// Rows actually rendered (after the ceiling).
    pub rendered: usize,
    /// Rows left out by the ceiling.
    pub omitted: usize,
}

/// The final report. `total` always equals the sum of `rendered` over the
/// sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub title: String,
    pub date: NaiveDate,
    pub rule: String,
    pub sections: Vec<Section>,
    pub total: usize,
}
