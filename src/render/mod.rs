//! Plain-text rendering of a [`GroupedReport`].
//!
//! Rendering is a pure function of the report, the configuration and the
//! target date, so the same inputs always give byte-identical text.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{FieldRole, Group, GroupedReport, Record, ReportDocument, Section};
use crate::resolve::SynonymTable;

pub const EMPTY_GROUP_LINE: &str = "No items";
const BULLET: &str = "• ";
const BULLET_SEPARATOR: &str = " — ";

/// How each selected row is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// Values padded or cut to their column width, no delimiter.
    #[default]
    FixedWidth,
    /// `• a — b — c`, skipping blank optional values.
    Bullet,
}

/// One displayed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub role: FieldRole,
    pub width: usize,
    /// Heading text; defaults to the role's short name.
    #[serde(default)]
    pub heading: Option<String>,
    /// Blank values of optional columns are left out in bullet layout.
    #[serde(default)]
    pub optional: bool,
}

impl ColumnSpec {
    pub fn new(role: FieldRole, width: usize) -> Self {
        Self {
            role,
            width,
            heading: None,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn heading(&self) -> &str {
        self.heading.as_deref().unwrap_or(self.role.heading())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub title: String,
    pub columns: Vec<ColumnSpec>,
    /// Ceiling on rendered rows per group; rows past it are neither shown nor
    /// counted.
    pub max_rows_per_group: usize,
    pub layout: Layout,
    /// Length of the dashed rule under the date line and above the total.
    pub rule_width: usize,
    /// Adds a `(showing first N of M)` line under truncated groups.
    pub overflow_note: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "NEXT-DAY LOADING REPORT".to_string(),
            columns: vec![
                ColumnSpec::new(FieldRole::Party, 20),
                ColumnSpec::new(FieldRole::Material, 16),
                ColumnSpec::new(FieldRole::Quantity, 10),
                ColumnSpec::new(FieldRole::Rate, 10).optional(),
                ColumnSpec::new(FieldRole::Vehicle, 14).optional(),
            ],
            max_rows_per_group: 200,
            layout: Layout::FixedWidth,
            rule_width: 40,
            overflow_note: false,
        }
    }
}

/// Renders every group of `report` in insertion order.
pub fn render(
    report: &GroupedReport,
    config: &RenderConfig,
    synonyms: &SynonymTable,
    target: NaiveDate,
) -> ReportDocument {
    let sections: Vec<Section> = report
        .groups()
        .iter()
        .map(|group| render_group(group, config, synonyms))
        .collect();
    let total = sections.iter().map(|section| section.rendered).sum();

    ReportDocument {
        title: config.title.clone(),
        date: target,
        rule: "-".repeat(config.rule_width),
        sections,
        total,
    }
}

fn render_group(group: &Group, config: &RenderConfig, synonyms: &SynonymTable) -> Section {
    let heading = group.name.to_uppercase();
    if group.records.is_empty() {
        return Section {
            heading,
            lines: vec![EMPTY_GROUP_LINE.to_string()],
            rendered: 0,
            omitted: 0,
        };
    }

    let shown = group.records.len().min(config.max_rows_per_group);
    let omitted = group.records.len() - shown;
    let mut lines = Vec::with_capacity(shown + 2);

    if config.layout == Layout::FixedWidth {
        let header: String = config
            .columns
            .iter()
            .map(|column| fit(column.heading(), column.width))
            .collect();
        let width: usize = config.columns.iter().map(|column| column.width).sum();
        lines.push(header);
        lines.push("-".repeat(width));
    }

    for record in group.records.iter().take(shown) {
        let values = field_values(record, config, synonyms);
        let line = match config.layout {
            Layout::FixedWidth => fixed_width_line(&values, config),
            Layout::Bullet => bullet_line(&values, config),
        };
        lines.push(line);
    }

    if config.overflow_note && omitted > 0 {
        lines.push(format!("(showing first {shown} of {})", group.records.len()));
    }

    Section {
        heading,
        lines,
        rendered: shown,
        omitted,
    }
}

/// Values of the configured columns for one record, blank for roles the
/// record's labels do not map.
fn field_values(record: &Record, config: &RenderConfig, synonyms: &SynonymTable) -> Vec<String> {
    let mapping = synonyms.resolve(record.labels());
    config
        .columns
        .iter()
        .map(|column| {
            mapping
                .get(column.role)
                .and_then(|label| record.get(label))
                .map(|value| value.trim().to_string())
                .unwrap_or_default()
        })
        .collect()
}

pub fn fixed_width_line(values: &[String], config: &RenderConfig) -> String {
    config
        .columns
        .iter()
        .zip(values)
        .map(|(column, value)| fit(value, column.width))
        .collect()
}

pub fn bullet_line(values: &[String], config: &RenderConfig) -> String {
    let parts: Vec<&str> = config
        .columns
        .iter()
        .zip(values)
        .filter(|(column, value)| !(column.optional && value.is_empty()))
        .map(|(_, value)| value.as_str())
        .collect();
    format!("{BULLET}{}", parts.join(BULLET_SEPARATOR))
}

/// Left-aligns `value` in exactly `width` characters.
fn fit(value: &str, width: usize) -> String {
    let mut out: String = value.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat(' ').take(width - len));
    out
}

impl ReportDocument {
    /// The report as plain text, lines joined by `\n`.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<String> = vec![
            self.title.clone(),
            format!("Date: {}", self.date.format("%Y-%m-%d")),
            self.rule.clone(),
        ];

        for section in &self.sections {
            lines.push(String::new());
            lines.push(section.heading.clone());
            lines.extend(section.lines.iter().cloned());
        }

        lines.push(String::new());
        lines.push(self.rule.clone());
        lines.push(format!("Total Items: {}", self.total));
        lines.join("\n")
    }
}

impl fmt::Display for ReportDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
