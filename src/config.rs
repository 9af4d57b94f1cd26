use std::path::Path;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::aggregate::GroupingStrategy;
use crate::error::{ReportError, Result};
use crate::render::RenderConfig;
use crate::resolve::SynonymTable;

const MINUTES_PER_DAY: i32 = 24 * 60;

/// What happens to a source file once the run is done with it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ConsumePolicy {
    /// Leave sources where they are.
    #[default]
    Keep,
    /// Delete each source after it was read.
    Delete,
    /// Move read sources into `folder`, unreadable ones into `folder/error`.
    MoveTo { folder: String },
}

/// Every knob of a run, passed explicitly into each stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Offset of the reference timezone from UTC, in minutes.
    pub utc_offset_minutes: i32,
    /// Read ambiguous numeric dates as day/month instead of month/day.
    pub day_first: bool,
    pub grouping: GroupingStrategy,
    /// Groups always listed in the report, in this order, before any group
    /// discovered while reading sources.
    pub groups: Vec<String>,
    pub synonyms: SynonymTable,
    pub render: RenderConfig,
    pub consume: ConsumePolicy,
    /// Archived report name is `{report_prefix}{target date}.txt`.
    pub report_prefix: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 330,
            day_first: false,
            grouping: GroupingStrategy::default(),
            groups: Vec::new(),
            synonyms: SynonymTable::default(),
            render: RenderConfig::default(),
            consume: ConsumePolicy::default(),
            report_prefix: "report_".to_string(),
        }
    }
}

impl ReportConfig {
    /// Loads a JSON configuration file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ReportError::MissingInput(path.to_path_buf()));
        }
        let data = std::fs::read_to_string(path)?;
        let config: ReportConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.utc_offset_minutes.abs() >= MINUTES_PER_DAY {
            return Err(ReportError::InvalidConfig(format!(
                "utc_offset_minutes must be within ±{MINUTES_PER_DAY}, got {}",
                self.utc_offset_minutes
            )));
        }
        if self.render.columns.is_empty() {
            return Err(ReportError::InvalidConfig(
                "render.columns must name at least one column".into(),
            ));
        }
        if let Some(column) = self.render.columns.iter().find(|column| column.width == 0) {
            return Err(ReportError::InvalidConfig(format!(
                "column {} has zero width",
                column.role
            )));
        }
        Ok(())
    }

    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).ok_or_else(|| {
            ReportError::InvalidConfig(format!(
                "invalid UTC offset of {} minutes",
                self.utc_offset_minutes
            ))
        })
    }
}
