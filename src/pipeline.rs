use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::aggregate::{Aggregator, GroupingStrategy};
use crate::collab::{Archive, Delivery, SourceEntry, SourceStore};
use crate::config::{ConsumePolicy, ReportConfig};
use crate::error::Result;
use crate::filter::select_rows;
use crate::io::load_table;
use crate::model::{GroupedReport, ReportDocument};
use crate::render::render;

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub target: NaiveDate,
    pub groups: usize,
    pub total_items: usize,
    pub sources_processed: usize,
    pub sources_failed: usize,
    pub archived: bool,
    pub delivered: bool,
    pub report: String,
}

/// A source file waiting to be read, with the group it was listed under.
#[derive(Debug, Clone)]
struct PendingSource {
    group: String,
    entry: SourceEntry,
}

/// Lists `root`, reads every source, renders the report for `target`,
/// archives and delivers it, then disposes of the sources.
///
/// Unreadable sources are logged and skipped; the run always produces a
/// report. Only a failure to list `root` itself aborts. Sources that could
/// not be fetched are left where they are, whatever the consume policy.
#[instrument(level = "info", skip_all, fields(%root, %target))]
pub fn run(
    root: &str,
    target: NaiveDate,
    config: &ReportConfig,
    sources: &dyn SourceStore,
    archive: &mut dyn Archive,
    delivery: &mut dyn Delivery,
) -> Result<RunSummary> {
    config.validate()?;

    let mut aggregator = Aggregator::new(config.grouping, &config.synonyms);
    for name in &config.groups {
        aggregator.register(name);
    }

    let register_folders = config.grouping == GroupingStrategy::SourceLocation;
    let pending = discover(root, sources, &mut aggregator, register_folders)?;
    info!(files = pending.len(), "sources discovered");

    let mut processed = 0;
    let mut failed = 0;
    for source in &pending {
        let bytes = match sources.fetch(&source.entry.path) {
            Ok(bytes) => bytes,
            Err(err) => {
                failed += 1;
                warn!(
                    path = %source.entry.path,
                    error = %err,
                    "failed to fetch source, leaving it in place"
                );
                continue;
            }
        };
        match read_source(source, &bytes, target, config, &mut aggregator) {
            Ok(()) => {
                processed += 1;
                consume(&config.consume, &source.entry, false, archive);
            }
            Err(err) => {
                failed += 1;
                warn!(path = %source.entry.path, error = %err, "skipping source");
                consume(&config.consume, &source.entry, true, archive);
            }
        }
    }

    let grouped = aggregator.finish();
    let document = build_document(&grouped, target, config);
    let report = document.to_text();
    info!(
        groups = grouped.groups().len(),
        selected = grouped.record_count(),
        rendered = document.total,
        "report rendered"
    );

    let report_name = format!("{}{}.txt", config.report_prefix, target.format("%Y-%m-%d"));
    let archived = archive.store(&report_name, report.as_bytes());
    let delivered = delivery.send(&report);
    if !delivered {
        warn!("report delivery failed");
    }

    Ok(RunSummary {
        target,
        groups: grouped.groups().len(),
        total_items: document.total,
        sources_processed: processed,
        sources_failed: failed,
        archived,
        delivered,
        report,
    })
}

/// Renders an already aggregated report with the run configuration.
pub fn build_document(
    grouped: &GroupedReport,
    target: NaiveDate,
    config: &ReportConfig,
) -> ReportDocument {
    render(grouped, &config.render, &config.synonyms, target)
}

/// Folders under `root` become groups in listing order; files directly under
/// `root` belong to a group named after `root` itself. Within a location,
/// files are read oldest first.
fn discover(
    root: &str,
    sources: &dyn SourceStore,
    aggregator: &mut Aggregator<'_>,
    register_folders: bool,
) -> Result<Vec<PendingSource>> {
    let root_group = location_name(root);
    let (folders, root_files): (Vec<_>, Vec<_>) = sources
        .list(root)?
        .into_iter()
        .filter(|entry| !entry.is_hidden())
        .partition(|entry| entry.is_folder);

    let mut pending = queue(&root_group, root_files);
    for folder in folders {
        if register_folders {
            aggregator.register(&folder.name);
        }
        match sources.list(&folder.path) {
            Ok(files) => pending.extend(queue(
                &folder.name,
                files
                    .into_iter()
                    .filter(|file| !file.is_folder && !file.is_hidden())
                    .collect(),
            )),
            Err(err) => warn!(folder = %folder.path, error = %err, "failed to list folder"),
        }
    }

    Ok(pending)
}

/// Orders one location's files by arrival, name breaking ties; files without
/// a known modification time come first.
fn queue(group: &str, mut files: Vec<SourceEntry>) -> Vec<PendingSource> {
    files.sort_by(|lhs, rhs| {
        lhs.modified
            .cmp(&rhs.modified)
            .then_with(|| lhs.name.cmp(&rhs.name))
    });
    files
        .into_iter()
        .map(|entry| PendingSource {
            group: group.to_string(),
            entry,
        })
        .collect()
}

#[instrument(
    level = "debug",
    skip_all,
    fields(path = %source.entry.path, group = %source.group)
)]
fn read_source(
    source: &PendingSource,
    bytes: &[u8],
    target: NaiveDate,
    config: &ReportConfig,
    aggregator: &mut Aggregator<'_>,
) -> Result<()> {
    let table = load_table(bytes, &source.entry.name)?;
    let selected = select_rows(table, target, config.day_first);
    debug!(rows = selected.len(), "rows selected");
    aggregator.add(&source.group, selected);
    Ok(())
}

fn consume(policy: &ConsumePolicy, entry: &SourceEntry, failed: bool, archive: &mut dyn Archive) {
    match policy {
        ConsumePolicy::Keep => {}
        ConsumePolicy::Delete => {
            archive.remove(&entry.path);
        }
        ConsumePolicy::MoveTo { folder } => {
            let destination = if failed {
                format!("{}/error", folder.trim_end_matches('/'))
            } else {
                folder.clone()
            };
            archive.relocate(&entry.path, &destination);
        }
    }
}

fn location_name(location: &str) -> String {
    location
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(location)
        .to_string()
}
