use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use loading_report::aggregate::GroupingStrategy;
use loading_report::collab::{LocalArchive, LocalSources, StdoutDelivery};
use loading_report::filter::{date_columns, target_date};
use loading_report::io::load_table;
use loading_report::model::FieldRole;
use loading_report::render::Layout;
use loading_report::{ConsumePolicy, ReportConfig, ReportError, Result, pipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ReportError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => execute_run(args),
        Command::Inspect(args) => execute_inspect(args),
    }
}

fn execute_run(args: RunArgs) -> Result<()> {
    if !args.input.is_dir() {
        return Err(ReportError::MissingInput(args.input));
    }

    let config = args.resolve_config()?;
    let target = match args.target_date {
        Some(date) => date,
        None => target_date(Utc::now(), config.offset()?),
    };

    let reports_dir = args.reports.clone().unwrap_or_else(|| {
        args.input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("reports")
    });
    let mut archive = LocalArchive::new(reports_dir);
    let mut delivery = StdoutDelivery;

    let summary = pipeline::run(
        &args.input.to_string_lossy(),
        target,
        &config,
        &LocalSources,
        &mut archive,
        &mut delivery,
    )?;
    info!(
        target = %summary.target,
        groups = summary.groups,
        items = summary.total_items,
        processed = summary.sources_processed,
        failed = summary.sources_failed,
        archived = summary.archived,
        delivered = summary.delivered,
        "run complete"
    );
    Ok(())
}

fn execute_inspect(args: InspectArgs) -> Result<()> {
    if !args.file.is_file() {
        return Err(ReportError::MissingInput(args.file));
    }
    let config = load_config(args.config.as_deref())?;

    let bytes = std::fs::read(&args.file)?;
    let name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let table = load_table(&bytes, &name)?;
    let mapping = config
        .synonyms
        .resolve(table.columns().iter().map(String::as_str));

    println!("{name}: {} columns, {} rows", table.columns().len(), table.len());
    for role in FieldRole::ALL {
        match mapping.get(role) {
            Some(label) => println!("  {role:<10} -> {label}"),
            None => println!("  {role:<10} -> (unmapped)"),
        }
    }
    let dates = date_columns(&table);
    if dates.is_empty() {
        println!("  date columns: none (every row is kept)");
    } else {
        println!("  date columns: {}", dates.join(", "));
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(path) => ReportConfig::from_json_file(path),
        None => Ok(ReportConfig::default()),
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Compile next-day loading rows from spreadsheets into a text report."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read every source under the input folder and emit the report.
    Run(RunArgs),
    /// Show how one file's columns resolve to field roles.
    Inspect(InspectArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Folder holding one sub-folder per group (files at the top level form
    /// their own group).
    #[arg(long)]
    input: PathBuf,

    /// Folder the report is archived into. Defaults to a `reports` folder
    /// next to the input folder.
    #[arg(long)]
    reports: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report on this date instead of tomorrow.
    #[arg(long, value_parser = parse_date_arg)]
    target_date: Option<NaiveDate>,

    /// Where group names come from.
    #[arg(long, value_enum)]
    grouping: Option<GroupingKind>,

    /// Row layout.
    #[arg(long, value_enum)]
    layout: Option<LayoutKind>,

    /// Maximum rows rendered per group.
    #[arg(long)]
    max_rows: Option<usize>,

    /// What to do with sources after reading them.
    #[arg(long, value_enum)]
    consume: Option<ConsumeKind>,

    /// Destination folder for `--consume move`.
    #[arg(long, required_if_eq("consume", "move"))]
    processed: Option<PathBuf>,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Spreadsheet or CSV file to inspect.
    file: PathBuf,

    /// JSON configuration file supplying synonyms.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum GroupingKind {
    SourceLocation,
    FieldValue,
}

impl From<GroupingKind> for GroupingStrategy {
    fn from(kind: GroupingKind) -> Self {
        match kind {
            GroupingKind::SourceLocation => GroupingStrategy::SourceLocation,
            GroupingKind::FieldValue => GroupingStrategy::FieldValue,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum LayoutKind {
    FixedWidth,
    Bullet,
}

impl From<LayoutKind> for Layout {
    fn from(kind: LayoutKind) -> Self {
        match kind {
            LayoutKind::FixedWidth => Layout::FixedWidth,
            LayoutKind::Bullet => Layout::Bullet,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ConsumeKind {
    Keep,
    Delete,
    Move,
}

impl RunArgs {
    fn resolve_config(&self) -> Result<ReportConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(grouping) = self.grouping {
            config.grouping = grouping.into();
        }
        if let Some(layout) = self.layout {
            config.render.layout = layout.into();
        }
        if let Some(max_rows) = self.max_rows {
            config.render.max_rows_per_group = max_rows;
        }
        match self.consume {
            Some(ConsumeKind::Keep) => config.consume = ConsumePolicy::Keep,
            Some(ConsumeKind::Delete) => config.consume = ConsumePolicy::Delete,
            Some(ConsumeKind::Move) => {
                let folder = self
                    .processed
                    .as_ref()
                    .ok_or_else(|| ReportError::InvalidConfig("--processed is required".into()))?;
                config.consume = ConsumePolicy::MoveTo {
                    folder: folder.to_string_lossy().into_owned(),
                };
            }
            None => {}
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}
