//! `clm audit` command - AI audit log list, CSV export and headline stats

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result, WrapErr};
use std::fs::File;
use std::path::PathBuf;

use crate::cli::commands::utils::{open_view, page_footer};
use crate::cli::filters::AuditCategoryFilter;
use crate::cli::helpers::truncate_str;
use crate::cli::output::{effective_format, print_structured};
use crate::cli::present::{category_badge, confidence_bar, ConfidenceBand, DecisionTone};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::http::HttpBackend;
use crate::core::list::ListView;
use crate::entities::audit_log::{export_file_name, write_csv, AuditLogEntry, AuditStats};

#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// List audit log entries with filtering and paging
    List(ListArgs),

    /// Export the filtered entries to a CSV file
    Export(ExportArgs),

    /// Totals, high-confidence decisions and risk alerts
    Stats(FilterArgs),
}

/// Filters shared by every audit subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct FilterArgs {
    /// Search user, action and AI decision (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by action (exact match)
    #[arg(long)]
    pub action: Option<String>,

    /// Filter by category
    #[arg(long, short = 'c', default_value = "all")]
    pub category: AuditCategoryFilter,

    /// Filter by user (exact match)
    #[arg(long, short = 'u')]
    pub user: Option<String>,

    /// Minimum confidence percent (inclusive)
    #[arg(long)]
    pub min_confidence: Option<f64>,

    /// Maximum confidence percent (inclusive)
    #[arg(long)]
    pub max_confidence: Option<f64>,
}

impl FilterArgs {
    fn apply(&self, view: &mut ListView<AuditLogEntry, HttpBackend>) {
        if let Some(ref search) = self.search {
            view.set_search(search.as_str());
        }
        if let Some(ref action) = self.action {
            view.set_field_filter("action", action.as_str());
        }
        view.set_field_filter("category", self.category.field_value());
        if let Some(ref user) = self.user {
            view.set_field_filter("user", user.as_str());
        }
        view.set_value_range(self.min_confidence, self.max_confidence);
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Page to show (clamped to the last page)
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Show only the number of matching entries
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output file (default: ai-audit-logs-<date>.csv in the current directory)
    #[arg(long = "file", short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,
}

const AUDIT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("timestamp", "TIMESTAMP", 19),
    ColumnDef::new("user", "USER", 18),
    ColumnDef::new("action", "ACTION", 22),
    ColumnDef::new("decision", "AI DECISION", 36),
    ColumnDef::new("confidence", "CONF", 5),
    ColumnDef::new("category", "CATEGORY", 14),
];

pub fn run(cmd: AuditCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AuditCommands::List(args) => run_list(args, global),
        AuditCommands::Export(args) => run_export(args, global),
        AuditCommands::Stats(args) => run_stats(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut view = open_view::<AuditLogEntry>(global)?;
    args.filter.apply(&mut view);

    if args.count {
        println!("{}", view.filtered_len());
        return Ok(());
    }

    let format = effective_format(global.output, true);
    view.goto_page(args.page);
    let page = view.page();

    if print_structured(&page.items, format)? {
        return Ok(());
    }

    match format {
        OutputFormat::Table => {
            if page.items.is_empty() {
                println!("No audit log entries found.");
                return Ok(());
            }
            for entry in &page.items {
                print_entry(entry);
            }
            println!("{}", style(page_footer(&page)).dim());
        }
        _ => {
            let rows: Vec<TableRow> = page.items.iter().map(|e| entry_to_row(e)).collect();
            TableFormatter::new(AUDIT_COLUMNS, "audit log entry", "audit log entries")
                .output(rows, format, &[]);
        }
    }

    Ok(())
}

/// Card layout for one entry
fn print_entry(entry: &AuditLogEntry) {
    let tone = DecisionTone::of(&entry.ai_decision);
    let band = ConfidenceBand::of(entry.confidence);

    println!(
        "{} {}  {}",
        style(format!("#{}", entry.id)).dim(),
        style(entry.timestamp_text()).dim(),
        category_badge(entry.category).styled()
    );
    println!(
        "  {} {} {}",
        style(&entry.user).bold(),
        style("·").dim(),
        entry.action
    );
    println!("  {}", tone.paint(&entry.ai_decision));
    println!(
        "  {} {:>3.0}% ({})",
        confidence_bar(entry.confidence),
        entry.confidence,
        band.label()
    );
    if !entry.details.is_empty() {
        println!("  {}", style(truncate_str(&entry.details, 100)).dim());
    }
    println!();
}

fn entry_to_row(entry: &AuditLogEntry) -> TableRow {
    TableRow::new(entry.id.clone())
        .cell("id", CellValue::Id(entry.id.clone()))
        .cell("timestamp", CellValue::Text(entry.timestamp_text()))
        .cell("user", CellValue::Text(entry.user.clone()))
        .cell("action", CellValue::Text(entry.action.clone()))
        .cell("decision", CellValue::Text(entry.ai_decision.clone()))
        .cell("confidence", CellValue::Percent(entry.confidence))
        .cell("category", CellValue::Badge(category_badge(entry.category)))
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let mut view = open_view::<AuditLogEntry>(global)?;
    args.filter.apply(&mut view);

    let path = args
        .file
        .unwrap_or_else(|| PathBuf::from(export_file_name(chrono::Local::now().date_naive())));

    let entries = view.filtered();
    let file = File::create(&path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, entries.iter().copied()).into_diagnostic()?;

    println!(
        "{} Exported {} {} to {}",
        style("✓").green(),
        entries.len(),
        if entries.len() == 1 { "entry" } else { "entries" },
        style(path.display()).cyan()
    );
    Ok(())
}

fn run_stats(args: FilterArgs, global: &GlobalOpts) -> Result<()> {
    let mut view = open_view::<AuditLogEntry>(global)?;
    args.apply(&mut view);

    let stats = AuditStats::compute(view.filtered());

    if print_structured(&stats, global.output)? {
        return Ok(());
    }

    let average = stats
        .average_confidence
        .map(|a| format!("{}%", a))
        .unwrap_or_else(|| "-".to_string());

    println!("{:<24} {:>8}", style("Total entries").bold(), stats.total);
    println!(
        "{:<24} {:>8}",
        style("High confidence (≥80%)").bold(),
        stats.high_confidence
    );
    println!(
        "{:<24} {:>8}",
        style("Risk alerts").bold(),
        style(stats.risk_alerts).red()
    );
    println!("{:<24} {:>8}", style("Average confidence").bold(), average);
    Ok(())
}
