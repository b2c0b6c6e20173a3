//! `clm checklist` command - closeout checklist and readiness

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::commands::utils::open_view;
use crate::cli::filters::ChecklistStatusFilter;
use crate::cli::output::{effective_format, print_structured};
use crate::cli::present::checklist_badge;
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::record::Record;
use crate::entities::checklist::{ChecklistItem, ChecklistProgress};

#[derive(Subcommand, Debug)]
pub enum ChecklistCommands {
    /// List checklist items with closeout progress
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by completion
    #[arg(long, short = 's', default_value = "all")]
    pub status: ChecklistStatusFilter,

    /// Only required items
    #[arg(long)]
    pub required: bool,

    /// Search item text (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,
}

const CHECKLIST_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("text", "ITEM", 60),
    ColumnDef::new("required", "REQUIRED", 8),
    ColumnDef::new("status", "STATUS", 10),
];

/// Items plus progress over the whole checklist
#[derive(Serialize)]
struct ChecklistReport<'a> {
    items: Vec<&'a ChecklistItem>,
    progress: ChecklistProgress,
    percent: u32,
    ready_for_closeout: bool,
}

pub fn run(cmd: ChecklistCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ChecklistCommands::List(args) => run_list(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut view = open_view::<ChecklistItem>(global)?;

    // progress always covers the full checklist, not the filtered rows
    let progress = ChecklistProgress::compute(view.store().records());

    if let Some(ref search) = args.search {
        view.set_search(search.as_str());
    }
    view.set_field_filter("status", args.status.field_value());
    if args.required {
        view.set_field_filter("required", "true");
    }

    let format = effective_format(global.output, true);
    let items = view.filtered();

    let report = ChecklistReport {
        items,
        progress,
        percent: progress.percent(),
        ready_for_closeout: progress.ready_for_closeout(),
    };
    if print_structured(&report, format)? {
        return Ok(());
    }

    if format == OutputFormat::Table {
        for item in &report.items {
            let mark = if item.checked {
                style("[x]").green()
            } else {
                style("[ ]").dim()
            };
            let required = if item.required {
                style(" *").red().to_string()
            } else {
                String::new()
            };
            println!("{} {}{}", mark, item.title(), required);
        }
        if report.items.is_empty() {
            println!("No checklist items found.");
        }
        println!();
        print_progress(&progress);
        return Ok(());
    }

    let rows: Vec<TableRow> = report
        .items
        .iter()
        .map(|item| {
            TableRow::new(item.id.clone())
                .cell("id", CellValue::Id(item.id.clone()))
                .cell("text", CellValue::Text(item.text.clone()))
                .cell("required", CellValue::Flag(item.required))
                .cell("status", CellValue::Badge(checklist_badge(item.status())))
        })
        .collect();
    TableFormatter::new(CHECKLIST_COLUMNS, "checklist item", "checklist items")
        .output(rows, format, &[]);
    Ok(())
}

fn print_progress(progress: &ChecklistProgress) {
    println!(
        "{}: {}/{} complete ({}%)",
        style("Progress").bold(),
        progress.completed,
        progress.total,
        progress.percent()
    );
    println!(
        "{}: {}/{} complete",
        style("Required").bold(),
        progress.required_completed,
        progress.required_total
    );
    if progress.ready_for_closeout() {
        println!("{} Ready for closeout", style("✓").green());
    } else {
        println!(
            "{} {} required item(s) outstanding",
            style("!").yellow(),
            progress.required_pending()
        );
    }
}
