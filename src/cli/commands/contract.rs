//! `clm contract` command - contract request list, detail, edit and delete

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::commands::utils::{days_ago, open_view, page_footer};
use crate::cli::filters::{ContractStatusFilter, SortField};
use crate::cli::helpers::confirm;
use crate::cli::output::{effective_format, print_structured};
use crate::cli::present::{
    contract_badge, format_compact_currency, format_currency, format_long_date,
};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::http::HttpBackend;
use crate::core::record::{RecordId, RecordStatus};
use crate::entities::contract::{
    ContractEdit, ContractRequest, ContractStatus, ContractSummary, CONTRACT_TYPES,
};

#[derive(Subcommand, Debug)]
pub enum ContractCommands {
    /// List contract requests with filtering and paging
    List(ListArgs),

    /// Show a contract request's details
    Show(ShowArgs),

    /// Edit a contract request on the server
    Edit(EditArgs),

    /// Delete a contract request on the server
    Delete(DeleteArgs),

    /// Contract counts per lifecycle stage
    Summary(SummaryArgs),
}

/// Columns to display in list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListColumn {
    Id,
    Number,
    Title,
    Agency,
    Type,
    Value,
    Status,
    Created,
    Document,
}

impl std::fmt::Display for ListColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListColumn::Id => write!(f, "id"),
            ListColumn::Number => write!(f, "number"),
            ListColumn::Title => write!(f, "title"),
            ListColumn::Agency => write!(f, "agency"),
            ListColumn::Type => write!(f, "type"),
            ListColumn::Value => write!(f, "value"),
            ListColumn::Status => write!(f, "status"),
            ListColumn::Created => write!(f, "created"),
            ListColumn::Document => write!(f, "document"),
        }
    }
}

impl ListColumn {
    fn key(&self) -> &'static str {
        match self {
            ListColumn::Id => "id",
            ListColumn::Number => "number",
            ListColumn::Title => "title",
            ListColumn::Agency => "agency",
            ListColumn::Type => "type",
            ListColumn::Value => "value",
            ListColumn::Status => "status",
            ListColumn::Created => "created",
            ListColumn::Document => "document",
        }
    }
}

/// Column definitions for contract list output
const CONTRACT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 8),
    ColumnDef::new("number", "REQUEST #", 12),
    ColumnDef::new("title", "TITLE", 32),
    ColumnDef::new("agency", "AGENCY", 24),
    ColumnDef::new("type", "TYPE", 18),
    ColumnDef::new("value", "VALUE", 16),
    ColumnDef::new("status", "STATUS", 10),
    ColumnDef::new("created", "CREATED", 12),
    ColumnDef::new("document", "DOCUMENT", 24),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search title, agency and contract type (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by lifecycle stage
    #[arg(long, short = 's', default_value = "all")]
    pub status: ContractStatusFilter,

    /// Filter by contract type (exact match)
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub contract_type: Option<String>,

    /// Filter by agency (exact match)
    #[arg(long, short = 'a')]
    pub agency: Option<String>,

    /// Minimum value in USD (inclusive)
    #[arg(long)]
    pub min_value: Option<f64>,

    /// Maximum value in USD (inclusive)
    #[arg(long)]
    pub max_value: Option<f64>,

    /// Show contracts submitted in the last N days
    #[arg(long, value_name = "DAYS")]
    pub since: Option<u32>,

    /// Columns to display (can specify multiple)
    #[arg(long, value_delimiter = ',', default_values_t = vec![
        ListColumn::Id,
        ListColumn::Title,
        ListColumn::Agency,
        ListColumn::Type,
        ListColumn::Value,
        ListColumn::Status,
        ListColumn::Created,
    ])]
    pub columns: Vec<ListColumn>,

    /// Sort by field (default: server order)
    #[arg(long)]
    pub sort: Option<SortField>,

    /// Reverse sort order
    #[arg(long, short = 'r', requires = "sort")]
    pub reverse: bool,

    /// Page to show (clamped to the last page)
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,

    /// Show every matching contract instead of one page
    #[arg(long, conflicts_with = "page")]
    pub all: bool,

    /// Show only the number of matching contracts
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Contract ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Contract ID
    pub id: String,

    /// New title
    #[arg(long)]
    pub title: Option<String>,

    /// New requesting agency
    #[arg(long)]
    pub agency: Option<String>,

    /// New contract type
    #[arg(long = "type", value_name = "TYPE")]
    pub contract_type: Option<String>,

    /// New value in USD
    #[arg(long)]
    pub value: Option<f64>,

    /// New lifecycle stage
    #[arg(long)]
    pub status: Option<ContractStatus>,

    /// Interactive mode (prompt for every field)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

impl EditArgs {
    fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.agency.is_some()
            || self.contract_type.is_some()
            || self.value.is_some()
            || self.status.is_some()
    }

    fn apply_to(&self, edit: &mut ContractEdit) {
        if let Some(ref title) = self.title {
            edit.title = title.clone();
        }
        if let Some(ref agency) = self.agency {
            edit.agency = agency.clone();
        }
        if let Some(ref contract_type) = self.contract_type {
            edit.contract_type = contract_type.clone();
        }
        if let Some(value) = self.value {
            edit.value = value;
        }
        if let Some(status) = self.status {
            edit.status = status;
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Contract ID
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct SummaryArgs {
    /// Count the loaded list instead of asking the server
    #[arg(long)]
    pub local: bool,
}

/// Run a contract subcommand
pub fn run(cmd: ContractCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ContractCommands::List(args) => run_list(args, global),
        ContractCommands::Show(args) => run_show(args, global),
        ContractCommands::Edit(args) => run_edit(args, global),
        ContractCommands::Delete(args) => run_delete(args, global),
        ContractCommands::Summary(args) => run_summary(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut view = open_view::<ContractRequest>(global)?;

    if let Some(ref search) = args.search {
        view.set_search(search.as_str());
    }
    view.set_field_filter("status", args.status.field_value());
    if let Some(ref agency) = args.agency {
        view.set_field_filter("agency", agency.as_str());
    }
    if let Some(ref contract_type) = args.contract_type {
        view.set_field_filter("contract_type", contract_type.as_str());
    }
    view.set_value_range(args.min_value, args.max_value);
    view.set_created_since(args.since.map(days_ago));
    view.set_sort(args.sort.map(|field| (field.into(), args.reverse)));

    if args.count {
        println!("{}", view.filtered_len());
        return Ok(());
    }

    let format = effective_format(global.output, true);
    view.goto_page(args.page);

    let (items, footer) = if args.all {
        (view.filtered(), None)
    } else {
        let page = view.page();
        let footer = page_footer(&page);
        (page.items, Some(footer))
    };

    if print_structured(&items, format)? {
        return Ok(());
    }

    if items.is_empty() && format == OutputFormat::Table {
        println!("No contracts found.");
        return Ok(());
    }

    let visible: Vec<&str> = args.columns.iter().map(|c| c.key()).collect();
    let rows: Vec<TableRow> = items.iter().map(|c| contract_to_row(c)).collect();

    let formatter = TableFormatter::new(CONTRACT_COLUMNS, "contract", "contracts");
    formatter.output(rows, format, &visible);

    if format == OutputFormat::Table {
        if let Some(footer) = footer {
            println!("{}", style(footer).dim());
        }
    }

    Ok(())
}

/// Convert a contract request to a TableRow
fn contract_to_row(contract: &ContractRequest) -> TableRow {
    TableRow::new(contract.id.clone())
        .cell("id", CellValue::Id(contract.id.clone()))
        .cell("number", CellValue::Text(contract.request_number()))
        .cell("title", CellValue::Text(contract.title.clone()))
        .cell("agency", CellValue::Text(contract.agency.clone()))
        .cell("type", CellValue::Text(contract.contract_type.clone()))
        .cell("value", CellValue::Currency(contract.value))
        .cell("status", CellValue::Badge(contract_badge(contract.status)))
        .cell("created", CellValue::Date(contract.created_at))
        .cell(
            "document",
            CellValue::Text(contract.attachment_name().unwrap_or("-").to_string()),
        )
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let view = open_view::<ContractRequest>(global)?;
    let id = RecordId::parse(&args.id);
    let contract = view
        .store()
        .get(&id)
        .ok_or_else(|| miette::miette!("No contract found with id '{}'", args.id))?;

    if print_structured(contract, global.output)? {
        return Ok(());
    }

    if global.output == OutputFormat::Id {
        println!("{}", contract.id);
        return Ok(());
    }

    print_contract(contract);
    Ok(())
}

fn print_contract(contract: &ContractRequest) {
    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {}",
        style("Request").bold(),
        style(contract.request_number()).cyan()
    );
    println!("{}: {}", style("Title").bold(), style(&contract.title).yellow());
    println!(
        "{}: {}",
        style("Status").bold(),
        contract_badge(contract.status).styled()
    );
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("Agency").bold(), contract.agency);
    println!("{}: {}", style("Type").bold(), contract.contract_type);
    println!(
        "{}: {}",
        style("Value").bold(),
        format_currency(contract.value)
    );
    if let Some(ref created) = contract.created_at {
        println!("{}: {}", style("Submitted").bold(), format_long_date(created));
    }
    if let Some(name) = contract.attachment_name() {
        println!("{}: {}", style("Document").bold(), name);
    }
    println!("{}", style("─".repeat(60)).dim());
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut view = open_view::<ContractRequest>(global)?;
    let id = RecordId::parse(&args.id);

    let original = view
        .store()
        .get(&id)
        .map(ContractEdit::from_record)
        .ok_or_else(|| miette::miette!("No contract found with id '{}'", args.id))?;

    let mut edit = original.clone();
    if args.interactive {
        prompt_edit(&mut edit)?;
    } else if args.has_changes() {
        args.apply_to(&mut edit);
    } else {
        return Err(miette::miette!(
            help = "pass --title, --agency, --type, --value or --status, or use -i",
            "Nothing to change"
        ));
    }

    if edit == original {
        println!("No changes.");
        return Ok(());
    }

    let updated = view.edit(&id, &edit)?;

    if print_structured(updated, global.output)? {
        return Ok(());
    }

    println!(
        "{} Updated contract {}",
        style("✓").green(),
        style(&updated.id).cyan()
    );
    println!(
        "   {} | {} | {}",
        updated.title,
        format_currency(updated.value),
        contract_badge(updated.status).styled()
    );
    Ok(())
}

/// Walk through every editable field, defaulting to the current values
fn prompt_edit(edit: &mut ContractEdit) -> Result<()> {
    let theme = ColorfulTheme::default();

    edit.title = Input::with_theme(&theme)
        .with_prompt("Title")
        .with_initial_text(edit.title.clone())
        .interact_text()
        .into_diagnostic()?;

    edit.agency = Input::with_theme(&theme)
        .with_prompt("Agency")
        .with_initial_text(edit.agency.clone())
        .interact_text()
        .into_diagnostic()?;

    // keep an unlisted stored type selectable so it can be left as is
    let mut types: Vec<&str> = CONTRACT_TYPES.to_vec();
    if !types.contains(&edit.contract_type.as_str()) {
        types.insert(0, edit.contract_type.as_str());
    }
    let type_index = types
        .iter()
        .position(|t| *t == edit.contract_type)
        .unwrap_or(0);
    let selection = Select::with_theme(&theme)
        .with_prompt("Contract type")
        .items(types.as_slice())
        .default(type_index)
        .interact()
        .into_diagnostic()?;
    let contract_type = types[selection].to_string();
    edit.contract_type = contract_type;

    edit.value = Input::with_theme(&theme)
        .with_prompt("Value (USD)")
        .default(edit.value)
        .validate_with(|v: &f64| -> std::result::Result<(), &str> {
            if v.is_finite() && *v >= 0.0 {
                Ok(())
            } else {
                Err("value must be a non-negative number")
            }
        })
        .interact_text()
        .into_diagnostic()?;

    let statuses: Vec<&str> = ContractStatus::ALL
        .iter()
        .map(|s| contract_badge(*s).label)
        .collect();
    let status_index = edit.status.rank();
    let selection = Select::with_theme(&theme)
        .with_prompt("Status")
        .items(statuses.as_slice())
        .default(status_index)
        .interact()
        .into_diagnostic()?;
    edit.status = ContractStatus::ALL[selection];

    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut view = open_view::<ContractRequest>(global)?;
    let id = RecordId::parse(&args.id);

    let title = view
        .store()
        .get(&id)
        .map(|c| c.title.clone())
        .ok_or_else(|| miette::miette!("No contract found with id '{}'", args.id))?;

    if !args.yes && !confirm(&format!("Delete contract {} ({})?", id, title))? {
        println!("Aborted.");
        return Ok(());
    }

    let removed = view.delete(&id)?;
    println!(
        "{} Deleted contract {} ({})",
        style("✓").green(),
        style(&removed.id).cyan(),
        removed.title
    );
    Ok(())
}

fn run_summary(args: SummaryArgs, global: &GlobalOpts) -> Result<()> {
    // pipeline value is only known when the snapshot was counted here
    let (summary, pipeline) = if args.local {
        let view = open_view::<ContractRequest>(global)?;
        let records = view.store().records();
        let value: f64 = records.iter().map(|c| c.value).sum();
        (ContractSummary::from_records(records), Some(value))
    } else {
        let config = global.config()?;
        (ContractSummary::fetch(&HttpBackend::new(&config))?, None)
    };

    if print_structured(&summary.counts, global.output)? {
        return Ok(());
    }

    match global.output {
        OutputFormat::Tsv | OutputFormat::Csv => {
            let sep = if global.output == OutputFormat::Tsv { "\t" } else { "," };
            println!("status{}count", sep);
            for (status, count) in summary.ordered() {
                println!("{}{}{}", status, sep, count);
            }
        }
        _ => {
            println!("{:<14} {:>6}", style("STAGE").bold(), style("COUNT").bold());
            println!("{}", "-".repeat(21));
            for (status, count) in summary.ordered() {
                let label = match ContractStatus::parse(status) {
                    Some(s) => contract_badge(s).styled().to_string(),
                    None => status.to_string(),
                };
                // pad on the plain label; styling adds invisible bytes
                let pad = 14usize.saturating_sub(console::measure_text_width(&label));
                println!("{}{} {:>6}", label, " ".repeat(pad), count);
            }
            println!("{}", "-".repeat(21));
            println!("{:<14} {:>6}", "Total", summary.total());
            if let Some(value) = pipeline {
                println!("{:<14} {:>6}", "Value", format_compact_currency(value));
            }
        }
    }
    Ok(())
}
