//! Table rendering shared by every list command
//!
//! A command declares its columns once, turns each record into a
//! [`TableRow`], and hands the rows to [`TableFormatter::output`], which
//! renders them in whichever tabular format was requested.

use chrono::{DateTime, Utc};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::{escape_csv, escape_md, truncate_str};
use crate::cli::present::{format_currency, format_optional_date, Badge};
use crate::cli::OutputFormat;
use crate::core::record::RecordId;

/// A column a list command can show
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    /// Key used in `--columns` and in [`TableRow::cell`]
    pub key: &'static str,
    pub header: &'static str,
    /// Maximum characters before truncation in table output
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// One cell; rendering depends on the variant
#[derive(Debug, Clone)]
pub enum CellValue {
    Id(RecordId),
    Text(String),
    Currency(f64),
    Date(Option<DateTime<Utc>>),
    Badge(Badge),
    Percent(f64),
    Flag(bool),
}

impl CellValue {
    /// Unstyled text, used by every format
    pub fn plain(&self) -> String {
        match self {
            CellValue::Id(id) => id.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Currency(v) => format_currency(*v),
            CellValue::Date(dt) => format_optional_date(dt.as_ref()),
            CellValue::Badge(b) => b.label.to_string(),
            CellValue::Percent(p) => format!("{:.0}%", p),
            CellValue::Flag(true) => "yes".to_string(),
            CellValue::Flag(false) => "no".to_string(),
        }
    }
}

/// A record flattened to cells keyed by column
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: RecordId,
    cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    fn text(&self, key: &str) -> String {
        self.get(key).map(|v| v.plain()).unwrap_or_default()
    }
}

pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    entity_plural: &'static str,
}

impl<'a> TableFormatter<'a> {
    pub fn new(
        columns: &'a [ColumnDef],
        entity_name: &'static str,
        entity_plural: &'static str,
    ) -> Self {
        Self {
            columns,
            entity_name,
            entity_plural,
        }
    }

    /// Columns named in `visible`, in declaration order; all when empty
    fn selected(&self, visible: &[&str]) -> Vec<&ColumnDef> {
        self.columns
            .iter()
            .filter(|c| visible.is_empty() || visible.contains(&c.key))
            .collect()
    }

    /// Render to a string
    pub fn render(&self, rows: &[TableRow], format: OutputFormat, visible: &[&str]) -> String {
        let columns = self.selected(visible);
        match format {
            OutputFormat::Id => rows.iter().map(|r| format!("{}\n", r.id)).collect(),
            OutputFormat::Tsv => self.render_delimited(rows, &columns, "\t", |s| {
                s.replace(['\t', '\n'], " ")
            }),
            OutputFormat::Csv => self.render_delimited(rows, &columns, ",", escape_csv),
            OutputFormat::Md => self.render_markdown(rows, &columns),
            _ => self.render_table(rows, &columns),
        }
    }

    /// Print rows; table output gets a count footer
    pub fn output(&self, rows: Vec<TableRow>, format: OutputFormat, visible: &[&str]) {
        print!("{}", self.render(&rows, format, visible));
        if matches!(format, OutputFormat::Table | OutputFormat::Auto) {
            println!();
            println!("{} {} shown.", rows.len(), self.noun(rows.len()));
        }
    }

    pub fn noun(&self, count: usize) -> &'static str {
        if count == 1 {
            self.entity_name
        } else {
            self.entity_plural
        }
    }

    fn render_table(&self, rows: &[TableRow], columns: &[&ColumnDef]) -> String {
        let mut builder = Builder::default();
        builder.push_record(columns.iter().map(|c| c.header.to_string()));
        for row in rows {
            builder.push_record(
                columns
                    .iter()
                    .map(|c| truncate_str(&row.text(c.key), c.width)),
            );
        }
        let mut table = builder.build();
        table.with(Style::rounded());
        format!("{}\n", table)
    }

    fn render_delimited(
        &self,
        rows: &[TableRow],
        columns: &[&ColumnDef],
        sep: &str,
        escape: impl Fn(&str) -> String,
    ) -> String {
        let mut out = String::new();
        let header: Vec<String> = columns.iter().map(|c| c.key.to_string()).collect();
        out.push_str(&header.join(sep));
        out.push('\n');
        for row in rows {
            let line: Vec<String> = columns.iter().map(|c| escape(&row.text(c.key))).collect();
            out.push_str(&line.join(sep));
            out.push('\n');
        }
        out
    }

    fn render_markdown(&self, rows: &[TableRow], columns: &[&ColumnDef]) -> String {
        let mut out = String::new();
        let header: Vec<&str> = columns.iter().map(|c| c.header).collect();
        out.push_str(&format!("| {} |\n", header.join(" | ")));
        out.push_str(&format!("|{}\n", "---|".repeat(columns.len())));
        for row in rows {
            let cells: Vec<String> = columns.iter().map(|c| escape_md(&row.text(c.key))).collect();
            out.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
        out
    }
}
