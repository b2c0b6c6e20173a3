//! Shared helpers for command implementations

use chrono::{DateTime, Duration, Utc};
use console::style;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::http::HttpBackend;
use crate::core::list::{ListPage, ListView, NoticeLevel};
use crate::core::record::Record;

/// Resolve config, fetch the snapshot and surface load notices
pub fn open_view<R: Record>(global: &GlobalOpts) -> miette::Result<ListView<R, HttpBackend>> {
    let config = global.config()?;
    open_view_with(&config)
}

pub fn open_view_with<R: Record>(config: &Config) -> miette::Result<ListView<R, HttpBackend>> {
    let mut view = ListView::new(HttpBackend::new(config), config.page_size());
    view.refresh()?;
    print_notices(&mut view);
    Ok(view)
}

/// Print pending notices to stderr and clear them
pub fn print_notices<R: Record, B>(view: &mut ListView<R, B>)
where
    B: crate::core::backend::Backend,
{
    let notices: Vec<_> = view.notices().to_vec();
    for notice in notices {
        match notice.level {
            NoticeLevel::Error => eprintln!("{} {}", style("!").yellow(), notice.message),
            NoticeLevel::Info => eprintln!("{} {}", style("✓").green(), notice.message),
        }
        view.dismiss(notice.id);
    }
}

/// Cutoff for "created in the last N days"
pub fn days_ago(days: u32) -> DateTime<Utc> {
    Utc::now() - Duration::days(i64::from(days))
}

/// `Page 2 of 5 (43 matching, 50 loaded)`
pub fn page_footer<R>(page: &ListPage<'_, R>) -> String {
    format!(
        "Page {} of {} ({} matching, {} loaded)",
        page.number, page.total_pages, page.total_items, page.total_loaded
    )
}
