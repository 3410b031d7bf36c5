pub mod row;

use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::warn;

use crate::store::TitleMap;

static CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.table-responsive").unwrap());
static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static HEADER: LazyLock<Selector> = LazyLock::new(|| Selector::parse("thead th").unwrap());
static BODY_ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tbody tr").unwrap());
static CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Extract the results table of one listing page into id → record.
///
/// `None` means the page has no `div.table-responsive`/`table` structure —
/// the catalog renders pages past the end without the table, so this is the
/// pagination termination signal, not an error. A table with an empty body
/// yields `Some` of an empty map.
pub fn extract_listing(html: &str) -> Option<TitleMap> {
    let doc = Html::parse_document(html);
    let container = doc.select(&CONTAINER).next()?;
    let table = container.select(&TABLE).next()?;

    let headers: Vec<String> = table
        .select(&HEADER)
        .map(|th| row::cell_text(&th))
        .collect();

    let mut titles = TitleMap::new();
    let mut dropped = 0usize;
    for tr in table.select(&BODY_ROW) {
        let cells: Vec<_> = tr.select(&CELL).collect();
        match row::extract_row(&cells, &headers) {
            (Some(id), record) => {
                // Same-page duplicate ids: last row wins
                titles.insert(id, record);
            }
            (None, _) => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!("Dropped {} row(s) without a resolvable IMDb id", dropped);
    }

    Some(titles)
}

// ── Tests ──
