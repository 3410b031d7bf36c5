use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::store::{Provider, TitleRecord};

/// Header label of the column carrying the IMDb link.
pub const ID_COLUMN: &str = "IMDb";

// Anchored: only hrefs that are themselves IMDb title URLs count.
static IMDB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://(?:www\.)?imdb\.com/title/(tt\d+)").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Extract one listing row. Cells align positionally with `headers`; a count
/// mismatch silently truncates to the shorter side. Rows whose id column has
/// no IMDb-pattern link yield `None` for the id and are dropped by the caller.
pub fn extract_row(cells: &[ElementRef], headers: &[String]) -> (Option<String>, TitleRecord) {
    let mut id = None;
    let mut record = TitleRecord::default();

    for (cell, header) in cells.iter().zip(headers) {
        match header.as_str() {
            ID_COLUMN => {
                id = cell
                    .select(&LINK)
                    .find_map(|a| imdb_id(a.value().attr("href")?));
            }
            "Title" => record.title = Some(cell_text(cell)),
            "Release Year" => record.release_year = Some(cell_text(cell)),
            "Media Type" => record.media_type = Some(cell_text(cell)),
            "Rating" => record.rating = Some(cell_text(cell)),
            "Genre" => record.genre = Some(cell_text(cell)),
            "Providers" => {
                let providers: Vec<Provider> = cell
                    .select(&LINK)
                    .map(|a| Provider {
                        name: cell_text(&a),
                        url: a.value().attr("href").unwrap_or_default().to_string(),
                    })
                    .collect();
                record.providers = Some(providers);
                record.in_theaters = Some(cell_text(cell).contains("Cinema"));
            }
            // Columns outside the known set are not stored.
            _ => {}
        }
    }

    (id, record)
}

/// First capture of the IMDb title pattern, matched from the start of the href.
fn imdb_id(href: &str) -> Option<String> {
    IMDB_RE.captures(href).map(|caps| caps[1].to_string())
}

/// Visible text of an element: each text node trimmed, empties dropped,
/// joined with ", " (multi-value cells render as comma-joined text).
pub fn cell_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn run_row(row_html: &str, headers: &[&str]) -> (Option<String>, TitleRecord) {
        let doc = Html::parse_document(&format!("<table><tbody>{}</tbody></table>", row_html));
        let row_sel = Selector::parse("tbody tr").unwrap();
        let cell_sel = Selector::parse("td").unwrap();
        let row = doc.select(&row_sel).next().unwrap();
        let cells: Vec<_> = row.select(&cell_sel).collect();
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        extract_row(&cells, &headers)
    }

    #[test]
    fn full_row() {
        let (id, record) = run_row(
            "<tr>\
             <td>Example Movie</td>\
             <td>2023</td>\
             <td>Movie</td>\
             <td>PG-13</td>\
             <td>Drama, Comedy</td>\
             <td><a href=\"https://www.imdb.com/title/tt1234567\">IMDb</a></td>\
             <td><a href=\"https://example.com/stream\">Netflix</a></td>\
             </tr>",
            &["Title", "Release Year", "Media Type", "Rating", "Genre", "IMDb", "Providers"],
        );
        assert_eq!(id.as_deref(), Some("tt1234567"));
        assert_eq!(record.title.as_deref(), Some("Example Movie"));
        assert_eq!(record.release_year.as_deref(), Some("2023"));
        assert_eq!(record.media_type.as_deref(), Some("Movie"));
        assert_eq!(record.rating.as_deref(), Some("PG-13"));
        assert_eq!(record.genre.as_deref(), Some("Drama, Comedy"));
        assert_eq!(record.in_theaters, Some(false));
    }

    #[test]
    fn no_imdb_link_yields_no_id() {
        let (id, record) = run_row(
            "<tr><td>Example Movie</td><td>no links here</td></tr>",
            &["Title", "IMDb"],
        );
        assert!(id.is_none());
        assert_eq!(record.title.as_deref(), Some("Example Movie"));
    }

    #[test]
    fn non_imdb_links_skipped_until_match() {
        let (id, _) = run_row(
            "<tr><td>\
             <a href=\"https://example.com/tt9999999\">other</a>\
             <a href=\"http://imdb.com/title/tt0000042\">imdb</a>\
             </td></tr>",
            &["IMDb"],
        );
        assert_eq!(id.as_deref(), Some("tt0000042"));
    }

    #[test]
    fn imdb_pattern_is_anchored() {
        // re.match semantics: a match mid-string does not count
        let (id, _) = run_row(
            "<tr><td><a href=\"https://tracker.example/?to=https://www.imdb.com/title/tt1111111\">x</a></td></tr>",
            &["IMDb"],
        );
        assert!(id.is_none());
    }

    #[test]
    fn providers_collected_in_document_order() {
        let (_, record) = run_row(
            "<tr><td>\
             <a href=\"https://a.example/1\">Cinema</a> \
             <a href=\"https://b.example/2\">Hulu</a>\
             </td></tr>",
            &["Providers"],
        );
        let providers = record.providers.unwrap();
        assert_eq!(providers.len(), 2);
        assert_eq!(providers[0].name, "Cinema");
        assert_eq!(providers[0].url, "https://a.example/1");
        assert_eq!(providers[1].name, "Hulu");
        assert_eq!(record.in_theaters, Some(true));
    }

    #[test]
    fn in_theaters_from_plain_cell_text() {
        // "Cinema" may appear as bare text rather than a link label
        let (_, record) = run_row(
            "<tr><td>Cinema <a href=\"https://b.example/2\">Hulu</a></td></tr>",
            &["Providers"],
        );
        assert_eq!(record.providers.unwrap().len(), 1);
        assert_eq!(record.in_theaters, Some(true));
    }

    #[test]
    fn unknown_headers_ignored() {
        let (_, record) = run_row(
            "<tr><td>ignored</td><td>Example Movie</td></tr>",
            &["Audio Description", "Title"],
        );
        assert_eq!(record, TitleRecord {
            title: Some("Example Movie".to_string()),
            ..Default::default()
        });
    }

    #[test]
    fn multi_node_text_joined_with_comma() {
        let (_, record) = run_row(
            "<tr><td><span>Drama</span><span>Comedy</span></td></tr>",
            &["Genre"],
        );
        assert_eq!(record.genre.as_deref(), Some("Drama, Comedy"));
    }

    #[test]
    fn extra_cells_truncated() {
        let (_, record) = run_row(
            "<tr><td>Example Movie</td><td>2023</td><td>stray</td></tr>",
            &["Title", "Release Year"],
        );
        assert_eq!(record.title.as_deref(), Some("Example Movie"));
        assert_eq!(record.release_year.as_deref(), Some("2023"));
    }
}
