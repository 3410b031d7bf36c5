use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// One streaming/availability entry from a title's Providers cell,
/// in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub url: String,
}

/// Metadata scraped for one catalog title. Fields mirror the listing table's
/// column labels; a column missing from a page's header row stays `None` and
/// is omitted from the serialized JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Release Year", default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<String>,
    #[serde(rename = "Media Type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(rename = "Rating", default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(rename = "Genre", default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(rename = "Providers", default, skip_serializing_if = "Option::is_none")]
    pub providers: Option<Vec<Provider>>,
    #[serde(rename = "in_theaters", default, skip_serializing_if = "Option::is_none")]
    pub in_theaters: Option<bool>,
}

/// IMDb id → record. BTreeMap keeps the aggregate file stable across runs.
pub type TitleMap = BTreeMap<String, TitleRecord>;

/// Load the aggregate store. A missing file is an empty store; anything else
/// that fails (unreadable, corrupt JSON) propagates.
pub fn load(store_path: &Path) -> Result<TitleMap> {
    let raw = match fs::read_to_string(store_path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TitleMap::new()),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read {}", store_path.display()))
        }
    };
    serde_json::from_str(&raw)
        .with_context(|| format!("Corrupt aggregate store {}", store_path.display()))
}

/// Union `new_records` into the previously persisted store (new data wins on
/// id collision), then rewrite the full aggregate plus one `<id>.json` per
/// title. Returns the total number of titles in the unioned store.
pub fn persist(store_path: &Path, out_dir: &Path, new_records: &TitleMap) -> Result<usize> {
    let mut store = load(store_path)?;
    store.extend(new_records.iter().map(|(id, r)| (id.clone(), r.clone())));

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    for (id, record) in &store {
        let path = out_dir.join(format!("{}.json", id));
        fs::write(&path, serde_json::to_string_pretty(record)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    fs::write(store_path, serde_json::to_string_pretty(&store)?)
        .with_context(|| format!("Failed to write {}", store_path.display()))?;
    Ok(store.len())
}

// ── Tests ──
