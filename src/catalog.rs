//! The URL catalog: linkable target pages and their JSON persistence.
//!
//! The suggestion engine never touches the store directly; callers take a
//! snapshot with [`CatalogStore::snapshot`] and pass it into `rank`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::StorageManager;

const CATALOG_FILE: &str = "catalog.json";

/// One linkable target page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Unique identifier and dedup key.
    pub url: String,
    pub title: String,
    pub h1: String,
    #[serde(default)]
    pub h2: Vec<String>,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

impl CatalogRecord {
    /// Text representation used for embedding and keyword matching.
    ///
    /// Derived on every read so it can never go stale against the fields.
    pub fn combined_text(&self) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(3 + self.h2.len());
        for part in [&self.title, &self.h1] {
            let part = part.trim();
            if !part.is_empty() {
                parts.push(part);
            }
        }
        for h2 in &self.h2 {
            let h2 = h2.trim();
            if !h2.is_empty() {
                parts.push(h2);
            }
        }
        let meta = self.meta_description.trim();
        if !meta.is_empty() {
            parts.push(meta);
        }

        parts.join(". ")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Record is missing a url")]
    MissingUrl,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    records: Vec<CatalogRecord>,
    #[serde(default)]
    last_updated: Option<DateTime<Utc>>,
}

/// Persistent catalog of linkable pages, keyed by url.
pub struct CatalogStore {
    store: Box<dyn StorageManager>,
    data: CatalogFile,
}

impl CatalogStore {
    /// Load the catalog from storage, starting empty when no file exists.
    pub fn load(store: Box<dyn StorageManager>) -> Result<Self, CatalogError> {
        let data = if store.exists(CATALOG_FILE) {
            let raw = store.read(CATALOG_FILE)?;
            serde_json::from_slice(&raw)?
        } else {
            log::info!("No catalog file yet, starting empty");
            CatalogFile::default()
        };

        Ok(Self { store, data })
    }

    pub fn len(&self) -> usize {
        self.data.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.records.is_empty()
    }

    /// All records, in insertion order.
    pub fn records(&self) -> &[CatalogRecord] {
        &self.data.records
    }

    /// An owned snapshot for one analysis run.
    pub fn snapshot(&self) -> Vec<CatalogRecord> {
        self.data.records.clone()
    }

    /// Insert a record, replacing any existing record with the same url,
    /// and persist the catalog.
    pub fn add(&mut self, record: CatalogRecord) -> Result<(), CatalogError> {
        self.insert(record)?;
        self.save()
    }

    /// Insert several records and persist once at the end.
    pub fn extend(
        &mut self,
        records: impl IntoIterator<Item = CatalogRecord>,
    ) -> Result<(), CatalogError> {
        for record in records {
            self.insert(record)?;
        }
        self.save()
    }

    /// Remove the record with the given url. Returns whether one existed.
    pub fn delete(&mut self, url: &str) -> Result<bool, CatalogError> {
        let before = self.data.records.len();
        self.data.records.retain(|r| r.url != url);

        if self.data.records.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Remove every record.
    pub fn clear(&mut self) -> Result<(), CatalogError> {
        self.data.records.clear();
        self.save()
    }

    fn insert(&mut self, mut record: CatalogRecord) -> Result<(), CatalogError> {
        if record.url.trim().is_empty() {
            return Err(CatalogError::MissingUrl);
        }
        if record.added_at.is_none() {
            record.added_at = Some(Utc::now());
        }

        match self.data.records.iter_mut().find(|r| r.url == record.url) {
            Some(existing) => *existing = record,
            None => self.data.records.push(record),
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), CatalogError> {
        self.data.last_updated = Some(Utc::now());
        let raw = serde_json::to_vec_pretty(&self.data)?;
        self.store.write(CATALOG_FILE, &raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BackendLocal;

    fn open_store(dir: &std::path::Path) -> CatalogStore {
        let backend = BackendLocal::new(dir).unwrap();
        CatalogStore::load(Box::new(backend)).unwrap()
    }

    fn record(url: &str, title: &str) -> CatalogRecord {
        CatalogRecord {
            url: url.to_string(),
            title: title.to_string(),
            h1: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = open_store(dir.path());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_add_and_reload() {
        let dir = tempfile::tempdir().unwrap();

        let mut catalog = open_store(dir.path());
        catalog.add(record("https://e.com/a", "Page A")).unwrap();
        catalog.add(record("https://e.com/b", "Page B")).unwrap();

        let reloaded = open_store(dir.path());
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.records()[0].url, "https://e.com/a");
        assert!(reloaded.records()[0].added_at.is_some());
    }

    #[test]
    fn test_add_same_url_replaces() {
        let dir = tempfile::tempdir().unwrap();

        let mut catalog = open_store(dir.path());
        catalog.add(record("https://e.com/a", "Old title")).unwrap();
        catalog.add(record("https://e.com/a", "New title")).unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.records()[0].title, "New title");
    }

    #[test]
    fn test_add_rejects_blank_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = open_store(dir.path());

        let result = catalog.add(record("   ", "Title"));
        assert!(matches!(result, Err(CatalogError::MissingUrl)));
    }

    #[test]
    fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = open_store(dir.path());
        catalog.add(record("https://e.com/a", "Page A")).unwrap();

        assert!(catalog.delete("https://e.com/a").unwrap());
        assert!(!catalog.delete("https://e.com/a").unwrap());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_clear_persists() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = open_store(dir.path());
        catalog.add(record("https://e.com/a", "Page A")).unwrap();
        catalog.clear().unwrap();

        let reloaded = open_store(dir.path());
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_combined_text_skips_empty_fields() {
        let record = CatalogRecord {
            url: "https://e.com/a".to_string(),
            title: "Title".to_string(),
            h1: String::new(),
            h2: vec!["First H2".to_string(), "  ".to_string()],
            meta_description: "A description".to_string(),
            added_at: None,
        };

        assert_eq!(record.combined_text(), "Title. First H2. A description");
    }

    #[test]
    fn test_combined_text_order() {
        let record = CatalogRecord {
            url: "https://e.com/a".to_string(),
            title: "Title".to_string(),
            h1: "Heading".to_string(),
            h2: vec!["Sub".to_string()],
            meta_description: "Meta".to_string(),
            added_at: None,
        };

        assert_eq!(record.combined_text(), "Title. Heading. Sub. Meta");
    }
}
