//! CSV bulk import and export for the catalog.
//!
//! Expected columns (header names matched case-insensitively): `url`,
//! `title` and `h1` are required; `h2` (semicolon- or comma-separated) and
//! `meta_description` are optional. Rows with missing required fields are
//! reported and skipped; the rest still import.

use std::path::Path;

use crate::catalog::{CatalogError, CatalogRecord, CatalogStore};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Missing required columns: {0}")]
    MissingColumns(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Result of a bulk import: how many rows landed, and what went wrong with
/// the ones that did not.
#[derive(Debug)]
pub struct ImportOutcome {
    pub imported: usize,
    pub errors: Vec<String>,
}

const REQUIRED_COLUMNS: [&str; 3] = ["url", "title", "h1"];

/// Import catalog records from a CSV file, persisting once at the end.
pub fn import_csv(path: &Path, catalog: &mut CatalogStore) -> Result<ImportOutcome, ImportError> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(ImportError::MissingColumns(missing.join(", ")));
    }

    let column = |name: &str| headers.iter().position(|h| h == name);
    let url_col = column("url").expect("checked above");
    let title_col = column("title").expect("checked above");
    let h1_col = column("h1").expect("checked above");
    let h2_col = column("h2");
    let meta_col = column("meta_description");

    let mut records = Vec::new();
    let mut errors = Vec::new();

    for (idx, row) in reader.records().enumerate() {
        // 1-based data row numbers, matching what a user sees past the
        // header in a spreadsheet viewer.
        let row_number = idx + 1;

        let row = match row {
            Ok(row) => row,
            Err(err) => {
                errors.push(format!("row {row_number}: {err}"));
                continue;
            }
        };

        let field = |col: usize| row.get(col).unwrap_or_default().trim().to_string();
        let url = field(url_col);
        let title = field(title_col);
        let h1 = field(h1_col);

        if url.is_empty() || title.is_empty() || h1.is_empty() {
            errors.push(format!(
                "row {row_number}: missing required field (url, title, or h1)"
            ));
            continue;
        }

        let h2 = h2_col.map(|col| parse_h2(&field(col))).unwrap_or_default();
        let meta_description = meta_col.map(field).unwrap_or_default();

        records.push(CatalogRecord {
            url,
            title,
            h1,
            h2,
            meta_description,
            added_at: None,
        });
    }

    let imported = records.len();
    if imported > 0 {
        catalog.extend(records)?;
    }

    log::info!(
        "Imported {imported} records from {} ({} rows skipped)",
        path.display(),
        errors.len()
    );

    Ok(ImportOutcome { imported, errors })
}

/// Export catalog records to a CSV file with the import column layout.
pub fn export_csv(path: &Path, records: &[CatalogRecord]) -> Result<(), ImportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["url", "title", "h1", "h2", "meta_description"])?;

    for record in records {
        writer.write_record([
            &record.url,
            &record.title,
            &record.h1,
            &record.h2.join("; "),
            &record.meta_description,
        ])?;
    }

    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Subheadings arrive either semicolon- or comma-separated.
fn parse_h2(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return vec![];
    }
    let separator = if raw.contains(';') { ';' } else { ',' };
    raw.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BackendLocal;
    use std::io::Write;

    fn open_store(dir: &std::path::Path) -> CatalogStore {
        let backend = BackendLocal::new(dir).unwrap();
        CatalogStore::load(Box::new(backend)).unwrap()
    }

    fn write_csv(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
        let path = dir.join("urls.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_import_basic() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(
            dir.path(),
            "url,title,h1,h2,meta_description\n\
             https://e.com/a,Page A,Heading A,Sub 1; Sub 2,Meta A\n\
             https://e.com/b,Page B,Heading B,,\n",
        );

        let mut catalog = open_store(dir.path());
        let outcome = import_csv(&csv_path, &mut catalog).unwrap();

        assert_eq!(outcome.imported, 2);
        assert!(outcome.errors.is_empty());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.records()[0].h2, vec!["Sub 1", "Sub 2"]);
        assert!(catalog.records()[0].added_at.is_some());
    }

    #[test]
    fn test_import_headers_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(
            dir.path(),
            "URL, Title ,H1\nhttps://e.com/a,Page A,Heading A\n",
        );

        let mut catalog = open_store(dir.path());
        let outcome = import_csv(&csv_path, &mut catalog).unwrap();

        assert_eq!(outcome.imported, 1);
        assert_eq!(catalog.records()[0].title, "Page A");
    }

    #[test]
    fn test_import_missing_columns() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(dir.path(), "url,title\nhttps://e.com/a,Page A\n");

        let mut catalog = open_store(dir.path());
        let result = import_csv(&csv_path, &mut catalog);

        match result {
            Err(ImportError::MissingColumns(cols)) => assert_eq!(cols, "h1"),
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_import_skips_incomplete_rows() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(
            dir.path(),
            "url,title,h1\n\
             https://e.com/a,Page A,Heading A\n\
             https://e.com/b,,Heading B\n\
             https://e.com/c,Page C,Heading C\n",
        );

        let mut catalog = open_store(dir.path());
        let outcome = import_csv(&csv_path, &mut catalog).unwrap();

        assert_eq!(outcome.imported, 2);
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].starts_with("row 2:"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_import_comma_separated_h2() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_csv(
            dir.path(),
            "url,title,h1,h2\nhttps://e.com/a,Page A,Heading A,\"One, Two, Three\"\n",
        );

        let mut catalog = open_store(dir.path());
        import_csv(&csv_path, &mut catalog).unwrap();

        assert_eq!(catalog.records()[0].h2, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_export_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = open_store(dir.path());
        catalog
            .add(CatalogRecord {
                url: "https://e.com/a".to_string(),
                title: "Page A".to_string(),
                h1: "Heading A".to_string(),
                h2: vec!["Sub 1".to_string(), "Sub 2".to_string()],
                meta_description: "Meta A".to_string(),
                added_at: None,
            })
            .unwrap();

        let out_path = dir.path().join("export.csv");
        export_csv(&out_path, catalog.records()).unwrap();

        let other_dir = tempfile::tempdir().unwrap();
        let mut reimported = open_store(other_dir.path());
        let outcome = import_csv(&out_path, &mut reimported).unwrap();

        assert_eq!(outcome.imported, 1);
        let record = &reimported.records()[0];
        assert_eq!(record.url, "https://e.com/a");
        assert_eq!(record.h2, vec!["Sub 1", "Sub 2"]);
        assert_eq!(record.meta_description, "Meta A");
    }
}
