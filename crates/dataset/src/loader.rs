use crate::error::DatasetError;
use core_types::{RecordSet, SaleRecord};
use std::fs;
use std::path::{Path, PathBuf};

/// Reads a JSON array of sales from `path` and keeps the rows that pass validation.
pub fn load_record_set(path: &Path) -> Result<RecordSet, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<SaleRecord> = serde_json::from_str(&text).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let set = prepare(rows);
    tracing::info!(path = %path.display(), rows = set.len(), item = set.item_label(), "Loaded record file.");
    Ok(set)
}

/// Loads one `RecordSet` per file, in the order given.
pub fn load_record_sets(paths: &[PathBuf]) -> Result<Vec<RecordSet>, DatasetError> {
    if paths.is_empty() {
        return Err(DatasetError::NoFiles);
    }
    paths.iter().map(|p| load_record_set(p)).collect()
}

/// Drops rows that violate the record invariants (negative price, zero quantity).
pub fn prepare(rows: Vec<SaleRecord>) -> RecordSet {
    let total = rows.len();
    let kept: RecordSet = rows
        .into_iter()
        .filter(|row| match row.validate() {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(date = %row.sold_date, "Dropping row: {}", e);
                false
            }
        })
        .collect();

    let dropped = total - kept.len();
    if dropped > 0 {
        tracing::warn!(dropped, total, "Dropped rows that failed validation.");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn write_json(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_drops_invalid_rows() {
        let file = write_json(
            r#"[
                {"sold_date": "2021-05-01", "total_price": "650.00", "shipping": "15", "quantity": 1,
                 "is_store_seller": true, "seller_name": "gpu-outlet", "seller_feedback_score": 1200,
                 "brand": "EVGA", "msrp_reference": "499", "item_label": "RTX 3070"},
                {"sold_date": "2021-05-01", "total_price": -4, "quantity": 1, "item_label": "RTX 3070"},
                {"sold_date": "2021-05-02", "total_price": 700, "quantity": 0, "item_label": "RTX 3070"},
                {"sold_date": "2021-05-02", "total_price": 710, "quantity": 2, "item_label": "RTX 3070"}
            ]"#,
        );
        let set = load_record_set(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.msrp(), dec!(499));
        assert_eq!(set.records()[0].seller_feedback_score, Some(1200));
        assert_eq!(set.records()[1].quantity, 2);
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let file = write_json("{ not json");
        assert!(matches!(load_record_set(file.path()), Err(DatasetError::Json { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_record_set(Path::new("/no/such/records.json"));
        assert!(matches!(result, Err(DatasetError::Io { .. })));
    }

    #[test]
    fn no_paths_is_an_error() {
        assert!(matches!(load_record_sets(&[]), Err(DatasetError::NoFiles)));
    }
}
