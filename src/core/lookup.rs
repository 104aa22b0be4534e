//! Lookup Table - LMK_KEY / address indexed feature rows
//!
//! Loaded once from CSV at startup and read-only afterwards. Every column
//! except the reserved ones is a numeric model feature, kept in header order.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{COL_LMK_KEY, COL_PROPERTY_ADDRESS, RESERVED_COLUMNS};

/// One property
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRow {
    pub lmk_key: String,
    pub address: String,
    pub address_lower: String,
    pub features: Vec<f64>,
}

/// In-memory feature table
#[derive(Debug, Default)]
pub struct LookupTable {
    feature_names: Vec<String>,
    rows: Vec<LookupRow>,
    by_key: HashMap<String, usize>,
}

impl LookupTable {
    /// Load from a CSV file on disk
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::lookup_load_failed(format!(
                "Cannot open lookup table {}: {}",
                path.display(),
                e
            ))
        })?;
        let table = Self::from_reader(file)?;
        info!(
            "📚 Lookup table loaded: {} rows, {} features from {}",
            table.len(),
            table.feature_names().len(),
            path.display()
        );
        Ok(table)
    }

    /// Load from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                AppError::lookup_load_failed(format!("Lookup table has no '{}' column", name))
            })
        };
        let key_idx = column(COL_LMK_KEY)?;
        let address_idx = column(COL_PROPERTY_ADDRESS)?;

        let feature_columns: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !RESERVED_COLUMNS.contains(name))
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        let mut table = Self {
            feature_names: feature_columns.iter().map(|(_, n)| n.clone()).collect(),
            ..Self::default()
        };

        for (line, record) in csv_reader.records().enumerate() {
            let record = record?;
            // header is line 1
            let line = line + 2;

            let lmk_key = record.get(key_idx).unwrap_or_default().to_string();
            if lmk_key.is_empty() {
                return Err(AppError::lookup_load_failed(format!(
                    "Empty {} on line {}",
                    COL_LMK_KEY, line
                )));
            }
            if table.by_key.contains_key(&lmk_key) {
                return Err(AppError::lookup_load_failed(format!(
                    "Duplicate {} '{}' on line {}",
                    COL_LMK_KEY, lmk_key, line
                )));
            }

            let address = record.get(address_idx).unwrap_or_default().to_string();
            let features = feature_columns
                .iter()
                .map(|(idx, name)| parse_feature(record.get(*idx).unwrap_or_default(), name, line))
                .collect::<AppResult<Vec<f64>>>()?;

            table.by_key.insert(lmk_key.clone(), table.rows.len());
            table.rows.push(LookupRow {
                lmk_key,
                address_lower: address.to_lowercase(),
                address,
                features,
            });
        }

        Ok(table)
    }

    /// Row for an exact LMK_KEY
    pub fn by_identifier(&self, lmk_key: &str) -> Option<&LookupRow> {
        self.by_key.get(lmk_key).map(|&idx| &self.rows[idx])
    }

    /// First row whose address matches case-insensitively, in file order
    pub fn by_address(&self, address: &str) -> Option<&LookupRow> {
        let needle = address.to_lowercase();
        self.rows.iter().find(|row| row.address_lower == needle)
    }

    /// Feature column names, in the order models receive them
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Empty cells become NaN; anything else must be numeric
fn parse_feature(raw: &str, column: &str, line: usize) -> AppResult<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse::<f64>().map_err(|_| {
        AppError::lookup_load_failed(format!(
            "Non-numeric value '{}' in column {} on line {}",
            raw, column, line
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::errors::ErrorCode;

    const SAMPLE: &str = "\
LMK_KEY,PROPERTY_ADDRESS,CURRENT_ENERGY_EFFICIENCY,TOTAL_FLOOR_AREA
K1,\"36, Lea Hall Green, B20 2AW\",72,85.0
K2,\"7 Mill Lane, York, YO1 7HH\",40,
K3,\"7 MILL LANE, YORK, YO1 7HH\",55,60.5
";

    fn table() -> LookupTable {
        LookupTable::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_features_exclude_reserved_columns() {
        let table = table();
        assert_eq!(
            table.feature_names(),
            &["CURRENT_ENERGY_EFFICIENCY", "TOTAL_FLOOR_AREA"]
        );
        let row = table.by_identifier("K1").unwrap();
        assert_eq!(row.features, vec![72.0, 85.0]);
        assert_eq!(row.address, "36, Lea Hall Green, B20 2AW");
    }

    #[test]
    fn test_identifier_miss() {
        assert!(table().by_identifier("K9").is_none());
        assert!(table().by_identifier("k1").is_none());
    }

    #[test]
    fn test_address_is_case_insensitive() {
        let table = table();
        let a = table.by_address("36, Lea Hall Green, B20 2AW").unwrap();
        let b = table.by_address("36, LEA HALL GREEN, b20 2aw").unwrap();
        assert_eq!(a.lmk_key, "K1");
        assert_eq!(a, b);
        assert!(table.by_address("36 Lea Hall Green").is_none());
    }

    #[test]
    fn test_address_first_match_wins() {
        let table = table();
        let row = table.by_address("7 mill lane, york, yo1 7hh").unwrap();
        assert_eq!(row.lmk_key, "K2");
    }

    #[test]
    fn test_empty_cell_is_nan() {
        let table = table();
        let row = table.by_identifier("K2").unwrap();
        assert_eq!(row.features[0], 40.0);
        assert!(row.features[1].is_nan());
    }

    #[test]
    fn test_existing_lowercase_column_is_not_a_feature() {
        let csv = "LMK_KEY,PROPERTY_ADDRESS,ADDRESS_LOWER,X\nK1,A Street,a street,1\n";
        let table = LookupTable::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(table.feature_names(), &["X"]);
        assert_eq!(table.by_identifier("K1").unwrap().features, vec![1.0]);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let csv = "LMK_KEY,PROPERTY_ADDRESS,X\nK1,A,1\nK1,B,2\n";
        let err = LookupTable::from_reader(csv.as_bytes()).unwrap_err();
        assert_eq!(err.code, ErrorCode::LookupLoadFailed);
        assert!(err.message.contains("Duplicate"));
    }

    #[test]
    fn test_missing_column_rejected() {
        let csv = "LMK_KEY,X\nK1,1\n";
        let err = LookupTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.message.contains("PROPERTY_ADDRESS"));
    }

    #[test]
    fn test_non_numeric_feature_rejected() {
        let csv = "LMK_KEY,PROPERTY_ADDRESS,X\nK1,A,semi-detached\n";
        let err = LookupTable::from_reader(csv.as_bytes()).unwrap_err();
        assert!(err.message.contains("line 2"), "{}", err.message);
    }
}
