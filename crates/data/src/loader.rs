//! CSV loading into untyped header -> text rows.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::DataError;

/// One CSV record as header -> text mapping.
///
/// Values stay untyped here; coercion happens in the preprocessor so that a
/// bad price cell degrades to NaN instead of failing the whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: HashMap<String, String>,
}

impl RawRow {
    /// Returns the value stored under `key` exactly as spelled.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns the value of the first key present, in the given preference order.
    ///
    /// A present-but-empty cell still wins over later spellings.
    #[must_use]
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }

    /// Number of fields in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Loads all records of a headed CSV file.
///
/// # Errors
/// - [`DataError::FileNotFound`] when the file cannot be opened.
/// - [`DataError::ParseError`] when the CSV is malformed.
pub fn load_raw_rows(path: &Path) -> Result<Vec<RawRow>, DataError> {
    let file = std::fs::File::open(path)
        .map_err(|e| DataError::FileNotFound(path.display().to_string(), e.to_string()))?;
    let rows = read_raw_rows(std::io::BufReader::new(file))?;
    tracing::debug!(path = %path.display(), records = rows.len(), "csv loaded");
    Ok(rows)
}

/// Reads all records of a headed CSV document.
///
/// Short records are accepted; their missing trailing cells are absent from
/// the resulting rows.
///
/// # Errors
/// [`DataError::ParseError`] when the CSV is malformed.
pub fn read_raw_rows<R: Read>(reader: R) -> Result<Vec<RawRow>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .collect::<RawRow>(),
        );
    }
    Ok(rows)
}
