//! Tabular query results

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Text used for the sentinel field and row of an empty result
pub const NO_RESULTS: &str = "No Results";

/// Query results: ordered field names plus rows of display strings.
///
/// Every row holds exactly one value per field. An empty `rows` vector is a
/// valid "no results" state; see [`TabularResult::or_sentinel`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TabularResult {
    fields: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// Wire shape of a result document, before row values are stringified
#[derive(Debug, Deserialize)]
struct RawResult {
    fields: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

impl TabularResult {
    /// Create a result, checking that every row matches the field count
    pub fn new(fields: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != fields.len() {
                return Err(Error::RaggedRow {
                    row: i,
                    expected: fields.len(),
                    actual: row.len(),
                });
            }
        }
        Ok(Self { fields, rows })
    }

    /// Create a result with fields and no rows
    pub fn empty(fields: Vec<String>) -> Self {
        Self {
            fields,
            rows: Vec::new(),
        }
    }

    /// The "No Results" sentinel: one field, one row, both "No Results"
    pub fn no_results() -> Self {
        Self {
            fields: vec![NO_RESULTS.to_string()],
            rows: vec![vec![NO_RESULTS.to_string()]],
        }
    }

    /// Decode `{"fields": [...], "rows": [[...], ...]}`.
    ///
    /// Non-string values are converted to their display form: numbers and
    /// booleans use their JSON text and `null` becomes an empty string.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawResult = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Decode from an already-parsed JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawResult = serde_json::from_value(value)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawResult) -> Result<Self> {
        let rows = raw
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(display_value).collect())
            .collect();
        Self::new(raw.fields, rows)
    }

    /// Field (column) names in order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Data rows in order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of fields
    pub fn column_count(&self) -> usize {
        self.fields.len()
    }

    /// Whether there are no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column across all rows, in row order
    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or_default())
    }

    /// This result, or the sentinel when it has no rows
    pub fn or_sentinel(&self) -> Cow<'_, TabularResult> {
        if self.is_empty() {
            Cow::Owned(Self::no_results())
        } else {
            Cow::Borrowed(self)
        }
    }
}

fn display_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_new_rejects_ragged_rows() {
        let err = TabularResult::new(
            strings(&["Time", "CPU"]),
            vec![strings(&["10:00", "5"]), strings(&["11:00"])],
        )
        .unwrap_err();

        match err {
            Error::RaggedRow {
                row,
                expected,
                actual,
            } => {
                assert_eq!((row, expected, actual), (1, 2, 1));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_from_json() {
        let result = TabularResult::from_json(
            r#"{"fields": ["Host", "Count", "Ok"], "rows": [["web1", 42, true], ["web2", "7", null]]}"#,
        )
        .unwrap();

        assert_eq!(result.fields(), &strings(&["Host", "Count", "Ok"]));
        assert_eq!(result.rows()[0], strings(&["web1", "42", "true"]));
        assert_eq!(result.rows()[1], strings(&["web2", "7", ""]));
    }

    #[test]
    fn test_from_json_without_rows() {
        let result = TabularResult::from_json(r#"{"fields": ["Host"]}"#).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.column_count(), 1);
    }

    #[test]
    fn test_from_json_errors() {
        assert!(matches!(
            TabularResult::from_json("not json"),
            Err(Error::Json(_))
        ));
        assert!(matches!(
            TabularResult::from_json(r#"{"fields": ["a", "b"], "rows": [["1"]]}"#),
            Err(Error::RaggedRow { .. })
        ));
    }

    #[test]
    fn test_or_sentinel() {
        let empty = TabularResult::empty(strings(&["Time", "CPU"]));
        let sentinel = empty.or_sentinel();
        assert_eq!(sentinel.fields(), &strings(&[NO_RESULTS]));
        assert_eq!(sentinel.rows(), &[strings(&[NO_RESULTS])]);

        let full = TabularResult::new(strings(&["a"]), vec![strings(&["1"])]).unwrap();
        assert!(matches!(full.or_sentinel(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_column() {
        let result = TabularResult::new(
            strings(&["Time", "CPU"]),
            vec![strings(&["10:00", "5"]), strings(&["11:00", "6"])],
        )
        .unwrap();

        let cpu: Vec<&str> = result.column(1).collect();
        assert_eq!(cpu, vec!["5", "6"]);
    }
}
