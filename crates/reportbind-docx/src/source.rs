//! Result sources

use std::collections::HashMap;

use reportbind_core::TabularResult;

/// Supplies values for placeholders by title
pub trait ResultSource {
    /// Scalar value of a report parameter
    fn scalar(&self, name: &str) -> Option<&str>;

    /// Tabular result of a single-value, table or chart placeholder
    fn table(&self, title: &str) -> Option<&TabularResult>;
}

/// In-memory results, keyed by placeholder title
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    parameters: HashMap<String, String>,
    results: HashMap<String, TabularResult>,
}

impl ResultSet {
    /// Create an empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a report parameter (builder style)
    pub fn with_parameter<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.insert_parameter(name, value);
        self
    }

    /// Add a tabular result (builder style)
    pub fn with_result<K: Into<String>>(mut self, title: K, result: TabularResult) -> Self {
        self.insert_result(title, result);
        self
    }

    /// Set a report parameter, returning the previous value
    pub fn insert_parameter<K: Into<String>, V: Into<String>>(
        &mut self,
        name: K,
        value: V,
    ) -> Option<String> {
        self.parameters.insert(name.into(), value.into())
    }

    /// Set a tabular result, returning the previous one
    pub fn insert_result<K: Into<String>>(
        &mut self,
        title: K,
        result: TabularResult,
    ) -> Option<TabularResult> {
        self.results.insert(title.into(), result)
    }

    /// Whether a parameter is set
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }

    /// Number of parameters and results
    pub fn len(&self) -> usize {
        self.parameters.len() + self.results.len()
    }

    /// Whether there are no parameters or results
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.results.is_empty()
    }
}

impl ResultSource for ResultSet {
    fn scalar(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    fn table(&self, title: &str) -> Option<&TabularResult> {
        self.results.get(title)
    }
}
