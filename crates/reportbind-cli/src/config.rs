//! Report configuration files
//!
//! ```json
//! {
//!   "template": "templates/weekly.docx",
//!   "output": "out/Weekly {Customer} {ReportDateTime}.docx",
//!   "table_style": "GridTable4-Accent1",
//!   "parameters": { "Customer": "Contoso" },
//!   "results": {
//!     "Hosts": "results/hosts.json",
//!     "Errors": { "fields": ["count"], "rows": [["3"]] }
//!   }
//! }
//! ```
//!
//! Relative paths resolve against the directory of the configuration file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use reportbind::{BindOptions, ResultSet, TabularResult, DEFAULT_TABLE_STYLE};
use serde::Deserialize;

use crate::timespec::{LONG_DATE_FORMAT, PARAMETER_FORMAT};

pub const REPORT_DATE_TIME: &str = "ReportDateTime";
pub const REPORT_LONG_DATE: &str = "ReportLongDate";
pub const EARLIEST_TIME: &str = "EarliestTime";
pub const LATEST_TIME: &str = "LatestTime";

const INVALID_FILE_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// One report: template, output location and the data to bind
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub template: PathBuf,
    /// Output path; `{Name}` in the file name is replaced by parameter `Name`
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_table_style")]
    pub table_style: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
    #[serde(default)]
    pub results: BTreeMap<String, ResultEntry>,
    #[serde(skip)]
    base_dir: PathBuf,
}

/// A result given as a path to a JSON file or inline
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResultEntry {
    File(PathBuf),
    Inline(serde_json::Value),
}

fn default_output() -> String {
    "report.docx".to_string()
}

fn default_table_style() -> String {
    DEFAULT_TABLE_STYLE.to_string()
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config '{}'", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_json(&json, base_dir)
            .with_context(|| format!("Invalid config '{}'", path.display()))
    }

    pub fn from_json(json: &str, base_dir: &Path) -> Result<Self> {
        let mut config: ReportConfig = serde_json::from_str(json)?;
        config.base_dir = base_dir.to_path_buf();
        Ok(config)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.resolve(&self.template)
    }

    pub fn bind_options(&self) -> BindOptions {
        BindOptions::default().with_table_style(self.table_style.clone())
    }

    /// Configured parameters plus `ReportDateTime` and `ReportLongDate`,
    /// unless the configuration already sets them
    pub fn parameters_with_builtins(&self, now: NaiveDateTime) -> BTreeMap<String, String> {
        let mut parameters = self.parameters.clone();
        parameters
            .entry(REPORT_DATE_TIME.to_string())
            .or_insert_with(|| now.format(PARAMETER_FORMAT).to_string());
        parameters
            .entry(REPORT_LONG_DATE.to_string())
            .or_insert_with(|| now.format(LONG_DATE_FORMAT).to_string());
        parameters
    }

    pub fn load_results(&self) -> Result<BTreeMap<String, TabularResult>> {
        let mut results = BTreeMap::new();
        for (title, entry) in &self.results {
            let result = match entry {
                ResultEntry::File(path) => {
                    let path = self.resolve(path);
                    let json = std::fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read result '{}' from '{}'", title, path.display())
                    })?;
                    TabularResult::from_json(&json)
                        .with_context(|| format!("Invalid result '{}' in '{}'", title, path.display()))?
                }
                ResultEntry::Inline(value) => TabularResult::from_value(value.clone())
                    .with_context(|| format!("Invalid inline result '{}'", title))?,
            };
            log::debug!(
                "Loaded result '{}': {} fields, {} rows",
                title,
                result.column_count(),
                result.row_count()
            );
            results.insert(title.clone(), result);
        }
        Ok(results)
    }

    pub fn result_set(&self, parameters: &BTreeMap<String, String>) -> Result<ResultSet> {
        let mut set = ResultSet::new();
        for (name, value) in parameters {
            set.insert_parameter(name.as_str(), value.as_str());
        }
        for (title, result) in self.load_results()? {
            set.insert_result(title, result);
        }
        Ok(set)
    }

    /// Output path with parameters substituted into the file name
    pub fn output_path(&self, parameters: &BTreeMap<String, String>) -> PathBuf {
        let output = self.resolve(Path::new(&self.output));
        let file_name = output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(default_output);
        let file_name = sanitize_file_name(&substitute(&file_name, parameters));
        output.with_file_name(file_name)
    }
}

/// Replace `{Name}` with the value of parameter `Name`; unknown names stay
pub fn substitute(template: &str, parameters: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match parameters.get(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Replace characters that are not allowed in file names with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_control() || INVALID_FILE_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}
