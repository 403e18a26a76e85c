//! # reportbind-core
//!
//! Core data structures for the reportbind document binding engine.
//!
//! This crate provides the fundamental types used throughout reportbind:
//! - [`TabularResult`] - Query results (fields + rows of display strings)
//! - [`column`] - Conversion between column ordinals and letter addresses
//! - [`AccentColor`] - Deterministic theme accent colors for chart series
//!
//! ## Example
//!
//! ```rust
//! use reportbind_core::{column, AccentColor, TabularResult};
//!
//! let result = TabularResult::from_json(
//!     r#"{"fields": ["Time", "CPU"], "rows": [["10:00", "12.5"]]}"#,
//! ).unwrap();
//!
//! assert_eq!(result.row_count(), 1);
//! assert_eq!(column::to_letters(result.column_count() as u32).unwrap(), "B");
//! assert_eq!(AccentColor::for_series(1).scheme_name(), "accent2");
//! ```

pub mod accent;
pub mod column;
pub mod error;
pub mod table;

// Re-exports for convenience
pub use accent::AccentColor;
pub use error::{Error, Result};
pub use table::{TabularResult, NO_RESULTS};
