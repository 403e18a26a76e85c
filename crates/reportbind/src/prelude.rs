//! Prelude module - common imports for reportbind users
//!
//! ```rust
//! use reportbind::prelude::*;
//! ```

pub use crate::{
    build_report,
    inspect_template,
    // Binding
    BindError,
    BindOptions,
    BindOutcome,
    BindReport,
    Package,
    PlaceholderError,
    PlaceholderKind,
    ReportBinder,
    ResultSet,
    ResultSource,
    StructuralContext,
    // Data
    TabularResult,
};
