//! # reportbind-opc
//!
//! Just enough Open Packaging Conventions for reportbind: a zip package held
//! in memory, part relationships, and an editable XML tree.

pub mod element;
pub mod error;
pub mod package;
pub mod relationships;
pub mod xml;

pub use element::{Content, Element};
pub use error::{OpcError, OpcResult};
pub use package::{Package, CONTENT_TYPES};
pub use relationships::{
    rel_types, rels_part_name, resolve_target, source_part_name, Relationship, Relationships,
};
pub use xml::{NodeId, XmlTree};
