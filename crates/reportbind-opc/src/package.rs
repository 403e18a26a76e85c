//! Zip-backed OPC package

use std::collections::HashSet;
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use crate::error::{OpcError, OpcResult};
use crate::relationships::{rels_part_name, resolve_target, source_part_name, Relationships};
use crate::xml::XmlTree;

/// Name of the content types part
pub const CONTENT_TYPES: &str = "[Content_Types].xml";

/// An OPC package held entirely in memory.
///
/// Parts are kept in their original zip order so an unmodified package is
/// written back with the same layout. Part names have no leading `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Package {
    parts: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Read a package from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> OpcResult<Self> {
        let file = File::open(path)?;
        Self::read(file)
    }

    /// Read a package from bytes
    pub fn from_bytes(bytes: &[u8]) -> OpcResult<Self> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a package from a reader
    pub fn read<R: Read + Seek>(reader: R) -> OpcResult<Self> {
        let mut archive = zip::ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            parts.push((name, data));
        }

        let package = Self { parts };
        if !package.contains(CONTENT_TYPES) {
            return Err(OpcError::MissingPart(CONTENT_TYPES.into()));
        }
        Ok(package)
    }

    /// Write the package to a file path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> OpcResult<()> {
        let file = File::create(path)?;
        self.write(file)
    }

    /// Write the package to bytes
    pub fn to_bytes(&self) -> OpcResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(Cursor::new(&mut buf))?;
        Ok(buf)
    }

    /// Write the package to a writer
    pub fn write<W: Write + Seek>(&self, writer: W) -> OpcResult<()> {
        let mut zip = zip::ZipWriter::new(writer);

        for (name, data) in &self.parts {
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        zip.finish()?;
        Ok(())
    }

    /// Whether a part exists
    pub fn contains(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
    }

    /// Raw bytes of a part
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }

    /// Part names in package order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    /// Insert or replace a part
    pub fn set_part<S: Into<String>>(&mut self, name: S, data: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = data,
            None => self.parts.push((name, data)),
        }
    }

    /// Remove a part, returning its bytes
    pub fn remove_part(&mut self, name: &str) -> Option<Vec<u8>> {
        let position = self.parts.iter().position(|(n, _)| n == name)?;
        Some(self.parts.remove(position).1)
    }

    /// Parse a part as XML
    pub fn xml_part(&self, name: &str) -> OpcResult<XmlTree> {
        let data = self
            .part(name)
            .ok_or_else(|| OpcError::MissingPart(name.to_string()))?;
        XmlTree::parse(data).map_err(|e| match e {
            OpcError::InvalidXml { message, .. } => OpcError::InvalidXml {
                part: name.to_string(),
                message,
            },
            other => other,
        })
    }

    /// Serialize an XML tree into a part
    pub fn set_xml_part(&mut self, name: &str, tree: &XmlTree) -> OpcResult<()> {
        let data = tree.to_bytes()?;
        self.set_part(name, data);
        Ok(())
    }

    /// Relationships of a part (empty when it has no `.rels` part)
    pub fn relationships(&self, part: &str) -> OpcResult<Relationships> {
        match self.part(&rels_part_name(part)) {
            Some(data) => Relationships::parse(data),
            None => Ok(Relationships::default()),
        }
    }

    /// Replace the relationships of a part
    pub fn set_relationships(&mut self, part: &str, rels: &Relationships) -> OpcResult<()> {
        let data = rels.to_bytes()?;
        self.set_part(rels_part_name(part), data);
        Ok(())
    }

    /// Resolve a relationship id of `part` to the target part name
    pub fn resolve_relationship(&self, part: &str, id: &str) -> OpcResult<String> {
        let rels = self.relationships(part)?;
        let rel = rels.get(id).ok_or_else(|| OpcError::MissingRelationship {
            part: part.to_string(),
            id: id.to_string(),
        })?;
        Ok(resolve_target(part, &rel.target))
    }

    /// Delete a part together with the parts it owns.
    ///
    /// Internal relationship targets of the part are removed recursively
    /// (a chart takes its embedded workbook, colors and style parts with it),
    /// as are the `.rels` parts and content type overrides. A target that a
    /// remaining part still references is kept, along with everything it
    /// references. The caller removes the relationship that pointed at
    /// `name`. Returns the removed part names.
    pub fn remove_part_tree(&mut self, name: &str) -> OpcResult<Vec<String>> {
        let mut owned = HashSet::new();
        let mut pending = vec![name.to_string()];
        while let Some(part) = pending.pop() {
            if !owned.insert(part.clone()) {
                continue;
            }
            for rel in self.relationships(&part)?.iter().filter(|r| !r.external) {
                pending.push(resolve_target(&part, &rel.target));
            }
        }

        loop {
            let shared = self.referenced_from_outside(&owned, name)?;
            if shared.is_empty() {
                break;
            }
            for part in shared {
                log::debug!("keeping {}, still referenced", part);
                owned.remove(&part);
            }
        }

        let mut owned: Vec<String> = owned.into_iter().collect();
        owned.sort();

        let mut removed = Vec::new();
        for part in owned {
            let rels_name = rels_part_name(&part);
            if self.remove_part(&rels_name).is_some() {
                removed.push(rels_name);
            }
            if self.remove_part(&part).is_some() {
                removed.push(part);
            }
        }

        self.remove_content_type_overrides(&removed)?;
        log::debug!("removed parts: {}", removed.join(", "));
        Ok(removed)
    }

    /// Parts of `owned` (other than `root`) targeted by a part outside `owned`
    fn referenced_from_outside(
        &self,
        owned: &HashSet<String>,
        root: &str,
    ) -> OpcResult<HashSet<String>> {
        let mut shared = HashSet::new();
        for (rels_name, data) in &self.parts {
            let Some(source) = source_part_name(rels_name) else {
                continue;
            };
            if owned.contains(&source) {
                continue;
            }
            let rels = Relationships::parse(data)?;
            for rel in rels.iter().filter(|r| !r.external) {
                let target = resolve_target(&source, &rel.target);
                if target != root && owned.contains(&target) {
                    shared.insert(target);
                }
            }
        }
        Ok(shared)
    }

    fn remove_content_type_overrides(&mut self, parts: &[String]) -> OpcResult<()> {
        let mut tree = self.xml_part(CONTENT_TYPES)?;
        let root = tree.root();
        let mut changed = false;
        for node in tree.children_named(root, "Override") {
            let matches = tree
                .attribute(node, "PartName")
                .map(|p| parts.iter().any(|part| p.trim_start_matches('/') == part))
                .unwrap_or(false);
            if matches {
                tree.detach(node);
                changed = true;
            }
        }
        if changed {
            self.set_xml_part(CONTENT_TYPES, &tree)?;
        }
        Ok(())
    }
}
