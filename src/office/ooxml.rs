//! Office Open XML package reader
//!
//! Resolves part content types from `[Content_Types].xml`, reads part
//! relationships and scans part XML for drawing-layer elements. Part data is
//! streamed straight out of the archive and capped at [`MAX_PART_SIZE`].

use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use tracing::debug;
use zip::ZipArchive;

use super::xml;
use crate::error::{ParseError, Result};
use crate::types::{EmbeddedObject, FormatTag, ObjectKind};

/// Upper bound on the decompressed size of a single part
pub const MAX_PART_SIZE: u64 = 64 * 1024 * 1024;

const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

pub const VBA_PROJECT_TYPE: &str = "application/vnd.ms-office.vbaProject";

/// A relationship entry of a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

#[derive(Debug, Default)]
struct ContentTypes {
    /// Lowercase extension to content type
    defaults: HashMap<String, String>,
    /// Lowercase part name, without leading slash, to content type
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    fn parse<R: std::io::BufRead>(source: R) -> Result<Self> {
        let mut types = ContentTypes::default();
        xml::for_each_element(source, |element| {
            match element.local_name().as_ref() {
                b"Default" => {
                    if let (Some(ext), Some(ct)) = (
                        xml::attribute(element, b"Extension")?,
                        xml::attribute(element, b"ContentType")?,
                    ) {
                        types.defaults.insert(ext.to_ascii_lowercase(), ct);
                    }
                }
                b"Override" => {
                    if let (Some(part), Some(ct)) = (
                        xml::attribute(element, b"PartName")?,
                        xml::attribute(element, b"ContentType")?,
                    ) {
                        types.overrides.insert(normalize_part_name(&part), ct);
                    }
                }
                _ => {}
            }
            Ok(())
        })?;
        Ok(types)
    }

    fn lookup(&self, part: &str) -> Option<&str> {
        let name = normalize_part_name(part);
        if let Some(ct) = self.overrides.get(&name) {
            return Some(ct.as_str());
        }
        let ext = name.rsplit_once('.').map(|(_, ext)| ext)?;
        self.defaults.get(ext).map(String::as_str)
    }
}

fn normalize_part_name(name: &str) -> String {
    name.trim_start_matches('/').to_ascii_lowercase()
}

/// An opened OOXML package
pub struct Package {
    archive: ZipArchive<BufReader<File>>,
    content_types: ContentTypes,
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("parts", &self.archive.len())
            .finish()
    }
}

impl Package {
    /// Opens the zip archive and parses its content-type table
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(ParseError::from)?;
        let content_types = {
            let entry = archive.by_name(CONTENT_TYPES_PART).map_err(|_| {
                ParseError::Container(format!("{} missing from package", CONTENT_TYPES_PART))
            })?;
            ContentTypes::parse(BufReader::new(entry.take(MAX_PART_SIZE)))?
        };
        Ok(Self {
            archive,
            content_types,
        })
    }

    pub fn content_type(&self, part: &str) -> Option<&str> {
        self.content_types.lookup(part)
    }

    /// Format declared by the main document part
    pub fn main_format(&self) -> Option<FormatTag> {
        let mut overrides: Vec<&String> = self.content_types.overrides.values().collect();
        overrides.sort();
        overrides
            .into_iter()
            .find_map(|ct| FormatTag::from_main_content_type(ct))
    }

    /// Parts whose content type satisfies `matches`, sorted by name
    pub fn parts_where(&self, matches: impl Fn(&str) -> bool) -> Vec<String> {
        let mut parts: Vec<String> = self
            .archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .filter(|name| self.content_type(name).map_or(false, &matches))
            .map(str::to_string)
            .collect();
        parts.sort();
        parts
    }

    /// True when the package carries a VBA project, by content type or by name
    pub fn has_vba_project(&self) -> bool {
        self.archive.file_names().any(|name| {
            name.to_ascii_lowercase().ends_with("vbaproject.bin")
                || self.content_type(name) == Some(VBA_PROJECT_TYPE)
        })
    }

    fn open_part(&mut self, part: &str) -> Result<Option<BufReader<std::io::Take<zip::read::ZipFile<'_>>>>> {
        let wanted = normalize_part_name(part);
        let name = self
            .archive
            .file_names()
            .find(|name| normalize_part_name(name) == wanted)
            .map(str::to_string);
        let Some(name) = name else {
            return Ok(None);
        };
        let entry = self.archive.by_name(&name).map_err(ParseError::from)?;
        if entry.size() > MAX_PART_SIZE {
            return Err(ParseError::Unsupported(format!(
                "part {} expands to {} bytes",
                part,
                entry.size()
            ))
            .into());
        }
        Ok(Some(BufReader::new(entry.take(MAX_PART_SIZE))))
    }

    /// Relationships declared for `part`; empty when it has no rels part
    pub fn relationships(&mut self, part: &str) -> Result<Vec<Relationship>> {
        let rels_part = rels_part_name(part);
        let Some(reader) = self.open_part(&rels_part)? else {
            return Ok(Vec::new());
        };
        let mut rels = Vec::new();
        xml::for_each_element(reader, |element| {
            if element.local_name().as_ref() == b"Relationship" {
                let external = xml::attribute(element, b"TargetMode")?
                    .map_or(false, |mode| mode.eq_ignore_ascii_case("External"));
                rels.push(Relationship {
                    id: xml::attribute(element, b"Id")?.unwrap_or_default(),
                    rel_type: xml::attribute(element, b"Type")?.unwrap_or_default(),
                    target: xml::attribute(element, b"Target")?.unwrap_or_default(),
                    external,
                });
            }
            Ok(())
        })?;
        Ok(rels)
    }

    /// Object descriptors of a container part.
    ///
    /// XML parts are scanned element by element; binary parts (xlsb sheets)
    /// contribute only through their relationships.
    pub fn scan_objects(&mut self, part: &str) -> Result<Vec<EmbeddedObject>> {
        let mut objects = Vec::new();
        let is_xml = self
            .content_type(part)
            .map_or(false, |ct| ct.ends_with("+xml") || ct.ends_with("/xml"));
        if is_xml {
            let reader = self
                .open_part(part)?
                .ok_or_else(|| ParseError::Container(format!("part {} not found", part)))?;
            objects.extend(xml::scan_objects(reader, part)?);
        }
        for rel in self.relationships(part)? {
            if let Some(kind) = classify_relationship(&rel.rel_type) {
                objects.push(EmbeddedObject {
                    kind,
                    origin: format!("{}#{} -> {}", part, rel.id, rel.target),
                });
            }
        }
        debug!("Part {}: {} object descriptor(s)", part, objects.len());
        Ok(objects)
    }
}

/// `dir/name.xml` -> `dir/_rels/name.xml.rels`
pub fn rels_part_name(part: &str) -> String {
    let part = part.trim_start_matches('/');
    match part.rsplit_once('/') {
        Some((dir, name)) => format!("{}/_rels/{}.rels", dir, name),
        None => format!("_rels/{}.rels", part),
    }
}

/// Discriminates relationship types by their final path segment
pub fn classify_relationship(rel_type: &str) -> Option<ObjectKind> {
    match rel_type.rsplit('/').next()? {
        "oleObject" | "package" | "control" | "activeXControlBinary" => Some(ObjectKind::ForeignObject),
        "image" | "drawing" | "vmlDrawing" | "chart" | "diagramData" => Some(ObjectKind::NativeDrawing),
        _ => None,
    }
}
