//! PDF detector
//!
//! Looks for document-level JavaScript and for attached files under the
//! catalog's `/Names` dictionary. Page content is never interpreted.

use std::path::Path;

use lopdf::{Dictionary, Document, Object};
use tracing::{debug, instrument, warn};

use super::DocumentDetector;
use crate::config::{PdfConfig, ScanConfig};
use crate::error::{ParseError, PolicyViolation, Result};
use crate::utils::ensure_readable;

/// Bound on reference chains and name-tree depth
const MAX_DEPTH: usize = 32;

pub struct PdfDetector {
    max_file_size: u64,
    config: PdfConfig,
}

impl PdfDetector {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            config: config.pdf.clone(),
        }
    }
}

impl DocumentDetector for PdfDetector {
    fn name(&self) -> &'static str {
        "pdf"
    }

    #[instrument(skip(self))]
    fn inspect(&self, path: &Path) -> Result<()> {
        ensure_readable(path, self.max_file_size)?;
        let doc = open(path)?;

        if let Some(script) = script_text(&doc, self.config.inspect_open_action)? {
            return Err(PolicyViolation::ScriptPresent { length: script.len() }.into());
        }

        let Some(tree) = catalog_names_subtree(&doc, b"EmbeddedFiles")? else {
            debug!("No EmbeddedFiles name tree");
            return Ok(());
        };
        if let Some(names) = names_array(&doc, tree)? {
            if !names.is_empty() {
                return Err(PolicyViolation::EmbeddedFiles {
                    count: (names.len() / 2).max(1),
                }
                .into());
            }
        }
        if let Ok(kids) = tree.get(b"Kids") {
            let kids = resolve(&doc, kids)?
                .as_array()
                .map_err(|_| ParseError::Unsupported("EmbeddedFiles /Kids is not an array".into()))?;
            if !kids.is_empty() {
                if self.config.reject_name_tree_kids {
                    return Err(PolicyViolation::EmbeddedFiles { count: kids.len() }.into());
                }
                warn!("EmbeddedFiles name tree has {} kid node(s), not inspected", kids.len());
            }
        }
        Ok(())
    }
}

/// Loads and parses a PDF file
pub fn open(path: &Path) -> Result<Document> {
    Ok(Document::load(path).map_err(ParseError::from)?)
}

/// Follows indirect references until a direct object is reached
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    let mut current = object;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).map_err(ParseError::from)?,
            _ => return Ok(current),
        }
    }
    Err(ParseError::Unsupported("reference chain too long".into()).into())
}

fn catalog(doc: &Document) -> Result<&Dictionary> {
    let root = doc
        .trailer
        .get(b"Root")
        .map_err(|_| ParseError::Container("trailer has no /Root".into()))?;
    Ok(resolve(doc, root)?
        .as_dict()
        .map_err(|_| ParseError::Container("/Root is not a dictionary".into()))?)
}

/// Subtree `key` of the catalog's `/Names` dictionary, when present
pub fn catalog_names_subtree<'a>(doc: &'a Document, key: &[u8]) -> Result<Option<&'a Dictionary>> {
    let catalog = catalog(doc)?;
    let Ok(names) = catalog.get(b"Names") else {
        return Ok(None);
    };
    let names = resolve(doc, names)?
        .as_dict()
        .map_err(|_| ParseError::Unsupported("catalog /Names is not a dictionary".into()))?;
    let Ok(subtree) = names.get(key) else {
        return Ok(None);
    };
    let subtree = resolve(doc, subtree)?.as_dict().map_err(|_| {
        ParseError::Unsupported(format!("/Names /{} is not a dictionary", String::from_utf8_lossy(key)))
    })?;
    Ok(Some(subtree))
}

/// The `/Names` array of a name-tree node, when present
pub fn names_array<'a>(doc: &'a Document, tree: &'a Dictionary) -> Result<Option<&'a Vec<Object>>> {
    let Ok(names) = tree.get(b"Names") else {
        return Ok(None);
    };
    let names = resolve(doc, names)?
        .as_array()
        .map_err(|_| ParseError::Unsupported("name tree /Names is not an array".into()))?;
    Ok(Some(names))
}

/// Concatenated text of every document-level script.
///
/// Reads the `/JavaScript` name tree, walking `/Kids`, and optionally a
/// JavaScript `/OpenAction` on the catalog. `None` when there is no script
/// text at all.
pub fn script_text(doc: &Document, include_open_action: bool) -> Result<Option<String>> {
    let mut scripts = Vec::new();
    if let Some(tree) = catalog_names_subtree(doc, b"JavaScript")? {
        collect_tree_scripts(doc, tree, 0, &mut scripts)?;
    }
    if include_open_action {
        if let Ok(action) = catalog(doc)?.get(b"OpenAction") {
            collect_action_scripts(doc, resolve(doc, action)?, 0, &mut scripts)?;
        }
    }
    let text = scripts.concat();
    debug!("{} script(s), {} bytes of text", scripts.len(), text.len());
    Ok(if text.is_empty() { None } else { Some(text) })
}

fn collect_tree_scripts(doc: &Document, node: &Dictionary, depth: usize, scripts: &mut Vec<String>) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(ParseError::Unsupported("JavaScript name tree too deep".into()).into());
    }
    if let Some(names) = names_array(doc, node)? {
        // Key/value pairs; only the values are actions
        for value in names.iter().skip(1).step_by(2) {
            collect_action_scripts(doc, resolve(doc, value)?, 0, scripts)?;
        }
    }
    if let Ok(kids) = node.get(b"Kids") {
        let kids = resolve(doc, kids)?
            .as_array()
            .map_err(|_| ParseError::Unsupported("name tree /Kids is not an array".into()))?;
        for kid in kids {
            let kid = resolve(doc, kid)?
                .as_dict()
                .map_err(|_| ParseError::Unsupported("name tree kid is not a dictionary".into()))?;
            collect_tree_scripts(doc, kid, depth + 1, scripts)?;
        }
    }
    Ok(())
}

/// Collects `/JS` of a JavaScript action and of its `/Next` chain
fn collect_action_scripts(doc: &Document, action: &Object, depth: usize, scripts: &mut Vec<String>) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(ParseError::Unsupported("action chain too deep".into()).into());
    }
    // An OpenAction may also be a destination array
    let Ok(dict) = action.as_dict() else {
        return Ok(());
    };
    // Any /JS entry counts, whatever the declared /S
    if let Ok(js) = dict.get(b"JS") {
        scripts.push(js_text(resolve(doc, js)?));
    }
    if let Ok(next) = dict.get(b"Next") {
        match resolve(doc, next)? {
            Object::Array(actions) => {
                for next in actions {
                    collect_action_scripts(doc, resolve(doc, next)?, depth + 1, scripts)?;
                }
            }
            other => collect_action_scripts(doc, other, depth + 1, scripts)?,
        }
    }
    Ok(())
}

fn js_text(js: &Object) -> String {
    match js {
        Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
        Object::Stream(stream) => {
            let content = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            String::from_utf8_lossy(&content).into_owned()
        }
        _ => String::new(),
    }
}
