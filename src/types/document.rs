//! Structural units queried by the office detectors

use serde::{Deserialize, Serialize};

/// Type discriminator of an embedded object descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Shape, picture or chart drawn by the host application itself
    NativeDrawing,
    /// Object owned by another application (OLE object, ActiveX control, package)
    ForeignObject,
}

/// A node or record inside a container that may represent an embedded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedObject {
    pub kind: ObjectKind,
    /// Element, relationship or record that produced the descriptor
    pub origin: String,
}

impl EmbeddedObject {
    pub fn native(origin: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::NativeDrawing,
            origin: origin.into(),
        }
    }

    pub fn foreign(origin: impl Into<String>) -> Self {
        Self {
            kind: ObjectKind::ForeignObject,
            origin: origin.into(),
        }
    }

    pub fn is_foreign(&self) -> bool {
        self.kind == ObjectKind::ForeignObject
    }
}

/// Where a container lives inside the loaded document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerLocation {
    /// Part name inside an OOXML package
    Part(String),
    /// Byte range of the main record stream of a compound file
    Records { start: usize, end: usize },
    /// Storage path inside a compound file
    Storage(String),
    /// The whole document (single-part XML formats)
    Body,
}

/// Sheet, slide, document part or embedding pool enumerated for objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub label: String,
    pub location: ContainerLocation,
}

impl Container {
    pub fn new(label: impl Into<String>, location: ContainerLocation) -> Self {
        Self {
            label: label.into(),
            location,
        }
    }
}
