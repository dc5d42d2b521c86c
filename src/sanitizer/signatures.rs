//! Secondary image signature table
//!
//! Consulted only when `image::guess_format` does not recognise the bytes.
//! Covers format variants whose magic differs from the one the codec
//! registry knows but which the decoders still read.

use image::ImageFormat;

/// Where a signature is anchored in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Offset from the first byte
    Start(usize),
    /// Pattern ends exactly at end of file
    End,
}

#[derive(Debug, Clone, Copy)]
pub struct ImageSignature {
    pub anchor: Anchor,
    pub pattern: &'static [u8],
    pub format: ImageFormat,
    pub description: &'static str,
}

impl ImageSignature {
    pub fn matches(&self, data: &[u8]) -> bool {
        match self.anchor {
            Anchor::Start(offset) => data
                .get(offset..offset + self.pattern.len())
                .map_or(false, |window| window == self.pattern),
            Anchor::End => data.ends_with(self.pattern),
        }
    }
}

pub const SIGNATURES: &[ImageSignature] = &[
    ImageSignature {
        anchor: Anchor::Start(0),
        pattern: b"II+\x00",
        format: ImageFormat::Tiff,
        description: "BigTIFF, little-endian",
    },
    ImageSignature {
        anchor: Anchor::Start(0),
        pattern: b"MM\x00+",
        format: ImageFormat::Tiff,
        description: "BigTIFF, big-endian",
    },
    ImageSignature {
        anchor: Anchor::End,
        pattern: b"TRUEVISION-XFILE.\x00",
        format: ImageFormat::Tga,
        description: "TGA 2.0 footer",
    },
];

/// First signature of the table matching `data`
pub fn lookup(data: &[u8]) -> Option<&'static ImageSignature> {
    SIGNATURES.iter().find(|signature| signature.matches(data))
}
