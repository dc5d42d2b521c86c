//! Image sanitizer
//!
//! Destroys payloads hidden in metadata, trailing bytes or pixel LSBs by
//! decoding to a raster, shrinking it by one pixel per axis, growing it back
//! and re-encoding in the original format. The output keeps the original
//! dimensions and format but shares no bytes with the input.

use std::{io::Cursor, path::Path};

use ::image::{imageops::FilterType, DynamicImage, GenericImageView, ImageError, ImageFormat};
use tracing::{debug, instrument};

use super::{signatures, DocumentSanitizer};
use crate::config::ScanConfig;
use crate::error::{Error, ParseError, Result};
use crate::utils::{ensure_readable, ensure_writable, read_file, replace_atomically};

pub struct ImageSanitizer {
    max_file_size: u64,
    filter: FilterType,
}

impl ImageSanitizer {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            filter: config.image.resample_filter.into(),
        }
    }
}

impl DocumentSanitizer for ImageSanitizer {
    fn name(&self) -> &'static str {
        "image"
    }

    #[instrument(skip(self))]
    fn sanitize(&self, path: &Path) -> Result<()> {
        ensure_readable(path, self.max_file_size)?;
        ensure_writable(path)?;

        let bytes = read_file(path)?;
        let format = sniff_format(&bytes)
            .ok_or_else(|| Error::FormatRejected("content is not a recognised image".into()))?;

        let raster = decode(&bytes, format)?;
        let (width, height) = raster.dimensions();
        if width == 0 || height == 0 {
            return Err(ParseError::Unsupported(format!("{:?} image has zero size", format)).into());
        }
        debug!("Decoded {:?} {}x{} ({:?})", format, width, height, raster.color());

        let shrunk = resample(&raster, (width - 1).max(1), (height - 1).max(1), self.filter);
        let restored = resample(&shrunk, width, height, self.filter);

        let encoded = encode(&restored, format)?;
        replace_atomically(path, &encoded)?;
        debug!("Re-encoded {} bytes as {:?}", encoded.len(), format);
        Ok(())
    }
}

/// Encoded format of `bytes`, from the codec registry first and then the
/// secondary signature table
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if let Ok(format) = ::image::guess_format(bytes) {
        return Some(format);
    }
    signatures::lookup(bytes).map(|signature| {
        debug!("Secondary signature match: {}", signature.description);
        signature.format
    })
}

/// Decodes the first frame of an image into a raster
pub fn decode(bytes: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    ::image::load_from_memory_with_format(bytes, format).map_err(|e| ParseError::Image(e).into())
}

pub fn resample(raster: &DynamicImage, width: u32, height: u32, filter: FilterType) -> DynamicImage {
    raster.resize_exact(width, height, filter)
}

/// Encodes a raster in `format`.
///
/// Colour layouts the encoder cannot take are converted first. A format
/// without an encoder fails; the format is never changed.
pub fn encode(raster: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let prepared = prepare_for_encoding(raster, format);
    let mut buffer = Cursor::new(Vec::new());
    match prepared.as_ref().unwrap_or(raster).write_to(&mut buffer, format) {
        Ok(()) => Ok(buffer.into_inner()),
        Err(ImageError::Unsupported(e)) => Err(Error::CodecUnsupported(e.to_string())),
        Err(e) => Err(ParseError::Image(e).into()),
    }
}

fn prepare_for_encoding(raster: &DynamicImage, format: ImageFormat) -> Option<DynamicImage> {
    match (format, raster) {
        (ImageFormat::Jpeg, DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_)) => None,
        (ImageFormat::Jpeg, _) => Some(DynamicImage::ImageRgb8(raster.to_rgb8())),
        (ImageFormat::Gif, DynamicImage::ImageRgba8(_)) => None,
        (ImageFormat::Gif, _) => Some(DynamicImage::ImageRgba8(raster.to_rgba8())),
        (ImageFormat::Farbfeld, DynamicImage::ImageRgba16(_)) => None,
        (ImageFormat::Farbfeld, _) => Some(DynamicImage::ImageRgba16(raster.to_rgba16())),
        (ImageFormat::Hdr, DynamicImage::ImageRgb32F(_)) => None,
        (ImageFormat::Hdr, _) => Some(DynamicImage::ImageRgb32F(raster.to_rgb32f())),
        (ImageFormat::OpenExr, DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_)) => None,
        (ImageFormat::OpenExr, _) => Some(DynamicImage::ImageRgba32F(raster.to_rgba32f())),
        (ImageFormat::Tiff, DynamicImage::ImageLumaA8(_)) => Some(DynamicImage::ImageRgba8(raster.to_rgba8())),
        (ImageFormat::Tiff, DynamicImage::ImageLumaA16(_)) => Some(DynamicImage::ImageRgba16(raster.to_rgba16())),
        (
            ImageFormat::Bmp | ImageFormat::WebP | ImageFormat::Qoi | ImageFormat::Ico | ImageFormat::Tga,
            DynamicImage::ImageLuma8(_)
            | DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_),
        ) => None,
        (ImageFormat::Bmp | ImageFormat::WebP | ImageFormat::Qoi | ImageFormat::Ico | ImageFormat::Tga, _) => {
            Some(if raster.color().has_alpha() {
                DynamicImage::ImageRgba8(raster.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(raster.to_rgb8())
            })
        }
        _ => None,
    }
}
