//! Sanitizers rewrite a file so that it becomes safe, instead of only judging it

use std::path::Path;

use tracing::{info, warn};

use crate::error::Result;

pub mod image;
pub mod signatures;

pub use self::image::ImageSanitizer;

/// Destructive clean-up of a file in place
pub trait DocumentSanitizer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Rewrites the file. On error the original bytes are left as they were.
    fn sanitize(&self, path: &Path) -> Result<()>;

    /// Boolean form of [`sanitize`](Self::sanitize); `false` means the file
    /// must not be used.
    fn made_safe(&self, path: &Path) -> bool {
        match self.sanitize(path) {
            Ok(()) => {
                info!("{}: {} sanitized", self.name(), path.display());
                true
            }
            Err(e) => {
                warn!(kind = %e.kind(), "{}: {} not sanitized: {}", self.name(), path.display(), e);
                false
            }
        }
    }
}
