// Shared types for detectors, sanitizers and the dispatcher

pub mod document;
pub mod format;
pub mod verdict;

pub use document::*;
pub use format::FormatTag;
pub use verdict::Verdict;
