//! Utility helpers shared by detectors, the sanitizer and the CLI:
//! file access checks, atomic replacement, hashing and logging setup.

pub mod hash;
pub mod io;
pub mod logging;

pub use self::{
    hash::sha256_file,
    io::{ensure_readable, ensure_writable, read_file, read_head, replace_atomically, safely_remove},
    logging::{init_logging, LogLevel},
};
