//! Error types for the streaming engine.
//!
//! The pure layers (hash, noise, classify, placement) cannot fail; only
//! window construction and persistence have error paths.

use std::fmt;

/// Fatal problems that prevent a world from being materialized. These are
/// configuration errors: the engine must refuse to produce a window rather
/// than silently fall back to a finite or static map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// Requested window has a zero dimension; nothing can be generated.
    EmptyWindow { cols: usize, rows: usize },
    /// A save file was written by an unknown format version.
    UnsupportedSaveVersion { found: u32, supported: u32 },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::EmptyWindow { cols, rows } => {
                write!(f, "cannot materialize a {}x{} window", cols, rows)
            }
            WorldError::UnsupportedSaveVersion { found, supported } => {
                write!(f, "save format version {} (supported: {})", found, supported)
            }
        }
    }
}

impl std::error::Error for WorldError {}
