//! # smoffset-core
//!
//! Core library for adjusting the `#OFFSET:` value of StepMania simfiles.
//!
//! This crate provides:
//! - Offset tag line parsing and formatting (byte-level, encoding agnostic)
//! - Best-effort delta parsing
//! - In-place rewriting through a working file and a rename swap

pub mod delta;
pub mod error;
pub mod rewriter;
pub mod simfile;
pub mod tag;

pub use delta::Delta;
pub use error::{Error, ErrorKind, Result};
pub use rewriter::{
    LoadedSimfile, OffsetChange, OffsetRewriter, ReplaceStrategy, RewriteReport, RewriterConfig,
    RewriterConfigBuilder, Rewritten, rewrite, rewrite_bytes,
};
pub use simfile::SimfileKind;
pub use tag::{OFFSET_TAG, format_offset, offset_line};
