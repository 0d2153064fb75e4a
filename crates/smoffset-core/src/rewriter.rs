//! Offset rewriting and in-place file replacement.
//!
//! A rewrite reads the whole simfile, adjusts every `#OFFSET:` line by the
//! delta (or inserts one at the top when none exists), writes the result to a
//! working file next to the target and then swaps it into place.
//!
//! ## Example
//!
//! ```ignore
//! use smoffset_core::{OffsetRewriter, ReplaceStrategy, RewriterConfig};
//!
//! // Default: atomic rename over the target
//! let report = OffsetRewriter::new().rewrite("song.ssc", -0.009)?;
//!
//! // Legacy delete-then-rename order
//! let config = RewriterConfig::builder()
//!     .replace(ReplaceStrategy::DeleteThenRename)
//!     .build();
//! let report = OffsetRewriter::with_config(config).rewrite("song.sm", 0.01)?;
//! ```

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::simfile::SimfileKind;
use crate::tag::{adjust_line, format_offset, is_offset_line, offset_line};

/// Working file name prefix, kept hidden next to the target
const WORKING_PREFIX: &str = ".smoffset-";
const WORKING_SUFFIX: &str = ".tmp";

/// How the working file replaces the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceStrategy {
    /// Rename over the existing target in one step
    #[default]
    Atomic,
    /// Delete the target, then rename the working file into its place.
    ///
    /// The target is missing between the two steps. Only useful where
    /// renaming over an existing file is not allowed.
    DeleteThenRename,
}

/// Configuration for [`OffsetRewriter`]
#[derive(Debug, Clone)]
pub struct RewriterConfig {
    /// How the working file replaces the target
    pub replace: ReplaceStrategy,
    /// Copy the target's permission bits onto the replacement
    pub preserve_permissions: bool,
    /// Flush the working file to disk before the swap
    pub sync: bool,
}

impl Default for RewriterConfig {
    fn default() -> Self {
        Self {
            replace: ReplaceStrategy::Atomic,
            preserve_permissions: true,
            sync: true,
        }
    }
}

impl RewriterConfig {
    /// Create a new configuration builder
    pub fn builder() -> RewriterConfigBuilder {
        RewriterConfigBuilder::default()
    }
}

/// Builder for RewriterConfig
#[derive(Debug, Clone, Default)]
pub struct RewriterConfigBuilder {
    replace: Option<ReplaceStrategy>,
    preserve_permissions: Option<bool>,
    sync: Option<bool>,
}

impl RewriterConfigBuilder {
    /// Set the replace strategy
    pub fn replace(mut self, strategy: ReplaceStrategy) -> Self {
        self.replace = Some(strategy);
        self
    }

    /// Enable or disable copying permissions onto the replacement
    pub fn preserve_permissions(mut self, enabled: bool) -> Self {
        self.preserve_permissions = Some(enabled);
        self
    }

    /// Enable or disable fsync before the swap
    pub fn sync(mut self, enabled: bool) -> Self {
        self.sync = Some(enabled);
        self
    }

    /// Build the configuration
    pub fn build(self) -> RewriterConfig {
        let default = RewriterConfig::default();
        RewriterConfig {
            replace: self.replace.unwrap_or(default.replace),
            preserve_permissions: self
                .preserve_permissions
                .unwrap_or(default.preserve_permissions),
            sync: self.sync.unwrap_or(default.sync),
        }
    }
}

/// A single adjusted offset line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetChange {
    /// 1-based line number in the original file
    pub line: usize,
    pub old: f64,
    pub new: f64,
}

/// Rewritten file content, before it touches the disk
#[derive(Debug, Clone, PartialEq)]
pub struct Rewritten {
    pub content: Vec<u8>,
    pub adjusted: Vec<OffsetChange>,
    /// Value of the tag line inserted at the top, if the input had none
    pub inserted: Option<f64>,
}

/// Outcome of a successful [`OffsetRewriter::rewrite`]
#[derive(Debug, Clone, PartialEq)]
pub struct RewriteReport {
    pub path: PathBuf,
    pub adjusted: Vec<OffsetChange>,
    pub inserted: Option<f64>,
}

impl RewriteReport {
    pub fn offsets_found(&self) -> usize {
        self.adjusted.len()
    }

    pub fn was_inserted(&self) -> bool {
        self.inserted.is_some()
    }
}

/// Adjust every offset line in `input` by `delta`.
///
/// Lines are split after each `\n` with no length limit. Non-offset lines,
/// including a final line without a newline, are copied byte for byte. If no
/// offset line exists, `#OFFSET:<delta>;` becomes the first line.
pub fn rewrite_bytes(input: &[u8], delta: f64) -> Rewritten {
    let mut content = Vec::with_capacity(input.len() + 32);
    let mut adjusted = Vec::new();

    for (index, line) in input.split_inclusive(|&b| b == b'\n').enumerate() {
        if is_offset_line(line) {
            let (rewritten, old, new) = adjust_line(line, delta);
            debug!("Line {}: offset {} -> {}", index + 1, old, new);
            content.extend_from_slice(&rewritten);
            adjusted.push(OffsetChange {
                line: index + 1,
                old,
                new,
            });
        } else {
            content.extend_from_slice(line);
        }
    }

    let inserted = if adjusted.is_empty() {
        debug!("No offset line found, inserting one");
        let mut with_tag = offset_line(delta);
        with_tag.extend_from_slice(&content);
        content = with_tag;
        Some(delta)
    } else {
        None
    };

    Rewritten {
        content,
        adjusted,
        inserted,
    }
}

/// Rewrites simfile offsets in place
#[derive(Debug, Clone, Default)]
pub struct OffsetRewriter {
    config: RewriterConfig,
}

impl OffsetRewriter {
    /// Create a rewriter with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a rewriter with a custom configuration
    pub fn with_config(config: RewriterConfig) -> Self {
        Self { config }
    }

    /// Read the simfile at `path` so it can be rewritten with
    /// [`LoadedSimfile::apply`].
    ///
    /// # Errors
    ///
    /// [`Error::FileOpen`] if the target cannot be read. Nothing is written.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<LoadedSimfile<'_>> {
        let path = path.as_ref();

        let original = fs::read(path).map_err(|source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        match SimfileKind::from_path(path) {
            Some(kind) => debug!("Loaded {} simfile {}", kind, path.display()),
            None => debug!("Loaded {} (not a .sm/.ssc file)", path.display()),
        }

        Ok(LoadedSimfile {
            rewriter: self,
            path: path.to_path_buf(),
            original,
        })
    }

    /// Adjust every offset in the file at `path` by `delta` and replace the
    /// file with the result.
    ///
    /// # Errors
    ///
    /// - [`Error::FileOpen`] if the target cannot be read. Nothing is written.
    /// - Any error of [`LoadedSimfile::apply`].
    pub fn rewrite<P: AsRef<Path>>(&self, path: P, delta: f64) -> Result<RewriteReport> {
        self.load(path)?.apply(delta)
    }

    fn write_working_file(&self, path: &Path, content: &[u8]) -> Result<NamedTempFile> {
        let dir = working_dir(path);
        let mut working = tempfile::Builder::new()
            .prefix(WORKING_PREFIX)
            .suffix(WORKING_SUFFIX)
            .tempfile_in(dir)
            .map_err(Error::TempFile)?;
        debug!("Created working file {}", working.path().display());

        let write_err = |source: std::io::Error| Error::Write {
            path: path.to_path_buf(),
            source,
        };
        working.write_all(content).map_err(write_err)?;
        working.flush().map_err(write_err)?;
        if self.config.sync {
            working.as_file().sync_all().map_err(write_err)?;
        }

        if self.config.preserve_permissions {
            copy_permissions(path, working.as_file());
        }

        Ok(working)
    }

    fn replace(&self, working: NamedTempFile, path: &Path) -> Result<()> {
        if self.config.replace == ReplaceStrategy::DeleteThenRename {
            // Dropping `working` on this error path removes it
            fs::remove_file(path).map_err(|source| Error::Overwrite {
                path: path.to_path_buf(),
                source,
            })?;
            debug!("Deleted original {}", path.display());
        }

        let original_deleted = self.config.replace == ReplaceStrategy::DeleteThenRename;
        working.persist(path).map_err(|e| {
            let working_path = e.file.path().to_path_buf();
            if original_deleted {
                // The rewritten content is all that is left, keep it on disk
                if let Err(keep_err) = e.file.keep() {
                    warn!("Failed to keep working file: {}", keep_err);
                }
            }
            Error::Rename {
                path: path.to_path_buf(),
                working: working_path,
                source: e.error,
            }
        })?;
        debug!("Renamed working file to {}", path.display());

        Ok(())
    }
}

/// A simfile read into memory, ready to be rewritten in place
#[derive(Debug)]
pub struct LoadedSimfile<'a> {
    rewriter: &'a OffsetRewriter,
    path: PathBuf,
    original: Vec<u8>,
}

impl LoadedSimfile<'_> {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adjust every offset by `delta` and replace the file with the result.
    ///
    /// # Errors
    ///
    /// - [`Error::TempFile`] or [`Error::Write`] if the working file cannot be
    ///   created or filled. The target is untouched and the working file is
    ///   removed.
    /// - [`Error::Overwrite`] if the target cannot be deleted
    ///   ([`ReplaceStrategy::DeleteThenRename`] only).
    /// - [`Error::Rename`] if the working file cannot be moved into place.
    pub fn apply(self, delta: f64) -> Result<RewriteReport> {
        let path = self.path.as_path();
        let rewritten = rewrite_bytes(&self.original, delta);

        let working = self.rewriter.write_working_file(path, &rewritten.content)?;
        self.rewriter.replace(working, path)?;

        match rewritten.inserted {
            Some(value) => info!(
                "Inserted offset {} into {}",
                format_offset(value),
                path.display()
            ),
            None => info!(
                "Adjusted {} offset line(s) in {}",
                rewritten.adjusted.len(),
                path.display()
            ),
        }

        Ok(RewriteReport {
            path: self.path,
            adjusted: rewritten.adjusted,
            inserted: rewritten.inserted,
        })
    }
}

/// Rewrite the file at `path` with the default configuration
pub fn rewrite<P: AsRef<Path>>(path: P, delta: f64) -> Result<RewriteReport> {
    OffsetRewriter::new().rewrite(path, delta)
}

fn working_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn copy_permissions(from: &Path, to: &File) {
    let result = fs::metadata(from).and_then(|meta| to.set_permissions(meta.permissions()));
    if let Err(e) = result {
        warn!("Failed to copy permissions from {}: {}", from.display(), e);
    }
}
