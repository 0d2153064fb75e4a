use std::path::Path;

use strum::{Display, EnumString};

/// Simfile flavours that carry an `#OFFSET:` tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum SimfileKind {
    /// StepMania 3.9 / 5 `.sm`
    #[strum(serialize = "sm")]
    Sm,
    /// StepMania 5 `.ssc` (may hold per-chart offsets in split timing)
    #[strum(serialize = "ssc")]
    Ssc,
}

impl SimfileKind {
    /// Detect the simfile kind from a path's extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}
