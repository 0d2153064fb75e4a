//! Offset adjustment command.

use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use smoffset_core::{Delta, Error, ErrorKind, OffsetRewriter, SimfileKind, format_offset};
use tracing::{error, info, warn};

/// How an adjustment ended, once any message has been printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Adjusted,
    Failed,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Adjusted => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

/// Adjust the offset of `simfile` by the delta argument.
///
/// Rewrite failures are reported on `out` and end in [`Outcome::Failed`];
/// only a failure to write to `out` itself is an `Err`.
pub fn run(out: &mut impl Write, simfile: &Path, delta: &str) -> Result<Outcome> {
    let rewriter = OffsetRewriter::new();

    // Open first so an unreadable simfile is reported before any warning
    let loaded = match rewriter.load(simfile) {
        Ok(loaded) => loaded,
        Err(e) => return fail(out, simfile, &e),
    };

    let parsed = Delta::parse(delta);
    if parsed.is_noop() {
        // Parse errors land here too
        writeln!(out, "WARNING: 0 offset. Offset will not be adjusted.\n")
            .context("Failed to write warning")?;
    }
    if !parsed.is_exact() {
        warn!("Delta {:?} is not a plain number, using {}", delta, parsed.value());
    }

    if SimfileKind::from_path(simfile).is_none() {
        warn!("{} does not look like a .sm or .ssc file", simfile.display());
    }

    let report = match loaded.apply(parsed.value()) {
        Ok(report) => report,
        Err(e) => return fail(out, simfile, &e),
    };

    for change in &report.adjusted {
        info!(
            "{}:{}: {} -> {}",
            report.path.display(),
            change.line,
            format_offset(change.old),
            format_offset(change.new)
        );
    }

    Ok(Outcome::Adjusted)
}

fn fail(out: &mut impl Write, simfile: &Path, err: &Error) -> Result<Outcome> {
    report_error(out, simfile, err).context("Failed to write error message")?;
    Ok(Outcome::Failed)
}

/// Print the user-facing message for a failed adjustment
pub fn report_error(out: &mut impl Write, simfile: &Path, err: &Error) -> io::Result<()> {
    error!("{}", err);

    match err.kind() {
        ErrorKind::FileOpen => {
            writeln!(out, "{}", simfile.display())?;
            writeln!(out, "ERROR: simfile could not be opened!\n")
        }
        ErrorKind::TempFile => writeln!(out, "ERROR: Could not allocate temporary file!\n"),
        ErrorKind::Overwrite => writeln!(out, "ERROR: Could not overwrite simfile!\n"),
        ErrorKind::Rename => {
            writeln!(
                out,
                "ERROR: Could not rename working file to original name! Please fix manually.\n"
            )?;
            if let Error::Rename { working, .. } = err
                && err.needs_manual_fix()
            {
                writeln!(out, "Working file: {}", working.display())?;
            }
            Ok(())
        }
    }
}
