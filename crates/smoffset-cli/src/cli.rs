//! CLI argument definitions.

use std::borrow::Cow;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;

use clap::Parser;

/// Usage text, shown for any argument count other than two
pub const USAGE: &str = "\
Adjusts the offset of a Stepmania simfile.

smoffset simfile delta

  simfile\tThe path to the .sm or .ssc file to be adjusted.
  delta\t\tThe amount, in seconds, to add to the offset. Can be negative.
";

/// Both slots are taken literally: no flags, no `--` handling after the
/// first argument, hyphenated paths and deltas are plain values.
#[derive(Parser)]
#[command(name = "smoffset")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Args {
    #[arg(num_args = 0.., allow_hyphen_values = true, trailing_var_arg = true)]
    pub args: Vec<OsString>,
}

impl Args {
    /// The simfile and delta, if exactly two arguments were given
    pub fn positionals(&self) -> Option<(&Path, Cow<'_, str>)> {
        match self.args.as_slice() {
            [simfile, delta] => Some((Path::new(simfile), delta.to_string_lossy())),
            _ => None,
        }
    }
}

pub fn print_usage(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{USAGE}")
}
