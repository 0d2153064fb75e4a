use crate::tag::parse_leading_f64;

/// Signed adjustment, in seconds, applied to every offset line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta {
    value: f64,
    exact: bool,
}

impl Delta {
    /// Parse a delta argument the way `strtod` would.
    ///
    /// Unparseable input becomes `0.0` and trailing garbage after a numeric
    /// prefix is ignored, so a parse error and a literal zero look the same
    /// to the caller apart from [`Delta::is_exact`].
    pub fn parse(input: &str) -> Self {
        let (value, used) = parse_leading_f64(input.as_bytes());
        let exact = used > 0 && input[used..].trim().is_empty();
        Self { value, exact }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// A zero delta leaves every offset as it was
    pub fn is_noop(&self) -> bool {
        self.value == 0.0
    }

    /// Whether the whole input was consumed as a number
    pub fn is_exact(&self) -> bool {
        self.exact
    }
}
