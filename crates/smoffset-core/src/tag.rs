//! `#OFFSET:` tag line codec.
//!
//! Simfiles carry their music offset on a single line of the form
//! `#OFFSET:-0.050000;`. Everything here works on raw bytes so that the
//! surrounding lines (frequently Shift-JIS) are never decoded or altered.

/// Tag that starts an offset line
pub const OFFSET_TAG: &[u8] = b"#OFFSET:";

/// Check whether a line starts with the offset tag
pub fn is_offset_line(line: &[u8]) -> bool {
    line.starts_with(OFFSET_TAG)
}

/// Parse the longest floating point prefix of `bytes`, `strtod`-style.
///
/// Leading ASCII whitespace is skipped. Returns `(0.0, 0)` when there is no
/// numeric prefix at all, otherwise the value and the number of bytes consumed.
pub fn parse_leading_f64(bytes: &[u8]) -> (f64, usize) {
    let mut start = 0;
    while start < bytes.len() && matches!(bytes[start], b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
    {
        start += 1;
    }

    let mut i = start;
    if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
        i += 1;
    }

    for word in [&b"infinity"[..], b"inf", b"nan"] {
        if bytes.len() >= i + word.len() && bytes[i..i + word.len()].eq_ignore_ascii_case(word) {
            let value = if word == b"nan" {
                f64::NAN
            } else if bytes[start] == b'-' {
                f64::NEG_INFINITY
            } else {
                f64::INFINITY
            };
            return (value, i + word.len());
        }
    }

    if bytes.len() > i + 1
        && bytes[i] == b'0'
        && matches!(bytes[i + 1], b'x' | b'X')
        && let Some((magnitude, used)) = parse_hex_magnitude(&bytes[i + 2..])
    {
        let value = if bytes[start] == b'-' { -magnitude } else { magnitude };
        return (value, i + 2 + used);
    }

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;

    let mut frac_digits = 0;
    if i < bytes.len() && bytes[i] == b'.' {
        frac_digits = count_digits(&bytes[i + 1..]);
        if int_digits + frac_digits > 0 {
            i += 1 + frac_digits;
        }
    }

    if int_digits + frac_digits == 0 {
        return (0.0, 0);
    }

    // Exponent only counts if at least one digit follows it
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j..]);
        if exp_digits > 0 {
            i = j + exp_digits;
        }
    }

    (parse_ascii(&bytes[start..i]), i)
}

/// Hex float body after `0x`: hex digits, optional fraction, optional
/// binary exponent (`p` followed by decimal digits).
fn parse_hex_magnitude(bytes: &[u8]) -> Option<(f64, usize)> {
    let hex_digit = |i: usize| bytes.get(i).and_then(|&b| char::from(b).to_digit(16));

    let mut mantissa = 0.0f64;
    let mut digits = 0;
    let mut i = 0;
    while let Some(d) = hex_digit(i) {
        mantissa = mantissa * 16.0 + f64::from(d);
        digits += 1;
        i += 1;
    }

    let mut scale = 0i32;
    if bytes.get(i) == Some(&b'.') {
        let mut j = i + 1;
        let mut frac_digits = 0i32;
        while let Some(d) = hex_digit(j) {
            mantissa = mantissa * 16.0 + f64::from(d);
            frac_digits += 1;
            j += 1;
        }
        if digits + frac_digits > 0 {
            i = j;
            digits += frac_digits;
            scale = frac_digits.saturating_mul(-4);
        }
    }

    if digits == 0 {
        return None;
    }

    if matches!(bytes.get(i), Some(b'p' | b'P')) {
        let mut j = i + 1;
        let negative = bytes.get(j) == Some(&b'-');
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = count_digits(&bytes[j..]);
        if exp_digits > 0 {
            let exp = std::str::from_utf8(&bytes[j..j + exp_digits])
                .ok()
                .and_then(|s| s.parse::<i32>().ok())
                .unwrap_or(i32::MAX);
            scale = if negative {
                scale.saturating_sub(exp)
            } else {
                scale.saturating_add(exp)
            };
            i = j + exp_digits;
        }
    }

    Some((mantissa * 2f64.powi(scale), i))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

fn parse_ascii(bytes: &[u8]) -> f64 {
    std::str::from_utf8(bytes)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0.0)
}

/// Format an offset value: fixed notation, six fractional digits, decimal
/// point always present.
pub fn format_offset(value: f64) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else if value.is_infinite() {
        let text = if value.is_sign_negative() { "-inf" } else { "inf" };
        text.to_string()
    } else {
        format!("{value:.6}")
    }
}

/// Render a complete offset line, including the terminating `;\n`
pub fn offset_line(value: f64) -> Vec<u8> {
    let mut line = OFFSET_TAG.to_vec();
    line.extend_from_slice(format_offset(value).as_bytes());
    line.extend_from_slice(b";\n");
    line
}

/// Adjust an offset line by `delta`.
///
/// Returns the rewritten line with the old and new values. An unparseable
/// payload counts as `0.0`. Anything after the number is replaced by the
/// canonical `;\n` terminator.
pub fn adjust_line(line: &[u8], delta: f64) -> (Vec<u8>, f64, f64) {
    let payload = line.get(OFFSET_TAG.len()..).unwrap_or_default();
    let (old, _) = parse_leading_f64(payload);
    let new = old + delta;
    (offset_line(new), old, new)
}
