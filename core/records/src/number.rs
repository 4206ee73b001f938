//! FILENAME: core/records/src/number.rs
//! PURPOSE: Numeric coercion and number-to-text rendering.
//! CONTEXT: Aggregated cells travel as strings, so parsing and formatting
//! must round-trip the same way everywhere (leaf cells, subtotal rollups,
//! grand totals).

/// Parses the longest numeric prefix of `text`.
///
/// Leading whitespace is skipped, then an optional sign, digits with an
/// optional fractional part and an optional exponent are consumed. Trailing
/// garbage is ignored (`"12 kg"` parses as 12). `"Infinity"` is accepted.
/// Returns `None` when no digit could be read.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    if trimmed[end..].starts_with("Infinity") {
        let negative = bytes.first() == Some(&b'-');
        return Some(if negative { f64::NEG_INFINITY } else { f64::INFINITY });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when at least one digit follows it.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let literal = &trimmed[..end];
    // A bare "." or "-." has no digits and was rejected above, so the
    // remaining literal always parses; "5." is normalized for Rust's parser.
    let literal = literal.strip_suffix('.').unwrap_or(literal);
    literal.parse::<f64>().ok()
}

/// Renders a number the way the display layer expects it.
///
/// Integral values carry no fractional part, negative zero prints as `0`,
/// and very large or very small magnitudes switch to exponent form
/// (`1e+21`, `1.5e-7`).
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if magnitude >= 1e21 || magnitude < 1e-6 {
        let formatted = format!("{:e}", value);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }

    format!("{}", value)
}

/// Renders a number with a fixed count of decimal places.
///
/// Rounds to nearest on the exact binary value; an exact halfway value
/// rounds away from zero (`1.125` -> `1.13`), unlike `format!`, which
/// rounds such ties to even. Magnitudes of 1e21 and above fall back to
/// `format_number`.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if !value.is_finite() || value.abs() >= 1e21 {
        return format_number(value);
    }

    let magnitude = value.abs();
    let mut digits = if fraction_digits(magnitude) == decimals + 1 {
        // Exact at one extra place, and the last digit of such a value is
        // always 5: a true tie.
        let exact = format!("{:.*}", decimals + 1, magnitude);
        match exact.strip_suffix('5') {
            Some(truncated) => round_up_last_digit(truncated),
            None => format!("{:.*}", decimals, magnitude),
        }
    } else {
        format!("{:.*}", decimals, magnitude)
    };
    if digits.ends_with('.') {
        digits.pop();
    }

    if value < 0.0 {
        format!("-{}", digits)
    } else {
        digits
    }
}

/// Number of decimal places in the exact expansion of a finite value.
fn fraction_digits(value: f64) -> usize {
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32;
    let mut mantissa = bits & ((1u64 << 52) - 1);
    let exponent = if exponent == 0 {
        -1074
    } else {
        mantissa |= 1u64 << 52;
        exponent - 1075
    };
    if mantissa == 0 {
        return 0;
    }
    let scale = exponent + mantissa.trailing_zeros() as i32;
    if scale >= 0 {
        0
    } else {
        (-scale) as usize
    }
}

/// Adds one unit in the last place of a plain decimal string.
fn round_up_last_digit(text: &str) -> String {
    let mut bytes = text.as_bytes().to_vec();
    let mut carry = true;
    for b in bytes.iter_mut().rev() {
        if !carry {
            break;
        }
        match *b {
            b'.' => continue,
            b'9' => *b = b'0',
            _ => {
                *b += 1;
                carry = false;
            }
        }
    }
    let mut out = String::from_utf8_lossy(&bytes).into_owned();
    if carry {
        out.insert(0, '1');
    }
    out
}
