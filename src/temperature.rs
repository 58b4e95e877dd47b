// Temperatures arrive as `-?\d+\.\d`. The scanner strips the '.', so the
// decoder only ever sees an optional '-' followed by digits, where the last
// digit is the tenths place.

/// Decodes dot-stripped temperature digits into tenths of a degree,
/// e.g. `b"-32"` (from `"-3.2"`) becomes `-32`.
///
/// The input must already be validated by the scanner: an optional leading
/// '-' and at least two ASCII digits.
#[inline(always)]
pub fn decode_tenths(digits: &[u8]) -> i32 {
    let (negative, start) = match digits.first() {
        Some(b'-') => (true, 1),
        _ => (false, 0),
    };

    let last = digits.len() - 1;
    let mut tenths = (digits[last] - b'0') as i32;
    let mut place = 10;
    for c in digits[start..last].iter().rev() {
        tenths += (c - b'0') as i32 * place;
        place *= 10;
    }

    if negative { -tenths } else { tenths }
}

/// Same as [`decode_tenths`] but as a float, `b"159"` becomes `15.9`.
#[inline(always)]
pub fn decode(digits: &[u8]) -> f64 {
    tenths_to_f64(decode_tenths(digits) as i64)
}

#[inline(always)]
pub fn tenths_to_f64(tenths: i64) -> f64 {
    tenths as f64 / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_dot(s: &str) -> Vec<u8> {
        s.bytes().filter(|c| *c != b'.').collect()
    }

    #[test]
    fn decodes_positive_and_negative() {
        assert_eq!(decode_tenths(b"152"), 152);
        assert_eq!(decode_tenths(b"-32"), -32);
        assert_eq!(decode_tenths(b"00"), 0);
        assert_eq!(decode_tenths(b"-999"), -999);
    }

    #[test]
    fn negative_keeps_sign_and_magnitude() {
        assert_eq!(decode(b"-99"), -9.9);
        assert_eq!(decode(b"-123"), -12.3);
    }

    #[test]
    fn formatted_values_decode_back() {
        for tenths in -999..=999 {
            let value = tenths as f64 / 10.0;
            let text = format!("{value:.1}");
            assert_eq!(decode(&strip_dot(&text)), value, "{text}");
        }
    }

    #[test]
    fn handles_wide_integer_parts() {
        assert_eq!(decode_tenths(b"12345"), 12345);
        assert_eq!(decode(b"-12345"), -1234.5);
    }
}
