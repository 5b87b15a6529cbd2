//! Field parsers for the raw listing exports.
//!
//! Each parser takes one raw cell (`None` for an empty cell) and returns a
//! typed value or `None`. None of them fail: a malformed cell just becomes
//! missing and the cleaner decides whether the row survives.

use once_cell::sync::Lazy;
use regex::Regex;

static ORDINAL_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s*").expect("ordinal prefix pattern is valid"));

/// Decodes Latin-1 bytes. Every byte is a valid code point, so this never fails.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Parses a price like `"à§³ 12,000"` by keeping only its digits.
pub fn parse_currency(raw: Option<&str>) -> Option<u64> {
    let digits: String = raw?.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Parses a review count like `" 1,234 "`.
pub fn parse_count(raw: Option<&str>) -> Option<u64> {
    let cleaned = raw?.replace(',', "");
    cleaned.trim().parse().ok()
}

/// Best-effort decimal parse. `NaN` and infinities count as missing.
pub fn parse_decimal(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn trim_text(raw: Option<&str>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
}

/// Removes a leading `"<digits>. "` ordinal. Surrounding whitespace is
/// trimmed before and after the match.
pub fn strip_ordinal_prefix(raw: Option<&str>) -> Option<String> {
    raw.map(|s| ORDINAL_PREFIX_RE.replace(s.trim(), "").trim().to_string())
}

/// Rounds to two decimal places, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_decode_latin1_maps_bytes_to_code_points() {
        // UTF-8 bytes of the taka sign, read as Latin-1
        let decoded = decode_latin1(&[0xE0, 0xA7, 0xB3, b' ', b'1']);
        assert_eq!(decoded, "\u{e0}\u{a7}\u{b3} 1");
    }

    #[test]
    fn test_parse_currency_strips_symbols_and_separators() {
        assert_eq!(parse_currency(Some("à§³ 12,000")), Some(12000));
        assert_eq!(parse_currency(Some("BDT 4,500.00")), Some(450000));
    }

    #[test]
    fn test_parse_currency_without_digits_is_missing() {
        assert_eq!(parse_currency(Some("N/A")), None);
        assert_eq!(parse_currency(Some("   ")), None);
        assert_eq!(parse_currency(None), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Some("1,234")), Some(1234));
        assert_eq!(parse_count(Some("  87 ")), Some(87));
        assert_eq!(parse_count(Some("12 reviews")), None);
        assert_eq!(parse_count(Some("-4")), None);
        assert_eq!(parse_count(None), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal(Some(" 8.4 ")), Some(8.4));
        assert_eq!(parse_decimal(Some("9")), Some(9.0));
        assert_eq!(parse_decimal(Some("Scored 8.4")), None);
        assert_eq!(parse_decimal(Some("NaN")), None);
        assert_eq!(parse_decimal(Some("inf")), None);
    }

    #[test]
    fn test_trim_text_keeps_null() {
        assert_eq!(trim_text(Some("  Gulshan ")), Some("Gulshan".to_string()));
        assert_eq!(trim_text(None), None);
    }

    #[test]
    fn test_strip_ordinal_prefix() {
        assert_eq!(
            strip_ordinal_prefix(Some(" 1. Grand Hotel ")),
            Some("Grand Hotel".to_string())
        );
        assert_eq!(
            strip_ordinal_prefix(Some("12. Sea Pearl")),
            Some("Sea Pearl".to_string())
        );
        assert_eq!(
            strip_ordinal_prefix(Some("Hotel 71")),
            Some("Hotel 71".to_string())
        );
    }

    #[test]
    fn test_strip_ordinal_prefix_twice_equals_once() {
        let once = strip_ordinal_prefix(Some("1. Hotel X"));
        let twice = strip_ordinal_prefix(once.as_deref());
        assert_eq!(once, Some("Hotel X".to_string()));
        assert_eq!(twice, once);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(12000.0 / 120.0), 100.0);
        assert_eq!(round2(1000.0 / 120.0), 8.33);
        assert_eq!(round2(2500.0 / 120.0), 20.83);
    }

    #[test]
    fn test_round2_sends_ties_to_even() {
        // 615 / 120 = 5.125 and 7215 / 120 = 60.125 are exact in binary
        assert_eq!(round2(615.0 / 120.0), 5.12);
        assert_eq!(round2(7215.0 / 120.0), 60.12);
        assert_eq!(round2(645.0 / 120.0), 5.38);
    }

    proptest! {
        #[test]
        fn prop_strip_ordinal_prefix_is_idempotent(
            n in 1u32..1000,
            name in "[A-Za-z][A-Za-z ]{0,20}",
        ) {
            let raw = format!("{n}. {name}");
            let once = strip_ordinal_prefix(Some(&raw));
            let twice = strip_ordinal_prefix(once.as_deref());
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn prop_parsers_never_panic(raw in ".*") {
            let _ = parse_currency(Some(&raw));
            let _ = parse_count(Some(&raw));
            let _ = parse_decimal(Some(&raw));
        }
    }
}
