//! Property-based checks for the primitive encoder and font metrics,
//! run over randomly generated inputs rather than fixed examples.

use pagecraft::fonts::{FontMetrics, StandardFont};
use pagecraft::object::Value;
use proptest::prelude::*;

fn render(value: &Value) -> String {
    let mut buf = Vec::new();
    value.write(&mut buf).unwrap();
    String::from_utf8(buf).unwrap()
}

proptest! {
    /// `Value::number` always writes something that parses back as a
    /// float within the 5-decimal precision the encoder promises.
    #[test]
    fn real_numbers_round_trip_within_encoder_precision(v in -1_000_000.0f64..1_000_000.0) {
        let encoded = Value::number(v).unwrap();
        let rendered = render(&encoded);
        let parsed: f64 = rendered.parse().expect("encoder output must be a bare number");
        prop_assert!((parsed - v).abs() < 1e-3);
    }

    /// Integers (whole-valued floats) always come out with no decimal
    /// point at all, matching the integer-preference rule.
    #[test]
    fn whole_numbers_encode_without_a_decimal_point(v in -100_000i64..100_000i64) {
        let encoded = Value::number(v as f64).unwrap();
        let rendered = render(&encoded);
        prop_assert!(!rendered.contains('.'));
        prop_assert_eq!(rendered.parse::<i64>().unwrap(), v);
    }

    /// `Value::name` rejects anything outside 1..=127 bytes and accepts
    /// everything inside it.
    #[test]
    fn name_length_bounds_are_enforced(len in 0usize..200) {
        let s: String = "a".repeat(len);
        let result = Value::name(s);
        if len == 0 || len > 127 {
            prop_assert!(result.is_err());
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// String width is additive: measuring two printable-ASCII chunks
    /// separately and summing gives the same result as measuring their
    /// concatenation, for every standard font.
    #[test]
    fn standard_font_string_width_is_additive(
        left in "[ -~]{0,30}",
        right in "[ -~]{0,30}",
        size in 1.0f64..144.0,
    ) {
        for font in StandardFont::ALL {
            let combined = font.string_width(&format!("{}{}", left, right), size);
            let separate = font.string_width(&left, size) + font.string_width(&right, size);
            prop_assert!((combined - separate).abs() < 1e-6);
        }
    }

    /// Scaling the font size scales the measured width by the same
    /// factor, for any printable-ASCII string.
    #[test]
    fn standard_font_string_width_scales_linearly_with_size(
        text in "[ -~]{0,40}",
        size in 1.0f64..72.0,
    ) {
        let base = StandardFont::Helvetica.string_width(&text, size);
        let doubled = StandardFont::Helvetica.string_width(&text, size * 2.0);
        prop_assert!((doubled - base * 2.0).abs() < 1e-6);
    }
}
