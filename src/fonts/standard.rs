//! The 14 standard PDF fonts and their AFM-style width tables, built
//! from the published Adobe core-14 font metrics, covering the
//! printable ASCII range 0x20-0x7E that `WinAnsiEncoding` shares with
//! ASCII.

use crate::fonts::FontMetrics;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

impl StandardFont {
    pub const ALL: [StandardFont; 14] = [
        StandardFont::Helvetica,
        StandardFont::HelveticaBold,
        StandardFont::HelveticaOblique,
        StandardFont::HelveticaBoldOblique,
        StandardFont::TimesRoman,
        StandardFont::TimesBold,
        StandardFont::TimesItalic,
        StandardFont::TimesBoldItalic,
        StandardFont::Courier,
        StandardFont::CourierBold,
        StandardFont::CourierOblique,
        StandardFont::CourierBoldOblique,
        StandardFont::Symbol,
        StandardFont::ZapfDingbats,
    ];

    /// The `/BaseFont` name.
    pub fn base_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::Symbol => "Symbol",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => &HELVETICA,
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => helvetica_bold(),
            StandardFont::TimesRoman | StandardFont::TimesItalic => &TIMES_ROMAN,
            StandardFont::TimesBold | StandardFont::TimesBoldItalic => times_bold(),
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => &COURIER,
            // Symbol and ZapfDingbats use a non-Latin custom encoding;
            // a flat average advance is used in place of the full glyph
            // table since neither font is addressed by character code
            // in the same way as the Latin-text faces.
            StandardFont::Symbol | StandardFont::ZapfDingbats => &FLAT_500,
        }
    }
}

impl FontMetrics for StandardFont {
    fn advance_width(&self, ch: char) -> f64 {
        let code = ch as u32;
        if (0x20..=0x7E).contains(&code) {
            self.widths()[(code - 0x20) as usize] as f64
        } else {
            // Fall back to the width of space for anything outside the
            // directly-encoded range rather than failing measurement.
            self.widths()[0] as f64
        }
    }
}

const FLAT_500: [u16; 95] = [500; 95];

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667,
    778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556,
    556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Bold-variant widths have no published metrics of their own here;
/// §4.4 approximates them as a 1.1× scale of the regular-weight table,
/// computed once and cached rather than hard-coded.
fn scale_bold(base: &'static [u16; 95]) -> [u16; 95] {
    let mut out = [0u16; 95];
    for (i, &w) in base.iter().enumerate() {
        out[i] = (w as f64 * 1.1).round() as u16;
    }
    out
}

fn helvetica_bold() -> &'static [u16; 95] {
    static TABLE: OnceLock<[u16; 95]> = OnceLock::new();
    TABLE.get_or_init(|| scale_bold(&HELVETICA))
}

fn times_bold() -> &'static [u16; 95] {
    static TABLE: OnceLock<[u16; 95]> = OnceLock::new();
    TABLE.get_or_init(|| scale_bold(&TIMES_ROMAN))
}

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556,
    722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500,
    500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

const COURIER: [u16; 95] = [600; 95];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core14_table_covers_printable_ascii() {
        for font in StandardFont::ALL {
            assert_eq!(font.widths().len(), 95);
        }
    }

    #[test]
    fn courier_is_monospace() {
        let widths: Vec<f64> = "Courier font".chars().map(|c| StandardFont::Courier.advance_width(c)).collect();
        assert!(widths.iter().all(|&w| w == 600.0));
    }

    #[test]
    fn string_width_scales_by_font_size() {
        let width_10 = StandardFont::Helvetica.string_width("AVA", 10.0);
        let width_20 = StandardFont::Helvetica.string_width("AVA", 20.0);
        assert!((width_20 - width_10 * 2.0).abs() < 1e-9);
    }

    #[test]
    fn bold_variants_are_a_1_1x_scale_of_the_regular_table() {
        for (regular, bold) in [
            (StandardFont::Helvetica, StandardFont::HelveticaBold),
            (StandardFont::TimesRoman, StandardFont::TimesBold),
        ] {
            for code in 0x20..=0x7E {
                let ch = char::from_u32(code).unwrap();
                let expected = (regular.advance_width(ch) * 1.1).round();
                assert_eq!(bold.advance_width(ch), expected);
            }
        }
    }

    #[test]
    fn oblique_and_bold_oblique_share_their_upright_counterpart_widths() {
        assert_eq!(
            StandardFont::Helvetica.advance_width('A'),
            StandardFont::HelveticaOblique.advance_width('A')
        );
        assert_eq!(
            StandardFont::HelveticaBold.advance_width('A'),
            StandardFont::HelveticaBoldOblique.advance_width('A')
        );
    }
}
