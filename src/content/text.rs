//! Word-wrapping and multi-line text layout on top of the raw
//! `Tj`/`Td`/`Tw` operators, broken greedily the way a paragraph-setting
//! routine in any from-scratch PDF writer would.

use crate::content::ContentStreamBuilder;
use crate::error::PdfError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Center,
    /// Stretches inter-word spacing (via `Tw`) so the line's last word
    /// reaches `max_width`, except on the final line of the paragraph.
    Justify,
}

/// The outcome of laying out a paragraph: how many lines it took and
/// how much vertical space it consumed, so a caller can decide whether
/// the text overflowed its box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WrapResult {
    pub line_count: usize,
    pub total_height: f64,
}

/// Greedily packs `text` into lines no wider than `max_width`, using
/// `width_of` to measure a candidate line at the call's font and size.
/// A single word wider than `max_width` still gets its own line rather
/// than being split mid-word.
pub fn wrap_lines(text: &str, max_width: f64, width_of: &dyn Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in words {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if !current.is_empty() && width_of(&candidate) > max_width {
                lines.push(current);
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

/// Lays out `text` starting at `(x, y)` in the builder's current text
/// object, wrapping at `max_width`, advancing by `line_height` per
/// line, and applying `alignment` (including `Tw` injection for
/// `Justify`). Returns the number of lines emitted. The caller must
/// already have called `begin_text`/`set_font`.
#[allow(clippy::too_many_arguments)]
pub fn show_wrapped(
    builder: &mut ContentStreamBuilder,
    text: &str,
    x: f64,
    y: f64,
    max_width: f64,
    line_height: f64,
    alignment: Alignment,
    width_of: &dyn Fn(&str) -> f64,
    encode: &dyn Fn(&str) -> Vec<u8>,
) -> Result<WrapResult, PdfError> {
    let lines = wrap_lines(text, max_width, width_of);
    let line_count = lines.len();

    for (i, line) in lines.iter().enumerate() {
        let line_width = width_of(line);
        let space_count = line.matches(' ').count();
        let is_last = i + 1 == line_count;

        let line_x = match alignment {
            Alignment::Left | Alignment::Justify => x,
            Alignment::Right => x + (max_width - line_width),
            Alignment::Center => x + (max_width - line_width) / 2.0,
        };
        let line_y = y - line_height * i as f64;

        builder.set_text_position(line_x, line_y)?;

        if alignment == Alignment::Justify && !is_last && space_count > 0 {
            let extra = (max_width - line_width) / space_count as f64;
            builder.set_word_spacing(extra)?;
        } else if builder.word_spacing() != 0.0 {
            builder.set_word_spacing(0.0)?;
        }

        if !line.is_empty() {
            builder.show_encoded(&encode(line))?;
        }
    }

    Ok(WrapResult {
        line_count,
        total_height: line_height * line_count as f64,
    })
}
