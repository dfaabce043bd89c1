//! Font management: the 14 standard fonts, the `FontProgram`
//! collaborator for embedded TrueType/OpenType programs, and the
//! document-wide dedup table that hands out [`FontRef`] handles.
//! Embedded fonts go through a `Type0`/`CIDFontType2`/`ToUnicode`
//! composite-font dictionary; this crate never parses font files
//! itself, that parsing is pushed out to a caller-supplied
//! `FontProgram` implementation — a pluggable collaborator, not a
//! built-in parser.

mod standard;

pub use standard::StandardFont;

use crate::error::PdfError;
use crate::object::{Dictionary, ObjectId, ObjectTable, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// Anything that can report per-character advance widths in PDF text
/// space: 1000 units per em, scaled by font size and divided by 1000.
pub trait FontMetrics {
    fn advance_width(&self, ch: char) -> f64;

    fn string_width(&self, s: &str, size: f64) -> f64 {
        s.chars().map(|c| self.advance_width(c)).sum::<f64>() / 1000.0 * size
    }
}

/// An externally-parsed TrueType/OpenType font program. The crate
/// never parses font files itself; a caller
/// supplies one of these, built by whatever font-parsing crate fits
/// their application.
pub trait FontProgram {
    fn postscript_name(&self) -> &str;
    fn program_bytes(&self) -> &[u8];
    fn units_per_em(&self) -> u16;
    fn ascender(&self) -> i16;
    fn descender(&self) -> i16;
    /// Unicode scalar value to glyph id, for building `/CIDToGIDMap`
    /// and the content stream's glyph-index string.
    fn glyph_id(&self, ch: char) -> Option<u16>;
    /// Advance width in font units (scaled to 1000/em by the caller
    /// via `units_per_em`).
    fn advance_width(&self, ch: char) -> Option<u16>;
}

struct EmbeddedMetrics {
    units_per_em: u16,
    widths: HashMap<char, u16>,
}

impl FontMetrics for EmbeddedMetrics {
    fn advance_width(&self, ch: char) -> f64 {
        let raw = self.widths.get(&ch).copied().unwrap_or(0) as f64;
        raw * 1000.0 / self.units_per_em as f64
    }
}

enum Metrics {
    Standard(StandardFont),
    Embedded(Rc<EmbeddedMetrics>),
}

impl FontMetrics for Metrics {
    fn advance_width(&self, ch: char) -> f64 {
        match self {
            Metrics::Standard(f) => f.advance_width(ch),
            Metrics::Embedded(m) => m.advance_width(ch),
        }
    }
}

struct FontEntry {
    object_id: ObjectId,
    metrics: Metrics,
}

/// A document-wide handle to an embedded font, returned by
/// [`FontManager::embed_standard`]/[`embed_truetype`]. Cheap to copy;
/// the actual dictionary lives in the object table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontRef(usize);

/// Deduplicates font embeddings document-wide: requesting the same
/// standard font twice, or a `FontProgram` with the same PostScript
/// name twice, returns the same [`FontRef`] and does not create a
/// second font dictionary.
#[derive(Default)]
pub struct FontManager {
    entries: Vec<FontEntry>,
    standard_index: HashMap<StandardFont, FontRef>,
    embedded_index: HashMap<String, FontRef>,
}

impl FontManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn embed_standard(&mut self, table: &mut ObjectTable, font: StandardFont) -> FontRef {
        if let Some(&existing) = self.standard_index.get(&font) {
            return existing;
        }
        let mut dict = Dictionary::new();
        dict.set("Type", "Font");
        dict.set("Subtype", "Type1");
        dict.set("BaseFont", font.base_name());
        dict.set("Encoding", "WinAnsiEncoding");
        let object_id = table.put(Value::Dict(dict));

        let r = FontRef(self.entries.len());
        self.entries.push(FontEntry {
            object_id,
            metrics: Metrics::Standard(font),
        });
        self.standard_index.insert(font, r);
        r
    }

    /// Embeds a caller-supplied TrueType program as a composite
    /// `Type0`/`CIDFontType2` font with an identity `CIDToGIDMap` and a
    /// `ToUnicode` CMap, deduped by PostScript name.
    pub fn embed_truetype(
        &mut self,
        table: &mut ObjectTable,
        program: &dyn FontProgram,
    ) -> Result<FontRef, PdfError> {
        let name = program.postscript_name().to_string();
        if let Some(&existing) = self.embedded_index.get(&name) {
            return Ok(existing);
        }

        let file_id = table.put(Value::Stream(Dictionary::new(), program.program_bytes().to_vec()));

        let mut descriptor = Dictionary::new();
        descriptor.set("Type", "FontDescriptor");
        descriptor.set("FontName", name.clone());
        descriptor.set("Flags", Value::Integer(32));
        descriptor.set("Ascent", Value::number(program.ascender() as f64)?);
        descriptor.set("Descent", Value::number(program.descender() as f64)?);
        descriptor.set("ItalicAngle", Value::Integer(0));
        descriptor.set("StemV", Value::Integer(80));
        descriptor.set("FontFile2", file_id.to_ref());
        let descriptor_id = table.put(Value::Dict(descriptor));

        let mut cid_font = Dictionary::new();
        cid_font.set("Type", "Font");
        cid_font.set("Subtype", "CIDFontType2");
        cid_font.set("BaseFont", name.clone());
        let mut sys_info = Dictionary::new();
        sys_info.set("Registry", Value::LiteralString(b"Adobe".to_vec()));
        sys_info.set("Ordering", Value::LiteralString(b"Identity".to_vec()));
        sys_info.set("Supplement", Value::Integer(0));
        cid_font.set("CIDSystemInfo", Value::Dict(sys_info));
        cid_font.set("FontDescriptor", descriptor_id.to_ref());
        cid_font.set("CIDToGIDMap", "Identity");
        let cid_font_id = table.put(Value::Dict(cid_font));

        let to_unicode_id = table.put(Value::Stream(Dictionary::new(), to_unicode_cmap(program)));

        let mut type0 = Dictionary::new();
        type0.set("Type", "Font");
        type0.set("Subtype", "Type0");
        type0.set("BaseFont", name.clone());
        type0.set("Encoding", "Identity-H");
        type0.set("DescendantFonts", Value::Array(vec![cid_font_id.to_ref()]));
        type0.set("ToUnicode", to_unicode_id.to_ref());
        let object_id = table.put(Value::Dict(type0));

        let mut widths = HashMap::new();
        for code in 0x20u32..=0x7E {
            if let Some(ch) = char::from_u32(code) {
                if let Some(w) = program.advance_width(ch) {
                    widths.insert(ch, w);
                }
            }
        }

        let r = FontRef(self.entries.len());
        self.entries.push(FontEntry {
            object_id,
            metrics: Metrics::Embedded(Rc::new(EmbeddedMetrics {
                units_per_em: program.units_per_em(),
                widths,
            })),
        });
        self.embedded_index.insert(name, r);
        Ok(r)
    }

    pub fn object_id(&self, r: FontRef) -> ObjectId {
        self.entries[r.0].object_id
    }

    pub fn metrics(&self, r: FontRef) -> &dyn FontMetrics {
        &self.entries[r.0].metrics
    }
}

/// A minimal `ToUnicode` CMap covering the printable-ASCII range, good
/// enough for copy-paste/search fidelity without round-tripping the
/// font's full cmap table.
fn to_unicode_cmap(program: &dyn FontProgram) -> Vec<u8> {
    let mut entries = Vec::new();
    for code in 0x20u32..=0x7E {
        if let Some(ch) = char::from_u32(code) {
            if let Some(gid) = program.glyph_id(ch) {
                entries.push(format!("<{:04X}> <{:04X}>", gid, code as u32));
            }
        }
    }
    let body = entries.join("\n");
    format!(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n\
         {} beginbfchar\n{}\nendbfchar\n\
         endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\nend\n",
        entries.len(),
        body
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_the_same_standard_font_twice_dedupes() {
        let mut table = ObjectTable::new();
        let mut manager = FontManager::new();
        let a = manager.embed_standard(&mut table, StandardFont::Helvetica);
        let b = manager.embed_standard(&mut table, StandardFont::Helvetica);
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_standard_fonts_get_distinct_objects() {
        let mut table = ObjectTable::new();
        let mut manager = FontManager::new();
        let a = manager.embed_standard(&mut table, StandardFont::Helvetica);
        let b = manager.embed_standard(&mut table, StandardFont::TimesBold);
        assert_ne!(a, b);
        assert_eq!(table.len(), 2);
    }
}
