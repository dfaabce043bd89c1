//! Per-page resource dictionary with dedup-by-identity: look up by key,
//! allocate a fresh `/Name` only on miss, across four resource kinds —
//! fonts, XObjects (images), `ExtGState`s, and color spaces.
//! Fonts and images are indirect objects (shared document-wide via
//! `FontManager`/image embedding); `ExtGState`s and color spaces are
//! small inline dictionaries that don't earn their own indirect object.

use crate::fonts::FontRef;
use crate::object::{Dictionary, ObjectId, Value};
use std::collections::HashMap;

#[derive(Default)]
pub struct ResourceCatalog {
    fonts: HashMap<FontRef, String>,
    x_objects: HashMap<ObjectId, String>,
    ext_gstates: HashMap<ExtGStateKey, String>,
    color_spaces: HashMap<String, String>,
    next_font: u32,
    next_xobject: u32,
    next_gstate: u32,
}

/// `ExtGState` contents that matter for dedup: fill/stroke alpha and an
/// optional blend mode are the knobs the content-stream builder exposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExtGStateKey {
    fill_alpha_milli: i64,
    stroke_alpha_milli: i64,
    blend_mode: Option<String>,
}

impl ResourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this page's local name for `font` (e.g. `"F1"`),
    /// allocating a fresh one on first use.
    pub fn add_font(&mut self, font: FontRef) -> String {
        if let Some(name) = self.fonts.get(&font) {
            return name.clone();
        }
        self.next_font += 1;
        let name = format!("F{}", self.next_font);
        self.fonts.insert(font, name.clone());
        name
    }

    /// Returns this page's local name for the image object `id`.
    pub fn add_image(&mut self, id: ObjectId) -> String {
        if let Some(name) = self.x_objects.get(&id) {
            return name.clone();
        }
        self.next_xobject += 1;
        let name = format!("Im{}", self.next_xobject);
        self.x_objects.insert(id, name.clone());
        name
    }

    /// Returns this page's local name for an `ExtGState` with the
    /// given fill/stroke alpha and blend mode, reusing an existing entry
    /// if one with the same values already exists.
    pub fn add_ext_gstate(&mut self, fill_alpha: f64, stroke_alpha: f64, blend_mode: Option<&str>) -> String {
        let key = ExtGStateKey {
            fill_alpha_milli: (fill_alpha * 1000.0).round() as i64,
            stroke_alpha_milli: (stroke_alpha * 1000.0).round() as i64,
            blend_mode: blend_mode.map(|s| s.to_string()),
        };
        if let Some(name) = self.ext_gstates.get(&key) {
            return name.clone();
        }
        self.next_gstate += 1;
        let name = format!("GS{}", self.next_gstate);
        self.ext_gstates.insert(key, name.clone());
        name
    }

    pub fn add_color_space(&mut self, definition: impl Into<String>) -> String {
        let definition = definition.into();
        if let Some(name) = self.color_spaces.get(&definition) {
            return name.clone();
        }
        let index = self.color_spaces.len() + 1;
        let name = format!("CS{}", index);
        self.color_spaces.insert(definition, name.clone());
        name
    }

    /// Builds the page's `/Resources` dictionary from everything
    /// allocated so far. Every sub-dictionary's keys are written in
    /// sorted local-name order, not hash-map iteration order, so two
    /// runs over the same page produce byte-identical output.
    pub fn build(
        &self,
        font_object_ids: impl Fn(FontRef) -> ObjectId,
    ) -> Dictionary {
        let mut resources = Dictionary::new();

        if !self.fonts.is_empty() {
            let mut entries: Vec<(&String, FontRef)> =
                self.fonts.iter().map(|(font, name)| (name, *font)).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut font_dict = Dictionary::new();
            for (name, font) in entries {
                font_dict.set(name.clone(), font_object_ids(font).to_ref());
            }
            resources.set("Font", Value::Dict(font_dict));
        }

        if !self.x_objects.is_empty() {
            let mut entries: Vec<(&String, ObjectId)> =
                self.x_objects.iter().map(|(id, name)| (name, *id)).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut xobject_dict = Dictionary::new();
            for (name, id) in entries {
                xobject_dict.set(name.clone(), id.to_ref());
            }
            resources.set("XObject", Value::Dict(xobject_dict));
        }

        if !self.ext_gstates.is_empty() {
            let mut entries: Vec<(&String, &ExtGStateKey)> =
                self.ext_gstates.iter().map(|(key, name)| (name, key)).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut gstate_dict = Dictionary::new();
            for (name, key) in entries {
                let mut entry = Dictionary::new();
                entry.set("Type", "ExtGState");
                entry.set("ca", Value::Real(key.fill_alpha_milli as f64 / 1000.0));
                entry.set("CA", Value::Real(key.stroke_alpha_milli as f64 / 1000.0));
                if let Some(blend_mode) = &key.blend_mode {
                    entry.set("BM", Value::Name(blend_mode.clone()));
                }
                gstate_dict.set(name.clone(), Value::Dict(entry));
            }
            resources.set("ExtGState", Value::Dict(gstate_dict));
        }

        if !self.color_spaces.is_empty() {
            let mut entries: Vec<(&String, &String)> =
                self.color_spaces.iter().map(|(definition, name)| (name, definition)).collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut cs_dict = Dictionary::new();
            for (name, definition) in entries {
                cs_dict.set(name.clone(), Value::Name(definition.clone()));
            }
            resources.set("ColorSpace", Value::Dict(cs_dict));
        }

        resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_ext_gstate_dedupes() {
        let mut catalog = ResourceCatalog::new();
        let a = catalog.add_ext_gstate(0.5, 1.0, None);
        let b = catalog.add_ext_gstate(0.5, 1.0, None);
        let c = catalog.add_ext_gstate(0.25, 1.0, None);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn image_names_are_stable_across_repeated_lookups() {
        let mut catalog = ResourceCatalog::new();
        let id = ObjectId { number: 7, generation: 0 };
        let first = catalog.add_image(id);
        let second = catalog.add_image(id);
        assert_eq!(first, second);
        assert_eq!(first, "Im1");
    }

    #[test]
    fn blend_mode_is_part_of_the_dedup_key() {
        let mut catalog = ResourceCatalog::new();
        let a = catalog.add_ext_gstate(1.0, 1.0, Some("Multiply"));
        let b = catalog.add_ext_gstate(1.0, 1.0, Some("Multiply"));
        let c = catalog.add_ext_gstate(1.0, 1.0, Some("Screen"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    /// `build` writes each sub-dictionary's keys in sorted local-name
    /// order rather than whatever order the backing maps iterate in, so
    /// the same catalog renders identically on every call no matter what
    /// a given process's randomized hasher would have produced.
    #[test]
    fn sub_dictionary_keys_come_out_in_sorted_order() {
        let mut catalog = ResourceCatalog::new();
        // 11 color spaces so a naive numeric-looking sort would be
        // exercised too (CS1, CS10, CS11, CS2, ... lexicographically).
        for i in 0..11 {
            catalog.add_color_space(format!("ColorSpace{}", i));
        }

        let dict = catalog.build(|_| ObjectId { number: 1, generation: 0 });
        let Value::Dict(cs_dict) = dict.get("ColorSpace").unwrap() else {
            panic!("expected a ColorSpace dict");
        };
        let names: Vec<&String> = cs_dict.iter().map(|(k, _)| k).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    /// Building the same catalog twice produces byte-identical
    /// `/Resources` output, the property the hash-map-ordering bug broke.
    #[test]
    fn build_is_deterministic_across_repeated_calls() {
        let mut catalog = ResourceCatalog::new();
        for i in 1..=8 {
            catalog.add_image(ObjectId { number: i, generation: 0 });
        }
        catalog.add_ext_gstate(0.5, 1.0, Some("Multiply"));
        catalog.add_ext_gstate(0.25, 0.75, None);
        catalog.add_color_space("DeviceCMYK");
        catalog.add_color_space("CalRGB");

        let render = |catalog: &ResourceCatalog| {
            let mut buf = Vec::new();
            Value::Dict(catalog.build(|_| ObjectId { number: 1, generation: 0 }))
                .write(&mut buf)
                .unwrap();
            buf
        };

        assert_eq!(render(&catalog), render(&catalog));
    }
}
