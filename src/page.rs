//! Pages and the page tree.
//!
//! Pages are kept in a flat list as they're added and the fan-out-10
//! balanced `/Pages` internal-node tree is only built at serialization
//! time, once the final page count is known.

use crate::annotations::Annotation;
use crate::content::ContentStreamBuilder;
use crate::error::PdfError;
use crate::fonts::FontManager;
use crate::formfields::FormField;
use crate::object::{Dictionary, ObjectId, ObjectTable, Value};
use crate::resources::ResourceCatalog;
use std::collections::HashMap;

/// Every internal `/Pages` node fans out to at most this many children
/// before a new level is introduced.
const FAN_OUT: usize = 10;

pub struct Page {
    pub media_box: (f64, f64, f64, f64),
    pub crop_box: Option<(f64, f64, f64, f64)>,
    pub rotation: i32,
    pub content: ContentStreamBuilder,
    pub resources: ResourceCatalog,
    /// Annotations attached to this page (links, text notes,
    /// highlights, ...). Each is bound as its own indirect object and
    /// listed in the page's `/Annots` array at `finish` time.
    pub annotations: Vec<Annotation>,
    /// Interactive form fields on this page. Like annotations, each
    /// becomes its own indirect object referenced from `/Annots`; the
    /// form-field ids are also collected document-wide into the
    /// catalog's `/AcroForm` `/Fields` array.
    pub form_fields: Vec<FormField>,
    object_id: ObjectId,
}

impl Page {
    pub(crate) fn new(object_id: ObjectId, media_box: (f64, f64, f64, f64)) -> Self {
        Page {
            media_box,
            crop_box: None,
            rotation: 0,
            content: ContentStreamBuilder::new(),
            resources: ResourceCatalog::new(),
            annotations: Vec::new(),
            form_fields: Vec::new(),
            object_id,
        }
    }

    pub fn object_id(&self) -> ObjectId {
        self.object_id
    }

    /// Sets page rotation in degrees, normalized to a multiple of 90.
    /// Non-multiples of 90 are rejected at the API boundary, not
    /// silently rounded.
    pub fn set_rotation(&mut self, degrees: i32) -> Result<(), PdfError> {
        if degrees % 90 != 0 {
            return Err(PdfError::InvalidMediaBox);
        }
        self.rotation = degrees.rem_euclid(360);
        Ok(())
    }

    /// Binds this page's `/Page` dictionary (plus one indirect object
    /// per annotation/form field) and returns the object ids of any
    /// form fields on it, for the caller to fold into the document's
    /// `/AcroForm` `/Fields` array.
    fn finish(
        &self,
        table: &mut ObjectTable,
        parent: ObjectId,
        fonts: &FontManager,
        content_id: ObjectId,
    ) -> Result<Vec<ObjectId>, PdfError> {
        let (x0, y0, x1, y1) = self.media_box;
        if x1 <= x0 || y1 <= y0 {
            return Err(PdfError::InvalidMediaBox);
        }

        let mut dict = Dictionary::new();
        dict.set("Type", "Page");
        dict.set("Parent", parent.to_ref());
        dict.set(
            "MediaBox",
            Value::Array(vec![
                Value::number(x0)?,
                Value::number(y0)?,
                Value::number(x1)?,
                Value::number(y1)?,
            ]),
        );
        if let Some((cx0, cy0, cx1, cy1)) = self.crop_box {
            dict.set(
                "CropBox",
                Value::Array(vec![
                    Value::number(cx0)?,
                    Value::number(cy0)?,
                    Value::number(cx1)?,
                    Value::number(cy1)?,
                ]),
            );
        }
        if self.rotation != 0 {
            dict.set("Rotate", Value::Integer(self.rotation as i64));
        }
        dict.set(
            "Resources",
            Value::Dict(self.resources.build(|font| fonts.object_id(font))),
        );
        dict.set("Contents", content_id.to_ref());

        let mut annot_refs = Vec::new();
        let mut field_ids = Vec::new();
        for annotation in &self.annotations {
            annot_refs.push(table.put(Value::Dict(annotation.to_dict())));
        }
        for field in &self.form_fields {
            let id = table.put(Value::Dict(field.to_dict()));
            annot_refs.push(id);
            field_ids.push(id);
        }
        if !annot_refs.is_empty() {
            dict.set("Annots", Value::Array(annot_refs.iter().map(|id| id.to_ref()).collect()));
        }

        table.bind(self.object_id, Value::Dict(dict))?;
        Ok(field_ids)
    }
}

/// Owns the ordered list of pages and, at assembly time, builds a
/// fan-out-10 balanced `/Pages` tree.
#[derive(Default)]
pub struct PageTree {
    pages: Vec<Page>,
}

impl PageTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, page: Page) {
        self.pages.push(page);
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn pages_mut(&mut self) -> &mut [Page] {
        &mut self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Finalizes every page dictionary and builds the balanced internal
    /// node tree, returning the root `/Pages` object id and the object
    /// ids of every form field across all pages (for the document's
    /// `/AcroForm`). `content_ids` must be the same length and order as
    /// `self.pages`, each the object id of that page's already-bound
    /// content stream.
    pub fn build(
        &self,
        table: &mut ObjectTable,
        fonts: &FontManager,
        content_ids: &[ObjectId],
    ) -> Result<(ObjectId, Vec<ObjectId>), PdfError> {
        assert_eq!(content_ids.len(), self.pages.len());

        if self.pages.is_empty() {
            let mut dict = Dictionary::new();
            dict.set("Type", "Pages");
            dict.set("Kids", Value::Array(vec![]));
            dict.set("Count", Value::Integer(0));
            return Ok((table.put(Value::Dict(dict)), Vec::new()));
        }

        let leaf_ids: Vec<ObjectId> = self.pages.iter().map(Page::object_id).collect();

        // Build levels bottom-up: each level groups the previous one
        // into chunks of at most FAN_OUT, allocating one node id per
        // chunk. `levels[k]` holds, for level k+1 above the leaves,
        // the node id of each group and the child ids it groups.
        let mut levels: Vec<Vec<(ObjectId, Vec<ObjectId>)>> = Vec::new();
        let mut current: Vec<ObjectId> = leaf_ids.clone();

        while current.len() > FAN_OUT {
            let mut level = Vec::new();
            for chunk in current.chunks(FAN_OUT) {
                let node_id = table.allocate();
                level.push((node_id, chunk.to_vec()));
            }
            current = level.iter().map(|(id, _)| *id).collect();
            levels.push(level);
        }

        // `current` now holds either the leaf ids directly (<= FAN_OUT
        // pages total, no intermediate levels) or the top level of
        // intermediate nodes; either way these become the root's kids.
        let root = table.allocate();

        // Map each node id to its parent, working from the root down.
        let mut parent_of: HashMap<ObjectId, ObjectId> = HashMap::new();
        for &id in &current {
            parent_of.insert(id, root);
        }
        for level in levels.iter().rev() {
            for (node_id, children) in level {
                for child in children {
                    parent_of.insert(*child, *node_id);
                }
            }
        }

        // Bind intermediate nodes, each with its own Count (total
        // leaves under it) and Parent (looked up above).
        let mut counts: HashMap<ObjectId, usize> = leaf_ids.iter().map(|id| (*id, 1)).collect();
        for level in &levels {
            for (node_id, children) in level {
                let count: usize = children.iter().map(|c| counts[c]).sum();
                counts.insert(*node_id, count);
            }
        }
        for level in &levels {
            for (node_id, children) in level {
                let mut dict = Dictionary::new();
                dict.set("Type", "Pages");
                dict.set("Parent", parent_of[node_id].to_ref());
                dict.set(
                    "Kids",
                    Value::Array(children.iter().map(|c| c.to_ref()).collect()),
                );
                dict.set("Count", Value::Integer(counts[node_id] as i64));
                table.bind(*node_id, Value::Dict(dict))?;
            }
        }

        let mut root_dict = Dictionary::new();
        root_dict.set("Type", "Pages");
        root_dict.set(
            "Kids",
            Value::Array(current.iter().map(|id| id.to_ref()).collect()),
        );
        root_dict.set("Count", Value::Integer(self.pages.len() as i64));
        table.bind(root, Value::Dict(root_dict))?;

        let mut all_field_ids = Vec::new();
        for ((page, &content_id), &leaf_id) in self.pages.iter().zip(content_ids).zip(&leaf_ids) {
            let parent = parent_of.get(&leaf_id).copied().unwrap_or(root);
            all_field_ids.extend(page.finish(table, parent, fonts, content_id)?);
        }

        Ok((root, all_field_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontManager;

    #[test]
    fn finish_collects_annotations_and_form_fields_into_annots() {
        let mut table = ObjectTable::new();
        let page_id = table.allocate();
        let mut page = Page::new(page_id, (0.0, 0.0, 612.0, 792.0));
        page.annotations.push(Annotation::Link {
            rect: (0.0, 0.0, 50.0, 10.0),
            uri: "https://example.com".to_string(),
        });
        page.form_fields.push(FormField::Text {
            name: "name".to_string(),
            rect: (0.0, 20.0, 100.0, 40.0),
            value: String::new(),
            max_len: None,
        });

        let content_id = table.put(Value::Stream(Dictionary::new(), Vec::new()));
        let parent = table.put(Value::Null);
        let fonts = FontManager::new();
        let field_ids = page.finish(&mut table, parent, &fonts, content_id).unwrap();

        assert_eq!(field_ids.len(), 1);
        let Value::Dict(page_dict) = table.resolve(page_id).unwrap() else {
            panic!("expected a page dict");
        };
        let Some(Value::Array(annots)) = page_dict.get("Annots") else {
            panic!("expected an Annots array");
        };
        assert_eq!(annots.len(), 2);
    }

    #[test]
    fn pages_with_no_annotations_omit_annots() {
        let mut table = ObjectTable::new();
        let page_id = table.allocate();
        let page = Page::new(page_id, (0.0, 0.0, 612.0, 792.0));
        let content_id = table.put(Value::Stream(Dictionary::new(), Vec::new()));
        let parent = table.put(Value::Null);
        let fonts = FontManager::new();
        page.finish(&mut table, parent, &fonts, content_id).unwrap();

        let Value::Dict(page_dict) = table.resolve(page_id).unwrap() else {
            panic!("expected a page dict");
        };
        assert!(page_dict.get("Annots").is_none());
    }
}
