//! The top-level `Document` assembler:
//! `create`, `add_page`, font/image embedding, and `save`.
//!
//! The catalog, page-tree root, and info dictionary ids are reserved up
//! front so forward references can be built while pages are still being
//! added, then filled in as an explicit `create`/mutate/`save` lifecycle
//! with a freeze-on-save invariant.

use crate::collaborators::{Compressor, Encryptor, Signer};
use crate::config::DocumentConfig;
use crate::error::PdfError;
use crate::fonts::{FontManager, FontProgram, FontRef, StandardFont};
use crate::object::{Dictionary, ObjectId, ObjectTable, Value};
use crate::page::{Page, PageTree};
use crate::serializer::Serializer;
use chrono::{DateTime, Utc};

/// Document-level metadata written into the `/Info` dictionary.
#[derive(Debug, Clone, Default)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<DateTime<Utc>>,
    pub mod_date: Option<DateTime<Utc>>,
}

pub struct Document {
    objects: ObjectTable,
    fonts: FontManager,
    pages: PageTree,
    config: DocumentConfig,
    catalog_id: ObjectId,
    info_id: ObjectId,
    compressor: Option<Box<dyn Compressor>>,
    encryptor: Option<Box<dyn Encryptor>>,
    signer: Option<Box<dyn Signer>>,
    frozen: bool,
}

impl Document {
    /// Creates a new, empty document and immediately binds its `/Info`
    /// dictionary. `metadata`'s
    /// `creation_date` defaults to now if not supplied.
    pub fn create(mut metadata: DocumentMetadata) -> Result<Self, PdfError> {
        let mut objects = ObjectTable::new();
        if metadata.creation_date.is_none() {
            metadata.creation_date = Some(Utc::now());
        }

        let catalog_id = objects.allocate();
        let info_id = objects.put(Value::Dict(metadata_dict(&metadata)));

        tracing::debug!(?catalog_id, ?info_id, "document created");

        Ok(Document {
            objects,
            fonts: FontManager::new(),
            pages: PageTree::new(),
            config: DocumentConfig::default(),
            catalog_id,
            info_id,
            compressor: None,
            encryptor: None,
            signer: None,
            frozen: false,
        })
    }

    pub fn with_config(mut self, config: DocumentConfig) -> Self {
        self.config = config;
        self
    }

    fn check_mutable(&self) -> Result<(), PdfError> {
        if self.frozen {
            Err(PdfError::AlreadyFrozen)
        } else {
            Ok(())
        }
    }

    pub fn set_compressor(&mut self, compressor: Box<dyn Compressor>) -> Result<(), PdfError> {
        self.check_mutable()?;
        self.compressor = Some(compressor);
        Ok(())
    }

    pub fn set_encryptor(&mut self, encryptor: Box<dyn Encryptor>) -> Result<(), PdfError> {
        self.check_mutable()?;
        self.encryptor = Some(encryptor);
        Ok(())
    }

    pub fn set_signer(&mut self, signer: Box<dyn Signer>) -> Result<(), PdfError> {
        self.check_mutable()?;
        self.signer = Some(signer);
        Ok(())
    }

    /// Adds a new page with the given media box `(x0, y0, x1, y1)` and
    /// returns a mutable handle to it for drawing.
    pub fn add_page(&mut self, media_box: (f64, f64, f64, f64)) -> Result<&mut Page, PdfError> {
        self.check_mutable()?;
        let (x0, y0, x1, y1) = media_box;
        if x1 <= x0 || y1 <= y0 {
            return Err(PdfError::InvalidMediaBox);
        }
        let object_id = self.objects.allocate();
        self.pages.push(Page::new(object_id, media_box));
        Ok(self.pages.pages_mut().last_mut().expect("just pushed"))
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Embeds one of the 14 standard fonts, deduped document-wide.
    pub fn embed_standard_font(&mut self, font: StandardFont) -> Result<FontRef, PdfError> {
        self.check_mutable()?;
        Ok(self.fonts.embed_standard(&mut self.objects, font))
    }

    /// Embeds a caller-supplied TrueType program, deduped document-wide
    /// by PostScript name.
    pub fn embed_truetype_font(&mut self, program: &dyn FontProgram) -> Result<FontRef, PdfError> {
        self.check_mutable()?;
        self.fonts.embed_truetype(&mut self.objects, program)
    }

    pub fn font_metrics(&self, font: FontRef) -> &dyn crate::fonts::FontMetrics {
        self.fonts.metrics(font)
    }

    /// Embeds an image as an `XObject` and returns its object id, ready
    /// to be registered with a page's `ResourceCatalog`. A soft mask, if
    /// the descriptor carries one, is embedded first and referenced via
    /// `/SMask`.
    pub fn embed_image(
        &mut self,
        descriptor: &dyn crate::collaborators::ImageDescriptor,
    ) -> Result<ObjectId, PdfError> {
        self.check_mutable()?;
        let mut dict = Dictionary::new();
        dict.set("Type", "XObject");
        dict.set("Subtype", "Image");
        dict.set("Width", Value::Integer(descriptor.width() as i64));
        dict.set("Height", Value::Integer(descriptor.height() as i64));
        dict.set("BitsPerComponent", Value::Integer(descriptor.bits_per_component() as i64));
        dict.set("ColorSpace", descriptor.color_space());
        if let Some(filter) = descriptor.filter_name() {
            dict.set("Filter", filter);
        }
        if let Some(mask) = descriptor.s_mask() {
            let mask_id = self.embed_image(mask)?;
            dict.set("SMask", mask_id.to_ref());
        }
        let id = self.objects.put(Value::Stream(dict, descriptor.samples().to_vec()));
        Ok(id)
    }

    /// Freezes the document and serializes it to PDF bytes. Idempotent
    /// at the type level but not at the value level:
    /// once called, every further mutating call fails `AlreadyFrozen`.
    pub fn save(&mut self) -> Result<Vec<u8>, PdfError> {
        self.check_mutable()?;
        self.frozen = true;

        let span = tracing::info_span!("save", pages = self.pages.len());
        let _enter = span.enter();

        if let Some(encryptor) = &self.encryptor {
            if !encryptor.is_ready() {
                return Err(PdfError::EncryptionStateInvalid);
            }
        }

        let mut content_ids = Vec::with_capacity(self.pages.len());
        let page_contents: Vec<Vec<u8>> = self
            .pages
            .pages()
            .iter()
            .map(|p| p.content.as_bytes().to_vec())
            .collect();

        for bytes in page_contents {
            let (payload, filter) = match &self.compressor {
                Some(compressor) => (compressor.compress(&bytes)?, Some(compressor.filter_name())),
                None => (bytes, None),
            };
            let mut dict = Dictionary::new();
            if let Some(filter) = filter {
                dict.set("Filter", filter);
            }
            let id = self.objects.put(Value::Stream(dict, payload));
            content_ids.push(id);
        }

        let (pages_root, form_field_ids) = self.pages.build(&mut self.objects, &self.fonts, &content_ids)?;

        let mut catalog = Dictionary::new();
        catalog.set("Type", "Catalog");
        catalog.set("Pages", pages_root.to_ref());
        if !form_field_ids.is_empty() {
            let mut acro_form = Dictionary::new();
            acro_form.set(
                "Fields",
                Value::Array(form_field_ids.iter().map(|id| id.to_ref()).collect()),
            );
            catalog.set("AcroForm", Value::Dict(acro_form));
        }
        self.objects.bind(self.catalog_id, Value::Dict(catalog))?;

        self.objects.validate_fully_bound()?;

        let encrypt_id = if let Some(encryptor) = &self.encryptor {
            let dict = encryptor.build_encrypt_dict();
            Some(self.objects.put(Value::Dict(dict)))
        } else {
            None
        };
        let encrypt = encrypt_id.map(|id| (id, self.encryptor.as_deref().expect("just built from it")));

        let id_seed = self.id_seed();
        tracing::debug!("serializing document");
        Serializer::new(&self.config, self.catalog_id, self.info_id, id_seed, encrypt, self.signer.as_deref())
            .serialize(&mut self.objects)
    }

    /// Bytes the serializer hashes to derive the `/ID` pair: the
    /// metadata fields, page count, and first page's `MediaBox`, so the
    /// id depends only on document content, never on wall-clock time or
    /// byte offsets.
    fn id_seed(&self) -> Vec<u8> {
        let Value::Dict(info) = self.objects.resolve(self.info_id).expect("info is bound at create") else {
            unreachable!("info object is always a Dict")
        };
        let mut seed = Vec::new();
        for key in ["Title", "Author", "Subject", "Keywords", "Creator", "Producer", "CreationDate", "ModDate"] {
            if let Some(Value::LiteralString(bytes)) = info.get(key) {
                seed.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
                seed.extend_from_slice(bytes);
            }
        }
        seed.extend_from_slice(&(self.pages.len() as u32).to_be_bytes());
        if let Some(first) = self.pages.pages().first() {
            let (x0, y0, x1, y1) = first.media_box;
            for component in [x0, y0, x1, y1] {
                seed.extend_from_slice(&component.to_be_bytes());
            }
        }
        if let Some(salt) = &self.config.id_seed_salt {
            seed.extend_from_slice(salt);
        }
        seed
    }
}

fn metadata_dict(metadata: &DocumentMetadata) -> Dictionary {
    let mut dict = Dictionary::new();
    if let Some(title) = &metadata.title {
        dict.set("Title", Value::LiteralString(title.clone().into_bytes()));
    }
    if let Some(author) = &metadata.author {
        dict.set("Author", Value::LiteralString(author.clone().into_bytes()));
    }
    if let Some(subject) = &metadata.subject {
        dict.set("Subject", Value::LiteralString(subject.clone().into_bytes()));
    }
    if let Some(keywords) = &metadata.keywords {
        dict.set("Keywords", Value::LiteralString(keywords.clone().into_bytes()));
    }
    dict.set(
        "Creator",
        Value::LiteralString(metadata.creator.clone().unwrap_or_else(|| "pagecraft".to_string()).into_bytes()),
    );
    dict.set(
        "Producer",
        Value::LiteralString(metadata.producer.clone().unwrap_or_else(|| "pagecraft".to_string()).into_bytes()),
    );
    if let Some(created) = metadata.creation_date {
        dict.set("CreationDate", Value::LiteralString(pdf_date(&created).into_bytes()));
    }
    if let Some(modified) = metadata.mod_date {
        dict.set("ModDate", Value::LiteralString(pdf_date(&modified).into_bytes()));
    }
    dict
}

/// `D:YYYYMMDDHHmmSSZ`.
fn pdf_date(dt: &DateTime<Utc>) -> String {
    dt.format("D:%Y%m%d%H%M%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_binds_info_and_reserves_catalog() {
        let doc = Document::create(DocumentMetadata {
            title: Some("Report".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert!(doc.objects.resolve(doc.info_id).is_ok());
        assert!(doc.objects.resolve(doc.catalog_id).is_err());
    }

    #[test]
    fn add_page_rejects_degenerate_media_box() {
        let mut doc = Document::create(DocumentMetadata::default()).unwrap();
        assert!(matches!(
            doc.add_page((0.0, 0.0, 0.0, 792.0)),
            Err(PdfError::InvalidMediaBox)
        ));
    }

    #[test]
    fn mutation_after_save_is_rejected() {
        let mut doc = Document::create(DocumentMetadata::default()).unwrap();
        doc.add_page((0.0, 0.0, 612.0, 792.0)).unwrap();
        doc.save().unwrap();
        assert!(matches!(
            doc.add_page((0.0, 0.0, 612.0, 792.0)),
            Err(PdfError::AlreadyFrozen)
        ));
    }

    #[test]
    fn save_produces_a_pdf_header() {
        let mut doc = Document::create(DocumentMetadata::default()).unwrap();
        doc.add_page((0.0, 0.0, 612.0, 792.0)).unwrap();
        let bytes = doc.save().unwrap();
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(bytes.ends_with(b"%%EOF\n") || bytes.ends_with(b"%%EOF"));
    }

    #[test]
    fn id_seed_salt_changes_the_id_without_changing_anything_else() {
        let build = |salt: Option<Vec<u8>>| {
            let mut doc = Document::create(DocumentMetadata {
                creation_date: Some(DateTime::from_timestamp(0, 0).unwrap()),
                ..Default::default()
            })
            .unwrap()
            .with_config(DocumentConfig {
                id_seed_salt: salt,
                ..Default::default()
            });
            doc.add_page((0.0, 0.0, 612.0, 792.0)).unwrap();
            doc.save().unwrap()
        };

        let plain = build(None);
        let salted = build(Some(b"build-42".to_vec()));
        assert_ne!(plain, salted);
        assert_eq!(plain.len(), salted.len());
    }
}
