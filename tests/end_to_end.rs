//! End-to-end document construction, exercised against the public API
//! the way an application embedding this crate would use it.

use pagecraft::annotations::Annotation;
use pagecraft::collaborators::{Encryptor, ImageDescriptor, Signer};
use pagecraft::content::{show_wrapped, Alignment, Color};
use pagecraft::fonts::StandardFont;
use pagecraft::formfields::FormField;
use pagecraft::object::Dictionary;
use pagecraft::{Document, DocumentMetadata, PdfError};

const A4: (f64, f64, f64, f64) = (0.0, 0.0, 595.0, 842.0);

#[test]
fn empty_a4_page_saves_to_a_well_formed_pdf() {
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    doc.add_page(A4).unwrap();
    let bytes = doc.save().unwrap();

    assert!(bytes.starts_with(b"%PDF-1.7"));
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Type /Catalog"));
    assert!(text.contains("/Type /Page"));
    assert!(text.contains("595 842"));
    assert!(text.contains("xref\n"));
    assert!(text.contains("trailer\n"));
}

#[test]
fn hello_world_text_round_trips_through_the_content_stream() {
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    let font = doc.embed_standard_font(StandardFont::Helvetica).unwrap();

    let page = doc.add_page(A4).unwrap();
    let name = page.resources.add_font(font);

    page.content.begin_text().unwrap();
    page.content.set_font(&name, 24.0).unwrap();
    page.content.set_text_position(72.0, 770.0).unwrap();
    page.content.show_encoded(b"Hello, World!").unwrap();
    page.content.end_text().unwrap();

    let content_bytes = page.content.as_bytes().to_vec();
    let content_text = String::from_utf8_lossy(&content_bytes);
    assert!(content_text.contains("BT"));
    assert!(content_text.contains("Tf"));
    assert!(content_text.contains("(Hello, World!) Tj"));
    assert!(content_text.contains("ET"));

    let bytes = doc.save().unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/BaseFont /Helvetica"));
    assert!(text.contains("Hello, World!"));
}

#[test]
fn nested_save_restore_balances_and_rejects_extra_pops() {
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    let page = doc.add_page(A4).unwrap();

    page.content.save_state().unwrap();
    page.content.set_fill_color(Color::Rgb(1.0, 0.0, 0.0)).unwrap();
    page.content.save_state().unwrap();
    page.content.set_fill_color(Color::Rgb(0.0, 1.0, 0.0)).unwrap();
    page.content.rectangle(0.0, 0.0, 50.0, 50.0).unwrap();
    page.content.fill().unwrap();
    page.content.restore_state().unwrap();
    page.content.restore_state().unwrap();
    assert!(page.content.is_balanced());

    let extra_pop = page.content.restore_state();
    assert!(matches!(extra_pop, Err(PdfError::UnbalancedStack)));
}

#[test]
fn repeated_colors_are_not_re_emitted() {
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    let page = doc.add_page(A4).unwrap();

    page.content.set_fill_color(Color::Rgb(0.2, 0.4, 0.6)).unwrap();
    page.content.set_fill_color(Color::Rgb(0.2, 0.4, 0.6)).unwrap();
    page.content.rectangle(0.0, 0.0, 10.0, 10.0).unwrap();
    page.content.fill().unwrap();

    let text = String::from_utf8_lossy(page.content.as_bytes());
    assert_eq!(text.matches("rg").count(), 1);
}

#[test]
fn justified_paragraph_stretches_word_spacing_except_the_last_line() {
    fn char_width(s: &str) -> f64 {
        s.chars().count() as f64 * 6.0
    }

    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    let font = doc.embed_standard_font(StandardFont::Helvetica).unwrap();
    let page = doc.add_page(A4).unwrap();
    let name = page.resources.add_font(font);

    page.content.begin_text().unwrap();
    page.content.set_font(&name, 12.0).unwrap();

    let result = show_wrapped(
        &mut page.content,
        "the quick brown fox jumps over the lazy dog",
        72.0,
        700.0,
        120.0,
        14.0,
        Alignment::Justify,
        &char_width,
        &|s| s.as_bytes().to_vec(),
    )
    .unwrap();
    page.content.end_text().unwrap();

    assert!(result.line_count > 1);
    let text = String::from_utf8_lossy(page.content.as_bytes());
    // Every non-last line gets a nonzero Tw; the final line resets it to 0.
    let tw_values: Vec<&str> = text
        .split('\n')
        .filter(|line| line.ends_with(" Tw"))
        .collect();
    assert_eq!(tw_values.len(), result.line_count);
    assert!(tw_values[tw_values.len() - 1].starts_with("0 Tw"));
    assert!(!tw_values[0].starts_with("0 Tw"));
}

#[test]
fn embedding_the_same_standard_font_twice_produces_one_font_object() {
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    let a = doc.embed_standard_font(StandardFont::Helvetica).unwrap();
    let b = doc.embed_standard_font(StandardFont::Helvetica).unwrap();
    assert_eq!(a, b);

    let page_one = doc.add_page(A4).unwrap();
    page_one.resources.add_font(a);
    let page_two = doc.add_page(A4).unwrap();
    page_two.resources.add_font(b);

    let bytes = doc.save().unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert_eq!(text.matches("/BaseFont /Helvetica").count(), 1);
}

struct SolidImage {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

impl ImageDescriptor for SolidImage {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn bits_per_component(&self) -> u8 {
        8
    }

    fn color_space(&self) -> &'static str {
        "DeviceRGB"
    }

    fn samples(&self) -> &[u8] {
        &self.samples
    }
}

#[test]
fn an_embedded_image_is_drawn_through_a_named_xobject() {
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    let image = SolidImage {
        width: 2,
        height: 2,
        samples: vec![255; 2 * 2 * 3],
    };
    let image_id = doc.embed_image(&image).unwrap();

    let page = doc.add_page(A4).unwrap();
    let name = page.resources.add_image(image_id);

    page.content.save_state().unwrap();
    page.content.concat_matrix(pagecraft::geometry::matrix(100.0, 0.0, 0.0, 100.0, 50.0, 50.0)).unwrap();
    page.content.paint_xobject(&name).unwrap();
    page.content.restore_state().unwrap();

    let content_text = String::from_utf8_lossy(page.content.as_bytes());
    assert!(content_text.contains(&format!("/{} Do", name)));

    let bytes = doc.save().unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Subtype /Image"));
    assert!(text.contains("/ColorSpace /DeviceRGB"));
}

#[test]
fn form_fields_are_wired_into_annots_and_the_catalog_acroform() {
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    let page = doc.add_page(A4).unwrap();
    page.form_fields.push(FormField::Text {
        name: "full_name".to_string(),
        rect: (72.0, 700.0, 300.0, 720.0),
        value: String::new(),
        max_len: None,
    });

    let bytes = doc.save().unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/AcroForm"));
    assert!(text.contains("/FT /Tx"));
    assert!(text.contains("/Annots ["));
}

struct XorEncryptor {
    key: u8,
}

impl Encryptor for XorEncryptor {
    fn algorithm(&self) -> &'static str {
        "RC4-128"
    }

    fn permissions(&self) -> i64 {
        -4
    }

    fn encrypt_string(&self, _object_number: u32, _generation: u16, data: &[u8]) -> Result<Vec<u8>, PdfError> {
        Ok(data.iter().map(|b| b ^ self.key).collect())
    }

    fn encrypt_stream(&self, object_number: u32, generation: u16, data: &[u8]) -> Result<Vec<u8>, PdfError> {
        self.encrypt_string(object_number, generation, data)
    }

    fn build_encrypt_dict(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Filter", "Standard");
        dict.set("V", 2);
        dict.set("R", 3);
        dict
    }

    fn is_ready(&self) -> bool {
        true
    }
}

#[test]
fn attaching_an_encryptor_encrypts_strings_and_adds_the_encrypt_trailer_entry() {
    let marker = "SECRET-MARKER-VALUE";
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    let page = doc.add_page(A4).unwrap();
    page.annotations.push(Annotation::FreeText {
        rect: (0.0, 0.0, 100.0, 20.0),
        contents: marker.to_string(),
    });
    doc.set_encryptor(Box::new(XorEncryptor { key: 0x5A })).unwrap();

    let bytes = doc.save().unwrap();
    let text = String::from_utf8_lossy(&bytes);

    assert!(!text.contains(marker));
    assert!(text.contains("/Encrypt "));

    let encrypted: Vec<u8> = marker.bytes().map(|b| b ^ 0x5A).collect();
    assert!(bytes.windows(encrypted.len()).any(|w| w == encrypted.as_slice()));
}

struct RecordingSigner {
    signature: Vec<u8>,
    seen: std::rc::Rc<std::cell::RefCell<Option<Vec<u8>>>>,
}

impl Signer for RecordingSigner {
    fn sign(&self, bytes: &[u8]) -> Result<Vec<u8>, PdfError> {
        *self.seen.borrow_mut() = Some(bytes.to_vec());
        Ok(self.signature.clone())
    }

    fn filter_name(&self) -> &'static str {
        "Adobe.PPKLite"
    }

    fn sub_filter_name(&self) -> &'static str {
        "adbe.pkcs7.detached"
    }

    fn contents_placeholder_len(&self) -> usize {
        16
    }
}

#[test]
fn signing_brackets_the_byte_range_around_the_contents_placeholder() {
    let mut doc = Document::create(DocumentMetadata::default()).unwrap();
    doc.add_page(A4).unwrap();

    let seen = std::rc::Rc::new(std::cell::RefCell::new(None));
    doc.set_signer(Box::new(RecordingSigner { signature: b"sig-bytes".to_vec(), seen: seen.clone() }))
        .unwrap();

    let bytes = doc.save().unwrap();
    let text = String::from_utf8_lossy(&bytes);
    assert!(text.contains("/Type /Sig"));

    let br_start = text.find("/ByteRange [").unwrap() + "/ByteRange [".len();
    let br_end = text[br_start..].find(']').unwrap() + br_start;
    let numbers: Vec<i64> = text[br_start..br_end]
        .split_whitespace()
        .map(|n| n.parse().unwrap())
        .collect();
    assert_eq!(numbers.len(), 4);
    let (start0, len0, start1, len1) = (numbers[0], numbers[1], numbers[2], numbers[3]);
    assert_eq!(start0, 0);
    assert_eq!(start1 + len1, bytes.len() as i64);

    let signed = seen.borrow().clone().unwrap();
    let mut expected = Vec::new();
    expected.extend_from_slice(&bytes[start0 as usize..(start0 + len0) as usize]);
    expected.extend_from_slice(&bytes[start1 as usize..(start1 + len1) as usize]);
    assert_eq!(signed, expected);

    let hex_sig: String = b"sig-bytes".iter().map(|b| format!("{:02X}", b)).collect();
    assert!(text.contains(&hex_sig));
}
