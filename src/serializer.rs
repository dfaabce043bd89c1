//! Turns a fully-bound [`ObjectTable`] into PDF bytes: header, body,
//! cross-reference section (classic table or xref-stream), trailer,
//! and an optional linearization pass.
//!
//! The classic-table path uses a byte-counting writer that records each
//! object's offset as it's emitted, then lays out the exact
//! `xref`/`trailer`/`startxref`/`%%EOF` footer with zero-padded
//! 10-digit offsets. The xref-stream alternative and linearization both
//! need to know object sizes before their references can be written, so
//! they render once into a scratch buffer to learn sizes, then run the
//! real emission a second time.

use crate::collaborators::{Encryptor, Signer};
use crate::config::DocumentConfig;
use crate::error::PdfError;
use crate::object::{write_name, Dictionary, ObjectId, ObjectTable, Value};
use sha2::{Digest, Sha256};

/// Fixed-width placeholder for a signature object's `/ByteRange` array:
/// four 10-digit zero-padded integers joined by single spaces. Reserved
/// up front and patched in place once the real offsets are known, so
/// patching never changes the file's length (see `apply_signature`).
const BYTE_RANGE_PLACEHOLDER: &str = "0000000000 0000000000 0000000000 0000000000";

/// Byte positions of a reserved signature object's `/ByteRange` and
/// `/Contents` fields within the final rendered buffer, recorded during
/// `render` so `apply_signature` can patch them after the fact.
#[derive(Clone, Copy)]
struct SigLayout {
    byte_range_offset: usize,
    contents_hex_offset: usize,
    contents_len: usize,
}

pub struct Serializer<'a> {
    config: &'a DocumentConfig,
    catalog_id: ObjectId,
    info_id: ObjectId,
    id_seed: Vec<u8>,
    encrypt: Option<(ObjectId, &'a dyn Encryptor)>,
    signer: Option<&'a dyn Signer>,
}

impl<'a> Serializer<'a> {
    pub fn new(
        config: &'a DocumentConfig,
        catalog_id: ObjectId,
        info_id: ObjectId,
        id_seed: Vec<u8>,
        encrypt: Option<(ObjectId, &'a dyn Encryptor)>,
        signer: Option<&'a dyn Signer>,
    ) -> Self {
        Serializer { config, catalog_id, info_id, id_seed, encrypt, signer }
    }

    pub fn serialize(&self, objects: &mut ObjectTable) -> Result<Vec<u8>, PdfError> {
        // Reserved once up front (not inside `render`) so linearization's
        // two render passes share the same id instead of each allocating
        // their own — the first pass's slot would otherwise be bound but
        // never referenced by the final xref.
        let sig_id = self.signer.map(|_| objects.put(Value::Null));

        let (mut bytes, sig_layout) = if self.config.linearize {
            self.serialize_linearized(objects, sig_id)?
        } else {
            self.render(objects, None, sig_id)?
        };

        if let (Some(signer), Some(layout)) = (self.signer, sig_layout) {
            self.apply_signature(&mut bytes, signer, layout)?;
        }

        Ok(bytes)
    }

    /// Two-pass linearization: pass one renders in
    /// plain object-number order to learn the file's size and the
    /// first page's byte offset; pass two prepends a `/Linearized`
    /// parameter dictionary (a new object, placed first in physical
    /// order without renumbering anything) built from those numbers,
    /// then renders again. Only pass two's layout matters for signing —
    /// pass one's output is discarded.
    fn serialize_linearized(
        &self,
        objects: &mut ObjectTable,
        sig_id: Option<ObjectId>,
    ) -> Result<(Vec<u8>, Option<SigLayout>), PdfError> {
        let pass_one_len = self.render(objects, None, sig_id)?.0.len() as i64;
        let first_page_id = first_page_object(objects)?;
        let first_page_offset = objects.byte_offset(first_page_id).unwrap_or(0);

        let mut lin_dict = Dictionary::new();
        lin_dict.set("Linearized", Value::Real(1.0));
        lin_dict.set("O", Value::Integer(first_page_id.number as i64));
        lin_dict.set("N", Value::Integer(page_count(objects) as i64));
        // Best-effort estimate: the true final length depends on this
        // dictionary's own serialized size, which is small and fixed
        // enough relative to typical documents that a single
        // refinement pass is sufficient in practice.
        lin_dict.set("L", Value::Integer(pass_one_len + 128));
        lin_dict.set("E", Value::Integer(first_page_offset as i64));
        lin_dict.set("H", Value::Array(vec![Value::Integer(0), Value::Integer(0)]));
        lin_dict.set("T", Value::Integer(pass_one_len));

        let lin_id = objects.put(Value::Dict(lin_dict));
        self.render(objects, Some(lin_id), sig_id)
    }

    fn render(
        &self,
        objects: &mut ObjectTable,
        emit_first: Option<ObjectId>,
        sig_id: Option<ObjectId>,
    ) -> Result<(Vec<u8>, Option<SigLayout>), PdfError> {
        let mut buf: Vec<u8> = Vec::new();
        let major = self.config.pdf_version.0;
        let minor = self.config.pdf_version.1;
        buf.extend_from_slice(format!("%PDF-{}.{}\n", major, minor).as_bytes());
        buf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

        let mut order: Vec<ObjectId> = objects.iter_in_number_order().map(|(id, _)| id).collect();
        if let Some(first) = emit_first {
            order.retain(|id| *id != first);
            order.insert(0, first);
        }

        let mut sig_layout = None;

        for id in &order {
            objects.set_byte_offset(*id, buf.len() as u64);

            if Some(*id) == sig_id {
                let signer = self.signer.expect("sig_id is only set when a signer is attached");
                sig_layout = Some(self.write_signature_placeholder(&mut buf, *id, signer));
                continue;
            }

            buf.extend_from_slice(format!("{} {} obj\n", id.number, id.generation).as_bytes());
            let value = objects.resolve(*id)?;
            match &self.encrypt {
                Some((encrypt_id, encryptor)) if *encrypt_id != *id => {
                    encrypt_value(value, *encryptor, id.number, id.generation)?.write(&mut buf)?;
                }
                _ => value.write(&mut buf)?,
            }
            buf.extend_from_slice(b"\nendobj\n");
        }

        let id_hash = document_id_hash(&self.id_seed);

        if self.config.prefer_xref_stream {
            self.write_xref_stream(&mut buf, objects, &order, &id_hash)?;
        } else {
            self.write_classic_xref(&mut buf, objects, &id_hash)?;
        }

        Ok((buf, sig_layout))
    }

    /// Hand-writes a `/Sig` object's bytes directly, bypassing the
    /// generic `Value` writer, because `/ByteRange` needs a
    /// fixed-width placeholder that gets patched in place afterward
    /// without shifting anything that follows it (`apply_signature`).
    fn write_signature_placeholder(&self, buf: &mut Vec<u8>, id: ObjectId, signer: &dyn Signer) -> SigLayout {
        buf.extend_from_slice(format!("{} {} obj\n", id.number, id.generation).as_bytes());
        buf.extend_from_slice(b"<< /Type /Sig /Filter ");
        write_name(buf, signer.filter_name()).expect("writing to a Vec<u8> never fails");
        buf.extend_from_slice(b" /SubFilter ");
        write_name(buf, signer.sub_filter_name()).expect("writing to a Vec<u8> never fails");
        buf.extend_from_slice(b" /ByteRange [");
        let byte_range_offset = buf.len();
        buf.extend_from_slice(BYTE_RANGE_PLACEHOLDER.as_bytes());
        buf.extend_from_slice(b"] /Contents <");
        let contents_hex_offset = buf.len();
        let contents_len = signer.contents_placeholder_len();
        buf.extend(std::iter::repeat(b'0').take(contents_len * 2));
        buf.extend_from_slice(b"> >>\nendobj\n");
        SigLayout { byte_range_offset, contents_hex_offset, contents_len }
    }

    /// Patches the real `/ByteRange` offsets into the placeholder
    /// reserved by `write_signature_placeholder`, signs the bracketed
    /// bytes (everything except the `/Contents` hex digits), and
    /// splices the hex-encoded signature into the placeholder. Both
    /// patches overwrite existing bytes in place — the file's length
    /// never changes after this runs.
    fn apply_signature(&self, buf: &mut Vec<u8>, signer: &dyn Signer, layout: SigLayout) -> Result<(), PdfError> {
        let contents_digits = layout.contents_len * 2;
        let first_len = layout.contents_hex_offset;
        let second_start = layout.contents_hex_offset + contents_digits;
        let second_len = buf.len() - second_start;

        let byte_range_text = format!("{:010} {:010} {:010} {:010}", 0, first_len, second_start, second_len);
        debug_assert_eq!(byte_range_text.len(), BYTE_RANGE_PLACEHOLDER.len());
        buf[layout.byte_range_offset..layout.byte_range_offset + byte_range_text.len()]
            .copy_from_slice(byte_range_text.as_bytes());

        let mut message = Vec::with_capacity(first_len + second_len);
        message.extend_from_slice(&buf[..first_len]);
        message.extend_from_slice(&buf[second_start..]);

        let signature = signer.sign(&message)?;
        if signature.len() > layout.contents_len {
            return Err(PdfError::SigningError(format!(
                "signature is {} bytes, which exceeds the {}-byte /Contents placeholder",
                signature.len(),
                layout.contents_len
            )));
        }
        let hex = hex_upper(&signature);
        buf[layout.contents_hex_offset..layout.contents_hex_offset + hex.len()].copy_from_slice(hex.as_bytes());
        Ok(())
    }

    fn write_classic_xref(
        &self,
        buf: &mut Vec<u8>,
        objects: &ObjectTable,
        id_hash: &[u8; 32],
    ) -> Result<(), PdfError> {
        let xref_offset = buf.len() as u64;
        let count = objects.len() + 1;
        buf.extend_from_slice(format!("xref\n0 {}\n", count).as_bytes());
        buf.extend_from_slice(b"0000000000 65535 f \n");
        for (id, _) in objects.iter_in_number_order() {
            let offset = objects.byte_offset(id).unwrap_or(0);
            buf.extend_from_slice(format!("{:010} {:05} n \n", offset, id.generation).as_bytes());
        }

        buf.extend_from_slice(b"trailer\n");
        let mut trailer = Dictionary::new();
        trailer.set("Size", Value::Integer(count as i64));
        trailer.set("Root", self.catalog_id.to_ref());
        trailer.set("Info", self.info_id.to_ref());
        if let Some((encrypt_id, _)) = &self.encrypt {
            trailer.set("Encrypt", encrypt_id.to_ref());
        }
        trailer.set("ID", id_array(id_hash));
        trailer.write(buf)?;
        buf.push(b'\n');

        buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref_offset).as_bytes());
        Ok(())
    }

    /// Writes a PDF-2.0-style cross-reference stream instead of the
    /// classic table: one compact binary stream object
    /// carries both the offsets and the trailer keys.
    fn write_xref_stream(
        &self,
        buf: &mut Vec<u8>,
        objects: &ObjectTable,
        emitted_order: &[ObjectId],
        id_hash: &[u8; 32],
    ) -> Result<(), PdfError> {
        let xref_object_number = objects.len() as u32 + 2;
        let xref_offset = buf.len() as u64;

        let mut rows: Vec<u8> = Vec::with_capacity((emitted_order.len() + 1) * 6);
        // Object 0: the free-list head, type 0, next free 0, generation 65535.
        rows.extend_from_slice(&[0u8]);
        rows.extend_from_slice(&0u32.to_be_bytes());
        rows.extend_from_slice(&65535u16.to_be_bytes()[1..]);

        for (id, _) in objects.iter_in_number_order() {
            let offset = objects.byte_offset(id).unwrap_or(0);
            rows.push(1);
            rows.extend_from_slice(&(offset as u32).to_be_bytes());
            rows.push(id.generation as u8);
        }

        let mut dict = Dictionary::new();
        dict.set("Type", "XRef");
        dict.set("Size", Value::Integer(objects.len() as i64 + 1));
        dict.set("W", Value::Array(vec![Value::Integer(1), Value::Integer(4), Value::Integer(1)]));
        dict.set("Index", Value::Array(vec![Value::Integer(0), Value::Integer(objects.len() as i64 + 1)]));
        dict.set("Root", self.catalog_id.to_ref());
        dict.set("Info", self.info_id.to_ref());
        if let Some((encrypt_id, _)) = &self.encrypt {
            dict.set("Encrypt", encrypt_id.to_ref());
        }
        dict.set("ID", id_array(id_hash));

        buf.extend_from_slice(format!("{} 0 obj\n", xref_object_number).as_bytes());
        Value::Stream(dict, rows).write(buf)?;
        buf.extend_from_slice(b"\nendobj\n");

        buf.extend_from_slice(format!("startxref\n{}\n%%EOF", xref_offset).as_bytes());
        Ok(())
    }
}

/// Recursively walks a `Value`, encrypting every literal/hex string and
/// stream payload it finds via `encryptor`. Arrays and dicts are walked
/// structurally; every other variant passes through unchanged.
fn encrypt_value(value: &Value, encryptor: &dyn Encryptor, number: u32, generation: u16) -> Result<Value, PdfError> {
    Ok(match value {
        Value::LiteralString(bytes) => {
            Value::LiteralString(encryptor.encrypt_string(number, generation, bytes)?)
        }
        Value::HexString(bytes) => Value::HexString(encryptor.encrypt_string(number, generation, bytes)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| encrypt_value(v, encryptor, number, generation))
                .collect::<Result<_, _>>()?,
        ),
        Value::Dict(dict) => Value::Dict(encrypt_dict(dict, encryptor, number, generation)?),
        Value::Stream(dict, bytes) => Value::Stream(
            encrypt_dict(dict, encryptor, number, generation)?,
            encryptor.encrypt_stream(number, generation, bytes)?,
        ),
        other => other.clone(),
    })
}

fn encrypt_dict(dict: &Dictionary, encryptor: &dyn Encryptor, number: u32, generation: u16) -> Result<Dictionary, PdfError> {
    let mut out = Dictionary::new();
    for (key, value) in dict.iter() {
        out.set(key.clone(), encrypt_value(value, encryptor, number, generation)?);
    }
    Ok(out)
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

fn hex_upper(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        s.push(HEX_DIGITS[(byte >> 4) as usize] as char);
        s.push(HEX_DIGITS[(byte & 0x0F) as usize] as char);
    }
    s
}

fn id_array(hash: &[u8; 32]) -> Value {
    let half = &hash[..16];
    Value::Array(vec![
        Value::HexString(half.to_vec()),
        Value::HexString(half.to_vec()),
    ])
}

/// Deterministic `/ID` derivation: a digest of the metadata/page-count/
/// first-MediaBox seed the caller provides, not of any wall-clock or
/// random input, so saving the same document twice produces
/// byte-identical output.
fn document_id_hash(seed: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.finalize().into()
}

fn first_page_object(objects: &ObjectTable) -> Result<ObjectId, PdfError> {
    objects
        .iter_in_number_order()
        .find(|(_, value)| is_page_dict(value))
        .map(|(id, _)| id)
        .ok_or(PdfError::InvalidMediaBox)
}

fn page_count(objects: &ObjectTable) -> usize {
    objects.iter_in_number_order().filter(|(_, v)| is_page_dict(v)).count()
}

fn is_page_dict(value: &Value) -> bool {
    matches!(value, Value::Dict(d) if d.get("Type") == Some(&Value::Name("Page".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, DocumentMetadata};

    #[test]
    fn classic_xref_has_the_right_subsection_count() {
        let mut doc = Document::create(DocumentMetadata::default()).unwrap();
        doc.add_page((0.0, 0.0, 612.0, 792.0)).unwrap();
        let bytes = doc.save().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("xref\n"));
        assert!(text.contains("trailer\n"));
        assert!(text.contains("startxref\n"));
    }

    #[test]
    fn saving_twice_is_deterministic() {
        let mut a = Document::create(DocumentMetadata {
            creation_date: Some(chrono::DateTime::from_timestamp(0, 0).unwrap()),
            ..Default::default()
        })
        .unwrap();
        a.add_page((0.0, 0.0, 612.0, 792.0)).unwrap();
        let bytes_a = a.save().unwrap();

        let mut b = Document::create(DocumentMetadata {
            creation_date: Some(chrono::DateTime::from_timestamp(0, 0).unwrap()),
            ..Default::default()
        })
        .unwrap();
        b.add_page((0.0, 0.0, 612.0, 792.0)).unwrap();
        let bytes_b = b.save().unwrap();

        assert_eq!(bytes_a, bytes_b);
    }
}
