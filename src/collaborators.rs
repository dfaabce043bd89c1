//! Pluggable collaborator traits the core never implements a default
//! for beyond what's explicitly optional: compression,
//! encryption, signing, and image decoding all live outside the core
//! so the crate doesn't have to vendor a deflate/crypto/image stack to
//! write a PDF that doesn't need one.

use crate::error::PdfError;
use crate::object::Dictionary;

/// Compresses a stream's raw bytes before it's written, applied to
/// content streams and embedded font programs.
pub trait Compressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, PdfError>;
    /// The `/Filter` name to record on the stream dictionary, e.g.
    /// `"FlateDecode"`.
    fn filter_name(&self) -> &'static str;
}

/// Encrypts every literal/hex string and stream payload in the document
/// (except the encryption dictionary itself and the `/ID` array) and
/// supplies the `/Encrypt` dictionary the serializer writes into the
/// trailer.
pub trait Encryptor {
    /// The security-handler algorithm name, e.g. `"RC4-128"` or
    /// `"AES-256"` — recorded for callers that need to report it, not
    /// written verbatim into the `/Encrypt` dictionary (that's
    /// `build_encrypt_dict`'s job).
    fn algorithm(&self) -> &'static str;
    /// The `/P` permissions bitmask.
    fn permissions(&self) -> i64;
    /// Encrypts one literal/hex string belonging to object
    /// `(object_number, generation)`.
    fn encrypt_string(&self, object_number: u32, generation: u16, data: &[u8]) -> Result<Vec<u8>, PdfError>;
    /// Encrypts one stream payload belonging to object
    /// `(object_number, generation)`.
    fn encrypt_stream(&self, object_number: u32, generation: u16, data: &[u8]) -> Result<Vec<u8>, PdfError>;
    /// Builds the `/Encrypt` dictionary (filter, key length, `/O`/`/U`
    /// strings, `/P`, etc.) bound as its own indirect object and
    /// referenced from the trailer.
    fn build_encrypt_dict(&self) -> Dictionary;
    /// Whether a key has actually been derived (e.g. from a supplied
    /// user/owner password) — `save` fails `EncryptionStateInvalid` if
    /// an `Encryptor` is attached but this is false.
    fn is_ready(&self) -> bool;
}

/// Produces a detached CMS signature over a byte range the serializer
/// computes around a reserved `/Contents` placeholder.
pub trait Signer {
    /// Signs the exact bytes the serializer brackets with `/ByteRange`
    /// (the whole file except the `/Contents` hex placeholder).
    fn sign(&self, bytes: &[u8]) -> Result<Vec<u8>, PdfError>;
    fn filter_name(&self) -> &'static str;
    fn sub_filter_name(&self) -> &'static str;
    /// Size, in bytes, of the `/Contents` hex-string placeholder
    /// reserved before the real signature is known. The real signature
    /// must fit within this many bytes; `save` fails `SigningError`
    /// otherwise. Defaults to 8192, per the spec's signing flow.
    fn contents_placeholder_len(&self) -> usize {
        8192
    }
}

/// Decodes an image into the raw sample data and metadata the
/// `XObject` image dictionary needs.
pub trait ImageDescriptor {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn bits_per_component(&self) -> u8;
    /// `"DeviceRGB"`, `"DeviceGray"`, or `"DeviceCMYK"`.
    fn color_space(&self) -> &'static str;
    fn samples(&self) -> &[u8];
    /// An optional pre-compressed filter already applied to `samples`
    /// (e.g. a JPEG decoder may hand back DCT-compressed bytes
    /// directly so the core doesn't have to re-encode them).
    fn filter_name(&self) -> Option<&'static str> {
        None
    }
    /// An optional soft mask supplying per-pixel alpha, embedded as its
    /// own image `XObject` and referenced via `/SMask` on this one.
    fn s_mask(&self) -> Option<&dyn ImageDescriptor> {
        None
    }
}

#[cfg(feature = "flate")]
pub use flate_adapter::FlateCompressor;

#[cfg(feature = "flate")]
mod flate_adapter {
    use super::Compressor;
    use crate::error::PdfError;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    /// The default `Compressor` when the `flate` feature is enabled —
    /// present as an optional dependency in the PDF-focused corpus for
    /// exactly this role: a default adapter, not a hard dependency of
    /// the core.
    pub struct FlateCompressor {
        level: Compression,
    }

    impl FlateCompressor {
        pub fn new() -> Self {
            FlateCompressor { level: Compression::default() }
        }
    }

    impl Default for FlateCompressor {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Compressor for FlateCompressor {
        fn compress(&self, data: &[u8]) -> Result<Vec<u8>, PdfError> {
            let mut encoder = ZlibEncoder::new(Vec::new(), self.level);
            encoder
                .write_all(data)
                .map_err(|e| PdfError::CompressionError(e.to_string()))?;
            encoder
                .finish()
                .map_err(|e| PdfError::CompressionError(e.to_string()))
        }

        fn filter_name(&self) -> &'static str {
            "FlateDecode"
        }
    }
}
