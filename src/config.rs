//! Document-wide configuration, passed in as an explicit record rather
//! than read from global state or a config-file crate.

/// PDF version written into the header comment, e.g. `(1, 7)` for
/// `%PDF-1.7`.
pub type PdfVersion = (u8, u8);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    pub pdf_version: PdfVersion,
    /// Emit a cross-reference stream instead of the classic xref table.
    pub prefer_xref_stream: bool,
    /// Run the two-pass linearization scratch-buffer technique before
    /// the final write.
    pub linearize: bool,
    /// Extra bytes mixed into the `/ID` seed alongside the metadata/
    /// page-count/MediaBox fields `Document` always includes, letting a
    /// host fold in its own notion of document identity (e.g. a build
    /// number) without disturbing the deterministic, content-only
    /// default.
    pub id_seed_salt: Option<Vec<u8>>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            pdf_version: (1, 7),
            prefer_xref_stream: false,
            linearize: false,
            id_seed_salt: None,
        }
    }
}
