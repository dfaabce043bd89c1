//! A self-contained, byte-exact PDF authoring library.
//!
//! Callers build a [`Document`], add pages, draw into each page's
//! content stream directly (no intermediate layout model), embed fonts
//! and images, and call [`Document::save`] to get PDF bytes back.

pub mod annotations;
pub mod collaborators;
pub mod config;
pub mod content;
pub mod document;
pub mod error;
pub mod fonts;
pub mod formfields;
pub mod geometry;
pub mod object;
pub mod page;
pub mod resources;
mod serializer;

pub use config::DocumentConfig;
pub use document::{Document, DocumentMetadata};
pub use error::PdfError;
pub use page::Page;
