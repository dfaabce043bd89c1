use crate::object::ObjectId;
use thiserror::Error;

/// The error taxonomy for the crate.
///
/// Per-call operations fail fast and leave the document unchanged; `save`
/// is all-or-nothing. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("number {0} is not finite (NaN/∞ cannot be encoded)")]
    InvalidNumber(String),

    #[error("name {0:?} is empty or exceeds 127 bytes")]
    InvalidName(String),

    #[error("Q without a matching q")]
    UnbalancedStack,

    #[error("path-construction or paint operator used between BT and ET")]
    TextModeViolation,

    #[error("paint operator used with no current path")]
    PathStateViolation,

    #[error("show_text called before set_font in the current text object")]
    MissingFont,

    #[error("object {0:?} was referenced but never bound")]
    DanglingRef(ObjectId),

    #[error("object {0:?} is already bound")]
    AlreadyBound(ObjectId),

    #[error("compression failed: {0}")]
    CompressionError(String),

    #[error("encryption failed: {0}")]
    EncryptionError(String),

    #[error("an encryptor is attached but no key was ever derived")]
    EncryptionStateInvalid,

    #[error("signing failed: {0}")]
    SigningError(String),

    #[error("media box must have positive width and height")]
    InvalidMediaBox,

    #[error("mutation attempted after save() began freezing the document")]
    AlreadyFrozen,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
