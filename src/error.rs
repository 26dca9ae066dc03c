use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    InvalidDocx(String),
    Xml(roxmltree::Error),
    Zip(zip::result::ZipError),
    /// A continuation paragraph was offered to a footnote with a different ordinal.
    FootnoteMergeConflict {
        page: u32,
        existing: usize,
        incoming: usize,
    },
    /// A continuation paragraph arrived before any footnote existed.
    OrphanedContinuation { page: u32, ordinal: usize },
    /// A `check` predicate failed in fail mode.
    CheckFailed { message: String, paragraph: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::InvalidDocx(msg) => write!(f, "Invalid DOCX: {msg}"),
            Error::Xml(e) => write!(f, "XML parse error: {e}"),
            Error::Zip(e) => write!(f, "ZIP error: {e}"),
            Error::FootnoteMergeConflict {
                page,
                existing,
                incoming,
            } => write!(
                f,
                "Merge conflict of footnotes on page {page}: ordinal {existing} + ordinal {incoming}"
            ),
            Error::OrphanedContinuation { page, ordinal } => write!(
                f,
                "Continuation on page {page} (ordinal {ordinal}) has no footnote to attach to"
            ),
            Error::CheckFailed { message, paragraph } => write!(f, "{message} (para {paragraph})"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Xml(e) => Some(e),
            Error::Zip(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::Xml(e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Zip(e)
    }
}
