use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// A chart section was asked to render an empty dataset, or a pie chart
    /// was given an all-zero total. Caught at the orchestrator boundary
    /// before any drawing happens.
    InvalidDataset(String),
    /// A chart bitmap could not be encoded to, or decoded from, PNG.
    Encoding(String),
    /// Document construction produced an empty or malformed artifact.
    Assembly(String),
    Io(std::io::Error),
    Json(serde_json::Error),
    Zip(zip::result::ZipError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidDataset(section) => {
                write!(f, "invalid dataset for section '{section}'")
            }
            Error::Encoding(msg) => write!(f, "bitmap encoding failed: {msg}"),
            Error::Assembly(msg) => write!(f, "document assembly failed: {msg}"),
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::Json(e) => write!(f, "JSON error: {e}"),
            Error::Zip(e) => write!(f, "package error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Json(e) => Some(e),
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

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Json(e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Zip(e)
    }
}
