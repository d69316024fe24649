//! Error enum
use crate::types::DocId;

#[derive(Debug)]
#[allow(dead_code)]
pub enum Error {
    Io(std::io::Error),
    Serde(serde_json::Error),
    Image(image::ImageError),
    /// Split name outside of `train`, `val` and `test`.
    UnknownSplit(String),
    /// A write would exceed the maximum document size of the store.
    DocumentTooLarge { id: DocId, size: usize },
    /// Keys present in both the keep and drop lists of a cleanup.
    OverlappingKeys(Vec<String>),
    Annotator(String),
    Detector(String),
    #[cfg(feature = "mongo")]
    Mongo(mongodb::error::Error),
    Custom(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "io error: {e}"),
            Error::Serde(e) => write!(f, "serialization error: {e}"),
            Error::Image(e) => write!(f, "image error: {e}"),
            Error::UnknownSplit(s) => write!(f, "Unknown split: {s}"),
            Error::DocumentTooLarge { id, size } => {
                write!(f, "Document too large: {id} ({size} bytes)")
            }
            Error::OverlappingKeys(keys) => {
                write!(f, "keys both kept and dropped: {}", keys.join(", "))
            }
            Error::Annotator(e) => write!(f, "annotator error: {e}"),
            Error::Detector(e) => write!(f, "detector error: {e}"),
            #[cfg(feature = "mongo")]
            Error::Mongo(e) => write!(f, "mongodb error: {e}"),
            Error::Custom(s) => write!(f, "{s}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Serde(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Error {
        Error::Image(e)
    }
}

#[cfg(feature = "mongo")]
impl From<mongodb::error::Error> for Error {
    fn from(e: mongodb::error::Error) -> Error {
        Error::Mongo(e)
    }
}

#[cfg(feature = "mongo")]
impl From<mongodb::bson::ser::Error> for Error {
    fn from(e: mongodb::bson::ser::Error) -> Error {
        Error::Custom(format!("bson serialization: {e}"))
    }
}

impl From<String> for Error {
    fn from(s: String) -> Error {
        Error::Custom(s)
    }
}
