//! Identifiers shared by the collections.
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Document identifier.
///
/// Collections use either integer ids (VisualNews, after cleanup)
/// or string ids (GoodNews, `"<article>_<image>"` split ids).
/// Ordering puts integers before strings, like the document store does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum DocId {
    Int(i64),
    Str(String),
}

impl DocId {
    /// Integer id of a `"<n>_0"` split id.
    ///
    /// Integer ids are returned as is, any other string gives [None].
    pub fn without_image_suffix(&self) -> Option<i64> {
        match self {
            DocId::Int(i) => Some(*i),
            DocId::Str(s) => s.strip_suffix("_0").and_then(|s| s.parse().ok()),
        }
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Int(i) => write!(f, "{i}"),
            DocId::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for DocId {
    fn from(i: i64) -> Self {
        DocId::Int(i)
    }
}

impl From<&str> for DocId {
    fn from(s: &str) -> Self {
        DocId::Str(s.to_string())
    }
}

impl From<String> for DocId {
    fn from(s: String) -> Self {
        DocId::Str(s)
    }
}

/// Dataset partition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SplitName {
    Train,
    Val,
    Test,
}

impl SplitName {
    pub const ALL: [SplitName; 3] = [SplitName::Train, SplitName::Val, SplitName::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            SplitName::Train => "train",
            SplitName::Val => "val",
            SplitName::Test => "test",
        }
    }
}

impl FromStr for SplitName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "train" => Ok(SplitName::Train),
            "val" => Ok(SplitName::Val),
            "test" => Ok(SplitName::Test),
            other => Err(Error::UnknownSplit(other.to_string())),
        }
    }
}

impl fmt::Display for SplitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of an image inside its article.
///
/// Stored either as a number or as the string key of the `images` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ImageIndex {
    Position(usize),
    Key(String),
}

impl ImageIndex {
    /// Key in the article's `images` mapping.
    pub fn key(&self) -> Cow<'_, str> {
        match self {
            ImageIndex::Position(p) => Cow::Owned(p.to_string()),
            ImageIndex::Key(k) => Cow::Borrowed(k),
        }
    }

    /// Position in per-image lists.
    pub fn position(&self) -> Option<usize> {
        match self {
            ImageIndex::Position(p) => Some(*p),
            ImageIndex::Key(k) => k.parse().ok(),
        }
    }
}

impl fmt::Display for ImageIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_docid_untagged() {
        let int: DocId = serde_json::from_str("7").unwrap();
        let s: DocId = serde_json::from_str(r#""7_0""#).unwrap();
        assert_eq!(int, DocId::Int(7));
        assert_eq!(s, DocId::from("7_0"));
        assert_eq!(serde_json::to_string(&s).unwrap(), r#""7_0""#);
    }

    #[test]
    fn test_docid_order() {
        let mut ids = vec![
            DocId::from("b"),
            DocId::Int(10),
            DocId::from("a"),
            DocId::Int(2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                DocId::Int(2),
                DocId::Int(10),
                DocId::from("a"),
                DocId::from("b")
            ]
        );
    }

    #[test]
    fn test_image_suffix() {
        assert_eq!(DocId::from("1234_0").without_image_suffix(), Some(1234));
        assert_eq!(DocId::Int(42).without_image_suffix(), Some(42));
        assert_eq!(DocId::from("abc_0").without_image_suffix(), None);
        assert_eq!(DocId::from("1234_1").without_image_suffix(), None);
    }

    #[test]
    fn test_split_name() {
        assert_eq!("val".parse::<SplitName>().unwrap(), SplitName::Val);
        assert!(matches!(
            "valid".parse::<SplitName>(),
            Err(Error::UnknownSplit(s)) if s == "valid"
        ));
        let name: SplitName = serde_json::from_str(r#""train""#).unwrap();
        assert_eq!(name, SplitName::Train);
    }

    #[test]
    fn test_image_index() {
        let pos: ImageIndex = serde_json::from_str("3").unwrap();
        let key: ImageIndex = serde_json::from_str(r#""3""#).unwrap();
        assert_eq!(pos.key(), "3");
        assert_eq!(key.position(), Some(3));
        assert_eq!(ImageIndex::Key("x".to_string()).position(), None);
    }
}
