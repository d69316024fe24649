//! Reader configuration.
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{Article, ArticleProjection, DocId, Split, SplitName};

/// Text field holding the abstract-prefixed context.
pub const ABSTRACT_KEY: &str = "context_abstract";

/// Layout of the corpus in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Articles referenced by `split.article_id`, images named after the split id.
    #[default]
    GoodNews,
    /// One image per article: articles share the split id and carry their image path.
    VisualNews,
}

impl DatasetKind {
    /// Id of the article owning `split`.
    pub fn article_id(&self, split: &Split) -> Option<DocId> {
        match self {
            DatasetKind::GoodNews => split.article_id.clone(),
            DatasetKind::VisualNews => Some(split.id.clone()),
        }
    }

    /// Id of the object features of `split`.
    pub fn objects_id(&self, split: &Split) -> Option<DocId> {
        match self {
            DatasetKind::GoodNews => Some(split.id.clone()),
            DatasetKind::VisualNews => split.id.without_image_suffix().map(DocId::Int),
        }
    }

    /// Location of the image of `split`.
    pub fn image_path(&self, image_dir: &Path, split: &Split, article: &Article) -> Option<PathBuf> {
        match self {
            DatasetKind::GoodNews => Some(image_dir.join(format!("{}.jpg", split.id))),
            DatasetKind::VisualNews => article.image_path().map(|p| image_dir.join(p)),
        }
    }

    /// Article fields needed to locate an image.
    pub fn image_fields(&self) -> &'static [&'static str] {
        match self {
            DatasetKind::GoodNews => &[],
            DatasetKind::VisualNews => &["image_path"],
        }
    }
}

impl FromStr for DatasetKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "goodnews" => Ok(DatasetKind::GoodNews),
            "visualnews" => Ok(DatasetKind::VisualNews),
            other => Err(Error::Custom(format!("unknown dataset: {other}"))),
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::GoodNews => f.write_str("goodnews"),
            DatasetKind::VisualNews => f.write_str("visualnews"),
        }
    }
}

/// Reader settings. Missing keys take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub dataset: DatasetKind,
    pub image_dir: PathBuf,
    /// Cap on the `val` split. 0 means no cap.
    pub eval_limit: usize,
    /// Keep as many faces as there are person names in the caption.
    pub use_caption_names: bool,
    pub use_objects: bool,
    /// Fixed number of faces, overrides `use_caption_names`.
    pub n_faces: Option<usize>,
    /// Text field used as context. Its annotations are read from `<context_key>_ner`.
    pub context_key: String,
    /// Skip articles without an abstract-prefixed context.
    pub with_abstract: bool,
    /// Prefix the context with the sorted names.
    pub with_ner: bool,
    /// Only keep PERSON, ORG and GPE names from the context.
    pub restrict_entities: bool,
    /// Maximum number of space separated tokens of the context.
    pub max_end: usize,
    pub seed: u64,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetKind::default(),
            image_dir: PathBuf::from("images"),
            eval_limit: 5120,
            use_caption_names: true,
            use_objects: false,
            n_faces: None,
            context_key: "context".to_string(),
            with_abstract: false,
            with_ner: false,
            restrict_entities: true,
            max_end: 500,
            seed: 1234,
        }
    }
}

impl ReaderConfig {
    /// Load a JSON configuration file.
    pub fn from_path(src: &Path) -> Result<Self, Error> {
        let handle = File::open(src)?;
        Ok(serde_json::from_reader(handle)?)
    }

    /// Fields fetched for each article.
    pub fn projection(&self) -> ArticleProjection {
        let mut fields = vec![
            "_id".to_string(),
            self.context_key.clone(),
            "images".to_string(),
            "web_url".to_string(),
            "caption_ner".to_string(),
            format!("{}_ner", self.context_key),
        ];
        if self.with_abstract {
            fields.push(ABSTRACT_KEY.to_string());
        }
        fields.extend(self.dataset.image_fields().iter().map(|f| f.to_string()));
        ArticleProjection::new(fields)
    }

    /// Id listing cap for `split`.
    pub fn limit_for(&self, split: SplitName) -> Option<usize> {
        match split {
            SplitName::Val if self.eval_limit > 0 => Some(self.eval_limit),
            _ => None,
        }
    }
}
