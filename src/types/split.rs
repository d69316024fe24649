use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{DocId, ImageIndex, SplitName};

/// Face detections of the split's image, ordered by face prominence (largest first).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FacenetDetails {
    #[serde(default)]
    pub n_faces: usize,
    #[serde(default)]
    pub embeddings: Vec<Vec<f32>>,
    #[serde(default)]
    pub detect_probs: Vec<f32>,
}

/// One (article, image) pairing assigned to a partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Split {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<DocId>,
    pub image_index: ImageIndex,
    pub split: SplitName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facenet_details: Option<FacenetDetails>,
    /// Fields not read by this crate (`caption`, `source`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Split {
    pub fn new(id: DocId, article_id: DocId, image_index: usize, split: SplitName) -> Self {
        Self {
            id,
            article_id: Some(article_id),
            image_index: ImageIndex::Position(image_index),
            split,
            facenet_details: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_faces(mut self, details: FacenetDetails) -> Self {
        self.facenet_details = Some(details);
        self
    }
}

/// Id-only view of a split, returned by id listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitKey {
    #[serde(rename = "_id")]
    pub id: DocId,
}
