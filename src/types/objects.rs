use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::DocId;

/// Object detector features of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectFeatures {
    #[serde(rename = "_id")]
    pub id: DocId,
    #[serde(default)]
    pub object_features: Vec<Vec<f32>>,
}

impl ObjectFeatures {
    pub fn new(id: DocId, object_features: Vec<Vec<f32>>) -> Self {
        Self {
            id,
            object_features,
        }
    }
}
