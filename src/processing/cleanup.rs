/*! Schema cleanup of a store directory.

Works on raw documents so that fields unknown to the typed records survive:

1. `"<n>_0"` ids of splits and articles become the integer `n`,
2. the drop keys are removed from every split.

Key lists are checked for overlap before anything is read.
!*/
use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::store::{write_jsonl, JsonLines, ARTICLES_FILE, OBJECTS_FILE, SPLITS_FILE};
use crate::types::DocId;

/// A raw stored document.
pub type RawDocument = Map<String, Value>;

const DROP_KEYS: [&str; 14] = [
    "article_path",
    "caption",
    "id",
    "image_path",
    "images",
    "source",
    "topic",
    "article",
    "caption_ner",
    "caption_parts_of_speech",
    "context",
    "context_ner",
    "context_parts_of_speech",
    "language",
];

const KEEP_KEYS: [&str; 5] = ["_id", "article_id", "image_index", "split", "facenet_details"];

/// Keys kept on and removed from split documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCleanup {
    keep: Vec<String>,
    drop: Vec<String>,
}

impl Default for KeyCleanup {
    fn default() -> Self {
        Self {
            keep: KEEP_KEYS.iter().map(|k| k.to_string()).collect(),
            drop: DROP_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeyCleanup {
    /// Fails with [Error::OverlappingKeys] if a key is both kept and dropped.
    pub fn new(keep: Vec<String>, drop: Vec<String>) -> Result<Self, Error> {
        let keep_set: HashSet<&String> = keep.iter().collect();
        let mut overlap: Vec<String> = drop
            .iter()
            .filter(|k| keep_set.contains(k))
            .cloned()
            .collect();
        if !overlap.is_empty() {
            overlap.sort();
            overlap.dedup();
            return Err(Error::OverlappingKeys(overlap));
        }
        Ok(Self { keep, drop })
    }

    pub fn keep_keys(&self) -> &[String] {
        &self.keep
    }

    pub fn drop_keys(&self) -> &[String] {
        &self.drop
    }

    /// Remove the drop keys from `doc`, returning how many were present.
    pub fn strip(&self, doc: &mut RawDocument) -> usize {
        self.drop
            .iter()
            .filter(|key| doc.remove(key.as_str()).is_some())
            .count()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CleanupReport {
    pub fixed_splits: usize,
    pub fixed_articles: usize,
    pub stripped_keys: usize,
}

/// Rewrite `"<n>_0"` ids to `n`.
///
/// A document is left untouched when its new id is already taken.
pub fn fix_ids(docs: &mut [RawDocument]) -> usize {
    let mut taken: HashSet<i64> = docs
        .iter()
        .filter_map(|doc| doc.get("_id").and_then(Value::as_i64))
        .collect();

    let mut fixed = 0;
    for doc in docs.iter_mut() {
        let new_id = match doc.get("_id") {
            Some(Value::String(id)) => DocId::from(id.as_str()).without_image_suffix(),
            _ => None,
        };
        if let Some(new_id) = new_id {
            if taken.insert(new_id) {
                doc.insert("_id".to_string(), Value::from(new_id));
                fixed += 1;
            } else {
                debug!("id {} already taken", new_id);
            }
        }
    }
    fixed
}

fn load(src: &Path) -> Result<Vec<RawDocument>, Error> {
    JsonLines::<RawDocument>::from_path(src)?.collect()
}

/// Clean the store directory `src` into `dst`.
pub fn cleanup_dir(src: &Path, dst: &Path, keys: &KeyCleanup) -> Result<CleanupReport, Error> {
    let mut splits = load(&src.join(SPLITS_FILE))?;
    let mut articles = load(&src.join(ARTICLES_FILE))?;
    info!(
        "cleaning {} splits and {} articles from {:?}",
        splits.len(),
        articles.len(),
        src
    );

    let (fixed_splits, fixed_articles) =
        rayon::join(|| fix_ids(&mut splits), || fix_ids(&mut articles));
    info!("fixed {} split ids, {} article ids", fixed_splits, fixed_articles);

    let stripped_keys: usize = splits.par_iter_mut().map(|doc| keys.strip(doc)).sum();
    info!("removed {} split keys", stripped_keys);

    std::fs::create_dir_all(dst)?;
    write_jsonl(&dst.join(SPLITS_FILE), &splits)?;
    write_jsonl(&dst.join(ARTICLES_FILE), &articles)?;
    let objects = src.join(OBJECTS_FILE);
    if objects.exists() {
        std::fs::copy(&objects, dst.join(OBJECTS_FILE))?;
    }

    Ok(CleanupReport {
        fixed_splits,
        fixed_articles,
        stripped_keys,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> RawDocument {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_overlap() {
        let res = KeyCleanup::new(
            vec!["_id".to_string(), "split".to_string()],
            vec!["split".to_string(), "topic".to_string()],
        );
        match res {
            Err(Error::OverlappingKeys(keys)) => assert_eq!(keys, vec!["split".to_string()]),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_default_disjoint() {
        let d = KeyCleanup::default();
        assert!(KeyCleanup::new(d.keep_keys().to_vec(), d.drop_keys().to_vec()).is_ok());
    }

    #[test]
    fn test_fix_ids() {
        let mut docs = vec![
            raw(json!({"_id": "12_0"})),
            raw(json!({"_id": "abc"})),
            raw(json!({"_id": "3_0"})),
            raw(json!({"_id": 3})),
            raw(json!({"_id": 4})),
        ];
        assert_eq!(fix_ids(&mut docs), 1);
        assert_eq!(docs[0]["_id"], json!(12));
        assert_eq!(docs[1]["_id"], json!("abc"));
        // 3 exists
        assert_eq!(docs[2]["_id"], json!("3_0"));
    }

    #[test]
    fn test_strip() {
        let mut doc = raw(json!({"_id": 1, "split": "train", "caption": "x", "topic": "y"}));
        assert_eq!(KeyCleanup::default().strip(&mut doc), 2);
        assert_eq!(doc.len(), 2);
        assert!(doc.contains_key("split"));
    }
}
