//! In-memory store.
use std::collections::BTreeMap;

use log::debug;

use crate::error::Error;
use crate::types::{
    Article, ArticleProjection, DocId, FacenetDetails, NamedEntity, ObjectFeatures, Split,
    SplitName,
};

use super::{RecordStore, StoreWriter};

/// Maximum size of a stored document (16 MiB, like the document store).
pub const MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

/// Ordered collections held in memory.
///
/// Document sizes are measured on their JSON serialization.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    articles: BTreeMap<DocId, Article>,
    splits: BTreeMap<DocId, Split>,
    objects: BTreeMap<DocId, ObjectFeatures>,
    max_document_bytes: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            articles: BTreeMap::new(),
            splits: BTreeMap::new(),
            objects: BTreeMap::new(),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

impl MemoryStore {
    /// Use a custom document size limit for writes.
    pub fn with_max_document_bytes(mut self, max_document_bytes: usize) -> Self {
        self.max_document_bytes = max_document_bytes;
        self
    }

    pub fn insert_article(&mut self, article: Article) -> Option<Article> {
        self.articles.insert(article.id().clone(), article)
    }

    pub fn insert_split(&mut self, split: Split) -> Option<Split> {
        self.splits.insert(split.id.clone(), split)
    }

    pub fn insert_objects(&mut self, objects: ObjectFeatures) -> Option<ObjectFeatures> {
        self.objects.insert(objects.id.clone(), objects)
    }

    pub fn remove_split(&mut self, id: &DocId) -> Option<Split> {
        self.splits.remove(id)
    }

    pub fn articles(&self) -> &BTreeMap<DocId, Article> {
        &self.articles
    }

    pub fn splits(&self) -> &BTreeMap<DocId, Split> {
        &self.splits
    }

    pub fn objects(&self) -> &BTreeMap<DocId, ObjectFeatures> {
        &self.objects
    }

    fn check_size<T: serde::Serialize>(&self, id: &DocId, doc: &T) -> Result<(), Error> {
        let size = serde_json::to_vec(doc)?.len();
        if size > self.max_document_bytes {
            return Err(Error::DocumentTooLarge {
                id: id.clone(),
                size,
            });
        }
        Ok(())
    }
}

impl RecordStore for MemoryStore {
    fn fetch_split_ids(&self, split: SplitName, limit: Option<usize>) -> Result<Vec<DocId>, Error> {
        let ids = self
            .splits
            .values()
            .filter(|s| s.split == split)
            .map(|s| s.id.clone());

        Ok(match limit {
            Some(limit) => ids.take(limit).collect(),
            None => ids.collect(),
        })
    }

    fn fetch_split(&self, id: &DocId) -> Result<Option<Split>, Error> {
        Ok(self.splits.get(id).cloned())
    }

    fn fetch_article(
        &self,
        id: &DocId,
        projection: &ArticleProjection,
    ) -> Result<Option<Article>, Error> {
        Ok(self.articles.get(id).map(|a| a.project(projection)))
    }

    fn fetch_object_features(&self, id: &DocId) -> Result<Option<ObjectFeatures>, Error> {
        Ok(self.objects.get(id).cloned())
    }
}

impl StoreWriter for MemoryStore {
    fn set_facenet_details(&mut self, id: &DocId, details: &FacenetDetails) -> Result<(), Error> {
        let mut updated = match self.splits.get(id) {
            Some(split) => split.clone(),
            None => {
                debug!("no split {} to update", id);
                return Ok(());
            }
        };
        updated.facenet_details = Some(details.clone());
        self.check_size(id, &updated)?;
        self.splits.insert(id.clone(), updated);
        Ok(())
    }

    fn set_context(
        &mut self,
        id: &DocId,
        key: &str,
        value: Option<(&str, &[NamedEntity])>,
    ) -> Result<(), Error> {
        let mut updated = match self.articles.get(id) {
            Some(article) => article.clone(),
            None => {
                debug!("no article {} to update", id);
                return Ok(());
            }
        };
        match value {
            Some((text, entities)) => {
                updated.set_text(key, Some(text.to_string()));
                updated.set_annotations(key, Some(entities.to_vec()));
            }
            None => {
                updated.set_text(key, None);
                updated.set_annotations(key, None);
            }
        }
        self.check_size(id, &updated)?;
        self.articles.insert(id.clone(), updated);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{EntityLabel, ImageIndex};

    use super::*;

    fn gen_store() -> MemoryStore {
        let mut store = MemoryStore::default();
        for i in (0..6).rev() {
            let split = match i % 3 {
                0 => SplitName::Train,
                1 => SplitName::Val,
                _ => SplitName::Test,
            };
            store.insert_split(Split::new(
                DocId::from(format!("{i}_0")),
                DocId::Int(i),
                0,
                split,
            ));
            store.insert_article(
                Article::new(DocId::Int(i))
                    .with_text("context", "some text")
                    .with_image("0", "a caption"),
            );
        }
        store
    }

    #[test]
    fn test_split_ids_sorted_and_limited() {
        let store = gen_store();
        let ids = store.fetch_split_ids(SplitName::Train, None).unwrap();
        assert_eq!(ids, vec![DocId::from("0_0"), DocId::from("3_0")]);

        let ids = store.fetch_split_ids(SplitName::Train, Some(1)).unwrap();
        assert_eq!(ids, vec![DocId::from("0_0")]);
    }

    #[test]
    fn test_absent_is_none() {
        let store = gen_store();
        assert!(store.fetch_split(&DocId::from("42_0")).unwrap().is_none());
        assert!(store
            .fetch_article(&DocId::Int(42), &ArticleProjection::all())
            .unwrap()
            .is_none());
        assert!(store
            .fetch_object_features(&DocId::Int(0))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_fetch_article_projection() {
        let store = gen_store();
        let a = store
            .fetch_article(&DocId::Int(1), &ArticleProjection::new(["images"]))
            .unwrap()
            .unwrap();
        assert!(a.text("context").is_none());
        assert_eq!(a.caption(&ImageIndex::Position(0)), Some("a caption"));
    }

    #[test]
    fn test_document_too_large() {
        let mut store = gen_store().with_max_document_bytes(256);
        let details = FacenetDetails {
            n_faces: 1,
            embeddings: vec![vec![0.5; 512]],
            detect_probs: vec![0.9],
        };
        let id = DocId::from("0_0");
        let res = store.set_facenet_details(&id, &details);
        assert!(matches!(res, Err(Error::DocumentTooLarge { .. })));
        // write is dropped
        assert!(store.fetch_split(&id).unwrap().unwrap().facenet_details.is_none());
    }

    #[test]
    fn test_set_context() {
        let mut store = gen_store();
        let id = DocId::Int(2);
        let entities = vec![NamedEntity::new("Alice", EntityLabel::Person)];
        store
            .set_context(&id, "context", Some(("Alice here", &entities)))
            .unwrap();
        let a = store
            .fetch_article(&id, &ArticleProjection::all())
            .unwrap()
            .unwrap();
        assert_eq!(a.text("context"), Some("Alice here"));
        assert_eq!(a.annotations("context").unwrap(), entities.as_slice());

        // unknown ids are ignored
        store.set_context(&DocId::Int(99), "context", None).unwrap();
    }
}
