/*! Record store access

Typed queries over the `articles`, `splits` and `objects` collections.

Readers only need [RecordStore]. Offline steps that write back (face detection, entity annotation)
also need [StoreWriter].

An absent document is not an error: lookups return `Ok(None)` and the caller decides what to skip.
!*/
mod jsonl;
mod memory;
#[cfg(feature = "mongo")]
mod mongo;

pub use jsonl::{write_jsonl, JsonLines, ARTICLES_FILE, OBJECTS_FILE, SPLITS_FILE};
pub use memory::{MemoryStore, MAX_DOCUMENT_BYTES};
#[cfg(feature = "mongo")]
pub use mongo::MongoStore;

use crate::error::Error;
use crate::types::{
    Article, ArticleProjection, DocId, FacenetDetails, NamedEntity, ObjectFeatures, Split,
    SplitName,
};

/// Read access to the collections.
pub trait RecordStore {
    /// Ids of the `split` partition, sorted ascending, capped at `limit` if provided.
    fn fetch_split_ids(&self, split: SplitName, limit: Option<usize>) -> Result<Vec<DocId>, Error>;

    fn fetch_split(&self, id: &DocId) -> Result<Option<Split>, Error>;

    /// Article `id`, restricted to the fields of `projection`.
    fn fetch_article(
        &self,
        id: &DocId,
        projection: &ArticleProjection,
    ) -> Result<Option<Article>, Error>;

    fn fetch_object_features(&self, id: &DocId) -> Result<Option<ObjectFeatures>, Error>;
}

/// Write access used by the offline steps.
pub trait StoreWriter {
    /// Attach face detections to split `id`. Unknown ids are ignored.
    fn set_facenet_details(&mut self, id: &DocId, details: &FacenetDetails) -> Result<(), Error>;

    /// Set text field `key` and its `<key>_ner` list on article `id`.
    /// [None] sets both to null. Unknown ids are ignored.
    fn set_context(
        &mut self,
        id: &DocId,
        key: &str,
        value: Option<(&str, &[NamedEntity])>,
    ) -> Result<(), Error>;
}

impl<T: RecordStore + ?Sized> RecordStore for &T {
    fn fetch_split_ids(&self, split: SplitName, limit: Option<usize>) -> Result<Vec<DocId>, Error> {
        (**self).fetch_split_ids(split, limit)
    }

    fn fetch_split(&self, id: &DocId) -> Result<Option<Split>, Error> {
        (**self).fetch_split(id)
    }

    fn fetch_article(
        &self,
        id: &DocId,
        projection: &ArticleProjection,
    ) -> Result<Option<Article>, Error> {
        (**self).fetch_article(id, projection)
    }

    fn fetch_object_features(&self, id: &DocId) -> Result<Option<ObjectFeatures>, Error> {
        (**self).fetch_object_features(id)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn fetch_split_ids(&self, split: SplitName, limit: Option<usize>) -> Result<Vec<DocId>, Error> {
        (**self).fetch_split_ids(split, limit)
    }

    fn fetch_split(&self, id: &DocId) -> Result<Option<Split>, Error> {
        (**self).fetch_split(id)
    }

    fn fetch_article(
        &self,
        id: &DocId,
        projection: &ArticleProjection,
    ) -> Result<Option<Article>, Error> {
        (**self).fetch_article(id, projection)
    }

    fn fetch_object_features(&self, id: &DocId) -> Result<Option<ObjectFeatures>, Error> {
        (**self).fetch_object_features(id)
    }
}
