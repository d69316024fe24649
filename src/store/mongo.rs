//! MongoDB backed store (`mongo` feature).
use log::{debug, info};
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneOptions, FindOptions};
use mongodb::sync::{Client, Collection, Database};

use crate::error::Error;
use crate::types::{
    Article, ArticleProjection, DocId, FacenetDetails, NamedEntity, ObjectFeatures, Split,
    SplitKey, SplitName,
};

use super::{RecordStore, StoreWriter, MAX_DOCUMENT_BYTES};

/// Server error codes for oversized documents.
const TOO_LARGE_CODES: [i32; 2] = [10334, 17419];

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    /// Connect to `uri` and use database `name` (`goodnews`, `visualnews`, ...).
    pub fn connect(uri: &str, name: &str) -> Result<Self, Error> {
        info!("connecting to {} (database {})", uri, name);
        let client = Client::with_uri_str(uri)?;
        Ok(Self {
            db: client.database(name),
        })
    }

    fn splits(&self) -> Collection<Split> {
        self.db.collection("splits")
    }

    fn articles(&self) -> Collection<Article> {
        self.db.collection("articles")
    }

    fn objects(&self) -> Collection<ObjectFeatures> {
        self.db.collection("objects")
    }

    fn id_filter(id: &DocId) -> Document {
        doc! { "_id": { "$eq": id_to_bson(id) } }
    }

    /// Run an update, mapping oversized documents to [Error::DocumentTooLarge].
    fn update(&self, collection: &str, id: &DocId, update: Document) -> Result<(), Error> {
        let size = bson::to_vec(&update)?.len();
        if size > MAX_DOCUMENT_BYTES {
            return Err(Error::DocumentTooLarge {
                id: id.clone(),
                size,
            });
        }

        let res = self
            .db
            .collection::<Document>(collection)
            .update_one(Self::id_filter(id), update, None);

        match res {
            Ok(r) => {
                if r.matched_count == 0 {
                    debug!("no document {} in {}", id, collection);
                }
                Ok(())
            }
            Err(e) => {
                let too_large = matches!(
                    *e.kind,
                    ErrorKind::Write(WriteFailure::WriteError(ref we))
                        if TOO_LARGE_CODES.contains(&we.code)
                );
                if too_large {
                    Err(Error::DocumentTooLarge {
                        id: id.clone(),
                        size,
                    })
                } else {
                    Err(Error::Mongo(e))
                }
            }
        }
    }
}

fn id_to_bson(id: &DocId) -> Bson {
    match id {
        DocId::Int(i) => Bson::Int64(*i),
        DocId::Str(s) => Bson::String(s.clone()),
    }
}

impl RecordStore for MongoStore {
    fn fetch_split_ids(&self, split: SplitName, limit: Option<usize>) -> Result<Vec<DocId>, Error> {
        info!("Grabbing all {} ids", split);
        // a full listing can outlive the default cursor timeout
        let options = FindOptions::builder()
            .projection(Some(doc! { "_id": 1 }))
            .sort(Some(doc! { "_id": 1 }))
            .limit(limit.map(|l| l as i64))
            .no_cursor_timeout(Some(true))
            .batch_size(Some(128))
            .build();

        let cursor = self
            .db
            .collection::<SplitKey>("splits")
            .find(doc! { "split": { "$eq": split.as_str() } }, options)?;

        let ids = cursor
            .map(|key| key.map(|k| k.id).map_err(Error::from))
            .collect::<Result<Vec<DocId>, Error>>()?;
        info!("{} {} ids", ids.len(), split);
        Ok(ids)
    }

    fn fetch_split(&self, id: &DocId) -> Result<Option<Split>, Error> {
        Ok(self.splits().find_one(Self::id_filter(id), None)?)
    }

    fn fetch_article(
        &self,
        id: &DocId,
        projection: &ArticleProjection,
    ) -> Result<Option<Article>, Error> {
        let options = if projection.is_all() {
            None
        } else {
            let mut fields = Document::new();
            for field in projection.fields() {
                fields.insert(field.as_str(), 1);
            }
            Some(FindOneOptions::builder().projection(Some(fields)).build())
        };
        Ok(self.articles().find_one(Self::id_filter(id), options)?)
    }

    fn fetch_object_features(&self, id: &DocId) -> Result<Option<ObjectFeatures>, Error> {
        Ok(self.objects().find_one(doc! { "_id": id_to_bson(id) }, None)?)
    }
}

impl StoreWriter for MongoStore {
    fn set_facenet_details(&mut self, id: &DocId, details: &FacenetDetails) -> Result<(), Error> {
        let details = bson::to_bson(details)?;
        self.update("splits", id, doc! { "$set": { "facenet_details": details } })
    }

    fn set_context(
        &mut self,
        id: &DocId,
        key: &str,
        value: Option<(&str, &[NamedEntity])>,
    ) -> Result<(), Error> {
        let ner_key = format!("{key}_ner");
        let mut fields = Document::new();
        match value {
            Some((text, entities)) => {
                fields.insert(key, text);
                fields.insert(ner_key, bson::to_bson(entities)?);
            }
            None => {
                fields.insert(key, Bson::Null);
                fields.insert(ner_key, Bson::Null);
            }
        }
        self.update("articles", id, doc! { "$set": fields })
    }
}
