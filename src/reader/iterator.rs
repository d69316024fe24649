/*! Split-aware shuffling reader.

[FaceNerMatchedReader::iterate] lists the ids of a split, shuffles them with a
generator seeded from the configuration and yields one [AssembledRecord] per id.
Records are fetched lazily: dropping the iterator stops all store access.

Any per-record fault (absent document, store error, unreadable image) is logged
and the id is skipped.
!*/
use std::vec::IntoIter;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::Error;
use crate::features::{
    resolve_target_count, select_faces, select_object_features, Embeddings,
};
use crate::filtering::extract_caption_person_names;
use crate::store::RecordStore;
use crate::tokenize::{Tokenizer, WordTokenizer};
use crate::types::{ArticleProjection, DocId, Split, SplitName};

use super::assembler::{AssembledRecord, RecordAssembler, Skip};
use super::config::ReaderConfig;

/// Reader over the face and NER matched records of a store.
pub struct FaceNerMatchedReader<S: RecordStore> {
    store: S,
    assembler: RecordAssembler,
    projection: ArticleProjection,
}

impl<S: RecordStore> FaceNerMatchedReader<S> {
    pub fn new(store: S, config: ReaderConfig, tokenizer: Box<dyn Tokenizer>) -> Self {
        let projection = config.projection();
        Self {
            store,
            assembler: RecordAssembler::new(&config, tokenizer),
            projection,
        }
    }

    /// Reader using [WordTokenizer].
    pub fn with_default_tokenizer(store: S, config: ReaderConfig) -> Self {
        Self::new(store, config, Box::new(WordTokenizer))
    }

    pub fn config(&self) -> &ReaderConfig {
        self.assembler.config()
    }

    /// Iterate over the split named `split`.
    ///
    /// Fails with [Error::UnknownSplit] before touching the store if `split`
    /// is not one of `train`, `val` or `test`.
    pub fn read(&self, split: &str) -> Result<Records<'_, S>, Error> {
        let split: SplitName = split.parse()?;
        self.iterate(split)
    }

    pub fn iterate(&self, split: SplitName) -> Result<Records<'_, S>, Error> {
        let limit = self.config().limit_for(split);
        let mut ids = self.store.fetch_split_ids(split, limit)?;

        // fresh generator: every pass over the same ids has the same order
        let mut rng = StdRng::seed_from_u64(self.config().seed);
        ids.shuffle(&mut rng);
        info!("{} {} ids shuffled", ids.len(), split);

        Ok(Records {
            reader: self,
            split,
            total: ids.len(),
            ids: ids.into_iter(),
            yielded: 0,
            skipped: 0,
            done: false,
        })
    }

    fn load(&self, id: &DocId) -> Result<AssembledRecord, Skip> {
        let store = &self.store;
        let config = self.config();

        let split = match store.fetch_split(id) {
            Ok(Some(split)) => split,
            Ok(None) => return Err(Skip::MissingSplit(id.clone())),
            Err(e) => {
                return Err(Skip::Store {
                    id: id.clone(),
                    reason: e.to_string(),
                })
            }
        };

        let article_id = config
            .dataset
            .article_id(&split)
            .ok_or_else(|| Skip::MissingArticle(id.clone()))?;
        let article = match store.fetch_article(&article_id, &self.projection) {
            Ok(Some(article)) => article,
            Ok(None) => return Err(Skip::MissingArticle(id.clone())),
            Err(e) => {
                return Err(Skip::Store {
                    id: id.clone(),
                    reason: format!("article {article_id}: {e}"),
                })
            }
        };

        let caption_persons = extract_caption_person_names(&article, &split.image_index).len();
        let target = resolve_target_count(config.n_faces, config.use_caption_names, caption_persons);
        let face_embeds = select_faces(&split, target);

        let obj_embeds = if config.use_objects {
            Some(self.load_objects(&split))
        } else {
            None
        };

        self.assembler
            .assemble(&article, &split, face_embeds, obj_embeds)
    }

    fn load_objects(&self, split: &Split) -> Embeddings {
        let objects_id = match self.config().dataset.objects_id(split) {
            Some(id) => id,
            None => return Embeddings::Empty,
        };
        match self.store.fetch_object_features(&objects_id) {
            Ok(objects) => select_object_features(objects.as_ref()),
            Err(e) => {
                warn!("could not fetch object features {}: {}", objects_id, e);
                Embeddings::Empty
            }
        }
    }
}

/// Lazy sequence of the records of one split.
pub struct Records<'a, S: RecordStore> {
    reader: &'a FaceNerMatchedReader<S>,
    split: SplitName,
    ids: IntoIter<DocId>,
    total: usize,
    yielded: usize,
    skipped: usize,
    done: bool,
}

impl<'a, S: RecordStore> Records<'a, S> {
    /// Number of ids in the pass, skipped ones included.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl<'a, S: RecordStore> Iterator for Records<'a, S> {
    type Item = AssembledRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for id in self.ids.by_ref() {
            match self.reader.load(&id) {
                Ok(record) => {
                    self.yielded += 1;
                    return Some(record);
                }
                Err(skip) => {
                    warn!("{}", skip);
                    self.skipped += 1;
                }
            }
        }

        if !self.done {
            self.done = true;
            info!(
                "{}: {} records, {} skipped out of {} ids",
                self.split, self.yielded, self.skipped, self.total
            );
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.ids.len()))
    }
}
