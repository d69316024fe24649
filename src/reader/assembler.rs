/*! Record assembly.

Joins a fetched [Article] and [Split] with their selected features into an [AssembledRecord].
Each step may reject the record with a [Skip]:

1. the image can not be located or decoded,
2. the abstract-prefixed context is required but absent,
3. the context field is absent,
4. the caption of the image index is absent.
!*/
use std::fmt;
use std::path::PathBuf;

use image::DynamicImage;
use itertools::Itertools;
use serde::Serialize;

use crate::features::Embeddings;
use crate::filtering::extract_context_entities;
use crate::imaging::open_image;
use crate::tokenize::{Token, Tokenizer};
use crate::types::{Article, DocId, Split};

use super::config::{ReaderConfig, ABSTRACT_KEY};

/// Plain text view of a record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordMetadata {
    pub id: DocId,
    pub context: String,
    pub caption: String,
    pub names: Vec<String>,
    /// Empty when the article has no url.
    pub web_url: String,
    pub image_path: PathBuf,
}

/// One joined and tokenized record.
#[derive(Debug, Clone)]
pub struct AssembledRecord {
    pub context: Vec<Token>,
    pub caption: Vec<Token>,
    /// One token sequence per name, empty when there are no names.
    pub names: Vec<Vec<Token>>,
    pub image: DynamicImage,
    pub face_embeds: Embeddings,
    /// Only set when object features are requested.
    pub obj_embeds: Option<Embeddings>,
    pub metadata: RecordMetadata,
}

/// Reason a record was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    MissingSplit(DocId),
    MissingArticle(DocId),
    /// The store failed while fetching the documents of the split.
    Store { id: DocId, reason: String },
    NoImagePath(DocId),
    Image {
        id: DocId,
        path: PathBuf,
        reason: String,
    },
    NoAbstract(DocId),
    NoContext(DocId),
    NoCaption(DocId),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::MissingSplit(id) => write!(f, "no split {id}"),
            Skip::MissingArticle(id) => write!(f, "no article for split {id}"),
            Skip::NoImagePath(id) => write!(f, "no image path for split {id}"),
            Skip::Store { id, reason } => write!(f, "store error on split {id}: {reason}"),
            Skip::Image { id, path, reason } => {
                write!(f, "image not found for split {id} {:?}: {}", path, reason)
            }
            Skip::NoAbstract(id) => write!(f, "no abstract found for article {id}"),
            Skip::NoContext(id) => write!(f, "no context for article {id}"),
            Skip::NoCaption(id) => write!(f, "no caption for split {id}"),
        }
    }
}

/// Keep the first `max_end` space separated tokens of `text`.
///
/// Splitting is done on single spaces, so newlines and runs of spaces survive
/// and text with at most `max_end` tokens is returned unchanged.
pub fn truncate_tokens(text: &str, max_end: usize) -> String {
    text.split(' ').take(max_end).join(" ")
}

/// Build the context of a record from the article body.
///
/// With `with_ner`, the comma separated `names` and a blank line are prepended
/// and the whole text is truncated again, so a long prefix eats into the body.
pub fn build_context(body: &str, names: &[String], with_ner: bool, max_end: usize) -> String {
    let body = truncate_tokens(body.trim(), max_end);
    if with_ner {
        let prefixed = format!("{}.\n\n{}", names.join(", "), body);
        truncate_tokens(&prefixed, max_end)
    } else {
        body
    }
}

pub struct RecordAssembler {
    config: ReaderConfig,
    tokenizer: Box<dyn Tokenizer>,
}

impl RecordAssembler {
    pub fn new(config: &ReaderConfig, tokenizer: Box<dyn Tokenizer>) -> Self {
        Self {
            config: config.clone(),
            tokenizer,
        }
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    pub fn assemble(
        &self,
        article: &Article,
        split: &Split,
        face_embeds: Embeddings,
        obj_embeds: Option<Embeddings>,
    ) -> Result<AssembledRecord, Skip> {
        let config = &self.config;

        let image_path = config
            .dataset
            .image_path(&config.image_dir, split, article)
            .ok_or_else(|| Skip::NoImagePath(split.id.clone()))?;
        let image = open_image(&image_path).map_err(|e| Skip::Image {
            id: split.id.clone(),
            path: image_path.clone(),
            reason: e.to_string(),
        })?;

        if config.with_abstract && article.text(ABSTRACT_KEY).is_none() {
            return Err(Skip::NoAbstract(article.id().clone()));
        }

        let body = article
            .text(&config.context_key)
            .ok_or_else(|| Skip::NoContext(article.id().clone()))?;
        let names: Vec<String> =
            extract_context_entities(article, &config.context_key, config.restrict_entities)
                .into_iter()
                .collect();
        let context = build_context(body, &names, config.with_ner, config.max_end);

        let caption = article
            .caption(&split.image_index)
            .ok_or_else(|| Skip::NoCaption(split.id.clone()))?
            .trim()
            .to_string();

        let context_tokens = self.tokenizer.tokenize(&context);
        let caption_tokens = self.tokenizer.tokenize(&caption);
        let name_tokens = names.iter().map(|n| self.tokenizer.tokenize(n)).collect();

        Ok(AssembledRecord {
            context: context_tokens,
            caption: caption_tokens,
            names: name_tokens,
            image,
            face_embeds,
            obj_embeds,
            metadata: RecordMetadata {
                id: split.id.clone(),
                context,
                caption,
                names,
                web_url: article.web_url().unwrap_or_default().to_string(),
                image_path,
            },
        })
    }
}
