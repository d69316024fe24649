//! Named entity extraction.
//!
//! Names come from the precomputed annotations of an [Article]:
//! - `<context_key>_ner` for the article body,
//! - `caption_ner[image_index]` for a caption.
//!
//! A missing annotation list gives an empty set.
//! Sets are [BTreeSet]s, so iteration order is lexicographic.
use std::collections::BTreeSet;

use crate::types::{Article, EntityLabel, ImageIndex, NamedEntity};

use super::Filter;

/// Categories kept from contexts when restricted.
pub const CONTEXT_CATEGORIES: [EntityLabel; 3] =
    [EntityLabel::Person, EntityLabel::Org, EntityLabel::Gpe];

/// Keeps annotations by category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    Any,
    Only(Vec<EntityLabel>),
}

impl CategoryFilter {
    /// Context filter: PERSON, ORG and GPE when `restrict` is set, anything otherwise.
    pub fn context(restrict: bool) -> Self {
        if restrict {
            Self::default()
        } else {
            Self::Any
        }
    }

    pub fn persons() -> Self {
        Self::Only(vec![EntityLabel::Person])
    }

    /// Deduplicated texts of the kept annotations.
    pub fn names<'a, I>(&self, entities: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a NamedEntity>,
    {
        entities
            .into_iter()
            .filter(|e| self.detect(*e))
            .map(|e| e.text.clone())
            .collect()
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::Only(CONTEXT_CATEGORIES.to_vec())
    }
}

impl Filter<&NamedEntity> for CategoryFilter {
    fn detect(&self, entity: &NamedEntity) -> bool {
        match self {
            Self::Any => true,
            Self::Only(labels) => labels.contains(&entity.label),
        }
    }
}

/// Names annotated in the `context_key` field of `article`.
pub fn extract_context_entities(
    article: &Article,
    context_key: &str,
    restrict_to_person_org_gpe: bool,
) -> BTreeSet<String> {
    match article.annotations(context_key) {
        Some(entities) => CategoryFilter::context(restrict_to_person_org_gpe).names(entities),
        None => BTreeSet::new(),
    }
}

/// Person names annotated in the caption of image `index`.
pub fn extract_caption_person_names(article: &Article, index: &ImageIndex) -> BTreeSet<String> {
    match article.caption_annotations(index) {
        Some(entities) => CategoryFilter::persons().names(entities),
        None => BTreeSet::new(),
    }
}
