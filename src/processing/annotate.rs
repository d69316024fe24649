/*! Context annotation.

Builds the context of each article and stores its named entities next to it,
under `<key>` and `<key>_ner`.
Only articles referenced by a split are annotated, each of them once.
!*/
use std::collections::HashSet;

use log::{debug, error, info, warn};

use crate::error::Error;
use crate::reader::{DatasetKind, ABSTRACT_KEY};
use crate::store::{RecordStore, StoreWriter};
use crate::types::{Article, ArticleProjection, DocId, NamedEntity, SplitName};

/// Named entity recognizer.
pub trait EntityAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<NamedEntity>, Error>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationReport {
    pub annotated: usize,
    /// Articles set to null because they have no abstract.
    pub nulled: usize,
    pub skipped: usize,
    /// Annotations lost because the article grew too large.
    pub dropped: usize,
}

/// Text to annotate for `article`, `None` when it has no abstract and `key` needs one.
///
/// The body is stripped and the `"<headline>\n\n"` prefix removed.
pub fn prepare_context(article: &Article, key: &str) -> Option<Option<String>> {
    let body = article.text("context")?.trim();
    let body = match article.headline_main() {
        Some(headline) if !headline.is_empty() => body
            .strip_prefix(format!("{headline}\n\n").as_str())
            .unwrap_or(body),
        _ => body,
    };

    if key == ABSTRACT_KEY {
        return Some(
            article
                .abstract_text()
                .map(|abstract_text| format!("{abstract_text}\n\n{body}")),
        );
    }
    Some(Some(body.to_string()))
}

fn referenced_articles<S: RecordStore>(
    store: &S,
    dataset: DatasetKind,
) -> Result<Vec<DocId>, Error> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for split_name in SplitName::ALL {
        for split_id in store.fetch_split_ids(split_name, None)? {
            let article_id = store
                .fetch_split(&split_id)?
                .and_then(|split| dataset.article_id(&split));
            if let Some(article_id) = article_id {
                if seen.insert(article_id.clone()) {
                    ids.push(article_id);
                }
            }
        }
    }
    Ok(ids)
}

/// Annotate the contexts of every article referenced by a split into `key`.
pub fn annotate_contexts<S, A>(
    store: &mut S,
    annotator: &A,
    dataset: DatasetKind,
    key: &str,
) -> Result<AnnotationReport, Error>
where
    S: RecordStore + StoreWriter,
    A: EntityAnnotator,
{
    let ids = referenced_articles(&*store, dataset)?;
    info!("annotating {} articles into {}", ids.len(), key);

    let mut report = AnnotationReport::default();
    for id in ids {
        let article = match store.fetch_article(&id, &ArticleProjection::all())? {
            Some(a) => a,
            None => {
                warn!("no article {}", id);
                report.skipped += 1;
                continue;
            }
        };

        let (context, entities) = match prepare_context(&article, key) {
            None => {
                warn!("no context for article {}", id);
                report.skipped += 1;
                continue;
            }
            Some(None) => {
                debug!("no abstract for article {}", id);
                (None, Vec::new())
            }
            Some(Some(context)) => match annotator.annotate(&context) {
                Ok(entities) => (Some(context), entities),
                Err(e) => {
                    warn!("annotation failed on article {}: {}", id, e);
                    report.skipped += 1;
                    continue;
                }
            },
        };

        let value = context
            .as_deref()
            .map(|context| (context, entities.as_slice()));
        match store.set_context(&id, key, value) {
            Ok(()) if context.is_some() => report.annotated += 1,
            Ok(()) => report.nulled += 1,
            Err(Error::DocumentTooLarge { id, size }) => {
                warn!("Document too large: {} ({} bytes)", id, size);
                report.dropped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "{} articles annotated, {} without abstract, {} skipped",
        report.annotated, report.nulled, report.skipped
    );
    if report.dropped > 0 {
        error!(
            "{} annotations were not stored (document too large)",
            report.dropped
        );
    }
    Ok(report)
}
