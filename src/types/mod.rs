/*! Document types.

Typed views over the loosely shaped collections of the document store:
[Article], [Split] and [ObjectFeatures].
Every field that may be missing from a document is an [Option].
!*/
mod article;
mod ids;
mod objects;
mod split;

pub use article::{Article, ArticleProjection, CaptionNer, EntityLabel, Headline, NamedEntity};
pub use ids::{DocId, ImageIndex, SplitName};
pub use objects::ObjectFeatures;
pub use split::{FacenetDetails, Split, SplitKey};
