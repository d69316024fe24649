/*! Filtering utilities

Filters decide whether an item is kept.
For now the only filters work on named entity annotations, see [entities].
!*/
pub mod entities;
mod filter;

pub use entities::{extract_caption_person_names, extract_context_entities, CategoryFilter};
pub use filter::Filter;
