/*! Face and object features.

[select_faces] and [select_object_features] turn the detections stored with a split
into an [Embeddings] value, which is either empty or a `(rows, dim)` matrix.
!*/
mod embeddings;
mod selector;

pub use embeddings::{Embeddings, PADDING_VALUE};
pub use selector::{
    resolve_target_count, select_faces, select_object_features, DEFAULT_FACE_COUNT,
};
