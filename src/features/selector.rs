use crate::types::{ObjectFeatures, Split};

use super::Embeddings;

/// Number of faces kept when neither an override nor caption names are used.
pub const DEFAULT_FACE_COUNT: usize = 4;

/// Number of faces to keep for a record.
///
/// Priority: `n_faces` override, then the number of person names in the caption
/// (when `use_caption_names` is set), then [DEFAULT_FACE_COUNT].
pub fn resolve_target_count(
    n_faces: Option<usize>,
    use_caption_names: bool,
    caption_person_count: usize,
) -> usize {
    match n_faces {
        Some(n) => n,
        None if use_caption_names => caption_person_count,
        None => DEFAULT_FACE_COUNT,
    }
}

/// Top `target_count` face embeddings of `split`.
///
/// Embeddings are stored largest face first, so this is a prefix.
/// No padding happens here: fewer faces than `target_count` gives fewer rows.
pub fn select_faces(split: &Split, target_count: usize) -> Embeddings {
    match &split.facenet_details {
        Some(details) if target_count > 0 => Embeddings::from_rows(
            details
                .embeddings
                .iter()
                .take(target_count)
                .cloned()
                .collect(),
        ),
        _ => Embeddings::Empty,
    }
}

pub fn select_object_features(objects: Option<&ObjectFeatures>) -> Embeddings {
    match objects {
        Some(o) => Embeddings::from_rows(o.object_features.clone()),
        None => Embeddings::Empty,
    }
}
