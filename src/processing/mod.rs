/*! Offline processing steps

Each step is a single pass over a store:

- [annotate_contexts] stores named entities of article contexts,
- [detect_faces] stores face embeddings of split images,
- [cleanup_dir] normalizes ids and split keys of a store directory,
- [count_faces] reports face detection coverage.

Models are external: steps take an [EntityAnnotator] or a [FaceDetector].
!*/
mod annotate;
mod cleanup;
mod count;
mod detect;

pub use annotate::{annotate_contexts, prepare_context, AnnotationReport, EntityAnnotator};
pub use cleanup::{cleanup_dir, fix_ids, CleanupReport, KeyCleanup, RawDocument};
pub use count::{count_faces, SplitCount};
pub use detect::{detect_faces, Detection, DetectionReport, FaceDetector, MAX_FACES};
