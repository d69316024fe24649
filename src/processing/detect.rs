/*! Face detection.

Runs a [FaceDetector] on the image of every split that has no `facenet_details` yet,
and stores the most prominent faces.

Writes rejected for their size are logged and dropped, and counted in the [DetectionReport].
!*/
use std::path::{Path, PathBuf};

use image::DynamicImage;
use log::{error, info, warn};

use crate::error::Error;
use crate::imaging::open_image;
use crate::reader::DatasetKind;
use crate::store::{RecordStore, StoreWriter};
use crate::types::{ArticleProjection, FacenetDetails, Split, SplitName};

/// Number of faces stored per image.
pub const MAX_FACES: usize = 10;

/// Faces found on one image, most prominent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Detection {
    pub embeddings: Vec<Vec<f32>>,
    pub probs: Vec<f32>,
}

impl Detection {
    /// Keep the top [MAX_FACES] faces.
    pub fn into_details(self) -> FacenetDetails {
        let embeddings: Vec<Vec<f32>> = self.embeddings.into_iter().take(MAX_FACES).collect();
        let detect_probs: Vec<f32> = self.probs.into_iter().take(MAX_FACES).collect();
        FacenetDetails {
            n_faces: embeddings.len(),
            embeddings,
            detect_probs,
        }
    }
}

/// Face detection and embedding model.
pub trait FaceDetector {
    /// `None` when no face is found.
    fn detect(&self, image: &DynamicImage) -> Result<Option<Detection>, Error>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DetectionReport {
    pub detected: usize,
    /// Splits already carrying faces.
    pub existing: usize,
    pub no_faces: usize,
    pub skipped: usize,
    /// Detections lost because the document grew too large.
    pub dropped: usize,
}

fn image_path<S: RecordStore>(
    store: &S,
    dataset: DatasetKind,
    image_dir: &Path,
    split: &Split,
) -> Result<Option<PathBuf>, Error> {
    let projection = ArticleProjection::new(dataset.image_fields().iter().copied());
    let article = match dataset.article_id(split) {
        Some(id) => store.fetch_article(&id, &projection)?,
        None => None,
    };
    Ok(article.and_then(|a| dataset.image_path(image_dir, split, &a)))
}

/// Detect the faces of every split lacking them.
pub fn detect_faces<S, D>(
    store: &mut S,
    detector: &D,
    dataset: DatasetKind,
    image_dir: &Path,
) -> Result<DetectionReport, Error>
where
    S: RecordStore + StoreWriter,
    D: FaceDetector,
{
    let mut ids = Vec::new();
    for split_name in SplitName::ALL {
        ids.extend(store.fetch_split_ids(split_name, None)?);
    }
    info!("detecting faces on {} splits", ids.len());

    let mut report = DetectionReport::default();
    for id in ids {
        let split = match store.fetch_split(&id)? {
            Some(split) => split,
            None => {
                report.skipped += 1;
                continue;
            }
        };
        if split.facenet_details.is_some() {
            report.existing += 1;
            continue;
        }

        let path = match image_path(&*store, dataset, image_dir, &split)? {
            Some(path) => path,
            None => {
                warn!("no image for split {}", id);
                report.skipped += 1;
                continue;
            }
        };
        let image = match open_image(&path) {
            Ok(image) => image,
            Err(e) => {
                warn!("File {:?} not found: {}", path, e);
                report.skipped += 1;
                continue;
            }
        };

        let detection = match detector.detect(&image) {
            Ok(Some(d)) if !d.embeddings.is_empty() => d,
            Ok(_) => {
                report.no_faces += 1;
                continue;
            }
            Err(e) => {
                warn!("detection failed on {:?} from split {}: {}", path, id, e);
                report.skipped += 1;
                continue;
            }
        };

        match store.set_facenet_details(&id, &detection.into_details()) {
            Ok(()) => report.detected += 1,
            Err(Error::DocumentTooLarge { id, size }) => {
                warn!("Document too large: {} ({} bytes)", id, size);
                report.dropped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "{} splits with new faces, {} already done, {} without faces, {} skipped",
        report.detected, report.existing, report.no_faces, report.skipped
    );
    if report.dropped > 0 {
        error!(
            "{} detections were not stored (document too large)",
            report.dropped
        );
    }
    Ok(report)
}
