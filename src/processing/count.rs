//! Face detection coverage per split.
use std::collections::BTreeMap;

use log::info;
use serde::Serialize;

use crate::error::Error;
use crate::store::RecordStore;
use crate::types::SplitName;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SplitCount {
    pub total: usize,
    /// Splits carrying `facenet_details`.
    pub with_faces: usize,
}

pub fn count_faces<S: RecordStore>(store: &S) -> Result<BTreeMap<SplitName, SplitCount>, Error> {
    let mut counts = BTreeMap::new();
    for split_name in SplitName::ALL {
        let mut count = SplitCount::default();
        for id in store.fetch_split_ids(split_name, None)? {
            if let Some(split) = store.fetch_split(&id)? {
                count.total += 1;
                if split.facenet_details.is_some() {
                    count.with_faces += 1;
                }
            }
        }
        info!("{}: {}/{} with faces", split_name, count.with_faces, count.total);
        counts.insert(split_name, count);
    }
    Ok(counts)
}
