use serde::Serialize;

/// Fill value used when rectangularizing embeddings for batching.
///
/// NaN keeps padding distinguishable from a real `0.0` feature.
pub const PADDING_VALUE: f32 = f32::NAN;

/// Selected embeddings of one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Embeddings {
    /// No rows, no columns.
    Empty,
    /// Non empty list of rows.
    Present(Vec<Vec<f32>>),
}

impl Embeddings {
    pub fn from_rows(rows: Vec<Vec<f32>>) -> Self {
        if rows.is_empty() {
            Embeddings::Empty
        } else {
            Embeddings::Present(rows)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Embeddings::Empty)
    }

    pub fn rows(&self) -> usize {
        match self {
            Embeddings::Empty => 0,
            Embeddings::Present(rows) => rows.len(),
        }
    }

    /// Width of the widest row.
    pub fn cols(&self) -> usize {
        self.as_rows().iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn as_rows(&self) -> &[Vec<f32>] {
        match self {
            Embeddings::Empty => &[],
            Embeddings::Present(rows) => rows,
        }
    }

    /// `rows x cols` copy, filled with [PADDING_VALUE] where there is no data.
    /// Data outside of the requested shape is cut.
    pub fn padded(&self, rows: usize, cols: usize) -> Vec<Vec<f32>> {
        (0..rows)
            .map(|r| {
                let src = self.as_rows().get(r).map(Vec::as_slice).unwrap_or(&[]);
                (0..cols)
                    .map(|c| src.get(c).copied().unwrap_or(PADDING_VALUE))
                    .collect()
            })
            .collect()
    }

    /// Pad every item to the largest shape of the batch.
    pub fn pad_batch(batch: &[&Embeddings]) -> Vec<Vec<Vec<f32>>> {
        let rows = batch.iter().map(|e| e.rows()).max().unwrap_or(0);
        let cols = batch.iter().map(|e| e.cols()).max().unwrap_or(0);
        batch.iter().map(|e| e.padded(rows, cols)).collect()
    }
}
