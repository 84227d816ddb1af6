//! Normalizer trait for uploaded data
//!
//! The view state controller does not know how uploads are decoded. It asks
//! a [`RecordNormalizer`] to turn raw bytes into a [`Dataset`], so the
//! spreadsheet reader in `tasklens-ingest` (or a stub in tests) can be
//! plugged in without the core depending on a file format library.

use crate::error::Result;
use crate::types::Dataset;

/// Turns uploaded bytes into a typed dataset.
///
/// Implementations must be all-or-nothing: either every row converts and a
/// complete dataset is returned, or an error is returned and nothing else
/// happens.
pub trait RecordNormalizer {
    /// Decode `raw_bytes`; `filename` is only used to pick the format.
    fn normalize(&self, raw_bytes: &[u8], filename: &str) -> Result<Dataset>;
}

impl<N: RecordNormalizer + ?Sized> RecordNormalizer for &N {
    fn normalize(&self, raw_bytes: &[u8], filename: &str) -> Result<Dataset> {
        (**self).normalize(raw_bytes, filename)
    }
}

impl<N: RecordNormalizer + ?Sized> RecordNormalizer for Box<N> {
    fn normalize(&self, raw_bytes: &[u8], filename: &str) -> Result<Dataset> {
        (**self).normalize(raw_bytes, filename)
    }
}
