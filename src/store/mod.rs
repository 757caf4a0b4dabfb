pub mod error;
#[cfg(feature = "network")]
pub mod http_store;
pub mod json_store;
pub mod memory_store;
pub mod schema;
pub mod sync;

use std::sync::Arc;

use crate::store::error::StoreResult;
use crate::store::schema::{PlayerProgress, ProgressRecord};

/// A collection of player progress documents.
///
/// `update` replaces the whole document and must reject the write when the
/// stored version is not `expected_version`.
pub trait ProgressRepository {
    fn list(&self) -> StoreResult<Vec<ProgressRecord>>;

    fn create(&self, initial: &PlayerProgress) -> StoreResult<ProgressRecord>;

    fn update(
        &self,
        id: &str,
        expected_version: u64,
        progress: &PlayerProgress,
    ) -> StoreResult<ProgressRecord>;
}

macro_rules! forward_repository {
    ($ptr:ident) => {
        impl<T: ProgressRepository + ?Sized> ProgressRepository for $ptr<T> {
            fn list(&self) -> StoreResult<Vec<ProgressRecord>> {
                (**self).list()
            }

            fn create(&self, initial: &PlayerProgress) -> StoreResult<ProgressRecord> {
                (**self).create(initial)
            }

            fn update(
                &self,
                id: &str,
                expected_version: u64,
                progress: &PlayerProgress,
            ) -> StoreResult<ProgressRecord> {
                (**self).update(id, expected_version, progress)
            }
        }
    };
}

forward_repository!(Box);
forward_repository!(Arc);

pub(crate) fn new_record_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}
