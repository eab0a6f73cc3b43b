//! Process-lifetime cache of the prepared hotspot table.
//!
//! The table is loaded at most once per [`HotspotCache`]. Concurrent first
//! callers wait on the same load; every later caller gets the same
//! [`Arc`]. There is no eviction or expiry.

use std::sync::Arc;

use road_safety_source::dataset_def::DatasetDefinition;
use tokio::sync::OnceCell;

use crate::{HotspotError, HotspotTable, PrepareOptions};

/// Lazily-initialized, single-assignment holder for one dataset's table.
pub struct HotspotCache {
    definition: DatasetDefinition,
    options: PrepareOptions,
    table: OnceCell<Arc<HotspotTable>>,
}

impl HotspotCache {
    #[must_use]
    pub fn new(definition: DatasetDefinition, options: PrepareOptions) -> Self {
        Self {
            definition,
            options,
            table: OnceCell::new(),
        }
    }

    /// Builds a cache that is already populated.
    #[must_use]
    pub fn with_table(definition: DatasetDefinition, table: HotspotTable) -> Self {
        Self {
            definition,
            options: PrepareOptions::default(),
            table: OnceCell::new_with(Some(Arc::new(table))),
        }
    }

    #[must_use]
    pub const fn definition(&self) -> &DatasetDefinition {
        &self.definition
    }

    /// Returns the table, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns the load error if the first load fails. The cache stays
    /// empty in that case.
    pub async fn get(&self) -> Result<Arc<HotspotTable>, HotspotError> {
        self.table
            .get_or_try_init(|| async {
                crate::load(&self.definition, &self.options)
                    .await
                    .map(Arc::new)
            })
            .await
            .cloned()
    }

    /// Returns the table if it has already been loaded.
    #[must_use]
    pub fn loaded(&self) -> Option<Arc<HotspotTable>> {
        self.table.get().cloned()
    }
}
