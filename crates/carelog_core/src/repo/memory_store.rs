//! In-memory collection store.
//!
//! Used as a test double and for callers that feed the aggregator from data
//! already held in memory. Every operation is immediately visible.

use crate::model::collection::{Collection, RowId, StoredRow};
use crate::repo::collection_store::{CollectionStore, StoreError, StoreResult};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryCollectionStore {
    collections: BTreeMap<Collection, Vec<StoredRow>>,
}

impl MemoryCollectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store preloaded with raw rows (header first) for one collection.
    pub fn with_rows(mut self, collection: Collection, rows: Vec<Vec<String>>) -> Self {
        self.collections
            .insert(collection, rows.into_iter().map(StoredRow::new).collect());
        self
    }

    /// Cells of every row, header included.
    pub fn cells(&self, collection: Collection) -> Vec<Vec<String>> {
        self.collections
            .get(&collection)
            .map(|rows| rows.iter().map(|row| row.cells.clone()).collect())
            .unwrap_or_default()
    }
}

impl CollectionStore for MemoryCollectionStore {
    fn read_all(&self, collection: Collection) -> StoreResult<Vec<StoredRow>> {
        Ok(self
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    fn clear(&mut self, collection: Collection) -> StoreResult<()> {
        self.collections.remove(&collection);
        Ok(())
    }

    fn append_row(&mut self, collection: Collection, cells: Vec<String>) -> StoreResult<RowId> {
        let row = StoredRow::new(cells);
        let row_id = row.id;
        self.collections.entry(collection).or_default().push(row);
        Ok(row_id)
    }

    fn update_cell(
        &mut self,
        collection: Collection,
        row_id: RowId,
        column: usize,
        value: String,
    ) -> StoreResult<()> {
        let row = self
            .collections
            .get_mut(&collection)
            .and_then(|rows| rows.iter_mut().find(|row| row.id == row_id))
            .ok_or(StoreError::RowNotFound { collection, row_id })?;
        if row.cells.len() <= column {
            row.cells.resize(column + 1, String::new());
        }
        row.cells[column] = value;
        Ok(())
    }

    fn replace_all(&mut self, collection: Collection, rows: Vec<Vec<String>>) -> StoreResult<()> {
        self.collections
            .insert(collection, rows.into_iter().map(StoredRow::new).collect());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryCollectionStore;
    use crate::model::collection::Collection;
    use crate::repo::collection_store::{CollectionStore, StoreError};
    use uuid::Uuid;

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn update_cell_addresses_rows_by_id_and_pads() {
        let mut store = MemoryCollectionStore::new();
        store
            .append_row(Collection::Growth, row(&["Username", "Log Date"]))
            .unwrap();
        let target = store
            .append_row(Collection::Growth, row(&["alice", "2024-01-01"]))
            .unwrap();

        store
            .update_cell(Collection::Growth, target, 3, "65".to_string())
            .unwrap();

        let cells = store.cells(Collection::Growth);
        assert_eq!(cells[1], row(&["alice", "2024-01-01", "", "65"]));
    }

    #[test]
    fn update_cell_unknown_row_is_not_found() {
        let mut store = MemoryCollectionStore::new();
        let err = store
            .update_cell(Collection::Users, Uuid::new_v4(), 0, "x".to_string())
            .unwrap_err();
        assert!(matches!(err, StoreError::RowNotFound { .. }));
    }
}
