use crate::error::StoreError;
use crate::model::{Connection, Shelter, Year};

/// Source of shelter and connection records.
///
/// The engine treats the store as two read functions. Implementations are
/// expected to filter connections to `year <= year_cutoff`; the engine
/// re-applies the filter regardless.
pub trait RecordStore {
    fn read_shelters(&self) -> Result<Vec<Shelter>, StoreError>;

    fn read_connections(&self, year_cutoff: Year) -> Result<Vec<Connection>, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn read_shelters(&self) -> Result<Vec<Shelter>, StoreError> {
        (**self).read_shelters()
    }

    fn read_connections(&self, year_cutoff: Year) -> Result<Vec<Connection>, StoreError> {
        (**self).read_connections(year_cutoff)
    }
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn read_shelters(&self) -> Result<Vec<Shelter>, StoreError> {
        (**self).read_shelters()
    }

    fn read_connections(&self, year_cutoff: Year) -> Result<Vec<Connection>, StoreError> {
        (**self).read_connections(year_cutoff)
    }
}

/// Record store backed by two in-memory vectors.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shelters: Vec<Shelter>,
    connections: Vec<Connection>,
}

impl MemoryStore {
    pub fn new(shelters: Vec<Shelter>, connections: Vec<Connection>) -> Self {
        Self {
            shelters,
            connections,
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }
}

impl RecordStore for MemoryStore {
    fn read_shelters(&self) -> Result<Vec<Shelter>, StoreError> {
        Ok(self.shelters.clone())
    }

    fn read_connections(&self, year_cutoff: Year) -> Result<Vec<Connection>, StoreError> {
        Ok(self
            .connections
            .iter()
            .filter(|c| c.year <= year_cutoff)
            .cloned()
            .collect())
    }
}
