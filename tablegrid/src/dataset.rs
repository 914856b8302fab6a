use std::collections::HashSet;

use crate::{Error, Result, Row, RowId};

/// The in-memory row set, bounded by the shared buffer capacity.
///
/// Mutations validate before touching anything: a rejected `replace_all`/`append` leaves the
/// dataset unchanged.
#[derive(Clone, Debug)]
pub struct Dataset {
    rows: Vec<Row>,
    ids: HashSet<RowId>,
    capacity: usize,
}

impl Dataset {
    pub fn new(capacity: usize) -> Self {
        Self {
            rows: Vec::new(),
            ids: HashSet::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row at natural position `pos`.
    pub fn get(&self, pos: usize) -> Option<&Row> {
        self.rows.get(pos)
    }

    pub fn contains_id(&self, id: RowId) -> bool {
        self.ids.contains(&id)
    }

    pub(crate) fn replace_all(&mut self, rows: Vec<Row>) -> Result<()> {
        self.check_capacity(rows.len())?;
        let mut ids = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !ids.insert(row.id) {
                return Err(Error::DuplicateRowId { id: row.id });
            }
        }
        self.rows = rows;
        self.ids = ids;
        Ok(())
    }

    pub(crate) fn append(&mut self, rows: Vec<Row>) -> Result<()> {
        self.check_capacity(self.rows.len().saturating_add(rows.len()))?;
        let mut added = HashSet::with_capacity(rows.len());
        for row in &rows {
            if self.ids.contains(&row.id) || !added.insert(row.id) {
                return Err(Error::DuplicateRowId { id: row.id });
            }
        }
        self.ids.extend(added);
        self.rows.extend(rows);
        Ok(())
    }

    fn check_capacity(&self, requested: usize) -> Result<()> {
        if requested > self.capacity {
            return Err(Error::CapacityExceeded {
                requested,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
