use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A record stored in an id-keyed [`Collection`].
pub trait Record: Clone {
    /// Collection name used in error messages.
    const COLLECTION: &'static str;

    fn id(&self) -> u32;

    /// Check the record's numeric fields.
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// A new record without an id yet.
pub trait Draft {
    type Record: Record;

    fn validate(&self) -> Result<(), ValidationError>;

    fn into_record(self, id: u32) -> Self::Record;
}

/// A partial update of an existing record.
pub trait Patch {
    type Record: Record;

    fn validate(&self) -> Result<(), ValidationError>;

    fn apply(&self, record: &mut Self::Record);
}

/// Ordered, id-keyed group of records belonging to one proposal section.
///
/// Insertion order is display order. Ids are unique within the collection
/// and new ids are always `max(existing) + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Record> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn ids(&self) -> Vec<u32> {
        self.items.iter().map(Record::id).collect()
    }

    /// Id the next inserted record will receive.
    ///
    /// Fails once the largest id is `u32::MAX`; ids are never reused below
    /// the current maximum.
    pub fn next_id(&self) -> Result<u32, ValidationError> {
        match self.items.iter().map(Record::id).max() {
            None => Ok(1),
            Some(max) => max.checked_add(1).ok_or(ValidationError::IdSpaceExhausted {
                collection: T::COLLECTION,
            }),
        }
    }

    /// Validate and append a draft. Returns the allocated id.
    pub fn add<D>(&mut self, draft: D) -> Result<u32, ValidationError>
    where
        D: Draft<Record = T>,
    {
        draft.validate()?;
        let id = self.next_id()?;
        self.items.push(draft.into_record(id));
        Ok(id)
    }

    /// Validate and apply a patch to the record with `id`.
    ///
    /// The patched record is checked as a whole before it replaces the
    /// stored one, so constraints spanning several fields hold.
    pub fn update<P>(&mut self, id: u32, patch: &P) -> Result<(), ValidationError>
    where
        P: Patch<Record = T>,
    {
        patch.validate()?;
        let record = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(ValidationError::UnknownItem {
                collection: T::COLLECTION,
                id,
            })?;
        let mut patched = record.clone();
        patch.apply(&mut patched);
        patched.validate()?;
        *record = patched;
        Ok(())
    }

    /// Remove every record whose id is in `ids`. Absent ids are ignored.
    /// Returns how many records were removed.
    pub fn remove(&mut self, ids: &BTreeSet<u32>) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !ids.contains(&item.id()));
        before - self.items.len()
    }

    /// Check id uniqueness and every record's own constraints.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id()) {
                return Err(ValidationError::DuplicateId {
                    collection: T::COLLECTION,
                    id: item.id(),
                });
            }
            item.validate()?;
        }
        Ok(())
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: Record> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
