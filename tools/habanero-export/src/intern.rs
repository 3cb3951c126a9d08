//! Name interning: `name -> id` plus a dense record array indexed by id.

use hashbrown::HashMap;

/// Append-only registry of named records.
///
/// Ids are handed out in first-insertion order starting at `base` and are
/// never reassigned.
#[derive(Debug, Clone)]
pub struct Interner<T> {
    base: u32,
    ids: HashMap<String, u32>,
    records: Vec<T>,
}

impl<T> Default for Interner<T> {
    fn default() -> Self {
        Self::with_base(0)
    }
}

impl<T> Interner<T> {
    /// Registry whose first id is `base` (ids below it are reserved).
    pub fn with_base(base: u32) -> Self {
        Self {
            base,
            ids: HashMap::new(),
            records: Vec::new(),
        }
    }

    /// Id of `name`, if interned.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.ids.get(name).copied()
    }

    /// Return the id for `name`, building its record with `make` on first sight.
    ///
    /// The flag is `true` when the record was created by this call.
    pub fn intern_with(&mut self, name: &str, make: impl FnOnce(u32) -> T) -> (u32, bool) {
        if let Some(&id) = self.ids.get(name) {
            return (id, false);
        }
        let id = self.base + self.records.len() as u32;
        self.records.push(make(id));
        self.ids.insert(name.to_owned(), id);
        (id, true)
    }

    pub fn record(&self, id: u32) -> Option<&T> {
        let index = id.checked_sub(self.base)? as usize;
        self.records.get(index)
    }

    pub fn record_mut(&mut self, id: u32) -> Option<&mut T> {
        let index = id.checked_sub(self.base)? as usize;
        self.records.get_mut(index)
    }

    /// Whether `id` names an interned record.
    pub fn contains_id(&self, id: u32) -> bool {
        self.record(id).is_some()
    }

    /// Records in id order.
    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
