//! Positional collection of stateful items
//!
//! Appending under tracking is incremental: the new item is saved at its
//! index. Inserting, removing or clearing shifts positions, so the whole
//! collection is marked rebuilt and re-saved together with its length.
//! Every index appended since tracking began is reported, with or without
//! item state, so the counterpart grows to the same length.

use tracing::debug;
use viewstate_core::{ItemsPayload, Payload, StatefulNode, ViewStateError, ViewStateResult};

#[derive(Debug, Clone)]
pub struct StateCollection<T> {
    items: Vec<T>,
    tracking: bool,
    rebuilt: bool,
    /// Length when tracking began; indices at or past it were appended
    appended_from: usize,
}

impl<T> Default for StateCollection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            tracking: false,
            rebuilt: false,
            appended_from: 0,
        }
    }
}

impl<T: StatefulNode + Default> StateCollection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Whether a structural change forces a full re-save
    pub fn is_rebuilt(&self) -> bool {
        self.rebuilt
    }

    fn adopt(&self, item: &mut T) {
        if self.tracking {
            item.begin_tracking();
            item.force_dirty();
        }
    }

    /// Append an item, returning its index
    pub fn push(&mut self, mut item: T) -> usize {
        self.adopt(&mut item);
        self.items.push(item);
        self.items.len() - 1
    }

    /// Append a default item and hand it back for editing
    pub fn push_default(&mut self) -> &mut T {
        let index = self.push(T::default());
        &mut self.items[index]
    }

    pub fn insert(&mut self, index: usize, mut item: T) -> ViewStateResult<()> {
        if index > self.items.len() {
            return Err(ViewStateError::InvalidValue(format!(
                "insert index {} out of range for {} items",
                index,
                self.items.len()
            )));
        }
        if index == self.items.len() {
            self.push(item);
            return Ok(());
        }
        self.adopt(&mut item);
        self.items.insert(index, item);
        if self.tracking {
            self.set_dirty();
        }
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> ViewStateResult<T> {
        if index >= self.items.len() {
            return Err(ViewStateError::InvalidValue(format!(
                "remove index {} out of range for {} items",
                index,
                self.items.len()
            )));
        }
        let item = self.items.remove(index);
        if self.tracking {
            self.set_dirty();
        }
        Ok(item)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        if self.tracking {
            self.set_dirty();
        }
    }

    /// Mark the collection rebuilt and every item dirty
    pub fn set_dirty(&mut self) {
        self.rebuilt = true;
        for item in &mut self.items {
            item.force_dirty();
        }
    }

    fn is_appended(&self, index: usize) -> bool {
        self.tracking && !self.rebuilt && index >= self.appended_from
    }

    fn dirty_entries(&self) -> Vec<(usize, Option<Payload>)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let payload = item.save();
                (payload.is_some() || self.is_appended(index)).then_some((index, payload))
            })
            .collect()
    }

    fn load_rebuilt(&mut self, payload: ItemsPayload) -> ViewStateResult<()> {
        let mut items = Vec::with_capacity(payload.len);
        items.resize_with(payload.len, T::default);

        for (index, entry) in payload.entries {
            let item = items.get_mut(index).ok_or_else(|| {
                ViewStateError::corrupt(format!(
                    "item index {} outside rebuilt length {}",
                    index, payload.len
                ))
            })?;
            item.load(entry)?;
        }
        if self.tracking {
            for item in &mut items {
                item.begin_tracking();
            }
        }
        self.items = items;
        self.appended_from = self.items.len();
        Ok(())
    }

    fn load_incremental(&mut self, payload: ItemsPayload) -> ViewStateResult<()> {
        for (index, entry) in payload.entries {
            let len = self.items.len();
            if index > len {
                return Err(ViewStateError::SchemaMismatch {
                    expected: len,
                    found: index,
                });
            }
            if index == len {
                self.items.push(T::default());
            }
            let item = &mut self.items[index];
            item.load(entry)?;
            if self.tracking {
                item.begin_tracking();
            }
        }
        self.appended_from = self.items.len();
        Ok(())
    }
}

impl<T: StatefulNode + Default> StatefulNode for StateCollection<T> {
    fn is_tracking(&self) -> bool {
        self.tracking
    }

    fn begin_tracking(&mut self) {
        if !self.tracking {
            self.appended_from = self.items.len();
        }
        self.tracking = true;
        for item in &mut self.items {
            item.begin_tracking();
        }
    }

    fn save(&self) -> Option<Payload> {
        let entries = self.dirty_entries();
        if self.rebuilt {
            return Some(ItemsPayload::rebuilt(self.items.len(), entries).into());
        }
        if entries.is_empty() {
            None
        } else {
            Some(ItemsPayload::incremental(entries).into())
        }
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        let Some(payload) = payload else {
            return Ok(());
        };
        let payload = payload.into_items()?;
        debug!(
            rebuilt = payload.rebuilt,
            entries = payload.entries.len(),
            "collection loaded"
        );
        if payload.rebuilt {
            self.load_rebuilt(payload)
        } else {
            self.load_incremental(payload)
        }
    }

    fn force_dirty(&mut self) {
        self.set_dirty();
    }
}

impl<'a, T> IntoIterator for &'a StateCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
