//! Bitmask-indexed field set
//!
//! A fixed set of optional fields whose presence is kept in a `u32` mask
//! instead of being looked up in the dictionary. Values still live in a
//! backing [`DiffDictionary`], one entry per field, keyed by the flag name.
//! The mask of fields touched since tracking began travels as one extra
//! entry under [`BIT_STATE_KEY`].

use bitflags::Flags;
use std::borrow::Cow;
use tracing::debug;
use viewstate_core::{
    FromStateValue, Payload, StateValue, StatefulNode, ViewStateError, ViewStateResult,
};

use crate::bag::DiffDictionary;

/// Reserved dictionary key carrying the tracked-field mask
pub const BIT_STATE_KEY: &str = "_!SB";

/// Optional fields packed into a bitmask over a backing dictionary
#[derive(Debug, Clone)]
pub struct BitTrackedFieldSet<F> {
    bag: DiffDictionary,
    set: F,
    tracked: F,
}

impl<F> Default for BitTrackedFieldSet<F>
where
    F: Flags<Bits = u32> + Copy,
{
    fn default() -> Self {
        Self::with_bag(DiffDictionary::new())
    }
}

impl<F> BitTrackedFieldSet<F>
where
    F: Flags<Bits = u32> + Copy,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bag(bag: DiffDictionary) -> Self {
        Self {
            bag,
            set: F::empty(),
            tracked: F::empty(),
        }
    }

    /// Dictionary key backing `field`
    ///
    /// Declared flags use their declared name; anything else (a composite or
    /// undeclared mask) gets a synthetic key derived from its bits.
    pub fn field_key(field: F) -> Cow<'static, str> {
        let bits = field.bits();
        F::FLAGS
            .iter()
            .find(|flag| flag.value().bits() == bits && bits.count_ones() == 1)
            .map(|flag| Cow::Borrowed(flag.name()))
            .unwrap_or_else(|| Cow::Owned(format!("_!{:x}", bits)))
    }

    /// Declared single-bit field whose backing key is `key`
    fn field_for_key(key: &str) -> Option<F> {
        F::FLAGS
            .iter()
            .find(|flag| flag.name() == key && flag.value().bits().count_ones() == 1)
            .map(|flag| *flag.value())
    }

    /// Fields whose backing entries arrive as removals in `payload`
    fn removed_fields(payload: Option<&Payload>) -> F {
        let mut removed = F::empty();
        if let Some(diff) = payload.and_then(Payload::as_diff) {
            for field in diff
                .iter()
                .filter(|entry| entry.is_removal())
                .filter_map(|entry| Self::field_for_key(entry.key()))
            {
                removed.insert(field);
            }
        }
        removed
    }

    pub fn is_set(&self, field: F) -> bool {
        self.set.contains(field)
    }

    /// True if any field in `fields` is set
    pub fn any_set(&self, fields: F) -> bool {
        self.set.intersects(fields)
    }

    pub fn get(&self, field: F) -> Option<&StateValue> {
        if !self.is_set(field) {
            return None;
        }
        self.bag.get_value(&Self::field_key(field))
    }

    pub fn get_or<T: FromStateValue>(&self, field: F, default: T) -> ViewStateResult<T> {
        if !self.is_set(field) {
            return Ok(default);
        }
        self.bag.get_or(&Self::field_key(field), default)
    }

    pub fn put(&mut self, field: F, value: impl Into<StateValue>) {
        self.bag.set(&Self::field_key(field), value);
        self.set.insert(field);
        if self.bag.is_tracking() {
            self.tracked.insert(field);
        }
    }

    /// Mark `field` absent and drop its backing entry
    pub fn clear(&mut self, field: F) {
        self.set.remove(field);
        if self.bag.is_tracking() {
            self.tracked.remove(field);
        }
        self.bag.remove(&Self::field_key(field));
    }

    /// Clear every declared field and the stored mask
    pub fn reset(&mut self) {
        for flag in F::FLAGS {
            let value = *flag.value();
            if value.bits().count_ones() == 1 && self.set.contains(value) {
                self.bag.remove(flag.name());
            }
        }
        self.set = F::empty();
        self.tracked = F::empty();
        self.bag.remove(BIT_STATE_KEY);
    }

    /// True iff no field is set
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    pub fn set_fields(&self) -> F {
        self.set
    }

    pub fn tracked_fields(&self) -> F {
        self.tracked
    }

    /// Backing dictionary, for entries outside the bitmask
    pub fn bag(&self) -> &DiffDictionary {
        &self.bag
    }

    pub fn bag_mut(&mut self) -> &mut DiffDictionary {
        &mut self.bag
    }

    /// Apply the mask carried by an incoming payload, not an older one
    /// left in the dictionary by a previous load
    fn load_bit_state(&mut self, value: Option<&StateValue>) -> ViewStateResult<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let bits = value
            .as_int()
            .and_then(|i| u32::try_from(i).ok())
            .ok_or_else(|| {
                ViewStateError::corrupt(format!("field mask holds {}", value.type_name()))
            })?;
        let mask = F::from_bits(bits).ok_or_else(|| {
            ViewStateError::corrupt(format!("field mask {:#x} has undeclared bits", bits))
        })?;

        debug!(mask = bits, "field mask restored");
        self.set.insert(mask);
        self.tracked.insert(mask);
        Ok(())
    }
}

impl<F> StatefulNode for BitTrackedFieldSet<F>
where
    F: Flags<Bits = u32> + Copy,
{
    fn is_tracking(&self) -> bool {
        self.bag.is_tracking()
    }

    /// Opens a new dirty window; bits restored by an earlier `load` are
    /// baseline from here on
    fn begin_tracking(&mut self) {
        if !self.bag.is_tracking() {
            self.tracked = F::empty();
        }
        self.bag.begin_tracking();
    }

    fn save(&self) -> Option<Payload> {
        let mut diff = self.bag.diff();
        if !self.tracked.is_empty() {
            diff.upsert(BIT_STATE_KEY, StateValue::Int(i64::from(self.tracked.bits())));
        }
        if diff.is_empty() {
            None
        } else {
            Some(Payload::Diff(diff))
        }
    }

    fn load(&mut self, payload: Option<Payload>) -> ViewStateResult<()> {
        // a removal clears the presence bit; the mask only ever adds
        let removed = Self::removed_fields(payload.as_ref());
        let mask = payload
            .as_ref()
            .and_then(Payload::as_diff)
            .and_then(|diff| diff.value(BIT_STATE_KEY))
            .cloned();
        self.bag.load(payload)?;
        self.set.remove(removed);
        self.tracked.remove(removed);
        self.load_bit_state(mask.as_ref())
    }

    fn force_dirty(&mut self) {
        self.bag.set_dirty(true);
        self.tracked = self.set;
    }
}
