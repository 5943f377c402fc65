use crate::object::{ObjectRef, StringRef};
use crate::value::Value;

const TABLE_MAX_LOAD: f64 = 0.75;
const MIN_CAPACITY: usize = 8;

#[derive(Debug, Clone, Copy)]
enum Entry {
  Empty,
  Tombstone,
  Occupied { key: StringRef, value: Value },
}

/// Open addressing hash table keyed by interned strings.
///
/// Keys compare by handle, which is only sound because every string is
/// interned before it is used as a key.
#[derive(Debug, Clone, Default)]
pub struct Table {
  /// Occupied slots plus tombstones
  count: usize,
  /// Occupied slots
  live: usize,
  entries: Vec<Entry>,
}

impl Table {
  pub fn new() -> Self {
    Self {
      count: 0,
      live: 0,
      entries: Vec::new(),
    }
  }

  pub fn capacity(&self) -> usize {
    self.entries.len()
  }

  /// Number of live entries.
  pub fn len(&self) -> usize {
    self.live
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  pub fn load_factor(&self) -> f64 {
    if self.entries.is_empty() {
      0.0
    } else {
      self.count as f64 / self.entries.len() as f64
    }
  }

  pub fn get(&self, key: StringRef) -> Option<Value> {
    if self.entries.is_empty() {
      return None;
    }

    match self.entries[find_entry(&self.entries, key)] {
      Entry::Occupied { value, .. } => Some(value),
      _ => None,
    }
  }

  /// Inserts or overwrites, returning true if the key was not present before.
  pub fn set(&mut self, key: StringRef, value: Value) -> bool {
    if (self.count + 1) as f64 > self.entries.len() as f64 * TABLE_MAX_LOAD {
      let capacity = grow_capacity(self.entries.len());
      self.adjust_capacity(capacity);
    }

    let index = find_entry(&self.entries, key);
    let is_new_key = match self.entries[index] {
      Entry::Empty => {
        self.count += 1;
        true
      }
      // a reused tombstone is already counted
      Entry::Tombstone => true,
      Entry::Occupied { .. } => false,
    };

    if is_new_key {
      self.live += 1;
    }

    self.entries[index] = Entry::Occupied { key, value };
    is_new_key
  }

  pub fn delete(&mut self, key: StringRef) -> bool {
    if self.entries.is_empty() {
      return false;
    }

    let index = find_entry(&self.entries, key);
    if let Entry::Occupied { .. } = self.entries[index] {
      self.entries[index] = Entry::Tombstone;
      self.live -= 1;
      true
    } else {
      false
    }
  }

  pub fn add_all(&self, to: &mut Table) {
    for (key, value) in self.iter() {
      to.set(key, value);
    }
  }

  /// Looks up a key by content rather than by handle, used when interning.
  pub fn find_string(
    &self,
    hash: u32,
    matches: impl Fn(ObjectRef) -> bool,
  ) -> Option<StringRef> {
    if self.entries.is_empty() {
      return None;
    }

    let capacity = self.entries.len();
    let mut index = hash as usize % capacity;

    loop {
      match self.entries[index] {
        Entry::Empty => return None,
        Entry::Occupied { key, .. } if key.hash == hash && matches(key.object) => {
          return Some(key)
        }
        Entry::Occupied { .. } | Entry::Tombstone => {}
      }

      index = (index + 1) % capacity;
    }
  }

  /// Deletes every entry whose key the collector did not reach.
  pub fn remove_unmarked(&mut self, is_marked: impl Fn(ObjectRef) -> bool) -> usize {
    let mut removed = 0;

    for entry in &mut self.entries {
      if let Entry::Occupied { key, .. } = entry {
        if !is_marked(key.object) {
          *entry = Entry::Tombstone;
          removed += 1;
        }
      }
    }

    self.live -= removed;
    removed
  }

  pub fn iter(&self) -> impl Iterator<Item = (StringRef, Value)> + '_ {
    self.entries.iter().filter_map(|entry| match entry {
      Entry::Occupied { key, value } => Some((*key, *value)),
      _ => None,
    })
  }

  fn adjust_capacity(&mut self, capacity: usize) {
    let old_entries = std::mem::replace(&mut self.entries, vec![Entry::Empty; capacity]);

    // tombstones are dropped, so they no longer count towards the load
    self.count = 0;
    for entry in old_entries {
      if let Entry::Occupied { key, value } = entry {
        let index = find_entry(&self.entries, key);
        self.entries[index] = Entry::Occupied { key, value };
        self.count += 1;
      }
    }
  }
}

fn grow_capacity(capacity: usize) -> usize {
  if capacity < MIN_CAPACITY {
    MIN_CAPACITY
  } else {
    capacity * 2
  }
}

/// Index of the slot holding the key, or the slot it should be inserted into.
fn find_entry(entries: &[Entry], key: StringRef) -> usize {
  let capacity = entries.len();
  let mut index = key.hash as usize % capacity;
  let mut tombstone = None;

  loop {
    match entries[index] {
      Entry::Empty => return tombstone.unwrap_or(index),
      Entry::Tombstone => {
        if tombstone.is_none() {
          tombstone = Some(index);
        }
      }
      Entry::Occupied { key: existing, .. } if existing.object == key.object => return index,
      Entry::Occupied { .. } => {}
    }

    index = (index + 1) % capacity;
  }
}

#[cfg(test)]
mod test {
  use super::Table;
  use crate::object::{ObjectRef, StringRef};
  use crate::value::Value;

  fn key(index: u32, hash: u32) -> StringRef {
    StringRef {
      object: ObjectRef {
        index: index as usize,
        generation: 0,
      },
      hash,
    }
  }

  fn number(value: Option<Value>) -> Option<f64> {
    match value {
      Some(Value::Number(number)) => Some(number),
      _ => None,
    }
  }

  #[test]
  fn empty_table_is_never_probed() {
    let mut table = Table::new();

    assert_eq!(table.capacity(), 0);
    assert!(table.get(key(0, 1)).is_none());
    assert!(!table.delete(key(0, 1)));
    assert!(table.find_string(1, |_| true).is_none());
  }

  #[test]
  fn set_get_and_overwrite() {
    let mut table = Table::new();

    assert!(table.set(key(0, 10), Value::from(1.0)));
    assert!(table.set(key(1, 11), Value::from(2.0)));
    assert!(!table.set(key(0, 10), Value::from(3.0)));

    assert_eq!(number(table.get(key(0, 10))), Some(3.0));
    assert_eq!(number(table.get(key(1, 11))), Some(2.0));
    assert!(table.get(key(2, 12)).is_none());
    assert_eq!(table.len(), 2);
  }

  #[test]
  fn keys_compare_by_handle_not_hash() {
    let mut table = Table::new();

    table.set(key(0, 7), Value::from(1.0));
    table.set(key(1, 7), Value::from(2.0));

    assert_eq!(number(table.get(key(0, 7))), Some(1.0));
    assert_eq!(number(table.get(key(1, 7))), Some(2.0));
  }

  #[test]
  fn delete_leaves_a_tombstone_for_later_probes() {
    let mut table = Table::new();

    // all collide into the same bucket
    table.set(key(0, 3), Value::from(1.0));
    table.set(key(1, 3), Value::from(2.0));
    table.set(key(2, 3), Value::from(3.0));

    assert!(table.delete(key(1, 3)));
    assert!(!table.delete(key(1, 3)));

    assert!(table.get(key(1, 3)).is_none());
    assert_eq!(number(table.get(key(2, 3))), Some(3.0));

    // the tombstone slot is reused, and the count is not bumped twice
    let load = table.load_factor();
    assert!(table.set(key(1, 3), Value::from(4.0)));
    assert_eq!(table.load_factor(), load);
    assert_eq!(number(table.get(key(1, 3))), Some(4.0));
  }

  #[test]
  fn set_after_tombstone_does_not_duplicate_existing_key() {
    let mut table = Table::new();

    table.set(key(0, 5), Value::from(1.0));
    table.set(key(1, 5), Value::from(2.0));
    table.delete(key(0, 5));

    assert!(!table.set(key(1, 5), Value::from(3.0)));
    assert_eq!(table.len(), 1);
    assert_eq!(number(table.get(key(1, 5))), Some(3.0));
  }

  #[test]
  fn load_factor_stays_below_limit() {
    let mut table = Table::new();

    for index in 0..1000 {
      table.set(key(index, index.wrapping_mul(2_654_435_761)), Value::from(f64::from(index)));
      assert!(table.load_factor() <= 0.75);

      if index % 3 == 0 {
        table.delete(key(index, index.wrapping_mul(2_654_435_761)));
        assert!(table.load_factor() <= 0.75);
      }
    }

    for index in 0..1000 {
      let found = number(table.get(key(index, index.wrapping_mul(2_654_435_761))));
      if index % 3 == 0 {
        assert!(found.is_none());
      } else {
        assert_eq!(found, Some(f64::from(index)));
      }
    }
  }

  #[test]
  fn growth_drops_tombstones() {
    let mut table = Table::new();

    for index in 0..6 {
      table.set(key(index, index), Value::Nil);
    }
    for index in 0..5 {
      table.delete(key(index, index));
    }
    assert_eq!(table.capacity(), 8);
    assert_eq!(table.load_factor(), 0.75);

    table.set(key(10, 10), Value::Nil);
    assert_eq!(table.capacity(), 16);
    assert_eq!(table.load_factor(), 2.0 / 16.0);
    assert_eq!(table.len(), 2);
  }

  #[test]
  fn add_all_copies_live_entries() {
    let mut from = Table::new();
    let mut to = Table::new();

    from.set(key(0, 0), Value::from(1.0));
    from.set(key(1, 1), Value::from(2.0));
    from.delete(key(1, 1));
    to.set(key(2, 2), Value::from(3.0));

    from.add_all(&mut to);

    assert_eq!(to.len(), 2);
    assert_eq!(number(to.get(key(0, 0))), Some(1.0));
    assert!(to.get(key(1, 1)).is_none());
  }

  #[test]
  fn find_string_by_content() {
    let mut table = Table::new();
    table.set(key(0, 42), Value::Nil);
    table.set(key(1, 42), Value::Nil);

    let found = table.find_string(42, |object| object.index == 1);
    assert_eq!(found, Some(key(1, 42)));
    assert!(table.find_string(43, |_| true).is_none());
  }

  #[test]
  fn remove_unmarked_keys() {
    let mut table = Table::new();
    table.set(key(0, 0), Value::Nil);
    table.set(key(1, 1), Value::Nil);

    assert_eq!(table.remove_unmarked(|object| object.index == 1), 1);
    assert!(table.get(key(0, 0)).is_none());
    assert!(table.get(key(1, 1)).is_some());
    assert_eq!(table.len(), 1);
  }

  #[test]
  fn len_counts_live_entries_only() {
    let mut table = Table::new();
    assert!(table.is_empty());

    for i in 0..20 {
      table.set(key(i, i % 3), Value::Nil);
    }
    table.set(key(4, 1), Value::from(1.0));
    assert_eq!(table.len(), 20);

    for i in 0..10 {
      table.delete(key(i, i % 3));
    }
    table.delete(key(0, 0));
    assert_eq!(table.len(), 10);

    // reuses tombstones, then grows
    for i in 0..30 {
      table.set(key(i, i % 3), Value::Nil);
    }
    assert_eq!(table.len(), 30);

    table.remove_unmarked(|object| object.index % 2 == 0);
    assert_eq!(table.len(), 15);
    assert_eq!(table.len(), table.iter().count());
  }
}
