use crate::object::{hash_string, Object, ObjectKind, ObjectRef, StringObject, StringRef};
use crate::table::Table;
use crate::value::Value;

pub const DEFAULT_GC_THRESHOLD: usize = 1024 * 1024;
const GC_HEAP_GROWTH_FACTOR: usize = 2;

/// Everything the collector must treat as reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct Roots<'a> {
  pub stack: &'a [Value],
  pub globals: Option<&'a Table>,
  pub constants: &'a [Value],
}

#[derive(Debug)]
struct Slot {
  generation: u32,
  object: Option<Object>,
}

/// Owns every object. Objects are threaded into one intrusive list through
/// their `next` handle, which the sweep walks.
#[derive(Debug)]
pub struct Heap {
  slots: Vec<Slot>,
  free_slots: Vec<usize>,
  head: Option<ObjectRef>,
  object_count: usize,

  /// Weak: entries are dropped when their string is collected
  strings: Table,

  gray_stack: Vec<ObjectRef>,
  bytes_allocated: usize,
  next_gc: usize,
  initial_gc: usize,
}

impl Heap {
  pub fn new() -> Self {
    Self::with_threshold(DEFAULT_GC_THRESHOLD)
  }

  /// A heap which first collects once `threshold` bytes are allocated.
  pub fn with_threshold(threshold: usize) -> Self {
    Self {
      slots: Vec::new(),
      free_slots: Vec::new(),
      head: None,
      object_count: 0,
      strings: Table::new(),
      gray_stack: Vec::new(),
      bytes_allocated: 0,
      next_gc: threshold,
      initial_gc: threshold,
    }
  }

  pub fn len(&self) -> usize {
    self.object_count
  }

  pub fn is_empty(&self) -> bool {
    self.object_count == 0
  }

  pub fn bytes_allocated(&self) -> usize {
    self.bytes_allocated
  }

  pub fn next_gc(&self) -> usize {
    self.next_gc
  }

  pub fn interned_count(&self) -> usize {
    self.strings.len()
  }

  pub fn contains(&self, object: ObjectRef) -> bool {
    self.get(object).is_some()
  }

  pub fn get(&self, object: ObjectRef) -> Option<&Object> {
    lookup(&self.slots, object)
  }

  fn get_mut(&mut self, object: ObjectRef) -> Option<&mut Object> {
    match self.slots.get_mut(object.index) {
      Some(slot) if slot.generation == object.generation => slot.object.as_mut(),
      _ => None,
    }
  }

  pub fn get_string(&self, object: ObjectRef) -> Option<&StringObject> {
    self.get(object).and_then(Object::as_string)
  }

  pub fn string_ref(&self, object: ObjectRef) -> Option<StringRef> {
    self.get_string(object).map(|string| StringRef {
      object,
      hash: string.hash(),
    })
  }

  /// Links a new object into the heap, collecting first if over the threshold.
  pub fn allocate(&mut self, kind: ObjectKind, roots: Roots) -> ObjectRef {
    if self.should_collect() {
      self.collect_garbage(roots);
    }

    let mut object = Object::new(kind);
    object.next = self.head;
    let size = object.size();

    let index = if let Some(index) = self.free_slots.pop() {
      self.slots[index].object = Some(object);
      index
    } else {
      self.slots.push(Slot {
        generation: 0,
        object: Some(object),
      });
      self.slots.len() - 1
    };

    let reference = ObjectRef {
      index,
      generation: self.slots[index].generation,
    };

    self.head = Some(reference);
    self.object_count += 1;
    self.bytes_allocated += size;

    if cfg!(feature = "debug-log-gc") {
      println!("{:?} allocate {} bytes", reference, size);
    }

    reference
  }

  /// The canonical string for the bytes, allocating only if none exists yet.
  pub fn intern(&mut self, bytes: &[u8], roots: Roots) -> StringRef {
    let hash = hash_string(bytes);

    match self.find_interned(bytes, hash) {
      Some(string) => string,
      None => self.allocate_string(Box::from(bytes), hash, roots),
    }
  }

  /// Like `intern`, but takes ownership of the buffer to avoid a copy.
  pub fn take_string(&mut self, bytes: Vec<u8>, roots: Roots) -> StringRef {
    let hash = hash_string(&bytes);

    match self.find_interned(&bytes, hash) {
      Some(string) => string,
      None => self.allocate_string(bytes.into_boxed_slice(), hash, roots),
    }
  }

  /// The interned string with these bytes, if one exists.
  pub fn find_string(&self, bytes: &[u8]) -> Option<StringRef> {
    self.find_interned(bytes, hash_string(bytes))
  }

  fn find_interned(&self, bytes: &[u8], hash: u32) -> Option<StringRef> {
    let slots = &self.slots;

    self.strings.find_string(hash, |object| {
      matches!(
        lookup(slots, object).and_then(Object::as_string),
        Some(string) if string.as_bytes() == bytes
      )
    })
  }

  fn allocate_string(&mut self, bytes: Box<[u8]>, hash: u32, roots: Roots) -> StringRef {
    let kind = ObjectKind::String(StringObject::with_hash(bytes, hash));
    let object = self.allocate(kind, roots);
    let string = StringRef { object, hash };

    self.strings.set(string, Value::Nil);
    string
  }

  pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
    match (a, b) {
      (Value::Nil, Value::Nil) => true,
      (Value::Boolean(a), Value::Boolean(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => match (self.get(*a), self.get(*b)) {
        (Some(first), Some(second)) => match (first.as_string(), second.as_string()) {
          (Some(first), Some(second)) => first == second,
          _ => a == b,
        },
        _ => a == b,
      },
      _ => false,
    }
  }

  pub fn format_value(&self, value: &Value) -> String {
    match value {
      Value::Nil => "nil".to_string(),
      Value::Boolean(value) => value.to_string(),
      Value::Number(value) => value.to_string(),
      Value::Object(object) => match self.get(*object) {
        Some(object) => object.to_string(),
        None => "<freed object>".to_string(),
      },
    }
  }

  pub fn should_collect(&self) -> bool {
    cfg!(feature = "debug-stress-gc") || self.bytes_allocated > self.next_gc
  }

  /// Mark and sweep. Returns the number of objects freed.
  pub fn collect_garbage(&mut self, roots: Roots) -> usize {
    let before = self.bytes_allocated;
    if cfg!(feature = "debug-log-gc") {
      println!("-- gc begin");
    }

    self.mark_roots(roots);
    self.trace_references();

    let slots = &self.slots;
    self
      .strings
      .remove_unmarked(|object| matches!(lookup(slots, object), Some(object) if object.is_marked));

    let freed = self.sweep();
    self.next_gc = (self.bytes_allocated * GC_HEAP_GROWTH_FACTOR).max(self.initial_gc);

    if cfg!(feature = "debug-log-gc") {
      println!("-- gc end");
      println!(
        "   collected {} bytes (from {} to {}) next at {}",
        before - self.bytes_allocated,
        before,
        self.bytes_allocated,
        self.next_gc
      );
    }

    freed
  }

  fn mark_roots(&mut self, roots: Roots) {
    for value in roots.stack {
      self.mark_value(value);
    }

    if let Some(globals) = roots.globals {
      for (key, value) in globals.iter() {
        self.mark_object(key.object);
        self.mark_value(&value);
      }
    }

    for value in roots.constants {
      self.mark_value(value);
    }
  }

  fn mark_value(&mut self, value: &Value) {
    if let Value::Object(object) = value {
      self.mark_object(*object);
    }
  }

  fn mark_object(&mut self, reference: ObjectRef) {
    if let Some(object) = self.get_mut(reference) {
      if object.is_marked {
        return;
      }

      object.is_marked = true;
      if cfg!(feature = "debug-log-gc") {
        println!("{:?} mark {}", reference, object);
      }

      self.gray_stack.push(reference);
    }
  }

  fn trace_references(&mut self) {
    while let Some(reference) = self.gray_stack.pop() {
      self.blacken_object(reference);
    }
  }

  fn blacken_object(&mut self, reference: ObjectRef) {
    let children = match self.get(reference) {
      Some(object) => object.references(),
      None => return,
    };

    for child in children {
      self.mark_object(child);
    }
  }

  fn sweep(&mut self) -> usize {
    let mut previous: Option<ObjectRef> = None;
    let mut current = self.head;
    let mut freed = 0;

    while let Some(reference) = current {
      let (is_marked, next) = match self.get_mut(reference) {
        Some(object) => {
          let is_marked = object.is_marked;
          object.is_marked = false;
          (is_marked, object.next)
        }
        None => break,
      };

      current = next;

      if is_marked {
        previous = Some(reference);
        continue;
      }

      match previous.and_then(|previous| self.get_mut(previous)) {
        Some(previous) => previous.next = next,
        None => self.head = next,
      }

      self.free(reference);
      freed += 1;
    }

    freed
  }

  fn free(&mut self, reference: ObjectRef) {
    let slot = match self.slots.get_mut(reference.index) {
      Some(slot) if slot.generation == reference.generation => slot,
      _ => return,
    };

    if let Some(object) = slot.object.take() {
      if cfg!(feature = "debug-log-gc") {
        println!("{:?} free {:?}", reference, object.get_type());
      }

      slot.generation = slot.generation.wrapping_add(1);
      self.free_slots.push(reference.index);
      self.object_count -= 1;
      self.bytes_allocated -= object.size();
    }
  }

  /// Frees every object by walking the intrusive list.
  pub fn free_objects(&mut self) {
    let mut current = self.head.take();

    while let Some(reference) = current {
      current = self.get(reference).and_then(|object| object.next);
      self.free(reference);
    }

    self.strings = Table::new();
    self.gray_stack.clear();
  }
}

impl Default for Heap {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for Heap {
  fn drop(&mut self) {
    self.free_objects();
  }
}

fn lookup(slots: &[Slot], object: ObjectRef) -> Option<&Object> {
  match slots.get(object.index) {
    Some(slot) if slot.generation == object.generation => slot.object.as_ref(),
    _ => None,
  }
}
