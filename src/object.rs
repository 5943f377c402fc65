use std::fmt;

/// A handle to an object owned by the heap.
///
/// The generation is bumped whenever a slot is reused, so a handle to a freed
/// object can never resolve to the object which replaced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectRef {
  pub(crate) index: usize,
  pub(crate) generation: u32,
}

/// A handle to an interned string, carrying its precomputed hash so tables
/// can probe without visiting the heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StringRef {
  pub object: ObjectRef,
  pub hash: u32,
}

impl From<StringRef> for ObjectRef {
  fn from(string: StringRef) -> Self {
    string.object
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
  String,
}

#[derive(Debug)]
pub enum ObjectKind {
  String(StringObject),
}

#[derive(Debug)]
pub struct Object {
  pub(crate) is_marked: bool,
  pub(crate) next: Option<ObjectRef>,
  pub kind: ObjectKind,
}

impl Object {
  pub(crate) fn new(kind: ObjectKind) -> Self {
    Self {
      is_marked: false,
      next: None,
      kind,
    }
  }

  pub fn get_type(&self) -> ObjectType {
    match self.kind {
      ObjectKind::String(_) => ObjectType::String,
    }
  }

  pub fn as_string(&self) -> Option<&StringObject> {
    match &self.kind {
      ObjectKind::String(string) => Some(string),
    }
  }

  /// Approximate number of bytes this object keeps alive.
  pub(crate) fn size(&self) -> usize {
    let payload = match &self.kind {
      ObjectKind::String(string) => string.bytes.len(),
    };

    std::mem::size_of::<Self>() + payload
  }

  /// Objects directly referenced by this one.
  pub(crate) fn references(&self) -> Vec<ObjectRef> {
    match &self.kind {
      ObjectKind::String(_) => Vec::new(),
    }
  }
}

impl fmt::Display for Object {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match &self.kind {
      ObjectKind::String(string) => write!(f, "{}", string),
    }
  }
}

pub struct StringObject {
  bytes: Box<[u8]>,
  hash: u32,
}

impl StringObject {
  pub fn new(bytes: Box<[u8]>) -> Self {
    let hash = hash_string(&bytes);
    Self { bytes, hash }
  }

  pub(crate) fn with_hash(bytes: Box<[u8]>, hash: u32) -> Self {
    Self { bytes, hash }
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.bytes
  }

  pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(&self.bytes)
  }

  pub fn hash(&self) -> u32 {
    self.hash
  }

  pub fn len(&self) -> usize {
    self.bytes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bytes.is_empty()
  }
}

impl PartialEq for StringObject {
  fn eq(&self, other: &Self) -> bool {
    self.hash == other.hash && self.bytes == other.bytes
  }
}

impl fmt::Display for StringObject {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl fmt::Debug for StringObject {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.as_str())
  }
}

/// FNV-1a over the raw bytes.
pub fn hash_string(bytes: &[u8]) -> u32 {
  let mut hash: u32 = 2_166_136_261;
  for byte in bytes {
    hash ^= u32::from(*byte);
    hash = hash.wrapping_mul(16_777_619);
  }
  hash
}
