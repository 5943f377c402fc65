use crate::object::{ObjectRef, StringRef};

#[derive(Debug, Clone, Copy)]
pub enum Value {
  Nil,
  Boolean(bool),
  Number(f64),
  Object(ObjectRef),
}

impl Value {
  pub fn is_number(&self) -> bool {
    matches!(self, Value::Number(_))
  }

  pub fn is_nil(&self) -> bool {
    matches!(self, Value::Nil)
  }

  pub fn is_object(&self) -> bool {
    matches!(self, Value::Object(_))
  }

  pub fn as_object(&self) -> Option<ObjectRef> {
    match self {
      Value::Object(object) => Some(*object),
      _ => None,
    }
  }

  pub fn is_falsy(&self) -> bool {
    matches!(self, Value::Nil | Value::Boolean(false))
  }

  pub fn get_type(&self) -> &'static str {
    match self {
      Value::Nil => "nil",
      Value::Boolean(_) => "boolean",
      Value::Number(_) => "number",
      Value::Object(_) => "object",
    }
  }

  /// Identity comparison: objects are only the same when they share a handle.
  ///
  /// Strings with equal content compare equal through the heap, see
  /// `Heap::values_equal`.
  pub fn is_same(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Nil, Value::Nil) => true,
      (Value::Boolean(value), Value::Boolean(other)) => value == other,
      (Value::Number(value), Value::Number(other)) => value.to_bits() == other.to_bits(),
      (Value::Object(value), Value::Object(other)) => value == other,
      _ => false,
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Self::Boolean(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Self::Number(value)
  }
}

impl From<()> for Value {
  fn from(_: ()) -> Self {
    Self::Nil
  }
}

impl From<ObjectRef> for Value {
  fn from(value: ObjectRef) -> Self {
    Self::Object(value)
  }
}

impl From<StringRef> for Value {
  fn from(value: StringRef) -> Self {
    Self::Object(value.object)
  }
}
