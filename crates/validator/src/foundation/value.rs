//! Live values traversed by the validator
//!
//! A [`Value`] is the dynamic view of an instance graph. Scalars and lists are
//! owned; objects are shared handles so that hosts can model aliasing and
//! genuine reference cycles (`a.next = a`), which the traversal must survive.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

// ============================================================================
// TYPE NAME
// ============================================================================

/// Semantic type tag for declared and runtime types.
///
/// Cloning is a reference-count bump, so type names can be used freely as
/// cache keys and stored in every descriptor.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName(Arc<str>);

impl TypeName {
    /// Tag carried by objects that were built without a declared type.
    pub const ANONYMOUS: &'static str = "object";

    /// Creates a type name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// Returns the tag used for untyped objects.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the anonymous object tag.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.as_str() == Self::ANONYMOUS
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({})", self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl AsRef<str> for TypeName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// A dynamically typed value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text string. Never treated as enumerable.
    Text(String),
    /// Ordered collection, validated element by element.
    List(Vec<Value>),
    /// Shared object with a runtime type tag.
    Object(Object),
}

impl Value {
    /// Returns true if the value is absent.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content of `Int`/`Float` values.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the object handle, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Short label of the value's kind, used in type-mismatch diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Object(_) => "object",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Self::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ============================================================================
// OBJECT
// ============================================================================

/// Shared, mutable record with a runtime type tag.
///
/// Cloning an `Object` clones the handle, not the fields. Fields keep their
/// insertion order.
#[derive(Clone)]
pub struct Object {
    inner: Arc<ObjectInner>,
}

struct ObjectInner {
    type_name: TypeName,
    fields: RwLock<IndexMap<String, Value>>,
}

impl Object {
    /// Creates an empty object of the given runtime type.
    pub fn new(type_name: impl Into<TypeName>) -> Self {
        Self {
            inner: Arc::new(ObjectInner {
                type_name: type_name.into(),
                fields: RwLock::new(IndexMap::new()),
            }),
        }
    }

    /// Sets a field and returns the handle, for literal construction.
    #[must_use = "builder methods must be chained or built"]
    pub fn with(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets (or replaces) a field.
    pub fn set(&self, field: impl Into<String>, value: impl Into<Value>) {
        self.inner.fields.write().insert(field.into(), value.into());
    }

    /// Returns a clone of the field value, or `Value::Null` when missing.
    #[must_use]
    pub fn get(&self, field: &str) -> Value {
        self.inner
            .fields
            .read()
            .get(field)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Returns true if the field is present (even if null).
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.inner.fields.read().contains_key(field)
    }

    /// Returns the field names in insertion order.
    #[must_use]
    pub fn field_names(&self) -> Vec<String> {
        self.inner.fields.read().keys().cloned().collect()
    }

    /// Returns the runtime type of this object.
    #[must_use]
    pub fn type_name(&self) -> &TypeName {
        &self.inner.type_name
    }

    /// Returns true if both handles point at the same object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// Fields are not printed: object graphs may be cyclic.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("type_name", &self.inner.type_name.as_str())
            .field("fields", &self.field_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_fields_keep_insertion_order() {
        let obj = Object::new("Customer")
            .with("name", "Ada")
            .with("age", 36)
            .with("email", Value::Null);

        assert_eq!(obj.field_names(), vec!["name", "age", "email"]);
        assert_eq!(obj.get("name").as_text(), Some("Ada"));
        assert!(obj.get("missing").is_null());
        assert!(obj.contains("email"));
        assert!(!obj.contains("missing"));
    }

    #[test]
    fn test_object_handles_share_state() {
        let a = Object::new("Node");
        let alias = a.clone();
        alias.set("label", "x");

        assert!(a.ptr_eq(&alias));
        assert_eq!(a.get("label").as_text(), Some("x"));
    }

    #[test]
    fn test_cyclic_object_debug_terminates() {
        let node = Object::new("Node");
        node.set("next", node.clone());

        let rendered = format!("{node:?}");
        assert!(rendered.contains("Node"));
        assert!(rendered.contains("next"));
    }

    #[test]
    fn test_option_conversion() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some(3)).as_number(), Some(3.0));
    }

    #[test]
    fn test_type_name_anonymous() {
        assert!(TypeName::anonymous().is_anonymous());
        assert!(!TypeName::new("Order").is_anonymous());
        assert_eq!(TypeName::from("Order").to_string(), "Order");
    }
}
