//! Log arguments and freezing
//!
//! Arguments are either primitives, owned JSON snapshots, or shared composite
//! handles ([`SharedObject`], [`SharedList`]) the caller may keep mutating
//! after the log call. [`Value::freeze`] turns an argument into a [`Frozen`]
//! value whose top level no longer follows the caller's mutations.
//!
//! Freezing is shallow: a shared handle nested inside a frozen composite is
//! copied as a handle, so the nested data still follows the original.
//!
//! Handles may form cycles. Rendering, comparing and debug-printing a handle
//! that is already being visited yields [`CIRCULAR`] instead of recursing.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::thread::LocalKey;

use parking_lot::RwLock;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::Error;

/// Placeholder rendered for a handle that contains itself
pub const CIRCULAR: &str = "[Circular]";

thread_local! {
    static RENDERING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
    static COMPARING: RefCell<Vec<(usize, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a handle as being visited on this thread until dropped
struct Visit<K: PartialEq + Copy + 'static> {
    stack: &'static LocalKey<RefCell<Vec<K>>>,
    key: K,
}

impl<K: PartialEq + Copy + 'static> Visit<K> {
    /// `None` if `key` is already being visited
    fn enter(stack: &'static LocalKey<RefCell<Vec<K>>>, key: K) -> Option<Self> {
        stack.with(|visiting| {
            let mut visiting = visiting.borrow_mut();
            if visiting.contains(&key) {
                return None;
            }
            visiting.push(key);
            Some(Self { stack, key })
        })
    }
}

impl<K: PartialEq + Copy + 'static> Drop for Visit<K> {
    fn drop(&mut self) {
        self.stack.with(|visiting| {
            let mut visiting = visiting.borrow_mut();
            if let Some(pos) = visiting.iter().rposition(|key| *key == self.key) {
                visiting.remove(pos);
            }
        });
    }
}

fn addr<T>(inner: &Arc<T>) -> usize {
    Arc::as_ptr(inner) as *const () as usize
}

/// Argument passed to a log call
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// Owned snapshot of any serializable value
    Json(serde_json::Value),
    /// Mutable object shared with the caller
    Object(SharedObject),
    /// Mutable list shared with the caller
    List(SharedList),
}

impl Value {
    /// Snapshot any serializable value as an owned [`Value::Json`]
    pub fn from_serialize<T>(value: &T) -> Result<Self, Error>
    where
        T: Serialize + ?Sized,
    {
        Ok(Value::Json(serde_json::to_value(value)?))
    }

    /// Whether this value is shared with the caller and needs a snapshot
    pub fn is_composite(&self) -> bool {
        matches!(self, Value::Object(_) | Value::List(_))
    }

    /// Take a shallow snapshot of this value
    ///
    /// Primitives and owned JSON pass through unchanged. Shared composites
    /// have their direct entries copied out at this moment.
    pub fn freeze(self) -> Frozen {
        match self {
            Value::Object(object) => Frozen::Object(object.snapshot()),
            Value::List(list) => Frozen::List(list.snapshot()),
            other => Frozen::Value(other),
        }
    }

    /// Current JSON representation, following shared handles
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            // JSON has no NaN or infinities
            Value::Float(f) if !f.is_finite() => serializer.serialize_str(&f.to_string()),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Json(json) => json.serialize(serializer),
            Value::Object(object) => object.serialize(serializer),
            Value::List(list) => list.serialize(serializer),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Strings render bare, like a console does for a top level string
            Value::Str(s) => f.write_str(s),
            Value::Json(serde_json::Value::String(s)) => f.write_str(s),
            Value::Float(x) if !x.is_finite() => write!(f, "{x}"),
            other => write_json(f, other),
        }
    }
}

fn write_json<T: Serialize>(f: &mut fmt::Formatter<'_>, value: &T) -> fmt::Result {
    let json = serde_json::to_string(value).map_err(|_| fmt::Error)?;
    f.write_str(&json)
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Str(s.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(i: $ty) -> Self {
                    Value::Int(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<u64> for Value {
    fn from(i: u64) -> Self {
        match i64::try_from(i) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::Float(i as f64),
        }
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        Value::from(i as u64)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::Json(json)
    }
}

impl From<SharedObject> for Value {
    fn from(object: SharedObject) -> Self {
        Value::Object(object)
    }
}

impl From<&SharedObject> for Value {
    fn from(object: &SharedObject) -> Self {
        Value::Object(object.clone())
    }
}

impl From<SharedList> for Value {
    fn from(list: SharedList) -> Self {
        Value::List(list)
    }
}

impl From<&SharedList> for Value {
    fn from(list: &SharedList) -> Self {
        Value::List(list.clone())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Object handle shared between the caller and anything it was logged to
///
/// Cloning the handle does not copy the entries.
#[derive(Clone, Default)]
pub struct SharedObject {
    inner: Arc<RwLock<BTreeMap<String, Value>>>,
}

impl SharedObject {
    /// Empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().insert(key.into(), value.into())
    }

    /// Current value of `key`
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Remove `key`
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().remove(key)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the object has no entries
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Whether both handles point at the same object
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy of the direct entries; nested handles are copied as handles
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.inner.read().clone()
    }
}

impl PartialEq for SharedObject {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        // A pair already under comparison is assumed equal until shown otherwise
        match Visit::enter(&COMPARING, (addr(&self.inner), addr(&other.inner))) {
            Some(_visit) => self.snapshot() == other.snapshot(),
            None => true,
        }
    }
}

impl fmt::Debug for SharedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Visit::enter(&RENDERING, addr(&self.inner)) {
            Some(_visit) => f.debug_map().entries(self.snapshot()).finish(),
            None => f.write_str(CIRCULAR),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for SharedObject
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect::<BTreeMap<_, _>>();

        Self {
            inner: Arc::new(RwLock::new(entries)),
        }
    }
}

impl Serialize for SharedObject {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let Some(_visit) = Visit::enter(&RENDERING, addr(&self.inner)) else {
            return serializer.serialize_str(CIRCULAR);
        };
        // Serialize a snapshot so the lock is not held across nested handles
        serialize_map(&self.snapshot(), serializer)
    }
}

/// List handle shared between the caller and anything it was logged to
#[derive(Clone, Default)]
pub struct SharedList {
    inner: Arc<RwLock<Vec<Value>>>,
}

impl SharedList {
    /// Empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value`
    pub fn push(&self, value: impl Into<Value>) {
        self.inner.write().push(value.into());
    }

    /// Replace the item at `index`, returning the old item if it existed
    pub fn set(&self, index: usize, value: impl Into<Value>) -> Option<Value> {
        let mut items = self.inner.write();
        let slot = items.get_mut(index)?;
        Some(std::mem::replace(slot, value.into()))
    }

    /// Current item at `index`
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner.read().get(index).cloned()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Whether both handles point at the same list
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Copy of the items; nested handles are copied as handles
    pub fn snapshot(&self) -> Vec<Value> {
        self.inner.read().clone()
    }
}

impl PartialEq for SharedList {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match Visit::enter(&COMPARING, (addr(&self.inner), addr(&other.inner))) {
            Some(_visit) => self.snapshot() == other.snapshot(),
            None => true,
        }
    }
}

impl fmt::Debug for SharedList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Visit::enter(&RENDERING, addr(&self.inner)) {
            Some(_visit) => f.debug_list().entries(self.snapshot()).finish(),
            None => f.write_str(CIRCULAR),
        }
    }
}

impl<V> FromIterator<V> for SharedList
where
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self {
            inner: Arc::new(RwLock::new(iter.into_iter().map(Into::into).collect())),
        }
    }
}

impl Serialize for SharedList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let Some(_visit) = Visit::enter(&RENDERING, addr(&self.inner)) else {
            return serializer.serialize_str(CIRCULAR);
        };
        serialize_seq(&self.snapshot(), serializer)
    }
}

/// Argument as handed to a [`Console`](crate::console::Console)
#[derive(Debug, Clone, PartialEq)]
pub enum Frozen {
    /// Primitive or owned snapshot, passed through as is
    Value(Value),
    /// Entries of a shared object at the time of the log call
    Object(BTreeMap<String, Value>),
    /// Items of a shared list at the time of the log call
    List(Vec<Value>),
}

impl Frozen {
    /// JSON representation
    ///
    /// Nested shared handles are rendered with their current content.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for Frozen {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Frozen::Value(value) => value.serialize(serializer),
            Frozen::Object(entries) => serialize_map(entries, serializer),
            Frozen::List(items) => serialize_seq(items, serializer),
        }
    }
}

impl fmt::Display for Frozen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frozen::Value(value) => value.fmt(f),
            other => write_json(f, other),
        }
    }
}

impl From<&str> for Frozen {
    fn from(s: &str) -> Self {
        Frozen::Value(s.into())
    }
}

fn serialize_map<S>(entries: &BTreeMap<String, Value>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (key, value) in entries {
        map.serialize_entry(key, value)?;
    }
    map.end()
}

fn serialize_seq<S>(items: &[Value], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_primitives_pass_through_freeze() {
        assert_eq!(Value::from(7).freeze(), Frozen::Value(Value::Int(7)));
        assert_eq!(
            Value::from("a great string").freeze(),
            Frozen::Value(Value::Str("a great string".to_string()))
        );
        assert_eq!(Value::from(None::<bool>).freeze(), Frozen::Value(Value::Null));
    }

    #[test]
    fn test_frozen_object_ignores_later_mutation() {
        let object = SharedObject::from_iter([
            ("and", Value::from("an object, because we like")),
            ("integers", Value::from(123)),
        ]);

        let frozen = Value::from(&object).freeze();

        object.set("and", "modify object");
        object.set("integers", 234);
        object.set("extra", true);

        assert_eq!(
            frozen.to_json(),
            json!({"and": "an object, because we like", "integers": 123})
        );
        assert_eq!(object.get("integers"), Some(Value::Int(234)));
    }

    #[test]
    fn test_frozen_list_ignores_later_mutation() {
        let list = SharedList::from_iter([1, 2]);
        let frozen = Value::from(&list).freeze();

        list.push(3);
        list.set(0, 10);

        assert_eq!(frozen.to_json(), json!([1, 2]));
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_freeze_is_shallow() {
        let nested = SharedObject::from_iter([("depth", 1)]);
        let outer = SharedObject::new();
        outer.set("nested", &nested);

        let frozen = Value::from(&outer).freeze();
        nested.set("depth", 2);

        assert_eq!(frozen.to_json(), json!({"nested": {"depth": 2}}));
    }

    #[test]
    fn test_from_serialize_is_an_owned_snapshot() {
        #[derive(Serialize)]
        struct Request {
            id: u32,
            url: &'static str,
        }

        let value = Value::from_serialize(&Request {
            id: 4,
            url: "https://example.com",
        })
        .unwrap();

        assert!(!value.is_composite());
        assert_eq!(
            value.freeze().to_json(),
            json!({"id": 4, "url": "https://example.com"})
        );
    }

    #[test]
    fn test_display_renders_strings_bare() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::from(1.5).to_string(), "1.5");

        let frozen = Value::from(SharedObject::from_iter([("a", 1)])).freeze();
        assert_eq!(frozen.to_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_self_referential_object_renders_circular() {
        let object = SharedObject::from_iter([("integers", 123)]);
        object.set("me", &object);

        assert_eq!(
            Value::from(&object).to_json(),
            json!({"integers": 123, "me": "[Circular]"})
        );

        let frozen = Value::from(&object).freeze();
        assert_eq!(
            frozen.to_json(),
            json!({"integers": 123, "me": {"integers": 123, "me": "[Circular]"}})
        );
        assert!(format!("{object:?}").contains(CIRCULAR));
    }

    #[test]
    fn test_mutually_referencing_handles_render_circular() {
        let list = SharedList::new();
        let object = SharedObject::new();
        object.set("list", &list);
        list.push(&object);

        assert_eq!(
            Value::from(&list).to_json(),
            json!([{"list": "[Circular]"}])
        );
    }

    #[test]
    fn test_cyclic_handles_compare_without_recursing() {
        let a = SharedObject::from_iter([("n", 1)]);
        a.set("me", &a);
        let b = SharedObject::from_iter([("n", 1)]);
        b.set("me", &b);
        let c = SharedObject::from_iter([("n", 2)]);
        c.set("me", &c);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_non_finite_floats_keep_their_value() {
        assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::from(f64::INFINITY).to_string(), "inf");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_json(), json!("-inf"));

        let frozen = Value::from(SharedList::from_iter([f64::NAN])).freeze();
        assert_eq!(frozen.to_string(), r#"["NaN"]"#);
    }

    #[test]
    fn test_large_unsigned_falls_back_to_float() {
        assert_eq!(Value::from(u64::MAX), Value::Float(u64::MAX as f64));
        assert_eq!(Value::from(42u64), Value::Int(42));
    }
}
