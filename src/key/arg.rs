//! Argument Model
//!
//! Positional query arguments. Besides plain data, an argument can be a
//! shared node (which may point back at itself), a handle to the data source,
//! an error, or a pending computation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Number, Value};

use crate::source::SourceHandle;

// == Arg ==
/// A single positional argument passed to an operation.
#[derive(Clone)]
pub enum Arg {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    List(Vec<Arg>),
    /// Keys are kept sorted, so field order never affects the derived key
    Map(BTreeMap<String, Arg>),
    /// Identity-carrying node; the only way to build a cycle
    Shared(SharedArg),
    /// Data source or model handle, reduced to its name when hashed
    Handle(Arc<dyn SourceHandle>),
    /// An error value, reduced to `"[Error]"` when hashed
    Error(Arc<dyn std::error::Error + Send + Sync>),
    /// A deferred computation, reduced to `"[Promise]"` when hashed
    Pending,
}

impl Arg {
    /// Builds a map argument from key/value pairs.
    pub fn map<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<Arg>,
        I: IntoIterator<Item = (K, V)>,
    {
        Arg::Map(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a list argument.
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Arg>,
        I: IntoIterator<Item = V>,
    {
        Arg::List(items.into_iter().map(Into::into).collect())
    }

    /// Wraps `arg` in a fresh shared node.
    pub fn shared(arg: impl Into<Arg>) -> Self {
        Arg::Shared(SharedArg::new(arg))
    }

    /// Wraps a handle to the data source or one of its models.
    pub fn handle(handle: impl SourceHandle + 'static) -> Self {
        Arg::Handle(Arc::new(handle))
    }

    /// Wraps an error value.
    pub fn error(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Arg::Error(Arc::new(err))
    }

    /// Returns the map field `name`, looking through shared nodes.
    pub fn field(&self, name: &str) -> Option<Arg> {
        match self {
            Arg::Map(fields) => fields.get(name).cloned(),
            Arg::Shared(node) => {
                let inner = node.read().clone();
                inner.field(name)
            }
            _ => None,
        }
    }

    /// Returns the string content, looking through shared nodes.
    pub fn as_string(&self) -> Option<String> {
        match self {
            Arg::String(s) => Some(s.clone()),
            Arg::Shared(node) => {
                let inner = node.read().clone();
                inner.as_string()
            }
            _ => None,
        }
    }

    /// Plain JSON view of the argument.
    ///
    /// Uses the same reductions as key derivation (handles, errors, pending
    /// values, cycle markers) but leaves string literals untouched.
    pub fn to_json(&self) -> Value {
        super::canonical::Canonicalizer::plain().value(self)
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Null => write!(f, "Null"),
            Arg::Bool(b) => write!(f, "Bool({})", b),
            Arg::Number(n) => write!(f, "Number({})", n),
            Arg::String(s) => write!(f, "String({:?})", s),
            Arg::List(items) => f.debug_list().entries(items).finish(),
            Arg::Map(fields) => f.debug_map().entries(fields).finish(),
            // Shared nodes may be cyclic, so only the identity is printed
            Arg::Shared(node) => write!(f, "Shared({:#x})", node.id()),
            Arg::Handle(h) => write!(f, "Handle({})", h.name()),
            Arg::Error(e) => write!(f, "Error({})", e),
            Arg::Pending => write!(f, "Pending"),
        }
    }
}

// == Conversions ==
impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Arg::Null,
            Value::Bool(b) => Arg::Bool(b),
            Value::Number(n) => Arg::Number(n),
            Value::String(s) => Arg::String(s),
            Value::Array(items) => Arg::List(items.into_iter().map(Arg::from).collect()),
            Value::Object(fields) => {
                Arg::Map(fields.into_iter().map(|(k, v)| (k, Arg::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::String(s.to_string())
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::String(s)
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Bool(b)
    }
}

impl From<i64> for Arg {
    fn from(n: i64) -> Self {
        Arg::Number(n.into())
    }
}

impl From<u64> for Arg {
    fn from(n: u64) -> Self {
        Arg::Number(n.into())
    }
}

impl From<i32> for Arg {
    fn from(n: i32) -> Self {
        Arg::Number(n.into())
    }
}

/// Non-finite floats have no JSON form and become `Null`.
impl From<f64> for Arg {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Arg::Null, Arg::Number)
    }
}

impl From<SharedArg> for Arg {
    fn from(node: SharedArg) -> Self {
        Arg::Shared(node)
    }
}

// == Shared Arg ==
/// A shared, mutable argument node compared by identity.
///
/// Cloning shares the node. A node stored inside itself (directly or through
/// descendants) forms a cycle; such nodes keep each other alive until the
/// cycle is broken with [`SharedArg::set`].
#[derive(Clone)]
pub struct SharedArg(Arc<RwLock<Arg>>);

impl SharedArg {
    /// Creates a new shared node holding `arg`.
    pub fn new(arg: impl Into<Arg>) -> Self {
        Self(Arc::new(RwLock::new(arg.into())))
    }

    /// Replaces the node's content.
    pub fn set(&self, arg: impl Into<Arg>) {
        *self.write() = arg.into();
    }

    /// Inserts a field when the node holds a map.
    pub fn insert(&self, key: impl Into<String>, arg: impl Into<Arg>) {
        if let Arg::Map(fields) = &mut *self.write() {
            fields.insert(key.into(), arg.into());
        }
    }

    /// Appends an item when the node holds a list.
    pub fn push(&self, arg: impl Into<Arg>) {
        if let Arg::List(items) = &mut *self.write() {
            items.push(arg.into());
        }
    }

    /// Stable identity of the node for the lifetime of the allocation.
    pub(crate) fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    // A poisoned lock still holds a complete value; keep reading it.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Arg> {
        self.0.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arg> {
        self.0.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for SharedArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedArg({:#x})", self.id())
    }
}
