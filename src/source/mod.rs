//! Data Source Module
//!
//! The persistent source of truth behind the cache. The cacher knows only an
//! operation's name and its arguments; executing it is the source's job.

mod memory;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::cacher::Operation;
use crate::error::SourceError;
use crate::key::Arg;

pub use memory::{MemorySource, ModelHandle, Row};

// == Capabilities ==
/// A handle to the data source or one of its models.
///
/// Handles passed as arguments are reduced to their name during key
/// derivation, so two handles to the same model derive the same key.
pub trait SourceHandle: Send + Sync {
    fn name(&self) -> &str;
}

/// A live record that can produce a data-only snapshot of itself.
pub trait PlainProjectable: Send + Sync {
    fn to_plain(&self) -> serde_json::Result<Value>;
}

/// Any serializable value projects to its serde representation.
pub struct Plain<T>(pub T);

impl<T: Serialize + Send + Sync> PlainProjectable for Plain<T> {
    fn to_plain(&self) -> serde_json::Result<Value> {
        serde_json::to_value(&self.0)
    }
}

// == Query Output ==
/// Raw result of a data source operation.
pub enum QueryOutput {
    /// No result
    Empty,
    /// Ordered collection of records
    Rows(Vec<Value>),
    /// A single live record
    Record(Box<dyn PlainProjectable>),
    /// Any other scalar or structured value
    Value(Value),
}

impl QueryOutput {
    pub fn record(record: impl PlainProjectable + 'static) -> Self {
        QueryOutput::Record(Box::new(record))
    }

    /// Normalizes the output to the value that gets cached.
    ///
    /// Absence becomes `null`, collections and plain values pass through and
    /// records are replaced by their plain projection. A record that cannot
    /// be projected fails here.
    pub fn into_plain(self) -> serde_json::Result<Value> {
        match self {
            QueryOutput::Empty => Ok(Value::Null),
            QueryOutput::Rows(rows) => Ok(Value::Array(rows)),
            QueryOutput::Record(record) => record.to_plain(),
            QueryOutput::Value(value) => Ok(value),
        }
    }
}

impl std::fmt::Debug for QueryOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryOutput::Empty => write!(f, "Empty"),
            QueryOutput::Rows(rows) => write!(f, "Rows({})", rows.len()),
            QueryOutput::Record(_) => write!(f, "Record(..)"),
            QueryOutput::Value(value) => write!(f, "Value({})", value),
        }
    }
}

// == Data Source ==
/// A source exposing named operations per entity.
///
/// Failures must be reported as `Err`; absence of a result is
/// `Ok(QueryOutput::Empty)`.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Whether `operation` is registered for `entity`.
    fn supports(&self, entity: &str, operation: Operation) -> bool;

    /// Runs `operation` on `entity` with positional arguments.
    async fn call(
        &self,
        entity: &str,
        operation: Operation,
        args: &[Arg],
    ) -> Result<QueryOutput, SourceError>;
}
